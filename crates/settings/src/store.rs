//! Canonical settings store
//!
//! Owns the one authoritative `CaptureSettings` value and maps it onto the
//! flat key-value contract. A store is used by one owner at a time.

use crate::error::Result;
use crate::kv::{KeyValueStore, SettingsKey};
use crate::settings::{CaptureSettings, Camera, ImageSaveMode, Resolution};

pub struct SettingsStore<S: KeyValueStore> {
    backend: S,
    settings: CaptureSettings,
}

impl<S: KeyValueStore> SettingsStore<S> {
    /// Wrap a backend. In-memory value starts at the defaults until `load()`.
    pub fn new(backend: S) -> Self {
        Self {
            backend,
            settings: CaptureSettings::default(),
        }
    }

    /// Current in-memory settings (last loaded or saved)
    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    /// Whether a persisted baseline exists
    pub fn has_loaded_before(&self) -> bool {
        self.backend
            .get_bool(SettingsKey::HaveSettingsBeenLoadedBefore.as_str())
    }

    /// Load settings from the backend.
    ///
    /// On first run the in-memory values are written out together with the
    /// loaded-before marker, so later loads always have a full baseline.
    /// Persisted values that are out of range fall back to the field default.
    pub fn load(&mut self) -> Result<CaptureSettings> {
        if !self.has_loaded_before() {
            log::info!("first settings load, writing defaults");
            let baseline = self.settings.clone();
            self.write_fields(&baseline);
            self.backend
                .set_bool(SettingsKey::HaveSettingsBeenLoadedBefore.as_str(), true);
            self.backend.flush()?;
        }

        let loaded = self.read_fields();
        log::debug!("loaded capture settings: {:?}", loaded);
        self.settings = loaded.clone();
        Ok(loaded)
    }

    /// Write every field and flush. The in-memory value only changes once
    /// the flush succeeded.
    pub fn save(&mut self, settings: &CaptureSettings) -> Result<()> {
        self.write_fields(settings);
        self.backend.flush()?;
        self.settings = settings.clone();
        log::info!("saved capture settings");
        Ok(())
    }

    fn write_fields(&mut self, s: &CaptureSettings) {
        let kv = &mut self.backend;
        let (photo_library, my_documents) = s.image_save_mode.flags();

        kv.set_int(SettingsKey::Camera.as_str(), s.camera.index() as i64);
        kv.set_bool(SettingsKey::ImageCaptureEnabled.as_str(), s.image_capture_enabled);
        kv.set_bool(SettingsKey::AudioCaptureEnabled.as_str(), s.audio_capture_enabled);
        kv.set_bool(SettingsKey::VideoCaptureEnabled.as_str(), s.video_capture_enabled);
        kv.set_int(SettingsKey::CaptureResolution.as_str(), s.resolution.index() as i64);
        kv.set_bool(SettingsKey::AutoRecordNextMovie.as_str(), s.auto_record_next_movie);
        kv.set_int(
            SettingsKey::MaxMovieDurationInSeconds.as_str(),
            i64::from(s.max_movie_duration_secs),
        );
        kv.set_bool(SettingsKey::SaveCapturedImagesToPhotoLibrary.as_str(), photo_library);
        kv.set_bool(SettingsKey::SaveCapturedImagesToMyDocuments.as_str(), my_documents);
    }

    fn read_fields(&self) -> CaptureSettings {
        let defaults = CaptureSettings::default();

        let photo_library = self.read_bool(SettingsKey::SaveCapturedImagesToPhotoLibrary, false);
        let my_documents = self.read_bool(SettingsKey::SaveCapturedImagesToMyDocuments, false);

        CaptureSettings {
            camera: self.read_choice(SettingsKey::Camera, Camera::from_index, defaults.camera),
            resolution: self.read_choice(
                SettingsKey::CaptureResolution,
                Resolution::from_index,
                defaults.resolution,
            ),
            image_capture_enabled: self
                .read_bool(SettingsKey::ImageCaptureEnabled, defaults.image_capture_enabled),
            image_save_mode: ImageSaveMode::from_flags(photo_library, my_documents),
            audio_capture_enabled: self
                .read_bool(SettingsKey::AudioCaptureEnabled, defaults.audio_capture_enabled),
            video_capture_enabled: self
                .read_bool(SettingsKey::VideoCaptureEnabled, defaults.video_capture_enabled),
            auto_record_next_movie: self
                .read_bool(SettingsKey::AutoRecordNextMovie, defaults.auto_record_next_movie),
            max_movie_duration_secs: self.read_duration(defaults.max_movie_duration_secs),
        }
    }

    fn read_bool(&self, key: SettingsKey, default: bool) -> bool {
        if !self.backend.contains(key.as_str()) {
            log::warn!("settings key {key} missing, using default {default}");
            return default;
        }
        self.backend.get_bool(key.as_str())
    }

    fn read_choice<T: Copy + std::fmt::Debug>(
        &self,
        key: SettingsKey,
        from_index: fn(usize) -> Option<T>,
        default: T,
    ) -> T {
        if !self.backend.contains(key.as_str()) {
            log::warn!("settings key {key} missing, using default {default:?}");
            return default;
        }
        let raw = self.backend.get_int(key.as_str());
        match usize::try_from(raw).ok().and_then(from_index) {
            Some(value) => value,
            None => {
                log::warn!("settings key {key} has out-of-range value {raw}, using default {default:?}");
                default
            }
        }
    }

    fn read_duration(&self, default: u32) -> u32 {
        let key = SettingsKey::MaxMovieDurationInSeconds;
        if !self.backend.contains(key.as_str()) {
            log::warn!("settings key {key} missing, using default {default}");
            return default;
        }
        let raw = self.backend.get_int(key.as_str());
        if raw < 0 {
            // Negative has always meant "no limit"
            log::warn!("settings key {key} is negative ({raw}), treating as unlimited");
            return 0;
        }
        u32::try_from(raw).unwrap_or_else(|_| {
            log::warn!("settings key {key} too large ({raw}), using default {default}");
            default
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{MemoryStore, StoredValue};
    use crate::settings::ImageSaveMode;

    fn sample() -> CaptureSettings {
        CaptureSettings {
            camera: Camera::Rear,
            resolution: Resolution::High,
            image_capture_enabled: true,
            image_save_mode: ImageSaveMode::MyDocuments,
            audio_capture_enabled: true,
            video_capture_enabled: false,
            auto_record_next_movie: true,
            max_movie_duration_secs: 600,
        }
    }

    #[test]
    fn first_load_writes_defaults_and_marker() {
        let mut store = SettingsStore::new(MemoryStore::new());
        assert!(!store.has_loaded_before());

        let loaded = store.load().unwrap();

        assert_eq!(loaded, CaptureSettings::default());
        assert_eq!(loaded.max_movie_duration_secs, 60);
        assert!(store.has_loaded_before());
        assert_eq!(store.backend().flush_count(), 1);
        assert_eq!(store.backend().get_int("CaptureResolution"), 1);
    }

    #[test]
    fn second_load_does_not_rewrite_baseline() {
        let mut store = SettingsStore::new(MemoryStore::new());
        store.load().unwrap();
        store.load().unwrap();
        assert_eq!(store.backend().flush_count(), 1);
    }

    #[test]
    fn save_then_load_roundtrips_every_field() {
        let mut store = SettingsStore::new(MemoryStore::new());
        store.load().unwrap();
        store.save(&sample()).unwrap();

        let mut reopened = SettingsStore::new(store.into_backend());
        assert_eq!(reopened.load().unwrap(), sample());
    }

    #[test]
    fn resolution_and_duration_are_read_from_storage() {
        let mut store = SettingsStore::new(MemoryStore::new());
        store.load().unwrap();
        let mut s = CaptureSettings::default();
        s.resolution = Resolution::Low;
        s.max_movie_duration_secs = 1800;
        store.save(&s).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.resolution, Resolution::Low);
        assert_eq!(loaded.max_movie_duration_secs, 1800);
    }

    #[test]
    fn save_mode_is_persisted_as_two_flags() {
        let mut store = SettingsStore::new(MemoryStore::new());
        let mut s = CaptureSettings::default();
        s.image_save_mode = ImageSaveMode::PhotoLibrary;
        store.save(&s).unwrap();

        assert!(store.backend().get_bool("SaveCapturedImagesToPhotoLibrary"));
        assert!(!store.backend().get_bool("SaveCapturedImagesToMyDocuments"));
    }

    #[test]
    fn failed_save_keeps_previous_values() {
        let mut store = SettingsStore::new(MemoryStore::new());
        store.load().unwrap();

        store.backend_mut().set_fail_flush(true);
        let err = store.save(&sample()).unwrap_err();
        assert!(matches!(err, crate::SettingsError::StorageUnavailable(_)));
        assert_eq!(store.settings(), &CaptureSettings::default());

        store.backend_mut().set_fail_flush(false);
        assert_eq!(store.load().unwrap(), CaptureSettings::default());
    }

    #[test]
    fn first_load_surfaces_flush_failure() {
        let mut backend = MemoryStore::new();
        backend.set_fail_flush(true);
        let mut store = SettingsStore::new(backend);
        assert!(store.load().is_err());
        assert!(!store.has_loaded_before());
    }

    #[test]
    fn out_of_range_values_fall_back_to_defaults() {
        let mut store = SettingsStore::new(MemoryStore::new());
        store.load().unwrap();

        let kv = store.backend_mut();
        kv.insert_raw("Camera", StoredValue::Int(9));
        kv.insert_raw("CaptureResolution", StoredValue::Int(-1));
        kv.insert_raw("MaxMovieDurationInSeconds", StoredValue::Int(-30));

        let loaded = store.load().unwrap();
        assert_eq!(loaded.camera, Camera::Front);
        assert_eq!(loaded.resolution, Resolution::Medium);
        assert_eq!(loaded.max_movie_duration_secs, 0);
    }

    #[test]
    fn oversized_duration_falls_back_to_default() {
        let mut store = SettingsStore::new(MemoryStore::new());
        store.load().unwrap();
        store
            .backend_mut()
            .insert_raw("MaxMovieDurationInSeconds", StoredValue::Int(i64::MAX));
        assert_eq!(store.load().unwrap().max_movie_duration_secs, 60);
    }
}
