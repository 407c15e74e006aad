use std::fs;

use mediacapture_settings::{
    Camera, CaptureSettings, EditorSession, FieldValue, ImageSaveMode, JsonFileStore,
    LocalFileSystem, MediaDirectories, Resolution, SettingsError, SettingsStore, StorageConfig,
};
use tempfile::TempDir;

fn open_in(temp: &TempDir) -> (SettingsStore<JsonFileStore>, MediaDirectories<LocalFileSystem>) {
    let config = StorageConfig {
        base_dir: Some(temp.path().to_path_buf()),
        ..StorageConfig::default()
    };
    config.open().unwrap()
}

// -------------------------------------------------------------------------
// Key-value file
// -------------------------------------------------------------------------

#[test]
fn first_load_writes_preferences_file() {
    let temp = TempDir::new().unwrap();
    let (mut store, _dirs) = open_in(&temp);

    let loaded = store.load().unwrap();
    assert_eq!(loaded, CaptureSettings::default());

    let path = temp.path().join("Config/preferences.json");
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["HaveSettingsBeenLoadedBefore"], true);
    assert_eq!(json["Camera"], 0);
    assert_eq!(json["CaptureResolution"], 1);
    assert_eq!(json["ImageCaptureEnabled"], true);
    assert_eq!(json["MaxMovieDurationInSeconds"], 60);
    assert_eq!(json["SaveCapturedImagesToPhotoLibrary"], false);
}

#[test]
fn saved_settings_survive_reopen() {
    let temp = TempDir::new().unwrap();
    let settings = CaptureSettings {
        camera: Camera::Rear,
        resolution: Resolution::Low,
        image_capture_enabled: true,
        image_save_mode: ImageSaveMode::PhotoLibrary,
        audio_capture_enabled: false,
        video_capture_enabled: true,
        auto_record_next_movie: true,
        max_movie_duration_secs: 1800,
    };

    {
        let (mut store, _dirs) = open_in(&temp);
        store.load().unwrap();
        store.save(&settings).unwrap();
    }

    let (mut store, _dirs) = open_in(&temp);
    assert_eq!(store.load().unwrap(), settings);
}

#[test]
fn no_temp_file_left_behind() {
    let temp = TempDir::new().unwrap();
    let (mut store, _dirs) = open_in(&temp);
    store.load().unwrap();
    assert!(!temp.path().join("Config/preferences.json.tmp").exists());
}

#[test]
fn corrupt_preferences_file_is_reported() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("Config")).unwrap();
    fs::write(temp.path().join("Config/preferences.json"), "{ not json").unwrap();

    let config = StorageConfig {
        base_dir: Some(temp.path().to_path_buf()),
        ..StorageConfig::default()
    };
    assert!(matches!(config.open(), Err(SettingsError::StorageUnavailable(_))));
}

#[test]
fn hand_edited_out_of_range_values_are_clamped() {
    let temp = TempDir::new().unwrap();
    {
        let (mut store, _dirs) = open_in(&temp);
        store.load().unwrap();
    }

    let path = temp.path().join("Config/preferences.json");
    let mut json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    json["Camera"] = serde_json::json!(4);
    json["CaptureResolution"] = serde_json::json!(2);
    fs::write(&path, serde_json::to_string(&json).unwrap()).unwrap();

    let (mut store, _dirs) = open_in(&temp);
    let loaded = store.load().unwrap();
    assert_eq!(loaded.camera, Camera::Front);
    assert_eq!(loaded.resolution, Resolution::High);
}

#[test]
fn mistyped_values_fall_back_per_field() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("Config")).unwrap();
    fs::write(
        temp.path().join("Config/preferences.json"),
        r#"{"HaveSettingsBeenLoadedBefore":true,"Camera":"rear","CaptureResolution":2.0,"AudioCaptureEnabled":null,"VideoCaptureEnabled":true}"#,
    )
    .unwrap();

    let (mut store, _dirs) = open_in(&temp);
    let loaded = store.load().unwrap();
    assert_eq!(loaded.camera, Camera::Front);
    assert_eq!(loaded.resolution, Resolution::High);
    assert!(!loaded.audio_capture_enabled);
    assert!(loaded.video_capture_enabled);
}

#[test]
fn non_object_preferences_file_is_reported() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("Config")).unwrap();
    fs::write(temp.path().join("Config/preferences.json"), "[1, 2]").unwrap();

    let config = StorageConfig {
        base_dir: Some(temp.path().to_path_buf()),
        ..StorageConfig::default()
    };
    assert!(matches!(config.open(), Err(SettingsError::StorageUnavailable(_))));
}

#[cfg(unix)]
#[test]
fn unwritable_config_dir_fails_save_and_keeps_state() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let (mut store, _dirs) = open_in(&temp);
    store.load().unwrap();

    let config_dir = temp.path().join("Config");
    fs::set_permissions(&config_dir, fs::Permissions::from_mode(0o500)).unwrap();

    let mut changed = CaptureSettings::default();
    changed.camera = Camera::Rear;
    let result = store.save(&changed);

    fs::set_permissions(&config_dir, fs::Permissions::from_mode(0o700)).unwrap();

    // Root ignores directory permissions; only assert when the write was refused
    if let Err(err) = result {
        assert!(matches!(err, SettingsError::StorageUnavailable(_)));
        assert_eq!(store.settings().camera, Camera::Front);
        assert_eq!(store.load().unwrap().camera, Camera::Front);
    }
}

// -------------------------------------------------------------------------
// Editing session end to end
// -------------------------------------------------------------------------

#[test]
fn edit_commit_save_cycle() {
    let temp = TempDir::new().unwrap();
    let (mut store, _dirs) = open_in(&temp);
    let current = store.load().unwrap();

    let mut session = EditorSession::begin(&current);
    session.set_field_by_name("AudioCaptureEnabled", FieldValue::Bool(true)).unwrap();
    session.set_field_by_name("AutoRecordNextMovie", FieldValue::Bool(true)).unwrap();
    session.set_field_by_name("MaxMovieDurationInSeconds", FieldValue::Index(2)).unwrap();
    session.set_field_by_name("ImageCaptureEnabled", FieldValue::Bool(false)).unwrap();
    let committed = session.commit();
    store.save(&committed).unwrap();

    let (mut reopened, _dirs) = open_in(&temp);
    let loaded = reopened.load().unwrap();
    assert!(loaded.audio_capture_enabled);
    assert!(loaded.auto_record_next_movie);
    assert_eq!(loaded.max_movie_duration_secs, 300);
    assert!(!loaded.image_capture_enabled);
    assert_eq!(loaded.image_save_mode, ImageSaveMode::DontSave);
}

// -------------------------------------------------------------------------
// Media deletion
// -------------------------------------------------------------------------

#[test]
fn deleting_images_without_directory_fails() {
    let temp = TempDir::new().unwrap();
    let (_store, mut dirs) = open_in(&temp);
    let session = EditorSession::begin(&CaptureSettings::default());

    let err = session.delete_all_images(&mut dirs).unwrap_err();
    assert!(matches!(err, SettingsError::StorageUnavailable(_)));
}

#[test]
fn deleting_videos_removes_contents() {
    let temp = TempDir::new().unwrap();
    let (_store, mut dirs) = open_in(&temp);

    let video = dirs.video_directory().unwrap();
    fs::create_dir_all(video.join("2026-10-19")).unwrap();
    fs::write(video.join("2026-10-19/clip.mov"), b"data").unwrap();
    let image = dirs.image_directory().unwrap();
    fs::write(image.join("still.jpg"), b"data").unwrap();

    let session = EditorSession::begin(&CaptureSettings::default());
    session.delete_all_videos(&mut dirs).unwrap();

    assert!(!video.exists());
    assert!(image.join("still.jpg").exists());
}
