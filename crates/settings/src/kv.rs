//! Flat key-value persistence
//!
//! `KeyValueStore` is the contract the settings store persists through.
//! Sets are staged until `flush()`; a failed flush rolls the staged values
//! back to the last durable state, so callers see all-or-nothing writes.
//!
//! Two implementations ship here:
//! - `MemoryStore`: in-process map (tests, ephemeral sessions)
//! - `JsonFileStore`: one JSON object on disk, written via temp file + rename

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SettingsError};

/// Persisted key names, one per settings field plus the first-run marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsKey {
    HaveSettingsBeenLoadedBefore,
    Camera,
    ImageCaptureEnabled,
    AudioCaptureEnabled,
    VideoCaptureEnabled,
    CaptureResolution,
    MaxMovieDurationInSeconds,
    AutoRecordNextMovie,
    SaveCapturedImagesToPhotoLibrary,
    SaveCapturedImagesToMyDocuments,
}

impl SettingsKey {
    pub const ALL: [SettingsKey; 10] = [
        SettingsKey::HaveSettingsBeenLoadedBefore,
        SettingsKey::Camera,
        SettingsKey::ImageCaptureEnabled,
        SettingsKey::AudioCaptureEnabled,
        SettingsKey::VideoCaptureEnabled,
        SettingsKey::CaptureResolution,
        SettingsKey::MaxMovieDurationInSeconds,
        SettingsKey::AutoRecordNextMovie,
        SettingsKey::SaveCapturedImagesToPhotoLibrary,
        SettingsKey::SaveCapturedImagesToMyDocuments,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingsKey::HaveSettingsBeenLoadedBefore => "HaveSettingsBeenLoadedBefore",
            SettingsKey::Camera => "Camera",
            SettingsKey::ImageCaptureEnabled => "ImageCaptureEnabled",
            SettingsKey::AudioCaptureEnabled => "AudioCaptureEnabled",
            SettingsKey::VideoCaptureEnabled => "VideoCaptureEnabled",
            SettingsKey::CaptureResolution => "CaptureResolution",
            SettingsKey::MaxMovieDurationInSeconds => "MaxMovieDurationInSeconds",
            SettingsKey::AutoRecordNextMovie => "AutoRecordNextMovie",
            SettingsKey::SaveCapturedImagesToPhotoLibrary => "SaveCapturedImagesToPhotoLibrary",
            SettingsKey::SaveCapturedImagesToMyDocuments => "SaveCapturedImagesToMyDocuments",
        }
    }
}

impl std::fmt::Display for SettingsKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-value persistence collaborator.
///
/// Missing keys read as `false` / `0`.
pub trait KeyValueStore {
    fn contains(&self, key: &str) -> bool;
    fn get_bool(&self, key: &str) -> bool;
    fn set_bool(&mut self, key: &str, value: bool);
    fn get_int(&self, key: &str) -> i64;
    fn set_int(&mut self, key: &str, value: i64);
    /// Make every prior set durable before returning.
    fn flush(&mut self) -> Result<()>;
}

/// A single stored value. Reads coerce across kinds (nonzero int is `true`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    Bool(bool),
    Int(i64),
}

impl StoredValue {
    pub fn as_bool(self) -> bool {
        match self {
            StoredValue::Bool(b) => b,
            StoredValue::Int(i) => i != 0,
        }
    }

    pub fn as_int(self) -> i64 {
        match self {
            StoredValue::Bool(b) => i64::from(b),
            StoredValue::Int(i) => i,
        }
    }

    /// Accepts booleans, integers, and floats with no fractional part.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(StoredValue::Bool(*b)),
            serde_json::Value::Number(n) => n.as_i64().map(StoredValue::Int).or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                    .map(|f| StoredValue::Int(f as i64))
            }),
            _ => None,
        }
    }
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, StoredValue>,
    durable: BTreeMap<String, StoredValue>,
    flush_count: usize,
    fail_flush: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent flush fail (and roll back), for exercising error paths.
    pub fn set_fail_flush(&mut self, fail: bool) {
        self.fail_flush = fail;
    }

    pub fn flush_count(&self) -> usize {
        self.flush_count
    }

    /// Raw access for seeding persisted state in tests.
    pub fn insert_raw(&mut self, key: &str, value: StoredValue) {
        self.values.insert(key.to_string(), value);
        self.durable.insert(key.to_string(), value);
    }

    /// The last successfully flushed state.
    pub fn durable(&self) -> &BTreeMap<String, StoredValue> {
        &self.durable
    }
}

impl KeyValueStore for MemoryStore {
    fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn get_bool(&self, key: &str) -> bool {
        self.values.get(key).is_some_and(|v| v.as_bool())
    }

    fn set_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), StoredValue::Bool(value));
    }

    fn get_int(&self, key: &str) -> i64 {
        self.values.get(key).map_or(0, |v| v.as_int())
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), StoredValue::Int(value));
    }

    fn flush(&mut self) -> Result<()> {
        if self.fail_flush {
            self.values = self.durable.clone();
            return Err(SettingsError::StorageUnavailable(
                "in-memory store configured to fail flush".into(),
            ));
        }
        self.durable = self.values.clone();
        self.flush_count += 1;
        Ok(())
    }
}

// ============================================================================
// JSON file store
// ============================================================================

/// Key-value store persisted as a single JSON object.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, StoredValue>,
    durable: BTreeMap<String, StoredValue>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store; a file that
    /// can't be read or parsed as a JSON object is reported rather than
    /// silently replaced. Entries of the wrong type are dropped with a warning
    /// and read back as missing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|e| {
                SettingsError::StorageUnavailable(format!("failed to read {}: {e}", path.display()))
            })?;
            let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(&contents)
                .map_err(|e| {
                    SettingsError::StorageUnavailable(format!(
                        "failed to parse {}: {e}",
                        path.display()
                    ))
                })?;
            raw.into_iter()
                .filter_map(|(key, value)| match StoredValue::from_json(&value) {
                    Some(stored) => Some((key, stored)),
                    None => {
                        log::warn!("ignoring preference {key} with unusable value {value}");
                        None
                    }
                })
                .collect()
        } else {
            BTreeMap::new()
        };

        log::debug!("opened preferences at {} ({} keys)", path.display(), values.len());
        Ok(Self {
            path,
            durable: values.clone(),
            values,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }

    fn write_atomic(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.values)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let temp = self.temp_path();
        fs::write(&temp, json)?;
        fs::rename(&temp, &self.path)
    }
}

impl KeyValueStore for JsonFileStore {
    fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn get_bool(&self, key: &str) -> bool {
        self.values.get(key).is_some_and(|v| v.as_bool())
    }

    fn set_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), StoredValue::Bool(value));
    }

    fn get_int(&self, key: &str) -> i64 {
        self.values.get(key).map_or(0, |v| v.as_int())
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), StoredValue::Int(value));
    }

    fn flush(&mut self) -> Result<()> {
        match self.write_atomic() {
            Ok(()) => {
                self.durable = self.values.clone();
                Ok(())
            }
            Err(e) => {
                self.values = self.durable.clone();
                Err(SettingsError::StorageUnavailable(format!(
                    "failed to write {}: {e}",
                    self.path.display()
                )))
            }
        }
    }
}
