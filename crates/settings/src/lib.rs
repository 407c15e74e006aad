//! Capture settings for a media-capture application.
//!
//! - `CaptureSettings`: the canonical, validated preferences
//! - `SettingsStore`: load/save through a flat key-value backend
//! - `EditorSession`: working copy with dependency enforcement and commit
//! - `MediaDirectories`: lazily created Config/VideoData/ImageData paths
//!
//! No GUI concepts. Everything is synchronous and single-owner.

pub mod config;
pub mod editor;
pub mod error;
pub mod kv;
pub mod settings;
pub mod storage;
pub mod store;

pub use config::StorageConfig;
pub use editor::{
    enforce_dependencies, ChoiceGroup, EditorSession, Field, FieldValue, GroupState, GroupView,
};
pub use error::{Result, SettingsError};
pub use kv::{JsonFileStore, KeyValueStore, MemoryStore, SettingsKey, StoredValue};
pub use settings::{
    CaptureSettings, Camera, DurationBucket, ImageSaveMode, Resolution,
    DEFAULT_MAX_MOVIE_DURATION_SECS, IMAGE_SAVE_INTERVAL_SECS,
};
pub use storage::{FileSystem, LocalFileSystem, MediaCategory, MediaDirectories};
pub use store::SettingsStore;
