//! Capture settings data model
//!
//! `CaptureSettings` is the canonical value handed to the capture pipeline.
//! Grouped choices are small enums whose discriminants double as the
//! persisted integer and the presentation selection index.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Seconds between automatic still-image saves. Not user-editable.
pub const IMAGE_SAVE_INTERVAL_SECS: u32 = 5;

/// Default cap on a single movie before recording is stopped.
pub const DEFAULT_MAX_MOVIE_DURATION_SECS: u32 = 60;

// ============================================================================
// Grouped choices
// ============================================================================

/// Which camera feeds the capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Camera {
    #[default]
    Front,
    Rear,
}

impl Camera {
    pub const ALL: [Camera; 2] = [Camera::Front, Camera::Rear];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Camera::Front => "Front",
            Camera::Rear => "Back",
        }
    }
}

/// Capture resolution preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Low,
    #[default]
    Medium,
    High,
}

impl Resolution {
    pub const ALL: [Resolution; 3] = [Resolution::Low, Resolution::Medium, Resolution::High];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Resolution::Low => "Low",
            Resolution::Medium => "Medium",
            Resolution::High => "High",
        }
    }
}

/// Where captured still images are routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSaveMode {
    /// Images are captured but not kept
    #[default]
    DontSave,
    PhotoLibrary,
    MyDocuments,
}

impl ImageSaveMode {
    pub const ALL: [ImageSaveMode; 3] = [
        ImageSaveMode::DontSave,
        ImageSaveMode::PhotoLibrary,
        ImageSaveMode::MyDocuments,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            ImageSaveMode::DontSave => "Don't Save",
            ImageSaveMode::PhotoLibrary => "Photo Library",
            ImageSaveMode::MyDocuments => "My Documents",
        }
    }

    /// Decode the two persisted destination flags. Photo library wins if both are set.
    pub fn from_flags(photo_library: bool, my_documents: bool) -> Self {
        if photo_library {
            ImageSaveMode::PhotoLibrary
        } else if my_documents {
            ImageSaveMode::MyDocuments
        } else {
            ImageSaveMode::DontSave
        }
    }

    /// (photo_library, my_documents)
    pub fn flags(self) -> (bool, bool) {
        (
            self == ImageSaveMode::PhotoLibrary,
            self == ImageSaveMode::MyDocuments,
        )
    }
}

/// Discrete maximum-duration choices exposed for editing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationBucket {
    Unlimited,
    #[default]
    OneMinute,
    FiveMinutes,
    TenMinutes,
    ThirtyMinutes,
}

impl DurationBucket {
    pub const ALL: [DurationBucket; 5] = [
        DurationBucket::Unlimited,
        DurationBucket::OneMinute,
        DurationBucket::FiveMinutes,
        DurationBucket::TenMinutes,
        DurationBucket::ThirtyMinutes,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Length of the bucket in seconds, 0 = unlimited
    pub fn seconds(self) -> u32 {
        match self {
            DurationBucket::Unlimited => 0,
            DurationBucket::OneMinute => 60,
            DurationBucket::FiveMinutes => 300,
            DurationBucket::TenMinutes => 600,
            DurationBucket::ThirtyMinutes => 1800,
        }
    }

    /// Smallest bucket that holds `secs`. Anything past thirty minutes has no
    /// bucket and reads as unlimited.
    pub fn from_seconds(secs: u32) -> Self {
        match secs {
            1..=60 => DurationBucket::OneMinute,
            61..=300 => DurationBucket::FiveMinutes,
            301..=600 => DurationBucket::TenMinutes,
            601..=1800 => DurationBucket::ThirtyMinutes,
            _ => DurationBucket::Unlimited,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DurationBucket::Unlimited => "Unlimited",
            DurationBucket::OneMinute => "1 Minute",
            DurationBucket::FiveMinutes => "5 Minutes",
            DurationBucket::TenMinutes => "10 Minutes",
            DurationBucket::ThirtyMinutes => "30 Minutes",
        }
    }
}

// ============================================================================
// CaptureSettings
// ============================================================================

/// The full set of user-configurable capture options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    pub camera: Camera,
    pub resolution: Resolution,
    pub image_capture_enabled: bool,
    /// Only meaningful while `image_capture_enabled`
    pub image_save_mode: ImageSaveMode,
    pub audio_capture_enabled: bool,
    pub video_capture_enabled: bool,
    /// Start a new movie when the previous one hits its duration cap
    pub auto_record_next_movie: bool,
    /// 0 = unlimited
    pub max_movie_duration_secs: u32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            camera: Camera::Front,
            resolution: Resolution::Medium,
            image_capture_enabled: true,
            image_save_mode: ImageSaveMode::DontSave,
            audio_capture_enabled: false,
            video_capture_enabled: false,
            auto_record_next_movie: false,
            max_movie_duration_secs: DEFAULT_MAX_MOVIE_DURATION_SECS,
        }
    }
}

impl CaptureSettings {
    /// True when anything is being recorded (audio or video)
    pub fn media_capture_enabled(&self) -> bool {
        self.audio_capture_enabled || self.video_capture_enabled
    }

    /// Both cross-field rules hold
    pub fn is_consistent(&self) -> bool {
        let images_ok = self.image_capture_enabled || self.image_save_mode == ImageSaveMode::DontSave;
        let looping_ok = self.media_capture_enabled() || !self.auto_record_next_movie;
        images_ok && looping_ok
    }

    pub fn save_to_photo_library(&self) -> bool {
        self.image_save_mode == ImageSaveMode::PhotoLibrary
    }

    pub fn save_to_my_documents(&self) -> bool {
        self.image_save_mode == ImageSaveMode::MyDocuments
    }

    /// Movie length cap, None = unlimited
    pub fn max_movie_duration(&self) -> Option<Duration> {
        match self.max_movie_duration_secs {
            0 => None,
            secs => Some(Duration::from_secs(u64::from(secs))),
        }
    }

    pub fn image_save_interval(&self) -> Duration {
        Duration::from_secs(u64::from(IMAGE_SAVE_INTERVAL_SECS))
    }
}
