//! Interactive settings editing
//!
//! An `EditorSession` holds a working copy of `CaptureSettings` while the user
//! changes it. Grouped choices are kept as selections (indices into a fixed
//! option list) and mapped back to canonical values on `commit()`.
//!
//! Dependency rules run after every mutation:
//! - image capture off → save destination forced to "Don't Save", group disabled
//! - neither audio nor video → looping forced off, looping and duration disabled
//!
//! Disabled groups otherwise keep their last selection. No callbacks: the
//! presentation layer reads `group()` / `is_interactive()` after each edit.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SettingsError};
use crate::settings::{CaptureSettings, Camera, DurationBucket, ImageSaveMode, Resolution};
use crate::storage::{FileSystem, MediaCategory, MediaDirectories};

// ============================================================================
// Fields and values
// ============================================================================

/// An editable settings field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Camera,
    Resolution,
    ImageCaptureEnabled,
    ImageSaveMode,
    AudioCaptureEnabled,
    VideoCaptureEnabled,
    AutoRecordNextMovie,
    MaxMovieDuration,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Camera,
        Field::Resolution,
        Field::ImageCaptureEnabled,
        Field::ImageSaveMode,
        Field::AudioCaptureEnabled,
        Field::VideoCaptureEnabled,
        Field::AutoRecordNextMovie,
        Field::MaxMovieDuration,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Camera => "camera",
            Field::Resolution => "resolution",
            Field::ImageCaptureEnabled => "image_capture_enabled",
            Field::ImageSaveMode => "image_save_mode",
            Field::AudioCaptureEnabled => "audio_capture_enabled",
            Field::VideoCaptureEnabled => "video_capture_enabled",
            Field::AutoRecordNextMovie => "auto_record_next_movie",
            Field::MaxMovieDuration => "max_movie_duration",
        }
    }

    /// Grouped choice this field is edited through, None for toggles
    pub fn choice_group(self) -> Option<ChoiceGroup> {
        match self {
            Field::Camera => Some(ChoiceGroup::Camera),
            Field::Resolution => Some(ChoiceGroup::Resolution),
            Field::ImageSaveMode => Some(ChoiceGroup::ImageSaveMode),
            Field::MaxMovieDuration => Some(ChoiceGroup::Duration),
            _ => None,
        }
    }

    /// Parse user text into a payload for this field.
    ///
    /// Toggles take true/false, on/off, yes/no or 1/0. Choices take an
    /// option index or an option label (case-insensitive).
    pub fn parse_value(self, raw: &str) -> Result<FieldValue> {
        let trimmed = raw.trim();
        let invalid = || SettingsError::InvalidValue {
            field: self.name().to_string(),
            value: raw.to_string(),
        };

        match self.choice_group() {
            None => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => Ok(FieldValue::Bool(true)),
                "false" | "off" | "no" | "0" => Ok(FieldValue::Bool(false)),
                _ => Err(invalid()),
            },
            Some(group) => {
                let options = group.options();
                if let Ok(index) = trimmed.parse::<usize>() {
                    return if index < options.len() {
                        Ok(FieldValue::Index(index))
                    } else {
                        Err(invalid())
                    };
                }
                options
                    .iter()
                    .position(|label| label.eq_ignore_ascii_case(trimmed))
                    .map(FieldValue::Index)
                    .ok_or_else(invalid)
            }
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = SettingsError;

    /// Accepts snake_case names and the persisted key names.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "camera" | "Camera" => Ok(Field::Camera),
            "resolution" | "capture_resolution" | "CaptureResolution" => Ok(Field::Resolution),
            "image_capture_enabled" | "ImageCaptureEnabled" => Ok(Field::ImageCaptureEnabled),
            "image_save_mode" | "ImageSaveMode" => Ok(Field::ImageSaveMode),
            "audio_capture_enabled" | "AudioCaptureEnabled" => Ok(Field::AudioCaptureEnabled),
            "video_capture_enabled" | "VideoCaptureEnabled" => Ok(Field::VideoCaptureEnabled),
            "auto_record_next_movie" | "AutoRecordNextMovie" => Ok(Field::AutoRecordNextMovie),
            "max_movie_duration" | "max_movie_duration_secs" | "MaxMovieDurationInSeconds" => {
                Ok(Field::MaxMovieDuration)
            }
            other => Err(SettingsError::UnknownField(other.to_string())),
        }
    }
}

/// Payload of a field-change event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue {
    /// Toggle state
    Bool(bool),
    /// Selection index within a grouped choice
    Index(usize),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Index(i) => write!(f, "#{i}"),
        }
    }
}

// ============================================================================
// Presentation state
// ============================================================================

/// Radio-style groups with a single selected option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChoiceGroup {
    Camera,
    Resolution,
    ImageSaveMode,
    Duration,
}

impl ChoiceGroup {
    pub const ALL: [ChoiceGroup; 4] = [
        ChoiceGroup::Camera,
        ChoiceGroup::Resolution,
        ChoiceGroup::ImageSaveMode,
        ChoiceGroup::Duration,
    ];

    pub fn field(self) -> Field {
        match self {
            ChoiceGroup::Camera => Field::Camera,
            ChoiceGroup::Resolution => Field::Resolution,
            ChoiceGroup::ImageSaveMode => Field::ImageSaveMode,
            ChoiceGroup::Duration => Field::MaxMovieDuration,
        }
    }

    /// Option labels in selection-index order
    pub fn options(self) -> Vec<&'static str> {
        match self {
            ChoiceGroup::Camera => Camera::ALL.iter().map(|c| c.label()).collect(),
            ChoiceGroup::Resolution => Resolution::ALL.iter().map(|r| r.label()).collect(),
            ChoiceGroup::ImageSaveMode => ImageSaveMode::ALL.iter().map(|m| m.label()).collect(),
            ChoiceGroup::Duration => DurationBucket::ALL.iter().map(|d| d.label()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupState {
    #[default]
    Active,
    Disabled,
}

impl GroupState {
    fn from_condition(active: bool) -> Self {
        if active {
            GroupState::Active
        } else {
            GroupState::Disabled
        }
    }

    pub fn is_active(self) -> bool {
        self == GroupState::Active
    }
}

/// What the presentation layer needs to render one grouped choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupView {
    pub group: ChoiceGroup,
    pub selected: usize,
    pub interactive: bool,
}

// ============================================================================
// Session
// ============================================================================

/// Working copy of settings during one editing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSession {
    original: CaptureSettings,

    camera: Camera,
    resolution: Resolution,
    image_capture_enabled: bool,
    image_save_mode: ImageSaveMode,
    audio_capture_enabled: bool,
    video_capture_enabled: bool,
    auto_record_next_movie: bool,
    duration: DurationBucket,

    image_save_state: GroupState,
    auto_record_state: GroupState,
    duration_state: GroupState,
}

impl EditorSession {
    /// Start editing a copy of `settings`.
    ///
    /// Dependencies are enforced immediately so the working copy starts out
    /// consistent even if the persisted snapshot was not.
    pub fn begin(settings: &CaptureSettings) -> Self {
        let mut session = Self {
            original: settings.clone(),
            camera: settings.camera,
            resolution: settings.resolution,
            image_capture_enabled: settings.image_capture_enabled,
            image_save_mode: settings.image_save_mode,
            audio_capture_enabled: settings.audio_capture_enabled,
            video_capture_enabled: settings.video_capture_enabled,
            auto_record_next_movie: settings.auto_record_next_movie,
            duration: DurationBucket::from_seconds(settings.max_movie_duration_secs),
            image_save_state: GroupState::Active,
            auto_record_state: GroupState::Active,
            duration_state: GroupState::Active,
        };
        session.enforce_dependencies();
        session
    }

    /// The snapshot this session started from
    pub fn original(&self) -> &CaptureSettings {
        &self.original
    }

    /// Update one field, then re-run the dependency rules.
    ///
    /// A payload of the wrong kind or out of range leaves the working copy untouched.
    pub fn set_field(&mut self, field: Field, value: FieldValue) -> Result<()> {
        let invalid = || SettingsError::InvalidValue {
            field: field.name().to_string(),
            value: value.to_string(),
        };

        match (field, value) {
            (Field::Camera, FieldValue::Index(i)) => {
                self.camera = Camera::from_index(i).ok_or_else(invalid)?;
            }
            (Field::Resolution, FieldValue::Index(i)) => {
                self.resolution = Resolution::from_index(i).ok_or_else(invalid)?;
            }
            (Field::ImageSaveMode, FieldValue::Index(i)) => {
                self.image_save_mode = ImageSaveMode::from_index(i).ok_or_else(invalid)?;
            }
            (Field::MaxMovieDuration, FieldValue::Index(i)) => {
                self.duration = DurationBucket::from_index(i).ok_or_else(invalid)?;
            }
            (Field::ImageCaptureEnabled, FieldValue::Bool(b)) => self.image_capture_enabled = b,
            (Field::AudioCaptureEnabled, FieldValue::Bool(b)) => self.audio_capture_enabled = b,
            (Field::VideoCaptureEnabled, FieldValue::Bool(b)) => self.video_capture_enabled = b,
            (Field::AutoRecordNextMovie, FieldValue::Bool(b)) => self.auto_record_next_movie = b,
            _ => return Err(invalid()),
        }

        log::debug!("set {field} = {value}");
        self.enforce_dependencies();
        Ok(())
    }

    /// `set_field` addressed by name, as emitted by a presentation layer.
    pub fn set_field_by_name(&mut self, name: &str, value: FieldValue) -> Result<()> {
        let field: Field = name.parse()?;
        self.set_field(field, value)
    }

    /// Re-apply the dependency rules. Idempotent.
    pub fn enforce_dependencies(&mut self) {
        enforce_dependencies(self);
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn image_capture_enabled(&self) -> bool {
        self.image_capture_enabled
    }

    pub fn image_save_mode(&self) -> ImageSaveMode {
        self.image_save_mode
    }

    pub fn audio_capture_enabled(&self) -> bool {
        self.audio_capture_enabled
    }

    pub fn video_capture_enabled(&self) -> bool {
        self.video_capture_enabled
    }

    pub fn auto_record_next_movie(&self) -> bool {
        self.auto_record_next_movie
    }

    pub fn duration_bucket(&self) -> DurationBucket {
        self.duration
    }

    pub fn media_capture_enabled(&self) -> bool {
        self.audio_capture_enabled || self.video_capture_enabled
    }

    /// Active/disabled state of the group `field` belongs to
    pub fn group_state(&self, field: Field) -> GroupState {
        match field {
            Field::ImageSaveMode => self.image_save_state,
            Field::AutoRecordNextMovie => self.auto_record_state,
            Field::MaxMovieDuration => self.duration_state,
            _ => GroupState::Active,
        }
    }

    pub fn is_interactive(&self, field: Field) -> bool {
        self.group_state(field).is_active()
    }

    pub fn group(&self, group: ChoiceGroup) -> GroupView {
        let selected = match group {
            ChoiceGroup::Camera => self.camera.index(),
            ChoiceGroup::Resolution => self.resolution.index(),
            ChoiceGroup::ImageSaveMode => self.image_save_mode.index(),
            ChoiceGroup::Duration => self.duration.index(),
        };
        GroupView {
            group,
            selected,
            interactive: self.is_interactive(group.field()),
        }
    }

    pub fn groups(&self) -> Vec<GroupView> {
        ChoiceGroup::ALL.iter().map(|g| self.group(*g)).collect()
    }

    /// The settings `commit()` would produce right now
    pub fn snapshot(&self) -> CaptureSettings {
        CaptureSettings {
            camera: self.camera,
            resolution: self.resolution,
            image_capture_enabled: self.image_capture_enabled,
            image_save_mode: self.image_save_mode,
            audio_capture_enabled: self.audio_capture_enabled,
            video_capture_enabled: self.video_capture_enabled,
            auto_record_next_movie: self.auto_record_next_movie,
            max_movie_duration_secs: self.duration.seconds(),
        }
    }

    /// Whether committing would change anything
    pub fn is_dirty(&self) -> bool {
        self.snapshot() != self.original
    }

    /// End the session and hand back the final settings. Does not persist.
    pub fn commit(self) -> CaptureSettings {
        let settings = self.snapshot();
        debug_assert!(settings.is_consistent());
        log::debug!("committed settings session (dirty: {})", settings != self.original);
        settings
    }

    /// End the session without producing settings
    pub fn discard(self) {
        log::debug!("discarded settings session");
    }

    pub fn delete_all_videos<F: FileSystem>(&self, dirs: &mut MediaDirectories<F>) -> Result<()> {
        dirs.delete_all(MediaCategory::Video)
    }

    pub fn delete_all_images<F: FileSystem>(&self, dirs: &mut MediaDirectories<F>) -> Result<()> {
        dirs.delete_all(MediaCategory::Image)
    }
}

/// Apply the dependency rules to a session's working copy.
pub fn enforce_dependencies(session: &mut EditorSession) {
    // Images can't be routed anywhere if capture is off
    if !session.image_capture_enabled {
        session.image_save_mode = ImageSaveMode::DontSave;
    }
    session.image_save_state = GroupState::from_condition(session.image_capture_enabled);

    // Looping and duration only matter while something is recorded
    let media = session.media_capture_enabled();
    if !media {
        session.auto_record_next_movie = false;
    }
    session.auto_record_state = GroupState::from_condition(media);
    session.duration_state = GroupState::from_condition(media);
}
