//! CLI Exit Code Registry
//!
//! Single source of truth for `mcap` exit codes. Scripts rely on them.
//!
//! | Code | Description                                        |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 1    | General error (unspecified)                        |
//! | 2    | Usage error (bad args, unknown field, bad value)   |
//! | 3    | Storage unavailable (directory or preferences I/O) |

use mediacapture_settings::SettingsError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unknown field, value out of range, bad config.
pub const EXIT_USAGE: u8 = 2;

/// Preferences or media directory could not be read, written, or deleted.
pub const EXIT_STORAGE: u8 = 3;

/// Map a library error to its exit code.
pub fn settings_exit_code(err: &SettingsError) -> u8 {
    match err {
        SettingsError::UnknownField(_) | SettingsError::InvalidValue { .. } => EXIT_USAGE,
        SettingsError::Config(_) => EXIT_USAGE,
        SettingsError::StorageUnavailable(_) => EXIT_STORAGE,
    }
}
