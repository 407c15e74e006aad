use std::fmt;

#[derive(Debug)]
pub enum SettingsError {
    /// A field-change event named a field the editor does not know.
    UnknownField(String),
    /// Payload kind or range doesn't fit the targeted field.
    InvalidValue { field: String, value: String },
    /// Directory creation, deletion, or key-value flush failed.
    StorageUnavailable(String),
    /// TOML configuration parse error.
    Config(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField(name) => write!(f, "unknown settings field: {name}"),
            Self::InvalidValue { field, value } => {
                write!(f, "invalid value '{value}' for field '{field}'")
            }
            Self::StorageUnavailable(msg) => write!(f, "storage unavailable: {msg}"),
            Self::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        Self::StorageUnavailable(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SettingsError>;
