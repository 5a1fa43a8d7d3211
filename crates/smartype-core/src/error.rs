use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SmartypeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Pattern `{pattern}` has {groups} capture groups, expected 2")]
    CaptureGroups { pattern: String, groups: usize },

    #[error("Unsupported pattern flag `{0}`")]
    UnsupportedFlag(char),

    /// The host field cannot support a matcher (no event registration, or a
    /// required capability is missing). Raised before anything is attached.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid substitution rule at index {index}: {reason}")]
    InvalidRule { index: usize, reason: String },

    #[error("Preferences not found at: {0}")]
    PreferencesNotFound(String),

    #[error("Unsupported rule payload: {0}")]
    UnsupportedPayload(String),

    #[error("Error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SmartypeError>;
