//! Error types for settings loading and validation.

use thiserror::Error;

/// Errors that can occur while loading, saving or validating [`crate::Settings`].
#[derive(Debug, Error)]
pub enum SettingsError {
    /// I/O error while reading or writing a settings file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings JSON could not be parsed or serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A numeric field holds a value the simulation cannot use.
    #[error("invalid value for `{field}`: {value}")]
    Invalid {
        /// Name of the offending field
        field: &'static str,
        /// The rejected value
        value: f32,
    },
}
