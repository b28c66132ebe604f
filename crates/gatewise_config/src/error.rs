//! Error types for project file loading and validation.

/// Errors that can occur when loading or validating a `gatewise.toml` file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    /// An I/O error occurred while reading the project file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A required field is missing or empty.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}
