//! Error types for the promptforge generation pipeline.
//!
//! Every fallible operation returns `ForgeResult<T>`. The variants form a
//! closed set: the generation loop decides retry vs. terminate by matching on
//! them, never by reading the message text.

use thiserror::Error;

/// The unified error type for promptforge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForgeError {
    /// The model could not be reached (refused connection, timeout, reset).
    ///
    /// Raised by the model client at the point of failure.
    #[error("connection error: {reason}")]
    Connection { reason: String },

    /// No candidate substring of the model output parsed as a JSON object.
    #[error("could not extract valid JSON content from response: {reason}")]
    Extraction { reason: String },

    /// The extracted JSON does not conform to the record schema.
    ///
    /// `field` is the dotted path of the offending field, a section name such
    /// as `tactics`, or a comma-joined list when several fields failed.
    #[error("schema validation error in field '{field}': {detail}")]
    SchemaValidation { field: String, detail: String },

    /// Any failure that does not fit the kinds above.
    #[error("generation failed: {reason}")]
    Generation { reason: String },

    /// A validated record could not be written to its artifact.
    #[error("artifact write failed: {reason}")]
    Storage { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

/// Stable classification codes written to the diagnostic log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Api,
    Json,
    SchemaValidation,
    General,
    Storage,
    Config,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Api => "API_ERROR",
            ErrorKind::Json => "JSON_ERROR",
            ErrorKind::SchemaValidation => "SCHEMA_VALIDATION_ERROR",
            ErrorKind::General => "GENERAL_ERROR",
            ErrorKind::Storage => "STORAGE_ERROR",
            ErrorKind::Config => "CONFIG_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ForgeError {
    /// Classification of this error for logs and statistics.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForgeError::Connection { .. } => ErrorKind::Api,
            ForgeError::Extraction { .. } => ErrorKind::Json,
            ForgeError::SchemaValidation { .. } => ErrorKind::SchemaValidation,
            ForgeError::Generation { .. } => ErrorKind::General,
            ForgeError::Storage { .. } => ErrorKind::Storage,
            ForgeError::Config { .. } => ErrorKind::Config,
        }
    }

    /// The field a schema validation failure is scoped to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            ForgeError::SchemaValidation { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the promptforge crates.
pub type ForgeResult<T> = Result<T, ForgeError>;
