//! Custom error types with exit codes

use thiserror::Error;

/// Main error type for CI configuration processing
///
/// Every variant is fatal to the whole run: there is no partial output.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CiError {
    /// Schema Error - unknown field, wrong type, missing field or unsupported version
    #[error("Schema error: {message}")]
    Schema { message: String },

    /// Reference Error - undeclared registry or unknown Pro service
    #[error("Reference error: {message}")]
    Reference { message: String },

    /// Format Error - malformed credential reference, base string or wildcard
    #[error("Format error: {message}")]
    Format { message: String },

    /// Collision Error - two build groups share an artifact name
    #[error("Collision error: {message}")]
    Collision { message: String },

    /// Metadata Error - per-image metadata missing or unreadable
    #[error("Metadata error: {message}")]
    Metadata { message: String },

    /// Output Error - writing the step outputs failed
    #[error("Output error: {message}")]
    Output { message: String },
}

impl CiError {
    /// Get the appropriate exit code for this error type
    #[must_use]
    #[inline]
    pub const fn exit_code(&self) -> i32 {
        match *self {
            Self::Schema { .. } => 1,
            Self::Reference { .. } => 2,
            Self::Format { .. } => 3,
            Self::Collision { .. } => 4,
            Self::Metadata { .. } => 5,
            Self::Output { .. } => 6,
        }
    }

    /// The message without the category prefix
    #[must_use]
    #[inline]
    pub fn message(&self) -> &str {
        match self {
            Self::Schema { message }
            | Self::Reference { message }
            | Self::Format { message }
            | Self::Collision { message }
            | Self::Metadata { message }
            | Self::Output { message } => message,
        }
    }

    /// Create a schema error
    #[inline]
    pub fn schema<S: Into<String>>(message: S) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Create a cross-reference error
    #[inline]
    pub fn reference<S: Into<String>>(message: S) -> Self {
        Self::Reference {
            message: message.into(),
        }
    }

    /// Create a format error
    #[inline]
    pub fn format<S: Into<String>>(message: S) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Create an artifact-name collision error
    #[inline]
    pub fn collision<S: Into<String>>(message: S) -> Self {
        Self::Collision {
            message: message.into(),
        }
    }

    /// Create a metadata error
    #[inline]
    pub fn metadata<S: Into<String>>(message: S) -> Self {
        Self::Metadata {
            message: message.into(),
        }
    }

    /// Create an output error
    #[inline]
    pub fn output<S: Into<String>>(message: S) -> Self {
        Self::Output {
            message: message.into(),
        }
    }
}
