//! Error types for propstream.

use thiserror::Error;

/// Main error type for archive, codec and schema operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Stream header is missing or a region overruns its parent
    #[error("Malformed stream: {0}")]
    MalformedStream(String),

    /// Read past the end of the input
    #[error("Unexpected end of stream at offset {0}")]
    UnexpectedEof(u64),

    /// Polymorphic tag with no registered factory entry
    #[error("Unknown polymorphic variant tag {tag:#010X}")]
    UnknownVariant { tag: u32 },

    /// A top-level schema description could not be loaded
    #[error("Failed to load schema description {source_name}: {reason}")]
    Schema { source_name: String, reason: String },

    /// No schema registered for the requested variant tag
    #[error("No schema registered for variant {0}")]
    VariantNotFound(String),

    /// Value kind does not match its schema node
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Text or binary value could not be interpreted
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Archive session used out of order
    #[error("Archive misuse: {0}")]
    InvalidState(String),

    /// XML tokenizer or writer failure
    #[error("XML error: {0}")]
    Xml(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 conversion error
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create a malformed stream error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedStream(msg.into())
    }

    /// Create an invalid value error.
    pub fn invalid_value(msg: impl Into<String>) -> Self {
        Self::InvalidValue(msg.into())
    }

    /// Create an archive misuse error.
    pub fn state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Wrap an XML tokenizer, attribute or writer error.
    pub fn xml(err: impl std::fmt::Display) -> Self {
        Self::Xml(err.to_string())
    }

    /// Create a schema load failure for a named description.
    pub fn schema(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Schema {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a type mismatch error.
    pub fn mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Result type alias for propstream operations.
pub type Result<T> = std::result::Result<T, Error>;
