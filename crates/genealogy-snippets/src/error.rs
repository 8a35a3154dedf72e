//! Error types for genealogy-snippets.
//!
//! Domain operations (grouping, ingestion, rendering) degrade instead of
//! failing. The variants here cover the infrastructure around them: the
//! key-value store, configuration, and the native-messaging transport.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for genealogy-snippets operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Catalog Errors ===
    /// The catalog slot holds something other than a JSON list; it is left
    /// untouched rather than overwritten.
    #[error("catalog slot {key:?} is not a JSON list: {source}")]
    CatalogUndecodable {
        /// Slot name.
        key: String,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Input offered for ingestion has none of the accepted shapes.
    #[error("unrecognized record input: {message}")]
    UnrecognizedInput {
        /// Description of the input.
        message: String,
    },

    // === Messaging Errors ===
    /// An incoming native-messaging frame exceeded the configured limit.
    #[error("message frame of {len} bytes exceeds limit of {max} bytes")]
    FrameTooLarge {
        /// Declared length of the frame.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The transport closed in the middle of a frame.
    #[error("message channel closed mid-frame")]
    TruncatedFrame,

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for genealogy-snippets operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create an unrecognized-input error.
    #[must_use]
    pub fn unrecognized_input(message: impl Into<String>) -> Self {
        Self::UnrecognizedInput {
            message: message.into(),
        }
    }

    /// Check if this error came from the message transport framing.
    #[must_use]
    pub fn is_framing_error(&self) -> bool {
        matches!(self, Self::FrameTooLarge { .. } | Self::TruncatedFrame)
    }
}
