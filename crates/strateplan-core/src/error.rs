//! Error taxonomy shared by the store, managers, and report aggregator

use thiserror::Error;

use crate::entities::EntityKind;

/// Result alias for strateplan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Strateplan error type
#[derive(Debug, Error)]
pub enum Error {
    /// A field is missing or malformed
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// A referenced id does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: i64 },

    /// Delete of an entity that still has children, without force
    #[error("{entity} {id} has {children} dependent record(s); use --force to delete them too")]
    ConfirmationRequired {
        entity: EntityKind,
        id: i64,
        children: usize,
    },

    /// Underlying SQLite failure
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be read or written
    #[error("config error: {0}")]
    Config(String),

    /// JSON serialization failure
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }

    pub(crate) fn not_found(entity: EntityKind, id: i64) -> Self {
        Error::NotFound { entity, id }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Validation { .. } => 1,
            Error::NotFound { .. } => 3,
            Error::ConfirmationRequired { .. } => 4,
            Error::Storage(_) | Error::Io(_) | Error::Config(_) | Error::Serialization(_) => 5,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}
