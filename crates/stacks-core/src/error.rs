//! Error types for Stacks

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{kind} with identifier '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} with identifier '{id}' already exists")]
    AlreadyExists { kind: &'static str, id: String },

    #[error("Validation error on field '{field}': {message}")]
    Validation { field: &'static str, message: String },

    #[error(
        "Account '{account_id}' has insufficient reputation for '{action}': required {required}, current {current}"
    )]
    InsufficientReputation {
        account_id: String,
        required: i64,
        current: i64,
        action: String,
    },

    #[error("File exceeds maximum size: {size} > {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    #[error("File type not allowed: {0}")]
    InvalidFileType(String),

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(f64),

    #[error("Store lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

impl Error {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn already_exists(kind: &'static str, id: impl Into<String>) -> Self {
        Error::AlreadyExists {
            kind,
            id: id.into(),
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    pub fn is_insufficient_reputation(&self) -> bool {
        matches!(self, Error::InsufficientReputation { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
