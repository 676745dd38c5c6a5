//! Error types for the cache

use std::fmt;
use std::io;

#[derive(Debug)]
pub enum CacheError {
    /// Lookup of a key that is not present.
    KeyNotFound,
    /// The stored image could not be deserialized into the expected shape.
    CorruptImage(String),
    /// Underlying storage failure on save or load.
    Io(io::Error),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::KeyNotFound => write!(f, "Key not found"),
            CacheError::CorruptImage(msg) => write!(f, "Corrupt cache image: {}", msg),
            CacheError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CacheError {
    fn from(err: io::Error) -> Self {
        CacheError::Io(err)
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::CorruptImage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
