//! Duration store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing persisted durations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("duration store I/O failed at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file does not contain a valid duration document.
    #[error("duration store is corrupted: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A selector name cannot be used as a store key.
    #[error("invalid duration key '{0}'")]
    InvalidKey(String),

    /// The record under this key is longer than a countdown can run.
    #[error("stored duration for '{0}' is too long")]
    DurationTooLong(String),
}

impl StoreError {
    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Io { .. } => "check that the store directory exists and is writable",
            Self::Serialization(_) => "delete or repair the duration store file",
            Self::InvalidKey(_) => "give every selector a non-empty name",
            Self::DurationTooLong(_) => "set a shorter duration or repair the duration store file",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_display() {
        let err = StoreError::InvalidKey(String::new());
        assert_eq!(err.to_string(), "invalid duration key ''");
    }

    #[test]
    fn test_io_display_includes_path() {
        let err = StoreError::Io {
            path: PathBuf::from("/tmp/durations.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("durations.json"));
        assert!(err.suggestion().contains("writable"));
    }

    #[test]
    fn test_duration_too_long_display() {
        let err = StoreError::DurationTooLong("work".to_string());
        assert_eq!(err.to_string(), "stored duration for 'work' is too long");
        assert!(err.suggestion().contains("shorter"));
    }

    #[test]
    fn test_from_serde_error() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: StoreError = serde_err.into();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
