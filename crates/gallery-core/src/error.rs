//! Error types for the gallery browser.

use thiserror::Error;

/// Result type alias using the gallery Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for gallery operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Gallery not found (or hidden from the caller)
    #[error("Gallery not found: {0}")]
    GalleryNotFound(i64),

    /// Hydrated records disagree with the page window
    #[error("Consistency error: {0}")]
    Consistency(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("test resource".to_string());
        assert_eq!(err.to_string(), "Not found: test resource");
    }

    #[test]
    fn test_error_display_gallery_not_found() {
        let err = Error::GalleryNotFound(42);
        assert_eq!(err.to_string(), "Gallery not found: 42");
    }

    #[test]
    fn test_error_display_consistency() {
        let err = Error::Consistency("missing id 7".to_string());
        assert_eq!(err.to_string(), "Consistency error: missing id 7");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("page_limits is empty".to_string());
        assert_eq!(err.to_string(), "Configuration error: page_limits is empty");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("bad id".to_string());
        assert_eq!(err.to_string(), "Invalid input: bad id");
    }

    #[test]
    fn test_error_display_internal() {
        let err = Error::Internal("unexpected state".to_string());
        assert_eq!(err.to_string(), "Internal error: unexpected state");
    }

    #[test]
    fn test_error_display_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.to_string().contains("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_toml_error() {
        let toml_err = toml::from_str::<toml::Value>("site_name = ");
        assert!(toml_err.is_err());

        let err: Error = toml_err.unwrap_err().into();
        assert!(matches!(err, Error::Config(_)));
    }
}
