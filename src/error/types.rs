//! Error type definitions
//!
//! Defines the main error type used by the resolver, together with the
//! classification helpers the fallback chain relies on.

use thiserror::Error;

/// Marker the extractor emits when YouTube demands a signed-in session
/// (age gate, bot check).
const SIGN_IN_MARKER: &str = "Sign in";

/// Main error type for the resolver
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Media extractor failures, carrying the extractor's own message
    #[error("Extraction failed: {message}")]
    Extractor { message: String },

    /// A data source answered but had nothing usable
    #[error("No results: {0}")]
    NotFound(String),

    /// Malformed link, id or request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Media download failures
    #[error("Download failed: {0}")]
    Download(String),

    /// Network/HTTP client errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an extractor error
    pub fn extractor(message: impl Into<String>) -> Self {
        Self::Extractor {
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a download error
    pub fn download(msg: impl Into<String>) -> Self {
        Self::Download(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the extractor was refused because the content needs a
    /// signed-in session. Only these failures unlock the proxy tier.
    pub fn is_sign_in_required(&self) -> bool {
        matches!(self, Self::Extractor { message } if message.contains(SIGN_IN_MARKER))
    }

    /// Errors that make trying further tiers pointless.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::config("test config error");
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.to_string(), "Configuration error: test config error");
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_extractor_error() {
        let err = Error::extractor("ERROR: [youtube] abc: Video unavailable");
        assert!(matches!(err, Error::Extractor { .. }));
        assert_eq!(
            err.to_string(),
            "Extraction failed: ERROR: [youtube] abc: Video unavailable"
        );
        assert!(!err.is_sign_in_required());
    }

    #[test]
    fn test_sign_in_classification() {
        let err = Error::extractor(
            "ERROR: [youtube] dQw4w9WgXcQ: Sign in to confirm your age. This video may be inappropriate",
        );
        assert!(err.is_sign_in_required());

        // Only extractor failures count, whatever their text says
        let err = Error::not_found("Sign in required");
        assert!(!err.is_sign_in_required());
    }

    #[test]
    fn test_terminal_classification() {
        assert!(Error::invalid_input("empty link").is_terminal());
        assert!(Error::config("bad binary").is_terminal());
        assert!(!Error::not_found("nothing").is_terminal());
        assert!(!Error::extractor("boom").is_terminal());
    }

    #[test]
    fn test_download_error() {
        let err = Error::download("yt-dlp exited with status 1");
        assert!(err.to_string().starts_with("Download failed"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("missing"));
    }
}
