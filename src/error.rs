//! Error types for imagery acquisition and processing operations

use thiserror::Error;

/// Result type alias for imagery acquisition operations
pub type Result<T> = std::result::Result<T, StreetshotError>;

/// Comprehensive error types for imagery acquisition operations
#[derive(Error, Debug)]
pub enum StreetshotError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image format or processing errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Malformed search query (missing or conflicting predicates, bad bounds)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Remote provider failure; `code` carries the HTTP status when one was received
    #[error("Provider error{status}: {message}", status = status_suffix(*code))]
    Provider {
        /// HTTP status code, absent for transport-level failures
        code: Option<u16>,
        /// Provider or transport diagnostic message
        message: String,
    },

    /// Geometry errors from crop/resize/rotate parameters
    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    /// Invalid client configuration (base URL, credentials, timeouts)
    #[error("Invalid configuration: {0}")]
    Config(String),
}

fn status_suffix(code: Option<u16>) -> String {
    code.map_or_else(String::new, |c| format!(" (status {c})"))
}

impl StreetshotError {
    /// Create a new invalid query error
    pub fn invalid_query<S: Into<String>>(msg: S) -> Self {
        Self::InvalidQuery(msg.into())
    }

    /// Create a new invalid region error
    pub fn invalid_region<S: Into<String>>(msg: S) -> Self {
        Self::InvalidRegion(msg.into())
    }

    /// Create a new configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a provider error without an HTTP status (transport, timeout)
    pub fn provider<S: Into<String>>(msg: S) -> Self {
        Self::Provider {
            code: None,
            message: msg.into(),
        }
    }

    /// Create a provider error carrying the HTTP status the provider returned
    pub fn provider_status<S: Into<String>>(code: u16, msg: S) -> Self {
        Self::Provider {
            code: Some(code),
            message: msg.into(),
        }
    }

    /// Whether retrying the same request could plausibly succeed.
    ///
    /// Transport-level failures (connection drops, timeouts) and throttling or
    /// server-side statuses are retryable; client errors and local failures
    /// are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provider { code: None, .. } => true,
            Self::Provider {
                code: Some(code), ..
            } => *code == 408 || *code == 429 || (500..=599).contains(code),
            _ => false,
        }
    }

    // Contextual error creators

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create image loading error with format context
    pub fn image_load_error<P: AsRef<std::path::Path>>(path: P, error: image::ImageError) -> Self {
        let path_display = path.as_ref().display();
        let extension = path
            .as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown");

        Self::Image(image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "Failed to load image '{}' (format: {}): {}. Supported formats: PNG, JPEG, WebP, TIFF, BMP",
                path_display, extension, error
            ),
        )))
    }

    /// Create image saving error with format context
    pub fn image_save_error<P: AsRef<std::path::Path>>(path: P, error: image::ImageError) -> Self {
        let path_display = path.as_ref().display();
        Self::Image(image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Failed to save image '{path_display}': {error}"),
        )))
    }

    /// Create a provider error from a failed HTTP request with endpoint context
    pub fn request_error(operation: &str, url: &str, error: &reqwest::Error) -> Self {
        let detail = if error.is_timeout() {
            "request timed out"
        } else if error.is_connect() {
            "connection failed"
        } else {
            "request failed"
        };

        Self::Provider {
            code: error.status().map(|s| s.as_u16()),
            message: format!("Failed to {operation} via '{url}': {detail}: {error}"),
        }
    }

    /// Create a provider error for a response body that could not be decoded
    pub fn malformed_response(endpoint: &str, status: u16, error: &serde_json::Error) -> Self {
        Self::Provider {
            code: Some(status),
            message: format!("Malformed response from '{endpoint}': {error}"),
        }
    }

    /// Create query error with valid ranges
    pub fn query_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
        recommended: Option<T>,
    ) -> Self {
        let recommendation = match recommended {
            Some(rec) => format!(" Recommended: {rec}"),
            None => String::new(),
        };

        Self::InvalidQuery(format!(
            "Invalid {parameter}: {value} (valid range: {valid_range}).{recommendation}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_creation() {
        let err = StreetshotError::invalid_query("no location predicate");
        assert!(matches!(err, StreetshotError::InvalidQuery(_)));

        let err = StreetshotError::invalid_region("zero-width crop");
        assert!(matches!(err, StreetshotError::InvalidRegion(_)));
    }

    #[test]
    fn test_error_display() {
        let err = StreetshotError::invalid_query("address and area are mutually exclusive");
        assert_eq!(
            err.to_string(),
            "Invalid query: address and area are mutually exclusive"
        );

        let err = StreetshotError::provider_status(503, "upstream unavailable");
        assert_eq!(
            err.to_string(),
            "Provider error (status 503): upstream unavailable"
        );

        let err = StreetshotError::provider("connection reset");
        assert_eq!(err.to_string(), "Provider error: connection reset");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(StreetshotError::provider("timed out").is_retryable());
        assert!(StreetshotError::provider_status(429, "slow down").is_retryable());
        assert!(StreetshotError::provider_status(500, "oops").is_retryable());
        assert!(StreetshotError::provider_status(599, "edge").is_retryable());

        assert!(!StreetshotError::provider_status(404, "no such image").is_retryable());
        assert!(!StreetshotError::provider_status(401, "bad key").is_retryable());
        assert!(!StreetshotError::invalid_query("missing predicate").is_retryable());
        assert!(!StreetshotError::invalid_region("oob").is_retryable());
    }

    #[test]
    fn test_enhanced_error_context() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = StreetshotError::file_io_error(
            "create destination directory",
            Path::new("/data/images"),
            io_error,
        );
        let error_string = err.to_string();
        assert!(error_string.contains("create destination directory"));
        assert!(error_string.contains("/data/images"));

        let err = StreetshotError::query_value_error("limit", 9000, "1-5000", Some(5000));
        let error_string = err.to_string();
        assert!(error_string.contains("limit"));
        assert!(error_string.contains("9000"));
        assert!(error_string.contains("1-5000"));
        assert!(error_string.contains("Recommended: 5000"));

        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = StreetshotError::malformed_response("images/search", 200, &parse_err);
        let error_string = err.to_string();
        assert!(error_string.contains("images/search"));
        assert!(error_string.contains("status 200"));
    }
}
