use std::fmt;

/// Main error type for the admissions client
#[derive(Debug)]
pub enum AdmissionsError {
    // Network and HTTP client errors
    NetworkTimeout,
    NetworkConnection(String),
    HttpClient(String),
    InvalidUrl(String),

    // Serialization and parsing errors
    JsonParsing(String),
    JsonSerialization(String),
    MalformedResponse(String),

    // Remote endpoint answered but did not accept the request
    RemoteRejected(String),

    // Local backup storage errors
    StorageUnavailable(String),
    StorageCorrupted(String),

    // Spreadsheet export errors
    SpreadsheetExport(String),

    // Caller-supplied values out of range
    InvalidFieldValue { field: String, value: String, reason: String },

    // Configuration and setup errors
    ConfigurationError(String),
    InvalidConfiguration(String),
}

impl fmt::Display for AdmissionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdmissionsError::NetworkTimeout => write!(f, "Network request timed out"),
            AdmissionsError::NetworkConnection(msg) => write!(f, "Network connection error: {}", msg),
            AdmissionsError::HttpClient(msg) => write!(f, "HTTP client error: {}", msg),
            AdmissionsError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),

            AdmissionsError::JsonParsing(msg) => write!(f, "JSON parsing error: {}", msg),
            AdmissionsError::JsonSerialization(msg) => write!(f, "JSON serialization error: {}", msg),
            AdmissionsError::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),

            AdmissionsError::RemoteRejected(msg) => write!(f, "Remote endpoint rejected request: {}", msg),

            AdmissionsError::StorageUnavailable(msg) => write!(f, "Local storage unavailable: {}", msg),
            AdmissionsError::StorageCorrupted(msg) => write!(f, "Local storage corrupted: {}", msg),

            AdmissionsError::SpreadsheetExport(msg) => write!(f, "Spreadsheet export failed: {}", msg),

            AdmissionsError::InvalidFieldValue { field, value, reason } => {
                write!(f, "Invalid value '{}' for field '{}': {}", value, field, reason)
            }

            AdmissionsError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            AdmissionsError::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for AdmissionsError {}

// Convenience type alias for Results
pub type AdmissionsResult<T> = Result<T, AdmissionsError>;

impl From<reqwest::Error> for AdmissionsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdmissionsError::NetworkTimeout
        } else if err.is_connect() {
            AdmissionsError::NetworkConnection(err.to_string())
        } else if err.is_builder() {
            AdmissionsError::InvalidUrl(err.to_string())
        } else {
            AdmissionsError::HttpClient(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AdmissionsError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_eof() {
            AdmissionsError::JsonParsing(err.to_string())
        } else {
            AdmissionsError::JsonSerialization(err.to_string())
        }
    }
}

impl From<std::io::Error> for AdmissionsError {
    fn from(err: std::io::Error) -> Self {
        AdmissionsError::StorageUnavailable(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for AdmissionsError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        AdmissionsError::SpreadsheetExport(err.to_string())
    }
}

// Helper functions for creating common errors
impl AdmissionsError {
    pub fn invalid_field(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        AdmissionsError::InvalidFieldValue {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn malformed_response(msg: impl Into<String>) -> Self {
        AdmissionsError::MalformedResponse(msg.into())
    }

    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        AdmissionsError::InvalidConfiguration(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = AdmissionsError::StorageUnavailable("disk full".to_string());
        assert_eq!(error.to_string(), "Local storage unavailable: disk full");
    }

    #[test]
    fn test_invalid_field() {
        let error = AdmissionsError::invalid_field("batch_size", 0, "must be greater than zero");
        match &error {
            AdmissionsError::InvalidFieldValue { field, value, reason } => {
                assert_eq!(field, "batch_size");
                assert_eq!(value, "0");
                assert_eq!(reason, "must be greater than zero");
            }
            _ => panic!("Expected InvalidFieldValue error"),
        }
        assert_eq!(
            error.to_string(),
            "Invalid value '0' for field 'batch_size': must be greater than zero"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(AdmissionsError::from(err), AdmissionsError::JsonParsing(_)));
    }

    #[test]
    fn test_io_error_is_storage_unavailable() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        assert!(matches!(AdmissionsError::from(err), AdmissionsError::StorageUnavailable(_)));
    }
}
