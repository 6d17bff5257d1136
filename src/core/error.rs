/// Error Module
///
/// Defines the error type shared by all session operations. Variants
/// follow the façade's failure taxonomy: argument validation, connection
/// state, driver-reported failures (carrying the SQLite extended result
/// code when one is exposed), configuration, and everything else.
use thiserror::Error;

/// Error type for all seshql operations.
#[derive(Error, Debug)]
pub enum SeshqlError {
    /// A required argument was absent or empty; detected before any I/O.
    #[error("{0}")]
    Validation(String),

    /// The operation requires an established connection.
    #[error("{0}")]
    NotConnected(String),

    /// The underlying driver reported a failure. `code` is the SQLite
    /// extended result code when the driver exposed one.
    #[error("{}", driver_display(.code, .message))]
    Driver {
        code: Option<String>,
        message: String,
    },

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic application errors for unexpected conditions
    #[error("{0}")]
    App(String),
}

impl SeshqlError {
    /// The driver status code attached to this error, if any.
    pub fn driver_code(&self) -> Option<&str> {
        match self {
            SeshqlError::Driver { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

fn driver_display(code: &Option<String>, message: &String) -> String {
    match code {
        Some(code) => format!("{}: {}", code, message),
        None => message.clone(),
    }
}

impl From<rusqlite::Error> for SeshqlError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ffi_err, message) => SeshqlError::Driver {
                code: Some(ffi_err.extended_code.to_string()),
                message: message.unwrap_or_else(|| ffi_err.to_string()),
            },
            other => SeshqlError::Driver {
                code: None,
                message: other.to_string(),
            },
        }
    }
}

/// Type alias for Result to use SeshqlError as the error type.
pub type Result<T> = std::result::Result<T, SeshqlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let validation_err = SeshqlError::Validation("url cannot be empty".to_string());
        assert_eq!(validation_err.to_string(), "url cannot be empty");

        let state_err = SeshqlError::NotConnected("call connect() first".to_string());
        assert!(state_err.to_string().contains("connect()"));

        let config_err = SeshqlError::Config("invalid config".to_string());
        assert!(config_err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_driver_display_includes_code_when_present() {
        let with_code = SeshqlError::Driver {
            code: Some("1555".to_string()),
            message: "UNIQUE constraint failed: t.x".to_string(),
        };
        assert_eq!(with_code.to_string(), "1555: UNIQUE constraint failed: t.x");
        assert_eq!(with_code.driver_code(), Some("1555"));

        let without_code = SeshqlError::Driver {
            code: None,
            message: "no suitable driver".to_string(),
        };
        assert_eq!(without_code.to_string(), "no suitable driver");
        assert_eq!(without_code.driver_code(), None);
    }

    #[test]
    fn test_error_conversion() {
        // Non-SQLite failures carry no status code
        let err: SeshqlError = rusqlite::Error::ExecuteReturnedResults.into();
        match err {
            SeshqlError::Driver { code: None, .. } => {}
            other => panic!("Expected Driver error without code, got {:?}", other),
        }

        // SQLite failures carry the extended result code
        let ffi_err = rusqlite::ffi::Error::new(1555);
        let err: SeshqlError =
            rusqlite::Error::SqliteFailure(ffi_err, Some("UNIQUE constraint failed".to_string()))
                .into();
        assert_eq!(err.driver_code(), Some("1555"));
        assert!(err.to_string().starts_with("1555: "));
    }
}
