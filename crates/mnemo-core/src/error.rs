//! Error types for the mnemo study engine.

use thiserror::Error;

/// Result type alias using mnemo's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for mnemo operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Every acquisition strategy in a fallback chain failed or returned
    /// insufficient content.
    #[error("Acquisition exhausted: {0}")]
    AcquisitionExhausted(String),

    /// No caption track could be retrieved for a video.
    #[error("No captions available for video: {0}")]
    NoCaptions(String),

    /// Generation failed (all chunks failed, or a single call failed after retries).
    #[error("Generation error: {0}")]
    Generation(String),

    /// The generative service response was not valid structured output.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The operation observed a cancellation signal.
    #[error("Operation cancelled")]
    Cancelled,

    /// Invalid input (empty corpus, malformed source descriptor).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persistence collaborator failure
    #[error("Store error: {0}")]
    Store(String),

    /// An outbound request timed out.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// An outbound connection could not be established.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// A remote service answered with a non-success HTTP status.
    #[error("Upstream service returned {status}: {message}")]
    Upstream { status: u16, message: String },

    /// HTTP/network request failed for a reason other than timeout or connect.
    #[error("Request error: {0}")]
    Request(String),

    /// A retried operation exhausted its attempt budget.
    #[error("Retries exhausted after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether a failed remote operation is worth retrying.
    ///
    /// Timeouts, connection failures, and the transient upstream statuses
    /// (429, 500, 502, 503) are retryable; everything else is terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Timeout(_) | Error::Connection(_) => true,
            Error::Upstream { status, .. } => matches!(status, 429 | 500 | 502 | 503),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout(e.to_string())
        } else if e.is_connect() {
            Error::Connection(e.to_string())
        } else if let Some(status) = e.status() {
            Error::Upstream {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            Error::Request(e.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_acquisition_exhausted() {
        let err = Error::AcquisitionExhausted("all strategies failed".to_string());
        assert_eq!(
            err.to_string(),
            "Acquisition exhausted: all strategies failed"
        );
    }

    #[test]
    fn test_error_display_no_captions() {
        let err = Error::NoCaptions("dQw4w9WgXcQ".to_string());
        assert_eq!(err.to_string(), "No captions available for video: dQw4w9WgXcQ");
    }

    #[test]
    fn test_error_display_upstream() {
        let err = Error::Upstream {
            status: 429,
            message: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "Upstream service returned 429: rate limited");
    }

    #[test]
    fn test_error_display_cancelled() {
        assert_eq!(Error::Cancelled.to_string(), "Operation cancelled");
    }

    #[test]
    fn test_error_display_retries_exhausted() {
        let err = Error::RetriesExhausted {
            attempts: 3,
            source: Box::new(Error::Timeout("deadline".to_string())),
        };
        assert!(err.to_string().contains("3 attempts"));
        assert!(err.to_string().contains("deadline"));
    }

    #[test]
    fn test_retryable_timeout() {
        assert!(Error::Timeout("t".to_string()).is_retryable());
    }

    #[test]
    fn test_retryable_connection() {
        assert!(Error::Connection("refused".to_string()).is_retryable());
    }

    #[test]
    fn test_retryable_upstream_statuses() {
        for status in [429u16, 500, 502, 503] {
            let err = Error::Upstream {
                status,
                message: String::new(),
            };
            assert!(err.is_retryable(), "status {} should be retryable", status);
        }
    }

    #[test]
    fn test_not_retryable_upstream_4xx() {
        for status in [400u16, 401, 403, 404, 422] {
            let err = Error::Upstream {
                status,
                message: String::new(),
            };
            assert!(!err.is_retryable(), "status {} should be terminal", status);
        }
    }

    #[test]
    fn test_not_retryable_parse() {
        assert!(!Error::Parse("bad json".to_string()).is_retryable());
    }

    #[test]
    fn test_not_retryable_cancelled() {
        assert!(!Error::Cancelled.is_retryable());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Parse(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Parse error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_error_debug_format() {
        let err = Error::Generation("model refused".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Generation"));
    }

    #[test]
    fn test_result_type_ok() {
        fn get_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(get_result().unwrap(), 42);
    }
}
