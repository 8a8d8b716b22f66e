//! Error types for model access.
//!
//! Each variant carries a stable code that appears in the Display output
//! (`[CODE] message`) and is available through [`LlmError::code()`].

/// Stable error codes.
pub mod error_codes {
    /// Invalid or missing configuration.
    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";

    /// The request could not be sent or the connection broke.
    pub const REQUEST_FAILED: &str = "REQUEST_FAILED";

    /// The server answered with a non-success status.
    pub const HTTP_STATUS: &str = "HTTP_STATUS";

    /// The response body was not a chat completion.
    pub const DECODE_FAILED: &str = "DECODE_FAILED";

    /// The request timed out.
    pub const TIMEOUT_ERROR: &str = "TIMEOUT_ERROR";
}

/// Errors produced while talking to the inference server.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Invalid or missing configuration.
    #[error("[{}] {}", error_codes::CONFIG_INVALID, .0)]
    ConfigError(String),

    /// Transport failure.
    #[error("[{}] {}", error_codes::REQUEST_FAILED, .0)]
    RequestError(String),

    /// Non-success HTTP status with the server's message.
    #[error("[{}] HTTP {status}: {message}", error_codes::HTTP_STATUS)]
    HttpStatus { status: u16, message: String },

    /// Unparseable response.
    #[error("[{}] {}", error_codes::DECODE_FAILED, .0)]
    DecodeError(String),

    /// Request timed out.
    #[error("[{}] {}", error_codes::TIMEOUT_ERROR, .0)]
    TimeoutError(String),
}

impl LlmError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError(_) => error_codes::CONFIG_INVALID,
            Self::RequestError(_) => error_codes::REQUEST_FAILED,
            Self::HttpStatus { .. } => error_codes::HTTP_STATUS,
            Self::DecodeError(_) => error_codes::DECODE_FAILED,
            Self::TimeoutError(_) => error_codes::TIMEOUT_ERROR,
        }
    }

    /// Returns the inner message without the code prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::ConfigError(m)
            | Self::RequestError(m)
            | Self::DecodeError(m)
            | Self::TimeoutError(m) => m,
            Self::HttpStatus { message, .. } => message,
        }
    }

    /// True for transient failures: transport errors, timeouts, rate limits
    /// and server errors.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConfigError(_) | Self::DecodeError(_) => false,
            Self::RequestError(_) | Self::TimeoutError(_) => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::TimeoutError(e.to_string())
        } else if e.is_decode() {
            Self::DecodeError(e.to_string())
        } else {
            Self::RequestError(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes() {
        assert_eq!(LlmError::ConfigError("x".into()).code(), "CONFIG_INVALID");
        assert_eq!(LlmError::RequestError("x".into()).code(), "REQUEST_FAILED");
        assert_eq!(LlmError::DecodeError("x".into()).code(), "DECODE_FAILED");
        assert_eq!(LlmError::TimeoutError("x".into()).code(), "TIMEOUT_ERROR");
        let err = LlmError::HttpStatus {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.code(), "HTTP_STATUS");
    }

    #[test]
    fn display_includes_code_prefix() {
        let err = LlmError::ConfigError("missing model".into());
        let display = format!("{err}");
        assert!(display.starts_with("[CONFIG_INVALID]"));
        assert!(display.contains("missing model"));

        let err = LlmError::HttpStatus {
            status: 404,
            message: "no such model".into(),
        };
        assert_eq!(err.to_string(), "[HTTP_STATUS] HTTP 404: no such model");
        assert_eq!(err.message(), "no such model");
    }

    #[test]
    fn retryable_classification() {
        assert!(LlmError::RequestError("refused".into()).is_retryable());
        assert!(LlmError::TimeoutError("slow".into()).is_retryable());
        assert!(!LlmError::ConfigError("bad".into()).is_retryable());
        assert!(!LlmError::DecodeError("bad json".into()).is_retryable());
        let status = |status| LlmError::HttpStatus {
            status,
            message: String::new(),
        };
        assert!(status(429).is_retryable());
        assert!(status(503).is_retryable());
        assert!(!status(400).is_retryable());
        assert!(!status(401).is_retryable());
    }
}
