//! Ask error types.

use thiserror::Error;

use clubhouse_shared::AppError;

/// Errors from the Q&A proxy.
#[derive(Debug, Error)]
pub enum AskError {
    /// The question was rejected before calling the provider.
    #[error("{0}")]
    Validation(String),

    /// No API key is configured.
    #[error("LLM API key is not configured")]
    NotConfigured,

    /// The provider did not answer in time.
    #[error("LLM request timed out")]
    Timeout,

    /// The provider answered with a non-success status.
    #[error("LLM provider returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// Network or TLS failure.
    #[error("LLM transport error: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("malformed LLM response: {0}")]
    Malformed(String),
}

impl AskError {
    /// Short failure class for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotConfigured => "not_configured",
            Self::Timeout => "timeout",
            Self::Status { .. } => "status",
            Self::Transport(_) => "transport",
            Self::Malformed(_) => "malformed",
        }
    }
}

impl From<reqwest::Error> for AskError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<AskError> for AppError {
    fn from(err: AskError) -> Self {
        match err {
            AskError::Validation(msg) => Self::Validation(msg),
            other => Self::ServiceUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_validation_reaches_client_as_400() {
        let err: AppError = AskError::Validation("question is required".into()).into();
        assert_eq!(err.status_code(), 400);

        for upstream in [
            AskError::NotConfigured,
            AskError::Timeout,
            AskError::Status {
                status: 429,
                body: "rate limited".into(),
            },
            AskError::Malformed("no choices".into()),
        ] {
            let err: AppError = upstream.into();
            assert_eq!(err.status_code(), 503);
            assert_eq!(err.error_code(), "SERVICE_BUSY");
        }
    }
}
