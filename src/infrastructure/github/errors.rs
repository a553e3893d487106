use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with the GitHub REST API
#[derive(Error, Debug)]
pub enum GitHubApiError {
    /// Bad or missing token (HTTP 401)
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Permission denied (HTTP 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Repository, issue or milestone does not exist (HTTP 404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Payload rejected (HTTP 422)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Primary or secondary rate limit hit (HTTP 429, or 403 with `Retry-After`)
    #[error("Rate limit exceeded: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    /// Server error from GitHub (HTTP 5xx)
    #[error("Server error ({0}): {1}")]
    Server(StatusCode, String),

    #[error("Request timeout")]
    Timeout,

    /// Network or connection error
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Unknown or unexpected status
    #[error("Unexpected status ({0}): {1}")]
    Unexpected(StatusCode, String),
}

impl GitHubApiError {
    /// Classify a non-success response.
    pub fn from_status(status: StatusCode, body: String, retry_after: Option<Duration>) -> Self {
        match status.as_u16() {
            401 => Self::Unauthorized(body),
            403 if retry_after.is_some() => Self::RateLimited {
                message: body,
                retry_after,
            },
            403 => Self::Forbidden(body),
            404 => Self::NotFound(body),
            422 => Self::Validation(body),
            429 => Self::RateLimited {
                message: body,
                retry_after,
            },
            500..=599 => Self::Server(status, body),
            _ => Self::Unexpected(status, body),
        }
    }

    /// Classify a transport failure.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }

    /// Returns true if this error is transient and should be retried
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Server(_, _) | Self::Timeout | Self::Network(_)
        )
    }

    /// Delay requested by the server, if any.
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}
