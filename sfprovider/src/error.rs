//! Errors raised while talking to the StepFun chat completions endpoint.
//!
//! HTTP failures keep the status code they were classified from; retryability follows from the
//! kind alone.
//!
//! ```rust
//! use sfprovider::{ProviderError, ProviderErrorKind};
//!
//! let throttled = ProviderError::from_status(429, "too many requests");
//! assert_eq!(throttled.kind, ProviderErrorKind::RateLimited);
//! assert_eq!(throttled.status, Some(429));
//! assert!(throttled.is_retryable());
//!
//! assert!(!ProviderError::contract_violation("two tool calls").is_retryable());
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// 401 or 403: the bearer key was rejected.
    Authentication,
    RateLimited,
    /// Rejected by the endpoint, or refused locally before sending.
    InvalidRequest,
    Timeout,
    /// 5xx from the endpoint.
    Unavailable,
    /// Connection or body transfer failed.
    Transport,
    /// A completion body or SSE payload did not decode.
    MalformedResponse,
    /// The fragment stream broke an assumption the merge relies on.
    ContractViolation,
}

impl ProviderErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::Timeout | Self::Unavailable | Self::Transport
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    /// HTTP status of the failed StepFun response, when there was one.
    pub status: Option<u16>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    /// Classifies a non-success StepFun response.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let kind = match status {
            401 | 403 => ProviderErrorKind::Authentication,
            429 => ProviderErrorKind::RateLimited,
            408 | 504 => ProviderErrorKind::Timeout,
            400 | 404 | 413 | 422 => ProviderErrorKind::InvalidRequest,
            500..=599 => ProviderErrorKind::Unavailable,
            _ => ProviderErrorKind::Transport,
        };

        Self {
            status: Some(status),
            ..Self::new(kind, message)
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidRequest, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Timeout, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Unavailable, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Transport, message)
    }

    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::MalformedResponse, message)
    }

    pub fn contract_violation(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::ContractViolation, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{:?} (HTTP {status}): {}", self.kind, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for ProviderError {}
