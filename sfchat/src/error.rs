//! Chat-layer errors and classification.

use std::error::Error;
use std::fmt::{Display, Formatter};

use sfprovider::{ProviderError, ProviderErrorKind};
use sftooling::{ToolError, ToolErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    /// The caller supplied an unusable prompt.
    InvalidRequest,
    /// Runtime options failed validation while building the request.
    InvalidOptions,
    /// The stream broke an input contract, such as several tool calls in one fragment.
    ContractViolation,
    /// A requested or enabled function has no registered handler.
    UnresolvedTool,
    Provider,
    /// A handler ran and returned an error.
    Tooling,
    ToolLoopExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorPhase {
    RequestBuild,
    Model,
    Streaming,
    ToolDispatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
    pub phase: Option<ChatErrorPhase>,
    pub retryable: bool,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            phase: None,
            retryable: false,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidRequest, message)
    }

    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidOptions, message).with_phase(ChatErrorPhase::RequestBuild)
    }

    pub fn contract_violation(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::ContractViolation, message)
    }

    pub fn unresolved_tool(name: &str) -> Self {
        Self::new(
            ChatErrorKind::UnresolvedTool,
            format!("no function callback found for function name '{name}'"),
        )
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Provider, message)
    }

    pub fn tooling(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Tooling, message).with_phase(ChatErrorPhase::ToolDispatch)
    }

    pub fn tool_loop_exhausted(max_rounds: u32) -> Self {
        Self::new(
            ChatErrorKind::ToolLoopExhausted,
            format!("model kept requesting tools after {max_rounds} tool rounds"),
        )
        .with_phase(ChatErrorPhase::ToolDispatch)
    }

    pub fn with_phase(mut self, phase: ChatErrorPhase) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    /// Errors caused by configuration or caller input rather than the upstream service.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self.kind,
            ChatErrorKind::InvalidRequest
                | ChatErrorKind::InvalidOptions
                | ChatErrorKind::UnresolvedTool
        )
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.phase {
            Some(phase) => write!(f, "{:?} [{:?}]: {}", self.kind, phase, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for ChatError {}

impl From<ProviderError> for ChatError {
    fn from(value: ProviderError) -> Self {
        let kind = match value.kind {
            ProviderErrorKind::ContractViolation => ChatErrorKind::ContractViolation,
            _ => ChatErrorKind::Provider,
        };

        Self {
            kind,
            message: value.to_string(),
            phase: None,
            retryable: value.is_retryable(),
        }
    }
}

impl From<ToolError> for ChatError {
    fn from(value: ToolError) -> Self {
        let kind = match value.kind {
            ToolErrorKind::Unresolved => ChatErrorKind::UnresolvedTool,
            _ => ChatErrorKind::Tooling,
        };

        Self {
            kind,
            message: value.to_string(),
            phase: Some(ChatErrorPhase::ToolDispatch),
            retryable: false,
        }
    }
}
