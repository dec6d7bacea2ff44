//! Failures while dispatching a model-issued tool call.
//!
//! Tool calls are never retried: a failure aborts the tool round it happened in, so the error
//! records where in the conversation it occurred instead of a retry hint.

use std::error::Error;
use std::fmt::{Display, Formatter};

use sfprovider::ToolCallRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorKind {
    /// The model named a function no catalog layer resolves.
    Unresolved,
    InvalidArguments,
    Execution,
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
    pub function: Option<String>,
    pub tool_call_id: Option<String>,
    /// One-based tool round the call belonged to; zero when dispatched outside a loop.
    pub round: u32,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            function: None,
            tool_call_id: None,
            round: 0,
        }
    }

    pub fn unresolved(function: &str) -> Self {
        Self::new(
            ToolErrorKind::Unresolved,
            format!("no function callback found for function name '{function}'"),
        )
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidArguments, message)
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Execution, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Timeout, message)
    }

    /// Attaches the call that failed and the round it was dispatched in.
    pub fn for_call(mut self, tool_call: &ToolCallRequest, round: u32) -> Self {
        self.function = Some(tool_call.function.name().to_string());
        self.tool_call_id = tool_call.id.clone();
        self.round = round;
        self
    }
}

impl Display for ToolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(function) = &self.function {
            write!(f, " [function={function}")?;
            if let Some(id) = &self.tool_call_id {
                write!(f, ", call_id={id}")?;
            }
            if self.round > 0 {
                write!(f, ", round={}", self.round)?;
            }
            f.write_str("]")?;
        }
        write!(f, ": {}", self.message)
    }
}

impl Error for ToolError {}
