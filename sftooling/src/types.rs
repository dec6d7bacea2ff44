//! Per-call dispatch context and execution results.

use sfcommon::RequestId;
use sfprovider::{Message, ToolCallRequest};

/// Where a tool call sits in the conversation. The runtime fills in the call fields before
/// handlers and hooks see it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolExecutionContext {
    pub request_id: Option<RequestId>,
    /// One-based tool round within the current conversation.
    pub round: u32,
    pub function: String,
    pub tool_call_id: Option<String>,
}

impl ToolExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_id(mut self, request_id: impl Into<RequestId>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_round(mut self, round: u32) -> Self {
        self.round = round;
        self
    }

    /// Copy of this context describing `tool_call`.
    pub fn for_call(&self, tool_call: &ToolCallRequest) -> Self {
        Self {
            function: tool_call.function.name().to_string(),
            tool_call_id: tool_call.id.clone(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolExecutionResult {
    pub tool_call_id: Option<String>,
    pub function_name: String,
    pub output: String,
}

impl ToolExecutionResult {
    pub fn from_call(call: &ToolCallRequest, output: impl Into<String>) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            function_name: call.function.name().to_string(),
            output: output.into(),
        }
    }

    /// Tool-role message named after the function that produced it.
    pub fn into_message(self) -> Message {
        Message::tool(self.function_name, self.output)
    }
}
