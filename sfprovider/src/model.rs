//! StepFun conversation and response records.
//!
//! Every record is shaped for the wire: optional fields stay `None` while a streamed turn is
//! still being assembled and are skipped when serialized.
//!
//! ```rust
//! use sfprovider::{FinishReason, Message, Role};
//!
//! let message: Message = serde_json::from_str(r#"{"role":"assistant","content":"hi"}"#)
//!     .expect("message should parse");
//! assert_eq!(message.role, Some(Role::Assistant));
//! assert_eq!(message.text(), "hi");
//!
//! let reason: FinishReason = serde_json::from_str(r#""something_new""#).expect("parse");
//! assert_eq!(reason, FinishReason::Unknown);
//! ```

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
    Unknown,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
            Self::Unknown => "",
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "system" => Self::System,
            "user" => Self::User,
            "assistant" => Self::Assistant,
            "tool" => Self::Tool,
            _ => Self::Unknown,
        }
    }
}

impl From<Role> for &'static str {
    fn from(value: Role) -> Self {
        value.as_str()
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the model stopped producing output for a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum FinishReason {
    Unknown,
    Stop,
    Length,
    /// Output withheld by the content filter.
    Sensitive,
    ToolCalls,
    NetworkError,
}

impl FinishReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "",
            Self::Stop => "stop",
            Self::Length => "length",
            Self::Sensitive => "sensitive",
            Self::ToolCalls => "tool_calls",
            Self::NetworkError => "network_error",
        }
    }
}

impl From<String> for FinishReason {
    fn from(value: String) -> Self {
        match value.as_str() {
            "stop" => Self::Stop,
            "length" => Self::Length,
            "sensitive" => Self::Sensitive,
            "tool_calls" => Self::ToolCalls,
            "network_error" => Self::NetworkError,
            _ => Self::Unknown,
        }
    }
}

impl From<FinishReason> for &'static str {
    fn from(value: FinishReason) -> Self {
        value.as_str()
    }
}

impl Display for FinishReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum ToolCallType {
    Function,
    Unknown,
}

impl From<String> for ToolCallType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "function" => Self::Function,
            _ => Self::Unknown,
        }
    }
}

impl From<ToolCallType> for &'static str {
    fn from(value: ToolCallType) -> Self {
        match value {
            ToolCallType::Function => "function",
            ToolCallType::Unknown => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FunctionInvocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// JSON-encoded arguments; only parseable once the owning call is finalized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

impl FunctionInvocation {
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            arguments: Some(arguments.into()),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn arguments(&self) -> &str {
        self.arguments.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolCallRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ToolCallType>,
    #[serde(default)]
    pub function: FunctionInvocation,
}

impl ToolCallRequest {
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            kind: Some(ToolCallType::Function),
            function: FunctionInvocation::new(name, arguments),
        }
    }

    /// A continuation fragment: no id, only an arguments slice.
    pub fn continuation(arguments: impl Into<String>) -> Self {
        Self {
            id: None,
            kind: None,
            function: FunctionInvocation {
                name: None,
                arguments: Some(arguments.into()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Function name that produced the content when the role is `tool`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallRequest>>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            role: Some(role),
            name: None,
            tool_calls: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn tool(function_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: Some(function_name.into()),
            ..Self::new(Role::Tool, content)
        }
    }

    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCallRequest>) -> Self {
        self.tool_calls = Some(tool_calls);
        self
    }

    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    pub fn tool_calls(&self) -> &[ToolCallRequest] {
        self.tool_calls.as_deref().unwrap_or_default()
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChunkChoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(default)]
    pub delta: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

/// One streamed fragment, or a logical turn once a window of fragments is merged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

/// A fully merged window of fragments.
pub type LogicalTurn = ChatCompletionChunk;

impl ChatCompletionChunk {
    pub fn first_choice(&self) -> Option<&ChunkChoice> {
        self.choices.first()
    }

    pub fn delta(&self) -> Option<&Message> {
        self.first_choice().map(|choice| &choice.delta)
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.first_choice().and_then(|choice| choice.finish_reason)
    }

    /// True when the first choice's delta carries any tool call.
    pub fn has_tool_call_delta(&self) -> bool {
        self.delta().is_some_and(Message::has_tool_calls)
    }

    pub fn is_tool_call_finish(&self) -> bool {
        self.finish_reason() == Some(FinishReason::ToolCalls)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(default)]
    pub message: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChatCompletion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ChatCompletion {
    pub fn first_choice(&self) -> Option<&Choice> {
        self.choices.first()
    }

    pub fn message(&self) -> Option<&Message> {
        self.first_choice().map(|choice| &choice.message)
    }

    pub fn has_tool_calls(&self) -> bool {
        self.message().is_some_and(Message::has_tool_calls)
    }
}

impl From<ChatCompletionChunk> for ChatCompletion {
    fn from(value: ChatCompletionChunk) -> Self {
        Self {
            id: value.id,
            object: Some("chat.completion".to_string()),
            created: value.created,
            model: value.model,
            choices: value
                .choices
                .into_iter()
                .map(|choice| Choice {
                    index: choice.index,
                    message: choice.delta,
                    finish_reason: choice.finish_reason,
                })
                .collect(),
            request_id: value.request_id,
            usage: None,
        }
    }
}

/// Known StepFun chat model identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatModel {
    Step1,
    Step1V,
    Step1K32,
    Step1VK32,
    Step1K200,
}

impl ChatModel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Step1 => "step-1",
            Self::Step1V => "step-1v",
            Self::Step1K32 => "step-1-32k",
            Self::Step1VK32 => "step-1v-32k",
            Self::Step1K200 => "step-1-200k",
        }
    }
}

impl Display for ChatModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
