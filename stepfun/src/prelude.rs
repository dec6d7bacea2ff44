//! Common imports for most StepFun applications.

pub use crate::{
    assistant_message, build_api, build_chat_client, build_chat_client_with, parse_chat_model,
    prompt, system_message, tool_message, user_message,
};
pub use crate::{sf_messages, sf_msg, sf_prompt};
pub use crate::{
    ChatError, ChatErrorKind, ChatOptions, ChatResponse, ChatResponseStream, ConfigError,
    FunctionCallback, Message, Prompt, Role, StepFunChatClient, StepFunConfig, Tool, ToolCatalog,
    ToolChoice, ToolDefinition, ToolError, ToolRegistry,
};
