//! Small convenience constructors for common types.

use crate::{ChatModel, Message, Prompt, Role};

pub fn system_message(content: impl Into<String>) -> Message {
    Message::new(Role::System, content)
}

pub fn user_message(content: impl Into<String>) -> Message {
    Message::new(Role::User, content)
}

pub fn assistant_message(content: impl Into<String>) -> Message {
    Message::new(Role::Assistant, content)
}

/// Tool-role message carrying a function's output.
pub fn tool_message(function_name: impl Into<String>, content: impl Into<String>) -> Message {
    Message::tool(function_name, content)
}

pub fn prompt(messages: Vec<Message>) -> Prompt {
    Prompt::new(messages)
}

pub fn parse_chat_model(value: &str) -> Option<ChatModel> {
    match value.trim().to_ascii_lowercase().as_str() {
        "step-1" | "step1" => Some(ChatModel::Step1),
        "step-1v" | "step1v" => Some(ChatModel::Step1V),
        "step-1-32k" => Some(ChatModel::Step1K32),
        "step-1v-32k" => Some(ChatModel::Step1VK32),
        "step-1-200k" => Some(ChatModel::Step1K200),
        _ => None,
    }
}
