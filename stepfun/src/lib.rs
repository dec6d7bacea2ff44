//! Unified facade over the StepFun chat workspace crates.
//!
//! This crate is designed to be the single dependency for most applications. It re-exports the
//! workspace crates and turns a [`StepFunConfig`] into a ready [`StepFunChatClient`].

mod client;
mod config;
mod macros;

pub mod prelude;
pub mod util;

pub use sfchat;
pub use sfcommon;
pub use sfobserve;
pub use sfprovider;
pub use sftooling;

pub use sfchat::{
    ChatError, ChatErrorKind, ChatErrorPhase, ChatLoopHooks, ChatOptions, ChatResponse,
    ChatResponseStream, DEFAULT_MAX_TOOL_ROUNDS, Generation, GenerationMetadata,
    NoopChatLoopHooks, PreparedRequest, Prompt, StepFunChatClient, StepFunChatClientBuilder,
    build_request,
};
pub use sfcommon::{BoxFuture, MetadataMap, RequestId};
pub use sfobserve::{
    MetricsObservabilityHooks, SafeChatLoopHooks, SafeProviderHooks, SafeToolHooks,
    TracingObservabilityHooks,
};
pub use sfprovider::{
    ApiKey, ChatCompletion, ChatCompletionChunk, ChatCompletionRequest, ChatModel, FinishReason,
    FragmentStream, FunctionTool, LogicalTurn, Message, ModelCall, ModelOperation,
    NoopOperationHooks, ProviderError,
    ProviderErrorKind, ProviderFuture, ProviderOperationHooks, RetryPolicy, Role, StepFunApi,
    StepFunHttpTransport, StepFunTransport, ToolCallRequest, ToolChoice, ToolDefinition,
    TurnStream, Usage, merge, segment_turns,
};
pub use sftooling::{
    DefaultToolRuntime, FunctionCallback, LayeredToolCatalog, NoopToolRuntimeHooks, Tool,
    ToolCatalog, ToolError, ToolErrorKind, ToolExecutionContext, ToolExecutionResult, ToolRegistry,
    ToolRuntime, ToolRuntimeHooks, parse_arguments, parse_json_object, parse_json_value,
    required_string,
};

pub use client::{build_api, build_chat_client, build_chat_client_with};
pub use config::{
    API_KEY_ENV, BASE_URL_ENV, CHAT_MODEL_ENV, ChatConfig, ConfigError, ConfigErrorKind,
    RetryConfig, StepFunConfig,
};
pub use util::{
    assistant_message, parse_chat_model, prompt, system_message, tool_message, user_message,
};
