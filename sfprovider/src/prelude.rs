//! Common `sfprovider` imports for downstream crates.

pub use crate::{
    ChatCompletion, ChatCompletionChunk, ChatCompletionRequest, ChatModel, FinishReason,
    FragmentStream, FunctionTool, LogicalTurn, Message, ModelCall, NoopOperationHooks, ProviderError,
    ProviderErrorKind, ProviderFuture, ProviderOperationHooks, RetryPolicy, Role, StepFunApi,
    StepFunTransport, ToolCallRequest, ToolChoice, ToolDefinition, TurnStream, Usage,
    execute_with_retry, merge, segment_turns,
};
pub use sfcommon::{BoxFuture, MetadataMap};
