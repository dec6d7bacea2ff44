//! Chat orchestration over the StepFun completion API.
//!
//! Layered options become wire requests, and the client drives the tool-calling loop for both
//! blocking and streamed calls.

mod client;
mod error;
mod hooks;
mod options;
mod request;
mod types;

pub mod prelude {
    pub use crate::{
        ChatError, ChatErrorKind, ChatErrorPhase, ChatLoopHooks, ChatOptions, ChatResponse,
        ChatResponseStream, Generation, GenerationMetadata, NoopChatLoopHooks, PreparedRequest,
        Prompt, StepFunChatClient, StepFunChatClientBuilder, build_request,
    };
    pub use sfcommon::{MetadataMap, RequestId};
    pub use sftooling::{
        DefaultToolRuntime, FunctionCallback, Tool, ToolCatalog, ToolError, ToolErrorKind,
        ToolExecutionContext, ToolExecutionResult, ToolRegistry, ToolRuntime,
    };
}

pub use client::{DEFAULT_MAX_TOOL_ROUNDS, StepFunChatClient, StepFunChatClientBuilder};
pub use error::{ChatError, ChatErrorKind, ChatErrorPhase};
pub use hooks::{ChatLoopHooks, NoopChatLoopHooks};
pub use options::{ChatOptions, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TOP_P};
pub use request::{PreparedRequest, build_request};
pub use types::{ChatResponse, ChatResponseStream, Generation, GenerationMetadata, Prompt};
pub use sfcommon::{MetadataMap, RequestId};
pub use sftooling::{
    DefaultToolRuntime, FunctionCallback, Tool, ToolCatalog, ToolError, ToolErrorKind,
    ToolExecutionContext, ToolExecutionResult, ToolRegistry, ToolRuntime,
};
