//! StepFun wire model, streamed-turn reconstruction, and transport plumbing.
//!
//! ```rust
//! use sfprovider::{
//!     ChatCompletionChunk, ChunkChoice, FinishReason, Message, ToolCallRequest,
//!     segment_fragments,
//! };
//!
//! let call = |tool_call: ToolCallRequest, finish: Option<FinishReason>| ChatCompletionChunk {
//!     choices: vec![ChunkChoice {
//!         delta: Message::default().with_tool_calls(vec![tool_call]),
//!         finish_reason: finish,
//!         ..ChunkChoice::default()
//!     }],
//!     ..ChatCompletionChunk::default()
//! };
//!
//! let turns = segment_fragments(vec![
//!     call(ToolCallRequest::function("t1", "lookup", "{\"q\":"), None),
//!     call(ToolCallRequest::continuation("\"x\"}"), Some(FinishReason::ToolCalls)),
//! ])
//! .expect("fragments should segment");
//!
//! let calls = turns[0].delta().expect("delta").tool_calls();
//! assert_eq!(calls[0].function.arguments(), "{\"q\":\"x\"}");
//! ```

pub mod api;
pub mod error;
pub mod merge;
pub mod model;
pub mod prelude;
pub mod request;
pub mod resilience;
pub mod secret;
pub mod segment;
pub mod serde_api;
pub mod stream;
pub mod transport;

pub use sfcommon::BoxFuture;

pub type ProviderFuture<'a, T> = BoxFuture<'a, T>;

pub use api::StepFunApi;
pub use error::{ProviderError, ProviderErrorKind};
pub use merge::merge;
pub use model::{
    ChatCompletion, ChatCompletionChunk, ChatModel, Choice, ChunkChoice, FinishReason,
    FunctionInvocation, LogicalTurn, Message, Role, ToolCallRequest, ToolCallType, Usage,
};
pub use request::{
    ChatCompletionRequest, FunctionDeclaration, FunctionTool, NamedFunction, NamedToolChoice,
    ToolChoice, ToolChoiceMode, ToolDefinition,
};
pub use resilience::{
    ModelCall, ModelOperation, NoopOperationHooks, ProviderOperationHooks, RetryPolicy,
    execute_with_retry,
};
pub use secret::ApiKey;
pub use segment::{TurnSegmenter, segment_fragments, segment_turns};
pub use serde_api::{SseDecoder, SseEvent};
pub use stream::{FragmentStream, TurnStream, VecFragmentStream};
#[cfg(feature = "http")]
pub use transport::StepFunHttpTransport;
pub use transport::{DEFAULT_BASE_URL, DEFAULT_COMPLETIONS_PATH, StepFunTransport};
