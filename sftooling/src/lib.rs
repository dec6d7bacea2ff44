//! Function callbacks, tool catalogs, and the tool execution runtime.
//!
//! ```rust
//! use sfprovider::{ToolCallRequest, ToolDefinition};
//! use sftooling::{FunctionCallback, ToolCatalog, ToolRegistry};
//!
//! let mut registry = ToolRegistry::new();
//! registry.register(FunctionCallback::from_sync(
//!     ToolDefinition {
//!         name: "weather".to_string(),
//!         description: "Current weather for a city".to_string(),
//!         input_schema: r#"{"type":"object","properties":{"city":{"type":"string"}}}"#.to_string(),
//!     },
//!     |_args, _ctx| Ok(r#"{"sky":"clear"}"#.to_string()),
//! ));
//!
//! let call = ToolCallRequest::function("call_1", "weather", r#"{"city":"Shanghai"}"#);
//! assert!(registry.resolve(call.function.name()).is_some());
//! ```

mod args;
mod error;
mod hooks;
mod registry;
mod runtime;
mod tool;
mod types;

pub mod prelude {
    pub use crate::{
        DefaultToolRuntime, FunctionCallback, LayeredToolCatalog, Tool, ToolCatalog, ToolError,
        ToolErrorKind, ToolExecutionContext, ToolExecutionResult, ToolFuture, ToolRegistry,
        ToolRuntime, ToolRuntimeHooks,
    };
}

pub use args::{parse_arguments, parse_json_object, parse_json_value, required_string};
pub use error::{ToolError, ToolErrorKind};
pub use hooks::{NoopToolRuntimeHooks, ToolRuntimeHooks};
pub use registry::{LayeredToolCatalog, ToolCatalog, ToolRegistry};
pub use runtime::{DefaultToolRuntime, ToolRuntime};
pub use tool::{FunctionCallback, Tool, ToolFuture};
pub use types::{ToolExecutionContext, ToolExecutionResult};
