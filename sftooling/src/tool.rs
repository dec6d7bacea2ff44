//! Tool trait contract and the closure-backed function callback.
//!
//! ```rust
//! use sfprovider::ToolDefinition;
//! use sftooling::{FunctionCallback, Tool};
//!
//! let tool = FunctionCallback::new(
//!     ToolDefinition {
//!         name: "echo".to_string(),
//!         description: "Echoes input".to_string(),
//!         input_schema: r#"{"type":"object"}"#.to_string(),
//!     },
//!     |args, _ctx| async move { Ok(args) },
//! );
//!
//! assert_eq!(tool.name(), "echo");
//! ```

use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

use sfcommon::BoxFuture;
use sfprovider::ToolDefinition;

use crate::{ToolError, ToolExecutionContext};

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

/// A callable the model may invoke by function name.
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    fn name(&self) -> String {
        self.definition().name
    }

    /// Runs the tool with finalized JSON arguments and returns the text handed back to the model.
    fn invoke<'a>(
        &'a self,
        args_json: &'a str,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<String, ToolError>>;
}

type CallbackHandler = dyn Fn(String, ToolExecutionContext) -> ToolFuture<'static, Result<String, ToolError>>
    + Send
    + Sync;

#[derive(Clone)]
pub struct FunctionCallback {
    definition: ToolDefinition,
    handler: Arc<CallbackHandler>,
}

impl FunctionCallback {
    pub fn new<F, Fut>(definition: ToolDefinition, handler: F) -> Self
    where
        F: Fn(String, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, ToolError>> + Send + 'static,
    {
        let handler: Arc<CallbackHandler> =
            Arc::new(move |args_json, context| Box::pin(handler(args_json, context)));

        Self {
            definition,
            handler,
        }
    }

    pub fn from_sync<F>(definition: ToolDefinition, handler: F) -> Self
    where
        F: Fn(String, ToolExecutionContext) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        Self::new(definition, move |args_json, context| {
            let output = handler(args_json, context);
            async move { output }
        })
    }
}

impl Debug for FunctionCallback {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionCallback")
            .field("name", &self.definition.name)
            .finish_non_exhaustive()
    }
}

impl Tool for FunctionCallback {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn name(&self) -> String {
        self.definition.name.clone()
    }

    fn invoke<'a>(
        &'a self,
        args_json: &'a str,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<String, ToolError>> {
        (self.handler)(args_json.to_string(), context.clone())
    }
}
