//! Observation points of a tool round.
//!
//! Every callback receives the call's [`ToolExecutionContext`], so request id, round, function
//! name and call id line up with the chat loop's own events.
//!
//! ```rust
//! use sftooling::{NoopToolRuntimeHooks, ToolExecutionContext, ToolRuntimeHooks};
//!
//! let context = ToolExecutionContext::new().with_request_id("req-1").with_round(1);
//! NoopToolRuntimeHooks.on_unresolved(&context);
//! ```

use std::time::Duration;

use crate::{ToolError, ToolExecutionContext, ToolExecutionResult};

pub trait ToolRuntimeHooks: Send + Sync {
    /// No catalog layer resolves `context.function`; no handler runs.
    fn on_unresolved(&self, _context: &ToolExecutionContext) {}

    fn on_execution_start(&self, _context: &ToolExecutionContext) {}

    fn on_execution_success(
        &self,
        _context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        _elapsed: Duration,
    ) {
    }

    fn on_execution_failure(
        &self,
        _context: &ToolExecutionContext,
        _error: &ToolError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToolRuntimeHooks;

impl ToolRuntimeHooks for NoopToolRuntimeHooks {}
