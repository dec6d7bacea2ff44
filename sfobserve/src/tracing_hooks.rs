//! Tracing-based observability hooks for provider, tool runtime, and chat loop phases.
//!
//! ```rust
//! use sfchat::ChatLoopHooks;
//! use sfobserve::TracingObservabilityHooks;
//!
//! fn accepts_chat_hooks(_hooks: &dyn ChatLoopHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_chat_hooks(&hooks);
//! ```

use std::time::Duration;

use sfchat::{ChatError, ChatLoopHooks};
use sfcommon::RequestId;
use sfprovider::{ModelCall, ProviderError, ProviderOperationHooks};
use sftooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ProviderOperationHooks for TracingObservabilityHooks {
    fn on_attempt_start(&self, call: &ModelCall<'_>, attempt: u32) {
        tracing::info!(
            phase = "provider",
            event = "attempt_start",
            operation = %call.operation,
            request_id = %call.request_id,
            round = call.round,
            attempt
        );
    }

    fn on_retry_scheduled(
        &self,
        call: &ModelCall<'_>,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        tracing::warn!(
            phase = "provider",
            event = "retry_scheduled",
            operation = %call.operation,
            request_id = %call.request_id,
            round = call.round,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error_kind = ?error.kind,
            status = error.status,
            error = %error
        );
    }

    fn on_success(&self, call: &ModelCall<'_>, attempts: u32) {
        tracing::info!(
            phase = "provider",
            event = "success",
            operation = %call.operation,
            request_id = %call.request_id,
            round = call.round,
            attempts
        );
    }

    fn on_failure(&self, call: &ModelCall<'_>, attempts: u32, error: &ProviderError) {
        tracing::error!(
            phase = "provider",
            event = "failure",
            operation = %call.operation,
            request_id = %call.request_id,
            round = call.round,
            attempts,
            error_kind = ?error.kind,
            status = error.status,
            retryable = error.is_retryable(),
            error = %error
        );
    }
}

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_unresolved(&self, context: &ToolExecutionContext) {
        tracing::warn!(
            phase = "tool",
            event = "unresolved",
            function = %context.function,
            tool_call_id = context.tool_call_id.as_deref(),
            request_id = context.request_id.as_ref().map(|id| id.as_str()),
            round = context.round
        );
    }

    fn on_execution_start(&self, context: &ToolExecutionContext) {
        tracing::info!(
            phase = "tool",
            event = "execution_start",
            function = %context.function,
            tool_call_id = context.tool_call_id.as_deref(),
            request_id = context.request_id.as_ref().map(|id| id.as_str()),
            round = context.round
        );
    }

    fn on_execution_success(
        &self,
        context: &ToolExecutionContext,
        result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "tool",
            event = "execution_success",
            function = %context.function,
            tool_call_id = context.tool_call_id.as_deref(),
            request_id = context.request_id.as_ref().map(|id| id.as_str()),
            round = context.round,
            output_bytes = result.output.len(),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_execution_failure(
        &self,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        tracing::error!(
            phase = "tool",
            event = "execution_failure",
            function = %context.function,
            tool_call_id = context.tool_call_id.as_deref(),
            request_id = context.request_id.as_ref().map(|id| id.as_str()),
            round = context.round,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            error = %error
        );
    }
}

impl ChatLoopHooks for TracingObservabilityHooks {
    fn on_round_start(&self, request_id: &RequestId, round: u32, stream: bool) {
        tracing::info!(
            phase = "chat",
            event = "round_start",
            request_id = %request_id,
            round,
            stream
        );
    }

    fn on_tool_dispatch(&self, request_id: &RequestId, round: u32, tool_calls: usize) {
        tracing::info!(
            phase = "chat",
            event = "tool_dispatch",
            request_id = %request_id,
            round,
            tool_calls
        );
    }

    fn on_loop_complete(&self, request_id: &RequestId, rounds: u32, elapsed: Duration) {
        tracing::info!(
            phase = "chat",
            event = "loop_complete",
            request_id = %request_id,
            rounds,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_loop_failure(&self, request_id: &RequestId, error: &ChatError, elapsed: Duration) {
        tracing::error!(
            phase = "chat",
            event = "loop_failure",
            request_id = %request_id,
            error_kind = ?error.kind,
            error_phase = ?error.phase,
            elapsed_ms = elapsed.as_millis() as u64,
            error = %error
        );
    }
}
