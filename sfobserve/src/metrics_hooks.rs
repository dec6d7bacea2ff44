//! Metrics-based observability hooks for provider, tool runtime, and chat loop phases.
//!
//! ```rust
//! use sfobserve::MetricsObservabilityHooks;
//! use sfprovider::ProviderOperationHooks;
//!
//! fn accepts_provider_hooks(_hooks: &dyn ProviderOperationHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_provider_hooks(&hooks);
//! ```

use std::time::Duration;

use sfchat::{ChatError, ChatLoopHooks};
use sfcommon::RequestId;
use sfprovider::{ModelCall, ProviderError, ProviderOperationHooks};
use sftooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl ProviderOperationHooks for MetricsObservabilityHooks {
    fn on_attempt_start(&self, call: &ModelCall<'_>, _attempt: u32) {
        metrics::counter!(
            "stepfun_provider_attempt_start_total",
            "operation" => call.operation.as_str()
        )
        .increment(1);
    }

    fn on_retry_scheduled(
        &self,
        call: &ModelCall<'_>,
        _attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        metrics::counter!(
            "stepfun_provider_retry_scheduled_total",
            "operation" => call.operation.as_str(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "stepfun_provider_retry_delay_seconds",
            "operation" => call.operation.as_str()
        )
        .record(delay.as_secs_f64());
    }

    fn on_success(&self, call: &ModelCall<'_>, attempts: u32) {
        metrics::counter!(
            "stepfun_provider_success_total",
            "operation" => call.operation.as_str()
        )
        .increment(1);
        metrics::histogram!(
            "stepfun_provider_attempts_per_success",
            "operation" => call.operation.as_str()
        )
        .record(attempts as f64);
    }

    fn on_failure(&self, call: &ModelCall<'_>, attempts: u32, error: &ProviderError) {
        let status = error
            .status
            .map_or_else(|| "none".to_string(), |status| status.to_string());
        metrics::counter!(
            "stepfun_provider_failure_total",
            "operation" => call.operation.as_str(),
            "error_kind" => format!("{:?}", error.kind),
            "status" => status
        )
        .increment(1);
        metrics::histogram!(
            "stepfun_provider_attempts_per_failure",
            "operation" => call.operation.as_str()
        )
        .record(attempts as f64);
    }
}

impl ToolRuntimeHooks for MetricsObservabilityHooks {
    fn on_unresolved(&self, context: &ToolExecutionContext) {
        metrics::counter!(
            "stepfun_tool_unresolved_total",
            "function" => context.function.clone()
        )
        .increment(1);
    }

    fn on_execution_start(&self, context: &ToolExecutionContext) {
        metrics::counter!(
            "stepfun_tool_execution_start_total",
            "function" => context.function.clone()
        )
        .increment(1);
    }

    fn on_execution_success(
        &self,
        context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "stepfun_tool_execution_success_total",
            "function" => context.function.clone()
        )
        .increment(1);
        metrics::histogram!(
            "stepfun_tool_execution_duration_seconds",
            "function" => context.function.clone(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_execution_failure(
        &self,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "stepfun_tool_execution_failure_total",
            "function" => context.function.clone(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "stepfun_tool_execution_duration_seconds",
            "function" => context.function.clone(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}

impl ChatLoopHooks for MetricsObservabilityHooks {
    fn on_round_start(&self, _request_id: &RequestId, _round: u32, stream: bool) {
        metrics::counter!(
            "stepfun_chat_round_total",
            "mode" => if stream { "stream" } else { "call" }
        )
        .increment(1);
    }

    fn on_tool_dispatch(&self, _request_id: &RequestId, _round: u32, tool_calls: usize) {
        metrics::histogram!("stepfun_chat_tool_calls_per_round").record(tool_calls as f64);
    }

    fn on_loop_complete(&self, _request_id: &RequestId, rounds: u32, elapsed: Duration) {
        metrics::counter!("stepfun_chat_loop_complete_total").increment(1);
        metrics::histogram!("stepfun_chat_rounds_per_loop").record(rounds as f64);
        metrics::histogram!("stepfun_chat_loop_duration_seconds", "status" => "success")
            .record(elapsed.as_secs_f64());
    }

    fn on_loop_failure(&self, _request_id: &RequestId, error: &ChatError, elapsed: Duration) {
        metrics::counter!(
            "stepfun_chat_loop_failure_total",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!("stepfun_chat_loop_duration_seconds", "status" => "failure")
            .record(elapsed.as_secs_f64());
    }
}
