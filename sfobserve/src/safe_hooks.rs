use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use sfchat::{ChatError, ChatLoopHooks};
use sfcommon::RequestId;
use sfprovider::{ModelCall, ProviderError, ProviderOperationHooks};
use sftooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

pub struct SafeProviderHooks<H> {
    inner: H,
}

impl<H> SafeProviderHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ProviderOperationHooks for SafeProviderHooks<H>
where
    H: ProviderOperationHooks,
{
    fn on_attempt_start(&self, call: &ModelCall<'_>, attempt: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_attempt_start(call, attempt)));
    }

    fn on_retry_scheduled(
        &self,
        call: &ModelCall<'_>,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_retry_scheduled(call, attempt, delay, error)
        }));
    }

    fn on_success(&self, call: &ModelCall<'_>, attempts: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_success(call, attempts)));
    }

    fn on_failure(&self, call: &ModelCall<'_>, attempts: u32, error: &ProviderError) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_failure(call, attempts, error)));
    }
}

pub struct SafeToolHooks<H> {
    inner: H,
}

impl<H> SafeToolHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ToolRuntimeHooks for SafeToolHooks<H>
where
    H: ToolRuntimeHooks,
{
    fn on_unresolved(&self, context: &ToolExecutionContext) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_unresolved(context)));
    }

    fn on_execution_start(&self, context: &ToolExecutionContext) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_execution_start(context)));
    }

    fn on_execution_success(
        &self,
        context: &ToolExecutionContext,
        result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_execution_success(context, result, elapsed)
        }));
    }

    fn on_execution_failure(
        &self,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_execution_failure(context, error, elapsed)
        }));
    }
}

pub struct SafeChatLoopHooks<H> {
    inner: H,
}

impl<H> SafeChatLoopHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ChatLoopHooks for SafeChatLoopHooks<H>
where
    H: ChatLoopHooks,
{
    fn on_round_start(&self, request_id: &RequestId, round: u32, stream: bool) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_round_start(request_id, round, stream)
        }));
    }

    fn on_tool_dispatch(&self, request_id: &RequestId, round: u32, tool_calls: usize) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_tool_dispatch(request_id, round, tool_calls)
        }));
    }

    fn on_loop_complete(&self, request_id: &RequestId, rounds: u32, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_loop_complete(request_id, rounds, elapsed)
        }));
    }

    fn on_loop_failure(&self, request_id: &RequestId, error: &ChatError, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_loop_failure(request_id, error, elapsed)
        }));
    }
}
