//! Retries for StepFun model calls.
//!
//! Every attempt belongs to one model round of one conversation, so hooks see the same
//! request id and round number the chat loop reports.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::time::Duration;

use sfcommon::RequestId;

use crate::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelOperation {
    Completion,
    Stream,
}

impl ModelOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completion => "chat_completion",
            Self::Stream => "chat_completion_stream",
        }
    }
}

impl Display for ModelOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The model round an attempt belongs to.
#[derive(Debug, Clone, Copy)]
pub struct ModelCall<'a> {
    pub operation: ModelOperation,
    pub request_id: &'a RequestId,
    /// One-based, matching the tool round numbering of the chat loop.
    pub round: u32,
}

impl<'a> ModelCall<'a> {
    pub fn completion(request_id: &'a RequestId, round: u32) -> Self {
        Self {
            operation: ModelOperation::Completion,
            request_id,
            round,
        }
    }

    pub fn stream(request_id: &'a RequestId, round: u32) -> Self {
        Self {
            operation: ModelOperation::Stream,
            request_id,
            round,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts per model round, including the first.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    pub fn no_retry() -> Self {
        Self::new(1)
    }

    /// Delay before the attempt following `failed_attempt`, or `None` when the round is over.
    pub fn next_delay(&self, failed_attempt: u32, error: &ProviderError) -> Option<Duration> {
        if !error.is_retryable() || failed_attempt >= self.max_attempts {
            return None;
        }

        let exponent = failed_attempt.saturating_sub(1) as i32;
        let scaled = self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        Some(Duration::from_secs_f64(scaled.min(self.max_backoff.as_secs_f64())))
    }
}

/// Observes the attempts of each model round. Every method defaults to a no-op.
pub trait ProviderOperationHooks: Send + Sync {
    fn on_attempt_start(&self, _call: &ModelCall<'_>, _attempt: u32) {}

    fn on_retry_scheduled(
        &self,
        _call: &ModelCall<'_>,
        _attempt: u32,
        _delay: Duration,
        _error: &ProviderError,
    ) {
    }

    fn on_success(&self, _call: &ModelCall<'_>, _attempts: u32) {}

    fn on_failure(&self, _call: &ModelCall<'_>, _attempts: u32, _error: &ProviderError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOperationHooks;

impl ProviderOperationHooks for NoopOperationHooks {}

/// Issues `execute` for one model round until it succeeds or `policy` gives up. `sleep` is
/// awaited between attempts.
pub async fn execute_with_retry<T, Op, OpFuture, Sleep, SleepFuture>(
    call: ModelCall<'_>,
    policy: &RetryPolicy,
    hooks: &dyn ProviderOperationHooks,
    mut execute: Op,
    mut sleep: Sleep,
) -> Result<T, ProviderError>
where
    Op: FnMut(u32) -> OpFuture,
    OpFuture: Future<Output = Result<T, ProviderError>>,
    Sleep: FnMut(Duration) -> SleepFuture,
    SleepFuture: Future<Output = ()>,
{
    let mut attempt = 1;

    loop {
        hooks.on_attempt_start(&call, attempt);

        let error = match execute(attempt).await {
            Ok(value) => {
                hooks.on_success(&call, attempt);
                return Ok(value);
            }
            Err(error) => error,
        };

        let Some(delay) = policy.next_delay(attempt, &error) else {
            tracing::debug!(
                phase = "model",
                event = "attempts_exhausted",
                operation = %call.operation,
                request_id = %call.request_id,
                round = call.round,
                attempts = attempt
            );
            hooks.on_failure(&call, attempt, &error);
            return Err(error);
        };

        hooks.on_retry_scheduled(&call, attempt, delay, &error);
        sleep(delay).await;
        attempt += 1;
    }
}
