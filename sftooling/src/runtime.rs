//! Tool runtime trait and the default catalog-backed executor.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::{Either, select};
use sfprovider::ToolCallRequest;

use crate::{
    NoopToolRuntimeHooks, Tool, ToolCatalog, ToolError, ToolExecutionContext, ToolExecutionResult,
    ToolFuture, ToolRuntimeHooks,
};

pub trait ToolRuntime: Send + Sync {
    fn execute<'a>(
        &'a self,
        tool_call: ToolCallRequest,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolExecutionResult, ToolError>>;
}

#[derive(Clone)]
pub struct DefaultToolRuntime {
    catalog: Arc<dyn ToolCatalog>,
    hooks: Arc<dyn ToolRuntimeHooks>,
    timeout: Option<Duration>,
}

impl DefaultToolRuntime {
    pub fn new(catalog: Arc<dyn ToolCatalog>) -> Self {
        Self {
            catalog,
            hooks: Arc::new(NoopToolRuntimeHooks),
            timeout: None,
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Bounds each handler invocation; an elapsed timer fails the call with a timeout error.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn catalog(&self) -> Arc<dyn ToolCatalog> {
        Arc::clone(&self.catalog)
    }

    /// Runs the resolved handler, bounded by the configured timeout.
    async fn invoke(
        &self,
        tool: Arc<dyn Tool>,
        tool_call: &ToolCallRequest,
        context: &ToolExecutionContext,
    ) -> Result<ToolExecutionResult, ToolError> {
        let invocation = tool.invoke(tool_call.function.arguments(), context);
        let output = match self.timeout {
            Some(limit) => match select(invocation, futures_timer::Delay::new(limit)).await {
                Either::Left((output, _)) => output?,
                Either::Right(_) => {
                    return Err(ToolError::timeout(format!(
                        "function '{}' did not finish within {}ms",
                        context.function,
                        limit.as_millis()
                    )));
                }
            },
            None => invocation.await?,
        };

        Ok(ToolExecutionResult::from_call(tool_call, output))
    }
}

impl ToolRuntime for DefaultToolRuntime {
    fn execute<'a>(
        &'a self,
        tool_call: ToolCallRequest,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolExecutionResult, ToolError>> {
        Box::pin(async move {
            let context = context.for_call(&tool_call);
            let Some(tool) = self.catalog.resolve(&context.function) else {
                self.hooks.on_unresolved(&context);
                return Err(
                    ToolError::unresolved(&context.function).for_call(&tool_call, context.round)
                );
            };

            let started = Instant::now();
            self.hooks.on_execution_start(&context);

            match self.invoke(tool, &tool_call, &context).await {
                Ok(result) => {
                    self.hooks
                        .on_execution_success(&context, &result, started.elapsed());
                    Ok(result)
                }
                Err(error) => {
                    let error = error.for_call(&tool_call, context.round);
                    self.hooks
                        .on_execution_failure(&context, &error, started.elapsed());
                    Err(error)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use sfprovider::{Role, ToolDefinition};

    use super::*;
    use crate::{FunctionCallback, ToolErrorKind, ToolRegistry};

    fn definition(name: &str) -> ToolDefinition {
        ToolDefinition {
            name: name.to_string(),
            description: format!("{name} tool"),
            input_schema: "{\"type\":\"object\"}".to_string(),
        }
    }

    fn registry() -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        registry.register(FunctionCallback::new(definition("echo"), |args, context| async move {
            Ok(format!(
                "request={} call={} args={args}",
                context
                    .request_id
                    .as_ref()
                    .map(|id| id.as_str().to_string())
                    .unwrap_or_default(),
                context.tool_call_id.unwrap_or_default()
            ))
        }));
        registry.register(FunctionCallback::from_sync(definition("broken"), |_, _| {
            Err(ToolError::execution("tool exploded"))
        }));
        registry.register(FunctionCallback::new(definition("slow"), |_, _| async move {
            futures_timer::Delay::new(Duration::from_secs(5)).await;
            Ok("late".to_string())
        }));
        Arc::new(registry)
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl RecordingHooks {
        fn push(&self, event: String) {
            self.events.lock().expect("events lock").push(event);
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().expect("events lock").clone()
        }
    }

    impl ToolRuntimeHooks for RecordingHooks {
        fn on_unresolved(&self, context: &ToolExecutionContext) {
            self.push(format!("unresolved:{}:{}", context.function, context.round));
        }

        fn on_execution_start(&self, context: &ToolExecutionContext) {
            self.push(format!("start:{}:{}", context.function, context.round));
        }

        fn on_execution_success(
            &self,
            context: &ToolExecutionContext,
            _result: &ToolExecutionResult,
            _elapsed: Duration,
        ) {
            self.push(format!("success:{}", context.function));
        }

        fn on_execution_failure(
            &self,
            context: &ToolExecutionContext,
            error: &ToolError,
            _elapsed: Duration,
        ) {
            self.push(format!("failure:{}:{:?}", context.function, error.kind));
        }
    }

    #[tokio::test]
    async fn runtime_executes_registered_tool_with_call_context() {
        let hooks = Arc::new(RecordingHooks::default());
        let runtime = DefaultToolRuntime::new(registry()).with_hooks(hooks.clone());

        let result = runtime
            .execute(
                ToolCallRequest::function("call_1", "echo", "{\"q\":1}"),
                ToolExecutionContext::new().with_request_id("req-1").with_round(1),
            )
            .await
            .expect("execution should succeed");

        assert_eq!(result.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(result.output, "request=req-1 call=call_1 args={\"q\":1}");

        let message = result.into_message();
        assert_eq!(message.role, Some(Role::Tool));
        assert_eq!(message.name.as_deref(), Some("echo"));

        assert_eq!(hooks.events(), vec!["start:echo:1", "success:echo"]);
    }

    #[tokio::test]
    async fn unresolved_function_never_starts_a_handler() {
        let hooks = Arc::new(RecordingHooks::default());
        let runtime = DefaultToolRuntime::new(registry()).with_hooks(hooks.clone());

        let error = runtime
            .execute(
                ToolCallRequest::function("call_2", "missing", "{}"),
                ToolExecutionContext::new().with_round(3),
            )
            .await
            .expect_err("execution should fail");

        assert_eq!(error.kind, ToolErrorKind::Unresolved);
        assert_eq!(error.function.as_deref(), Some("missing"));
        assert_eq!(error.tool_call_id.as_deref(), Some("call_2"));
        assert_eq!(error.round, 3);

        assert_eq!(hooks.events(), vec!["unresolved:missing:3"]);
    }

    #[tokio::test]
    async fn runtime_propagates_tool_execution_error() {
        let hooks = Arc::new(RecordingHooks::default());
        let runtime = DefaultToolRuntime::new(registry()).with_hooks(hooks.clone());

        let error = runtime
            .execute(
                ToolCallRequest::function("call_3", "broken", "{}"),
                ToolExecutionContext::new().with_round(1),
            )
            .await
            .expect_err("execution should fail");

        assert_eq!(error.kind, ToolErrorKind::Execution);
        assert_eq!(error.message, "tool exploded");
        assert_eq!(error.round, 1);
        assert_eq!(hooks.events(), vec!["start:broken:1", "failure:broken:Execution"]);
    }

    #[tokio::test]
    async fn runtime_times_out_slow_handlers() {
        let runtime = DefaultToolRuntime::new(registry()).with_timeout(Duration::from_millis(20));

        let error = runtime
            .execute(
                ToolCallRequest::function("call_4", "slow", "{}"),
                ToolExecutionContext::new(),
            )
            .await
            .expect_err("execution should time out");

        assert_eq!(error.kind, ToolErrorKind::Timeout);
        assert!(error.message.contains("'slow'"));
    }
}
