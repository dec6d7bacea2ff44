//! The StepFun chat client: blocking and streaming calls with a bounded tool-calling loop.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_stream::try_stream;
use futures_util::StreamExt;
use sfcommon::RequestId;
use sfprovider::{
    ChatCompletion, ChatCompletionRequest, FragmentStream, LogicalTurn, Message, ModelCall,
    NoopOperationHooks, ProviderOperationHooks, RetryPolicy, Role, StepFunApi,
    execute_with_retry, segment_turns,
};
use sftooling::{
    DefaultToolRuntime, NoopToolRuntimeHooks, ToolCatalog, ToolExecutionContext, ToolRuntime,
    ToolRuntimeHooks,
};

use crate::request::build_request;
use crate::{
    ChatError, ChatErrorPhase, ChatLoopHooks, ChatOptions, ChatResponse, ChatResponseStream,
    NoopChatLoopHooks, Prompt,
};

pub const DEFAULT_MAX_TOOL_ROUNDS: u32 = 10;

#[derive(Clone)]
pub struct StepFunChatClient {
    api: StepFunApi,
    defaults: ChatOptions,
    catalog: Option<Arc<dyn ToolCatalog>>,
    retry_policy: RetryPolicy,
    max_tool_rounds: u32,
    tool_timeout: Option<Duration>,
    provider_hooks: Arc<dyn ProviderOperationHooks>,
    tool_hooks: Arc<dyn ToolRuntimeHooks>,
    chat_hooks: Arc<dyn ChatLoopHooks>,
}

impl std::fmt::Debug for StepFunChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepFunChatClient")
            .field("api", &self.api)
            .field("defaults", &self.defaults)
            .field("retry_policy", &self.retry_policy)
            .field("max_tool_rounds", &self.max_tool_rounds)
            .field("tool_timeout", &self.tool_timeout)
            .finish_non_exhaustive()
    }
}

impl StepFunChatClient {
    pub fn new(api: StepFunApi) -> Self {
        Self::builder(api).build()
    }

    pub fn builder(api: StepFunApi) -> StepFunChatClientBuilder {
        StepFunChatClientBuilder::new(api)
    }

    pub fn defaults(&self) -> &ChatOptions {
        &self.defaults
    }

    pub fn max_tool_rounds(&self) -> u32 {
        self.max_tool_rounds
    }

    /// Runs a conversation to its final answer, dispatching any requested tools in between.
    pub async fn call(&self, prompt: Prompt) -> Result<ChatResponse, ChatError> {
        let started = Instant::now();
        let request_id = prompt.request_id.clone().unwrap_or_else(RequestId::generate);

        let outcome = self.call_inner(prompt, &request_id).await;
        match outcome {
            Ok(outcome) => {
                self.chat_hooks
                    .on_loop_complete(&request_id, outcome.rounds, started.elapsed());
                Ok(outcome.into_response())
            }
            Err(error) => {
                self.chat_hooks
                    .on_loop_failure(&request_id, &error, started.elapsed());
                Err(error)
            }
        }
    }

    /// Streams logical turns. A turn that finishes with tool calls is replaced by the aggregate
    /// answer of the tool loop it triggers.
    pub async fn stream<'a>(&'a self, prompt: Prompt) -> Result<ChatResponseStream<'a>, ChatError> {
        let started = Instant::now();
        let Prompt {
            messages,
            options,
            request_id,
        } = prompt;
        let request_id = request_id.unwrap_or_else(RequestId::generate);

        let opened = self
            .open_stream(&messages, options.as_ref(), &request_id)
            .await;
        let (request, runtime, fragments) = match opened {
            Ok(opened) => opened,
            Err(error) => {
                self.chat_hooks
                    .on_loop_failure(&request_id, &error, started.elapsed());
                return Err(error);
            }
        };

        Ok(Box::pin(try_stream! {
            let mut turns = segment_turns(fragments);
            let mut roles = HashMap::<String, Role>::new();
            let mut rounds = 1;

            while let Some(turn) = turns.next().await {
                let outcome = match turn {
                    Ok(turn) => {
                        self.handle_turn(turn, &request, &runtime, &request_id, &mut roles)
                            .await
                    }
                    Err(error) => Err(ChatError::from(error).with_phase(ChatErrorPhase::Streaming)),
                };

                match outcome {
                    Ok((response, extra_rounds)) => {
                        rounds += extra_rounds;
                        yield response;
                    }
                    Err(error) => {
                        self.chat_hooks.on_loop_failure(&request_id, &error, started.elapsed());
                        Err::<(), ChatError>(error)?;
                    }
                }
            }

            self.chat_hooks.on_loop_complete(&request_id, rounds, started.elapsed());
        }))
    }

    async fn call_inner(
        &self,
        prompt: Prompt,
        request_id: &RequestId,
    ) -> Result<ToolLoopOutcome, ChatError> {
        let prepared = build_request(
            &prompt.messages,
            prompt.options.as_ref(),
            &self.defaults,
            self.catalog.clone(),
            false,
        )?;
        let request = prepared.request.with_request_id(request_id.as_str());
        let runtime = self.tool_runtime(prepared.catalog);

        self.run_tool_loop(request, &runtime, request_id, 0).await
    }

    async fn open_stream<'a>(
        &'a self,
        messages: &[Message],
        options: Option<&ChatOptions>,
        request_id: &RequestId,
    ) -> Result<(ChatCompletionRequest, DefaultToolRuntime, FragmentStream<'a>), ChatError> {
        let prepared = build_request(messages, options, &self.defaults, self.catalog.clone(), true)?;
        let request = prepared.request.with_request_id(request_id.as_str());
        let runtime = self.tool_runtime(prepared.catalog);

        self.chat_hooks.on_round_start(request_id, 1, true);
        let api = &self.api;
        let fragments = execute_with_retry(
            ModelCall::stream(request_id, 1),
            &self.retry_policy,
            self.provider_hooks.as_ref(),
            |_| api.chat_completion_stream(request.clone()),
            futures_timer::Delay::new,
        )
        .await
        .map_err(|error| ChatError::from(error).with_phase(ChatErrorPhase::Model))?;

        Ok((request, runtime, fragments))
    }

    async fn handle_turn(
        &self,
        turn: LogicalTurn,
        request: &ChatCompletionRequest,
        runtime: &DefaultToolRuntime,
        request_id: &RequestId,
        roles: &mut HashMap<String, Role>,
    ) -> Result<(ChatResponse, u32), ChatError> {
        if turn.is_tool_call_finish() && turn.has_tool_call_delta() {
            let assistant = turn.delta().cloned().unwrap_or_default();
            self.ensure_round_budget(0)?;

            let tool_messages = self
                .dispatch_tools(runtime, &assistant, request_id, 1)
                .await?;
            let next = continuation(request, assistant, tool_messages);
            let outcome = self.run_tool_loop(next, runtime, request_id, 1).await?;
            let rounds = outcome.rounds;
            return Ok((outcome.into_response(), rounds));
        }

        let observed = turn.delta().and_then(|delta| delta.role).unwrap_or(Role::Assistant);
        let role = match &turn.id {
            Some(id) => *roles.entry(id.clone()).or_insert(observed),
            None => observed,
        };

        Ok((ChatResponse::from_turn(turn, role), 0))
    }

    /// Alternates model rounds and tool dispatch until the model answers without tool calls.
    async fn run_tool_loop(
        &self,
        mut request: ChatCompletionRequest,
        runtime: &DefaultToolRuntime,
        request_id: &RequestId,
        mut dispatched: u32,
    ) -> Result<ToolLoopOutcome, ChatError> {
        let mut rounds = 0;

        loop {
            let round = dispatched + 1;
            rounds += 1;
            self.chat_hooks.on_round_start(request_id, round, false);

            let completion = self
                .complete(&request, ModelCall::completion(request_id, round))
                .await?;
            let assistant = match completion.message() {
                Some(message) if message.has_tool_calls() => message.clone(),
                _ => return Ok(ToolLoopOutcome::finish(request, completion, rounds)),
            };

            self.ensure_round_budget(dispatched)?;
            let tool_messages = self
                .dispatch_tools(runtime, &assistant, request_id, round)
                .await?;
            request = continuation(&request, assistant, tool_messages);
            dispatched += 1;
        }
    }

    async fn complete(
        &self,
        request: &ChatCompletionRequest,
        call: ModelCall<'_>,
    ) -> Result<ChatCompletion, ChatError> {
        let api = &self.api;
        execute_with_retry(
            call,
            &self.retry_policy,
            self.provider_hooks.as_ref(),
            |_| api.chat_completion(request.clone()),
            futures_timer::Delay::new,
        )
        .await
        .map_err(|error| ChatError::from(error).with_phase(ChatErrorPhase::Model))
    }

    /// Runs each requested tool in order. The first failure aborts the loop.
    async fn dispatch_tools(
        &self,
        runtime: &DefaultToolRuntime,
        assistant: &Message,
        request_id: &RequestId,
        round: u32,
    ) -> Result<Vec<Message>, ChatError> {
        let tool_calls = assistant.tool_calls();
        self.chat_hooks
            .on_tool_dispatch(request_id, round, tool_calls.len());
        tracing::debug!(
            phase = "tool_dispatch",
            event = "dispatch_started",
            request_id = %request_id,
            round,
            tool_calls = tool_calls.len()
        );

        let mut messages = Vec::with_capacity(tool_calls.len());
        for tool_call in tool_calls {
            let context = ToolExecutionContext::new()
                .with_request_id(request_id.clone())
                .with_round(round);
            let result = runtime.execute(tool_call.clone(), context).await?;
            messages.push(result.into_message());
        }

        Ok(messages)
    }

    fn ensure_round_budget(&self, dispatched: u32) -> Result<(), ChatError> {
        if dispatched >= self.max_tool_rounds {
            return Err(ChatError::tool_loop_exhausted(self.max_tool_rounds));
        }
        Ok(())
    }

    fn tool_runtime(&self, catalog: Arc<dyn ToolCatalog>) -> DefaultToolRuntime {
        let runtime = DefaultToolRuntime::new(catalog).with_hooks(self.tool_hooks.clone());
        match self.tool_timeout {
            Some(timeout) => runtime.with_timeout(timeout),
            None => runtime,
        }
    }
}

/// Next-round request: prior messages, the assistant turn that asked for tools, then one
/// tool-role message per result.
fn continuation(
    request: &ChatCompletionRequest,
    mut assistant: Message,
    tool_messages: Vec<Message>,
) -> ChatCompletionRequest {
    assistant.role.get_or_insert(Role::Assistant);

    let mut next = request.clone().with_stream(false);
    next.messages.push(assistant);
    next.messages.extend(tool_messages);
    next
}

/// Final completion of a tool loop together with the conversation that produced it.
struct ToolLoopOutcome {
    completion: ChatCompletion,
    history: Vec<Message>,
    /// Model rounds issued by this loop.
    rounds: u32,
}

impl ToolLoopOutcome {
    fn finish(request: ChatCompletionRequest, completion: ChatCompletion, rounds: u32) -> Self {
        let mut history = request.messages;
        if let Some(answer) = completion.message() {
            let mut answer = answer.clone();
            answer.role.get_or_insert(Role::Assistant);
            history.push(answer);
        }

        Self {
            completion,
            history,
            rounds,
        }
    }

    fn into_response(self) -> ChatResponse {
        into_response(self.completion).with_history(self.history)
    }
}

fn into_response(completion: ChatCompletion) -> ChatResponse {
    if completion.choices.is_empty() {
        tracing::warn!(
            phase = "model",
            event = "empty_response",
            id = completion.id.as_deref().unwrap_or_default(),
            "completion carried no choices"
        );
    }
    ChatResponse::from_completion(completion)
}

pub struct StepFunChatClientBuilder {
    api: StepFunApi,
    defaults: ChatOptions,
    catalog: Option<Arc<dyn ToolCatalog>>,
    retry_policy: RetryPolicy,
    max_tool_rounds: u32,
    tool_timeout: Option<Duration>,
    provider_hooks: Arc<dyn ProviderOperationHooks>,
    tool_hooks: Arc<dyn ToolRuntimeHooks>,
    chat_hooks: Arc<dyn ChatLoopHooks>,
}

impl StepFunChatClientBuilder {
    pub fn new(api: StepFunApi) -> Self {
        Self {
            api,
            defaults: ChatOptions::stepfun_defaults(),
            catalog: None,
            retry_policy: RetryPolicy::default(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            tool_timeout: None,
            provider_hooks: Arc::new(NoopOperationHooks),
            tool_hooks: Arc::new(NoopToolRuntimeHooks),
            chat_hooks: Arc::new(NoopChatLoopHooks),
        }
    }

    pub fn with_defaults(mut self, defaults: ChatOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// External catalog consulted after the default and runtime callbacks.
    pub fn with_catalog(mut self, catalog: Arc<dyn ToolCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn with_max_tool_rounds(mut self, max_tool_rounds: u32) -> Self {
        self.max_tool_rounds = max_tool_rounds;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = Some(timeout);
        self
    }

    pub fn with_provider_hooks(mut self, hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.provider_hooks = hooks;
        self
    }

    pub fn with_tool_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.tool_hooks = hooks;
        self
    }

    pub fn with_chat_hooks(mut self, hooks: Arc<dyn ChatLoopHooks>) -> Self {
        self.chat_hooks = hooks;
        self
    }

    pub fn build(self) -> StepFunChatClient {
        StepFunChatClient {
            api: self.api,
            defaults: self.defaults,
            catalog: self.catalog,
            retry_policy: self.retry_policy,
            max_tool_rounds: self.max_tool_rounds,
            tool_timeout: self.tool_timeout,
            provider_hooks: self.provider_hooks,
            tool_hooks: self.tool_hooks,
            chat_hooks: self.chat_hooks,
        }
    }
}
