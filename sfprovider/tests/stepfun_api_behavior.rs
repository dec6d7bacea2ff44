use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use sfprovider::{
    ChatCompletion, ChatCompletionChunk, ChatCompletionRequest, Choice, ChunkChoice, FinishReason,
    FragmentStream, Message, ProviderError, ProviderErrorKind, ProviderFuture, StepFunApi,
    StepFunTransport, ToolCallRequest, Usage, VecFragmentStream, segment_turns,
};

#[derive(Debug, Default)]
struct FakeTransport {
    captured_requests: Mutex<Vec<ChatCompletionRequest>>,
    fragments: Mutex<Vec<Result<ChatCompletionChunk, ProviderError>>>,
}

impl FakeTransport {
    fn with_fragments(fragments: Vec<Result<ChatCompletionChunk, ProviderError>>) -> Self {
        Self {
            captured_requests: Mutex::new(Vec::new()),
            fragments: Mutex::new(fragments),
        }
    }

    fn captured(&self) -> Vec<ChatCompletionRequest> {
        self.captured_requests.lock().expect("requests lock").clone()
    }
}

impl StepFunTransport for FakeTransport {
    fn complete<'a>(
        &'a self,
        request: ChatCompletionRequest,
    ) -> ProviderFuture<'a, Result<ChatCompletion, ProviderError>> {
        Box::pin(async move {
            let model = request.model.clone();
            self.captured_requests
                .lock()
                .expect("requests lock")
                .push(request);

            Ok(ChatCompletion {
                id: Some("cmpl-1".to_string()),
                model: Some(model),
                choices: vec![Choice {
                    index: Some(0),
                    message: Message::assistant("hello world"),
                    finish_reason: Some(FinishReason::Stop),
                }],
                usage: Some(Usage {
                    prompt_tokens: 7,
                    completion_tokens: 3,
                    total_tokens: 10,
                }),
                ..ChatCompletion::default()
            })
        })
    }

    fn stream<'a>(
        &'a self,
        request: ChatCompletionRequest,
    ) -> ProviderFuture<'a, Result<FragmentStream<'a>, ProviderError>> {
        Box::pin(async move {
            self.captured_requests
                .lock()
                .expect("requests lock")
                .push(request);
            let fragments = std::mem::take(&mut *self.fragments.lock().expect("fragments lock"));
            Ok(Box::pin(VecFragmentStream::new(fragments)) as FragmentStream<'a>)
        })
    }
}

fn fragment(delta: Message, finish_reason: Option<FinishReason>) -> ChatCompletionChunk {
    ChatCompletionChunk {
        id: Some("turn-1".to_string()),
        object: Some("chat.completion.chunk".to_string()),
        model: Some("step-1v".to_string()),
        choices: vec![ChunkChoice {
            index: Some(0),
            delta,
            finish_reason,
        }],
        ..ChatCompletionChunk::default()
    }
}

#[tokio::test]
async fn chat_completion_forwards_request_and_returns_aggregate() {
    let transport = Arc::new(FakeTransport::default());
    let api = StepFunApi::new(transport.clone());
    let request = ChatCompletionRequest::new("step-1v", vec![Message::user("hi")])
        .with_request_id("req-1");

    let completion = api
        .chat_completion(request)
        .await
        .expect("completion should succeed");

    assert_eq!(completion.message().map(Message::text), Some("hello world"));
    assert_eq!(completion.usage.map(|usage| usage.total_tokens), Some(10));

    let captured = transport.captured();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].request_id.as_deref(), Some("req-1"));
    assert!(!captured[0].stream);
}

#[tokio::test]
async fn stream_flag_must_match_the_entry_point() {
    let transport = Arc::new(FakeTransport::default());
    let api = StepFunApi::new(transport.clone());
    let request = ChatCompletionRequest::new("step-1v", vec![Message::user("hi")]);

    let error = api
        .chat_completion(request.clone().with_stream(true))
        .await
        .expect_err("streaming request must be rejected");
    assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);

    let error = api
        .chat_completion_stream(request)
        .await
        .err()
        .expect("blocking request must be rejected");
    assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);

    assert!(transport.captured().is_empty());
}

#[tokio::test]
async fn streamed_fragments_reassemble_into_logical_turns() {
    let transport = Arc::new(FakeTransport::with_fragments(vec![
        Ok(fragment(Message::assistant("Let me "), None)),
        Ok(fragment(Message::assistant("look."), None)),
        Ok(fragment(
            Message::default().with_tool_calls(vec![ToolCallRequest::function(
                "t1", "lookup", "{\"q\":",
            )]),
            None,
        )),
        Ok(fragment(
            Message::default().with_tool_calls(vec![ToolCallRequest::continuation("\"x\"}")]),
            Some(FinishReason::ToolCalls),
        )),
    ]));
    let api = StepFunApi::new(transport.clone());
    let request =
        ChatCompletionRequest::new("step-1v", vec![Message::user("find x")]).with_stream(true);

    let fragments = api
        .chat_completion_stream(request)
        .await
        .expect("stream should open");
    let turns = segment_turns(fragments)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .expect("turns should merge");

    assert_eq!(turns.len(), 3);
    assert_eq!(turns[0].delta().map(Message::text), Some("Let me "));
    assert_eq!(turns[1].delta().map(Message::text), Some("look."));

    let tool_turn = &turns[2];
    assert!(tool_turn.is_tool_call_finish());
    let calls = tool_turn.delta().expect("delta").tool_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].function.name(), "lookup");
    assert_eq!(calls[0].function.arguments(), "{\"q\":\"x\"}");
    assert!(transport.captured()[0].stream);
}

#[tokio::test]
async fn contract_violation_in_stream_surfaces_as_error() {
    let transport = Arc::new(FakeTransport::with_fragments(vec![Ok(fragment(
        Message::default().with_tool_calls(vec![
            ToolCallRequest::function("a", "first", "{}"),
            ToolCallRequest::function("b", "second", "{}"),
        ]),
        None,
    ))]));
    let api = StepFunApi::new(transport);
    let request =
        ChatCompletionRequest::new("step-1v", vec![Message::user("hi")]).with_stream(true);

    let fragments = api
        .chat_completion_stream(request)
        .await
        .expect("stream should open");
    let turns = segment_turns(fragments).collect::<Vec<_>>().await;

    assert_eq!(turns.len(), 1);
    let error = turns[0].as_ref().expect_err("merge should fail");
    assert_eq!(error.kind, ProviderErrorKind::ContractViolation);
}
