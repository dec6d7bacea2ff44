use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use stepfun::prelude::*;
use stepfun::{
    ChatCompletion, ChatCompletionChunk, ChatCompletionRequest, FinishReason, FragmentStream,
    ProviderError, ProviderFuture, RetryPolicy, StepFunApi, StepFunTransport, ToolCallRequest,
};
use stepfun::sfprovider::{Choice, ChunkChoice, VecFragmentStream};

#[derive(Debug, Default)]
struct RecordingTransport {
    requests: Mutex<Vec<ChatCompletionRequest>>,
}

impl RecordingTransport {
    fn requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl StepFunTransport for RecordingTransport {
    fn complete<'a>(
        &'a self,
        request: ChatCompletionRequest,
    ) -> ProviderFuture<'a, Result<ChatCompletion, ProviderError>> {
        Box::pin(async move {
            let first_round = request.messages.len() == 1;
            self.requests.lock().expect("requests lock").push(request);

            let message = if first_round {
                Message::default()
                    .with_tool_calls(vec![ToolCallRequest::function("call-1", "clock", "{}")])
            } else {
                Message::assistant("It is noon.")
            };

            Ok(ChatCompletion {
                choices: vec![Choice {
                    index: Some(0),
                    message,
                    finish_reason: Some(FinishReason::Stop),
                }],
                ..ChatCompletion::default()
            })
        })
    }

    fn stream<'a>(
        &'a self,
        request: ChatCompletionRequest,
    ) -> ProviderFuture<'a, Result<FragmentStream<'a>, ProviderError>> {
        Box::pin(async move {
            self.requests.lock().expect("requests lock").push(request);
            let fragment = ChatCompletionChunk {
                id: Some("turn-1".to_string()),
                choices: vec![ChunkChoice {
                    index: Some(0),
                    delta: Message::assistant("tick"),
                    finish_reason: Some(FinishReason::Stop),
                }],
                ..ChatCompletionChunk::default()
            };
            Ok(Box::pin(VecFragmentStream::new(vec![Ok(fragment)])) as FragmentStream<'a>)
        })
    }
}

fn clock() -> Arc<dyn Tool> {
    Arc::new(FunctionCallback::from_sync(
        ToolDefinition {
            name: "clock".to_string(),
            description: "Current time".to_string(),
            input_schema: r#"{"type":"object"}"#.to_string(),
        },
        |_, _| Ok("12:00".to_string()),
    ))
}

fn client_from_config(
    config: &StepFunConfig,
    transport: Arc<RecordingTransport>,
) -> StepFunChatClient {
    let defaults = config
        .default_options()
        .expect("options should validate")
        .with_function_callback(clock());

    StepFunChatClient::builder(StepFunApi::new(transport))
        .with_defaults(defaults)
        .with_retry_policy(RetryPolicy::no_retry())
        .build()
}

#[tokio::test]
async fn default_callbacks_run_once_enabled_by_name() {
    let transport = Arc::new(RecordingTransport::default());
    let config = StepFunConfig::from_lookup(|name| {
        (name == stepfun::CHAT_MODEL_ENV).then(|| "step-1-32k".to_string())
    });
    let client = client_from_config(&config, transport.clone());

    let prompt = sf_prompt![user => "what time is it?"]
        .with_options(ChatOptions::new().with_function("clock"));
    let response = client.call(prompt).await.expect("call should converge");

    assert_eq!(response.text(), "It is noon.");

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].model, "step-1-32k");
    assert_eq!(requests[0].tools().len(), 1);
    assert_eq!(requests[1].messages[2].text(), "12:00");
}

#[tokio::test]
async fn default_callbacks_stay_hidden_until_enabled() {
    let transport = Arc::new(RecordingTransport::default());
    let client = client_from_config(&StepFunConfig::new("sk-test"), transport.clone());

    let mut stream = client
        .stream(sf_prompt![user => "tick?"])
        .await
        .expect("stream should open");
    let first = stream
        .next()
        .await
        .expect("one turn")
        .expect("turn should succeed");
    assert_eq!(first.text(), "tick");
    assert!(stream.next().await.is_none());
    drop(stream);

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].stream);
    assert!(requests[0].tools.is_none());
}
