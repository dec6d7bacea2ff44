//! Request-level entry points over a [`StepFunTransport`].
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use sfprovider::{
//!     ChatCompletion, ChatCompletionRequest, FragmentStream, Message, ProviderError,
//!     ProviderFuture, StepFunApi, StepFunTransport,
//! };
//!
//! #[derive(Debug)]
//! struct Echo;
//!
//! impl StepFunTransport for Echo {
//!     fn complete<'a>(
//!         &'a self,
//!         _request: ChatCompletionRequest,
//!     ) -> ProviderFuture<'a, Result<ChatCompletion, ProviderError>> {
//!         Box::pin(async { Ok(ChatCompletion::default()) })
//!     }
//!
//!     fn stream<'a>(
//!         &'a self,
//!         _request: ChatCompletionRequest,
//!     ) -> ProviderFuture<'a, Result<FragmentStream<'a>, ProviderError>> {
//!         Box::pin(async { Err(ProviderError::unavailable("no stream")) })
//!     }
//! }
//!
//! let api = StepFunApi::new(Arc::new(Echo));
//! let streaming = ChatCompletionRequest::new("step-1v", vec![Message::user("hi")])
//!     .with_stream(true);
//! let future = api.chat_completion(streaming);
//! # drop(future);
//! ```

use std::sync::Arc;

use crate::{
    ChatCompletion, ChatCompletionRequest, FragmentStream, ProviderError, StepFunTransport,
};

#[derive(Debug, Clone)]
pub struct StepFunApi {
    transport: Arc<dyn StepFunTransport>,
}

impl StepFunApi {
    pub fn new(transport: Arc<dyn StepFunTransport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<dyn StepFunTransport> {
        &self.transport
    }

    /// Executes a non-streaming request; `request.stream` must be `false`.
    pub async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletion, ProviderError> {
        if request.stream {
            return Err(ProviderError::invalid_request(
                "request must not enable streaming for a blocking completion",
            ));
        }
        request.validate()?;

        tracing::debug!(
            phase = "provider",
            event = "chat_completion",
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools().len()
        );

        self.transport.complete(request).await
    }

    /// Opens a fragment stream; `request.stream` must be `true`.
    pub async fn chat_completion_stream(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<FragmentStream<'_>, ProviderError> {
        if !request.stream {
            return Err(ProviderError::invalid_request(
                "request must enable streaming for a streamed completion",
            ));
        }
        request.validate()?;

        tracing::debug!(
            phase = "provider",
            event = "chat_completion_stream",
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools().len()
        );

        self.transport.stream(request).await
    }
}
