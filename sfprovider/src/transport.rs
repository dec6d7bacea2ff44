//! StepFun transport trait and the reqwest-based HTTP implementation.

use std::fmt::Debug;

use crate::{
    ChatCompletion, ChatCompletionRequest, FragmentStream, ProviderError, ProviderFuture,
};

#[cfg(feature = "http")]
pub use http::StepFunHttpTransport;

pub const DEFAULT_BASE_URL: &str = "https://api.stepfun.com";
pub const DEFAULT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Executes chat completion requests against the StepFun endpoint.
pub trait StepFunTransport: Send + Sync + Debug {
    fn complete<'a>(
        &'a self,
        request: ChatCompletionRequest,
    ) -> ProviderFuture<'a, Result<ChatCompletion, ProviderError>>;

    /// Opens a server-push response and yields raw fragments in arrival order.
    fn stream<'a>(
        &'a self,
        request: ChatCompletionRequest,
    ) -> ProviderFuture<'a, Result<FragmentStream<'a>, ProviderError>>;
}

#[cfg(feature = "http")]
mod http {
    use async_stream::try_stream;
    use futures_util::StreamExt;
    use reqwest::{Client, Response};

    use super::{DEFAULT_BASE_URL, DEFAULT_COMPLETIONS_PATH, StepFunTransport};
    use crate::serde_api::{SseDecoder, SseEvent, extract_error_message};
    use crate::{
        ApiKey, ChatCompletion, ChatCompletionRequest, FragmentStream, ProviderError,
        ProviderFuture,
    };

    #[derive(Debug, Clone)]
    pub struct StepFunHttpTransport {
        client: Client,
        base_url: String,
        completions_path: String,
        api_key: ApiKey,
    }

    impl StepFunHttpTransport {
        pub fn new(client: Client, api_key: ApiKey) -> Self {
            Self {
                client,
                base_url: DEFAULT_BASE_URL.to_string(),
                completions_path: DEFAULT_COMPLETIONS_PATH.to_string(),
                api_key,
            }
        }

        pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
            self.base_url = base_url.into();
            self
        }

        pub fn with_completions_path(mut self, path: impl Into<String>) -> Self {
            self.completions_path = path.into();
            self
        }

        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        pub fn endpoint(&self) -> String {
            format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                self.completions_path.trim_start_matches('/')
            )
        }

        async fn send(&self, request: &ChatCompletionRequest) -> Result<Response, ProviderError> {
            let response = self
                .client
                .post(self.endpoint())
                .bearer_auth(self.api_key.expose())
                .json(request)
                .send()
                .await
                .map_err(|err| {
                    if err.is_timeout() {
                        ProviderError::timeout(err.to_string())
                    } else {
                        ProviderError::transport(err.to_string())
                    }
                })?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            Ok(response)
        }

        async fn parse_error(response: Response) -> ProviderError {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = extract_error_message(&body)
                .unwrap_or_else(|| format!("StepFun request failed with status {status}"));

            ProviderError::from_status(status.as_u16(), message)
        }
    }

    impl StepFunTransport for StepFunHttpTransport {
        fn complete<'a>(
            &'a self,
            request: ChatCompletionRequest,
        ) -> ProviderFuture<'a, Result<ChatCompletion, ProviderError>> {
            Box::pin(async move {
                let response = self.send(&request).await?;
                response
                    .json::<ChatCompletion>()
                    .await
                    .map_err(|err| ProviderError::malformed_response(err.to_string()))
            })
        }

        fn stream<'a>(
            &'a self,
            request: ChatCompletionRequest,
        ) -> ProviderFuture<'a, Result<FragmentStream<'a>, ProviderError>> {
            Box::pin(async move {
                let response = self.send(&request).await?;

                let stream = try_stream! {
                    let mut chunks = response.bytes_stream();
                    let mut decoder = SseDecoder::new();

                    while let Some(item) = chunks.next().await {
                        let bytes = item.map_err(|err| ProviderError::transport(err.to_string()))?;
                        for event in decoder.push(&bytes)? {
                            if let SseEvent::Fragment(fragment) = event {
                                yield fragment;
                            }
                        }

                        if decoder.is_done() {
                            break;
                        }
                    }

                    if let Some(SseEvent::Fragment(fragment)) = decoder.finish()? {
                        yield fragment;
                    }
                };

                Ok(Box::pin(stream) as FragmentStream<'a>)
            })
        }
    }

}
