//! Client construction from [`StepFunConfig`].

use std::sync::Arc;

use reqwest::Client;

use crate::{
    ConfigError, SafeChatLoopHooks, SafeProviderHooks, SafeToolHooks, StepFunApi,
    StepFunChatClient, StepFunConfig, StepFunHttpTransport, Tool, ToolCatalog,
    TracingObservabilityHooks,
};

/// Builds the HTTP-backed API from the effective connection settings.
pub fn build_api(config: &StepFunConfig) -> Result<StepFunApi, ConfigError> {
    let base_url = config.effective_base_url()?;
    let api_key = config.effective_api_key()?;

    let http = Client::builder()
        .timeout(config.request_timeout())
        .build()
        .map_err(|err| ConfigError::transport(err.to_string()))?;

    let transport = StepFunHttpTransport::new(http, api_key).with_base_url(base_url);
    Ok(StepFunApi::new(Arc::new(transport)))
}

/// Returns `Ok(None)` when the chat section is disabled.
pub fn build_chat_client(
    config: &StepFunConfig,
    catalog: Option<Arc<dyn ToolCatalog>>,
) -> Result<Option<StepFunChatClient>, ConfigError> {
    build_chat_client_with(config, catalog, Vec::new())
}

/// Like [`build_chat_client`], registering `callbacks` on the default options. They are
/// resolvable by name but only exposed to the model when a layer enables them.
pub fn build_chat_client_with(
    config: &StepFunConfig,
    catalog: Option<Arc<dyn ToolCatalog>>,
    callbacks: Vec<Arc<dyn Tool>>,
) -> Result<Option<StepFunChatClient>, ConfigError> {
    if !config.chat.enabled {
        return Ok(None);
    }

    let api = build_api(config)?;
    let defaults = callbacks
        .into_iter()
        .fold(config.default_options()?, |options, callback| {
            options.with_function_callback(callback)
        });

    let mut builder = StepFunChatClient::builder(api)
        .with_defaults(defaults)
        .with_retry_policy(config.chat.retry.to_policy())
        .with_max_tool_rounds(config.chat.max_tool_rounds);

    if let Some(catalog) = catalog {
        builder = builder.with_catalog(catalog);
    }

    if config.tracing {
        builder = builder
            .with_provider_hooks(Arc::new(SafeProviderHooks::new(TracingObservabilityHooks)))
            .with_tool_hooks(Arc::new(SafeToolHooks::new(TracingObservabilityHooks)))
            .with_chat_hooks(Arc::new(SafeChatLoopHooks::new(TracingObservabilityHooks)));
    }

    Ok(Some(builder.build()))
}
