//! Assembles wire requests from layered options and resolves the functions they expose.

use std::collections::BTreeSet;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use sfprovider::{ChatCompletionRequest, FunctionTool, Message};
use sftooling::{LayeredToolCatalog, ToolCatalog, ToolRegistry};

use crate::{ChatError, ChatOptions};

/// A built request plus the catalog its tool calls must be dispatched against.
#[derive(Clone)]
pub struct PreparedRequest {
    pub request: ChatCompletionRequest,
    pub options: ChatOptions,
    pub catalog: Arc<dyn ToolCatalog>,
    /// Sorted names of the functions declared on the request.
    pub functions: Vec<String>,
}

impl Debug for PreparedRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedRequest")
            .field("request", &self.request)
            .field("options", &self.options)
            .field("functions", &self.functions)
            .finish_non_exhaustive()
    }
}

/// Builds a request for `history`.
///
/// Lookup order for function names is runtime callbacks, then default callbacks, then the
/// external `catalog`.
pub fn build_request(
    history: &[Message],
    runtime: Option<&ChatOptions>,
    defaults: &ChatOptions,
    catalog: Option<Arc<dyn ToolCatalog>>,
    stream: bool,
) -> Result<PreparedRequest, ChatError> {
    if history.is_empty() {
        return Err(ChatError::invalid_request(
            "prompt must contain at least one message",
        ));
    }

    if let Some(runtime) = runtime {
        runtime.validate()?;
    }

    let catalog = layered_catalog(runtime, defaults, catalog);
    let enabled = enabled_functions(runtime, defaults);

    let mut function_tools = Vec::with_capacity(enabled.len());
    for name in &enabled {
        let tool = catalog
            .resolve(name)
            .ok_or_else(|| ChatError::unresolved_tool(name))?;
        let declaration = FunctionTool::try_from(tool.definition())
            .map_err(|err| ChatError::invalid_options(err.message))?;
        function_tools.push(declaration);
    }

    let tools_layer = (!function_tools.is_empty())
        .then(|| ChatOptions::new().with_tools(function_tools));
    let options = ChatOptions::resolve(defaults, runtime, tools_layer.as_ref());
    let request = options.to_request(history.to_vec(), stream)?;

    tracing::debug!(
        phase = "request_build",
        event = "request_built",
        model = %request.model,
        messages = request.messages.len(),
        functions = enabled.len(),
        stream
    );

    Ok(PreparedRequest {
        request,
        options,
        catalog,
        functions: enabled.into_iter().collect(),
    })
}

fn enabled_functions(runtime: Option<&ChatOptions>, defaults: &ChatOptions) -> BTreeSet<String> {
    let mut enabled = defaults.functions.clone();
    if let Some(runtime) = runtime {
        enabled.extend(runtime.functions.iter().cloned());
        enabled.extend(runtime.function_callback_names());
    }
    enabled
}

fn layered_catalog(
    runtime: Option<&ChatOptions>,
    defaults: &ChatOptions,
    external: Option<Arc<dyn ToolCatalog>>,
) -> Arc<dyn ToolCatalog> {
    let mut catalog = LayeredToolCatalog::new();
    if let Some(runtime) = runtime.filter(|options| !options.function_callbacks.is_empty()) {
        catalog.push_layer(Arc::new(ToolRegistry::from_tools(
            runtime.function_callbacks.iter().cloned(),
        )));
    }

    if !defaults.function_callbacks.is_empty() {
        catalog.push_layer(Arc::new(ToolRegistry::from_tools(
            defaults.function_callbacks.iter().cloned(),
        )));
    }

    if let Some(external) = external {
        catalog.push_layer(external);
    }

    Arc::new(catalog)
}
