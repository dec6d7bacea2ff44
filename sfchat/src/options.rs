//! Layered chat options.
//!
//! Every wire field is optional; a `None` inherits from the layer below when layers are
//! resolved. Function enablement is additive across layers instead.
//!
//! ```rust
//! use sfchat::ChatOptions;
//!
//! let defaults = ChatOptions::stepfun_defaults();
//! let runtime = ChatOptions::new().with_temperature(0.2);
//!
//! let effective = ChatOptions::resolve(&defaults, Some(&runtime), None);
//! assert_eq!(effective.temperature, Some(0.2));
//! assert_eq!(effective.model.as_deref(), Some("step-1v"));
//! assert_eq!(effective.max_tokens, Some(2048));
//! ```

use std::collections::BTreeSet;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sfprovider::{ChatCompletionRequest, ChatModel, FunctionTool, Message, ToolChoice};
use sftooling::Tool;

use crate::ChatError;

pub const DEFAULT_MODEL: ChatModel = ChatModel::Step1V;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;
pub const DEFAULT_TEMPERATURE: f32 = 0.5;
pub const DEFAULT_TOP_P: f32 = 0.9;

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_sample: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<FunctionTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Names of functions to expose to the model for this layer.
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub functions: BTreeSet<String>,
    /// Handlers carried by the options themselves.
    #[serde(skip)]
    pub function_callbacks: Vec<Arc<dyn Tool>>,
}

impl ChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library defaults used when no other layer sets a value.
    pub fn stepfun_defaults() -> Self {
        Self {
            model: Some(DEFAULT_MODEL.as_str().to_string()),
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            do_sample: Some(true),
            temperature: Some(DEFAULT_TEMPERATURE),
            top_p: Some(DEFAULT_TOP_P),
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_do_sample(mut self, do_sample: bool) -> Self {
        self.do_sample = Some(do_sample);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn with_tools(mut self, tools: Vec<FunctionTool>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        self.tool_choice = Some(tool_choice);
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_function(mut self, name: impl Into<String>) -> Self {
        self.functions.insert(name.into());
        self
    }

    pub fn with_function_callback(mut self, callback: Arc<dyn Tool>) -> Self {
        self.function_callbacks.push(callback);
        self
    }

    pub fn function_callback_names(&self) -> impl Iterator<Item = String> + '_ {
        self.function_callbacks.iter().map(|callback| callback.name())
    }

    /// Field-wise overlay: each value set on `higher` replaces the one on `self`.
    pub fn overlay(&self, higher: &ChatOptions) -> ChatOptions {
        ChatOptions {
            model: higher.model.clone().or_else(|| self.model.clone()),
            max_tokens: higher.max_tokens.or(self.max_tokens),
            do_sample: higher.do_sample.or(self.do_sample),
            temperature: higher.temperature.or(self.temperature),
            top_p: higher.top_p.or(self.top_p),
            stop: higher.stop.clone().or_else(|| self.stop.clone()),
            tools: higher.tools.clone().or_else(|| self.tools.clone()),
            tool_choice: higher.tool_choice.clone().or_else(|| self.tool_choice.clone()),
            user: higher.user.clone().or_else(|| self.user.clone()),
            functions: self.functions.union(&higher.functions).cloned().collect(),
            function_callbacks: higher
                .function_callbacks
                .iter()
                .chain(self.function_callbacks.iter())
                .cloned()
                .collect(),
        }
    }

    /// Resolves defaults, then per-call options, then computed tool declarations.
    pub fn resolve(
        defaults: &ChatOptions,
        runtime: Option<&ChatOptions>,
        tools_layer: Option<&ChatOptions>,
    ) -> ChatOptions {
        let mut effective = defaults.clone();
        for layer in [runtime, tools_layer].into_iter().flatten() {
            effective = effective.overlay(layer);
        }
        effective
    }

    pub fn validate(&self) -> Result<(), ChatError> {
        if let Some(model) = &self.model {
            if model.trim().is_empty() {
                return Err(ChatError::invalid_options("model must not be empty"));
            }
        }

        if self.max_tokens == Some(0) {
            return Err(ChatError::invalid_options(
                "max_tokens must be greater than zero",
            ));
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ChatError::invalid_options(format!(
                    "temperature must be in 0.0..=2.0, got {temperature}"
                )));
            }
        }

        if let Some(top_p) = self.top_p {
            if !(0.0..=1.0).contains(&top_p) {
                return Err(ChatError::invalid_options(format!(
                    "top_p must be in 0.0..=1.0, got {top_p}"
                )));
            }
        }

        Ok(())
    }

    /// Copies the wire fields onto a request; function fields stay client-side.
    pub fn to_request(
        &self,
        messages: Vec<Message>,
        stream: bool,
    ) -> Result<ChatCompletionRequest, ChatError> {
        let model = self
            .model
            .clone()
            .filter(|model| !model.trim().is_empty())
            .ok_or_else(|| ChatError::invalid_options("no model configured on any options layer"))?;

        let mut request = ChatCompletionRequest::new(model, messages).with_stream(stream);
        request.max_tokens = self.max_tokens;
        request.do_sample = self.do_sample;
        request.temperature = self.temperature;
        request.top_p = self.top_p;
        request.stop = self.stop.clone();
        request.tools = self.tools.clone().filter(|tools| !tools.is_empty());
        request.tool_choice = self.tool_choice.clone();
        request.user = self.user.clone();
        Ok(request)
    }
}

impl Debug for ChatOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatOptions")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("do_sample", &self.do_sample)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("stop", &self.stop)
            .field("tools", &self.tools)
            .field("tool_choice", &self.tool_choice)
            .field("user", &self.user)
            .field("functions", &self.functions)
            .field(
                "function_callbacks",
                &self.function_callback_names().collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sfprovider::ToolDefinition;
    use sftooling::FunctionCallback;

    use super::*;
    use crate::ChatErrorKind;

    fn callback(name: &str) -> Arc<dyn Tool> {
        Arc::new(FunctionCallback::from_sync(
            ToolDefinition {
                name: name.to_string(),
                description: String::new(),
                input_schema: "{}".to_string(),
            },
            |_, _| Ok(String::new()),
        ))
    }

    #[test]
    fn higher_layers_replace_lower_values_field_by_field() {
        let defaults = ChatOptions::stepfun_defaults().with_user("default-user");
        let runtime = ChatOptions::new()
            .with_model("step-1-32k")
            .with_stop(vec!["END".to_string()]);
        let tools_layer = ChatOptions::new().with_tools(vec![FunctionTool::new(
            "lookup",
            "",
            json!({"type": "object"}),
        )]);

        let effective = ChatOptions::resolve(&defaults, Some(&runtime), Some(&tools_layer));
        assert_eq!(effective.model.as_deref(), Some("step-1-32k"));
        assert_eq!(effective.temperature, Some(DEFAULT_TEMPERATURE));
        assert_eq!(effective.top_p, Some(DEFAULT_TOP_P));
        assert_eq!(effective.do_sample, Some(true));
        assert_eq!(effective.stop, Some(vec!["END".to_string()]));
        assert_eq!(effective.user.as_deref(), Some("default-user"));
        assert_eq!(effective.tools.map(|tools| tools.len()), Some(1));
    }

    #[test]
    fn function_enablement_is_additive() {
        let defaults = ChatOptions::new()
            .with_function("clock")
            .with_function_callback(callback("weather"));
        let runtime = ChatOptions::new()
            .with_function("lookup")
            .with_function_callback(callback("search"));

        let effective = ChatOptions::resolve(&defaults, Some(&runtime), None);
        assert_eq!(
            effective.functions.into_iter().collect::<Vec<_>>(),
            vec!["clock", "lookup"]
        );
        assert_eq!(
            effective.function_callbacks.iter().map(|tool| tool.name()).collect::<Vec<_>>(),
            vec!["search", "weather"]
        );
    }

    #[test]
    fn validate_rejects_malformed_runtime_options() {
        for options in [
            ChatOptions::new().with_temperature(2.5),
            ChatOptions::new().with_top_p(-0.1),
            ChatOptions::new().with_max_tokens(0),
            ChatOptions::new().with_model("  "),
        ] {
            let error = options.validate().expect_err("options must be rejected");
            assert_eq!(error.kind, ChatErrorKind::InvalidOptions);
        }

        assert!(ChatOptions::stepfun_defaults().validate().is_ok());
    }

    #[test]
    fn to_request_copies_wire_fields_and_requires_a_model() {
        let request = ChatOptions::stepfun_defaults()
            .with_tool_choice(ToolChoice::auto())
            .with_function("lookup")
            .to_request(vec![Message::user("hi")], true)
            .expect("request should build");

        assert_eq!(request.model, "step-1v");
        assert_eq!(request.max_tokens, Some(2048));
        assert_eq!(request.do_sample, Some(true));
        assert_eq!(request.tool_choice, Some(ToolChoice::auto()));
        assert!(request.stream);
        assert!(request.tools.is_none());

        let error = ChatOptions::new()
            .to_request(vec![Message::user("hi")], false)
            .expect_err("model is required");
        assert_eq!(error.kind, ChatErrorKind::InvalidOptions);
    }

    #[test]
    fn options_deserialize_without_callbacks() {
        let options: ChatOptions = serde_json::from_value(json!({
            "model": "step-1-200k",
            "temperature": 0.1,
            "functions": ["lookup"]
        }))
        .expect("options should parse");

        assert_eq!(options.model.as_deref(), Some("step-1-200k"));
        assert!(options.functions.contains("lookup"));
        assert!(options.function_callbacks.is_empty());
    }
}
