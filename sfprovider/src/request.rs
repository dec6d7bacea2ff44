//! Chat completion request records and tool declarations.
//!
//! ```rust
//! use sfprovider::{ChatCompletionRequest, Message, ToolChoice};
//!
//! let request = ChatCompletionRequest::new("step-1v", vec![Message::user("hi")])
//!     .with_temperature(0.5)
//!     .with_tool_choice(ToolChoice::auto());
//!
//! assert!(request.validate().is_ok());
//! let json = serde_json::to_value(&request).expect("request should serialize");
//! assert_eq!(json["tool_choice"], "auto");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Message, ProviderError, ToolCallType};

/// Provider-neutral tool declaration, with the input schema kept as JSON text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub parameters: Value,
}

/// A `function` entry of the request `tools` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTool {
    #[serde(rename = "type")]
    pub kind: ToolCallType,
    pub function: FunctionDeclaration,
}

impl FunctionTool {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            kind: ToolCallType::Function,
            function: FunctionDeclaration {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }
}

impl TryFrom<ToolDefinition> for FunctionTool {
    type Error = ProviderError;

    fn try_from(value: ToolDefinition) -> Result<Self, Self::Error> {
        let parameters = serde_json::from_str::<Value>(&value.input_schema).map_err(|_| {
            ProviderError::invalid_request(format!(
                "input schema for tool '{}' must be valid JSON",
                value.name
            ))
        })?;

        Ok(Self::new(value.name, value.description, parameters))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoiceMode {
    None,
    Auto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedFunction {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedToolChoice {
    #[serde(rename = "type")]
    pub kind: ToolCallType,
    pub function: NamedFunction,
}

/// Controls which (if any) function the model may call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolChoice {
    Mode(ToolChoiceMode),
    Function(NamedToolChoice),
}

impl ToolChoice {
    pub fn none() -> Self {
        Self::Mode(ToolChoiceMode::None)
    }

    pub fn auto() -> Self {
        Self::Mode(ToolChoiceMode::Auto)
    }

    /// Forces a call to the named function.
    pub fn function(name: impl Into<String>) -> Self {
        Self::Function(NamedToolChoice {
            kind: ToolCallType::Function,
            function: NamedFunction { name: name.into() },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub do_sample: Option<bool>,
    #[serde(default)]
    pub stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<FunctionTool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    #[serde(rename = "user_id", default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            request_id: None,
            model: model.into(),
            messages,
            do_sample: None,
            stream: false,
            temperature: None,
            top_p: None,
            max_tokens: None,
            stop: None,
            tools: None,
            tool_choice: None,
            user: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
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

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_tools(mut self, tools: Vec<FunctionTool>) -> Self {
        self.tools = if tools.is_empty() { None } else { Some(tools) };
        self
    }

    pub fn with_tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        self.tool_choice = Some(tool_choice);
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn tools(&self) -> &[FunctionTool] {
        self.tools.as_deref().unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::invalid_request("model must not be empty"));
        }

        if self.messages.is_empty() {
            return Err(ProviderError::invalid_request(
                "at least one message is required",
            ));
        }

        if self.max_tokens == Some(0) {
            return Err(ProviderError::invalid_request(
                "max_tokens must be greater than zero",
            ));
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ProviderError::invalid_request(
                    "temperature must be in the inclusive range 0.0..=2.0",
                ));
            }
        }

        if let Some(top_p) = self.top_p {
            if !(0.0..=1.0).contains(&top_p) {
                return Err(ProviderError::invalid_request(
                    "top_p must be in the inclusive range 0.0..=1.0",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ProviderErrorKind;

    #[test]
    fn tool_choice_helpers_serialize_to_wire_shapes() {
        assert_eq!(
            serde_json::to_value(ToolChoice::none()).expect("serialize"),
            json!("none")
        );
        assert_eq!(
            serde_json::to_value(ToolChoice::function("lookup")).expect("serialize"),
            json!({"type": "function", "function": {"name": "lookup"}})
        );
    }

    #[test]
    fn tool_definition_converts_when_schema_is_json() {
        let tool = FunctionTool::try_from(ToolDefinition {
            name: "lookup".to_string(),
            description: "Look up a record".to_string(),
            input_schema: r#"{"type":"object","properties":{"q":{"type":"string"}}}"#.to_string(),
        })
        .expect("schema should parse");

        let json = serde_json::to_value(&tool).expect("tool should serialize");
        assert_eq!(json["type"], "function");
        assert_eq!(json["function"]["name"], "lookup");
        assert_eq!(json["function"]["parameters"]["type"], "object");
    }

    #[test]
    fn tool_definition_with_broken_schema_is_rejected() {
        let error = FunctionTool::try_from(ToolDefinition {
            name: "lookup".to_string(),
            description: String::new(),
            input_schema: "{not json".to_string(),
        })
        .expect_err("schema must be JSON");

        assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
    }

    #[test]
    fn request_serializes_user_as_user_id_and_skips_unset_fields() {
        let mut request = ChatCompletionRequest::new("step-1v", vec![Message::user("hi")]);
        request.user = Some("u-1".to_string());

        let json = serde_json::to_value(&request).expect("request should serialize");
        assert_eq!(json["user_id"], "u-1");
        assert_eq!(json["stream"], false);
        assert!(json.get("tools").is_none());
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn validate_rejects_out_of_range_sampling() {
        let base = ChatCompletionRequest::new("step-1v", vec![Message::user("hi")]);

        let error = base
            .clone()
            .with_top_p(1.5)
            .validate()
            .expect_err("top_p above one must fail");
        assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);

        let error = ChatCompletionRequest::new("step-1v", Vec::new())
            .validate()
            .expect_err("empty messages must fail");
        assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);

        assert!(base.with_max_tokens(16).with_temperature(2.0).validate().is_ok());
    }
}
