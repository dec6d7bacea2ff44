//! JSON argument parsing helpers for function callbacks.
//!
//! ```rust
//! use serde::Deserialize;
//! use sftooling::{parse_arguments, parse_json_object, required_string};
//!
//! #[derive(Deserialize)]
//! struct Lookup {
//!     q: String,
//! }
//!
//! let typed: Lookup = parse_arguments(r#"{"q":"rust"}"#).expect("arguments should parse");
//! assert_eq!(typed.q, "rust");
//!
//! let args = parse_json_object(r#"{"q":"rust"}"#).expect("object should parse");
//! assert_eq!(required_string(&args, "q").expect("q should be present"), "rust");
//! ```

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::ToolError;

/// Deserializes finalized call arguments into a typed input record.
pub fn parse_arguments<T>(args_json: &str) -> Result<T, ToolError>
where
    T: DeserializeOwned,
{
    serde_json::from_str(args_json)
        .map_err(|err| ToolError::invalid_arguments(format!("invalid arguments: {err}")))
}

pub fn parse_json_value(args_json: &str) -> Result<Value, ToolError> {
    serde_json::from_str(args_json)
        .map_err(|err| ToolError::invalid_arguments(format!("invalid JSON arguments: {err}")))
}

pub fn parse_json_object(args_json: &str) -> Result<Map<String, Value>, ToolError> {
    match parse_json_value(args_json)? {
        Value::Object(map) => Ok(map),
        _ => Err(ToolError::invalid_arguments("expected JSON object arguments")),
    }
}

pub fn required_string(args: &Map<String, Value>, key: &str) -> Result<String, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required string: '{key}'")))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::ToolErrorKind;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Weather {
        city: String,
        days: u8,
    }

    #[test]
    fn typed_arguments_parse_from_finalized_json() {
        let parsed: Weather =
            parse_arguments(r#"{"city":"Shanghai","days":3}"#).expect("arguments should parse");
        assert_eq!(
            parsed,
            Weather {
                city: "Shanghai".to_string(),
                days: 3
            }
        );
    }

    #[test]
    fn partial_arguments_are_invalid() {
        let error = parse_arguments::<Weather>(r#"{"city":"Shang"#).expect_err("must fail");
        assert_eq!(error.kind, ToolErrorKind::InvalidArguments);
    }

    #[test]
    fn non_object_and_missing_keys_are_rejected() {
        let error = parse_json_object("[1,2]").expect_err("array must fail");
        assert_eq!(error.kind, ToolErrorKind::InvalidArguments);

        let args = parse_json_object("{\"q\":1}").expect("object should parse");
        let error = required_string(&args, "q").expect_err("number is not a string");
        assert_eq!(error.kind, ToolErrorKind::InvalidArguments);
    }
}
