//! Core tool types.

use async_trait::async_trait;
use serde_json::Value;

use crate::llm::ToolDefinition;

/// Why a tool could not produce output.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The model passed arguments that do not match the schema.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool ran and failed.
    #[error("execution failed: {0}")]
    Execution(String),
}

/// Result of a tool execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub success: bool,
    /// Output handed to the model on success.
    pub content: String,
    /// Failure description handed to the model otherwise.
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(content: String) -> Self {
        Self {
            success: true,
            content,
            error: None,
        }
    }

    pub fn failure(error: String) -> Self {
        Self {
            success: false,
            content: String::new(),
            error: Some(error),
        }
    }

    /// Text placed in the tool message for the model.
    pub fn into_model_text(self) -> String {
        match self.error {
            Some(error) if !self.success => error,
            _ => self.content,
        }
    }
}

impl From<ToolError> for ToolResult {
    fn from(e: ToolError) -> Self {
        Self::failure(e.to_string())
    }
}

/// A tool callable by the model.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses to call the tool.
    fn name(&self) -> &str;

    /// Guidance shown to the model.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's arguments.
    fn schema(&self) -> Value;

    /// Execute with the model's JSON arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArguments`] when required arguments are
    /// missing or malformed.
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError>;

    /// Definition sent to the model.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.schema())
    }
}

/// Fetch a required, non-blank string argument.
pub(crate) fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    let value = args
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidArguments(format!("missing required argument '{key}'")))?
        .trim();
    if value.is_empty() {
        return Err(ToolError::InvalidArguments(format!(
            "argument '{key}' must not be empty"
        )));
    }
    Ok(value)
}

/// Fetch a required http(s) URL argument.
pub(crate) fn required_url<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    let url = required_str(args, key)?;
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ToolError::InvalidArguments(format!(
            "'{key}' must start with http:// or https://"
        )));
    }
    Ok(url)
}

/// Optional non-negative integer argument.
pub(crate) fn optional_u32(args: &Value, key: &str) -> Result<Option<u32>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| {
                ToolError::InvalidArguments(format!("'{key}' must be a non-negative integer"))
            }),
    }
}

/// Optional boolean argument.
pub(crate) fn optional_bool(args: &Value, key: &str) -> Result<Option<bool>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_bool()
            .map(Some)
            .ok_or_else(|| ToolError::InvalidArguments(format!("'{key}' must be a boolean"))),
    }
}

/// Optional enum argument, decoded through serde.
pub(crate) fn optional_enum<T: serde::de::DeserializeOwned>(
    args: &Value,
    key: &str,
) -> Result<Option<T>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| ToolError::InvalidArguments(format!("'{key}': {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_result_success() {
        let result = ToolResult::success("hello world".to_owned());
        assert!(result.success);
        assert!(result.error.is_none());
        assert_eq!(result.into_model_text(), "hello world");
    }

    #[test]
    fn tool_result_failure() {
        let result = ToolResult::failure("crawler unreachable".to_owned());
        assert!(!result.success);
        assert!(result.content.is_empty());
        assert_eq!(result.into_model_text(), "crawler unreachable");
    }

    #[test]
    fn tool_error_converts_to_failure() {
        let result: ToolResult = ToolError::InvalidArguments("missing 'url'".into()).into();
        assert!(!result.success);
        assert_eq!(
            result.into_model_text(),
            "invalid arguments: missing 'url'"
        );
    }

    #[test]
    fn required_str_checks() {
        let args = json!({"query": "  rain  ", "blank": " ", "num": 3});
        assert_eq!(required_str(&args, "query").ok(), Some("rain"));
        assert!(required_str(&args, "blank").is_err());
        assert!(required_str(&args, "num").is_err());
        assert!(required_str(&args, "missing").is_err());
    }

    #[test]
    fn optional_args() {
        let args = json!({"n": 3, "neg": -1, "flag": true, "nil": null, "s": "x"});
        assert_eq!(optional_u32(&args, "n").ok().flatten(), Some(3));
        assert!(optional_u32(&args, "neg").is_err());
        assert!(optional_u32(&args, "nil").is_ok_and(|v| v.is_none()));
        assert_eq!(optional_bool(&args, "flag").ok().flatten(), Some(true));
        assert!(optional_bool(&args, "s").is_err());
        assert!(optional_bool(&args, "absent").is_ok_and(|v| v.is_none()));
    }

    #[test]
    fn required_url_checks_scheme() {
        let args = json!({"url": "ftp://example.com", "ok": "https://example.com"});
        assert!(required_url(&args, "url").is_err());
        assert_eq!(required_url(&args, "ok").ok(), Some("https://example.com"));
    }
}
