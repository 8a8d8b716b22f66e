//! The contract between the agent loop and a language model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::LlmError;
use super::message::{AssistantToolCall, Message};

/// A tool definition offered to the model for function calling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema describing the tool's parameters.
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    Other,
}

/// One model turn: either final text or a request to run tools.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReply {
    /// Visible answer text, if any.
    pub content: Option<String>,
    /// Reasoning text some servers return next to the answer.
    pub reasoning: Option<String>,
    /// Requested tool invocations, in the order the model emitted them.
    pub tool_calls: Vec<AssistantToolCall>,
    pub finish_reason: FinishReason,
}

impl ModelReply {
    /// A final text answer.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            reasoning: None,
            tool_calls: Vec::new(),
            finish_reason: FinishReason::Stop,
        }
    }

    /// A reply requesting the given tool calls.
    pub fn tool_calls(tool_calls: Vec<AssistantToolCall>) -> Self {
        Self {
            content: None,
            reasoning: None,
            tool_calls,
            finish_reason: FinishReason::ToolCalls,
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// A chat model: given history and tools, produce the next reply.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Request the next assistant turn.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] when the server cannot be reached, rejects the
    /// request or answers with something that is not a completion.
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ModelReply, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_constructors() {
        let r = ModelReply::text("done");
        assert_eq!(r.content.as_deref(), Some("done"));
        assert!(!r.has_tool_calls());
        assert_eq!(r.finish_reason, FinishReason::Stop);

        let r = ModelReply::tool_calls(vec![AssistantToolCall {
            call_id: "c".into(),
            function_name: "web_search".into(),
            arguments: "{}".into(),
        }]);
        assert!(r.has_tool_calls());
        assert_eq!(r.finish_reason, FinishReason::ToolCalls);
    }
}
