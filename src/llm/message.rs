//! Message types for model conversations.
//!
//! ```
//! use hearth::llm::{Message, Role};
//!
//! let user_msg = Message::user("Will it rain tomorrow?");
//! assert_eq!(user_msg.role, Role::User);
//!
//! let tool_result = Message::tool_result("call_123", "partly cloudy");
//! assert_eq!(tool_result.role, Role::Tool);
//! ```

use serde::{Deserialize, Serialize};

/// The role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The content of a message.
///
/// Tool results carry the id of the call that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: String },
    ToolResult { call_id: String, content: String },
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantToolCall {
    /// Id used to correlate the result message.
    pub call_id: String,
    /// Name of the tool to run.
    pub function_name: String,
    /// JSON-encoded arguments, exactly as the model produced them.
    pub arguments: String,
}

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
    /// Tool calls made by the assistant (only for Assistant role).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<AssistantToolCall>,
}

impl Message {
    /// Create a text message with the given role.
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text { text: text.into() },
            tool_calls: Vec::new(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::text(Role::System, text)
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::text(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text(Role::Assistant, text)
    }

    /// Create an assistant message with tool calls and optional text.
    pub fn assistant_with_tool_calls(
        text: Option<String>,
        tool_calls: Vec<AssistantToolCall>,
    ) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text {
                text: text.unwrap_or_default(),
            },
            tool_calls,
        }
    }

    /// Create a tool result message.
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: MessageContent::ToolResult {
                call_id: call_id.into(),
                content: content.into(),
            },
            tool_calls: Vec::new(),
        }
    }

    /// Text body of the message, or the output of a tool result.
    pub fn body(&self) -> &str {
        match &self.content {
            MessageContent::Text { text } => text,
            MessageContent::ToolResult { content, .. } => content,
        }
    }
}
