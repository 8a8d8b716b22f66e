//! Language model access.
//!
//! The model is an external OpenAI-compatible inference server. This module
//! holds the provider-neutral message model, the [`ChatModel`] trait the
//! agent loop talks to, and the chat-completions client.

pub mod error;
pub mod message;
pub mod openai;
pub mod provider;

pub use error::LlmError;
pub use message::{AssistantToolCall, Message, MessageContent, Role};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use provider::{ChatModel, FinishReason, ModelReply, ToolDefinition};
