//! OpenAI-compatible chat-completions client.
//!
//! Talks to a local inference server (llama.cpp, vLLM, LM Studio and the
//! like) with non-streaming `POST {base_url}/chat/completions` requests.
//! Servers that expose chain-of-thought put it in `reasoning_content` or
//! `reasoning` on the assistant message; both end up in
//! [`ModelReply::reasoning`].

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::error::LlmError;
use super::message::{AssistantToolCall, Message, MessageContent};
use super::provider::{ChatModel, FinishReason, ModelReply, ToolDefinition};
use crate::config::LlmConfig;

/// Connection settings for an OpenAI-compatible server.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Base URL including the API version, e.g. `http://127.0.0.1:8080/v1`.
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key: "not-needed".to_owned(),
            temperature: None,
            max_tokens: None,
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Endpoint for chat completions.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl From<&LlmConfig> for OpenAiConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

/// Build the JSON request body for the Chat Completions API.
pub fn build_completions_request(
    config: &OpenAiConfig,
    messages: &[Message],
    tools: &[ToolDefinition],
) -> Value {
    let mut body = json!({
        "model": config.model,
        "messages": messages.iter().map(message_to_openai).collect::<Vec<_>>(),
        "stream": false,
    });

    if let Some(obj) = body.as_object_mut() {
        if let Some(max_tokens) = config.max_tokens {
            obj.insert("max_tokens".into(), json!(max_tokens));
        }
        if let Some(temp) = config.temperature {
            obj.insert("temperature".into(), json!(temp));
        }
        if !tools.is_empty() {
            obj.insert("tools".into(), tools_to_openai(tools));
        }
    }

    body
}

fn message_to_openai(msg: &Message) -> Value {
    match &msg.content {
        MessageContent::Text { text } => {
            let mut obj = json!({
                "role": msg.role.as_str(),
                "content": text,
            });
            if !msg.tool_calls.is_empty()
                && let Some(map) = obj.as_object_mut()
            {
                let calls: Vec<Value> = msg
                    .tool_calls
                    .iter()
                    .map(|tc| {
                        json!({
                            "id": tc.call_id,
                            "type": "function",
                            "function": {
                                "name": tc.function_name,
                                "arguments": tc.arguments,
                            }
                        })
                    })
                    .collect();
                map.insert("tool_calls".into(), Value::Array(calls));
            }
            obj
        }
        MessageContent::ToolResult { call_id, content } => json!({
            "role": "tool",
            "tool_call_id": call_id,
            "content": content,
        }),
    }
}

fn tools_to_openai(tools: &[ToolDefinition]) -> Value {
    Value::Array(
        tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    }
                })
            })
            .collect(),
    )
}

fn map_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "stop" => FinishReason::Stop,
        "length" => FinishReason::Length,
        "tool_calls" => FinishReason::ToolCalls,
        "content_filter" => FinishReason::ContentFilter,
        _ => FinishReason::Other,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Parse a non-streaming chat completion body into a [`ModelReply`].
///
/// # Errors
///
/// Returns [`LlmError::DecodeError`] when the body has no
/// `choices[0].message`.
pub fn parse_completion_response(body: &Value) -> Result<ModelReply, LlmError> {
    let choice = body
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|c| c.first())
        .ok_or_else(|| LlmError::DecodeError("response has no choices".into()))?;
    let message = choice
        .get("message")
        .ok_or_else(|| LlmError::DecodeError("choice has no message".into()))?;

    let content = non_empty_str(message.get("content"));
    let reasoning = non_empty_str(message.get("reasoning_content"))
        .or_else(|| non_empty_str(message.get("reasoning")));

    let tool_calls = message
        .get("tool_calls")
        .and_then(Value::as_array)
        .map(|calls| calls.iter().filter_map(parse_tool_call).collect())
        .unwrap_or_default();

    let finish_reason = choice
        .get("finish_reason")
        .and_then(Value::as_str)
        .map(map_finish_reason)
        .unwrap_or(FinishReason::Other);

    Ok(ModelReply {
        content,
        reasoning,
        tool_calls,
        finish_reason,
    })
}

fn parse_tool_call(call: &Value) -> Option<AssistantToolCall> {
    let function = call.get("function")?;
    let name = function.get("name").and_then(Value::as_str)?;
    let arguments = match function.get("arguments") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "{}".to_owned(),
        Some(other) => other.to_string(),
    };
    let call_id = call
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| format!("call_{}", uuid::Uuid::new_v4().simple()));
    Some(AssistantToolCall {
        call_id,
        function_name: name.to_owned(),
        arguments,
    })
}

/// Pull `error.message` out of an error body, falling back to the raw body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message").or(Some(e)))
                .and_then(Value::as_str)
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_owned())
}

/// Chat-completions client.
pub struct OpenAiClient {
    config: OpenAiConfig,
    http: reqwest::Client,
}

impl OpenAiClient {
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigError`] for an empty model id or a
    /// non-http base URL.
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        if config.model.trim().is_empty() {
            return Err(LlmError::ConfigError("model must not be empty".into()));
        }
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(LlmError::ConfigError(format!(
                "base_url must be an http(s) URL: {}",
                config.base_url
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::ConfigError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    /// `GET {base_url}/models`, returning the advertised model ids.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] when the server is unreachable or answers with an
    /// error status.
    pub async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/models", self.config.base_url.trim_end_matches('/'));
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::HttpStatus {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }
        let body: Value = response.json().await?;
        Ok(body
            .get("data")
            .and_then(Value::as_array)
            .map(|models| {
                models
                    .iter()
                    .filter_map(|m| m.get("id").and_then(Value::as_str).map(String::from))
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ModelReply, LlmError> {
        let url = self.config.completions_url();
        let body = build_completions_request(&self.config, messages, tools);
        tracing::debug!(
            %url,
            messages = messages.len(),
            tools = tools.len(),
            "sending chat completion"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(LlmError::HttpStatus {
                status: status.as_u16(),
                message: extract_error_message(&text),
            });
        }

        let value: Value =
            serde_json::from_str(&text).map_err(|e| LlmError::DecodeError(e.to_string()))?;
        let reply = parse_completion_response(&value)?;
        tracing::debug!(
            finish_reason = ?reply.finish_reason,
            tool_calls = reply.tool_calls.len(),
            "chat completion received"
        );
        Ok(reply)
    }
}
