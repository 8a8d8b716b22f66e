//! The tool-routing loop.
//!
//! Each user turn alternates between two nodes until the model answers
//! without requesting a tool:
//!
//! ```text
//! Model --(tool call)--> Tool --> Model
//!   \--(no tool call)--> End
//! ```
//!
//! The number of model calls per turn is capped by
//! [`LoopConfig::max_iterations`].

use std::sync::Arc;

use serde_json::Value;
use tracing::Instrument;

use super::AgentError;
use super::definition::{AgentDefinition, DEFAULT_LOCATION, Instruction, PromptContext};
use super::hooks::AgentHooks;
use crate::llm::{AssistantToolCall, ChatModel, Message, ModelReply, ToolDefinition};
use crate::tools::{AgentTool, ToolRegistry, ToolResult};

/// Default model calls allowed per user turn.
pub const DEFAULT_MAX_ITERATIONS: usize = 8;

/// Loop limits and prompt context.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub max_iterations: usize,
    pub location: String,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            location: DEFAULT_LOCATION.to_owned(),
        }
    }
}

impl LoopConfig {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }
}

/// Loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Model,
    Tool,
    End,
}

/// Next node after a model reply.
pub fn route_after_model(reply: &ModelReply) -> Node {
    if reply.has_tool_calls() {
        Node::Tool
    } else {
        Node::End
    }
}

/// Outcome of one user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// Final answer text (may be empty).
    pub text: String,
    /// Reasoning attached to the final reply.
    pub reasoning: Option<String>,
    pub model_calls: usize,
    pub tool_calls: usize,
}

/// Text handed to the model for a tool name nobody registered.
pub fn not_implemented(name: &str) -> String {
    format!("Tool '{name}' not implemented.")
}

/// A built agent: definition resolved against a tool registry and bound to
/// a model.
pub struct Agent {
    name: String,
    description: String,
    instruction: Instruction,
    tools: ToolRegistry,
    definitions: Vec<ToolDefinition>,
    model: Arc<dyn ChatModel>,
    hooks: Arc<dyn AgentHooks>,
    config: LoopConfig,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("tools", &self.tools)
            .field("config", &self.config)
            .finish()
    }
}

impl Agent {
    /// Build `definition` and its sub-agents.
    ///
    /// Every declared tool must exist in `registry`. Each sub-agent is
    /// built first and offered to its parent as a tool of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnknownTool`] for a tool name missing from the
    /// registry.
    pub fn build(
        definition: &AgentDefinition,
        registry: &ToolRegistry,
        model: Arc<dyn ChatModel>,
        hooks: Arc<dyn AgentHooks>,
        config: LoopConfig,
    ) -> Result<Arc<Self>, AgentError> {
        let mut tools = ToolRegistry::new();
        for name in &definition.tools {
            let tool = registry.get(name).ok_or_else(|| AgentError::UnknownTool {
                agent: definition.name.clone(),
                tool: name.clone(),
            })?;
            tools.register(tool);
        }
        for sub in &definition.sub_agents {
            let child = Self::build(
                sub,
                registry,
                Arc::clone(&model),
                Arc::clone(&hooks),
                config.clone(),
            )?;
            tools.register(Arc::new(AgentTool::new(child)));
        }

        let definitions = tools.definitions();
        tracing::debug!(
            agent = %definition.name,
            tools = ?tools.list_available(),
            "agent built"
        );
        Ok(Arc::new(Self {
            name: definition.name.clone(),
            description: definition.description.clone(),
            instruction: definition.instruction.clone(),
            tools,
            definitions,
            model,
            hooks,
            config,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Tool names this agent may call, delegates included.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.list_available()
    }

    /// System prompt for a call made now.
    pub fn system_prompt(&self) -> String {
        self.instruction
            .render(&PromptContext::now(self.config.location.clone()))
    }

    /// Answer `request` on a fresh history.
    ///
    /// # Errors
    ///
    /// See [`Agent::run_turn`].
    pub async fn run_fresh(&self, request: &str) -> Result<TurnOutcome, AgentError> {
        let mut history = vec![Message::user(request)];
        self.run_turn(&mut history).await
    }

    /// Run one user turn over `history`, which must already end with the
    /// user's message. Assistant and tool messages are appended in place.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Model`] when the model call fails and
    /// [`AgentError::IterationLimit`] when the model keeps requesting tools
    /// past the cap.
    pub async fn run_turn(&self, history: &mut Vec<Message>) -> Result<TurnOutcome, AgentError> {
        let span = tracing::info_span!("agent_turn", agent = %self.name);
        self.run_loop(history).instrument(span).await
    }

    async fn run_loop(&self, history: &mut Vec<Message>) -> Result<TurnOutcome, AgentError> {
        let mut node = Node::Model;
        let mut pending: Option<AssistantToolCall> = None;
        let mut answer: Option<(String, Option<String>)> = None;
        let mut model_calls = 0;
        let mut tool_calls = 0;

        while node != Node::End {
            match node {
                Node::Model => {
                    if model_calls >= self.config.max_iterations {
                        tracing::warn!(limit = self.config.max_iterations, "iteration limit reached");
                        return Err(AgentError::IterationLimit {
                            agent: self.name.clone(),
                            limit: self.config.max_iterations,
                        });
                    }
                    model_calls += 1;

                    let mut request = Vec::with_capacity(history.len() + 1);
                    request.push(Message::system(self.system_prompt()));
                    request.extend(history.iter().cloned());
                    self.hooks
                        .before_model(&self.name, &request, &self.definitions);

                    let reply = self.model.complete(&request, &self.definitions).await?;
                    node = route_after_model(&reply);
                    tracing::debug!(model_call = model_calls, next = ?node, "model replied");

                    if let Some(call) = reply.tool_calls.first().cloned() {
                        if reply.tool_calls.len() > 1 {
                            tracing::debug!(
                                requested = reply.tool_calls.len(),
                                "running first tool call only"
                            );
                        }
                        history.push(Message::assistant_with_tool_calls(
                            reply.content,
                            vec![call.clone()],
                        ));
                        pending = Some(call);
                    } else {
                        let text = reply.content.unwrap_or_default();
                        history.push(Message::assistant(text.clone()));
                        answer = Some((text, reply.reasoning));
                    }
                }
                Node::Tool => {
                    if let Some(call) = pending.take() {
                        tool_calls += 1;
                        let output = self.invoke_tool(&call).await;
                        history.push(Message::tool_result(call.call_id, output));
                    }
                    node = Node::Model;
                }
                Node::End => {}
            }
        }

        let (text, reasoning) = answer.unwrap_or_default();
        Ok(TurnOutcome {
            text,
            reasoning,
            model_calls,
            tool_calls,
        })
    }

    /// Run one tool call and return the text for the tool message.
    async fn invoke_tool(&self, call: &AssistantToolCall) -> String {
        self.hooks.before_tool(&self.name, call);
        let name = call.function_name.as_str();

        let output = match self.tools.get(name) {
            None => {
                tracing::warn!(tool = name, "model requested unknown tool");
                not_implemented(name)
            }
            Some(tool) => match parse_arguments(&call.arguments) {
                Err(message) => message,
                Ok(args) => match tool.execute(args).await {
                    Ok(result) => result.into_model_text(),
                    Err(e) => {
                        tracing::warn!(tool = name, error = %e, "tool rejected call");
                        ToolResult::from(e).into_model_text()
                    }
                },
            },
        };

        self.hooks.after_tool(&self.name, name, &output);
        output
    }
}

/// Decode tool-call arguments; an empty string means no arguments.
fn parse_arguments(raw: &str) -> Result<Value, String> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(v @ Value::Object(_)) => Ok(v),
        Ok(other) => Err(format!(
            "Invalid tool arguments: expected a JSON object, got {other}"
        )),
        Err(e) => Err(format!("Invalid tool arguments: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing() {
        assert_eq!(route_after_model(&ModelReply::text("hi")), Node::End);
        let reply = ModelReply::tool_calls(vec![AssistantToolCall {
            call_id: "c".into(),
            function_name: "web_search".into(),
            arguments: "{}".into(),
        }]);
        assert_eq!(route_after_model(&reply), Node::Tool);
    }

    #[test]
    fn not_implemented_text() {
        assert_eq!(not_implemented("teleport"), "Tool 'teleport' not implemented.");
    }

    #[test]
    fn argument_parsing() {
        assert!(parse_arguments("").is_ok_and(|v| v.as_object().is_some_and(|m| m.is_empty())));
        assert!(parse_arguments(r#"{"query":"x"}"#).is_ok_and(|v| v["query"] == "x"));
        assert!(parse_arguments("[1,2]").is_err_and(|m| m.contains("JSON object")));
        assert!(parse_arguments("{not json").is_err_and(|m| m.starts_with("Invalid tool arguments")));
    }

    #[test]
    fn loop_config_builders() {
        let c = LoopConfig::default().with_max_iterations(3).with_location("Home");
        assert_eq!(c.max_iterations, 3);
        assert_eq!(c.location, "Home");
        assert_eq!(LoopConfig::default().max_iterations, DEFAULT_MAX_ITERATIONS);
    }
}
