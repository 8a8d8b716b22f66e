//! Callbacks around model and tool invocations.

use crate::config::LogConfig;
use crate::llm::{AssistantToolCall, Message, ToolDefinition};

/// Observer hooks invoked by the agent loop. All methods default to no-ops.
pub trait AgentHooks: Send + Sync {
    /// Right before the model is called with the full request.
    fn before_model(&self, _agent: &str, _messages: &[Message], _tools: &[ToolDefinition]) {}

    /// Right before a tool runs.
    fn before_tool(&self, _agent: &str, _call: &AssistantToolCall) {}

    /// After a tool produced the text handed back to the model.
    fn after_tool(&self, _agent: &str, _tool: &str, _output: &str) {}
}

/// Hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl AgentHooks for NoopHooks {}

/// Logs every callback through `tracing`.
///
/// A brief line is always emitted; with `debug` set the full request and
/// tool payloads are dumped as well.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogHooks {
    debug: bool,
}

impl LogHooks {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    pub fn from_config(config: &LogConfig) -> Self {
        Self::new(config.debug)
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }
}

impl AgentHooks for LogHooks {
    fn before_model(&self, agent: &str, messages: &[Message], tools: &[ToolDefinition]) {
        tracing::info!(agent, messages = messages.len(), tools = tools.len(), "before model");
        if self.debug {
            let dump = serde_json::to_string_pretty(messages).unwrap_or_default();
            let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
            tracing::info!(agent, tools = ?names, "model request:\n{dump}");
        }
    }

    fn before_tool(&self, agent: &str, call: &AssistantToolCall) {
        tracing::info!(agent, tool = %call.function_name, "before tool");
        if self.debug {
            tracing::info!(
                agent,
                tool = %call.function_name,
                call_id = %call.call_id,
                "tool arguments: {}",
                call.arguments
            );
        }
    }

    fn after_tool(&self, agent: &str, tool: &str, output: &str) {
        tracing::debug!(agent, tool, chars = output.chars().count(), "tool finished");
        if self.debug {
            tracing::info!(agent, tool, "tool output:\n{output}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_hooks_follow_config() {
        let config = LogConfig {
            debug: true,
            ..Default::default()
        };
        assert!(LogHooks::from_config(&config).is_debug());
        assert!(!LogHooks::from_config(&LogConfig::default()).is_debug());
    }

    #[test]
    fn hooks_do_not_panic_without_subscriber() {
        let hooks = LogHooks::new(true);
        hooks.before_model("root_agent", &[Message::user("hi")], &[]);
        hooks.before_tool(
            "root_agent",
            &AssistantToolCall {
                call_id: "c1".into(),
                function_name: "web_search".into(),
                arguments: "{}".into(),
            },
        );
        hooks.after_tool("root_agent", "web_search", "\nhttps://example.com");
        NoopHooks.before_model("root_agent", &[], &[]);
    }
}
