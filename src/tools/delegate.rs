//! Sub-agents exposed as tools.
//!
//! A parent agent delegates by calling a tool named after the sub-agent.
//! The sub-agent answers on a fresh history and its final answer becomes
//! the tool result.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::types::{Tool, ToolError, ToolResult, required_str};
use crate::agent::Agent;

pub struct AgentTool {
    agent: Arc<Agent>,
}

impl AgentTool {
    pub fn new(agent: Arc<Agent>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &str {
        self.agent.name()
    }

    fn description(&self) -> &str {
        self.agent.description()
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "request": {
                    "type": "string",
                    "description": "The user's request, restated for this agent"
                }
            },
            "required": ["request"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let request = required_str(&args, "request")?;
        tracing::info!(agent = self.agent.name(), "delegating");
        match self.agent.run_fresh(request).await {
            Ok(outcome) => Ok(ToolResult::success(outcome.text)),
            Err(e) => Ok(ToolResult::failure(format!(
                "Agent '{}' failed: {e}",
                self.agent.name()
            ))),
        }
    }
}
