//! Agents: instruction, tools and the loop that runs them.
//!
//! An [`AgentDefinition`] names its tools; [`Agent::build`] resolves those
//! names against a [`ToolRegistry`](crate::tools::ToolRegistry) up front, so
//! a typo fails at startup rather than mid-conversation. A [`Session`]
//! keeps history across turns.

pub mod definition;
pub mod hooks;
pub mod loop_engine;
pub mod session;

pub use definition::{AgentDefinition, Instruction, PromptContext, builtin};
pub use hooks::{AgentHooks, LogHooks, NoopHooks};
pub use loop_engine::{Agent, LoopConfig, Node, TurnOutcome, route_after_model};
pub use session::{RunIds, Session};

use crate::llm::LlmError;

/// Errors from building or running an agent.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A definition names a tool the registry does not have.
    #[error("agent '{agent}' declares unknown tool '{tool}'")]
    UnknownTool { agent: String, tool: String },

    /// No built-in agent has this name.
    #[error("unknown agent '{0}'")]
    UnknownAgent(String),

    /// The model kept requesting tools past the per-turn cap.
    #[error("agent '{agent}' gave no answer within {limit} model calls")]
    IterationLimit { agent: String, limit: usize },

    /// The model call failed.
    #[error("model request failed: {0}")]
    Model(#[from] LlmError),
}
