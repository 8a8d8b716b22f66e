//! Conversation sessions.

use std::sync::Arc;

use super::AgentError;
use super::loop_engine::{Agent, TurnOutcome};
use crate::llm::Message;

/// Identifiers attached to a session for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunIds {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

impl Default for RunIds {
    fn default() -> Self {
        Self {
            app_name: "local_home_assistant".to_owned(),
            user_id: "user_1".to_owned(),
            session_id: "session_001".to_owned(),
        }
    }
}

/// One conversation with an agent. History persists across turns.
#[derive(Debug)]
pub struct Session {
    agent: Arc<Agent>,
    ids: RunIds,
    history: Vec<Message>,
}

impl Session {
    pub fn new(agent: Arc<Agent>, ids: RunIds) -> Self {
        tracing::info!(
            app = %ids.app_name,
            user = %ids.user_id,
            session = %ids.session_id,
            agent = agent.name(),
            "session created"
        );
        Self {
            agent,
            ids,
            history: Vec::new(),
        }
    }

    pub fn ids(&self) -> &RunIds {
        &self.ids
    }

    pub fn agent(&self) -> &Arc<Agent> {
        &self.agent
    }

    /// Messages exchanged so far (system prompt excluded).
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Send one user message and return the agent's final answer.
    ///
    /// On error the history is rolled back to before this turn so the next
    /// turn starts from a consistent state.
    ///
    /// # Errors
    ///
    /// Propagates [`AgentError`] from the turn.
    pub async fn send(&mut self, text: &str) -> Result<TurnOutcome, AgentError> {
        let checkpoint = self.history.len();
        self.history.push(Message::user(text));
        match self.agent.run_turn(&mut self.history).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.history.truncate(checkpoint);
                Err(e)
            }
        }
    }

    /// Forget the conversation.
    pub fn reset(&mut self) {
        self.history.clear();
    }
}

/// Run a single turn on a throwaway session.
///
/// # Errors
///
/// Propagates [`AgentError`] from the turn.
pub async fn run_once(agent: Arc<Agent>, text: &str) -> Result<TurnOutcome, AgentError> {
    Session::new(agent, RunIds::default()).send(text).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ids() {
        let ids = RunIds::default();
        assert_eq!(ids.app_name, "local_home_assistant");
        assert_eq!(ids.user_id, "user_1");
        assert_eq!(ids.session_id, "session_001");
    }
}
