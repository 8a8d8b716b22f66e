//! Error types for the hearth assistant.

use crate::agent::AgentError;

/// Top-level error type for the assistant.
#[derive(Debug, thiserror::Error)]
pub enum HearthError {
    /// Audio device or stream error.
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech-to-text model or transcription error.
    #[error("STT error: {0}")]
    Stt(String),

    /// Text-to-speech voice or synthesis error.
    #[error("TTS error: {0}")]
    Tts(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Agent construction or turn error.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, HearthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes() {
        assert_eq!(
            HearthError::Audio("no input device".into()).to_string(),
            "audio error: no input device"
        );
        assert_eq!(HearthError::Tts("x".into()).to_string(), "TTS error: x");
        assert_eq!(HearthError::Stt("x".into()).to_string(), "STT error: x");
    }

    #[test]
    fn agent_error_is_transparent() {
        let err: HearthError = AgentError::UnknownTool {
            agent: "root_agent".into(),
            tool: "teleport".into(),
        }
        .into();
        assert!(err.to_string().contains("teleport"));
        assert!(!err.to_string().starts_with("agent error"));
    }
}
