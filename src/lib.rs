//! Hearth: a local home assistant.
//!
//! A tool-routing agent loop talks to an OpenAI-compatible inference
//! server and answers with the help of web tools:
//! Microphone → STT → Agent ⇄ Tools → TTS → Speaker
//!
//! # Architecture
//!
//! - **Agent**: named agents with instructions, tools and sub-agents,
//!   driven by a two-state Model/Tool loop
//! - **Tools**: DuckDuckGo search, a headless crawler service client and
//!   its bounded-text digests, a static weather tool
//! - **LLM**: OpenAI-compatible chat completions with reasoning capture
//! - **Audio**: microphone capture and speaker playback via `cpal`
//! - **STT**: Parakeet TDT behind an energy endpointer
//! - **TTS**: Piper voices, streamed as raw PCM

pub mod agent;
pub mod audio;
pub mod config;
pub mod crawl;
pub mod error;
pub mod llm;
pub mod logging;
pub mod stt;
pub mod tools;
pub mod tts;

pub use agent::{Agent, AgentDefinition, Session};
pub use config::HearthConfig;
pub use error::{HearthError, Result};
