//! Parakeet TDT batch transcription via `parakeet-rs`.

use std::path::Path;
use std::time::Instant;

use super::Transcriber;
use crate::error::{HearthError, Result};
use parakeet_rs::{ParakeetTDT, TimestampMode, Transcriber as _};
use tracing::info;

/// Files `ParakeetTDT::from_pretrained` expects in the model directory.
const REQUIRED_FILES: &[&str] = &[
    "encoder-model.onnx",
    "decoder_joint-model.onnx",
    "vocab.txt",
];

/// Parakeet TDT model loaded from a local directory.
pub struct ParakeetTranscriber {
    model: ParakeetTDT,
}

impl ParakeetTranscriber {
    /// Load the model from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`HearthError::Stt`] if the directory or a model file is
    /// missing, or the model fails to load.
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(HearthError::Stt(format!(
                "model directory not found: {}",
                dir.display()
            )));
        }
        if let Some(missing) = REQUIRED_FILES.iter().find(|f| !dir.join(f).is_file()) {
            return Err(HearthError::Stt(format!(
                "model file missing: {}",
                dir.join(missing).display()
            )));
        }

        info!("loading STT model from {}", dir.display());
        let model = ParakeetTDT::from_pretrained(dir, None)
            .map_err(|e| HearthError::Stt(format!("failed to load Parakeet TDT: {e}")))?;
        info!("STT model loaded");
        Ok(Self { model })
    }
}

impl Transcriber for ParakeetTranscriber {
    fn transcribe(&mut self, samples: &[f32], sample_rate: u32) -> Result<String> {
        let started = Instant::now();
        let result = self
            .model
            .transcribe_samples(
                samples.to_vec(),
                sample_rate,
                1, // mono
                Some(TimestampMode::Sentences),
            )
            .map_err(|e| HearthError::Stt(format!("transcription failed: {e}")))?;

        info!(
            "transcribed in {:.0}ms: \"{}\"",
            started.elapsed().as_millis(),
            result.text
        );
        Ok(result.text)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn missing_directory_is_stt_error() {
        let err = ParakeetTranscriber::load(Path::new("/definitely/not/here")).err();
        assert!(matches!(err, Some(HearthError::Stt(msg)) if msg.contains("not found")));
    }

    #[test]
    fn missing_model_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("vocab.txt"), "a\n").unwrap();
        let err = ParakeetTranscriber::load(dir.path()).err();
        assert!(matches!(err, Some(HearthError::Stt(msg)) if msg.contains("encoder-model.onnx")));
    }
}
