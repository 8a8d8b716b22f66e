//! Speech-to-text: a streaming recognizer contract, an energy endpointer
//! that turns a batch transcriber into a streaming one, and the blocking
//! `listen()` loop fed by the microphone.

mod endpoint;
mod parakeet;

pub use endpoint::{EndpointingRecognizer, rms_energy};
pub use parakeet::ParakeetTranscriber;

use std::time::Duration;

use crate::audio::CpalCapture;
use crate::config::{AudioConfig, SttConfig};
use crate::error::{HearthError, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, info};

/// How often the consumer wakes to check the capture stream's health.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A recognizer fed incrementally with 16 kHz mono samples.
pub trait SpeechRecognizer {
    /// Accept more audio. Returns `Some(text)` when an utterance is
    /// finalised.
    ///
    /// # Errors
    ///
    /// Returns an error if recognition fails.
    fn accept(&mut self, samples: &[f32]) -> Result<Option<String>>;

    /// Drop any partial utterance.
    fn reset(&mut self) {}
}

/// A batch transcriber for a complete utterance.
pub trait Transcriber {
    /// Transcribe `samples` recorded at `sample_rate`.
    ///
    /// # Errors
    ///
    /// Returns an error if the model fails.
    fn transcribe(&mut self, samples: &[f32], sample_rate: u32) -> Result<String>;
}

/// Microphone listener with a loaded recognizer.
///
/// The recognizer is built once; every [`Listener::listen`] call opens its
/// own input stream.
pub struct Listener<R> {
    recognizer: R,
    audio: AudioConfig,
}

impl Listener<EndpointingRecognizer<ParakeetTranscriber>> {
    /// Load the Parakeet model and configure the endpointer.
    ///
    /// # Errors
    ///
    /// Returns [`HearthError::Stt`] if the model directory cannot be loaded.
    pub fn from_config(stt: &SttConfig, audio: &AudioConfig) -> Result<Self> {
        let transcriber = ParakeetTranscriber::load(&stt.model_dir)?;
        let recognizer = EndpointingRecognizer::new(transcriber, stt, audio.input_sample_rate);
        Ok(Self::new(recognizer, audio.clone()))
    }
}

impl<R: SpeechRecognizer> Listener<R> {
    /// Wrap an existing recognizer.
    pub fn new(recognizer: R, audio: AudioConfig) -> Self {
        Self { recognizer, audio }
    }

    /// Block until an utterance is transcribed and return its text.
    ///
    /// # Errors
    ///
    /// Returns an error if the microphone cannot be opened, the capture
    /// stream dies, or recognition fails.
    pub fn listen(&mut self) -> Result<String> {
        let capture = CpalCapture::new(&self.audio)?;
        let (tx, rx) = crossbeam_channel::bounded(self.audio.queue_capacity);
        let stream = capture.start(tx)?;

        self.recognizer.reset();
        eprintln!("Listening...");
        let text = consume(&rx, &mut self.recognizer, || stream.has_failed())?;
        info!("heard: {text}");
        eprintln!("Heard: {text}");
        Ok(text)
    }
}

/// Load the default recognizer and listen once.
///
/// # Errors
///
/// See [`Listener::from_config`] and [`Listener::listen`].
pub fn listen(stt: &SttConfig, audio: &AudioConfig) -> Result<String> {
    Listener::from_config(stt, audio)?.listen()
}

/// Drain `rx` into `recognizer` until it finalises a non-empty transcript.
///
/// Returns an error once the queue disconnects or `failed()` reports the
/// producer is dead.
pub fn consume<R, F>(rx: &Receiver<Vec<f32>>, recognizer: &mut R, failed: F) -> Result<String>
where
    R: SpeechRecognizer + ?Sized,
    F: Fn() -> bool,
{
    loop {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(frame) => {
                if let Some(text) = recognizer.accept(&frame)? {
                    let text = text.trim();
                    if !text.is_empty() {
                        return Ok(text.to_owned());
                    }
                    debug!("discarding empty transcript");
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if failed() {
                    return Err(HearthError::Audio("capture stream failed".into()));
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(HearthError::Audio("capture stream closed".into()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::collections::VecDeque;

    /// Emits queued transcripts, one per accepted frame.
    struct Scripted(VecDeque<Option<String>>);

    impl SpeechRecognizer for Scripted {
        fn accept(&mut self, _samples: &[f32]) -> Result<Option<String>> {
            Ok(self.0.pop_front().flatten())
        }
    }

    #[test]
    fn consume_skips_blank_transcripts() {
        let (tx, rx) = crossbeam_channel::bounded(8);
        for _ in 0..3 {
            tx.send(vec![0.0; 16]).unwrap();
        }
        let mut rec = Scripted(VecDeque::from([None, Some("  ".into()), Some(" hello ".into())]));
        let text = consume(&rx, &mut rec, || false).unwrap();
        assert_eq!(text, "hello");
    }

    #[test]
    fn consume_errors_when_producer_disconnects() {
        let (tx, rx) = crossbeam_channel::bounded::<Vec<f32>>(1);
        drop(tx);
        let mut rec = Scripted(VecDeque::new());
        let err = consume(&rx, &mut rec, || false).unwrap_err();
        assert!(matches!(err, HearthError::Audio(_)));
    }

    #[test]
    fn consume_errors_when_stream_fails() {
        let (_tx, rx) = crossbeam_channel::bounded::<Vec<f32>>(1);
        let mut rec = Scripted(VecDeque::new());
        let err = consume(&rx, &mut rec, || true).unwrap_err();
        assert!(err.to_string().contains("failed"));
    }
}
