//! RMS-energy endpointer.

use super::{SpeechRecognizer, Transcriber};
use crate::config::SttConfig;
use crate::error::Result;
use tracing::{debug, info};

/// Root-mean-square energy of `samples`.
pub fn rms_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Streams audio into a batch [`Transcriber`], cutting utterances on
/// trailing silence.
///
/// Frames louder than `threshold` are speech. Once speech has started,
/// `min_silence_ms` of quiet ends the utterance; utterances shorter than
/// `min_speech_ms` are discarded as noise.
pub struct EndpointingRecognizer<T> {
    transcriber: T,
    sample_rate: u32,
    threshold: f32,
    silence_limit: usize,
    min_speech: usize,
    buffer: Vec<f32>,
    in_speech: bool,
    silent_samples: usize,
}

impl<T: Transcriber> EndpointingRecognizer<T> {
    /// Build from the STT settings. `sample_rate` is the rate of the frames
    /// passed to [`SpeechRecognizer::accept`].
    pub fn new(transcriber: T, config: &SttConfig, sample_rate: u32) -> Self {
        let per_ms = |ms: u32| (u64::from(ms) * u64::from(sample_rate) / 1000) as usize;
        let silence_limit = per_ms(config.min_silence_ms);
        let min_speech = per_ms(config.min_speech_ms);

        info!(
            "endpointer: threshold={}, silence={}ms, min_speech={}ms",
            config.threshold, config.min_silence_ms, config.min_speech_ms
        );

        Self {
            transcriber,
            sample_rate,
            threshold: config.threshold,
            silence_limit,
            min_speech,
            buffer: Vec::new(),
            in_speech: false,
            silent_samples: 0,
        }
    }

    /// The wrapped transcriber.
    pub fn transcriber(&self) -> &T {
        &self.transcriber
    }

    fn finish_utterance(&mut self) -> Result<Option<String>> {
        self.in_speech = false;
        self.silent_samples = 0;
        let utterance = std::mem::take(&mut self.buffer);

        let voiced = utterance.len().saturating_sub(self.silence_limit);
        if voiced < self.min_speech {
            debug!("dropping {} sample blip", utterance.len());
            return Ok(None);
        }

        let secs = utterance.len() as f32 / self.sample_rate as f32;
        debug!("utterance ended after {secs:.2}s");
        self.transcriber
            .transcribe(&utterance, self.sample_rate)
            .map(Some)
    }
}

impl<T: Transcriber> SpeechRecognizer for EndpointingRecognizer<T> {
    fn accept(&mut self, samples: &[f32]) -> Result<Option<String>> {
        let is_speech = rms_energy(samples) > self.threshold;

        if is_speech {
            self.in_speech = true;
            self.silent_samples = 0;
            self.buffer.extend_from_slice(samples);
            return Ok(None);
        }

        if !self.in_speech {
            return Ok(None);
        }

        // Trailing quiet stays in the utterance.
        self.buffer.extend_from_slice(samples);
        self.silent_samples += samples.len();
        if self.silent_samples >= self.silence_limit {
            return self.finish_utterance();
        }
        Ok(None)
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.in_speech = false;
        self.silent_samples = 0;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[derive(Default)]
    struct Recording {
        calls: Vec<usize>,
    }

    impl Transcriber for Recording {
        fn transcribe(&mut self, samples: &[f32], _sample_rate: u32) -> Result<String> {
            self.calls.push(samples.len());
            Ok(format!("{} samples", samples.len()))
        }
    }

    fn config() -> SttConfig {
        SttConfig {
            threshold: 0.1,
            min_silence_ms: 100,
            min_speech_ms: 50,
            ..SttConfig::default()
        }
    }

    // 10 ms frames at 16 kHz.
    fn loud() -> Vec<f32> {
        vec![0.5; 160]
    }

    fn quiet() -> Vec<f32> {
        vec![0.0; 160]
    }

    #[test]
    fn rms_of_constant_signal() {
        assert!((rms_energy(&[0.5, -0.5]) - 0.5).abs() < 1e-6);
        assert_eq!(rms_energy(&[]), 0.0);
    }

    #[test]
    fn silence_alone_never_finalises() {
        let mut rec = EndpointingRecognizer::new(Recording::default(), &config(), 16_000);
        for _ in 0..50 {
            assert!(rec.accept(&quiet()).unwrap().is_none());
        }
        assert!(rec.transcriber().calls.is_empty());
    }

    #[test]
    fn utterance_ends_after_trailing_silence() {
        let mut rec = EndpointingRecognizer::new(Recording::default(), &config(), 16_000);
        for _ in 0..10 {
            assert!(rec.accept(&loud()).unwrap().is_none());
        }
        for _ in 0..9 {
            assert!(rec.accept(&quiet()).unwrap().is_none());
        }
        let text = rec.accept(&quiet()).unwrap();
        assert_eq!(text.as_deref(), Some("3200 samples"));
    }

    #[test]
    fn short_blip_is_discarded() {
        let mut rec = EndpointingRecognizer::new(Recording::default(), &config(), 16_000);
        rec.accept(&loud()).unwrap();
        for _ in 0..10 {
            assert!(rec.accept(&quiet()).unwrap().is_none());
        }
        assert!(rec.transcriber().calls.is_empty());
    }

    #[test]
    fn reset_drops_partial_speech() {
        let mut rec = EndpointingRecognizer::new(Recording::default(), &config(), 16_000);
        for _ in 0..10 {
            rec.accept(&loud()).unwrap();
        }
        rec.reset();
        for _ in 0..20 {
            assert!(rec.accept(&quiet()).unwrap().is_none());
        }
        assert!(rec.transcriber().calls.is_empty());
    }
}
