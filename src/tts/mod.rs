//! Text-to-speech: the synthesizer contract, chunk normalisation to 16-bit
//! PCM, and blocking playback of synthesized speech.

mod piper;

pub use piper::{PiperVoice, decode_wav, read_wav_chunk, voice_config_path};

use crate::audio::{CpalPlayback, PcmSink};
use crate::config::{AudioConfig, TtsConfig};
use crate::error::Result;
use tracing::debug;

/// A piece of synthesized audio.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioChunk {
    /// Float samples in [-1, 1].
    Float(Vec<f32>),
    /// Little-endian signed 16-bit PCM bytes.
    Pcm16(Vec<u8>),
}

impl AudioChunk {
    /// Normalise to 16-bit PCM. Floats are clipped to [-1, 1] and scaled by
    /// 32767; a trailing odd byte in `Pcm16` is ignored.
    pub fn to_i16(&self) -> Vec<i16> {
        match self {
            Self::Float(samples) => samples
                .iter()
                .map(|s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
                .collect(),
            Self::Pcm16(bytes) => bytes
                .chunks_exact(2)
                .map(|b| i16::from_le_bytes([b[0], b[1]]))
                .collect(),
        }
    }
}

/// Turns text into a sequence of audio chunks.
pub trait SpeechSynthesizer {
    /// Output sample rate of every chunk.
    fn sample_rate(&self) -> u32;

    /// Synthesize `text`, handing each chunk to `on_chunk` in order.
    ///
    /// # Errors
    ///
    /// Returns an error if synthesis fails or `on_chunk` does.
    fn synthesize(
        &mut self,
        text: &str,
        on_chunk: &mut dyn FnMut(AudioChunk) -> Result<()>,
    ) -> Result<()>;
}

/// Synthesize `text` into `sink` and block until it has drained.
///
/// Empty or whitespace-only text is a no-op.
///
/// # Errors
///
/// Returns an error if synthesis or playback fails.
pub fn speak<S, K>(text: &str, synth: &mut S, sink: &mut K) -> Result<()>
where
    S: SpeechSynthesizer + ?Sized,
    K: PcmSink + ?Sized,
{
    if text.trim().is_empty() {
        return Ok(());
    }

    let mut written = 0usize;
    synth.synthesize(text, &mut |chunk| {
        let pcm = chunk.to_i16();
        written += pcm.len();
        sink.write(&pcm)
    })?;
    debug!("queued {written} samples for playback");
    sink.drain()
}

/// A loaded voice bound to the output device.
pub struct Speaker<S> {
    synth: S,
    playback: CpalPlayback,
}

impl Speaker<PiperVoice> {
    /// Load the Piper voice and open the configured output device.
    ///
    /// # Errors
    ///
    /// Returns an error if the voice or the output device is unavailable.
    pub fn from_config(tts: &TtsConfig, audio: &AudioConfig) -> Result<Self> {
        let voice = PiperVoice::from_config(tts)?;
        let playback = CpalPlayback::new(audio)?;
        Ok(Self::new(voice, playback))
    }
}

impl<S: SpeechSynthesizer> Speaker<S> {
    /// Pair a synthesizer with an output device.
    pub fn new(synth: S, playback: CpalPlayback) -> Self {
        Self { synth, playback }
    }

    /// Speak `text` on a fresh output stream, blocking until done.
    ///
    /// # Errors
    ///
    /// Returns an error if synthesis or playback fails.
    pub fn speak(&mut self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let mut stream = self.playback.open(self.synth.sample_rate())?;
        speak(text, &mut self.synth, &mut stream)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::error::HearthError;

    #[derive(Default)]
    struct MemorySink {
        samples: Vec<i16>,
        drained: bool,
    }

    impl PcmSink for MemorySink {
        fn write(&mut self, samples: &[i16]) -> Result<()> {
            self.samples.extend_from_slice(samples);
            Ok(())
        }

        fn drain(&mut self) -> Result<()> {
            self.drained = true;
            Ok(())
        }
    }

    struct TwoChunks {
        calls: usize,
    }

    impl SpeechSynthesizer for TwoChunks {
        fn sample_rate(&self) -> u32 {
            22_050
        }

        fn synthesize(
            &mut self,
            _text: &str,
            on_chunk: &mut dyn FnMut(AudioChunk) -> Result<()>,
        ) -> Result<()> {
            self.calls += 1;
            on_chunk(AudioChunk::Float(vec![0.0, 1.0]))?;
            on_chunk(AudioChunk::Pcm16(vec![0x02, 0x00]))
        }
    }

    struct Failing;

    impl SpeechSynthesizer for Failing {
        fn sample_rate(&self) -> u32 {
            16_000
        }

        fn synthesize(
            &mut self,
            _text: &str,
            _on_chunk: &mut dyn FnMut(AudioChunk) -> Result<()>,
        ) -> Result<()> {
            Err(HearthError::Tts("voice crashed".into()))
        }
    }

    #[test]
    fn float_chunks_are_clipped_and_scaled() {
        let chunk = AudioChunk::Float(vec![0.0, 0.5, 1.0, -1.0, 2.0, -3.0]);
        assert_eq!(chunk.to_i16(), vec![0, 16383, 32767, -32767, 32767, -32767]);
    }

    #[test]
    fn pcm16_chunks_are_little_endian() {
        let chunk = AudioChunk::Pcm16(vec![0x01, 0x00, 0xff, 0x7f, 0x00, 0x80, 0x09]);
        assert_eq!(chunk.to_i16(), vec![1, i16::MAX, i16::MIN]);
    }

    #[test]
    fn speak_writes_chunks_in_order_then_drains() {
        let mut synth = TwoChunks { calls: 0 };
        let mut sink = MemorySink::default();
        speak("hello", &mut synth, &mut sink).unwrap();
        assert_eq!(sink.samples, vec![0, 32767, 2]);
        assert!(sink.drained);
    }

    #[test]
    fn empty_text_is_a_no_op() {
        let mut synth = TwoChunks { calls: 0 };
        let mut sink = MemorySink::default();
        speak("   ", &mut synth, &mut sink).unwrap();
        assert_eq!(synth.calls, 0);
        assert!(sink.samples.is_empty());
        assert!(!sink.drained);
    }

    #[test]
    fn synthesis_error_propagates() {
        let mut sink = MemorySink::default();
        let err = speak("hi", &mut Failing, &mut sink).unwrap_err();
        assert!(err.to_string().contains("voice crashed"));
        assert!(!sink.drained);
    }
}
