//! Piper voice driven through the `piper` command-line binary.
//!
//! The voice runs in one long-lived `piper --output_dir` process, spawned
//! on first use: each stdin line is one utterance and piper answers with
//! the path of the WAV it wrote. Streaming sends one line per sentence so
//! audio starts after the first sentence. If that process fails before
//! producing audio, synthesis falls back to a one-shot `piper -f`.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use super::{AudioChunk, SpeechSynthesizer};
use crate::config::TtsConfig;
use crate::error::{HearthError, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct VoiceConfig {
    audio: VoiceAudio,
}

#[derive(Debug, Deserialize)]
struct VoiceAudio {
    sample_rate: u32,
}

/// Path of the JSON config Piper ships next to a voice model
/// (`<model>.onnx.json`).
pub fn voice_config_path(model: &Path) -> PathBuf {
    let mut name = model.as_os_str().to_owned();
    name.push(".json");
    PathBuf::from(name)
}

/// Split `text` into sentence lines for piper. Newlines become spaces
/// since piper treats each line as its own utterance.
fn sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(if c == '\n' || c == '\r' { ' ' } else { c });
        let boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().is_none_or(|next| next.is_whitespace());
        if boundary {
            push_line(&mut out, &current);
            current.clear();
        }
    }
    push_line(&mut out, &current);
    out
}

fn single_line(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    push_line(&mut out, &text.replace(['\n', '\r'], " "));
    out
}

fn push_line(out: &mut Vec<String>, line: &str) {
    let line = line.trim();
    if !line.is_empty() {
        out.push(line.to_owned());
    }
}

fn spawn_error(e: std::io::Error) -> HearthError {
    HearthError::Tts(format!("failed to start piper: {e}"))
}

/// Kill and reap `child`, ignoring a process that already exited.
fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// A running `piper --output_dir` process with the voice loaded.
#[derive(Debug)]
struct PiperProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    out_dir: PathBuf,
}

impl PiperProcess {
    fn spawn(binary: &Path, model: &Path) -> Result<Self> {
        let out_dir = std::env::temp_dir().join(format!("hearth-piper-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&out_dir)?;

        let mut child = match Command::new(binary)
            .arg("--model")
            .arg(model)
            .arg("--output_dir")
            .arg(&out_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                let _ = std::fs::remove_dir_all(&out_dir);
                return Err(spawn_error(e));
            }
        };

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            reap(&mut child);
            let _ = std::fs::remove_dir_all(&out_dir);
            return Err(HearthError::Tts("piper stdio unavailable".into()));
        };

        debug!("started piper process {}", child.id());
        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            out_dir,
        })
    }

    /// Synthesize one line and return the WAV piper wrote for it.
    fn request(&mut self, line: &str) -> Result<PathBuf> {
        writeln!(self.stdin, "{line}")?;
        self.stdin.flush()?;

        let mut reply = String::new();
        if self.stdout.read_line(&mut reply)? == 0 {
            return Err(HearthError::Tts("piper exited unexpectedly".into()));
        }
        let wav = PathBuf::from(reply.trim());
        if wav.as_os_str().is_empty() {
            return Err(HearthError::Tts("piper returned no output path".into()));
        }
        Ok(wav)
    }
}

impl Drop for PiperProcess {
    fn drop(&mut self) {
        reap(&mut self.child);
        if let Err(e) = std::fs::remove_dir_all(&self.out_dir) {
            debug!("could not remove {}: {e}", self.out_dir.display());
        }
    }
}

/// A Piper voice model and the binary used to run it.
#[derive(Debug)]
pub struct PiperVoice {
    model: PathBuf,
    binary: PathBuf,
    sample_rate: u32,
    prefer_streaming: bool,
    process: Option<PiperProcess>,
}

impl PiperVoice {
    /// Load a voice from settings, resolving `piper` on `PATH` when no
    /// binary is configured.
    ///
    /// # Errors
    ///
    /// See [`PiperVoice::load`].
    pub fn from_config(config: &TtsConfig) -> Result<Self> {
        let binary = match config.piper_binary {
            Some(ref path) => path.clone(),
            None => which::which("piper")
                .map_err(|_| HearthError::Tts("piper binary not found on PATH".into()))?,
        };
        Ok(Self::load(&config.voice_model, binary)?.with_streaming(config.prefer_streaming))
    }

    /// Load the voice model at `model`, reading the sample rate from its
    /// `.onnx.json` companion. The piper process itself starts on the
    /// first synthesis and is reused after that.
    ///
    /// # Errors
    ///
    /// Returns [`HearthError::Tts`] if the model or its config is missing
    /// or malformed.
    pub fn load(model: &Path, binary: PathBuf) -> Result<Self> {
        if !model.is_file() {
            return Err(HearthError::Tts(format!(
                "voice model not found: {}",
                model.display()
            )));
        }

        let config_path = voice_config_path(model);
        let raw = std::fs::read_to_string(&config_path).map_err(|e| {
            HearthError::Tts(format!(
                "cannot read voice config {}: {e}",
                config_path.display()
            ))
        })?;
        let config: VoiceConfig = serde_json::from_str(&raw).map_err(|e| {
            HearthError::Tts(format!(
                "invalid voice config {}: {e}",
                config_path.display()
            ))
        })?;

        info!(
            "loaded voice {} ({} Hz)",
            model.display(),
            config.audio.sample_rate
        );

        Ok(Self {
            model: model.to_path_buf(),
            binary,
            sample_rate: config.audio.sample_rate,
            prefer_streaming: true,
            process: None,
        })
    }

    /// Choose whether text is sent sentence by sentence or in one piece.
    #[must_use]
    pub fn with_streaming(mut self, prefer_streaming: bool) -> Self {
        self.prefer_streaming = prefer_streaming;
        self
    }

    fn process(&mut self) -> Result<&mut PiperProcess> {
        let process = match self.process.take() {
            Some(process) => process,
            None => PiperProcess::spawn(&self.binary, &self.model)?,
        };
        Ok(self.process.insert(process))
    }

    /// Send `lines` to the resident process. Returns how many chunks were
    /// delivered, so the caller can tell whether falling back is safe.
    fn synthesize_resident(
        &mut self,
        lines: &[String],
        on_chunk: &mut dyn FnMut(AudioChunk) -> Result<()>,
        delivered: &mut usize,
    ) -> Result<()> {
        for line in lines {
            let process = self.process()?;
            let chunk = process.request(line).and_then(|wav| {
                let chunk = read_wav_chunk(&wav);
                if let Err(e) = std::fs::remove_file(&wav) {
                    debug!("could not remove {}: {e}", wav.display());
                }
                chunk
            });
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    self.process = None;
                    return Err(e);
                }
            };
            on_chunk(chunk)?;
            *delivered += 1;
        }
        Ok(())
    }

    fn synthesize_wav(
        &self,
        text: &str,
        on_chunk: &mut dyn FnMut(AudioChunk) -> Result<()>,
    ) -> Result<()> {
        let wav = std::env::temp_dir().join(format!("hearth-tts-{}.wav", uuid::Uuid::new_v4()));

        let mut child = Command::new(&self.binary)
            .arg("--model")
            .arg(&self.model)
            .arg("-f")
            .arg(&wav)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(spawn_error)?;
        if let Some(mut stdin) = child.stdin.take()
            && let Err(e) = stdin.write_all(text.as_bytes())
        {
            reap(&mut child);
            return Err(e.into());
        }
        let status = child.wait()?;

        let decoded = if status.success() {
            read_wav_chunk(&wav)
        } else {
            Err(HearthError::Tts(format!("piper exited with {status}")))
        };
        if let Err(e) = std::fs::remove_file(&wav) {
            debug!("could not remove {}: {e}", wav.display());
        }
        on_chunk(decoded?)
    }
}

impl SpeechSynthesizer for PiperVoice {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn synthesize(
        &mut self,
        text: &str,
        on_chunk: &mut dyn FnMut(AudioChunk) -> Result<()>,
    ) -> Result<()> {
        let lines = if self.prefer_streaming {
            sentences(text)
        } else {
            single_line(text)
        };
        if lines.is_empty() {
            return Ok(());
        }

        let mut delivered = 0;
        match self.synthesize_resident(&lines, on_chunk, &mut delivered) {
            Ok(()) => Ok(()),
            Err(e) if delivered == 0 && self.process.is_none() => {
                warn!("piper process failed, falling back to one-shot WAV: {e}");
                self.synthesize_wav(&lines.join(" "), on_chunk)
            }
            Err(e) => Err(e),
        }
    }
}

/// Read a WAV file as one chunk: 16-bit integer audio stays PCM, anything
/// else is decoded to floats.
///
/// # Errors
///
/// Returns [`HearthError::Tts`] if the file cannot be read or decoded.
pub fn read_wav_chunk(path: &Path) -> Result<AudioChunk> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| HearthError::Tts(format!("cannot open {}: {e}", path.display())))?;
    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        drop(reader);
        return decode_wav(path).map(AudioChunk::Float);
    }

    let samples = reader
        .into_samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| HearthError::Tts(format!("cannot decode {}: {e}", path.display())))?;
    Ok(AudioChunk::Pcm16(
        samples.iter().flat_map(|s| s.to_le_bytes()).collect(),
    ))
}

/// Decode a mono WAV file to float samples in [-1, 1].
///
/// # Errors
///
/// Returns [`HearthError::Tts`] if the file cannot be read or decoded.
pub fn decode_wav(path: &Path) -> Result<Vec<f32>> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| HearthError::Tts(format!("cannot open {}: {e}", path.display())))?;
    let spec = reader.spec();

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>(),
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<Vec<_>, _>>()
        }
    };

    samples.map_err(|e| HearthError::Tts(format!("cannot decode {}: {e}", path.display())))
}
