//! Blocking PCM playback to the system speakers via cpal.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::audio::Resampler;
use crate::config::AudioConfig;
use crate::error::{HearthError, Result};
use cpal::StreamConfig;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{error, info};

/// Sequential sink for 16-bit mono PCM.
pub trait PcmSink {
    /// Queue samples for playback.
    ///
    /// # Errors
    ///
    /// Returns an error if the output stream has failed.
    fn write(&mut self, samples: &[i16]) -> Result<()>;

    /// Block until everything written so far has played.
    ///
    /// # Errors
    ///
    /// Returns an error if the output stream has failed.
    fn drain(&mut self) -> Result<()>;
}

/// Audio playback to the system speakers.
pub struct CpalPlayback {
    device: cpal::Device,
    stream_config: StreamConfig,
}

impl CpalPlayback {
    /// Open the configured output device (or the default one).
    ///
    /// # Errors
    ///
    /// Returns an error if no matching output device is available.
    pub fn new(config: &AudioConfig) -> Result<Self> {
        let host = cpal::default_host();

        let device = if let Some(ref name) = config.output_device {
            host.output_devices()
                .map_err(|e| HearthError::Audio(format!("cannot enumerate devices: {e}")))?
                .find(|d| {
                    d.description()
                        .ok()
                        .map(|desc| desc.name() == name)
                        .unwrap_or(false)
                })
                .ok_or_else(|| HearthError::Audio(format!("output device '{name}' not found")))?
        } else {
            host.default_output_device()
                .ok_or_else(|| HearthError::Audio("no default output device".into()))?
        };

        let device_name = device
            .description()
            .map(|d| d.name().to_owned())
            .unwrap_or_else(|_| "<unknown>".into());
        info!("using output device: {device_name}");

        let default_config = device
            .default_output_config()
            .map_err(|e| HearthError::Audio(format!("no default output config: {e}")))?;

        let stream_config = StreamConfig {
            channels: default_config.channels(),
            sample_rate: default_config.sample_rate(),
            buffer_size: cpal::BufferSize::Default,
        };

        Ok(Self {
            device,
            stream_config,
        })
    }

    /// Start an output stream fed with PCM at `source_rate`.
    ///
    /// # Errors
    ///
    /// Returns an error if the output stream cannot be built or started.
    pub fn open(&self, source_rate: u32) -> Result<PlaybackStream> {
        let queue = Arc::new(Mutex::new(PlaybackQueue::default()));
        let queue_cb = Arc::clone(&queue);
        let queue_err = Arc::clone(&queue);
        let channels = usize::from(self.stream_config.channels.max(1));

        let stream = self
            .device
            .build_output_stream(
                &self.stream_config,
                move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                    let mut q = match queue_cb.lock() {
                        Ok(q) => q,
                        Err(_) => return,
                    };
                    for frame in data.chunks_mut(channels) {
                        let sample = q.samples.pop_front().unwrap_or(0.0);
                        frame.fill(sample);
                    }
                },
                move |err| {
                    error!("audio output stream error: {err}");
                    if let Ok(mut q) = queue_err.lock() {
                        q.failed = true;
                    }
                },
                None,
            )
            .map_err(|e| HearthError::Audio(format!("failed to build output stream: {e}")))?;

        stream
            .play()
            .map_err(|e| HearthError::Audio(format!("failed to start output stream: {e}")))?;

        Ok(PlaybackStream {
            _stream: stream,
            queue,
            resampler: Resampler::new(source_rate, self.stream_config.sample_rate),
        })
    }

    /// List available output devices.
    ///
    /// # Errors
    ///
    /// Returns an error if devices cannot be enumerated.
    pub fn list_output_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices = host
            .output_devices()
            .map_err(|e| HearthError::Audio(format!("cannot enumerate devices: {e}")))?;

        Ok(devices
            .filter_map(|d| d.description().ok().map(|desc| desc.name().to_owned()))
            .collect())
    }
}

#[derive(Default)]
struct PlaybackQueue {
    samples: VecDeque<f32>,
    failed: bool,
}

/// A running output stream. Playback stops when this is dropped.
pub struct PlaybackStream {
    _stream: cpal::Stream,
    queue: Arc<Mutex<PlaybackQueue>>,
    resampler: Resampler,
}

impl PlaybackStream {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, PlaybackQueue>> {
        let q = self
            .queue
            .lock()
            .map_err(|e| HearthError::Audio(format!("playback queue lock poisoned: {e}")))?;
        if q.failed {
            return Err(HearthError::Audio("output stream failed".into()));
        }
        Ok(q)
    }
}

/// Scale 16-bit PCM to [-1, 1].
pub fn pcm16_to_f32(samples: &[i16]) -> Vec<f32> {
    samples
        .iter()
        .map(|&s| f32::from(s) / f32::from(i16::MAX))
        .collect()
}

impl PcmSink for PlaybackStream {
    fn write(&mut self, samples: &[i16]) -> Result<()> {
        let converted = self.resampler.process(&pcm16_to_f32(samples));
        self.lock()?.samples.extend(converted);
        Ok(())
    }

    fn drain(&mut self) -> Result<()> {
        loop {
            if self.lock()?.samples.is_empty() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        // Let the device play out its last hardware buffer.
        std::thread::sleep(Duration::from_millis(50));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcm16_scaling() {
        let out = pcm16_to_f32(&[0, i16::MAX, -i16::MAX]);
        assert_eq!(out, vec![0.0, 1.0, -1.0]);
    }
}
