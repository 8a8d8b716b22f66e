//! Microphone capture using cpal.
//!
//! Captures at the device's native configuration and converts to mono at
//! the configured rate (16 kHz by default) inside the audio callback. The
//! callback is the single producer of a bounded queue.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::audio::{Resampler, to_mono};
use crate::config::AudioConfig;
use crate::error::{HearthError, Result};
use cpal::StreamConfig;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Sender, TrySendError};
use tracing::{debug, error, info};

/// Audio capture from the system microphone.
pub struct CpalCapture {
    device: cpal::Device,
    stream_config: StreamConfig,
    target_sample_rate: u32,
}

/// A running input stream. Capture stops when this is dropped.
pub struct CaptureStream {
    _stream: cpal::Stream,
    failed: Arc<AtomicBool>,
}

impl CaptureStream {
    /// True once the device reported a stream error.
    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }
}

impl CpalCapture {
    /// Open the configured input device (or the default one).
    ///
    /// # Errors
    ///
    /// Returns an error if no matching input device is available.
    pub fn new(config: &AudioConfig) -> Result<Self> {
        let host = cpal::default_host();

        let device = if let Some(ref name) = config.input_device {
            host.input_devices()
                .map_err(|e| HearthError::Audio(format!("cannot enumerate devices: {e}")))?
                .find(|d| {
                    d.description()
                        .ok()
                        .map(|desc| desc.name() == name)
                        .unwrap_or(false)
                })
                .ok_or_else(|| HearthError::Audio(format!("input device '{name}' not found")))?
        } else {
            host.default_input_device()
                .ok_or_else(|| HearthError::Audio("no default input device".into()))?
        };

        let device_name = device
            .description()
            .map(|d| d.name().to_owned())
            .unwrap_or_else(|_| "<unknown>".into());
        info!("using input device: {device_name}");

        let default_config = device
            .default_input_config()
            .map_err(|e| HearthError::Audio(format!("no default input config: {e}")))?;

        let stream_config = StreamConfig {
            channels: default_config.channels(),
            sample_rate: default_config.sample_rate(),
            buffer_size: cpal::BufferSize::Default,
        };

        info!(
            "native input config: {}Hz, {} channels -> {}Hz mono",
            stream_config.sample_rate, stream_config.channels, config.input_sample_rate
        );

        Ok(Self {
            device,
            stream_config,
            target_sample_rate: config.input_sample_rate,
        })
    }

    /// Rate of the samples delivered to the queue.
    pub fn sample_rate(&self) -> u32 {
        self.target_sample_rate
    }

    /// Start capturing into `tx`.
    ///
    /// Buffers are dropped (never blocked on) when the queue is full. The
    /// returned handle keeps the stream alive.
    ///
    /// # Errors
    ///
    /// Returns an error if the input stream cannot be built or started.
    pub fn start(&self, tx: Sender<Vec<f32>>) -> Result<CaptureStream> {
        let native_channels = self.stream_config.channels;
        let mut resampler = Resampler::new(self.stream_config.sample_rate, self.target_sample_rate);
        let failed = Arc::new(AtomicBool::new(false));
        let failed_flag = Arc::clone(&failed);

        let stream = self
            .device
            .build_input_stream(
                &self.stream_config,
                move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                    let mono = if native_channels > 1 {
                        to_mono(data, native_channels)
                    } else {
                        data.to_vec()
                    };
                    let samples = resampler.process(&mono);
                    match tx.try_send(samples) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => debug!("capture queue full, dropping buffer"),
                        Err(TrySendError::Disconnected(_)) => {}
                    }
                },
                move |err| {
                    error!("audio input stream error: {err}");
                    failed_flag.store(true, Ordering::Release);
                },
                None,
            )
            .map_err(|e| HearthError::Audio(format!("failed to build input stream: {e}")))?;

        stream
            .play()
            .map_err(|e| HearthError::Audio(format!("failed to start input stream: {e}")))?;

        info!("audio capture started");
        Ok(CaptureStream {
            _stream: stream,
            failed,
        })
    }

    /// List available input devices.
    ///
    /// # Errors
    ///
    /// Returns an error if devices cannot be enumerated.
    pub fn list_input_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|e| HearthError::Audio(format!("cannot enumerate devices: {e}")))?;

        Ok(devices
            .filter_map(|d| d.description().ok().map(|desc| desc.name().to_owned()))
            .collect())
    }
}
