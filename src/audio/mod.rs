//! Audio capture and playback via cpal.

pub mod capture;
pub mod playback;

pub use capture::{CaptureStream, CpalCapture};
pub use playback::{CpalPlayback, PcmSink, PlaybackStream};

/// Convert interleaved multi-channel audio to mono by averaging channels.
pub fn to_mono(data: &[f32], channels: u16) -> Vec<f32> {
    let ch = usize::from(channels.max(1));
    data.chunks_exact(ch)
        .map(|frame| frame.iter().sum::<f32>() / ch as f32)
        .collect()
}

/// Streaming linear-interpolation resampler from `src_rate` to `dst_rate`.
///
/// State carries across calls: the fractional read position and the last
/// input sample, so a stream fed in callback-sized buffers has no gaps or
/// edge discontinuities and its output length tracks the exact rate ratio.
/// One sample of lookahead is held back until the next buffer arrives.
///
/// Adequate for speech: there is no anti-alias filter, and speech energy
/// sits well below the Nyquist frequency of the rates used here.
#[derive(Debug, Clone)]
pub struct Resampler {
    ratio: f64,
    passthrough: bool,
    /// Read position relative to the start of `last` + next buffer.
    pos: f64,
    last: Option<f32>,
}

impl Resampler {
    pub fn new(src_rate: u32, dst_rate: u32) -> Self {
        let passthrough = src_rate == dst_rate || src_rate == 0 || dst_rate == 0;
        let ratio = if passthrough {
            1.0
        } else {
            f64::from(src_rate) / f64::from(dst_rate)
        };
        Self {
            ratio,
            passthrough,
            pos: 0.0,
            last: None,
        }
    }

    /// Resample the next buffer of the stream.
    pub fn process(&mut self, input: &[f32]) -> Vec<f32> {
        if self.passthrough {
            return input.to_vec();
        }

        let mut window = Vec::with_capacity(input.len() + 1);
        window.extend(self.last);
        window.extend_from_slice(input);
        let Some(&tail) = window.last() else {
            return Vec::new();
        };

        let mut output = Vec::with_capacity((window.len() as f64 / self.ratio) as usize + 1);
        loop {
            let idx = self.pos as usize;
            if idx + 1 >= window.len() {
                break;
            }
            let frac = self.pos - idx as f64;
            let sample = f64::from(window[idx]) * (1.0 - frac) + f64::from(window[idx + 1]) * frac;
            output.push(sample as f32);
            self.pos += self.ratio;
        }

        // The next window starts at this window's final sample.
        self.pos -= (window.len() - 1) as f64;
        self.last = Some(tail);
        output
    }
}

/// Names of every input and output device on the default host.
///
/// # Errors
///
/// Returns an error if devices cannot be enumerated.
pub fn list_devices() -> crate::error::Result<(Vec<String>, Vec<String>)> {
    Ok((
        CpalCapture::list_input_devices()?,
        CpalPlayback::list_output_devices()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_mono_averages_frames() {
        let stereo = [0.5, -0.5, 1.0, 0.0];
        assert_eq!(to_mono(&stereo, 2), vec![0.0, 0.5]);
        assert_eq!(to_mono(&[0.25, 0.75], 1), vec![0.25, 0.75]);
    }

    #[test]
    fn resample_48k_to_16k_thirds_length() {
        let input: Vec<f32> = (0..480).map(|i| i as f32).collect();
        let out = Resampler::new(48_000, 16_000).process(&input);
        assert_eq!(out.len(), 160);
        assert!((out[1] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn resample_upsamples_with_lookahead() {
        let mut resampler = Resampler::new(8_000, 16_000);
        let out = resampler.process(&[0.0, 1.0]);
        assert_eq!(out, vec![0.0, 0.5]);
        let out = resampler.process(&[2.0]);
        assert_eq!(out, vec![1.0, 1.5]);
    }

    #[test]
    fn resample_identity_and_empty() {
        assert_eq!(Resampler::new(16_000, 16_000).process(&[0.1, 0.2]), vec![0.1, 0.2]);
        assert!(Resampler::new(48_000, 16_000).process(&[]).is_empty());
    }

    #[test]
    fn chunked_stream_matches_single_pass() {
        let input: Vec<f32> = (0..44_100).map(|i| (i as f32 * 0.01).sin()).collect();

        let whole = Resampler::new(44_100, 16_000).process(&input);
        let mut chunked = Vec::new();
        let mut resampler = Resampler::new(44_100, 16_000);
        for buffer in input.chunks(441) {
            chunked.extend(resampler.process(buffer));
        }

        assert!((chunked.len() as i64 - whole.len() as i64).abs() <= 1);
        assert!((whole.len() as i64 - 16_000).abs() <= 1);
        for (a, b) in chunked.iter().zip(&whole) {
            assert!((a - b).abs() < 1e-4, "{a} vs {b}");
        }
    }

    #[test]
    fn tiny_buffers_are_not_lost() {
        let mut resampler = Resampler::new(48_000, 16_000);
        let mut out = Vec::new();
        for i in 0..4_800 {
            out.extend(resampler.process(&[i as f32]));
        }
        assert_eq!(out.len(), 1_600);
        assert!((out[1_599] - 4_797.0).abs() < 1e-3);
    }
}
