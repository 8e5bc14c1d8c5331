//! WAV media decoding and playback cursor.

use anyhow::{bail, Context};
use std::path::Path;

/// Decoded media, mixed down to mono.
#[derive(Clone, Debug)]
pub struct MediaTrack {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl MediaTrack {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let reader = hound::WavReader::open(path)
            .with_context(|| format!("Failed to open media {:?}", path))?;
        let spec = reader.spec();
        let channels = spec.channels as usize;
        if channels == 0 {
            bail!("Media {:?} has no channels", path);
        }

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<_, _>>()
                .with_context(|| format!("Failed to decode {:?}", path))?,
            hound::SampleFormat::Int => {
                if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                    bail!(
                        "Media {:?} reports {} bits per sample",
                        path,
                        spec.bits_per_sample
                    );
                }
                let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<Result<_, _>>()
                    .with_context(|| format!("Failed to decode {:?}", path))?
            }
        };

        let samples = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();

        Ok(Self::new(samples, spec.sample_rate))
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Playback position over a track at the output device's rate.
///
/// Resampling picks the nearest earlier source sample.
pub struct MediaPlayer {
    track: MediaTrack,
    position: f64,
    step: f64,
}

impl MediaPlayer {
    pub fn new(track: MediaTrack, output_rate: u32) -> Self {
        let step = if output_rate == 0 {
            1.0
        } else {
            track.sample_rate as f64 / output_rate as f64
        };
        Self {
            track,
            position: 0.0,
            step,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.position as usize >= self.track.samples.len()
    }

    /// Next output sample, silence once the track has ended
    pub fn next_sample(&mut self) -> f32 {
        match self.track.samples.get(self.position as usize) {
            Some(&sample) => {
                self.position += self.step;
                sample
            }
            None => 0.0,
        }
    }
}
