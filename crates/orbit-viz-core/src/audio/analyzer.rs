//! Frequency analysis of raw sample blocks.
//!
//! Produces the same byte-frequency data as a browser analyser node: a
//! Blackman-windowed FFT over the most recent `2 * band_count` samples,
//! smoothed over time and mapped from [-100 dB, -30 dB] onto `0..=255`.
//! Alongside the bands it reports the block's peak amplitude and its value in
//! decibels.

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;
use thiserror::Error;

/// Samples per processing tick, delivered by the audio backend
pub const BLOCK_SIZE: usize = 1024;

pub const DEFAULT_BAND_COUNT: usize = 32;
pub const DEFAULT_SMOOTHING: f32 = 0.1;

/// Decibel value reported for silence
pub const SILENCE_FLOOR_DB: f32 = -72.0;

/// Byte mapping range for band magnitudes
const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;

/// Converts a peak amplitude to decibels, floored at [`SILENCE_FLOOR_DB`].
pub fn decibels(amplitude: f32) -> f32 {
    let floor = 10f64.powf(SILENCE_FLOOR_DB as f64 / 20.0);
    let db = 20.0 * (amplitude as f64).max(floor).log10();
    (db as f32).max(SILENCE_FLOOR_DB)
}

#[derive(Debug, Error, PartialEq)]
pub enum AnalyzerError {
    #[error("band count must be at least 1")]
    NoBands,
    #[error("smoothing must be within [0, 1], got {0}")]
    InvalidSmoothing(f32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnalyzerConfig {
    /// Number of frequency bands (the FFT size is twice this)
    pub band_count: usize,
    /// Time smoothing between consecutive ticks (0 = none, 1 = frozen)
    pub smoothing: f32,
    /// Analyse without routing the source to the audio output
    pub muted: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            band_count: DEFAULT_BAND_COUNT,
            smoothing: DEFAULT_SMOOTHING,
            muted: false,
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), AnalyzerError> {
        if self.band_count == 0 {
            return Err(AnalyzerError::NoBands);
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(AnalyzerError::InvalidSmoothing(self.smoothing));
        }
        Ok(())
    }
}

/// Live frequency data: fixed-length byte bands plus peak energy and decibels.
///
/// The band buffer is allocated once and only ever overwritten in place.
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencySnapshot {
    bands: Vec<u8>,
    /// Peak amplitude of the last block
    pub energy: f32,
    /// `energy` in decibels
    pub decibels: f32,
}

impl FrequencySnapshot {
    pub fn new(band_count: usize) -> Self {
        Self {
            bands: vec![0; band_count],
            energy: 0.0,
            decibels: SILENCE_FLOOR_DB,
        }
    }

    pub fn bands(&self) -> &[u8] {
        &self.bands
    }

    /// Mutable access to the band values; the length cannot change.
    pub fn bands_mut(&mut self) -> &mut [u8] {
        &mut self.bands
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Sum of the first `count` bands (fewer if the snapshot is shorter).
    pub fn low_end(&self, count: usize) -> f32 {
        self.bands.iter().take(count).map(|&b| b as f32).sum()
    }

    /// Copies another snapshot's values into this one.
    ///
    /// Only the overlapping prefix of the bands is copied when lengths differ.
    pub fn copy_from(&mut self, other: &FrequencySnapshot) {
        for (dst, src) in self.bands.iter_mut().zip(other.bands.iter()) {
            *dst = *src;
        }
        self.energy = other.energy;
        self.decibels = other.decibels;
    }
}

/// Pass-through analysis tap fed one sample block per audio tick
pub struct FrequencyAnalyzer {
    config: AnalyzerConfig,

    // FFT resources (pre-allocated)
    fft: Arc<dyn Fft<f32>>,
    fft_buffer: Vec<Complex<f32>>,
    fft_window: Vec<f32>,

    /// Most recent FFT-size input samples, oldest first
    history: Vec<f32>,
    /// Time-smoothed linear magnitudes per band
    smoothed: Vec<f32>,

    snapshot: FrequencySnapshot,
    initialized: bool,
}

impl FrequencyAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self, AnalyzerError> {
        config.validate()?;

        let fft_size = config.band_count * 2;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        // Blackman window (alpha = 0.16)
        let tau = 2.0 * std::f32::consts::PI;
        let fft_window: Vec<f32> = (0..fft_size)
            .map(|i| {
                let x = i as f32 / fft_size as f32;
                0.42 - 0.5 * (tau * x).cos() + 0.08 * (2.0 * tau * x).cos()
            })
            .collect();

        Ok(Self {
            config,
            fft,
            fft_buffer: vec![Complex::new(0.0, 0.0); fft_size],
            fft_window,
            history: vec![0.0; fft_size],
            smoothed: vec![0.0; config.band_count],
            snapshot: FrequencySnapshot::new(config.band_count),
            initialized: false,
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn is_muted(&self) -> bool {
        self.config.muted
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Wires the analyzer to its source. Called on every play event; only the
    /// first call has an effect. Returns true when wiring happened now.
    pub fn ready(&mut self) -> bool {
        if self.initialized {
            return false;
        }
        self.initialized = true;
        log::debug!(
            "Analyzer wired: {} bands, smoothing {}, muted {}",
            self.config.band_count,
            self.config.smoothing,
            self.config.muted
        );
        true
    }

    pub fn snapshot(&self) -> &FrequencySnapshot {
        &self.snapshot
    }

    /// Processes one audio tick.
    ///
    /// `output` is always zeroed: the analyzer observes its input and never
    /// feeds it back. Returns the updated snapshot once the analyzer is wired.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) -> Option<&FrequencySnapshot> {
        output.iter_mut().for_each(|s| *s = 0.0);

        if !self.initialized {
            return None;
        }

        self.push_history(input);
        self.compute_bands();

        let energy = input
            .iter()
            .fold(0.0f32, |max, &s| if s > max { s } else { max });
        self.snapshot.energy = energy;
        self.snapshot.decibels = decibels(energy);

        Some(&self.snapshot)
    }

    fn push_history(&mut self, input: &[f32]) {
        let size = self.history.len();
        if input.len() >= size {
            self.history.copy_from_slice(&input[input.len() - size..]);
        } else {
            self.history.rotate_left(input.len());
            self.history[size - input.len()..].copy_from_slice(input);
        }
    }

    fn compute_bands(&mut self) {
        let fft_size = self.fft_buffer.len();

        for (i, slot) in self.fft_buffer.iter_mut().enumerate() {
            *slot = Complex::new(self.history[i] * self.fft_window[i], 0.0);
        }

        self.fft.process(&mut self.fft_buffer);

        let smoothing = self.config.smoothing;
        let norm = 1.0 / fft_size as f32;
        let byte_scale = 255.0 / (MAX_DECIBELS - MIN_DECIBELS);

        for (k, band) in self.snapshot.bands.iter_mut().enumerate() {
            let magnitude = self.fft_buffer[k].norm() * norm;
            let value = smoothing * self.smoothed[k] + (1.0 - smoothing) * magnitude;
            self.smoothed[k] = if value.is_finite() { value } else { 0.0 };

            // log10(0) is -inf, which clamps to 0
            let db = 20.0 * self.smoothed[k].log10();
            let scaled = (byte_scale * (db - MIN_DECIBELS)).floor();
            *band = scaled.clamp(0.0, 255.0) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn wired(config: AnalyzerConfig) -> FrequencyAnalyzer {
        let mut analyzer = FrequencyAnalyzer::new(config).unwrap();
        analyzer.ready();
        analyzer
    }

    fn block_with_peak(peak: f32) -> Vec<f32> {
        let mut block = vec![0.0; BLOCK_SIZE];
        block[BLOCK_SIZE / 2] = peak;
        block
    }

    #[test]
    fn test_decibel_floor() {
        assert_eq!(decibels(0.0), -72.0);
        assert!((decibels(0.5) - -6.0206).abs() < 1e-3);
        assert!(decibels(1.0).abs() < 1e-6);
    }

    #[test]
    fn test_config_validation() {
        let no_bands = AnalyzerConfig {
            band_count: 0,
            ..Default::default()
        };
        assert_eq!(
            FrequencyAnalyzer::new(no_bands).err(),
            Some(AnalyzerError::NoBands)
        );

        let bad_smoothing = AnalyzerConfig {
            smoothing: 1.5,
            ..Default::default()
        };
        assert_eq!(
            FrequencyAnalyzer::new(bad_smoothing).err(),
            Some(AnalyzerError::InvalidSmoothing(1.5))
        );
    }

    #[test]
    fn test_ready_is_idempotent() {
        let mut analyzer = FrequencyAnalyzer::new(AnalyzerConfig::default()).unwrap();
        assert!(!analyzer.is_initialized());
        assert!(analyzer.ready());
        assert!(!analyzer.ready());
        assert!(!analyzer.ready());
        assert!(analyzer.is_initialized());
    }

    #[test]
    fn test_muted_flag() {
        let analyzer = FrequencyAnalyzer::new(AnalyzerConfig::default()).unwrap();
        assert!(!analyzer.is_muted());

        let muted = FrequencyAnalyzer::new(AnalyzerConfig {
            muted: true,
            ..Default::default()
        })
        .unwrap();
        assert!(muted.is_muted());
    }

    #[test]
    fn test_ignores_blocks_before_ready() {
        let mut analyzer = FrequencyAnalyzer::new(AnalyzerConfig::default()).unwrap();
        let mut output = vec![1.0; BLOCK_SIZE];
        assert!(analyzer.process(&block_with_peak(0.8), &mut output).is_none());
        assert!(output.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_output_is_always_zeroed() {
        let mut analyzer = wired(AnalyzerConfig::default());
        let input: Vec<f32> = (0..BLOCK_SIZE).map(|i| (i as f32 * 0.1).sin()).collect();
        let mut output = vec![0.7; BLOCK_SIZE];
        analyzer.process(&input, &mut output);
        assert!(output.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_band_count_fixed() {
        let mut analyzer = wired(AnalyzerConfig::default());
        let mut output = vec![0.0; BLOCK_SIZE];
        for _ in 0..4 {
            let snapshot = analyzer.process(&block_with_peak(0.3), &mut output).unwrap();
            assert_eq!(snapshot.len(), 32);
        }
        // Short blocks still leave the band count alone
        let snapshot = analyzer.process(&[0.1; 7], &mut output[..7]).unwrap();
        assert_eq!(snapshot.len(), 32);
    }

    #[test]
    fn test_peak_ignores_negative_excursions() {
        let mut analyzer = wired(AnalyzerConfig::default());
        let mut output = vec![0.0; BLOCK_SIZE];
        let mut block = vec![-0.9; BLOCK_SIZE];
        block[3] = 0.25;
        let snapshot = analyzer.process(&block, &mut output).unwrap();
        assert_eq!(snapshot.energy, 0.25);

        let snapshot = analyzer.process(&[-0.5; BLOCK_SIZE], &mut output).unwrap();
        assert_eq!(snapshot.energy, 0.0);
        assert_eq!(snapshot.decibels, -72.0);
    }

    #[test]
    fn test_silence_has_empty_bands() {
        let mut analyzer = wired(AnalyzerConfig::default());
        let mut output = vec![0.0; BLOCK_SIZE];
        let snapshot = analyzer.process(&[0.0; BLOCK_SIZE], &mut output).unwrap();
        assert!(snapshot.bands().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_tone_lands_in_its_band() {
        let mut analyzer = wired(AnalyzerConfig::default());
        let mut output = vec![0.0; BLOCK_SIZE];
        // Period of 16 samples puts the tone in bin 4 of a 64-point FFT
        let input: Vec<f32> = (0..BLOCK_SIZE)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * i as f32 / 16.0).sin())
            .collect();
        let snapshot = analyzer.process(&input, &mut output).unwrap();
        let bands = snapshot.bands();
        assert_eq!(bands[4], 255);
        assert!(bands[4] > bands[12]);
        assert!(bands[4] > bands[24]);
    }

    #[test]
    fn test_smoothing_decays_gradually() {
        let config = AnalyzerConfig {
            smoothing: 0.8,
            ..Default::default()
        };
        let mut analyzer = wired(config);
        let mut output = vec![0.0; BLOCK_SIZE];
        let tone: Vec<f32> = (0..BLOCK_SIZE)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * i as f32 / 16.0).sin())
            .collect();
        analyzer.process(&tone, &mut output);
        let loud = analyzer.snapshot().bands()[4];

        // One silent tick keeps most of the smoothed magnitude
        let after = analyzer.process(&[0.0; BLOCK_SIZE], &mut output).unwrap().bands()[4];
        assert!(after > 0);
        assert!(after <= loud);
    }

    proptest! {
        #[test]
        fn prop_decibels_monotonic(a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(decibels(low) <= decibels(high));
            prop_assert!(decibels(low) >= SILENCE_FLOOR_DB);
        }
    }
}
