//! Synthetic idle data for when the source is silent.

use rand::Rng;
use std::time::Duration;

use super::analyzer::FrequencySnapshot;

pub const DEFAULT_FALLBACK_FREQUENCY: f32 = 15.0;
pub const DEFAULT_FALLBACK_AMPLITUDE: f32 = 0.6;
/// ~60 Hz
pub const DEFAULT_FALLBACK_INTERVAL: Duration = Duration::from_millis(16);

/// Cooperative fixed-interval timer, driven by elapsed time from the caller
#[derive(Clone, Debug)]
pub struct IntervalTimer {
    interval: Duration,
    elapsed: Duration,
    running: bool,
}

impl IntervalTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
            running: false,
        }
    }

    /// Starts (or restarts) the timer with a fresh interval
    pub fn start(&mut self) {
        self.running = true;
        self.elapsed = Duration::ZERO;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.elapsed = Duration::ZERO;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advances the clock and returns how many intervals completed.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if !self.running || self.interval.is_zero() {
            return 0;
        }

        self.elapsed += dt;
        let mut fired = 0;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            fired += 1;
        }
        fired
    }
}

/// Sine-plus-noise generator that keeps the visualization moving
#[derive(Clone, Debug)]
pub struct FallbackGenerator {
    tick: u64,
    frequency: f32,
    amplitude: f32,
}

impl Default for FallbackGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_FREQUENCY, DEFAULT_FALLBACK_AMPLITUDE)
    }
}

impl FallbackGenerator {
    pub fn new(frequency: f32, amplitude: f32) -> Self {
        Self {
            tick: 0,
            frequency,
            amplitude,
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Writes one step of synthetic data into `snapshot`.
    ///
    /// Decibels are left untouched.
    pub fn step<R: Rng>(&mut self, snapshot: &mut FrequencySnapshot, rng: &mut R) {
        self.tick += 1;
        let tick = self.tick as f32;

        snapshot.energy = (tick / self.frequency).sin() * self.amplitude;

        for (i, band) in snapshot.bands_mut().iter_mut().enumerate() {
            let value = ((i as f32 + tick) / self.frequency).sin() * (rng.random::<f32>() * 255.0);
            *band = wrap_to_byte(value);
        }
    }
}

/// Byte conversion with typed-array semantics: truncate, then wrap modulo 256.
fn wrap_to_byte(value: f32) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    (value.trunc() as i64).rem_euclid(256) as u8
}
