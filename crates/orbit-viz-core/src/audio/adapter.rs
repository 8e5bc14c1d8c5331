//! Signal adapter: the single source of truth for what the scene reacts to.
//!
//! Owns the analyzer, keeps the latest [`FrequencySnapshot`] and covers gaps
//! in the real signal with synthetic data. Synthetic data is produced while no
//! reading has arrived yet, after the last real reading was exactly zero, or
//! once readings have stalled. A zero reading steps the generator itself, so
//! the interval timer only drives it when no blocks arrive.

use rand::Rng;
use std::time::Duration;

use super::analyzer::{FrequencyAnalyzer, FrequencySnapshot};
use super::fallback::{
    FallbackGenerator, IntervalTimer, DEFAULT_FALLBACK_AMPLITUDE, DEFAULT_FALLBACK_FREQUENCY,
    DEFAULT_FALLBACK_INTERVAL,
};
use super::source::Transport;

const DEFAULT_STALL_TIMEOUT: Duration = Duration::from_millis(250);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdapterConfig {
    /// Time without analyzer updates before the fallback resumes
    pub stall_timeout: Duration,
    pub fallback_interval: Duration,
    pub fallback_frequency: f32,
    pub fallback_amplitude: f32,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            stall_timeout: DEFAULT_STALL_TIMEOUT,
            fallback_interval: DEFAULT_FALLBACK_INTERVAL,
            fallback_frequency: DEFAULT_FALLBACK_FREQUENCY,
            fallback_amplitude: DEFAULT_FALLBACK_AMPLITUDE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOrigin {
    Analyzer,
    Fallback,
}

/// Payload delivered to subscribers
#[derive(Clone, Copy, Debug)]
pub struct SignalUpdate<'a> {
    pub bands: &'a [u8],
    pub decibels: f32,
    pub energy: f32,
    pub origin: UpdateOrigin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&SignalUpdate<'_>)>;

pub struct SignalAdapter {
    config: AdapterConfig,
    analyzer: Option<FrequencyAnalyzer>,
    signal: FrequencySnapshot,
    fallback: FallbackGenerator,
    timer: IntervalTimer,
    /// Time since the last analyzer update
    since_update: Duration,
    received_update: bool,
    fallback_active: bool,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    /// Output buffer handed to the analyzer (always zeroed by it)
    scratch: Vec<f32>,
}

impl SignalAdapter {
    pub fn new(config: AdapterConfig, analyzer: FrequencyAnalyzer) -> Self {
        let band_count = analyzer.config().band_count;
        Self::build(config, Some(analyzer), band_count)
    }

    /// Adapter for when no audio subsystem is available: fallback data only.
    pub fn without_analyzer(config: AdapterConfig, band_count: usize) -> Self {
        Self::build(config, None, band_count)
    }

    fn build(config: AdapterConfig, analyzer: Option<FrequencyAnalyzer>, band_count: usize) -> Self {
        Self {
            config,
            analyzer,
            signal: FrequencySnapshot::new(band_count),
            fallback: FallbackGenerator::new(config.fallback_frequency, config.fallback_amplitude),
            timer: IntervalTimer::new(config.fallback_interval),
            since_update: Duration::ZERO,
            received_update: false,
            fallback_active: false,
            subscribers: Vec::new(),
            next_subscription: 0,
            scratch: Vec::new(),
        }
    }

    /// Starts the fallback timer; visuals animate before the first real reading.
    pub fn start(&mut self) {
        self.timer.start();
        self.fallback_active = true;
    }

    /// Play event from the source. Wires the analyzer the first time.
    pub fn on_play(&mut self) {
        if let Some(analyzer) = self.analyzer.as_mut() {
            if analyzer.ready() {
                log::info!("Audio analysis connected");
            }
        }
    }

    /// Latest signal values (real or synthetic)
    pub fn signal(&self) -> &FrequencySnapshot {
        &self.signal
    }

    pub fn analyzer(&self) -> Option<&FrequencyAnalyzer> {
        self.analyzer.as_ref()
    }

    pub fn is_fallback_active(&self) -> bool {
        self.fallback_active
    }

    pub fn has_received_update(&self) -> bool {
        self.received_update
    }

    /// Runs one audio tick through the analyzer.
    ///
    /// Results only reach the signal while the source is playing.
    pub fn process_block<R: Rng>(&mut self, input: &[f32], transport: Transport, rng: &mut R) {
        let Some(analyzer) = self.analyzer.as_mut() else {
            return;
        };

        self.scratch.resize(input.len(), 0.0);
        let Some(snapshot) = analyzer.process(input, &mut self.scratch) else {
            return;
        };

        if !transport.is_playing() {
            return;
        }

        self.signal.copy_from(snapshot);
        self.after_analyzer_update(rng);
    }

    /// Applies an analyzer reading produced elsewhere.
    pub fn on_analyzer_update<R: Rng>(&mut self, snapshot: &FrequencySnapshot, rng: &mut R) {
        self.signal.copy_from(snapshot);
        self.after_analyzer_update(rng);
    }

    fn after_analyzer_update<R: Rng>(&mut self, rng: &mut R) {
        self.since_update = Duration::ZERO;
        self.received_update = true;

        // Readings are the clock while they arrive
        self.timer.stop();

        if self.signal.energy == 0.0 {
            if !self.fallback_active {
                log::debug!("Silent input, fallback resumed");
            }
            self.fallback_active = true;
            self.fallback.step(&mut self.signal, rng);
        } else if self.fallback_active {
            log::debug!("Signal present, fallback stopped");
            self.fallback_active = false;
        }

        self.notify(UpdateOrigin::Analyzer);
    }

    /// Advances the fallback clock and the stall detector by `dt`.
    pub fn advance<R: Rng>(&mut self, dt: Duration, rng: &mut R) {
        self.since_update = self.since_update.saturating_add(dt);

        if self.received_update
            && !self.timer.is_running()
            && self.since_update >= self.config.stall_timeout
        {
            log::debug!("Signal stalled for {:?}, fallback resumed", self.since_update);
            self.timer.start();
            self.fallback_active = true;
        }

        for _ in 0..self.timer.advance(dt) {
            self.fallback.step(&mut self.signal, rng);
            if !self.received_update {
                self.notify(UpdateOrigin::Fallback);
            }
        }
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&SignalUpdate<'_>) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns false if the subscription was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self, origin: UpdateOrigin) {
        let update = SignalUpdate {
            bands: self.signal.bands(),
            decibels: self.signal.decibels,
            energy: self.signal.energy,
            origin,
        };
        for (_, callback) in self.subscribers.iter_mut() {
            callback(&update);
        }
    }
}
