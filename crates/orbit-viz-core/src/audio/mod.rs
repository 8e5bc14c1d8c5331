mod adapter;
mod analyzer;
mod fallback;
mod source;

pub use adapter::{AdapterConfig, SignalAdapter, SignalUpdate, SubscriptionId, UpdateOrigin};
pub use analyzer::{
    decibels, AnalyzerConfig, AnalyzerError, FrequencyAnalyzer, FrequencySnapshot, BLOCK_SIZE,
    DEFAULT_BAND_COUNT, DEFAULT_SMOOTHING, SILENCE_FLOOR_DB,
};
pub use fallback::{FallbackGenerator, IntervalTimer};
pub use source::{AudioSource, SourceError, Transport};
