//! Headless core of orbit-viz.
//!
//! Holds the audio feature extraction, the fallback-aware signal adapter and
//! the particle simulation. Nothing in here touches a window or an audio
//! device: backends feed sample blocks in and receive draw calls through the
//! [`Surface`] trait.

pub mod audio;
pub mod math;
pub mod particles;
pub mod rotation;
pub mod scene;
pub mod settings;
pub mod surface;

pub use audio::{
    decibels, AdapterConfig, AnalyzerConfig, AnalyzerError, AudioSource, FrequencyAnalyzer,
    FrequencySnapshot, SignalAdapter, SignalUpdate, SourceError, SubscriptionId, Transport,
    UpdateOrigin, BLOCK_SIZE,
};
pub use particles::{Connection, Particle, ParticleField};
pub use rotation::RotationState;
pub use scene::Scene;
pub use settings::Settings;
pub use surface::{DrawCommand, Hsla, Recorder, Surface};
