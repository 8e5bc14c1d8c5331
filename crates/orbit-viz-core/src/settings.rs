//! Tunable rendering parameters.
//!
//! Read fresh by the scene on every frame; nothing here is cached elsewhere.
//! Values are taken as given, see the scene and field docs for the few places
//! where degenerate values are guarded.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Particle velocity range
    pub speed: f32,
    /// Divisor of the frame counter for the orbit angle (negative = reversed)
    pub rotation_speed: f32,
    pub rotation_radius_from: f32,
    pub rotation_radius_to: f32,
    /// Radius change per frame
    pub rotation_radius_speed: f32,
    pub connection_distance: f32,
    /// Connection bonus reached at `rotation_radius_to`
    pub connection_distance_fract: f32,
    pub line_width: f32,
    /// Particle radius, also the margin for leaving the viewport
    pub size: f32,
    /// Frames a particle lives
    pub kill_after: u32,
    pub hue: f32,
    pub saturation: f32,
    pub brightness: f32,
    pub background_saturation: f32,
    pub background_brightness: f32,
    /// Opacity of the per-frame background wash (lower = longer trails)
    pub background_alpha: f32,
    /// Per-frame positional jitter
    pub random_size: f32,
    /// Spawn one particle every N frames
    pub push_every: u32,
    // Bass reaction: sum of the first five bands mapped onto a zoom factor
    pub scale_from: f32,
    pub scale_to: f32,
    pub scale_min: f32,
    pub scale_max: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed: 1.0,
            rotation_speed: -1.0,
            rotation_radius_from: 178.0,
            rotation_radius_to: 280.0,
            rotation_radius_speed: 1.5,
            connection_distance: 0.0,
            connection_distance_fract: 12.1,
            line_width: 4.4,
            size: 0.4,
            kill_after: 190,
            hue: 187.0,
            saturation: 100.0,
            brightness: 50.0,
            background_saturation: 0.0,
            background_brightness: 0.0,
            background_alpha: 0.033,
            random_size: 0.0,
            push_every: 1,
            scale_from: 680.0,
            scale_to: 760.0,
            scale_min: -0.4,
            scale_max: 0.1,
        }
    }
}
