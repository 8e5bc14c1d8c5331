//! Per-frame render loop.
//!
//! One call to [`Scene::frame`] paints the background wash, applies the bass
//! zoom, updates and draws the particle field, spawns on the orbit and moves
//! the orbit radius. Settings and signal are passed in fresh every frame.

use rand::Rng;

use crate::audio::FrequencySnapshot;
use crate::math::map_range;
use crate::particles::ParticleField;
use crate::rotation::RotationState;
use crate::settings::Settings;
use crate::surface::{Hsla, Surface};

/// Bands summed for the bass zoom
const LOW_END_BANDS: usize = 5;

/// Saturation/lightness of the solid fill after a resize
const CLEAR_SATURATION: f32 = 40.0;
const CLEAR_LIGHTNESS: f32 = 50.0;

pub struct Scene {
    field: ParticleField,
    rotation: RotationState,
    /// Frames drawn so far; also drives the orbit angle
    frame: u64,
    width: f32,
    height: f32,
    clear_pending: bool,
}

impl Scene {
    pub fn new(width: f32, height: f32, settings: &Settings) -> Self {
        Self {
            field: ParticleField::new(),
            rotation: RotationState::new(settings),
            frame: 0,
            width,
            height,
            clear_pending: true,
        }
    }

    /// New viewport size; the next frame starts with a solid fill.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.clear_pending = true;
    }

    pub fn viewport(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Zoom factor for the current bass energy, or None without band data.
    pub fn bass_scale(settings: &Settings, signal: &FrequencySnapshot) -> Option<f32> {
        if signal.is_empty() {
            return None;
        }
        let low_end = signal.low_end(LOW_END_BANDS);
        Some(map_range(
            low_end,
            settings.scale_from,
            settings.scale_to,
            settings.scale_min,
            settings.scale_max,
        ))
    }

    pub fn frame<S, R>(
        &mut self,
        surface: &mut S,
        settings: &Settings,
        signal: &FrequencySnapshot,
        rng: &mut R,
    ) where
        S: Surface + ?Sized,
        R: Rng,
    {
        let (w, h) = (self.width, self.height);

        if self.clear_pending {
            let clear = Hsla::new(settings.hue, CLEAR_SATURATION, CLEAR_LIGHTNESS, 1.0);
            surface.fill_rect(0.0, 0.0, w, h, clear);
            self.clear_pending = false;
        }

        // Oversized so the wash still covers the viewport under the zoom
        let wash = Hsla::new(
            settings.hue,
            settings.background_saturation,
            settings.background_brightness,
            settings.background_alpha,
        );
        surface.fill_rect(-(w / 2.0), -(h / 2.0), w * 2.0, h * 2.0, wash);

        surface.save();

        if let Some(scale) = Self::bass_scale(settings, signal) {
            surface.translate((w - w * scale) / 2.0, (h - h * scale) / 2.0);
            surface.scale(scale);
        }

        let max_distance = ParticleField::connection_distance(settings, self.rotation.radius());
        self.field.update(settings, (w, h), rng);
        self.draw_field(surface, settings, max_distance);

        self.frame += 1;
        self.field.spawn_on_orbit(
            self.frame,
            self.center(),
            self.rotation.radius(),
            settings,
            rng,
        );

        surface.restore();

        self.rotation.step(settings);
    }

    fn draw_field<S: Surface + ?Sized>(&self, surface: &mut S, settings: &Settings, max_distance: f32) {
        let color = Hsla::new(settings.hue, settings.saturation, settings.brightness, 1.0);
        let particles = self.field.particles();

        for (i, particle) in particles.iter().enumerate() {
            surface.fill_circle(
                particle.x,
                particle.y,
                settings.size,
                color.with_alpha(particle.opacity),
            );

            for connection in self.field.connections_from(i, max_distance) {
                let other = &particles[connection.to];
                surface.line(
                    (particle.x, particle.y),
                    (other.x, other.y),
                    settings.line_width,
                    color.with_alpha(connection.alpha),
                );
            }
        }
    }
}
