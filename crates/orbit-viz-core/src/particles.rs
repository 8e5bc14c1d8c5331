//! Particle field: orbit spawning, aging, removal and connection lines.

use rand::Rng;

use crate::math::map_range;
use crate::settings::Settings;

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub x_speed: f32,
    pub y_speed: f32,
    /// Frames lived so far
    pub lifetime: u32,
    pub kill_after: u32,
    pub opacity: f32,
}

impl Particle {
    pub fn new(x: f32, y: f32, x_speed: f32, y_speed: f32, kill_after: u32) -> Self {
        Self {
            x,
            y,
            x_speed,
            y_speed,
            lifetime: 0,
            kill_after,
            opacity: 1.0,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.lifetime > self.kill_after
    }

    /// Linear fade: 1 at birth, 0 at `kill_after`.
    pub fn fade(&self) -> f32 {
        if self.kill_after == 0 {
            return 0.0;
        }
        1.0 - self.lifetime as f32 / self.kill_after as f32
    }

    /// Advances one frame. Returns false once the particle is dead.
    ///
    /// Age is checked before moving; the position must stay strictly inside
    /// the viewport shrunk by `settings.size` on every side.
    pub fn step<R: Rng>(&mut self, settings: &Settings, viewport: (f32, f32), rng: &mut R) -> bool {
        if self.is_expired() {
            return false;
        }

        let x_noise = jitter(rng, settings.random_size);
        let y_noise = jitter(rng, settings.random_size);
        self.x += self.x_speed + x_noise;
        self.y += self.y_speed + y_noise;

        let (width, height) = viewport;
        let size = settings.size;
        if self.x < size || self.x > width - size {
            return false;
        }
        if self.y < size || self.y > height - size {
            return false;
        }

        self.opacity = self.fade();
        self.lifetime += 1;
        true
    }

    pub fn distance_to(&self, other: &Particle) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Uniform noise in `[-amount / 2, amount / 2)`
fn jitter<R: Rng>(rng: &mut R, amount: f32) -> f32 {
    rng.random::<f32>() * amount - amount / 2.0
}

/// Line between two particles, by index into [`ParticleField::particles`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Connection {
    pub from: usize,
    pub to: usize,
    pub distance: f32,
    /// Opacity of the far particle
    pub alpha: f32,
}

#[derive(Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn spawn(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    /// Steps every particle and drops the dead ones. Returns how many died.
    pub fn update<R: Rng>(&mut self, settings: &Settings, viewport: (f32, f32), rng: &mut R) -> usize {
        let before = self.particles.len();
        self.particles
            .retain_mut(|particle| particle.step(settings, viewport, rng));
        before - self.particles.len()
    }

    /// Spawns one particle on the orbit when `frame` is a multiple of
    /// `push_every` (0 counts as 1). Returns true if a particle was added.
    pub fn spawn_on_orbit<R: Rng>(
        &mut self,
        frame: u64,
        center: (f32, f32),
        radius: f32,
        settings: &Settings,
        rng: &mut R,
    ) -> bool {
        let every = settings.push_every.max(1) as u64;
        if frame % every != 0 {
            return false;
        }

        let angle = frame as f32 / settings.rotation_speed;
        let x = center.0 + angle.sin() * radius;
        let y = center.1 + angle.cos() * radius;

        // Asymmetric range: [-speed/20, speed/10 - speed/20)
        let x_speed = rng.random::<f32>() * (settings.speed / 10.0) - settings.speed / 20.0;
        let y_speed = rng.random::<f32>() * (settings.speed / 10.0) - settings.speed / 20.0;

        self.particles
            .push(Particle::new(x, y, x_speed, y_speed, settings.kill_after));
        true
    }

    /// Base connection distance plus the bonus interpolated from the radius.
    pub fn connection_distance(settings: &Settings, radius: f32) -> f32 {
        let bonus = map_range(
            radius,
            settings.rotation_radius_from,
            settings.rotation_radius_to,
            1.0,
            settings.connection_distance_fract,
        );
        settings.connection_distance + bonus
    }

    /// Connections from particle `from` to every particle within
    /// `max_distance`, itself included.
    pub fn connections_from(
        &self,
        from: usize,
        max_distance: f32,
    ) -> impl Iterator<Item = Connection> + '_ {
        let origin = &self.particles[from];
        self.particles
            .iter()
            .enumerate()
            .filter_map(move |(to, other)| {
                let distance = origin.distance_to(other);
                (distance <= max_distance).then_some(Connection {
                    from,
                    to,
                    distance,
                    alpha: other.opacity,
                })
            })
    }

    /// All ordered connections, grouped by source particle.
    pub fn connections(&self, max_distance: f32) -> impl Iterator<Item = Connection> + '_ {
        (0..self.particles.len()).flat_map(move |from| self.connections_from(from, max_distance))
    }
}
