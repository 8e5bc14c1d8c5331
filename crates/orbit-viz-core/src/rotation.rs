//! Ping-pong oscillator for the spawn orbit radius.

use crate::settings::Settings;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationState {
    radius: f32,
    rising: bool,
}

impl RotationState {
    /// Starts at the lower bound, moving outward
    pub fn new(settings: &Settings) -> Self {
        Self {
            radius: settings.rotation_radius_from,
            rising: true,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn is_rising(&self) -> bool {
        self.rising
    }

    /// Moves the radius by `rotation_radius_speed`, reflecting off the bounds.
    ///
    /// Swapped bounds are treated as the same interval. A step longer than the
    /// interval is reflected once and then clamped.
    pub fn step(&mut self, settings: &Settings) {
        let (low, high) = ordered(settings.rotation_radius_from, settings.rotation_radius_to);
        let speed = settings.rotation_radius_speed;

        let mut next = if self.rising {
            self.radius + speed
        } else {
            self.radius - speed
        };

        if next >= high {
            next = high - (next - high);
            self.rising = false;
        } else if next <= low {
            next = low + (low - next);
            self.rising = true;
        }

        self.radius = next.clamp(low, high);
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn settings(from: f32, to: f32, speed: f32) -> Settings {
        Settings {
            rotation_radius_from: from,
            rotation_radius_to: to,
            rotation_radius_speed: speed,
            ..Default::default()
        }
    }

    #[test]
    fn test_reflects_at_upper_bound() {
        let settings = settings(0.0, 10.0, 4.0);
        let mut rotation = RotationState::new(&settings);

        let mut radii = Vec::new();
        for _ in 0..6 {
            rotation.step(&settings);
            radii.push(rotation.radius());
        }

        assert_eq!(radii, vec![4.0, 8.0, 8.0, 4.0, 0.0, 4.0]);
    }

    #[test]
    fn test_direction_flips_when_bound_is_hit_exactly() {
        let settings = settings(0.0, 10.0, 5.0);
        let mut rotation = RotationState::new(&settings);
        rotation.step(&settings);
        assert!(rotation.is_rising());
        rotation.step(&settings);
        assert_eq!(rotation.radius(), 10.0);
        assert!(!rotation.is_rising());
        rotation.step(&settings);
        assert_eq!(rotation.radius(), 5.0);
    }

    #[test]
    fn test_default_settings_stay_in_range() {
        let settings = Settings::default();
        let mut rotation = RotationState::new(&settings);
        assert_eq!(rotation.radius(), 178.0);
        for _ in 0..1000 {
            rotation.step(&settings);
            assert!((178.0..=280.0).contains(&rotation.radius()));
        }
    }

    #[test]
    fn test_swapped_bounds() {
        let settings = settings(300.0, 100.0, 50.0);
        let mut rotation = RotationState::new(&settings);
        for _ in 0..20 {
            rotation.step(&settings);
            assert!((100.0..=300.0).contains(&rotation.radius()));
        }
    }

    #[test]
    fn test_radius_outside_bounds_after_live_change() {
        let mut rotation = RotationState::new(&settings(500.0, 600.0, 1.0));
        let narrowed = settings(0.0, 100.0, 1.0);
        rotation.step(&narrowed);
        assert!((0.0..=100.0).contains(&rotation.radius()));
    }

    proptest! {
        #[test]
        fn prop_radius_stays_within_bounds(
            from in 0.0f32..500.0,
            span in 1.0f32..500.0,
            speed_fraction in 0.0f32..1.0,
            steps in 1usize..2000,
        ) {
            let settings = settings(from, from + span, span * speed_fraction);
            let mut rotation = RotationState::new(&settings);
            let mut previous = rotation.radius();

            for _ in 0..steps {
                rotation.step(&settings);
                let radius = rotation.radius();
                prop_assert!(radius >= from && radius <= from + span);
                // Reflection never jumps further than one step
                prop_assert!((radius - previous).abs() <= settings.rotation_radius_speed + 1e-3);
                previous = radius;
            }
        }
    }
}
