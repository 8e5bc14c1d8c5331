//! Small numeric helpers shared by the scene and the particle field.

/// Linearly maps `value` from `[low1, high1]` onto `[low2, high2]`.
///
/// No clamping is applied, so values outside the input range extrapolate.
/// An empty input span maps everything onto `low2` instead of producing NaN.
pub fn map_range(value: f32, low1: f32, high1: f32, low2: f32, high2: f32) -> f32 {
    let span = high1 - low1;
    if span == 0.0 {
        return low2;
    }
    low2 + (high2 - low2) * (value - low1) / span
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_range_endpoints() {
        assert_eq!(map_range(178.0, 178.0, 280.0, 1.0, 12.1), 1.0);
        assert!((map_range(280.0, 178.0, 280.0, 1.0, 12.1) - 12.1).abs() < 1e-5);
    }

    #[test]
    fn test_map_range_extrapolates() {
        // Silence maps well below the bass scale range
        let scale = map_range(0.0, 680.0, 760.0, -0.4, 0.1);
        assert!((scale - -4.65).abs() < 1e-4);
    }

    #[test]
    fn test_map_range_empty_span() {
        assert_eq!(map_range(5.0, 3.0, 3.0, 1.0, 2.0), 1.0);
    }
}
