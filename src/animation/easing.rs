//! Easing functions for scroll-driven motion

/// Easing function types
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Easing {
    /// Progress passed through unchanged
    Linear,
    /// Cubic ease-in-out, the curve the entity timeline runs on
    #[default]
    EaseInOutCubic,
}

/// Apply easing function to a value t in range [0, 1]
pub fn ease(t: f32, easing: Easing) -> f32 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };

    match easing {
        Easing::Linear => t,
        Easing::EaseInOutCubic => ease_in_out_cubic(t),
    }
}

/// Slow start, fast middle, slow finish. Exact at 0, 0.5 and 1.
pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        (t - 1.0) * (2.0 * t - 2.0) * (2.0 * t - 2.0) + 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_bounds() {
        for easing in [Easing::Linear, Easing::EaseInOutCubic] {
            assert_eq!(ease(0.0, easing), 0.0, "Easing {:?} should start at 0", easing);
            assert_eq!(ease(1.0, easing), 1.0, "Easing {:?} should end at 1", easing);
        }
    }

    #[test]
    fn test_ease_monotonic() {
        for easing in [Easing::Linear, Easing::EaseInOutCubic] {
            let mut prev = 0.0;
            for i in 0..=100 {
                let t = i as f32 / 100.0;
                let v = ease(t, easing);
                assert!(v >= prev - 0.0001, "Easing {:?} should be monotonic", easing);
                prev = v;
            }
        }
    }

    #[test]
    fn test_ease_in_out_cubic_symmetric() {
        let v1 = ease_in_out_cubic(0.25);
        let v2 = ease_in_out_cubic(0.75);
        assert!((v1 + v2 - 1.0).abs() < 0.0001);
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 0.0001);
        assert!((v1 - 0.0625).abs() < 0.0001);
    }

    #[test]
    fn test_ease_clamps_input() {
        assert_eq!(ease(-0.5, Easing::Linear), 0.0);
        assert_eq!(ease(1.5, Easing::EaseInOutCubic), 1.0);
        assert_eq!(ease(f32::NAN, Easing::EaseInOutCubic), 0.0);
    }
}
