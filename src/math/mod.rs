pub mod vec3;

pub use vec3::Vec3;

/// Scalar linear interpolation
pub fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start + (end - start) * t
}

/// Ratio `num / span` clamped to [0, 1]; a zero or degenerate span yields 0
pub fn unit_ratio(num: f32, span: f32) -> f32 {
    if !span.is_finite() || span <= 0.0 || !num.is_finite() {
        return 0.0;
    }
    (num / span).clamp(0.0, 1.0)
}
