/// Per-frame look of the translucent platform beneath the figures
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageSample {
    pub rotation_y: f32,
    pub opacity: f32,
    pub emissive: f32,
}

impl StageSample {
    pub fn at(time: f32) -> Self {
        Self {
            rotation_y: time * 0.008,
            opacity: 0.3 + (time * 0.4).sin() * 0.1,
            emissive: (time * 0.8).sin() * 0.1 + 0.05,
        }
    }
}
