use crate::math::Vec3;

/// Base point size before the global pulse
pub const BASE_POINT_SIZE: f32 = 0.025;
/// Amplitude of the vertical drift: a 0.003 per-frame step at 60 fps and 0.5 rad/s.
/// A point stays within twice this of its rest height.
pub const DRIFT_AMPLITUDE: f32 = 0.36;

/// The three color families a point can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HueBucket {
    Purple,
    Cyan,
    Pink,
}

impl HueBucket {
    pub fn base_color(self) -> Vec3 {
        match self {
            HueBucket::Purple => Vec3::new(0.39, 0.40, 0.95),
            HueBucket::Cyan => Vec3::new(0.0, 0.83, 1.0),
            HueBucket::Pink => Vec3::new(0.96, 0.45, 0.71),
        }
    }

    /// 40% purple, 30% cyan, 30% pink
    fn from_unit(choice: f32) -> Self {
        if choice < 0.4 {
            HueBucket::Purple
        } else if choice < 0.7 {
            HueBucket::Cyan
        } else {
            HueBucket::Pink
        }
    }
}

/// A single point at rest
#[derive(Debug, Clone)]
struct FieldPoint {
    rest: Vec3,
    bucket: HueBucket,
}

/// Borrowed view of one frame of the field, ready for upload
#[derive(Debug, Clone, Copy)]
pub struct ParticleFrame<'a> {
    /// xyz per point
    pub positions: &'a [f32],
    /// rgb per point
    pub colors: &'a [f32],
    pub size: f32,
    /// Euler rotation of the whole field
    pub rotation: Vec3,
}

/// Point cloud whose every frame is a pure function of elapsed time
pub struct ParticleField {
    points: Vec<FieldPoint>,
    positions: Vec<f32>,
    colors: Vec<f32>,
    size: f32,
    rotation: Vec3,
    seed: u32,
}

impl ParticleField {
    /// Lay out `count` points in a ring band; identical seeds give identical fields
    pub fn new(count: usize, seed: u32) -> Self {
        let mut field = Self {
            points: Vec::with_capacity(count),
            positions: vec![0.0; count * 3],
            colors: vec![0.0; count * 3],
            size: BASE_POINT_SIZE,
            rotation: Vec3::ZERO,
            seed,
        };

        for _ in 0..count {
            let angle = field.next_unit() * std::f32::consts::TAU;
            let radius = field.next_unit() * 30.0 + 5.0;
            let height = (field.next_unit() - 0.5) * 25.0;
            let bucket = HueBucket::from_unit(field.next_unit());

            field.points.push(FieldPoint {
                rest: Vec3::new(angle.cos() * radius, height, angle.sin() * radius),
                bucket,
            });
        }

        field.update(0.0);
        field
    }

    fn next_unit(&mut self) -> f32 {
        self.seed = self.seed.wrapping_mul(1664525).wrapping_add(1013904223);
        (self.seed % 10000) as f32 / 10000.0
    }

    /// Recompute drift, color pulse, size and rotation for `time`
    pub fn update(&mut self, time: f32) {
        for (i, point) in self.points.iter().enumerate() {
            let phase = i as f32;
            let o = i * 3;

            self.positions[o] = point.rest.x;
            let drift_phase = phase * 0.3;
            self.positions[o + 1] = point.rest.y
                + (drift_phase.cos() - (time * 0.5 + drift_phase).cos()) * DRIFT_AMPLITUDE;
            self.positions[o + 2] = point.rest.z;

            let pulse = (time * 2.0 + phase * 0.6).sin() * 0.3 + 0.7;
            let color = point.bucket.base_color().scale(pulse);
            self.colors[o] = color.x;
            self.colors[o + 1] = color.y;
            self.colors[o + 2] = color.z;
        }

        self.size = BASE_POINT_SIZE + (time * 1.5).sin() * 0.008;
        self.rotation = Vec3::new((time * 0.1).sin() * 0.08, time * 0.015, 0.0);
    }

    pub fn frame(&self) -> ParticleFrame<'_> {
        ParticleFrame {
            positions: &self.positions,
            colors: &self.colors,
            size: self.size,
            rotation: self.rotation,
        }
    }

    pub fn bucket(&self, index: usize) -> Option<HueBucket> {
        self.points.get(index).map(|p| p.bucket)
    }

    pub fn rest_position(&self, index: usize) -> Option<Vec3> {
        self.points.get(index).map(|p| p.rest)
    }

    pub fn count(&self) -> usize {
        self.points.len()
    }
}
