//! Light rig and its time-only intensity modulation

use crate::math::Vec3;

/// Peak rise of a point light above its rest height is twice this.
/// Matches a 0.08 per-frame step at 60 fps and 0.4 rad/s.
pub const POINT_FLOAT: f32 = 0.08 * 60.0 / 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Ambient,
    Directional,
    Point,
    Spot,
}

/// A light in the rig with its resting parameters
#[derive(Debug, Clone, PartialEq)]
pub struct LightSpec {
    pub name: &'static str,
    pub kind: LightKind,
    pub position: Vec3,
    pub base_intensity: f32,
}

/// One frame's values for a light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSample {
    pub intensity: f32,
    pub position: Vec3,
}

/// Fixed set of lights around the two figures
#[derive(Debug, Clone)]
pub struct LightRig {
    lights: Vec<LightSpec>,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            lights: vec![
                LightSpec {
                    name: "ambient",
                    kind: LightKind::Ambient,
                    position: Vec3::ZERO,
                    base_intensity: 0.3,
                },
                LightSpec {
                    name: "main",
                    kind: LightKind::Directional,
                    position: Vec3::new(0.0, 25.0, 15.0),
                    base_intensity: 2.0,
                },
                LightSpec {
                    name: "tech",
                    kind: LightKind::Point,
                    position: Vec3::new(-8.0, 8.0, 12.0),
                    base_intensity: 1.4,
                },
                LightSpec {
                    name: "human",
                    kind: LightKind::Point,
                    position: Vec3::new(8.0, 4.0, 12.0),
                    base_intensity: 1.6,
                },
                LightSpec {
                    name: "meeting",
                    kind: LightKind::Spot,
                    position: Vec3::new(0.0, 12.0, 15.0),
                    base_intensity: 2.5,
                },
            ],
        }
    }
}

impl LightRig {
    pub fn lights(&self) -> &[LightSpec] {
        &self.lights
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Modulated value of one light at `time`
    pub fn sample(spec: &LightSpec, time: f32) -> LightSample {
        let mut position = spec.position;
        let intensity = match spec.kind {
            LightKind::Ambient => spec.base_intensity,
            LightKind::Directional => spec.base_intensity + (time * 0.5).sin() * 0.2,
            // each point light is phase-shifted by where it stands
            LightKind::Point => {
                position.y += (1.0 - (time * 0.4).cos()) * POINT_FLOAT;
                spec.base_intensity + (time * 0.8 + spec.position.x).sin() * 0.3
            }
            LightKind::Spot => {
                position.x = (time * 0.25).sin() * 1.5;
                spec.base_intensity + (time * 1.2).sin() * 0.4
            }
        };
        LightSample { intensity, position }
    }

    pub fn sample_all(&self, time: f32) -> impl Iterator<Item = (usize, LightSample)> + '_ {
        self.lights
            .iter()
            .enumerate()
            .map(move |(i, spec)| (i, Self::sample(spec, time)))
    }
}
