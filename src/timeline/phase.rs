//! Three-phase choreography for the two figures
//!
//! Eased scroll progress selects a phase and a local interpolation parameter:
//! - Approach: both figures glide from `initial` to `touch`
//! - Contact: they hold at `touch` with a small mirrored tremor and a glow pulse
//! - Separate: they drift apart from `touch` to `final`
//!
//! Every function here is pure in (progress, elapsed time).

use std::f32::consts::PI;

use super::config::{Entity, TimelineConfig, APPROACH_END, CONTACT_END};
use crate::animation::{ease, Easing};
use crate::math::{unit_ratio, Vec3};

/// Peak x displacement of the contact tremor
pub const JITTER_X: f32 = 0.02;
/// Peak y displacement of the contact tremor
pub const JITTER_Y: f32 = 0.01;

/// Segment of the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Approach,
    Contact,
    Separate,
}

impl Phase {
    /// Upper bounds are inclusive: 0.3 is still Approach, 0.7 still Contact
    pub fn from_progress(progress: f32) -> Phase {
        let p = sanitize(progress);
        if p <= APPROACH_END {
            Phase::Approach
        } else if p <= CONTACT_END {
            Phase::Contact
        } else {
            Phase::Separate
        }
    }

    /// Interpolation parameter inside the phase, in [0, 1]
    pub fn local_progress(self, progress: f32) -> f32 {
        let p = sanitize(progress);
        match self {
            Phase::Approach => unit_ratio(p, APPROACH_END),
            Phase::Contact => unit_ratio(p - APPROACH_END, CONTACT_END - APPROACH_END),
            Phase::Separate => unit_ratio(p - CONTACT_END, 1.0 - CONTACT_END),
        }
    }

    pub fn index(self) -> u32 {
        match self {
            Phase::Approach => 0,
            Phase::Contact => 1,
            Phase::Separate => 2,
        }
    }
}

/// Progress values driving one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProgressSample {
    /// Cubic-eased progress; selects phase and positions
    pub eased: f32,
    /// Smoothed linear progress; drives the slow directional turn
    pub linear: f32,
}

impl ProgressSample {
    pub fn from_linear(linear: f32) -> Self {
        let linear = sanitize(linear);
        Self {
            eased: ease(linear, Easing::EaseInOutCubic),
            linear,
        }
    }

    pub fn phase(&self) -> Phase {
        Phase::from_progress(self.eased)
    }
}

/// Pose and glow written to a figure's scene object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityTransform {
    pub position: Vec3,
    /// Euler XYZ in radians
    pub rotation: Vec3,
    /// Multiplier over the target's own base scale
    pub scale: f32,
    /// Emissive intensity for the figure's material
    pub glow: f32,
}

/// Computes per-figure transforms from progress and elapsed time
#[derive(Debug, Clone)]
pub struct PhaseEvaluator {
    config: TimelineConfig,
}

impl PhaseEvaluator {
    pub fn new(config: TimelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn evaluate(&self, entity: Entity, progress: ProgressSample, time: f32) -> EntityTransform {
        EntityTransform {
            position: self.position(entity, progress.eased, time),
            rotation: self.rotation(entity, progress.linear, time),
            scale: 1.0,
            glow: self.glow(entity, progress.eased, time),
        }
    }

    pub fn position(&self, entity: Entity, eased: f32, time: f32) -> Vec3 {
        let k = self.config.keyframes(entity);
        let phase = Phase::from_progress(eased);
        let t = phase.local_progress(eased);

        match phase {
            Phase::Approach => k.initial.lerp(&k.touch, t),
            Phase::Contact => k.touch + contact_jitter(entity, time),
            Phase::Separate => k.touch.lerp(&k.final_position, t),
        }
    }

    pub fn rotation(&self, entity: Entity, linear: f32, time: f32) -> Vec3 {
        let base = self.config.keyframes(entity).touch_rotation;
        let p = sanitize(linear);

        match entity {
            Entity::Arm => Vec3::new(
                base.x + (time * 0.3).sin() * 0.05,
                base.y + p * PI * 0.15,
                base.z + (time * 0.4).sin() * 0.08,
            ),
            Entity::Human => Vec3::new(
                base.x + (time * 0.35).cos() * 0.06,
                base.y - p * PI * 0.12,
                base.z + (time * 0.25).sin() * 0.04,
            ),
        }
    }

    /// Pulses only while the figures touch
    pub fn glow(&self, entity: Entity, eased: f32, time: f32) -> f32 {
        match Phase::from_progress(eased) {
            Phase::Contact => (time * 5.0).sin() * 0.5 + 0.3,
            _ => self.config.keyframes(entity).rest_glow,
        }
    }
}

/// Mirrored tremor: the arm shakes one way, the human the other
pub fn contact_jitter(entity: Entity, time: f32) -> Vec3 {
    let s = entity.sign();
    Vec3::new(
        s * (time * 4.0).sin() * JITTER_X,
        s * (time * 3.0).sin() * JITTER_Y,
        0.0,
    )
}

/// Yaw wobble of the procedural arm's individual parts
pub fn proxy_part_yaw(index: usize, time: f32) -> f32 {
    (time * 0.3 + index as f32 * 0.5).sin() * 0.05
}

fn sanitize(p: f32) -> f32 {
    if p.is_finite() {
        p.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
