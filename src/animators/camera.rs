//! Camera path: dolly in for the touch, drift during contact, pull back for the separation

use crate::math::Vec3;
use crate::timeline::{CameraKeyframes, Phase, CAMERA_DAMPING};

/// Damped camera following a phase-dependent target
#[derive(Debug, Clone)]
pub struct CameraPath {
    keyframes: CameraKeyframes,
    damping: f32,
    position: Vec3,
}

impl CameraPath {
    pub fn new(keyframes: CameraKeyframes) -> Self {
        Self {
            position: keyframes.start,
            keyframes,
            damping: CAMERA_DAMPING,
        }
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping.clamp(0.0, 1.0);
        self
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn look_at(&self) -> Vec3 {
        self.keyframes.focus
    }

    /// Where the camera wants to be; uses un-eased progress
    pub fn target(&self, progress: f32, time: f32) -> Vec3 {
        let k = &self.keyframes;
        let phase = Phase::from_progress(progress);
        let t = phase.local_progress(progress);

        match phase {
            Phase::Approach => k.start.lerp(&k.contact, t),
            Phase::Contact => Vec3::new(
                k.contact.x + (time * 0.6).sin() * 0.8,
                k.contact.y,
                k.contact.z + (time * 0.4).sin() * 3.0,
            ),
            Phase::Separate => k.contact.lerp(&k.final_position, t),
        }
    }

    /// Ease the current position one frame toward the target; a non-finite
    /// target leaves the camera where it is
    pub fn update(&mut self, progress: f32, time: f32) -> Vec3 {
        let target = self.target(progress, time);
        if target.is_finite() {
            self.position = self.position.lerp(&target, self.damping);
        }
        self.position
    }
}
