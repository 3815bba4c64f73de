//! Boundary to the externally owned scene.
//!
//! The choreography never builds geometry or materials; it only writes
//! transforms and scalar material/light values into objects the host owns.
//! `SceneHandle` is that boundary, `SceneGraph` an in-memory implementation
//! whose buffers the page copies into its renderer.

pub mod graph;

pub use graph::SceneGraph;

use crate::animators::{LightSample, StageSample};
use crate::math::Vec3;
use crate::particles::ParticleFrame;
use crate::timeline::{Entity, EntityKeyframes, EntityTransform};

/// Anything a figure's transform can be written into
pub trait Movable {
    fn set_position(&mut self, position: Vec3);
    fn set_rotation(&mut self, rotation: Vec3);
    fn set_scale(&mut self, scale: f32);
    fn set_emissive(&mut self, intensity: f32);
}

/// Which object stands in for a figure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Model,
    Proxy,
}

impl TargetKind {
    pub fn code(self) -> f32 {
        match self {
            TargetKind::Model => 0.0,
            TargetKind::Proxy => 1.0,
        }
    }
}

/// Per-figure choice between the loaded model and the procedural proxy.
/// Starts as `FallbackProxy`; switches once when the asset arrives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntitySlot {
    ActiveModel { scale: f32, mixer_speed: f32 },
    FallbackProxy,
}

impl EntitySlot {
    pub fn model(keyframes: &EntityKeyframes) -> Self {
        EntitySlot::ActiveModel {
            scale: keyframes.model_scale,
            mixer_speed: keyframes.mixer_speed,
        }
    }

    pub fn kind(&self) -> TargetKind {
        match self {
            EntitySlot::ActiveModel { .. } => TargetKind::Model,
            EntitySlot::FallbackProxy => TargetKind::Proxy,
        }
    }

    pub fn base_scale(&self) -> f32 {
        match self {
            EntitySlot::ActiveModel { scale, .. } => *scale,
            EntitySlot::FallbackProxy => 1.0,
        }
    }

    /// Write `transform` into whichever object this slot selects
    pub fn apply(&self, target: &mut dyn Movable, transform: &EntityTransform) {
        target.set_position(transform.position);
        target.set_rotation(transform.rotation);
        target.set_scale(self.base_scale() * transform.scale);
        target.set_emissive(transform.glow);
    }
}

/// The host scene as seen from the frame driver.
/// Every write may fail when the object is missing; callers skip and carry on.
pub trait SceneHandle {
    fn entity_target(&mut self, entity: Entity, kind: TargetKind) -> Option<&mut dyn Movable>;

    /// Swap the proxy out for a freshly loaded model
    fn attach_model(&mut self, entity: Entity, keyframes: &EntityKeyframes) -> anyhow::Result<()>;

    /// Advance the model's own animation clips
    fn advance_mixer(&mut self, entity: Entity, dt: f32) -> anyhow::Result<()>;

    fn proxy_part_count(&self, entity: Entity) -> usize;

    fn set_proxy_part_yaw(&mut self, entity: Entity, index: usize, yaw: f32) -> anyhow::Result<()>;

    fn set_camera(&mut self, position: Vec3, look_at: Vec3) -> anyhow::Result<()>;

    fn set_light(&mut self, index: usize, sample: &LightSample) -> anyhow::Result<()>;

    fn write_particles(&mut self, frame: &ParticleFrame<'_>) -> anyhow::Result<()>;

    fn set_stage(&mut self, stage: &StageSample) -> anyhow::Result<()>;
}
