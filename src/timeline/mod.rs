//! Keyframed choreography: static configuration and the phase evaluator.

pub mod config;
pub mod phase;

pub use config::{
    CameraKeyframes, Entity, EntityKeyframes, TimelineConfig, VignetteConfig, APPROACH_END,
    CAMERA_DAMPING, CONTACT_END, ORBIT_DAMPING, SCROLL_SMOOTHING,
};
pub use phase::{EntityTransform, Phase, PhaseEvaluator, ProgressSample, proxy_part_yaw};
