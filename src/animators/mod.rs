//! Animators that share the timeline's clock: camera, lights and the platform.

pub mod camera;
pub mod lights;
pub mod stage;

pub use camera::CameraPath;
pub use lights::{LightKind, LightRig, LightSample, LightSpec};
pub use stage::StageSample;
