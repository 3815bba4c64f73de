use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::math::Vec3;

/// Per-frame blend of the smoothed scroll offset toward the raw offset
pub const SCROLL_SMOOTHING: f32 = 0.06;
/// Per-frame blend of the camera position toward its phase target
pub const CAMERA_DAMPING: f32 = 0.025;
/// Damping handed to the host's orbit controls
pub const ORBIT_DAMPING: f32 = 0.08;

/// Upper bound on the particle count accepted from a config override
pub const MAX_PARTICLES: usize = 100_000;

/// Eased progress at which the approach ends and contact begins
pub const APPROACH_END: f32 = 0.3;
/// Eased progress at which contact ends and separation begins
pub const CONTACT_END: f32 = 0.7;

pub const DEFAULT_SECTIONS: [&str; 4] = ["genesis", "encounter", "evolution", "future"];

/// The two choreographed figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Arm,
    Human,
}

impl Entity {
    pub const ALL: [Entity; 2] = [Entity::Arm, Entity::Human];

    pub fn index(self) -> usize {
        match self {
            Entity::Arm => 0,
            Entity::Human => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Entity::Arm => "arm",
            Entity::Human => "human",
        }
    }

    /// Name of the externally loaded model for this entity
    pub fn asset_name(self) -> &'static str {
        match self {
            Entity::Arm => "base.fbx",
            Entity::Human => "Floating.fbx",
        }
    }

    /// Resolve either an asset file name or an entity name
    pub fn from_name(name: &str) -> Option<Entity> {
        Entity::ALL
            .into_iter()
            .find(|e| e.asset_name().eq_ignore_ascii_case(name) || e.name() == name)
    }

    /// +1 for the arm, -1 for the human; the two figures mirror each other
    pub fn sign(self) -> f32 {
        match self {
            Entity::Arm => 1.0,
            Entity::Human => -1.0,
        }
    }
}

/// Keyframes and presentation constants for one entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityKeyframes {
    pub initial: Vec3,
    pub touch: Vec3,
    #[serde(rename = "final")]
    pub final_position: Vec3,
    /// Euler rotation the figure holds throughout, before wobble and turn
    pub touch_rotation: Vec3,
    /// Uniform scale applied to the loaded model
    pub model_scale: f32,
    /// Emissive intensity outside the contact phase
    pub rest_glow: f32,
    /// Playback speed of the model's own animation clips
    pub mixer_speed: f32,
}

impl EntityKeyframes {
    pub fn arm() -> Self {
        Self {
            initial: Vec3::new(-3.0, 0.0, 1.0),
            touch: Vec3::new(-1.5, -0.5, 0.5),
            final_position: Vec3::new(-15.0, 6.0, -5.0),
            touch_rotation: Vec3::new(-0.3, PI * 0.15, -0.1),
            model_scale: 0.08,
            rest_glow: 0.2,
            mixer_speed: 0.8,
        }
    }

    pub fn human() -> Self {
        Self {
            initial: Vec3::new(3.0, -2.5, 0.0),
            touch: Vec3::new(1.5, -1.5, 0.0),
            final_position: Vec3::new(15.0, -8.0, 8.0),
            touch_rotation: Vec3::new(0.4, -PI * 0.2, 0.1),
            model_scale: 8.0,
            rest_glow: 0.1,
            mixer_speed: 0.7,
        }
    }
}

/// Keyframes as written in a YAML override; absent fields keep the built-in value
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct EntityOverride {
    pub initial: Option<Vec3>,
    pub touch: Option<Vec3>,
    #[serde(rename = "final")]
    pub final_position: Option<Vec3>,
    pub touch_rotation: Option<Vec3>,
    pub model_scale: Option<f32>,
    pub rest_glow: Option<f32>,
    pub mixer_speed: Option<f32>,
}

impl EntityOverride {
    pub fn merge(self, base: EntityKeyframes) -> EntityKeyframes {
        EntityKeyframes {
            initial: self.initial.unwrap_or(base.initial),
            touch: self.touch.unwrap_or(base.touch),
            final_position: self.final_position.unwrap_or(base.final_position),
            touch_rotation: self.touch_rotation.unwrap_or(base.touch_rotation),
            model_scale: self.model_scale.unwrap_or(base.model_scale),
            rest_glow: self.rest_glow.unwrap_or(base.rest_glow),
            mixer_speed: self.mixer_speed.unwrap_or(base.mixer_speed),
        }
    }
}

/// Camera path keyframes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraKeyframes {
    pub start: Vec3,
    pub contact: Vec3,
    #[serde(rename = "final")]
    pub final_position: Vec3,
    /// Fixed look-at point
    pub focus: Vec3,
}

impl Default for CameraKeyframes {
    fn default() -> Self {
        Self {
            start: Vec3::new(0.0, -4.0, 30.0),
            contact: Vec3::new(0.0, -4.0, 16.0),
            final_position: Vec3::new(0.0, 0.0, 50.0),
            focus: Vec3::new(0.0, -3.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct CameraOverride {
    pub start: Option<Vec3>,
    pub contact: Option<Vec3>,
    #[serde(rename = "final")]
    pub final_position: Option<Vec3>,
    pub focus: Option<Vec3>,
}

impl CameraOverride {
    pub fn merge(self, base: CameraKeyframes) -> CameraKeyframes {
        CameraKeyframes {
            start: self.start.unwrap_or(base.start),
            contact: self.contact.unwrap_or(base.contact),
            final_position: self.final_position.unwrap_or(base.final_position),
            focus: self.focus.unwrap_or(base.focus),
        }
    }
}

/// Partial timeline read from YAML, merged over the defaults
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct TimelineOverride {
    pub arm: EntityOverride,
    pub human: EntityOverride,
    pub finger_distance: Option<f32>,
    pub camera: CameraOverride,
}

impl From<TimelineOverride> for TimelineConfig {
    fn from(o: TimelineOverride) -> Self {
        let base = TimelineConfig::default();
        Self {
            arm: o.arm.merge(base.arm),
            human: o.human.merge(base.human),
            finger_distance: o.finger_distance.unwrap_or(base.finger_distance),
            camera: o.camera.merge(base.camera),
        }
    }
}

/// Static description of the whole choreography
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TimelineOverride")]
pub struct TimelineConfig {
    pub arm: EntityKeyframes,
    pub human: EntityKeyframes,
    /// Gap left between the two fingertips at the touch keyframes
    pub finger_distance: f32,
    pub camera: CameraKeyframes,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            arm: EntityKeyframes::arm(),
            human: EntityKeyframes::human(),
            finger_distance: 0.5,
            camera: CameraKeyframes::default(),
        }
    }
}

impl TimelineConfig {
    pub fn keyframes(&self, entity: Entity) -> &EntityKeyframes {
        match entity {
            Entity::Arm => &self.arm,
            Entity::Human => &self.human,
        }
    }
}

/// Everything fixed at session start. Defaults reproduce the shipped vignette;
/// a YAML document may override any subset of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VignetteConfig {
    /// Page sections in scroll order
    pub sections: Vec<String>,
    pub scroll_smoothing: f32,
    pub camera_damping: f32,
    pub orbit_damping: f32,
    pub particle_count: usize,
    pub particle_seed: u32,
    pub timeline: TimelineConfig,
}

impl Default for VignetteConfig {
    fn default() -> Self {
        Self {
            sections: DEFAULT_SECTIONS.iter().map(|s| s.to_string()).collect(),
            scroll_smoothing: SCROLL_SMOOTHING,
            camera_damping: CAMERA_DAMPING,
            orbit_damping: ORBIT_DAMPING,
            particle_count: 200,
            particle_seed: 7,
            timeline: TimelineConfig::default(),
        }
    }
}

impl VignetteConfig {
    /// Parse and validate a YAML override
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let config: VignetteConfig =
            serde_yaml::from_str(yaml).context("invalid vignette config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sections.is_empty() {
            bail!("at least one page section is required");
        }
        for (name, factor) in [
            ("scroll_smoothing", self.scroll_smoothing),
            ("camera_damping", self.camera_damping),
            ("orbit_damping", self.orbit_damping),
        ] {
            if factor.is_nan() || factor <= 0.0 || factor > 1.0 {
                bail!("{} must be in (0, 1], got {}", name, factor);
            }
        }
        if self.particle_count > MAX_PARTICLES {
            bail!(
                "particle_count must be at most {}, got {}",
                MAX_PARTICLES,
                self.particle_count
            );
        }
        for entity in Entity::ALL {
            let k = self.timeline.keyframes(entity);
            let points = [k.initial, k.touch, k.final_position, k.touch_rotation];
            if !points.iter().all(Vec3::is_finite) {
                bail!("{} keyframes must be finite", entity.name());
            }
            if !k.model_scale.is_finite() || k.model_scale <= 0.0 {
                bail!("{} model_scale must be positive", entity.name());
            }
            if !k.rest_glow.is_finite() || !k.mixer_speed.is_finite() {
                bail!("{} rest_glow and mixer_speed must be finite", entity.name());
            }
        }
        let c = &self.timeline.camera;
        if ![c.start, c.contact, c.final_position, c.focus]
            .iter()
            .all(Vec3::is_finite)
        {
            bail!("camera keyframes must be finite");
        }
        if !self.timeline.finger_distance.is_finite() {
            bail!("finger_distance must be finite");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keyframes() {
        let config = TimelineConfig::default();
        assert_eq!(config.arm.initial, Vec3::new(-3.0, 0.0, 1.0));
        assert_eq!(config.human.initial, Vec3::new(3.0, -2.5, 0.0));
        assert_eq!(config.arm.final_position, Vec3::new(-15.0, 6.0, -5.0));
        assert_eq!(config.human.final_position, Vec3::new(15.0, -8.0, 8.0));
        assert_eq!(config.finger_distance, 0.5);
    }

    #[test]
    fn test_entity_lookup() {
        assert_eq!(Entity::from_name("base.fbx"), Some(Entity::Arm));
        assert_eq!(Entity::from_name("Floating.fbx"), Some(Entity::Human));
        assert_eq!(Entity::from_name("human"), Some(Entity::Human));
        assert_eq!(Entity::from_name("other.glb"), None);
        assert_eq!(Entity::Arm.sign(), -Entity::Human.sign());
    }

    #[test]
    fn test_partial_yaml_override() {
        let yaml = r#"
sections: [intro, outro]
timeline:
  arm:
    initial: { x: -4.0, y: 0.0, z: 1.0 }
    touch: { x: -1.5, y: -0.5, z: 0.5 }
    final: { x: -15.0, y: 6.0, z: -5.0 }
    touch_rotation: { x: 0.0, y: 0.0, z: 0.0 }
    model_scale: 0.1
    rest_glow: 0.2
    mixer_speed: 0.8
"#;
        let config = VignetteConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.sections, vec!["intro", "outro"]);
        assert_eq!(config.timeline.arm.initial.x, -4.0);
        assert_eq!(config.timeline.human, EntityKeyframes::human());
        assert_eq!(config.scroll_smoothing, SCROLL_SMOOTHING);
    }

    #[test]
    fn test_single_field_override() {
        let yaml = "timeline:\n  arm:\n    initial: { x: -4.0, y: 0.0, z: 1.0 }\n  camera:\n    focus: { x: 0.0, y: -2.0, z: 0.0 }\n";
        let config = VignetteConfig::from_yaml(yaml).unwrap();
        let arm = config.timeline.arm;
        assert_eq!(arm.initial, Vec3::new(-4.0, 0.0, 1.0));
        assert_eq!(arm.touch, EntityKeyframes::arm().touch);
        assert_eq!(arm.model_scale, 0.08);
        assert_eq!(config.timeline.human, EntityKeyframes::human());
        assert_eq!(config.timeline.camera.focus, Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(config.timeline.camera.start, CameraKeyframes::default().start);
        assert_eq!(config.timeline.finger_distance, 0.5);
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let cases = [
            "timeline:\n  camera:\n    start: { x: .nan, y: -4.0, z: 30.0 }\n",
            "timeline:\n  camera:\n    focus: { x: 0.0, y: .inf, z: 0.0 }\n",
            "timeline:\n  arm:\n    rest_glow: .nan\n",
            "timeline:\n  human:\n    mixer_speed: .inf\n",
            "timeline:\n  human:\n    touch: { x: .nan, y: 0.0, z: 0.0 }\n",
            "timeline:\n  finger_distance: .nan\n",
            "orbit_damping: .nan\n",
        ];
        for yaml in cases {
            assert!(VignetteConfig::from_yaml(yaml).is_err(), "accepted {:?}", yaml);
        }
    }

    #[test]
    fn test_particle_count_capped() {
        assert!(VignetteConfig::from_yaml("particle_count: 9223372036854775807").is_err());
        assert!(VignetteConfig::from_yaml("particle_count: 100001").is_err());
        let config = VignetteConfig::from_yaml("particle_count: 100000").unwrap();
        assert_eq!(config.particle_count, MAX_PARTICLES);
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        assert!(VignetteConfig::from_yaml("sections: [").is_err());
        assert!(VignetteConfig::from_yaml("sections: []").is_err());
        assert!(VignetteConfig::from_yaml("scroll_smoothing: 0.0").is_err());
        assert!(VignetteConfig::from_yaml("camera_damping: 1.5").is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(VignetteConfig::default().validate().is_ok());
    }
}
