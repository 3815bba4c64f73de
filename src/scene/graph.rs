use anyhow::anyhow;

use super::{Movable, SceneHandle, TargetKind};
use crate::animators::{LightRig, LightSample, StageSample};
use crate::math::Vec3;
use crate::particles::ParticleFrame;
use crate::timeline::{Entity, EntityKeyframes, TimelineConfig};

/// Pieces of the procedural arm, in child order
pub const ARM_PROXY_PARTS: [&str; 7] = [
    "base", "segment", "joint", "forearm", "hand", "finger_a", "finger_b",
];

/// Floats per figure in `entity_data`: kind, position(3), rotation(3), scale, emissive
pub const ENTITY_STRIDE: usize = 9;

/// Transform plus emissive of a single object
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
    pub emissive: f32,
}

impl SceneNode {
    fn posed(position: Vec3, rotation: Vec3, scale: f32, emissive: f32) -> Self {
        Self { position, rotation, scale, emissive }
    }
}

impl Movable for SceneNode {
    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
    }

    fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    fn set_emissive(&mut self, intensity: f32) {
        self.emissive = intensity;
    }
}

#[derive(Debug, Clone)]
pub struct ModelNode {
    pub node: SceneNode,
    /// Seconds of clip time played so far
    pub mixer_time: f32,
}

#[derive(Debug, Clone)]
pub struct ProxyNode {
    pub node: SceneNode,
    pub part_yaw: Vec<f32>,
}

#[derive(Debug, Clone, Default)]
struct EntityNodes {
    model: Option<ModelNode>,
    proxy: Option<ProxyNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraNode {
    pub position: Vec3,
    pub look_at: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightNode {
    pub name: &'static str,
    pub intensity: f32,
    pub position: Vec3,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointsNode {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
    pub size: f32,
    pub rotation: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageNode {
    pub rotation_y: f32,
    pub opacity: f32,
    pub emissive: f32,
}

/// In-memory mirror of the host scene
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    entities: [EntityNodes; 2],
    camera: Option<CameraNode>,
    lights: Vec<LightNode>,
    points: Option<PointsNode>,
    stage: Option<StageNode>,
}

impl SceneGraph {
    /// A scene with nothing in it; every write is skipped
    pub fn empty() -> Self {
        Self::default()
    }

    /// The scene as it stands before any asset arrives: both proxies posed at
    /// their initial keyframes, camera at the start of its path, full light rig
    pub fn with_fallbacks(config: &TimelineConfig, rig: &LightRig) -> Self {
        let mut graph = Self::default();

        for entity in Entity::ALL {
            let k = config.keyframes(entity);
            let parts = match entity {
                Entity::Arm => ARM_PROXY_PARTS.len(),
                Entity::Human => 0,
            };
            graph.entities[entity.index()].proxy = Some(ProxyNode {
                node: SceneNode::posed(k.initial, k.touch_rotation, 1.0, k.rest_glow),
                part_yaw: vec![0.0; parts],
            });
        }

        graph.camera = Some(CameraNode {
            position: config.camera.start,
            look_at: config.camera.focus,
        });
        graph.lights = rig
            .lights()
            .iter()
            .map(|spec| LightNode {
                name: spec.name,
                intensity: spec.base_intensity,
                position: spec.position,
            })
            .collect();
        graph.points = Some(PointsNode::default());
        graph.stage = Some(StageNode {
            rotation_y: 0.0,
            opacity: 0.3,
            emissive: 0.05,
        });

        graph
    }

    pub fn model(&self, entity: Entity) -> Option<&ModelNode> {
        self.entities[entity.index()].model.as_ref()
    }

    pub fn proxy(&self, entity: Entity) -> Option<&ProxyNode> {
        self.entities[entity.index()].proxy.as_ref()
    }

    pub fn camera(&self) -> Option<&CameraNode> {
        self.camera.as_ref()
    }

    pub fn light(&self, index: usize) -> Option<&LightNode> {
        self.lights.get(index)
    }

    pub fn points(&self) -> Option<&PointsNode> {
        self.points.as_ref()
    }

    pub fn stage(&self) -> Option<&StageNode> {
        self.stage.as_ref()
    }

    /// The object currently standing in for `entity`, model first
    pub fn active_node(&self, entity: Entity) -> Option<(TargetKind, &SceneNode)> {
        let nodes = &self.entities[entity.index()];
        if let Some(model) = &nodes.model {
            Some((TargetKind::Model, &model.node))
        } else {
            nodes.proxy.as_ref().map(|p| (TargetKind::Proxy, &p.node))
        }
    }

    /// Per figure: kind code (-1 when absent), position, rotation, scale, emissive
    pub fn entity_data(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(Entity::ALL.len() * ENTITY_STRIDE);
        for entity in Entity::ALL {
            match self.active_node(entity) {
                Some((kind, node)) => {
                    data.push(kind.code());
                    data.extend_from_slice(&node.position.to_array());
                    data.extend_from_slice(&node.rotation.to_array());
                    data.push(node.scale);
                    data.push(node.emissive);
                }
                None => {
                    data.push(-1.0);
                    data.extend_from_slice(&[0.0; ENTITY_STRIDE - 1]);
                }
            }
        }
        data
    }

    /// Position followed by look-at point
    pub fn camera_data(&self) -> Vec<f32> {
        match &self.camera {
            Some(c) => {
                let mut data = c.position.to_array().to_vec();
                data.extend_from_slice(&c.look_at.to_array());
                data
            }
            None => Vec::new(),
        }
    }

    /// Per light: intensity then position
    pub fn light_data(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.lights.len() * 4);
        for light in &self.lights {
            data.push(light.intensity);
            data.extend_from_slice(&light.position.to_array());
        }
        data
    }

    /// Rotation y, opacity, emissive
    pub fn stage_data(&self) -> Vec<f32> {
        self.stage
            .as_ref()
            .map(|s| vec![s.rotation_y, s.opacity, s.emissive])
            .unwrap_or_default()
    }

    pub fn proxy_part_yaw(&self, entity: Entity) -> Vec<f32> {
        self.proxy(entity)
            .map(|p| p.part_yaw.clone())
            .unwrap_or_default()
    }
}

impl SceneHandle for SceneGraph {
    fn entity_target(&mut self, entity: Entity, kind: TargetKind) -> Option<&mut dyn Movable> {
        let nodes = &mut self.entities[entity.index()];
        match kind {
            TargetKind::Model => nodes.model.as_mut().map(|m| &mut m.node as &mut dyn Movable),
            TargetKind::Proxy => nodes.proxy.as_mut().map(|p| &mut p.node as &mut dyn Movable),
        }
    }

    fn attach_model(&mut self, entity: Entity, keyframes: &EntityKeyframes) -> anyhow::Result<()> {
        let nodes = &mut self.entities[entity.index()];
        if nodes.model.is_some() {
            return Err(anyhow!("{} model already attached", entity.name()));
        }
        nodes.proxy = None;
        nodes.model = Some(ModelNode {
            node: SceneNode::posed(
                keyframes.initial,
                keyframes.touch_rotation,
                keyframes.model_scale,
                keyframes.rest_glow,
            ),
            mixer_time: 0.0,
        });
        Ok(())
    }

    fn advance_mixer(&mut self, entity: Entity, dt: f32) -> anyhow::Result<()> {
        let model = self.entities[entity.index()]
            .model
            .as_mut()
            .ok_or_else(|| anyhow!("no {} model to animate", entity.name()))?;
        model.mixer_time += dt;
        Ok(())
    }

    fn proxy_part_count(&self, entity: Entity) -> usize {
        self.proxy(entity).map_or(0, |p| p.part_yaw.len())
    }

    fn set_proxy_part_yaw(&mut self, entity: Entity, index: usize, yaw: f32) -> anyhow::Result<()> {
        let slot = self.entities[entity.index()]
            .proxy
            .as_mut()
            .and_then(|p| p.part_yaw.get_mut(index))
            .ok_or_else(|| anyhow!("no {} proxy part {}", entity.name(), index))?;
        *slot = yaw;
        Ok(())
    }

    fn set_camera(&mut self, position: Vec3, look_at: Vec3) -> anyhow::Result<()> {
        let camera = self.camera.as_mut().ok_or_else(|| anyhow!("no camera"))?;
        camera.position = position;
        camera.look_at = look_at;
        Ok(())
    }

    fn set_light(&mut self, index: usize, sample: &LightSample) -> anyhow::Result<()> {
        let light = self
            .lights
            .get_mut(index)
            .ok_or_else(|| anyhow!("no light at index {}", index))?;
        light.intensity = sample.intensity;
        light.position = sample.position;
        Ok(())
    }

    fn write_particles(&mut self, frame: &ParticleFrame<'_>) -> anyhow::Result<()> {
        let points = self.points.as_mut().ok_or_else(|| anyhow!("no particle field"))?;
        points.positions.clear();
        points.positions.extend_from_slice(frame.positions);
        points.colors.clear();
        points.colors.extend_from_slice(frame.colors);
        points.size = frame.size;
        points.rotation = frame.rotation;
        Ok(())
    }

    fn set_stage(&mut self, stage: &StageSample) -> anyhow::Result<()> {
        let node = self.stage.as_mut().ok_or_else(|| anyhow!("no stage"))?;
        node.rotation_y = stage.rotation_y;
        node.opacity = stage.opacity;
        node.emissive = stage.emissive;
        Ok(())
    }
}
