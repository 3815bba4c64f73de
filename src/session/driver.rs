//! Per-frame orchestration
//!
//! One `Session` owns all mutable state of the vignette: scroll smoothing,
//! the damped camera, elapsed time and which object stands in for each figure.
//! `frame` runs tracker, evaluator and animators in order and commits the
//! results to the scene. A write that cannot land is skipped, never fatal.

use std::collections::HashSet;

use anyhow::anyhow;

use crate::animators::{CameraPath, LightRig, StageSample};
use crate::particles::ParticleField;
use crate::scene::{EntitySlot, SceneHandle};
use crate::scroll::ProgressTracker;
use crate::timeline::{
    proxy_part_yaw, Entity, EntityTransform, Phase, PhaseEvaluator, ProgressSample, VignetteConfig,
};

/// A scene write that was skipped this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkippedWrite {
    Entity(Entity),
    Mixer(Entity),
    ProxyPart(Entity),
    Camera,
    Light(usize),
    Particles,
    Stage,
}

/// What a frame computed and what it could not apply
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub elapsed: f32,
    pub phase: Phase,
    pub progress: ProgressSample,
    /// Unsmoothed progress for the page's progress bar
    pub bar_progress: f32,
    /// Indexed by `Entity::index`
    pub transforms: [EntityTransform; 2],
    pub skipped: Vec<SkippedWrite>,
}

pub struct Session {
    tracker: ProgressTracker,
    evaluator: PhaseEvaluator,
    camera: CameraPath,
    lights: LightRig,
    particles: ParticleField,
    slots: [EntitySlot; 2],
    pending_scroll: f32,
    elapsed: f32,
    orbit_damping: f32,
    warned: HashSet<SkippedWrite>,
}

impl Session {
    pub fn new(config: VignetteConfig, viewport_height: f32) -> Self {
        let tracker = ProgressTracker::new(config.sections.clone(), viewport_height)
            .with_smoothing(config.scroll_smoothing);
        let camera = CameraPath::new(config.timeline.camera).with_damping(config.camera_damping);

        Self {
            tracker,
            camera,
            lights: LightRig::default(),
            particles: ParticleField::new(config.particle_count, config.particle_seed),
            slots: [EntitySlot::FallbackProxy; 2],
            pending_scroll: 0.0,
            elapsed: 0.0,
            orbit_damping: config.orbit_damping,
            warned: HashSet::new(),
            evaluator: PhaseEvaluator::new(config.timeline),
        }
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn evaluator(&self) -> &PhaseEvaluator {
        &self.evaluator
    }

    pub fn camera(&self) -> &CameraPath {
        &self.camera
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn slot(&self, entity: Entity) -> EntitySlot {
        self.slots[entity.index()]
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn orbit_damping(&self) -> f32 {
        self.orbit_damping
    }

    /// Scroll event handoff; smoothing advances on the next frame
    pub fn on_scroll(&mut self, offset: f32) {
        self.pending_scroll = offset;
        self.tracker.set_raw(offset);
    }

    pub fn on_resize(&mut self, viewport_height: f32) {
        self.tracker.resize(viewport_height);
    }

    /// The external model for `entity` finished loading
    pub fn asset_loaded<S: SceneHandle + ?Sized>(
        &mut self,
        entity: Entity,
        scene: &mut S,
    ) -> anyhow::Result<()> {
        if let EntitySlot::ActiveModel { .. } = self.slot(entity) {
            return Err(anyhow!("{} already has a model", entity.asset_name()));
        }
        let keyframes = *self.evaluator.config().keyframes(entity);
        scene.attach_model(entity, &keyframes)?;
        self.slots[entity.index()] = EntitySlot::model(&keyframes);
        log::info!("{} loaded, {} proxy retired", entity.asset_name(), entity.name());
        Ok(())
    }

    /// The external model for `entity` will never arrive; the proxy stays
    pub fn asset_failed(&self, entity: Entity, reason: &str) {
        log::warn!(
            "{} unavailable ({}), keeping procedural {}",
            entity.asset_name(),
            reason,
            entity.name()
        );
    }

    /// Loading percentage, when the total size is known
    pub fn asset_progress(&self, entity: Entity, loaded: f64, total: f64) -> Option<f32> {
        if total.is_nan() || total <= 0.0 {
            return None;
        }
        let percent = (loaded / total * 100.0).clamp(0.0, 100.0) as f32;
        log::debug!("loading {}: {:.1}%", entity.asset_name(), percent);
        Some(percent)
    }

    /// Advance one frame by `dt` seconds and write everything into `scene`
    pub fn frame<S: SceneHandle + ?Sized>(&mut self, dt: f32, scene: &mut S) -> FrameReport {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.elapsed += dt;
        let time = self.elapsed;
        let mut skipped = Vec::new();

        for entity in Entity::ALL {
            if let EntitySlot::ActiveModel { mixer_speed, .. } = self.slot(entity) {
                let result = scene.advance_mixer(entity, dt * mixer_speed);
                self.note(result, SkippedWrite::Mixer(entity), &mut skipped);
            }
        }

        self.tracker.update(self.pending_scroll);
        let progress = self.tracker.sample();

        let transforms = Entity::ALL.map(|entity| self.evaluator.evaluate(entity, progress, time));
        for entity in Entity::ALL {
            let slot = self.slot(entity);
            let result = match scene.entity_target(entity, slot.kind()) {
                Some(target) => {
                    slot.apply(target, &transforms[entity.index()]);
                    Ok(())
                }
                None => Err(anyhow!("no {:?} object for {}", slot.kind(), entity.name())),
            };
            self.note(result, SkippedWrite::Entity(entity), &mut skipped);

            if slot == EntitySlot::FallbackProxy {
                for index in 0..scene.proxy_part_count(entity) {
                    let result = scene.set_proxy_part_yaw(entity, index, proxy_part_yaw(index, time));
                    self.note(result, SkippedWrite::ProxyPart(entity), &mut skipped);
                }
            }
        }

        self.particles.update(time);
        let result = scene.write_particles(&self.particles.frame());
        self.note(result, SkippedWrite::Particles, &mut skipped);
        let result = scene.set_stage(&StageSample::at(time));
        self.note(result, SkippedWrite::Stage, &mut skipped);

        let position = self.camera.update(progress.linear, time);
        let result = scene.set_camera(position, self.camera.look_at());
        self.note(result, SkippedWrite::Camera, &mut skipped);

        let samples: Vec<_> = self.lights.sample_all(time).collect();
        for (index, sample) in samples {
            let result = scene.set_light(index, &sample);
            self.note(result, SkippedWrite::Light(index), &mut skipped);
        }

        FrameReport {
            elapsed: time,
            phase: progress.phase(),
            progress,
            bar_progress: self.tracker.linear_progress(),
            transforms,
            skipped,
        }
    }

    /// Log a failed write the first time it happens and keep going
    fn note(&mut self, result: anyhow::Result<()>, what: SkippedWrite, skipped: &mut Vec<SkippedWrite>) {
        if let Err(err) = result {
            if self.warned.insert(what) {
                log::warn!("skipping scene write {:?}: {:#}", what, err);
            }
            if !skipped.contains(&what) {
                skipped.push(what);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;
    use crate::scene::{SceneGraph, TargetKind};
    use crate::timeline::phase::{JITTER_X, JITTER_Y};

    const HEIGHT: f32 = 800.0;
    const MAX_EXTENT: f32 = 2400.0;
    const DT: f32 = 1.0 / 60.0;

    fn setup() -> (Session, SceneGraph) {
        let config = VignetteConfig::default();
        let session = Session::new(config.clone(), HEIGHT);
        let scene = SceneGraph::with_fallbacks(&config.timeline, &LightRig::default());
        (session, scene)
    }

    fn settle(session: &mut Session, scene: &mut SceneGraph, offset: f32) -> FrameReport {
        session.on_scroll(offset);
        let mut report = session.frame(DT, scene);
        for _ in 0..1500 {
            report = session.frame(DT, scene);
        }
        report
    }

    fn node_position(scene: &SceneGraph, entity: Entity) -> Vec3 {
        scene.active_node(entity).unwrap().1.position
    }

    #[test]
    fn test_scroll_zero_holds_initial_pose() {
        let (mut session, mut scene) = setup();
        let report = settle(&mut session, &mut scene, 0.0);
        assert_eq!(report.progress.eased, 0.0);
        assert_eq!(report.phase, Phase::Approach);
        assert_eq!(node_position(&scene, Entity::Arm), Vec3::new(-3.0, 0.0, 1.0));
        assert_eq!(node_position(&scene, Entity::Human), Vec3::new(3.0, -2.5, 0.0));
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_half_scroll_reaches_touch() {
        let (mut session, mut scene) = setup();
        let report = settle(&mut session, &mut scene, 0.5 * MAX_EXTENT);
        assert!((report.progress.linear - 0.5).abs() < 1e-3);
        assert_eq!(report.phase, Phase::Contact);

        let arm = node_position(&scene, Entity::Arm);
        let human = node_position(&scene, Entity::Human);
        let arm_touch = Vec3::new(-1.5, -0.5, 0.5);
        let human_touch = Vec3::new(1.5, -1.5, 0.0);
        assert!((arm.x - arm_touch.x).abs() <= JITTER_X + 1e-5);
        assert!((arm.y - arm_touch.y).abs() <= JITTER_Y + 1e-5);
        assert!((human.x - human_touch.x).abs() <= JITTER_X + 1e-5);
        assert!((human.y - human_touch.y).abs() <= JITTER_Y + 1e-5);
    }

    #[test]
    fn test_full_scroll_reaches_final_pose() {
        let (mut session, mut scene) = setup();
        let report = settle(&mut session, &mut scene, MAX_EXTENT);
        assert_eq!(report.phase, Phase::Separate);
        assert_eq!(report.bar_progress, 1.0);
        let arm = node_position(&scene, Entity::Arm);
        let human = node_position(&scene, Entity::Human);
        assert!(arm.max_abs_diff(&Vec3::new(-15.0, 6.0, -5.0)) < 1e-3);
        assert!(human.max_abs_diff(&Vec3::new(15.0, -8.0, 8.0)) < 1e-3);
        let camera = scene.camera().unwrap();
        assert!(camera.position.distance(&Vec3::new(0.0, 0.0, 50.0)) < 0.1);
    }

    #[test]
    fn test_progress_lags_scroll() {
        let (mut session, mut scene) = setup();
        session.on_scroll(MAX_EXTENT);
        let report = session.frame(DT, &mut scene);
        assert_eq!(report.bar_progress, 1.0);
        assert!((report.progress.linear - 0.06).abs() < 1e-5);
    }

    #[test]
    fn test_fallback_gets_same_sequence_as_model() {
        let config = VignetteConfig::default();
        let (mut with_model, mut model_scene) = setup();
        let (mut with_proxy, mut proxy_scene) = setup();
        with_model.asset_loaded(Entity::Human, &mut model_scene).unwrap();
        with_proxy.asset_failed(Entity::Human, "404");

        for step in 0..400 {
            let offset = step as f32 * 8.0;
            with_model.on_scroll(offset);
            with_proxy.on_scroll(offset);
            let a = with_model.frame(DT, &mut model_scene);
            let b = with_proxy.frame(DT, &mut proxy_scene);
            assert_eq!(a.transforms, b.transforms);

            let (kind_a, model) = model_scene.active_node(Entity::Human).unwrap();
            let (kind_b, proxy) = proxy_scene.active_node(Entity::Human).unwrap();
            assert_eq!(kind_a, TargetKind::Model);
            assert_eq!(kind_b, TargetKind::Proxy);
            assert_eq!(model.position, proxy.position);
            assert_eq!(model.rotation, proxy.rotation);
            assert_eq!(model.emissive, proxy.emissive);
            assert_eq!(model.scale, config.timeline.human.model_scale);
            assert_eq!(proxy.scale, 1.0);
        }
    }

    #[test]
    fn test_mixers_advance_at_relative_speed() {
        let (mut session, mut scene) = setup();
        session.asset_loaded(Entity::Arm, &mut scene).unwrap();
        session.asset_loaded(Entity::Human, &mut scene).unwrap();
        for _ in 0..10 {
            session.frame(0.1, &mut scene);
        }
        assert!((scene.model(Entity::Arm).unwrap().mixer_time - 0.8).abs() < 1e-4);
        assert!((scene.model(Entity::Human).unwrap().mixer_time - 0.7).abs() < 1e-4);
    }

    #[test]
    fn test_duplicate_asset_rejected() {
        let (mut session, mut scene) = setup();
        session.asset_loaded(Entity::Arm, &mut scene).unwrap();
        assert!(session.asset_loaded(Entity::Arm, &mut scene).is_err());
        assert_eq!(session.slot(Entity::Arm).kind(), TargetKind::Model);
        assert_eq!(session.slot(Entity::Human), EntitySlot::FallbackProxy);
    }

    #[test]
    fn test_proxy_parts_wobble_only_while_proxy() {
        let (mut session, mut scene) = setup();
        session.frame(1.0, &mut scene);
        let yaw = scene.proxy_part_yaw(Entity::Arm);
        assert_eq!(yaw.len(), 7);
        assert!((yaw[2] - proxy_part_yaw(2, 1.0)).abs() < 1e-6);

        session.asset_loaded(Entity::Arm, &mut scene).unwrap();
        let report = session.frame(DT, &mut scene);
        assert!(scene.proxy_part_yaw(Entity::Arm).is_empty());
        assert!(!report.skipped.contains(&SkippedWrite::ProxyPart(Entity::Arm)));
    }

    #[test]
    fn test_empty_scene_skips_without_aborting() {
        let config = VignetteConfig::default();
        let mut session = Session::new(config, HEIGHT);
        let mut scene = SceneGraph::empty();
        session.on_scroll(1000.0);
        for _ in 0..5 {
            let report = session.frame(DT, &mut scene);
            assert!(report.skipped.contains(&SkippedWrite::Entity(Entity::Arm)));
            assert!(report.skipped.contains(&SkippedWrite::Camera));
            assert!(report.skipped.contains(&SkippedWrite::Light(0)));
            assert!(report.skipped.contains(&SkippedWrite::Particles));
        }
        // the session kept running and kept its own state moving
        assert!(session.tracker().smoothed_progress() > 0.0);
        assert!(session.camera().position().z < 30.0);
    }

    #[test]
    fn test_bad_dt_ignored() {
        let (mut session, mut scene) = setup();
        session.frame(0.5, &mut scene);
        session.frame(f32::NAN, &mut scene);
        session.frame(-3.0, &mut scene);
        assert!((session.elapsed() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_scene_receives_particles_and_lights() {
        let (mut session, mut scene) = setup();
        session.frame(2.0, &mut scene);
        let points = scene.points().unwrap();
        assert_eq!(points.positions.len(), 600);
        assert_eq!(points.colors.len(), 600);
        let main = scene.light(1).unwrap();
        assert!((main.intensity - (2.0 + (1.0f32).sin() * 0.2)).abs() < 1e-5);
        let stage = scene.stage().unwrap();
        assert!((stage.rotation_y - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_asset_progress_percent() {
        let (session, _) = setup();
        assert_eq!(session.asset_progress(Entity::Arm, 50.0, 200.0), Some(25.0));
        assert_eq!(session.asset_progress(Entity::Arm, 50.0, 0.0), None);
        assert_eq!(session.asset_progress(Entity::Arm, 1.0, f64::NAN), None);
    }
}
