use wasm_bindgen::prelude::*;

pub mod animation;
pub mod animators;
pub mod math;
pub mod particles;
pub mod scene;
pub mod scroll;
pub mod session;
pub mod timeline;

use anyhow::anyhow;

use animators::LightRig;
use scene::SceneGraph;
use session::Session;
use timeline::{Entity, VignetteConfig};

/// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("creation-vignette ready");
}

/// Scroll-driven vignette exposed to JavaScript.
///
/// The page forwards scroll, resize and asset events, calls `render` once per
/// animation frame, then copies the exported buffers into its scene objects.
#[wasm_bindgen]
pub struct CreationVignette {
    session: Session,
    scene: SceneGraph,
    last_frame_ms: Option<f64>,
}

impl CreationVignette {
    pub fn from_config(config: VignetteConfig, viewport_height: f32) -> Self {
        let scene = SceneGraph::with_fallbacks(&config.timeline, &LightRig::default());
        Self {
            session: Session::new(config, viewport_height),
            scene,
            last_frame_ms: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    fn load_asset(&mut self, name: &str) -> anyhow::Result<()> {
        let entity = resolve_entity(name)?;
        self.session.asset_loaded(entity, &mut self.scene)
    }
}

#[wasm_bindgen]
impl CreationVignette {
    /// Create a vignette with the built-in choreography
    #[wasm_bindgen(constructor)]
    pub fn new(viewport_height: f32) -> CreationVignette {
        Self::from_config(VignetteConfig::default(), viewport_height)
    }

    /// Create a vignette from a YAML override of the defaults
    #[wasm_bindgen]
    pub fn with_config(yaml: &str, viewport_height: f32) -> Result<CreationVignette, JsValue> {
        let config = VignetteConfig::from_yaml(yaml).map_err(to_js)?;
        Ok(Self::from_config(config, viewport_height))
    }

    /// Latest vertical page offset in pixels
    #[wasm_bindgen]
    pub fn on_scroll(&mut self, offset: f32) {
        self.session.on_scroll(offset);
    }

    #[wasm_bindgen]
    pub fn resize(&mut self, viewport_height: f32) {
        self.session.on_resize(viewport_height);
    }

    /// Pull scroll offset and viewport height straight from `window`
    #[wasm_bindgen]
    pub fn sync_from_window(&mut self) -> Result<(), JsValue> {
        let (offset, height) = window_metrics().map_err(to_js)?;
        self.session.on_resize(height);
        self.session.on_scroll(offset);
        Ok(())
    }

    /// Advance one frame by `dt` seconds; returns progress for the progress bar
    #[wasm_bindgen]
    pub fn render(&mut self, dt: f32) -> f32 {
        self.session.frame(dt, &mut self.scene).bar_progress
    }

    /// Like `render`, timing the frame with `performance.now()`
    #[wasm_bindgen]
    pub fn render_now(&mut self) -> Result<f32, JsValue> {
        let now = performance_now().map_err(to_js)?;
        let dt = self
            .last_frame_ms
            .map_or(0.0, |last| ((now - last) / 1000.0) as f32);
        self.last_frame_ms = Some(now);
        Ok(self.render(dt))
    }

    /// A model finished loading; the page has added it to its scene
    #[wasm_bindgen]
    pub fn asset_loaded(&mut self, name: &str) -> Result<(), JsValue> {
        self.load_asset(name).map_err(to_js)
    }

    /// A model failed to load; its procedural stand-in stays for good
    #[wasm_bindgen]
    pub fn asset_failed(&mut self, name: &str, reason: &str) -> Result<(), JsValue> {
        let entity = resolve_entity(name).map_err(to_js)?;
        self.session.asset_failed(entity, reason);
        Ok(())
    }

    /// Percentage loaded, if the total is known
    #[wasm_bindgen]
    pub fn asset_progress(&self, name: &str, loaded: f64, total: f64) -> Option<f32> {
        let entity = resolve_entity(name).ok()?;
        self.session.asset_progress(entity, loaded, total)
    }

    /// Unsmoothed progress in [0, 1]
    #[wasm_bindgen]
    pub fn progress(&self) -> f32 {
        self.session.tracker().linear_progress()
    }

    #[wasm_bindgen]
    pub fn smoothed_progress(&self) -> f32 {
        self.session.tracker().smoothed_progress()
    }

    /// 0 approach, 1 contact, 2 separate
    #[wasm_bindgen]
    pub fn phase(&self) -> u32 {
        self.session.tracker().sample().phase().index()
    }

    #[wasm_bindgen]
    pub fn current_section(&self) -> Option<String> {
        self.session.tracker().current_section_name().map(str::to_string)
    }

    /// Damping for the page's orbit controls
    #[wasm_bindgen]
    pub fn orbit_damping(&self) -> f32 {
        self.session.orbit_damping()
    }

    /// Per figure: kind (0 model, 1 proxy), position(3), rotation(3), scale, emissive
    #[wasm_bindgen]
    pub fn entity_data(&self) -> Vec<f32> {
        self.scene.entity_data()
    }

    /// Camera position(3) and look-at(3)
    #[wasm_bindgen]
    pub fn camera_data(&self) -> Vec<f32> {
        self.scene.camera_data()
    }

    /// Per light in rig order: intensity, position(3)
    #[wasm_bindgen]
    pub fn light_data(&self) -> Vec<f32> {
        self.scene.light_data()
    }

    #[wasm_bindgen]
    pub fn particle_positions(&self) -> Vec<f32> {
        self.scene.points().map(|p| p.positions.clone()).unwrap_or_default()
    }

    #[wasm_bindgen]
    pub fn particle_colors(&self) -> Vec<f32> {
        self.scene.points().map(|p| p.colors.clone()).unwrap_or_default()
    }

    #[wasm_bindgen]
    pub fn particle_size(&self) -> f32 {
        self.scene.points().map_or(0.0, |p| p.size)
    }

    /// Euler rotation of the whole particle field
    #[wasm_bindgen]
    pub fn particle_rotation(&self) -> Vec<f32> {
        self.scene
            .points()
            .map(|p| p.rotation.to_array().to_vec())
            .unwrap_or_default()
    }

    /// Platform rotation y, opacity, emissive
    #[wasm_bindgen]
    pub fn stage_data(&self) -> Vec<f32> {
        self.scene.stage_data()
    }

    /// Yaw of each procedural arm part; empty once the model has loaded
    #[wasm_bindgen]
    pub fn arm_part_yaw(&self) -> Vec<f32> {
        self.scene.proxy_part_yaw(Entity::Arm)
    }
}

fn resolve_entity(name: &str) -> anyhow::Result<Entity> {
    Entity::from_name(name).ok_or_else(|| anyhow!("unknown asset '{}'", name))
}

fn window_metrics() -> anyhow::Result<(f32, f32)> {
    let window = web_sys::window().ok_or_else(|| anyhow!("no window"))?;
    let offset = window
        .page_y_offset()
        .map_err(|e| anyhow!("pageYOffset: {:?}", e))?;
    let height = window
        .inner_height()
        .map_err(|e| anyhow!("innerHeight: {:?}", e))?
        .as_f64()
        .ok_or_else(|| anyhow!("innerHeight is not a number"))?;
    Ok((offset as f32, height as f32))
}

fn performance_now() -> anyhow::Result<f64> {
    let window = web_sys::window().ok_or_else(|| anyhow!("no window"))?;
    let performance = window
        .performance()
        .ok_or_else(|| anyhow!("performance API unavailable"))?;
    Ok(performance.now())
}

fn to_js(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{:#}", err))
}
