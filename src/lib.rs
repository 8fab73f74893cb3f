use wasm_bindgen::prelude::*;

pub mod assets;
pub mod config;
pub mod error;
pub mod input;
#[cfg(target_arch = "wasm32")]
mod logging;
pub mod render;
pub mod sim;
pub mod world;

pub use assets::{AssetCatalog, AssetId, Category};
pub use config::{CritterConfig, GardenConfig, GroundConfig, RainConfig};
pub use error::{GardenError, Result};
pub use input::PointerState;
pub use render::{InstanceEncoder, Sprite, SpriteKind, Surface};
pub use sim::{CritterMode, CritterSwarm, FlowerPoint, RainState, RainSystem, TargetSource};
pub use world::Viewport;

use sim::SharedFlowers;

// ============================================================================
// GARDEN LAYERS - Ambient critters and rain for the flower page
// ============================================================================
//
// Each layer owns its simulation and exposes flat f32 instance buffers
// (see render.rs for the layout). JS drives them from requestAnimationFrame
// with the elapsed milliseconds and reads the buffers straight out of
// wasm memory through output_ptr/output_len.

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}

fn parse_config(json: Option<String>) -> std::result::Result<GardenConfig, JsValue> {
    match json {
        Some(json) => GardenConfig::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string())),
        None => Ok(GardenConfig::default()),
    }
}

fn random_seed() -> u64 {
    (js_sys::Math::random() * u64::MAX as f64) as u64
}

#[wasm_bindgen]
pub struct CritterLayer {
    swarm: CritterSwarm,
    flowers: SharedFlowers,
    out: InstanceEncoder,
}

#[wasm_bindgen]
impl CritterLayer {
    #[wasm_bindgen(constructor)]
    pub fn new(w: f32, h: f32, config: Option<String>) -> std::result::Result<CritterLayer, JsValue> {
        let config = parse_config(config)?;
        let mut swarm = CritterSwarm::with_clock(
            Viewport::new(w, h),
            config.critters,
            random_seed(),
            world::local_hour(),
        );
        let flowers = SharedFlowers::new();
        swarm.set_target_provider(Some(Box::new(flowers.clone())));
        Ok(Self { swarm, flowers, out: InstanceEncoder::new() })
    }

    /// Flower positions as flat normalized x, y pairs.
    pub fn set_flowers(&mut self, coords: &[f32]) {
        let points = coords
            .chunks_exact(2)
            .map(|xy| FlowerPoint::new(xy[0], xy[1]))
            .collect();
        self.flowers.replace(points);
    }

    pub fn check_time_of_day(&mut self) -> bool {
        let hour = world::local_hour();
        log::info!("hour {hour}h, night: {}", world::is_night_hour(hour));
        self.swarm.set_mode(world::is_night_hour(hour))
    }

    pub fn set_night(&mut self, is_night: bool) -> bool {
        self.swarm.set_mode(is_night)
    }

    pub fn tick(&mut self, dt_ms: f64) {
        self.swarm.poll_clock(dt_ms, world::local_hour());
        if self.swarm.is_running() {
            self.swarm.tick();
        }
        self.out.clear();
        self.swarm.draw_into(&mut self.out);
    }

    pub fn scare(&mut self, x: f32, y: f32) -> u32 {
        self.swarm.react_to_pointer(x, y) as u32
    }

    pub fn resize(&mut self, w: f32, h: f32) {
        self.swarm.resize(w, h);
    }

    pub fn start(&mut self) {
        self.swarm.start();
    }

    pub fn stop(&mut self) {
        self.swarm.stop();
    }

    pub fn is_running(&self) -> bool {
        self.swarm.is_running()
    }

    pub fn is_night(&self) -> bool {
        self.swarm.mode() == Some(CritterMode::Fireflies)
    }

    pub fn dispose(&mut self) {
        self.swarm.dispose();
        self.out.clear();
    }

    pub fn count(&self) -> usize { self.out.count() }
    pub fn output_ptr(&self) -> *const f32 { self.out.ptr() }
    pub fn output_len(&self) -> usize { self.out.len() }
}

#[wasm_bindgen]
pub struct RainLayer {
    rain: RainSystem,
    pointer: PointerState,
    flight: InstanceEncoder,
    snapshot: InstanceEncoder,
}

#[wasm_bindgen]
impl RainLayer {
    /// `base` is the folder holding S_cute / S_core / S_beLike.
    #[wasm_bindgen(constructor)]
    pub fn new(w: f32, h: f32, base: &str, config: Option<String>) -> std::result::Result<RainLayer, JsValue> {
        let config = parse_config(config)?;
        let rain = RainSystem::new(
            Viewport::new(w, h),
            config.rain,
            config.ground,
            AssetCatalog::standard(base),
            random_seed(),
        );
        Ok(Self::from_system(rain))
    }

    // --- assets ---

    pub fn asset_count(&self) -> u32 {
        self.rain.catalog().len() as u32
    }

    pub fn asset_path(&self, id: u32) -> Option<String> {
        self.rain.catalog().get(AssetId(id)).map(|a| a.path.clone())
    }

    /// Placeholder glyph for a failed asset, if any.
    pub fn asset_glyph(&self, id: u32) -> Option<String> {
        match self.rain.catalog().get(AssetId(id)).map(|a| &a.state) {
            Some(assets::AssetState::Placeholder(glyph)) => Some(glyph.to_string()),
            _ => None,
        }
    }

    pub fn mark_loaded(&mut self, id: u32) {
        self.rain.catalog_mut().mark_loaded(AssetId(id));
    }

    pub fn mark_failed(&mut self, id: u32) {
        self.rain.catalog_mut().mark_failed(AssetId(id));
    }

    pub fn is_loaded(&self) -> bool {
        self.rain.catalog().is_loaded()
    }

    /// Whether the ground canvas has the decoded bitmap for `id`.
    pub fn set_asset_ready(&mut self, id: u32, ready: bool) {
        self.rain.ground_mut().surface_mut().set_asset_ready(AssetId(id), ready);
        self.flight.set_asset_ready(AssetId(id), ready);
        self.snapshot.set_asset_ready(AssetId(id), ready);
    }

    // --- switches ---

    pub fn set_modes(&mut self, modes: Vec<String>) {
        self.rain.set_active_mode_names(&modes);
    }

    pub fn set_all_modes(&mut self) {
        self.rain.set_all_modes();
    }

    pub fn start(&mut self) -> bool {
        self.rain.start()
    }

    pub fn stop(&mut self) {
        self.rain.stop();
    }

    pub fn toggle(&mut self) -> bool {
        self.rain.toggle()
    }

    pub fn is_active(&self) -> bool {
        self.rain.is_active()
    }

    pub fn state_json(&self) -> std::result::Result<String, JsValue> {
        serde_json::to_string(&self.rain.state()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Restore saved categories; returns whether rain was on when saved.
    pub fn restore_state(&mut self, json: &str) -> std::result::Result<bool, JsValue> {
        let state: RainState = serde_json::from_str(json)
            .map_err(|e| JsValue::from_str(&GardenError::from(e).to_string()))?;
        Ok(self.rain.restore(&state))
    }

    // --- frame ---

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.pointer.moved_to(x, y);
    }

    /// Advance one frame. Returns false once every loop has parked, so
    /// JS can stop requesting frames until the next start.
    pub fn tick(&mut self, dt_ms: f64) -> bool {
        self.rain.tick(dt_ms, &self.pointer);
        self.flight.clear();
        if self.rain.is_falling() {
            let opacity = self.rain.config().opacity;
            self.rain.falling().draw_into(&mut self.flight, opacity);
        }
        self.rain.is_active() || self.rain.is_falling() || self.rain.is_ground_running()
    }

    pub fn clear_ground(&mut self) {
        self.rain.clear_ground();
    }

    pub fn resize(&mut self, w: f32, h: f32) {
        self.rain.resize(w, h);
    }

    pub fn dispose(&mut self) {
        self.rain.dispose();
        self.flight.clear();
        self.snapshot.clear();
    }

    /// Flatten ground + flight into the snapshot buffer.
    pub fn snapshot(&mut self) -> usize {
        self.snapshot.clear();
        self.rain.draw_into(&mut self.snapshot);
        self.snapshot.count()
    }

    pub fn ground_ptr(&self) -> *const f32 { self.rain.ground().surface().ptr() }
    pub fn ground_len(&self) -> usize { self.rain.ground().surface().len() }
    pub fn flight_ptr(&self) -> *const f32 { self.flight.ptr() }
    pub fn flight_len(&self) -> usize { self.flight.len() }
    pub fn snapshot_ptr(&self) -> *const f32 { self.snapshot.ptr() }
    pub fn snapshot_len(&self) -> usize { self.snapshot.len() }
}

impl RainLayer {
    fn from_system(rain: RainSystem) -> Self {
        Self {
            rain,
            pointer: PointerState::default(),
            flight: InstanceEncoder::new(),
            snapshot: InstanceEncoder::new(),
        }
    }
}
