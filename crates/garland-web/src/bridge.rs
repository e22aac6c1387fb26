use crate::hints::NavigatorReadings;
use garland_core::{
    Choreographer, DeviceProfile, FrameInput, InstanceRaw, MediaHandle, Mode, ModeEvent,
    SceneConfig, Viewer,
};
use glam::{Vec2, Vec3};
use instant::Instant;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use web_sys as web;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("garland-web starting");
    Ok(())
}

fn read_navigator() -> anyhow::Result<NavigatorReadings> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let navigator = window.navigator();
    // deviceMemory is Chromium-only and absent from web-sys bindings
    let device_memory = js_sys::Reflect::get(&navigator, &JsValue::from_str("deviceMemory"))
        .ok()
        .and_then(|v| v.as_f64());
    let has_touch_events =
        js_sys::Reflect::has(&window, &JsValue::from_str("ontouchstart")).unwrap_or(false);
    Ok(NavigatorReadings {
        device_pixel_ratio: window.device_pixel_ratio(),
        hardware_concurrency: navigator.hardware_concurrency(),
        device_memory,
        user_agent: navigator
            .user_agent()
            .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?,
        touch_capable: has_touch_events && navigator.max_touch_points() > 0,
    })
}

fn vec3_from(slice: &[f32]) -> Option<Vec3> {
    match slice {
        [x, y, z, ..] => Some(Vec3::new(*x, *y, *z)),
        _ => None,
    }
}

/// Handle owned by the JavaScript render loop.
#[wasm_bindgen]
pub struct Garland {
    scene: Choreographer,
    started: Instant,
    // Handles resolved by async JS work since the last frame
    inbox: Vec<MediaHandle>,
}

#[wasm_bindgen]
impl Garland {
    /// Profile the device and build the scene. Without a seed one is drawn at random.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<u32>) -> Result<Garland, JsValue> {
        Self::init(seed).map_err(|e| JsValue::from_str(&format!("{e:#}")))
    }

    /// Queue a loaded media item; it joins the scene at the start of the next frame.
    pub fn queue_media(&mut self, handle: u32) {
        self.inbox.push(MediaHandle(handle));
    }

    pub fn evict_media(&mut self, handle: u32) -> bool {
        let handle = MediaHandle(handle);
        let queued = self.inbox.len();
        self.inbox.retain(|h| *h != handle);
        self.inbox.len() != queued || self.scene.evict_media(handle)
    }

    pub fn toggle(&mut self) -> bool {
        self.scene.handle(ModeEvent::Toggle).is_some()
    }

    pub fn enter_assembled(&mut self) -> bool {
        self.scene.handle(ModeEvent::EnterAssembled).is_some()
    }

    pub fn enter_dispersed(&mut self) -> bool {
        self.scene.handle(ModeEvent::EnterDispersed).is_some()
    }

    pub fn enter_focus(&mut self) -> bool {
        self.scene.handle(ModeEvent::EnterFocus).is_some()
    }

    pub fn exit_focus(&mut self) -> bool {
        self.scene.handle(ModeEvent::ExitFocus).is_some()
    }

    /// Advance one frame. `eye` and `target` are camera positions as
    /// `[x, y, z]`; the offset is the external yaw/pitch input in radians.
    /// Returns the number of instances to draw.
    pub fn update(&mut self, eye: &[f32], target: &[f32], offset_x: f32, offset_y: f32) -> usize {
        for handle in self.inbox.drain(..) {
            self.scene.add_media_particle(handle);
        }
        let defaults = Viewer::default();
        let input = FrameInput {
            now: self.started.elapsed(),
            viewer: Viewer {
                eye: vec3_from(eye).unwrap_or(defaults.eye),
                target: vec3_from(target).unwrap_or(defaults.target),
            },
            rotation_offset: Vec2::new(offset_x, offset_y),
        };
        self.scene.update(input).visible
    }

    /// Copy of the packed instance buffer. Read `kind` and `media` through a
    /// `Uint32Array` over the same buffer.
    pub fn instances(&self) -> js_sys::Float32Array {
        let words: &[f32] = bytemuck::cast_slice::<InstanceRaw, f32>(self.scene.instances());
        js_sys::Float32Array::from(words)
    }

    /// 32-bit words per instance.
    pub fn instance_stride(&self) -> usize {
        InstanceRaw::WORDS
    }

    pub fn pixel_scale(&self) -> f32 {
        self.scene.pixel_scale()
    }

    pub fn active_fraction(&self) -> f32 {
        self.scene.active_fraction()
    }

    pub fn controls_frozen(&self) -> bool {
        self.scene.controls_frozen()
    }

    pub fn mode(&self) -> String {
        match self.scene.mode_state().mode() {
            Mode::Assembled => "assembled",
            Mode::Dispersed => "dispersed",
            Mode::Focus => "focus",
        }
        .to_string()
    }

    /// Media handle of the focused particle, if any.
    pub fn focus_media(&self) -> Option<u32> {
        let id = self.scene.mode_state().focus_target()?;
        self.scene.registry().get(id)?.media().map(|h| h.0)
    }
}

impl Garland {
    fn init(seed: Option<u32>) -> anyhow::Result<Garland> {
        let profile = DeviceProfile::detect(read_navigator()?.to_hints());
        let seed = seed.map_or_else(rand::random::<u64>, u64::from);
        let config = SceneConfig::for_device(&profile, seed);
        let scene = Choreographer::new(config, Duration::ZERO)?;
        Ok(Garland {
            scene,
            started: Instant::now(),
            inbox: Vec::new(),
        })
    }
}
