use orbit_rig::{
    EngineContext, EngineEvent, FixedTimestep, InputEvent, InputQueue, Polyline, ProtocolLayout, Scene,
    SceneConfig,
};
use orbit_rig::error::ConfigResult;

/// Generic scene runner that wires up the engine loop.
///
/// Each concrete site (e.g., `orrery-site`) creates a `thread_local!`
/// SceneRunner and exports free functions via `#[wasm_bindgen]`, because
/// wasm-bindgen cannot export generic structs directly.
pub struct SceneRunner<S: Scene> {
    scene: S,
    ctx: EngineContext,
    input: InputQueue,
    timestep: FixedTimestep,
    config: SceneConfig,
    layout: ProtocolLayout,
    initialized: bool,
    frame_counter: u32,
    /// Events raised between ticks, delivered with the next frame.
    pending_events: Vec<EngineEvent>,
    /// Flat frame buffer laid out by `layout`, read by the renderer.
    frame: Vec<f32>,
}

impl<S: Scene> SceneRunner<S> {
    pub fn new(scene: S) -> Self {
        let config = scene.config();
        let timestep = FixedTimestep::new(config.fixed_dt);
        let layout = ProtocolLayout::from_config(&config);
        let frame = layout.allocate();

        Self {
            scene,
            ctx: EngineContext::new(),
            input: InputQueue::new(),
            timestep,
            layout,
            config,
            initialized: false,
            frame_counter: 0,
            pending_events: Vec::new(),
            frame,
        }
    }

    /// Initialize the scene. Call once after construction.
    pub fn init(&mut self) {
        self.scene.init(&mut self.ctx);
        self.apply_config();
        self.initialized = true;
    }

    /// Re-read the scene config (after init or a reload) and resize buffers.
    fn apply_config(&mut self) {
        self.config = self.scene.config();
        self.timestep = FixedTimestep::new(self.config.fixed_dt);
        self.layout = ProtocolLayout::from_config(&self.config);
        self.frame = self.layout.allocate();
        self.layout.write_frame(&mut self.frame, self.frame_counter, &self.ctx);
    }

    pub fn is_cancelled(&self) -> bool {
        self.ctx.is_cancelled()
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        if self.is_cancelled() {
            return;
        }
        self.input.push(event);
    }

    /// Run one frame tick: step the scene at the fixed rate, then pack the
    /// frame buffer.
    pub fn tick(&mut self, dt: f32) {
        if !self.initialized || self.is_cancelled() {
            return;
        }

        // Clear per-frame transient data, keeping anything raised since the
        // last tick.
        self.ctx.clear_frame_data();
        self.ctx.events.append(&mut self.pending_events);

        // Fixed timestep accumulation. Input is consumed by the first step
        // only; with no step this frame it waits for the next one.
        let steps = self.timestep.accumulate(dt);
        if steps > 0 {
            let input = self.input.drain();
            for i in 0..steps {
                if self.is_cancelled() {
                    break;
                }
                let batch: &[InputEvent] = if i == 0 { &input } else { &[] };
                self.scene.update(&mut self.ctx, batch);
            }
        }

        self.frame_counter = self.frame_counter.wrapping_add(1);
        self.layout.write_frame(&mut self.frame, self.frame_counter, &self.ctx);
    }

    /// Resolve a hub id and start a flight. Unknown ids are logged and ignored.
    pub fn select_hub(&mut self, id: &str) -> bool {
        if !self.initialized || self.is_cancelled() {
            return false;
        }
        let before = self.ctx.events.len();
        let selected = self.scene.select_hub(&mut self.ctx, id);
        self.hold_events_since(before);
        self.layout.write_frame(&mut self.frame, self.frame_counter, &self.ctx);
        selected
    }

    /// Move events emitted outside a tick to the pending list. The host reads
    /// events after `tick`, and `tick` clears the context first.
    fn hold_events_since(&mut self, before: usize) {
        if self.ctx.events.len() > before {
            self.pending_events.extend(self.ctx.events.drain(before..));
        }
    }

    pub fn hub_ids(&self) -> Vec<String> {
        self.scene.hub_ids()
    }

    pub fn load_config(&mut self, json: &str) -> ConfigResult<()> {
        let before = self.ctx.events.len();
        let loaded = self.scene.load_config(&mut self.ctx, json);
        self.hold_events_since(before);
        loaded?;
        self.apply_config();
        Ok(())
    }

    pub fn load_catalog(&mut self, json: &str) -> ConfigResult<()> {
        let before = self.ctx.events.len();
        let loaded = self.scene.load_catalog(&mut self.ctx, json);
        self.hold_events_since(before);
        loaded?;
        self.layout.write_frame(&mut self.frame, self.frame_counter, &self.ctx);
        Ok(())
    }

    /// Stop all stepping. Further ticks and input are ignored.
    pub fn unmount(&mut self) {
        self.ctx.cancel.cancel();
        self.input.clear();
        self.pending_events.clear();
        log::info!("scene unmounted after {} frames", self.frame_counter);
    }

    /// Flattened xyz triples for a renderer line.
    pub fn polyline(&self, kind: Polyline, index: usize, samples: usize) -> Vec<f32> {
        self.scene
            .polyline(kind, index, samples)
            .iter()
            .flat_map(|p| p.to_array())
            .collect()
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    // ---- Pointer accessors for renderer reads ----

    pub fn frame_ptr(&self) -> *const f32 {
        self.frame.as_ptr()
    }

    pub fn frame(&self) -> &[f32] {
        &self.frame
    }

    pub fn camera_pose_ptr(&self) -> *const f32 {
        self.ctx.rig.pose() as *const _ as *const f32
    }

    pub fn events_ptr(&self) -> *const f32 {
        self.ctx.events.as_ptr() as *const f32
    }

    pub fn events_len(&self) -> u32 {
        self.ctx.events.len() as u32
    }

    pub fn bodies_ptr(&self) -> *const f32 {
        self.ctx.bodies.as_ptr() as *const f32
    }

    pub fn body_count(&self) -> u32 {
        self.ctx.bodies.len() as u32
    }

    pub fn markers_ptr(&self) -> *const f32 {
        self.ctx.markers.as_ptr() as *const f32
    }

    pub fn marker_count(&self) -> u32 {
        self.ctx.markers.len() as u32
    }

    pub fn phase(&self) -> f32 {
        self.ctx.phase
    }

    pub fn mode(&self) -> f32 {
        self.ctx.mode
    }

    // ---- Capacity accessors (read by TypeScript via wasm_bindgen exports) ----

    pub fn max_bodies(&self) -> u32 {
        self.layout.max_bodies as u32
    }

    pub fn max_hubs(&self) -> u32 {
        self.layout.max_hubs as u32
    }

    pub fn max_events(&self) -> u32 {
        self.layout.max_events as u32
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.layout.buffer_total_floats as u32
    }
}
