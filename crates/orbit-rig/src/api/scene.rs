use glam::Vec3;

use crate::api::config::SceneConfig;
use crate::api::types::{BodyInstance, EngineEvent, HubMarker};
use crate::camera::rig::CameraRig;
use crate::core::cancel::CancelToken;
use crate::error::{ConfigError, ConfigResult};
use crate::input::queue::InputEvent;

/// Which line geometry a renderer can ask a scene for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polyline {
    /// Orbit of the body at `index`, relative to its parent.
    Orbit,
    /// Outline of the region around the hub at `index`, relative to the
    /// focal body centre.
    Region,
    /// Centreline of the wormhole tunnel; `index` is ignored.
    Tunnel,
}

/// The core contract every scene must fulfill.
pub trait Scene {
    /// Return scene configuration. Called once before init.
    fn config(&self) -> SceneConfig {
        SceneConfig::default()
    }

    /// Build simulation state and take the camera.
    fn init(&mut self, ctx: &mut EngineContext);

    /// One fixed step. `input` holds the events queued since the last step.
    fn update(&mut self, ctx: &mut EngineContext, input: &[InputEvent]);

    /// Begin a flight to the hub named `id`. Unknown ids are ignored.
    fn select_hub(&mut self, _ctx: &mut EngineContext, id: &str) -> bool {
        log::warn!("scene: select_hub('{id}') not supported");
        false
    }

    /// Ids of the selectable hubs, in index order.
    fn hub_ids(&self) -> Vec<String> {
        Vec::new()
    }

    /// Replace the scene config from JSON and restart. On error nothing changes.
    fn load_config(&mut self, _ctx: &mut EngineContext, _json: &str) -> ConfigResult<()> {
        Err(ConfigError::Unsupported("load_config"))
    }

    /// Replace the body/hub catalog from JSON and restart. On error nothing changes.
    fn load_catalog(&mut self, _ctx: &mut EngineContext, _json: &str) -> ConfigResult<()> {
        Err(ConfigError::Unsupported("load_catalog"))
    }

    /// Static line geometry for the renderer.
    fn polyline(&self, _kind: Polyline, _index: usize, _samples: usize) -> Vec<Vec3> {
        Vec::new()
    }
}

/// Mutable access to engine state, passed to Scene::init and Scene::update.
pub struct EngineContext {
    pub rig: CameraRig,
    pub events: Vec<EngineEvent>,
    pub bodies: Vec<BodyInstance>,
    pub markers: Vec<HubMarker>,
    /// Cancelled when the scene is unmounted; checked before every step.
    pub cancel: CancelToken,
    /// [`ChoreographyPhase::code`](crate::camera::choreographer::ChoreographyPhase::code).
    pub phase: f32,
    /// Scene-defined camera mode code (orbit, traversal, ...).
    pub mode: f32,
    /// Absolute simulation time of the last step.
    pub sim_time: f64,
}

impl EngineContext {
    pub fn new() -> Self {
        Self {
            rig: CameraRig::default(),
            events: Vec::new(),
            bodies: Vec::new(),
            markers: Vec::new(),
            cancel: CancelToken::new(),
            phase: 0.0,
            mode: 0.0,
            sim_time: 0.0,
        }
    }

    /// Emit an engine event to be forwarded to TypeScript.
    pub fn emit_event(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    /// Clear per-frame transient data (events).
    pub fn clear_frame_data(&mut self) {
        self.events.clear();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::EventKind;

    #[test]
    fn frame_data_clears_events_only() {
        let mut ctx = EngineContext::new();
        ctx.emit_event(EngineEvent::simple(EventKind::ReachIdle));
        ctx.bodies.push(BodyInstance::default());
        ctx.clear_frame_data();
        assert!(ctx.events.is_empty());
        assert_eq!(ctx.bodies.len(), 1);
    }

    struct Still;

    impl Scene for Still {
        fn init(&mut self, _ctx: &mut EngineContext) {}
        fn update(&mut self, _ctx: &mut EngineContext, _input: &[InputEvent]) {}
    }

    #[test]
    fn reloads_are_refused_unless_implemented() {
        let mut ctx = EngineContext::new();
        let mut scene = Still;
        assert!(matches!(
            scene.load_config(&mut ctx, "{}"),
            Err(ConfigError::Unsupported("load_config"))
        ));
        assert!(matches!(
            scene.load_catalog(&mut ctx, "{}"),
            Err(ConfigError::Unsupported("load_catalog"))
        ));
        assert!(!scene.select_hub(&mut ctx, "europe"));
        assert!(scene.hub_ids().is_empty());
    }

    #[test]
    fn cancel_is_shared_with_clones() {
        let ctx = EngineContext::new();
        let handle = ctx.cancel.clone();
        handle.cancel();
        assert!(ctx.is_cancelled());
    }
}
