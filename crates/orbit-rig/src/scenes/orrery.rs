//! The landing-page scene: an orrery centred on a moving Earth with
//! selectable regional hubs, plus the wormhole traversal.
//!
//! Step order is fixed: cancellation check, clock, registry, input, the
//! active camera driver, narrative cues, then renderer data. The camera
//! therefore always sees this step's focal position.

use glam::Vec3;

use crate::api::config::SceneConfig;
use crate::api::scene::{EngineContext, Polyline, Scene};
use crate::api::types::{BodyInstance, HubMarker};
use crate::camera::choreographer::{CameraChoreographer, ChoreographyPhase};
use crate::camera::gate::InteractionGate;
use crate::camera::rig::{CameraDriver, CameraRig};
use crate::catalog::Catalog;
use crate::core::time::SimClock;
use crate::error::ConfigResult;
use crate::extensions::rng::Rng;
use crate::extensions::timeline::Timeline;
use crate::geo::region_outline;
use crate::input::queue::{custom, InputEvent};
use crate::orbit::registry::OrbitingBodyRegistry;
use crate::orbit::solver::orbit_path;
use crate::tunnel::path::TunnelPathPlanner;
use crate::tunnel::traversal::TraversalCameraDriver;

/// Salt so traversal shake does not replay the orbit phase sequence.
const TRAVERSAL_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Which driver the scene is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    /// The choreographer owns the camera.
    Orbit,
    /// The traversal driver owns the camera.
    Traversal,
    /// Traversal finished; the camera holds at the tunnel exit until the host
    /// navigates away or cancels back to the orbit.
    Exited,
}

impl CameraMode {
    pub fn code(self) -> f32 {
        match self {
            Self::Orbit => 0.0,
            Self::Traversal => 1.0,
            Self::Exited => 2.0,
        }
    }
}

/// Everything built from a config + catalog pair.
struct Stage {
    registry: OrbitingBodyRegistry,
    choreographer: CameraChoreographer,
    traversal: TraversalCameraDriver,
    gate: InteractionGate,
    clock: SimClock,
    timeline: Timeline,
    elapsed: f32,
    mode: CameraMode,
    selected: Option<usize>,
}

impl Stage {
    fn build(config: &SceneConfig, catalog: &Catalog) -> ConfigResult<Self> {
        catalog.validate_hubs()?;
        let mut rng = Rng::new(config.seed);
        let registry = catalog.build_registry(&mut rng)?;
        let path = TunnelPathPlanner::serpentine()?;
        Ok(Self {
            registry,
            choreographer: CameraChoreographer::new(config.choreography(), catalog.surface_radius),
            traversal: TraversalCameraDriver::new(
                config.travel.clone(),
                path,
                config.field_of_view,
                config.seed ^ TRAVERSAL_SEED_SALT,
            ),
            gate: InteractionGate::new(),
            clock: SimClock::new(config.time_scale),
            timeline: Timeline::new(config.cues.clone()),
            elapsed: 0.0,
            mode: CameraMode::Orbit,
            selected: None,
        })
    }
}

pub struct OrreryScene {
    config: SceneConfig,
    catalog: Catalog,
    stage: Option<Stage>,
}

impl OrreryScene {
    pub fn new() -> Self {
        Self::with_parts(SceneConfig::default(), Catalog::builtin())
    }

    /// Nothing is built until [`Scene::init`].
    pub fn with_parts(config: SceneConfig, catalog: Catalog) -> Self {
        Self {
            config: config.sanitized(),
            catalog,
            stage: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn phase(&self) -> Option<ChoreographyPhase> {
        self.stage.as_ref().map(|s| s.choreographer.phase())
    }

    pub fn mode(&self) -> Option<CameraMode> {
        self.stage.as_ref().map(|s| s.mode)
    }

    pub fn registry(&self) -> Option<&OrbitingBodyRegistry> {
        self.stage.as_ref().map(|s| &s.registry)
    }

    /// Fly to the hub at `index`. Refused outside the orbit mode and during
    /// the intro.
    pub fn select_index(&mut self, ctx: &mut EngineContext, index: usize) -> bool {
        let Some(stage) = self.stage.as_mut() else {
            return false;
        };
        let Some(hub) = self.catalog.hubs.get(index) else {
            log::warn!("orrery: no hub at index {index}");
            return false;
        };
        if stage.mode != CameraMode::Orbit {
            log::warn!("orrery: ignoring hub '{}' while in {:?}", hub.id, stage.mode);
            return false;
        }
        if !stage.choreographer.select_target(index, hub, &mut ctx.events) {
            return false;
        }
        stage.selected = Some(index);
        if let Some(intent) = stage.gate.observe_phase(stage.choreographer.phase()) {
            stage.choreographer.apply_intent(intent);
        }
        true
    }

    /// Hand the camera to the traversal driver.
    pub fn start_traversal(&mut self, ctx: &mut EngineContext) {
        let Some(stage) = self.stage.as_mut() else {
            return;
        };
        if stage.mode == CameraMode::Traversal {
            log::debug!("orrery: traversal already running");
            return;
        }
        if let Some(intent) = stage.gate.cancel_drag() {
            stage.choreographer.apply_intent(intent);
        }
        stage.traversal.start(&mut ctx.rig);
        stage.mode = CameraMode::Traversal;
    }

    /// Abort or leave the traversal and give the camera back to the orbit.
    pub fn cancel_traversal(&mut self, ctx: &mut EngineContext) {
        let Some(stage) = self.stage.as_mut() else {
            return;
        };
        if stage.mode == CameraMode::Orbit {
            return;
        }
        stage.traversal.cancel(&mut ctx.rig);
        ctx.rig.acquire(CameraDriver::Choreographer);
        stage.mode = CameraMode::Orbit;
        log::info!("orrery: back to orbit");
    }

    /// Swap in a freshly built stage and reset the camera to the intro.
    fn install(&mut self, stage: Stage, ctx: &mut EngineContext) {
        let mut rig = CameraRig::new(stage.choreographer.intro_start_pose());
        rig.acquire(CameraDriver::Choreographer);
        ctx.rig = rig;
        self.stage = Some(stage);
        self.publish(ctx);
    }

    fn handle_input(&mut self, ctx: &mut EngineContext, input: &[InputEvent]) {
        for event in input {
            match *event {
                InputEvent::Custom { kind: custom::SELECT_HUB, a, .. } => {
                    if a.is_finite() && a >= 0.0 {
                        self.select_index(ctx, a as usize);
                    } else {
                        log::warn!("orrery: bad hub index {a}");
                    }
                }
                InputEvent::Custom { kind: custom::START_TRAVERSAL, .. } => self.start_traversal(ctx),
                InputEvent::Custom { kind: custom::CANCEL_TRAVERSAL, .. } => self.cancel_traversal(ctx),
                InputEvent::Custom { kind, .. } => log::debug!("orrery: unknown custom event {kind}"),
                _ => {
                    let Some(stage) = self.stage.as_mut() else {
                        return;
                    };
                    if stage.mode != CameraMode::Orbit {
                        continue;
                    }
                    if let Some(intent) = stage.gate.filter(stage.choreographer.phase(), event) {
                        stage.choreographer.apply_intent(intent);
                    }
                }
            }
        }
    }

    /// Refresh renderer-facing data from the current snapshot.
    fn publish(&self, ctx: &mut EngineContext) {
        let Some(stage) = self.stage.as_ref() else {
            return;
        };
        let snapshot = stage.registry.snapshot();
        let focal_index = stage.registry.focal_index();

        ctx.bodies.clear();
        ctx.bodies.extend(stage.registry.bodies().iter().enumerate().map(|(i, body)| BodyInstance {
            position: snapshot.position(i).unwrap_or(Vec3::ZERO),
            radius: body.radius,
            kind: body.kind.code(),
            focal: if i == focal_index { 1.0 } else { 0.0 },
        }));

        let focal = snapshot.focal_point();
        let radius = stage.choreographer.surface_radius();
        let selected = stage.choreographer.flight_target().or(stage.selected);
        ctx.markers.clear();
        ctx.markers.extend(self.catalog.hubs.iter().enumerate().map(|(i, hub)| HubMarker {
            position: focal + hub.surface_position(radius),
            color: hub.color,
            selected: if selected == Some(i) { 1.0 } else { 0.0 },
            index: i as f32,
        }));

        ctx.phase = stage.choreographer.phase().code();
        ctx.mode = stage.mode.code();
        ctx.sim_time = snapshot.time;
    }
}

impl Default for OrreryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for OrreryScene {
    fn config(&self) -> SceneConfig {
        self.config.clone()
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        match Stage::build(&self.config, &self.catalog) {
            Ok(stage) => {
                log::info!(
                    "orrery: {} bodies, {} hubs, focal '{}'",
                    stage.registry.len(),
                    self.catalog.hubs.len(),
                    self.catalog.focal_body
                );
                self.install(stage, ctx);
            }
            Err(err) => log::error!("orrery: cannot build scene: {err}"),
        }
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &[InputEvent]) {
        if ctx.is_cancelled() {
            return;
        }
        let dt = self.config.fixed_dt;
        let Some(stage) = self.stage.as_mut() else {
            return;
        };

        stage.elapsed += dt;
        let now = stage.clock.advance(dt);
        stage.registry.tick(now);

        self.handle_input(ctx, input);

        let Some(stage) = self.stage.as_mut() else {
            return;
        };
        let focal = stage.registry.snapshot().focal_point();
        match stage.mode {
            CameraMode::Orbit => {
                stage.choreographer.update(dt, focal, &mut ctx.rig, &mut ctx.events);
                if let Some(intent) = stage.gate.observe_phase(stage.choreographer.phase()) {
                    stage.choreographer.apply_intent(intent);
                }
            }
            CameraMode::Traversal => {
                if stage.traversal.update(dt, &mut ctx.rig, &mut ctx.events) {
                    stage.mode = CameraMode::Exited;
                }
            }
            CameraMode::Exited => {}
        }
        stage.timeline.advance(stage.elapsed, &mut ctx.events);

        self.publish(ctx);
    }

    fn select_hub(&mut self, ctx: &mut EngineContext, id: &str) -> bool {
        match self.catalog.hub_index(id) {
            Some(index) => self.select_index(ctx, index),
            None => {
                log::warn!("orrery: unknown hub id '{id}'");
                false
            }
        }
    }

    fn hub_ids(&self) -> Vec<String> {
        self.catalog.hubs.iter().map(|h| h.id.clone()).collect()
    }

    fn load_config(&mut self, ctx: &mut EngineContext, json: &str) -> ConfigResult<()> {
        let config = SceneConfig::from_json(json)?;
        let stage = Stage::build(&config, &self.catalog)?;
        self.config = config;
        log::info!("orrery: config reloaded, restarting");
        self.install(stage, ctx);
        Ok(())
    }

    fn load_catalog(&mut self, ctx: &mut EngineContext, json: &str) -> ConfigResult<()> {
        let catalog = Catalog::from_json(json)?;
        let stage = Stage::build(&self.config, &catalog)?;
        self.catalog = catalog;
        log::info!("orrery: catalog reloaded, restarting");
        self.install(stage, ctx);
        Ok(())
    }

    fn polyline(&self, kind: Polyline, index: usize, samples: usize) -> Vec<Vec3> {
        let Some(stage) = self.stage.as_ref() else {
            return Vec::new();
        };
        match kind {
            Polyline::Orbit => stage
                .registry
                .bodies()
                .get(index)
                .and_then(|body| body.orbit.as_ref())
                .map(|orbit| orbit_path(orbit, samples))
                .unwrap_or_default(),
            Polyline::Region => self
                .catalog
                .hubs
                .get(index)
                .and_then(|hub| hub.bounds.as_ref())
                .map(|bounds| region_outline(bounds, stage.choreographer.surface_radius(), samples))
                .unwrap_or_default(),
            Polyline::Tunnel => stage.traversal.path().sample(samples),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{EngineEvent, EventKind};
    use crate::camera::controls::OrbitControlsConfig;

    fn step(scene: &mut OrreryScene, ctx: &mut EngineContext, input: &[InputEvent]) {
        scene.update(ctx, input);
    }

    /// Run `seconds` of fixed steps, collecting every event.
    fn run(scene: &mut OrreryScene, ctx: &mut EngineContext, seconds: f32) -> Vec<EngineEvent> {
        let steps = (seconds / scene.config().fixed_dt).round() as usize;
        let mut events = Vec::new();
        for _ in 0..steps {
            ctx.clear_frame_data();
            step(scene, ctx, &[]);
            events.extend_from_slice(&ctx.events);
        }
        events
    }

    fn count(events: &[EngineEvent], kind: EventKind) -> usize {
        events.iter().filter(|e| e.is(kind)).count()
    }

    fn started() -> (OrreryScene, EngineContext) {
        let config = SceneConfig {
            controls: OrbitControlsConfig { auto_rotate_speed: 0.0, ..Default::default() },
            ..Default::default()
        };
        let mut scene = OrreryScene::with_parts(config, Catalog::builtin());
        let mut ctx = EngineContext::new();
        scene.init(&mut ctx);
        (scene, ctx)
    }

    fn idle() -> (OrreryScene, EngineContext) {
        let (mut scene, mut ctx) = started();
        let events = run(&mut scene, &mut ctx, 4.1);
        assert_eq!(count(&events, EventKind::ReachIdle), 1);
        (scene, ctx)
    }

    #[test]
    fn init_publishes_bodies_and_markers() {
        let (scene, ctx) = started();
        assert_eq!(ctx.bodies.len(), scene.catalog().bodies.len());
        assert_eq!(ctx.markers.len(), 6);
        assert_eq!(ctx.rig.owner(), Some(CameraDriver::Choreographer));
        assert_eq!(ctx.bodies.iter().filter(|b| b.focal == 1.0).count(), 1);
    }

    #[test]
    fn intro_ends_in_idle_orbit_with_cues() {
        let (scene, _ctx) = idle();
        assert_eq!(scene.phase(), Some(ChoreographyPhase::IdleOrbit));
    }

    #[test]
    fn narrative_cues_fire_during_intro() {
        let (mut scene, mut ctx) = started();
        let events = run(&mut scene, &mut ctx, 4.0);
        assert_eq!(count(&events, EventKind::NarrativeCue), 3);
    }

    #[test]
    fn camera_uses_this_steps_focal_point() {
        let (mut scene, mut ctx) = idle();
        run(&mut scene, &mut ctx, 1.0);
        let earth = ctx.bodies.iter().find(|b| b.focal == 1.0).unwrap().position;
        assert!(ctx.rig.pose().look_at.distance(earth) < 1e-3);
    }

    #[test]
    fn hub_selection_by_id_flies_and_arrives() {
        let (mut scene, mut ctx) = idle();
        assert!(!scene.select_hub(&mut ctx, "atlantis"));
        assert!(scene.select_hub(&mut ctx, "europe"));
        assert_eq!(scene.phase(), Some(ChoreographyPhase::FlyingToTarget));

        let events = run(&mut scene, &mut ctx, 10.0);
        assert_eq!(count(&events, EventKind::ArrivedAtHub), 1);
        assert_eq!(scene.phase(), Some(ChoreographyPhase::IdleOrbit));

        let marker = ctx.markers[2];
        assert_eq!(marker.selected, 1.0);
        assert!(ctx.rig.pose().look_at.distance(marker.position) < 1e-3);
    }

    #[test]
    fn select_during_intro_is_refused() {
        let (mut scene, mut ctx) = started();
        assert!(!scene.select_hub(&mut ctx, "asia"));
        assert_eq!(scene.phase(), Some(ChoreographyPhase::IntroZoom));
    }

    #[test]
    fn custom_select_event_uses_index() {
        let (mut scene, mut ctx) = idle();
        step(&mut scene, &mut ctx, &[InputEvent::Custom { kind: custom::SELECT_HUB, a: 4.0, b: 0.0, c: 0.0 }]);
        assert_eq!(scene.phase(), Some(ChoreographyPhase::FlyingToTarget));
        step(&mut scene, &mut ctx, &[InputEvent::Custom { kind: custom::SELECT_HUB, a: 99.0, b: 0.0, c: 0.0 }]);
        assert_eq!(ctx.markers[4].selected, 1.0);
    }

    #[test]
    fn drag_is_ignored_while_flying() {
        let (mut scene, mut ctx) = idle();
        scene.select_hub(&mut ctx, "africa");
        let before = *ctx.rig.pose();
        step(&mut scene, &mut ctx, &[
            InputEvent::PointerDown { x: 0.0, y: 0.0 },
            InputEvent::PointerMove { x: 500.0, y: 0.0 },
        ]);
        let stage = scene.stage.as_ref().unwrap();
        assert!(!stage.gate.is_dragging());
        assert!(!stage.choreographer.is_dragging());
        assert!(ctx.rig.pose().position.distance(before.position) < 1.0);
    }

    #[test]
    fn traversal_runs_once_and_holds_at_exit() {
        let (mut scene, mut ctx) = idle();
        step(&mut scene, &mut ctx, &[InputEvent::Custom { kind: custom::START_TRAVERSAL, a: 0.0, b: 0.0, c: 0.0 }]);
        assert_eq!(scene.mode(), Some(CameraMode::Traversal));
        assert_eq!(ctx.rig.owner(), Some(CameraDriver::Traversal));

        let events = run(&mut scene, &mut ctx, 9.0);
        assert_eq!(count(&events, EventKind::TraversalComplete), 1);
        assert_eq!(count(&events, EventKind::TraversalMilestone), 3);
        assert_eq!(scene.mode(), Some(CameraMode::Exited));
        assert_eq!(ctx.rig.owner(), None);
        assert_eq!(ctx.rig.rejected_writes(), 0);

        scene.cancel_traversal(&mut ctx);
        assert_eq!(scene.mode(), Some(CameraMode::Orbit));
        assert_eq!(ctx.rig.owner(), Some(CameraDriver::Choreographer));
        run(&mut scene, &mut ctx, 0.5);
        assert_eq!(ctx.rig.rejected_writes(), 0);
    }

    #[test]
    fn hub_selection_refused_during_traversal() {
        let (mut scene, mut ctx) = idle();
        scene.start_traversal(&mut ctx);
        assert!(!scene.select_hub(&mut ctx, "europe"));
    }

    #[test]
    fn cancelled_scene_stops_stepping() {
        let (mut scene, mut ctx) = idle();
        let pose = *ctx.rig.pose();
        let time = ctx.sim_time;
        ctx.cancel.cancel();
        let events = run(&mut scene, &mut ctx, 1.0);
        assert!(events.is_empty());
        assert_eq!(*ctx.rig.pose(), pose);
        assert_eq!(ctx.sim_time, time);
    }

    #[test]
    fn bad_config_keeps_running_scene() {
        let (mut scene, mut ctx) = idle();
        assert!(scene.load_config(&mut ctx, "{ not json").is_err());
        assert_eq!(scene.phase(), Some(ChoreographyPhase::IdleOrbit));

        scene.load_config(&mut ctx, r#"{ "seed": 3 }"#).unwrap();
        assert_eq!(scene.config().seed, 3);
        assert_eq!(scene.phase(), Some(ChoreographyPhase::IntroZoom));
    }

    #[test]
    fn bad_catalog_is_rejected() {
        let (mut scene, mut ctx) = idle();
        let json = r#"{ "focal_body": "pluto", "bodies": [ { "id": "sun", "kind": "star" } ] }"#;
        assert!(scene.load_catalog(&mut ctx, json).is_err());
        assert_eq!(scene.hub_ids().len(), 6);
    }

    #[test]
    fn polylines_for_renderer() {
        let (scene, _ctx) = started();
        let earth = scene.registry().unwrap().index_of("earth").unwrap();
        assert_eq!(scene.polyline(Polyline::Orbit, earth, 64).len(), 64);
        assert!(scene.polyline(Polyline::Orbit, 0, 64).is_empty());
        assert!(!scene.polyline(Polyline::Region, 2, 8).is_empty());
        assert_eq!(scene.polyline(Polyline::Tunnel, 0, 50).len(), 50);
    }
}
