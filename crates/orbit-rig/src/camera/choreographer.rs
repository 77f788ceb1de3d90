//! Camera choreography: intro zoom → idle orbit ⇄ fly-to-hub.
//!
//! The choreographer keeps the camera *relative to the focal body* (`offset`
//! for the eye, `look_offset` for the look-at point) and adds the live focal
//! position when publishing. A moving Earth therefore carries the camera
//! along without a visible jump, and fly-to convergence is unaffected by the
//! Earth's own orbital motion.
//!
//! Phase changes happen only in [`CameraChoreographer::update`] and
//! [`CameraChoreographer::select_target`].

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::controls::{OrbitControls, OrbitControlsConfig};
use super::gate::ControlIntent;
use super::rig::{CameraDriver, CameraPose, CameraRig, DEFAULT_FOV_DEG};
use crate::api::types::{EngineEvent, EventKind};
use crate::extensions::easing::{ease_vec3, lerp, Easing};
use crate::geo::{surface_point, HubDescriptor};

/// Smallest standoff/radius accepted; smaller values are clamped up.
pub const MIN_STANDOFF: f32 = 0.05;

/// Intro time under which the end pose is taken, absorbing the float error
/// accumulated by summing fixed steps.
const INTRO_SLACK: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoreographyPhase {
    IntroZoom,
    IdleOrbit,
    FlyingToTarget,
}

impl ChoreographyPhase {
    /// Wire code used in [`EventKind::PhaseChanged`] events.
    pub fn code(self) -> f32 {
        match self {
            Self::IntroZoom => 0.0,
            Self::IdleOrbit => 1.0,
            Self::FlyingToTarget => 2.0,
        }
    }
}

/// Cinematic intro settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroConfig {
    /// Seconds from the far start pose to the near pose.
    pub duration: f32,
    /// Absolute start position (far away, looking at the system).
    pub start_position: [f32; 3],
    pub start_look_at: [f32; 3],
    /// End position relative to the focal body.
    pub end_offset: [f32; 3],
    /// Field of view at the start; narrows to the scene fov.
    pub start_fov: f32,
    pub easing: Easing,
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            duration: 4.0,
            start_position: [0.0, 120.0, 220.0],
            start_look_at: [0.0, 0.0, 0.0],
            end_offset: [0.0, 2.0, 6.0],
            start_fov: 60.0,
            easing: Easing::QuartOut,
        }
    }
}

/// Fly-to-hub settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    /// Fraction of the remaining distance covered each step, in (0, 1].
    pub damping: f32,
    /// Remaining distance under which the flight snaps and ends.
    pub epsilon: f32,
    /// Camera distance above the hub's surface point.
    pub standoff: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            damping: 0.05,
            epsilon: 0.01,
            standoff: 3.0,
        }
    }
}

/// Everything the choreographer needs, already sanitized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoreographyConfig {
    pub intro: IntroConfig,
    pub flight: FlightConfig,
    pub controls: OrbitControlsConfig,
    pub field_of_view: f32,
}

impl Default for ChoreographyConfig {
    fn default() -> Self {
        Self {
            intro: IntroConfig::default(),
            flight: FlightConfig::default(),
            controls: OrbitControlsConfig::default(),
            field_of_view: DEFAULT_FOV_DEG,
        }
    }
}

fn finite_vec(v: [f32; 3], fallback: [f32; 3], name: &str) -> [f32; 3] {
    if v.iter().all(|c| c.is_finite()) {
        v
    } else {
        log::warn!("choreography: {name} {v:?} is not finite, using {fallback:?}");
        fallback
    }
}

fn valid_fov(fov: f32, fallback: f32, name: &str) -> f32 {
    if fov.is_finite() && fov > 1.0 && fov < 179.0 {
        fov
    } else {
        log::warn!("choreography: {name} {fov} out of range, using {fallback}");
        fallback
    }
}

impl ChoreographyConfig {
    /// Clamp every degenerate value to a safe one, warning as it goes.
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();

        if !self.intro.duration.is_finite() || self.intro.duration < 0.0 {
            log::warn!("choreography: intro duration {} invalid, using 0", self.intro.duration);
            self.intro.duration = 0.0;
        }
        self.intro.start_position = finite_vec(self.intro.start_position, d.intro.start_position, "intro start_position");
        self.intro.start_look_at = finite_vec(self.intro.start_look_at, d.intro.start_look_at, "intro start_look_at");
        self.intro.end_offset = finite_vec(self.intro.end_offset, d.intro.end_offset, "intro end_offset");
        if Vec3::from(self.intro.end_offset).length() < MIN_STANDOFF {
            log::warn!("choreography: intro end_offset too close to the focal body, using default");
            self.intro.end_offset = d.intro.end_offset;
        }
        if Vec3::from(self.intro.start_position).distance(Vec3::from(self.intro.start_look_at)) < MIN_STANDOFF {
            log::warn!("choreography: intro start pose has no view direction, using default");
            self.intro.start_position = d.intro.start_position;
            self.intro.start_look_at = d.intro.start_look_at;
        }
        self.field_of_view = valid_fov(self.field_of_view, d.field_of_view, "field_of_view");
        self.intro.start_fov = valid_fov(self.intro.start_fov, self.field_of_view, "intro start_fov");

        if !self.flight.damping.is_finite() || self.flight.damping <= 0.0 {
            log::warn!("choreography: damping {} must be positive, using default", self.flight.damping);
            self.flight.damping = d.flight.damping;
        }
        self.flight.damping = self.flight.damping.min(1.0);
        if !self.flight.epsilon.is_finite() || self.flight.epsilon <= 0.0 {
            log::warn!("choreography: epsilon {} must be positive, using default", self.flight.epsilon);
            self.flight.epsilon = d.flight.epsilon;
        }
        if !self.flight.standoff.is_finite() || self.flight.standoff < MIN_STANDOFF {
            log::warn!("choreography: standoff {} clamped to {MIN_STANDOFF}", self.flight.standoff);
            self.flight.standoff = if self.flight.standoff.is_finite() {
                self.flight.standoff.max(MIN_STANDOFF)
            } else {
                d.flight.standoff
            };
        }

        self.controls = self.controls.sanitized();
        self
    }
}

/// Camera and look-at points for a hub, relative to the focal body centre.
///
/// The camera sits on the hub's outward radial, `standoff` above the surface,
/// so it always looks straight down at the hub.
pub fn hub_offsets(hub: &HubDescriptor, surface_radius: f32, standoff: f32) -> (Vec3, Vec3) {
    let look = surface_point(hub.latitude, hub.longitude, surface_radius);
    let eye = surface_point(hub.latitude, hub.longitude, surface_radius + standoff);
    (eye, look)
}

/// Absolute destination pose for a hub on a focal body at `focal`.
pub fn hub_destination(hub: &HubDescriptor, focal: Vec3, surface_radius: f32, standoff: f32) -> CameraPose {
    let (eye, look) = hub_offsets(hub, surface_radius, standoff);
    CameraPose::new(focal + eye, focal + look)
}

#[derive(Debug, Clone, Copy)]
struct Flight {
    hub: usize,
    eye: Vec3,
    look: Vec3,
}

/// The central camera state machine.
#[derive(Debug, Clone)]
pub struct CameraChoreographer {
    config: ChoreographyConfig,
    surface_radius: f32,
    phase: ChoreographyPhase,
    intro_elapsed: f32,
    /// Eye relative to the focal body.
    offset: Vec3,
    /// Look-at point relative to the focal body; also the idle orbit pivot.
    look_offset: Vec3,
    flight: Option<Flight>,
    controls: OrbitControls,
}

impl CameraChoreographer {
    pub fn new(config: ChoreographyConfig, surface_radius: f32) -> Self {
        let config = config.sanitized();
        let surface_radius = if surface_radius.is_finite() && surface_radius >= MIN_STANDOFF {
            surface_radius
        } else {
            log::warn!("choreography: surface radius {surface_radius} clamped to {MIN_STANDOFF}");
            MIN_STANDOFF
        };
        let controls = OrbitControls::new(config.controls.clone());
        Self {
            offset: Vec3::from(config.intro.end_offset),
            look_offset: Vec3::ZERO,
            config,
            surface_radius,
            phase: ChoreographyPhase::IntroZoom,
            intro_elapsed: 0.0,
            flight: None,
            controls,
        }
    }

    pub fn phase(&self) -> ChoreographyPhase {
        self.phase
    }

    pub fn config(&self) -> &ChoreographyConfig {
        &self.config
    }

    pub fn surface_radius(&self) -> f32 {
        self.surface_radius
    }

    /// Hub currently being flown to.
    pub fn flight_target(&self) -> Option<usize> {
        self.flight.map(|f| f.hub)
    }

    /// Pose the intro starts from; used to seed the rig before the first step.
    pub fn intro_start_pose(&self) -> CameraPose {
        CameraPose::new(
            Vec3::from(self.config.intro.start_position),
            Vec3::from(self.config.intro.start_look_at),
        )
        .with_fov(self.config.intro.start_fov)
    }

    /// Begin (or redirect) a flight to `hub`.
    ///
    /// Returns `false` while the intro is still playing: the intro owns the
    /// camera until it lands. A new target mid-flight replaces the destination
    /// and keeps the current interpolation state.
    pub fn select_target(&mut self, index: usize, hub: &HubDescriptor, events: &mut Vec<EngineEvent>) -> bool {
        if self.phase == ChoreographyPhase::IntroZoom {
            log::warn!("choreography: ignoring target '{}' during intro", hub.id);
            return false;
        }
        let (eye, look) = hub_offsets(hub, self.surface_radius, self.config.flight.standoff);
        self.flight = Some(Flight { hub: index, eye, look });
        self.controls.reset();
        log::info!("choreography: flying to hub '{}'", hub.id);
        self.set_phase(ChoreographyPhase::FlyingToTarget, events);
        true
    }

    /// Apply a gated user intent. Intents outside idle orbit are dropped,
    /// except a drag end, which always releases the drag.
    pub fn apply_intent(&mut self, intent: ControlIntent) {
        match intent {
            ControlIntent::DragEnd => self.controls.end_drag(),
            _ if self.phase != ChoreographyPhase::IdleOrbit => {
                log::debug!("choreography: dropping {intent:?} in {:?}", self.phase);
            }
            ControlIntent::DragStart => self.controls.begin_drag(),
            ControlIntent::DragMove { dx, dy } => self.controls.drag(dx, dy),
            ControlIntent::Zoom { steps } => self.controls.zoom(steps),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.controls.is_dragging()
    }

    /// Advance one step against the current focal position and publish a pose.
    ///
    /// `focal` must come from this step's registry snapshot.
    pub fn update(&mut self, dt: f32, focal: Vec3, rig: &mut CameraRig, events: &mut Vec<EngineEvent>) {
        if !focal.is_finite() {
            log::error!("choreography: focal point {focal:?} is not finite, skipping step");
            return;
        }

        let fov = self.config.field_of_view;
        let pose = match self.phase {
            ChoreographyPhase::IntroZoom => self.step_intro(dt, focal, events),
            ChoreographyPhase::IdleOrbit => {
                let pivot = self.look_offset;
                self.offset = pivot + self.controls.apply(self.offset - pivot, dt);
                CameraPose::new(focal + self.offset, focal + self.look_offset).with_fov(fov)
            }
            ChoreographyPhase::FlyingToTarget => self.step_flight(focal, events),
        };

        rig.publish(CameraDriver::Choreographer, pose);
    }

    fn step_intro(&mut self, dt: f32, focal: Vec3, events: &mut Vec<EngineEvent>) -> CameraPose {
        let intro = &self.config.intro;
        self.intro_elapsed += dt;

        if self.intro_elapsed >= intro.duration - INTRO_SLACK {
            // Land exactly on the end pose rather than on the last eased sample.
            self.offset = Vec3::from(intro.end_offset);
            self.look_offset = Vec3::ZERO;
            let pose = CameraPose::new(focal + self.offset, focal).with_fov(self.config.field_of_view);
            log::info!("choreography: intro complete after {:.2}s", self.intro_elapsed);
            events.push(EngineEvent::simple(EventKind::ReachIdle));
            self.set_phase(ChoreographyPhase::IdleOrbit, events);
            return pose;
        }

        let t = self.intro_elapsed / intro.duration;
        let end = focal + Vec3::from(intro.end_offset);
        let position = ease_vec3(Vec3::from(intro.start_position), end, t, intro.easing);
        let look_at = ease_vec3(Vec3::from(intro.start_look_at), focal, t, intro.easing);
        let fov = lerp(intro.start_fov, self.config.field_of_view, intro.easing.apply(t));
        CameraPose::new(position, look_at).with_fov(fov)
    }

    fn step_flight(&mut self, focal: Vec3, events: &mut Vec<EngineEvent>) -> CameraPose {
        let fov = self.config.field_of_view;
        let Some(flight) = self.flight else {
            log::error!("choreography: flying without a target, returning to idle");
            self.set_phase(ChoreographyPhase::IdleOrbit, events);
            return CameraPose::new(focal + self.offset, focal + self.look_offset).with_fov(fov);
        };

        let k = self.config.flight.damping;
        self.offset += (flight.eye - self.offset) * k;
        self.look_offset += (flight.look - self.look_offset) * k;

        let eps = self.config.flight.epsilon;
        if self.offset.distance(flight.eye) < eps && self.look_offset.distance(flight.look) < eps {
            self.offset = flight.eye;
            self.look_offset = flight.look;
            self.flight = None;
            log::info!("choreography: arrived at hub #{}", flight.hub);
            events.push(EngineEvent::new(EventKind::ArrivedAtHub, flight.hub as f32, 0.0, 0.0));
            self.set_phase(ChoreographyPhase::IdleOrbit, events);
        }

        CameraPose::new(focal + self.offset, focal + self.look_offset).with_fov(fov)
    }

    fn set_phase(&mut self, phase: ChoreographyPhase, events: &mut Vec<EngineEvent>) {
        if self.phase == phase {
            return;
        }
        log::debug!("choreography: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        events.push(EngineEvent::new(EventKind::PhaseChanged, phase.code(), 0.0, 0.0));
    }
}
