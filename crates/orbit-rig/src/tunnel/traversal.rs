//! Scripted camera flight through the wormhole.
//!
//! Time-based: progress is `elapsed / duration`, so frame rate never changes
//! the arrival time. The driver owns the [`CameraRig`] from `start` until it
//! completes or is cancelled.

use std::f32::consts::PI;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::path::TunnelPathPlanner;
use crate::api::types::{EngineEvent, EventKind};
use crate::camera::rig::{CameraDriver, CameraPose, CameraRig, DEFAULT_FOV_DEG};
use crate::extensions::rng::Rng;

/// Widest field of view the traversal may reach at the boost peak.
pub const MAX_TRAVERSAL_FOV_DEG: f32 = 170.0;

/// Remaining time under which progress snaps to 1, absorbing the float error
/// accumulated by summing fixed steps.
const COMPLETION_SLACK: f32 = 1e-3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelConfig {
    /// Seconds from tunnel entry to exit. `<= 0` completes on the first step.
    pub duration: f32,
    /// How far ahead (in progress) the camera looks.
    pub lookahead: f32,
    /// Peak roll in radians, reached mid-journey.
    pub max_roll: f32,
    /// Extra field of view in degrees at mid-journey.
    pub fov_boost: f32,
    pub jitter_start: f32,
    pub jitter_end: f32,
    /// Maximum positional shake per axis.
    pub jitter_amplitude: f32,
    /// Progress thresholds reported once each, ascending.
    pub milestones: Vec<f32>,
}

impl Default for TravelConfig {
    fn default() -> Self {
        Self {
            duration: 8.0,
            lookahead: 0.02,
            max_roll: 0.6,
            fov_boost: 15.0,
            jitter_start: 0.3,
            jitter_end: 0.9,
            jitter_amplitude: 0.15,
            milestones: vec![0.3, 0.7, 0.9],
        }
    }
}

impl TravelConfig {
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        if !self.duration.is_finite() {
            log::warn!("traversal: duration {} is not finite, completing immediately", self.duration);
            self.duration = 0.0;
        }
        if !self.lookahead.is_finite() || self.lookahead <= 0.0 || self.lookahead > 0.5 {
            log::warn!("traversal: lookahead {} out of (0, 0.5], using default", self.lookahead);
            self.lookahead = d.lookahead;
        }
        if !self.max_roll.is_finite() {
            self.max_roll = d.max_roll;
        }
        if !self.fov_boost.is_finite() || self.fov_boost < 0.0 {
            log::warn!("traversal: fov_boost {} invalid, using 0", self.fov_boost);
            self.fov_boost = 0.0;
        }
        let window_ok = self.jitter_start.is_finite()
            && self.jitter_end.is_finite()
            && 0.0 <= self.jitter_start
            && self.jitter_start <= self.jitter_end
            && self.jitter_end <= 1.0;
        if !window_ok {
            log::warn!(
                "traversal: jitter window [{}, {}] invalid, using default",
                self.jitter_start,
                self.jitter_end
            );
            self.jitter_start = d.jitter_start;
            self.jitter_end = d.jitter_end;
        }
        if !self.jitter_amplitude.is_finite() || self.jitter_amplitude < 0.0 {
            self.jitter_amplitude = 0.0;
        }

        let before = self.milestones.len();
        self.milestones.retain(|m| m.is_finite() && *m > 0.0 && *m <= 1.0);
        self.milestones.sort_by(f32::total_cmp);
        self.milestones.dedup();
        if self.milestones.len() != before {
            log::warn!("traversal: dropped invalid or duplicate milestones, kept {:?}", self.milestones);
        }
        self
    }
}

/// Progress of one traversal. Exists only while a traversal runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraversalState {
    pub elapsed: f32,
    pub progress: f32,
    pub active: bool,
}

impl TraversalState {
    fn new() -> Self {
        Self {
            elapsed: 0.0,
            progress: 0.0,
            active: true,
        }
    }
}

pub struct TraversalCameraDriver {
    config: TravelConfig,
    path: TunnelPathPlanner,
    base_fov: f32,
    rng: Rng,
    state: Option<TraversalState>,
    next_milestone: usize,
}

impl TraversalCameraDriver {
    pub fn new(config: TravelConfig, path: TunnelPathPlanner, base_fov: f32, seed: u64) -> Self {
        let base_fov = if base_fov.is_finite() && base_fov > 1.0 && base_fov < MAX_TRAVERSAL_FOV_DEG {
            base_fov
        } else {
            log::warn!("traversal: base fov {base_fov} out of range, using {DEFAULT_FOV_DEG}");
            DEFAULT_FOV_DEG
        };
        let mut config = config.sanitized();
        let max_boost = MAX_TRAVERSAL_FOV_DEG - base_fov;
        if config.fov_boost > max_boost {
            log::warn!(
                "traversal: fov_boost {} would widen past {MAX_TRAVERSAL_FOV_DEG} deg, clamped to {max_boost}",
                config.fov_boost
            );
            config.fov_boost = max_boost;
        }
        Self {
            config,
            path,
            base_fov,
            rng: Rng::new(seed),
            state: None,
            next_milestone: 0,
        }
    }

    pub fn config(&self) -> &TravelConfig {
        &self.config
    }

    pub fn path(&self) -> &TunnelPathPlanner {
        &self.path
    }

    pub fn state(&self) -> Option<&TraversalState> {
        self.state.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some_and(|s| s.active)
    }

    /// Take the camera and start at the tunnel mouth. Restarting while active
    /// begins again from zero. Returns the previous rig owner.
    pub fn start(&mut self, rig: &mut CameraRig) -> Option<CameraDriver> {
        self.state = Some(TraversalState::new());
        self.next_milestone = 0;
        log::info!("traversal: started ({:.1}s)", self.config.duration);
        rig.acquire(CameraDriver::Traversal)
    }

    /// Abandon the traversal without a completion event.
    pub fn cancel(&mut self, rig: &mut CameraRig) {
        if self.state.take().is_some() {
            log::info!("traversal: cancelled");
            rig.release(CameraDriver::Traversal);
        }
    }

    /// Pose for progress `t`, before jitter.
    pub fn pose_at(&self, t: f32) -> CameraPose {
        let t = t.clamp(0.0, 1.0);
        let position = self.path.point_at(t);
        let mut look_at = self.path.point_at((t + self.config.lookahead).min(1.0));
        if look_at.distance_squared(position) < 1e-8 {
            look_at = position + self.path.tangent_at(t);
        }
        let swell = (PI * t).sin();
        CameraPose::new(position, look_at)
            .with_roll(self.config.max_roll * swell)
            .with_fov(self.base_fov + self.config.fov_boost * swell)
    }

    /// Advance one step. Returns `true` on the step that completes.
    pub fn update(&mut self, dt: f32, rig: &mut CameraRig, events: &mut Vec<EngineEvent>) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };

        let duration = self.config.duration;
        state.elapsed += dt.max(0.0);
        let t = if duration <= 0.0 || duration - state.elapsed <= COMPLETION_SLACK {
            1.0
        } else {
            (state.elapsed / duration).min(1.0)
        };
        state.progress = t;

        events.push(EngineEvent::new(EventKind::TraversalProgress, t, 0.0, 0.0));
        while let Some(&threshold) = self.config.milestones.get(self.next_milestone) {
            if t < threshold {
                break;
            }
            log::debug!("traversal: milestone {} at {threshold}", self.next_milestone);
            events.push(EngineEvent::new(
                EventKind::TraversalMilestone,
                self.next_milestone as f32,
                threshold,
                0.0,
            ));
            self.next_milestone += 1;
        }

        let mut pose = self.pose_at(t);
        if t >= self.config.jitter_start && t <= self.config.jitter_end && t < 1.0 {
            let amp = self.config.jitter_amplitude;
            let shake = Vec3::new(self.rng.next_signed(), self.rng.next_signed(), self.rng.next_signed()) * amp;
            pose.position += shake;
            pose.look_at += shake;
        }
        rig.publish(CameraDriver::Traversal, pose);

        if t >= 1.0 {
            self.state = None;
            log::info!("traversal: complete");
            events.push(EngineEvent::simple(EventKind::TraversalComplete));
            rig.release(CameraDriver::Traversal);
            return true;
        }
        false
    }
}
