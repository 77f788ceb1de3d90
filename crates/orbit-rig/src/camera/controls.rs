//! Idle-orbit controls: auto-rotation, drag-to-rotate and scroll-to-zoom
//! around a pivot.
//!
//! Input handlers only record intents here; the choreographer applies them
//! to its camera offset once per step. Limits are only enforced in the
//! direction of user motion, so taking over a camera that is already outside
//! them (e.g. just after a fly-to) never snaps it.

use std::f32::consts::PI;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Tuning for the idle orbit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitControlsConfig {
    /// Auto-rotate angular speed around the pivot (radians per second).
    pub auto_rotate_speed: f32,
    /// Radians of rotation per unit of pointer travel.
    pub rotate_sensitivity: f32,
    /// Multiplicative distance change per scroll step.
    pub zoom_step: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Polar angle limits measured from +Y (radians).
    pub min_polar: f32,
    pub max_polar: f32,
}

impl Default for OrbitControlsConfig {
    fn default() -> Self {
        Self {
            auto_rotate_speed: 0.1,
            rotate_sensitivity: 0.005,
            zoom_step: 1.1,
            min_distance: 2.5,
            max_distance: 60.0,
            min_polar: 0.1,
            max_polar: PI - 0.1,
        }
    }
}

impl OrbitControlsConfig {
    /// Clamp degenerate values, warning about each one.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.auto_rotate_speed.is_finite() {
            log::warn!("controls: auto_rotate_speed {} is not finite, using default", self.auto_rotate_speed);
            self.auto_rotate_speed = defaults.auto_rotate_speed;
        }
        if !self.rotate_sensitivity.is_finite() || self.rotate_sensitivity < 0.0 {
            log::warn!("controls: rotate_sensitivity {} invalid, using default", self.rotate_sensitivity);
            self.rotate_sensitivity = defaults.rotate_sensitivity;
        }
        if !self.zoom_step.is_finite() || self.zoom_step <= 1.0 {
            log::warn!("controls: zoom_step {} must be > 1, using default", self.zoom_step);
            self.zoom_step = defaults.zoom_step;
        }
        if !self.min_distance.is_finite() || self.min_distance <= 0.0 {
            log::warn!("controls: min_distance {} must be positive, using default", self.min_distance);
            self.min_distance = defaults.min_distance;
        }
        if !self.max_distance.is_finite() || self.max_distance < self.min_distance {
            log::warn!("controls: max_distance {} below min_distance, widening", self.max_distance);
            self.max_distance = self.min_distance.max(defaults.max_distance);
        }
        let polar_ok = self.min_polar.is_finite()
            && self.max_polar.is_finite()
            && 0.0 < self.min_polar
            && self.min_polar < self.max_polar
            && self.max_polar < PI;
        if !polar_ok {
            log::warn!("controls: polar limits [{}, {}] invalid, using defaults", self.min_polar, self.max_polar);
            self.min_polar = defaults.min_polar;
            self.max_polar = defaults.max_polar;
        }
        self
    }
}

/// Pending user intents plus drag state.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    config: OrbitControlsConfig,
    dragging: bool,
    pending_azimuth: f32,
    pending_polar: f32,
    pending_zoom: f32,
}

impl OrbitControls {
    pub fn new(config: OrbitControlsConfig) -> Self {
        Self {
            config: config.sanitized(),
            dragging: false,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
            pending_zoom: 1.0,
        }
    }

    pub fn config(&self) -> &OrbitControlsConfig {
        &self.config
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    /// Pointer moved by (dx, dy) while dragging.
    pub fn drag(&mut self, dx: f32, dy: f32) {
        if !self.dragging {
            return;
        }
        self.pending_azimuth -= dx * self.config.rotate_sensitivity;
        self.pending_polar -= dy * self.config.rotate_sensitivity;
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Positive steps zoom in, negative zoom out.
    pub fn zoom(&mut self, steps: f32) {
        if steps.is_finite() {
            self.pending_zoom *= self.config.zoom_step.powf(-steps);
        }
    }

    /// Drop all pending intents and any drag in progress.
    pub fn reset(&mut self) {
        self.dragging = false;
        self.pending_azimuth = 0.0;
        self.pending_polar = 0.0;
        self.pending_zoom = 1.0;
    }

    /// Apply auto-rotation and pending intents to `offset` (camera relative to
    /// the pivot) and return the new offset.
    pub fn apply(&mut self, offset: Vec3, dt: f32) -> Vec3 {
        let mut radius = offset.length();
        let (mut azimuth, mut polar) = if radius > 1e-6 {
            (offset.x.atan2(offset.z), (offset.y / radius).clamp(-1.0, 1.0).acos())
        } else {
            radius = self.config.min_distance;
            (0.0, PI / 2.0)
        };

        if !self.dragging {
            azimuth += self.config.auto_rotate_speed * dt;
        }
        azimuth += self.pending_azimuth;

        if self.pending_polar != 0.0 {
            let lo = self.config.min_polar.min(polar);
            let hi = self.config.max_polar.max(polar);
            polar = (polar + self.pending_polar).clamp(lo, hi);
        }
        if self.pending_zoom != 1.0 {
            let lo = self.config.min_distance.min(radius);
            let hi = self.config.max_distance.max(radius);
            radius = (radius * self.pending_zoom).clamp(lo, hi);
        }

        self.pending_azimuth = 0.0;
        self.pending_polar = 0.0;
        self.pending_zoom = 1.0;

        let sin_polar = polar.sin();
        Vec3::new(
            radius * sin_polar * azimuth.sin(),
            radius * polar.cos(),
            radius * sin_polar * azimuth.cos(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn auto_rotates_at_configured_speed() {
        let mut controls = OrbitControls::new(OrbitControlsConfig {
            auto_rotate_speed: PI / 2.0,
            ..Default::default()
        });
        let next = controls.apply(Vec3::new(0.0, 0.0, 10.0), 1.0);
        assert_relative_eq!(next.x, 10.0, epsilon = 1e-4);
        assert_relative_eq!(next.z, 0.0, epsilon = 1e-4);
        assert_relative_eq!(next.length(), 10.0, epsilon = 1e-4);
    }

    #[test]
    fn dragging_suspends_auto_rotate() {
        let mut controls = OrbitControls::new(OrbitControlsConfig::default());
        controls.begin_drag();
        let start = Vec3::new(0.0, 2.0, 8.0);
        let held = controls.apply(start, 1.0);
        assert_relative_eq!(held.x, start.x, epsilon = 1e-4);
        assert_relative_eq!(held.y, start.y, epsilon = 1e-4);
        assert_relative_eq!(held.z, start.z, epsilon = 1e-4);

        controls.end_drag();
        let moving = controls.apply(start, 1.0);
        assert!(moving.distance(start) > 1e-3);
    }

    #[test]
    fn drag_rotates_and_respects_polar_limit() {
        let mut controls = OrbitControls::new(OrbitControlsConfig {
            auto_rotate_speed: 0.0,
            ..Default::default()
        });
        controls.begin_drag();
        controls.drag(0.0, 100_000.0);
        let next = controls.apply(Vec3::new(0.0, 0.0, 10.0), 0.016);
        let polar = (next.y / next.length()).acos();
        assert_relative_eq!(polar, controls.config().min_polar, epsilon = 1e-4);
    }

    #[test]
    fn zoom_clamps_distance() {
        let mut controls = OrbitControls::new(OrbitControlsConfig {
            auto_rotate_speed: 0.0,
            ..Default::default()
        });
        controls.zoom(100.0);
        let near = controls.apply(Vec3::new(0.0, 0.0, 10.0), 0.016);
        assert_relative_eq!(near.length(), controls.config().min_distance, epsilon = 1e-4);

        controls.zoom(-1.0);
        let out = controls.apply(near, 0.016);
        assert_relative_eq!(out.length(), near.length() * 1.1, epsilon = 1e-4);
    }

    #[test]
    fn out_of_range_offset_is_not_snapped() {
        let mut controls = OrbitControls::new(OrbitControlsConfig {
            auto_rotate_speed: 0.0,
            ..Default::default()
        });
        // Closer than min_distance; zooming out must move outward smoothly.
        let close = Vec3::new(0.0, 0.0, 1.0);
        controls.zoom(-1.0);
        let next = controls.apply(close, 0.016);
        assert_relative_eq!(next.length(), 1.1, epsilon = 1e-4);
    }

    #[test]
    fn sanitize_repairs_bad_values() {
        let cfg = OrbitControlsConfig {
            zoom_step: 0.5,
            min_distance: -1.0,
            max_distance: f32::NAN,
            min_polar: 2.0,
            max_polar: 1.0,
            ..Default::default()
        }
        .sanitized();
        let d = OrbitControlsConfig::default();
        assert_eq!(cfg.zoom_step, d.zoom_step);
        assert_eq!(cfg.min_distance, d.min_distance);
        assert!(cfg.max_distance >= cfg.min_distance);
        assert_eq!((cfg.min_polar, cfg.max_polar), (d.min_polar, d.max_polar));
    }
}
