use serde::{Deserialize, Serialize};

use crate::camera::choreographer::{ChoreographyConfig, FlightConfig, IntroConfig};
use crate::camera::controls::OrbitControlsConfig;
use crate::camera::rig::DEFAULT_FOV_DEG;
use crate::error::ConfigResult;
use crate::extensions::timeline::{default_cues, Cue};
use crate::tunnel::traversal::TravelConfig;

/// Configuration for a scene. Every field has a default, so a JSON document
/// only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Simulation seconds per real second for the orbits.
    pub time_scale: f64,
    /// Seed for orbit phase offsets and traversal shake.
    pub seed: u64,
    /// Maximum engine events per frame (default: 64).
    pub max_events: usize,
    /// Maximum bodies written to the frame buffer (default: 64).
    pub max_bodies: usize,
    /// Maximum hub markers written to the frame buffer (default: 32).
    pub max_hubs: usize,
    /// Resting vertical field of view in degrees.
    pub field_of_view: f32,
    pub intro: IntroConfig,
    pub flight: FlightConfig,
    pub controls: OrbitControlsConfig,
    pub travel: TravelConfig,
    /// Narrative cues, in seconds since the scene started.
    pub cues: Vec<Cue>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            time_scale: 1.0,
            seed: 42,
            max_events: 64,
            max_bodies: 64,
            max_hubs: 32,
            field_of_view: DEFAULT_FOV_DEG,
            intro: IntroConfig::default(),
            flight: FlightConfig::default(),
            controls: OrbitControlsConfig::default(),
            travel: TravelConfig::default(),
            cues: default_cues(),
        }
    }
}

impl SceneConfig {
    /// Parse from JSON and clamp what needs clamping.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Replace degenerate values with safe ones, warning about each.
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        if !self.fixed_dt.is_finite() || self.fixed_dt <= 0.0 || self.fixed_dt > 0.25 {
            log::warn!("config: fixed_dt {} out of (0, 0.25], using 1/60", self.fixed_dt);
            self.fixed_dt = d.fixed_dt;
        }
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            log::warn!("config: time_scale {} invalid, using 1", self.time_scale);
            self.time_scale = d.time_scale;
        }
        for (name, value, default) in [
            ("max_events", &mut self.max_events, d.max_events),
            ("max_bodies", &mut self.max_bodies, d.max_bodies),
            ("max_hubs", &mut self.max_hubs, d.max_hubs),
        ] {
            if *value == 0 {
                log::warn!("config: {name} is 0, using {default}");
                *value = default;
            }
        }

        let choreography = self.choreography().sanitized();
        self.field_of_view = choreography.field_of_view;
        self.intro = choreography.intro;
        self.flight = choreography.flight;
        self.controls = choreography.controls;
        self.travel = self.travel.sanitized();
        self
    }

    /// The camera choreography slice of this config.
    pub fn choreography(&self) -> ChoreographyConfig {
        ChoreographyConfig {
            intro: self.intro.clone(),
            flight: self.flight.clone(),
            controls: self.controls.clone(),
            field_of_view: self.field_of_view,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SceneConfig::from_json(r#"{ "seed": 7, "travel": { "duration": 3.0 } }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.travel.duration, 3.0);
        assert_eq!(config.travel.milestones, vec![0.3, 0.7, 0.9]);
        assert_eq!(config.flight, FlightConfig::default());
        assert_eq!(config.cues.len(), 3);
    }

    #[test]
    fn degenerate_values_are_clamped() {
        let config = SceneConfig::from_json(
            r#"{ "fixed_dt": -1.0, "max_events": 0, "flight": { "standoff": 0.0 }, "field_of_view": 400.0 }"#,
        )
        .unwrap();
        assert_eq!(config.fixed_dt, 1.0 / 60.0);
        assert_eq!(config.max_events, 64);
        assert!(config.flight.standoff > 0.0);
        assert_eq!(config.field_of_view, DEFAULT_FOV_DEG);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(SceneConfig::from_json("{ seed: ").is_err());
        assert!(SceneConfig::from_json(r#"{ "seed": "many" }"#).is_err());
    }
}
