//! Closed-form orbital positions — pure math, no engine dependencies.
//!
//! Orbits are coplanar ellipses in the XZ plane with the focus at the origin.
//! Angular speed is uniform (not equal-area Kepler sweep): the result is purely
//! cosmetic and, more importantly, a function of absolute time only, so there
//! is no integration drift no matter how long the scene runs.
//!
//! Uses f64 internally; converts to f32 only for the returned `Vec3`.

use std::f64::consts::TAU;

use glam::Vec3;

use crate::error::{ConfigError, ConfigResult};

/// Immutable per-body orbit description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalParameters {
    semi_major_axis: f64,
    eccentricity: f64,
    orbit_period: f64,
    phase_offset: f64,
    elevation: f64,
}

impl OrbitalParameters {
    /// Validate and build orbit parameters.
    ///
    /// Rejects a non-positive period, `e` outside `[0, 1)` and a negative
    /// semi-major axis, so `position` can never produce NaN later.
    pub fn new(
        semi_major_axis: f64,
        eccentricity: f64,
        orbit_period: f64,
        phase_offset: f64,
    ) -> ConfigResult<Self> {
        if !semi_major_axis.is_finite() || semi_major_axis < 0.0 {
            return Err(ConfigError::NegativeSemiMajorAxis(semi_major_axis));
        }
        if !eccentricity.is_finite() || !(0.0..1.0).contains(&eccentricity) {
            return Err(ConfigError::EccentricityOutOfRange(eccentricity));
        }
        if !orbit_period.is_finite() || orbit_period <= 0.0 {
            return Err(ConfigError::NonPositivePeriod(orbit_period));
        }
        if !phase_offset.is_finite() {
            return Err(ConfigError::NonFinite("phase_offset"));
        }
        Ok(Self {
            semi_major_axis,
            eccentricity,
            orbit_period,
            phase_offset,
            elevation: 0.0,
        })
    }

    /// Circular orbit shorthand.
    pub fn circular(radius: f64, orbit_period: f64) -> ConfigResult<Self> {
        Self::new(radius, 0.0, orbit_period, 0.0)
    }

    /// Fixed y offset for non-coplanar decoration.
    pub fn with_elevation(mut self, elevation: f64) -> ConfigResult<Self> {
        if !elevation.is_finite() {
            return Err(ConfigError::NonFinite("elevation"));
        }
        self.elevation = elevation;
        Ok(self)
    }

    pub fn semi_major_axis(&self) -> f64 {
        self.semi_major_axis
    }

    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    pub fn orbit_period(&self) -> f64 {
        self.orbit_period
    }

    pub fn phase_offset(&self) -> f64 {
        self.phase_offset
    }

    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    /// Semi-minor axis `b = a·sqrt(1 - e²)`.
    pub fn semi_minor_axis(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity * self.eccentricity).sqrt()
    }

    /// Closest approach to the focus, `a(1 - e)`.
    pub fn periapsis(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity)
    }

    /// Farthest distance from the focus, `a(1 + e)`.
    pub fn apoapsis(&self) -> f64 {
        self.semi_major_axis * (1.0 + self.eccentricity)
    }
}

/// Position relative to the orbit's focus at absolute time `t`.
pub fn position(t: f64, params: &OrbitalParameters) -> Vec3 {
    let a = params.semi_major_axis;
    let b = params.semi_minor_axis();
    let angle = (t / params.orbit_period) * TAU + params.phase_offset;

    let x = a * angle.cos() - a * params.eccentricity;
    let z = b * angle.sin();
    Vec3::new(x as f32, params.elevation as f32, z as f32)
}

/// Sample the full ellipse for drawing an orbit ring.
pub fn orbit_path(params: &OrbitalParameters, samples: usize) -> Vec<Vec3> {
    let samples = samples.max(3);
    (0..samples)
        .map(|i| {
            let t = params.orbit_period * i as f64 / samples as f64;
            position(t - params.orbit_period * params.phase_offset / TAU, params)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn circle() -> OrbitalParameters {
        OrbitalParameters::new(100.0, 0.0, 20.0, 0.0).unwrap()
    }

    #[test]
    fn circular_orbit_quarter_points() {
        let p = circle();
        let p0 = position(0.0, &p);
        assert_relative_eq!(p0.x, 100.0, epsilon = 1e-4);
        assert_relative_eq!(p0.z, 0.0, epsilon = 1e-4);

        let p5 = position(5.0, &p);
        assert_relative_eq!(p5.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(p5.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(p5.z, 100.0, epsilon = 1e-4);

        let p10 = position(10.0, &p);
        assert_relative_eq!(p10.x, -100.0, epsilon = 1e-4);
        assert_relative_eq!(p10.z, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn position_is_deterministic() {
        let p = OrbitalParameters::new(37.5, 0.3, 12.25, 1.234).unwrap();
        for i in 0..50 {
            let t = i as f64 * 0.731;
            let a = position(t, &p);
            let b = position(t, &p);
            assert_eq!(a.x.to_bits(), b.x.to_bits());
            assert_eq!(a.y.to_bits(), b.y.to_bits());
            assert_eq!(a.z.to_bits(), b.z.to_bits());
        }
    }

    #[test]
    fn focus_distance_stays_within_apsides() {
        for &e in &[0.0, 0.1, 0.5, 0.9] {
            let p = OrbitalParameters::new(50.0, e, 7.0, 0.4).unwrap();
            let (lo, hi) = (p.periapsis() as f32, p.apoapsis() as f32);
            for i in 0..500 {
                let d = position(i as f64 * 0.037, &p).length();
                assert!(
                    d >= lo - 1e-3 && d <= hi + 1e-3,
                    "e={e}: distance {d} outside [{lo}, {hi}]"
                );
            }
        }
    }

    #[test]
    fn elevation_offsets_y() {
        let p = circle().with_elevation(3.0).unwrap();
        assert_relative_eq!(position(2.0, &p).y, 3.0);
    }

    #[test]
    fn rejects_degenerate_parameters() {
        assert!(matches!(
            OrbitalParameters::new(10.0, 0.0, 0.0, 0.0),
            Err(ConfigError::NonPositivePeriod(_))
        ));
        assert!(matches!(
            OrbitalParameters::new(10.0, 0.0, -3.0, 0.0),
            Err(ConfigError::NonPositivePeriod(_))
        ));
        assert!(matches!(
            OrbitalParameters::new(10.0, 1.0, 5.0, 0.0),
            Err(ConfigError::EccentricityOutOfRange(_))
        ));
        assert!(matches!(
            OrbitalParameters::new(-1.0, 0.0, 5.0, 0.0),
            Err(ConfigError::NegativeSemiMajorAxis(_))
        ));
        assert!(matches!(
            OrbitalParameters::new(1.0, 0.0, 5.0, f64::NAN),
            Err(ConfigError::NonFinite(_))
        ));
    }

    #[test]
    fn orbit_path_lies_on_ellipse() {
        let p = OrbitalParameters::new(10.0, 0.2, 4.0, 2.0).unwrap();
        let pts = orbit_path(&p, 64);
        assert_eq!(pts.len(), 64);
        // First sample is periapsis regardless of phase offset.
        assert_relative_eq!(pts[0].x, p.periapsis() as f32, epsilon = 1e-4);
    }
}
