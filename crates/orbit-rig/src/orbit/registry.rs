//! Registry of simulated bodies.
//!
//! Owns every body's state and is the only writer of it. Each tick it
//! recomputes all positions from absolute time and publishes a
//! [`RegistrySnapshot`]; camera code reads the snapshot, never the registry's
//! working storage.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::solver::{self, OrbitalParameters};
use crate::error::{ConfigError, ConfigResult};

/// Role of a body in the scene. Informational for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    Star,
    Planet,
    Moon,
    /// Satellite circling the focal body, one per hub cluster.
    HubSatellite,
}

impl BodyKind {
    /// Wire code used in [`BodyInstance`](crate::api::types::BodyInstance).
    pub fn code(self) -> f32 {
        match self {
            Self::Star => 0.0,
            Self::Planet => 1.0,
            Self::Moon => 2.0,
            Self::HubSatellite => 3.0,
        }
    }
}

/// Static definition of one body.
#[derive(Debug, Clone)]
pub struct OrbitingBody {
    pub id: String,
    pub kind: BodyKind,
    /// Index of the parent body; always lower than this body's own index.
    pub parent: Option<usize>,
    /// `None` pins the body to its parent (or the origin), e.g. the sun.
    pub orbit: Option<OrbitalParameters>,
    /// Visual radius, forwarded to the renderer.
    pub radius: f32,
}

/// Per-tick state of one body.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyState {
    pub position: Vec3,
}

/// Positions of every body at one instant. Indexed like the registry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrySnapshot {
    pub time: f64,
    pub positions: Vec<Vec3>,
    focal: usize,
}

impl RegistrySnapshot {
    /// Position of the body the camera is centred on.
    pub fn focal_point(&self) -> Vec3 {
        self.positions.get(self.focal).copied().unwrap_or(Vec3::ZERO)
    }

    pub fn position(&self, index: usize) -> Option<Vec3> {
        self.positions.get(index).copied()
    }
}

#[derive(Debug, Clone)]
pub struct OrbitingBodyRegistry {
    bodies: Vec<OrbitingBody>,
    states: Vec<BodyState>,
    snapshot: RegistrySnapshot,
    focal: usize,
}

impl OrbitingBodyRegistry {
    /// Build a registry. Parents must precede their children so one forward
    /// pass per tick resolves every position.
    pub fn new(bodies: Vec<OrbitingBody>, focal: usize) -> ConfigResult<Self> {
        for (i, body) in bodies.iter().enumerate() {
            if let Some(parent) = body.parent {
                if parent >= i {
                    let parent_id = bodies
                        .get(parent)
                        .map(|b| b.id.clone())
                        .unwrap_or_else(|| format!("#{parent}"));
                    return Err(ConfigError::UnknownParent {
                        child: body.id.clone(),
                        parent: parent_id,
                    });
                }
            }
            if bodies[..i].iter().any(|b| b.id == body.id) {
                return Err(ConfigError::DuplicateId(body.id.clone()));
            }
        }
        if focal >= bodies.len() {
            return Err(ConfigError::UnknownFocalBody(format!("#{focal}")));
        }

        let states = vec![BodyState::default(); bodies.len()];
        let mut registry = Self {
            bodies,
            states,
            snapshot: RegistrySnapshot::default(),
            focal,
        };
        registry.tick(0.0);
        Ok(registry)
    }

    /// Recompute every body at absolute time `t` and publish a snapshot.
    pub fn tick(&mut self, t: f64) -> &RegistrySnapshot {
        for i in 0..self.bodies.len() {
            let body = &self.bodies[i];
            let anchor = body
                .parent
                .map(|p| self.states[p].position)
                .unwrap_or(Vec3::ZERO);
            let offset = body
                .orbit
                .as_ref()
                .map(|params| solver::position(t, params))
                .unwrap_or(Vec3::ZERO);
            self.states[i].position = anchor + offset;
        }

        self.snapshot.time = t;
        self.snapshot.focal = self.focal;
        self.snapshot.positions.clear();
        self.snapshot
            .positions
            .extend(self.states.iter().map(|s| s.position));
        &self.snapshot
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> &RegistrySnapshot {
        &self.snapshot
    }

    pub fn bodies(&self) -> &[OrbitingBody] {
        &self.bodies
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.bodies.iter().position(|b| b.id == id)
    }

    pub fn focal_index(&self) -> usize {
        self.focal
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn body(id: &str, kind: BodyKind, parent: Option<usize>, orbit: Option<OrbitalParameters>) -> OrbitingBody {
        OrbitingBody { id: id.into(), kind, parent, orbit, radius: 1.0 }
    }

    fn sun_earth_moon() -> OrbitingBodyRegistry {
        let bodies = vec![
            body("sun", BodyKind::Star, None, None),
            body("earth", BodyKind::Planet, Some(0), Some(OrbitalParameters::circular(100.0, 20.0).unwrap())),
            body("moon", BodyKind::Moon, Some(1), Some(OrbitalParameters::circular(5.0, 2.0).unwrap())),
        ];
        OrbitingBodyRegistry::new(bodies, 1).unwrap()
    }

    #[test]
    fn children_follow_parents() {
        let mut reg = sun_earth_moon();
        let snap = reg.tick(5.0).clone();
        let earth = snap.position(1).unwrap();
        let moon = snap.position(2).unwrap();
        assert_relative_eq!(earth.z, 100.0, epsilon = 1e-3);
        // 5 s is 2.5 moon periods: half way round, on the far side.
        assert_relative_eq!(moon.distance(earth), 5.0, epsilon = 1e-3);
        assert_relative_eq!(moon.x - earth.x, -5.0, epsilon = 1e-3);
    }

    #[test]
    fn snapshot_reports_focal_point() {
        let mut reg = sun_earth_moon();
        let focal = reg.tick(10.0).focal_point();
        assert_relative_eq!(focal.x, -100.0, epsilon = 1e-3);
        assert_eq!(reg.snapshot().time, 10.0);
    }

    #[test]
    fn recomputation_is_drift_free() {
        let mut reg = sun_earth_moon();
        let direct = reg.tick(123.456).positions.clone();
        for i in 0..10_000 {
            reg.tick(i as f64 * 0.0123);
        }
        assert_eq!(reg.tick(123.456).positions, direct);
    }

    #[test]
    fn rejects_forward_parent_reference() {
        let bodies = vec![
            body("moon", BodyKind::Moon, Some(1), Some(OrbitalParameters::circular(5.0, 2.0).unwrap())),
            body("earth", BodyKind::Planet, None, Some(OrbitalParameters::circular(100.0, 20.0).unwrap())),
        ];
        assert!(matches!(
            OrbitingBodyRegistry::new(bodies, 1),
            Err(ConfigError::UnknownParent { .. })
        ));
    }

    #[test]
    fn rejects_duplicates_and_bad_focal() {
        let dup = vec![body("a", BodyKind::Star, None, None), body("a", BodyKind::Star, None, None)];
        assert!(matches!(OrbitingBodyRegistry::new(dup, 0), Err(ConfigError::DuplicateId(_))));

        let one = vec![body("a", BodyKind::Star, None, None)];
        assert!(matches!(OrbitingBodyRegistry::new(one, 3), Err(ConfigError::UnknownFocalBody(_))));
    }
}
