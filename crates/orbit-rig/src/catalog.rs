use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::extensions::rng::Rng;
use crate::geo::{GeoBounds, HubDescriptor};
use crate::orbit::registry::{BodyKind, OrbitingBody, OrbitingBodyRegistry};
use crate::orbit::solver::OrbitalParameters;

/// Static scene content: the bodies to simulate and the hubs on the focal
/// body's surface. Loaded from JSON at runtime or taken from [`Catalog::builtin`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub bodies: Vec<BodyDescriptor>,
    #[serde(default)]
    pub hubs: Vec<HubDescriptor>,
    /// Id of the body the camera orbits and hubs sit on.
    pub focal_body: String,
    /// Radius of the focal body's textured sphere.
    #[serde(default = "default_surface_radius")]
    pub surface_radius: f32,
}

/// JSON form of one body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyDescriptor {
    pub id: String,
    pub kind: BodyKind,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub orbit: Option<OrbitDescriptor>,
    #[serde(default = "default_body_radius")]
    pub radius: f32,
}

/// JSON form of [`OrbitalParameters`]. A missing `phase_offset` is randomized
/// once when the registry is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitDescriptor {
    pub semi_major_axis: f64,
    #[serde(default)]
    pub eccentricity: f64,
    pub orbit_period: f64,
    #[serde(default)]
    pub phase_offset: Option<f64>,
    #[serde(default)]
    pub elevation: f64,
}

fn default_surface_radius() -> f32 {
    1.5
}

fn default_body_radius() -> f32 {
    1.0
}

impl Catalog {
    /// Parse a catalog from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate_hubs()?;
        Ok(catalog)
    }

    /// Resolve parents, validate orbits and build the registry.
    /// `rng` supplies phase offsets for orbits that leave them unset.
    pub fn build_registry(&self, rng: &mut Rng) -> ConfigResult<OrbitingBodyRegistry> {
        let mut bodies = Vec::with_capacity(self.bodies.len());

        for desc in &self.bodies {
            if !desc.radius.is_finite() || desc.radius < 0.0 {
                return Err(ConfigError::InvalidRadius {
                    id: desc.id.clone(),
                    radius: desc.radius,
                });
            }
            let parent = match &desc.parent {
                None => None,
                Some(parent_id) => {
                    let idx = self
                        .bodies
                        .iter()
                        .position(|b| &b.id == parent_id)
                        .ok_or_else(|| ConfigError::UnknownParent {
                            child: desc.id.clone(),
                            parent: parent_id.clone(),
                        })?;
                    Some(idx)
                }
            };

            let orbit = match &desc.orbit {
                None => None,
                Some(o) => {
                    let phase = o
                        .phase_offset
                        .unwrap_or_else(|| rng.next_f64() * std::f64::consts::TAU);
                    let params = OrbitalParameters::new(o.semi_major_axis, o.eccentricity, o.orbit_period, phase)?
                        .with_elevation(o.elevation)?;
                    Some(params)
                }
            };

            bodies.push(OrbitingBody {
                id: desc.id.clone(),
                kind: desc.kind,
                parent,
                orbit,
                radius: desc.radius,
            });
        }

        let focal = self
            .bodies
            .iter()
            .position(|b| b.id == self.focal_body)
            .ok_or_else(|| ConfigError::UnknownFocalBody(self.focal_body.clone()))?;

        OrbitingBodyRegistry::new(bodies, focal)
    }

    /// Reject hubs with impossible coordinates or duplicate ids.
    pub fn validate_hubs(&self) -> ConfigResult<()> {
        for (i, hub) in self.hubs.iter().enumerate() {
            let lat_ok = hub.latitude.is_finite() && (-90.0..=90.0).contains(&hub.latitude);
            let lon_ok = hub.longitude.is_finite() && (-180.0..=180.0).contains(&hub.longitude);
            if !lat_ok || !lon_ok {
                return Err(ConfigError::InvalidHubCoordinates {
                    id: hub.id.clone(),
                    latitude: hub.latitude,
                    longitude: hub.longitude,
                });
            }
            if self.hubs[..i].iter().any(|h| h.id == hub.id) {
                return Err(ConfigError::DuplicateId(hub.id.clone()));
            }
            if let Some(bounds) = hub.bounds {
                if !bounds.contains(hub.latitude, hub.longitude) {
                    log::warn!("catalog: hub '{}' lies outside its own region", hub.id);
                }
            }
        }
        Ok(())
    }

    pub fn hub_index(&self, id: &str) -> Option<usize> {
        self.hubs.iter().position(|h| h.id == id)
    }

    /// The landing-page scene: a compressed inner solar system around a
    /// slowly orbiting Earth, its moon, three hub satellites and six regional
    /// hubs on the surface.
    pub fn builtin() -> Self {
        let planet = |id: &str, a: f64, e: f64, period: f64, radius: f32| BodyDescriptor {
            id: id.into(),
            kind: BodyKind::Planet,
            parent: Some("sun".into()),
            orbit: Some(OrbitDescriptor {
                semi_major_axis: a,
                eccentricity: e,
                orbit_period: period,
                phase_offset: None,
                elevation: 0.0,
            }),
            radius,
        };
        let satellite = |id: &str, kind: BodyKind, a: f64, period: f64, elevation: f64, radius: f32| BodyDescriptor {
            id: id.into(),
            kind,
            parent: Some("earth".into()),
            orbit: Some(OrbitDescriptor {
                semi_major_axis: a,
                eccentricity: 0.0,
                orbit_period: period,
                phase_offset: None,
                elevation,
            }),
            radius,
        };
        let hub = |id: &str, name: &str, lat: f32, lon: f32, color: [f32; 3], bounds: GeoBounds| HubDescriptor {
            id: id.into(),
            display_name: name.into(),
            latitude: lat,
            longitude: lon,
            color,
            bounds: Some(bounds),
        };

        Self {
            bodies: vec![
                BodyDescriptor {
                    id: "sun".into(),
                    kind: BodyKind::Star,
                    parent: None,
                    orbit: None,
                    radius: 6.0,
                },
                planet("mercury", 14.0, 0.205, 60.0, 0.4),
                planet("venus", 22.0, 0.007, 150.0, 0.9),
                planet("earth", 32.0, 0.017, 240.0, 1.5),
                satellite("moon", BodyKind::Moon, 4.0, 40.0, 0.3, 0.4),
                satellite("hub-sat-americas", BodyKind::HubSatellite, 2.4, 18.0, 0.6, 0.08),
                satellite("hub-sat-emea", BodyKind::HubSatellite, 2.6, 22.0, -0.4, 0.08),
                satellite("hub-sat-apac", BodyKind::HubSatellite, 2.8, 26.0, 0.2, 0.08),
                planet("mars", 44.0, 0.093, 450.0, 0.8),
                planet("jupiter", 70.0, 0.048, 1200.0, 3.5),
                planet("saturn", 96.0, 0.056, 2400.0, 3.0),
            ],
            hubs: vec![
                hub("north-america", "North America", 40.7, -74.0, [0.95, 0.55, 0.2],
                    GeoBounds { min_lat: 15.0, max_lat: 70.0, min_lon: -165.0, max_lon: -55.0 }),
                hub("south-america", "South America", -23.5, -46.6, [0.3, 0.85, 0.45],
                    GeoBounds { min_lat: -55.0, max_lat: 12.0, min_lon: -81.0, max_lon: -35.0 }),
                hub("europe", "Europe", 50.1, 8.7, [0.35, 0.6, 1.0],
                    GeoBounds { min_lat: 36.0, max_lat: 70.0, min_lon: -10.0, max_lon: 40.0 }),
                hub("africa", "Africa", -1.3, 36.8, [0.95, 0.8, 0.3],
                    GeoBounds { min_lat: -35.0, max_lat: 37.0, min_lon: -17.0, max_lon: 51.0 }),
                hub("asia", "Asia", 1.35, 103.8, [0.9, 0.35, 0.45],
                    GeoBounds { min_lat: -10.0, max_lat: 55.0, min_lon: 60.0, max_lon: 145.0 }),
                hub("oceania", "Oceania", -33.9, 151.2, [0.5, 0.9, 0.95],
                    GeoBounds { min_lat: -47.0, max_lat: -10.0, min_lon: 112.0, max_lon: 179.0 }),
            ],
            focal_body: "earth".into(),
            surface_radius: default_surface_radius(),
        }
    }
}
