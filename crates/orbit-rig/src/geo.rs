//! Geographic projection onto a sphere.
//!
//! `surface_point` is the only lat/lon → 3D formula in the crate. Hub markers,
//! camera destinations and region outlines all go through it, so a label can
//! never drift off the region the camera flies to.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Longitude offset aligning lon = 0 with the equirectangular texture seam.
pub const TEXTURE_LONGITUDE_OFFSET_DEG: f32 = 90.0;

/// Point on a sphere of `radius` centred at the origin.
///
/// `phi = 90° - lat` (polar angle from +Y), `theta = lon + 90°`.
pub fn surface_point(lat_deg: f32, lon_deg: f32, radius: f32) -> Vec3 {
    let phi = (90.0 - lat_deg).to_radians();
    let theta = (lon_deg + TEXTURE_LONGITUDE_OFFSET_DEG).to_radians();

    Vec3::new(
        -radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

/// Lat/lon rectangle used to highlight a hub's region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f32,
    pub max_lat: f32,
    pub min_lon: f32,
    pub max_lon: f32,
}

impl GeoBounds {
    pub fn contains(&self, lat: f32, lon: f32) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

/// Closed outline of `bounds` traced on the sphere, `samples_per_edge` points
/// per edge. Edges follow parallels and meridians, so they stay on the surface.
pub fn region_outline(bounds: &GeoBounds, radius: f32, samples_per_edge: usize) -> Vec<Vec3> {
    let n = samples_per_edge.max(1);
    let corners = [
        (bounds.min_lat, bounds.min_lon),
        (bounds.min_lat, bounds.max_lon),
        (bounds.max_lat, bounds.max_lon),
        (bounds.max_lat, bounds.min_lon),
    ];

    let mut points = Vec::with_capacity(n * 4);
    for i in 0..4 {
        let (lat0, lon0) = corners[i];
        let (lat1, lon1) = corners[(i + 1) % 4];
        for s in 0..n {
            let f = s as f32 / n as f32;
            points.push(surface_point(
                lat0 + (lat1 - lat0) * f,
                lon0 + (lon1 - lon0) * f,
                radius,
            ));
        }
    }
    points
}

/// Static catalog entry for a named surface target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubDescriptor {
    pub id: String,
    pub display_name: String,
    pub latitude: f32,
    pub longitude: f32,
    /// Marker color (r, g, b) in 0..1.
    #[serde(default = "default_hub_color")]
    pub color: [f32; 3],
    #[serde(default)]
    pub bounds: Option<GeoBounds>,
}

fn default_hub_color() -> [f32; 3] {
    [0.3, 0.8, 1.0]
}

impl HubDescriptor {
    /// Surface position relative to the sphere centre.
    pub fn surface_position(&self, radius: f32) -> Vec3 {
        surface_point(self.latitude, self.longitude, radius)
    }
}
