//! The wormhole path: a centripetal Catmull-Rom spline through a fixed
//! serpentine spiral, reparameterised by arc length.
//!
//! Built once per scene. Queries take a normalized progress `t` in [0, 1]
//! where equal steps in `t` cover equal distances along the tube.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::error::{ConfigError, ConfigResult};

/// Total depth of the default tunnel along -Z.
pub const TUNNEL_DEPTH: f32 = 240.0;

/// Centripetal parameterisation; avoids cusps and self-intersections.
const ALPHA: f32 = 0.5;
const SAMPLES_PER_SEGMENT: usize = 32;
const MIN_KNOT: f32 = 1e-4;

/// The fixed spiral the traversal flies through: 2.5 turns whose radius opens
/// mid-journey, with a side-to-side sway on top.
pub fn serpentine_control_points() -> Vec<Vec3> {
    const COUNT: usize = 13;
    (0..COUNT)
        .map(|i| {
            let s = i as f32 / (COUNT - 1) as f32;
            let swirl = s * 2.5 * TAU;
            let radius = 8.0 * (PI * s).sin();
            let sway = 4.0 * (2.0 * TAU * s).sin();
            Vec3::new(radius * swirl.cos() + sway, radius * swirl.sin(), -TUNNEL_DEPTH * s)
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct TunnelPathPlanner {
    /// Control points with a phantom point at each end.
    padded: Vec<Vec3>,
    /// Cumulative arc length at spline parameter `i / SAMPLES_PER_SEGMENT`.
    arc: Vec<f32>,
}

impl TunnelPathPlanner {
    /// Build the spline. Consecutive duplicate points are merged; fewer than
    /// two distinct points is an error.
    pub fn new(control_points: Vec<Vec3>) -> ConfigResult<Self> {
        if control_points.iter().any(|p| !p.is_finite()) {
            return Err(ConfigError::NonFinite("tunnel control point"));
        }
        let mut points: Vec<Vec3> = Vec::with_capacity(control_points.len() + 2);
        for p in control_points {
            if points.last().map_or(true, |last| last.distance(p) > MIN_KNOT) {
                points.push(p);
            }
        }
        if points.len() < 2 {
            return Err(ConfigError::TooFewControlPoints(points.len()));
        }

        let n = points.len();
        let head = 2.0 * points[0] - points[1];
        let tail = 2.0 * points[n - 1] - points[n - 2];
        let mut padded = Vec::with_capacity(n + 2);
        padded.push(head);
        padded.extend(points);
        padded.push(tail);

        let mut planner = Self { padded, arc: Vec::new() };
        planner.build_arc_table();
        log::debug!(
            "tunnel path: {} control points, length {:.1}",
            n,
            planner.total_length()
        );
        Ok(planner)
    }

    /// The default serpentine tunnel.
    pub fn serpentine() -> ConfigResult<Self> {
        Self::new(serpentine_control_points())
    }

    fn segments(&self) -> usize {
        self.padded.len() - 3
    }

    pub fn control_points(&self) -> &[Vec3] {
        &self.padded[1..self.padded.len() - 1]
    }

    pub fn total_length(&self) -> f32 {
        self.arc.last().copied().unwrap_or(0.0)
    }

    fn build_arc_table(&mut self) {
        let total = self.segments() * SAMPLES_PER_SEGMENT;
        let mut arc = Vec::with_capacity(total + 1);
        let mut length = 0.0;
        let mut prev = self.evaluate(0.0);
        arc.push(0.0);
        for i in 1..=total {
            let p = self.evaluate(i as f32 / SAMPLES_PER_SEGMENT as f32);
            length += p.distance(prev);
            arc.push(length);
            prev = p;
        }
        self.arc = arc;
    }

    /// Evaluate at spline parameter `u` in [0, segments].
    fn evaluate(&self, u: f32) -> Vec3 {
        let segments = self.segments();
        let u = u.clamp(0.0, segments as f32);
        let seg = (u.floor() as usize).min(segments - 1);
        let local = u - seg as f32;
        let [p0, p1, p2, p3] = [
            self.padded[seg],
            self.padded[seg + 1],
            self.padded[seg + 2],
            self.padded[seg + 3],
        ];

        let t0 = 0.0;
        let t1 = t0 + p0.distance(p1).powf(ALPHA).max(MIN_KNOT);
        let t2 = t1 + p1.distance(p2).powf(ALPHA).max(MIN_KNOT);
        let t3 = t2 + p2.distance(p3).powf(ALPHA).max(MIN_KNOT);
        let t = t1 + (t2 - t1) * local;

        // Barry-Goldman pyramid.
        let a1 = p0 * ((t1 - t) / (t1 - t0)) + p1 * ((t - t0) / (t1 - t0));
        let a2 = p1 * ((t2 - t) / (t2 - t1)) + p2 * ((t - t1) / (t2 - t1));
        let a3 = p2 * ((t3 - t) / (t3 - t2)) + p3 * ((t - t2) / (t3 - t2));
        let b1 = a1 * ((t2 - t) / (t2 - t0)) + a2 * ((t - t0) / (t2 - t0));
        let b2 = a2 * ((t3 - t) / (t3 - t1)) + a3 * ((t - t1) / (t3 - t1));
        b1 * ((t2 - t) / (t2 - t1)) + b2 * ((t - t1) / (t2 - t1))
    }

    /// Map normalized arc-length progress to spline parameter.
    fn parameter_at(&self, t: f32) -> f32 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let target = t * self.total_length();
        let idx = self.arc.partition_point(|&l| l < target);
        if idx == 0 {
            return 0.0;
        }
        if idx >= self.arc.len() {
            return self.segments() as f32;
        }
        let (l0, l1) = (self.arc[idx - 1], self.arc[idx]);
        let frac = if l1 > l0 { (target - l0) / (l1 - l0) } else { 0.0 };
        (idx - 1) as f32 / SAMPLES_PER_SEGMENT as f32 + frac / SAMPLES_PER_SEGMENT as f32
    }

    /// Point at normalized progress `t`. The ends land exactly on the first
    /// and last control points.
    pub fn point_at(&self, t: f32) -> Vec3 {
        let points = self.control_points();
        if t.is_nan() || t <= 0.0 {
            return points[0];
        }
        if t >= 1.0 {
            return points[points.len() - 1];
        }
        self.evaluate(self.parameter_at(t))
    }

    /// Unit direction of travel at `t`.
    pub fn tangent_at(&self, t: f32) -> Vec3 {
        const H: f32 = 1e-3;
        let u = self.parameter_at(t);
        let max = self.segments() as f32;
        let ahead = self.evaluate((u + H).min(max));
        let behind = self.evaluate((u - H).max(0.0));
        let tangent = (ahead - behind).normalize_or_zero();
        if tangent != Vec3::ZERO {
            return tangent;
        }
        let points = self.control_points();
        (points[points.len() - 1] - points[0]).normalize_or_zero()
    }

    /// Evenly spaced points along the tube for drawing its centreline.
    pub fn sample(&self, count: usize) -> Vec<Vec3> {
        match count {
            0 => Vec::new(),
            1 => vec![self.point_at(0.0)],
            _ => (0..count)
                .map(|i| self.point_at(i as f32 / (count - 1) as f32))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rejects_too_few_points() {
        assert!(matches!(
            TunnelPathPlanner::new(vec![]),
            Err(ConfigError::TooFewControlPoints(0))
        ));
        assert!(matches!(
            TunnelPathPlanner::new(vec![Vec3::ONE, Vec3::ONE]),
            Err(ConfigError::TooFewControlPoints(1))
        ));
        assert!(matches!(
            TunnelPathPlanner::new(vec![Vec3::ZERO, Vec3::splat(f32::NAN)]),
            Err(ConfigError::NonFinite(_))
        ));
    }

    #[test]
    fn two_points_make_a_straight_line() {
        let path = TunnelPathPlanner::new(vec![Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0)]).unwrap();
        let mid = path.point_at(0.5);
        assert_relative_eq!(mid.z, -5.0, epsilon = 1e-3);
        assert_relative_eq!(mid.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(path.total_length(), 10.0, epsilon = 1e-3);
        let tangent = path.tangent_at(0.5);
        assert_relative_eq!(tangent.z, -1.0, epsilon = 1e-4);
    }

    #[test]
    fn endpoints_are_exact() {
        let path = TunnelPathPlanner::serpentine().unwrap();
        let points = serpentine_control_points();
        assert_eq!(path.point_at(0.0), points[0]);
        assert_eq!(path.point_at(1.0), points[points.len() - 1]);
        assert_eq!(path.point_at(-3.0), points[0]);
        assert_eq!(path.point_at(f32::NAN), points[0]);
    }

    #[test]
    fn passes_through_control_points() {
        let points = serpentine_control_points();
        let path = TunnelPathPlanner::new(points.clone()).unwrap();
        // Interior control points sit at integer spline parameters.
        for (i, p) in points.iter().enumerate() {
            let q = path.evaluate(i as f32);
            assert!(q.distance(*p) < 1e-3, "control point {i}: {q:?} vs {p:?}");
        }
    }

    #[test]
    fn arc_length_is_uniform() {
        let path = TunnelPathPlanner::serpentine().unwrap();
        let samples = path.sample(101);
        let expected = path.total_length() / 100.0;
        for pair in samples.windows(2) {
            let step = pair[0].distance(pair[1]);
            assert!((step - expected).abs() < expected * 0.05, "step {step} vs {expected}");
        }
    }

    #[test]
    fn tunnel_descends_to_full_depth() {
        let path = TunnelPathPlanner::serpentine().unwrap();
        assert_relative_eq!(path.point_at(1.0).z, -TUNNEL_DEPTH, epsilon = 1e-3);
        assert!(path.total_length() >= TUNNEL_DEPTH);
    }

    #[test]
    fn tangent_is_unit_and_follows_the_curve() {
        let path = TunnelPathPlanner::serpentine().unwrap();
        for i in 0..=20 {
            let t = i as f32 / 20.0;
            let tangent = path.tangent_at(t);
            assert_relative_eq!(tangent.length(), 1.0, epsilon = 1e-4);
            let next = path.point_at((t + 0.01).min(1.0));
            let here = path.point_at((t + 0.01).min(1.0) - 0.01);
            let chord = (next - here).normalize();
            assert!(tangent.dot(chord) > 0.9, "t = {t}");
        }
    }
}
