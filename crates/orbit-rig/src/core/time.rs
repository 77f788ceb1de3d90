/// Fixed timestep accumulator.
/// Ensures choreography runs at a consistent rate regardless of frame time,
/// so per-step damping (fly-to convergence) behaves the same at 30 or 144 fps.
pub struct FixedTimestep {
    /// The fixed delta time per tick.
    dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        let dt = if dt.is_finite() && dt > 0.0 {
            dt
        } else {
            log::warn!("FixedTimestep: invalid dt {dt}, using 1/60");
            1.0 / 60.0
        };
        Self {
            dt,
            accumulator: 0.0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            return 0;
        }
        self.accumulator += frame_dt;
        // Cap to prevent spiral of death (max 10 steps per frame)
        self.accumulator = self.accumulator.min(self.dt * 10.0);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f32 {
        self.dt
    }
}

/// Absolute simulation clock.
///
/// Orbits are evaluated from `now()` rather than integrated, so the clock is
/// the single time source for a scene.
#[derive(Debug, Clone)]
pub struct SimClock {
    now: f64,
    /// Simulation seconds per real second.
    scale: f64,
}

impl SimClock {
    pub fn new(scale: f64) -> Self {
        Self {
            now: 0.0,
            scale: if scale.is_finite() && scale >= 0.0 { scale } else { 1.0 },
        }
    }

    /// Advance by a real-time step; returns the new absolute time.
    pub fn advance(&mut self, dt: f32) -> f64 {
        self.now += dt as f64 * self.scale;
        self.now
    }

    pub fn now(&self) -> f64 {
        self.now
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_step_exact() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        let steps = ts.accumulate(1.0 / 60.0);
        assert_eq!(steps, 1);
    }

    #[test]
    fn accumulates_partial() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        let steps = ts.accumulate(0.008); // half a frame
        assert_eq!(steps, 0);
        let steps = ts.accumulate(0.010); // over one frame total
        assert_eq!(steps, 1);
    }

    #[test]
    fn caps_at_ten_steps() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        let steps = ts.accumulate(1.0); // 60 frames worth, but capped at 10
        assert_eq!(steps, 10);
    }

    #[test]
    fn rejects_bad_deltas() {
        let mut ts = FixedTimestep::new(0.0);
        assert!((ts.dt() - 1.0 / 60.0).abs() < 1e-9);
        assert_eq!(ts.accumulate(f32::NAN), 0);
        assert_eq!(ts.accumulate(-1.0), 0);
    }

    #[test]
    fn clock_scales_time() {
        let mut clock = SimClock::new(2.0);
        clock.advance(0.5);
        clock.advance(0.25);
        assert!((clock.now() - 1.5).abs() < 1e-9);
    }
}
