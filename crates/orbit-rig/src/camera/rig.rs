use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Default vertical field of view in degrees.
pub const DEFAULT_FOV_DEG: f32 = 45.0;

/// Camera state handed to the renderer every frame.
/// Wire format: 8 floats (position, look_at, fov in degrees, roll in radians).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
    pub field_of_view: f32,
    pub roll: f32,
}

impl CameraPose {
    pub const FLOATS: usize = 8;

    pub fn new(position: Vec3, look_at: Vec3) -> Self {
        Self {
            position,
            look_at,
            field_of_view: DEFAULT_FOV_DEG,
            roll: 0.0,
        }
    }

    pub fn with_fov(mut self, field_of_view: f32) -> Self {
        self.field_of_view = field_of_view;
        self
    }

    pub fn with_roll(mut self, roll: f32) -> Self {
        self.roll = roll;
        self
    }

    /// Every component finite, fov strictly inside (0, 180), and the camera
    /// not sitting on its own look-at point (no view direction).
    pub fn is_valid(&self) -> bool {
        self.position.is_finite()
            && self.look_at.is_finite()
            && self.roll.is_finite()
            && self.field_of_view.is_finite()
            && self.field_of_view > 0.0
            && self.field_of_view < 180.0
            && self.position.distance_squared(self.look_at) > 1e-12
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO)
    }
}

/// The drivers allowed to move the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraDriver {
    /// Intro zoom, idle orbit and hub fly-to.
    Choreographer,
    /// Wormhole traversal.
    Traversal,
}

/// Single-owner cell for the published camera pose.
///
/// Exactly one driver owns the rig at a time. Writes from anyone else are
/// refused (and assert in debug builds); invalid poses are refused and the
/// last valid pose is kept.
#[derive(Debug, Clone)]
pub struct CameraRig {
    pose: CameraPose,
    owner: Option<CameraDriver>,
    rejected_writes: u32,
}

impl CameraRig {
    pub fn new(initial: CameraPose) -> Self {
        debug_assert!(initial.is_valid(), "initial camera pose must be valid");
        Self {
            pose: initial,
            owner: None,
            rejected_writes: 0,
        }
    }

    /// The last valid published pose.
    pub fn pose(&self) -> &CameraPose {
        &self.pose
    }

    pub fn owner(&self) -> Option<CameraDriver> {
        self.owner
    }

    /// Hand the rig to `driver`. Returns the previous owner.
    pub fn acquire(&mut self, driver: CameraDriver) -> Option<CameraDriver> {
        let previous = self.owner.replace(driver);
        if previous != Some(driver) {
            log::debug!("camera rig: {previous:?} -> {driver:?}");
        }
        previous
    }

    /// Give up ownership. Only the current owner can release.
    pub fn release(&mut self, driver: CameraDriver) {
        if self.owner == Some(driver) {
            self.owner = None;
            log::debug!("camera rig: released by {driver:?}");
        }
    }

    /// Publish a new pose. Returns `false` when the write was refused.
    pub fn publish(&mut self, driver: CameraDriver, candidate: CameraPose) -> bool {
        if self.owner != Some(driver) {
            self.rejected_writes += 1;
            log::error!("camera rig: {driver:?} wrote while owner is {:?}", self.owner);
            debug_assert!(false, "{driver:?} is not the camera owner");
            return false;
        }
        if !candidate.is_valid() {
            self.rejected_writes += 1;
            log::error!("camera rig: refusing invalid pose {candidate:?}, holding last valid pose");
            return false;
        }
        self.pose = candidate;
        true
    }

    /// Number of refused writes since creation (invalid pose or wrong owner).
    pub fn rejected_writes(&self) -> u32 {
        self.rejected_writes
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(CameraPose::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_is_eight_floats() {
        assert_eq!(std::mem::size_of::<CameraPose>(), CameraPose::FLOATS * 4);
        let pose = CameraPose::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)).with_roll(0.5);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&pose));
        assert_eq!(floats, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, DEFAULT_FOV_DEG, 0.5]);
    }

    #[test]
    fn owner_can_publish() {
        let mut rig = CameraRig::default();
        rig.acquire(CameraDriver::Choreographer);
        let pose = CameraPose::new(Vec3::X * 5.0, Vec3::ZERO);
        assert!(rig.publish(CameraDriver::Choreographer, pose));
        assert_eq!(rig.pose(), &pose);
    }

    #[test]
    fn nan_pose_holds_last_valid() {
        let mut rig = CameraRig::default();
        rig.acquire(CameraDriver::Traversal);
        let good = CameraPose::new(Vec3::Y * 3.0, Vec3::ZERO);
        assert!(rig.publish(CameraDriver::Traversal, good));

        let bad = CameraPose::new(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::ZERO);
        assert!(!rig.publish(CameraDriver::Traversal, bad));
        let degenerate = CameraPose::new(Vec3::ONE, Vec3::ONE);
        assert!(!rig.publish(CameraDriver::Traversal, degenerate));
        let wide = good.with_fov(180.0);
        assert!(!rig.publish(CameraDriver::Traversal, wide));

        assert_eq!(rig.pose(), &good);
        assert_eq!(rig.rejected_writes(), 3);
    }

    #[test]
    fn release_only_by_owner() {
        let mut rig = CameraRig::default();
        rig.acquire(CameraDriver::Choreographer);
        rig.release(CameraDriver::Traversal);
        assert_eq!(rig.owner(), Some(CameraDriver::Choreographer));
        rig.release(CameraDriver::Choreographer);
        assert_eq!(rig.owner(), None);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "not the camera owner")]
    fn non_owner_write_asserts_in_debug() {
        let mut rig = CameraRig::default();
        rig.acquire(CameraDriver::Choreographer);
        rig.publish(CameraDriver::Traversal, CameraPose::default());
    }
}
