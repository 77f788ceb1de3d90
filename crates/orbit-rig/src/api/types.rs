use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// What an [`EngineEvent`] reports. Stored as `kind` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum EventKind {
    /// Intro zoom finished; fired exactly once per scene.
    ReachIdle = 1,
    /// `a` = new [`ChoreographyPhase`](crate::camera::choreographer::ChoreographyPhase) code.
    PhaseChanged = 2,
    /// Fly-to converged. `a` = hub index.
    ArrivedAtHub = 3,
    /// `a` = traversal progress in [0, 1]. Fired every step while traversing.
    TraversalProgress = 4,
    /// `a` = milestone index, `b` = threshold.
    TraversalMilestone = 5,
    /// Traversal reached t = 1; fired exactly once.
    TraversalComplete = 6,
    /// Timeline cue reached. `a` = cue index.
    NarrativeCue = 7,
}

impl EventKind {
    pub fn from_code(code: f32) -> Option<Self> {
        match code as u32 {
            1 => Some(Self::ReachIdle),
            2 => Some(Self::PhaseChanged),
            3 => Some(Self::ArrivedAtHub),
            4 => Some(Self::TraversalProgress),
            5 => Some(Self::TraversalMilestone),
            6 => Some(Self::TraversalComplete),
            7 => Some(Self::NarrativeCue),
            _ => None,
        }
    }
}

/// An engine event communicated from Rust to the TypeScript UI.
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct EngineEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl EngineEvent {
    pub const FLOATS: usize = 4;

    pub fn new(kind: EventKind, a: f32, b: f32, c: f32) -> Self {
        Self {
            kind: kind as u32 as f32,
            a,
            b,
            c,
        }
    }

    pub fn simple(kind: EventKind) -> Self {
        Self::new(kind, 0.0, 0.0, 0.0)
    }

    pub fn kind(&self) -> Option<EventKind> {
        EventKind::from_code(self.kind)
    }

    pub fn is(&self, kind: EventKind) -> bool {
        self.kind() == Some(kind)
    }
}

/// One simulated body as the renderer sees it (6 floats).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct BodyInstance {
    pub position: Vec3,
    pub radius: f32,
    /// [`BodyKind::code`](crate::orbit::registry::BodyKind::code).
    pub kind: f32,
    /// 1.0 for the body the camera is centred on.
    pub focal: f32,
}

impl BodyInstance {
    pub const FLOATS: usize = 6;
}

/// A hub marker on the focal body's surface (8 floats).
/// `position` is absolute: focal position plus the projected surface point.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct HubMarker {
    pub position: Vec3,
    pub color: [f32; 3],
    /// 1.0 while the hub is the current selection.
    pub selected: f32,
    pub index: f32,
}

impl HubMarker {
    pub const FLOATS: usize = 8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_sizes_match_float_counts() {
        assert_eq!(std::mem::size_of::<EngineEvent>(), EngineEvent::FLOATS * 4);
        assert_eq!(std::mem::size_of::<BodyInstance>(), BodyInstance::FLOATS * 4);
        assert_eq!(std::mem::size_of::<HubMarker>(), HubMarker::FLOATS * 4);
    }

    #[test]
    fn kind_round_trips_through_float() {
        let e = EngineEvent::new(EventKind::TraversalMilestone, 1.0, 0.7, 0.0);
        assert_eq!(e.kind(), Some(EventKind::TraversalMilestone));
        assert!(e.is(EventKind::TraversalMilestone));
        assert_eq!(EngineEvent::default().kind(), None);
    }
}
