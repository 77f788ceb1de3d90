//! Input arbitration for the camera.
//!
//! Raw pointer and scroll events become [`ControlIntent`]s here. Nothing in
//! this module touches a [`CameraPose`](super::rig::CameraPose); intents are
//! applied by whichever driver owns the rig.

use super::choreographer::ChoreographyPhase;
use crate::input::queue::InputEvent;

/// User input may move the camera only while idling in orbit.
pub fn is_input_accepted(phase: ChoreographyPhase) -> bool {
    matches!(phase, ChoreographyPhase::IdleOrbit)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlIntent {
    DragStart,
    DragMove { dx: f32, dy: f32 },
    DragEnd,
    /// Positive steps zoom in.
    Zoom { steps: f32 },
}

/// Tracks pointer state and filters events by phase.
#[derive(Debug, Clone, Default)]
pub struct InteractionGate {
    dragging: bool,
    last_pointer: Option<(f32, f32)>,
    phase: Option<ChoreographyPhase>,
}

impl InteractionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Record the current phase. Leaving idle orbit ends any drag, and the
    /// returned intent must be forwarded so the driver releases it too.
    pub fn observe_phase(&mut self, phase: ChoreographyPhase) -> Option<ControlIntent> {
        let previous = self.phase.replace(phase);
        if previous != Some(phase) && !is_input_accepted(phase) && self.dragging {
            log::debug!("gate: drag cancelled by phase change to {phase:?}");
            return self.cancel_drag();
        }
        None
    }

    /// End any drag in progress, e.g. when another driver takes the camera.
    pub fn cancel_drag(&mut self) -> Option<ControlIntent> {
        self.last_pointer = None;
        if std::mem::take(&mut self.dragging) {
            Some(ControlIntent::DragEnd)
        } else {
            None
        }
    }

    /// Turn one event into an intent for `phase`, or drop it.
    /// A pointer release is always let through so a drag can never stay
    /// latched. Custom events are not the gate's concern and yield `None`.
    pub fn filter(&mut self, phase: ChoreographyPhase, event: &InputEvent) -> Option<ControlIntent> {
        let accepted = is_input_accepted(phase);
        match *event {
            InputEvent::PointerUp { .. } => {
                self.last_pointer = None;
                if self.dragging {
                    self.dragging = false;
                    Some(ControlIntent::DragEnd)
                } else {
                    None
                }
            }
            InputEvent::PointerDown { x, y } if accepted => {
                self.dragging = true;
                self.last_pointer = Some((x, y));
                Some(ControlIntent::DragStart)
            }
            InputEvent::PointerMove { x, y } if accepted && self.dragging => {
                let (px, py) = self.last_pointer.replace((x, y)).unwrap_or((x, y));
                let (dx, dy) = (x - px, y - py);
                if dx.is_finite() && dy.is_finite() && (dx != 0.0 || dy != 0.0) {
                    Some(ControlIntent::DragMove { dx, dy })
                } else {
                    None
                }
            }
            InputEvent::Scroll { delta } if accepted && delta.is_finite() && delta != 0.0 => {
                Some(ControlIntent::Zoom { steps: delta })
            }
            InputEvent::Custom { .. } => None,
            _ => {
                if !accepted {
                    log::trace!("gate: {event:?} rejected in {phase:?}");
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE: ChoreographyPhase = ChoreographyPhase::IdleOrbit;
    const FLYING: ChoreographyPhase = ChoreographyPhase::FlyingToTarget;

    #[test]
    fn accepted_only_in_idle_orbit() {
        assert!(is_input_accepted(IDLE));
        assert!(!is_input_accepted(ChoreographyPhase::IntroZoom));
        assert!(!is_input_accepted(FLYING));
    }

    #[test]
    fn drag_produces_deltas() {
        let mut gate = InteractionGate::new();
        assert_eq!(
            gate.filter(IDLE, &InputEvent::PointerDown { x: 10.0, y: 10.0 }),
            Some(ControlIntent::DragStart)
        );
        assert_eq!(
            gate.filter(IDLE, &InputEvent::PointerMove { x: 15.0, y: 7.0 }),
            Some(ControlIntent::DragMove { dx: 5.0, dy: -3.0 })
        );
        assert_eq!(
            gate.filter(IDLE, &InputEvent::PointerUp { x: 15.0, y: 7.0 }),
            Some(ControlIntent::DragEnd)
        );
        assert!(!gate.is_dragging());
    }

    #[test]
    fn moves_without_drag_are_ignored() {
        let mut gate = InteractionGate::new();
        assert_eq!(gate.filter(IDLE, &InputEvent::PointerMove { x: 1.0, y: 1.0 }), None);
    }

    #[test]
    fn input_rejected_outside_idle() {
        let mut gate = InteractionGate::new();
        assert_eq!(gate.filter(FLYING, &InputEvent::PointerDown { x: 0.0, y: 0.0 }), None);
        assert_eq!(gate.filter(FLYING, &InputEvent::Scroll { delta: 1.0 }), None);
        assert!(!gate.is_dragging());
    }

    #[test]
    fn release_always_passes() {
        let mut gate = InteractionGate::new();
        gate.filter(IDLE, &InputEvent::PointerDown { x: 0.0, y: 0.0 });
        assert_eq!(
            gate.filter(FLYING, &InputEvent::PointerUp { x: 0.0, y: 0.0 }),
            Some(ControlIntent::DragEnd)
        );
    }

    #[test]
    fn phase_change_cancels_drag() {
        let mut gate = InteractionGate::new();
        assert_eq!(gate.observe_phase(IDLE), None);
        gate.filter(IDLE, &InputEvent::PointerDown { x: 0.0, y: 0.0 });
        assert_eq!(gate.observe_phase(FLYING), Some(ControlIntent::DragEnd));
        assert!(!gate.is_dragging());
        assert_eq!(gate.filter(FLYING, &InputEvent::PointerMove { x: 9.0, y: 9.0 }), None);
    }

    #[test]
    fn scroll_zooms() {
        let mut gate = InteractionGate::new();
        assert_eq!(gate.filter(IDLE, &InputEvent::Scroll { delta: -2.0 }), Some(ControlIntent::Zoom { steps: -2.0 }));
        assert_eq!(gate.filter(IDLE, &InputEvent::Scroll { delta: f32::NAN }), None);
    }
}
