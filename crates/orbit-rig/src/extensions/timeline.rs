// extensions/timeline.rs
//
// Clock-driven narrative cues (intro captions and the like).
// One clock read per step decides which cues have fired; no timers.

use serde::{Deserialize, Serialize};

use crate::api::types::{EngineEvent, EventKind};

/// A caption or UI beat that fires once when the scene clock passes `at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// Seconds since the scene started.
    pub at: f32,
    /// Opaque key the UI maps to text.
    pub id: String,
}

impl Cue {
    pub fn new(at: f32, id: impl Into<String>) -> Self {
        Self { at, id: id.into() }
    }
}

/// Intro captions shown while the camera zooms in.
pub fn default_cues() -> Vec<Cue> {
    vec![
        Cue::new(0.5, "intro-welcome"),
        Cue::new(2.0, "intro-solar-system"),
        Cue::new(3.5, "intro-earth"),
    ]
}

/// Ordered cues plus a cursor. Cues fire in time order, each exactly once,
/// even if one step jumps past several of them.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    cues: Vec<Cue>,
    next: usize,
}

impl Timeline {
    /// Non-finite cue times are dropped; the rest are sorted by time.
    pub fn new(mut cues: Vec<Cue>) -> Self {
        let before = cues.len();
        cues.retain(|c| c.at.is_finite());
        if cues.len() != before {
            log::warn!("timeline: dropped {} cues with non-finite times", before - cues.len());
        }
        cues.sort_by(|a, b| a.at.total_cmp(&b.at));
        Self { cues, next: 0 }
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.cues.len()
    }

    /// Fire every cue whose time is at or before `now`.
    /// Events carry the cue's index in [`Timeline::cues`].
    pub fn advance(&mut self, now: f32, events: &mut Vec<EngineEvent>) {
        while let Some(cue) = self.cues.get(self.next) {
            if cue.at > now {
                break;
            }
            log::debug!("timeline: cue '{}' at {:.2}s", cue.id, now);
            events.push(EngineEvent::new(EventKind::NarrativeCue, self.next as f32, cue.at, 0.0));
            self.next += 1;
        }
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fired(events: &[EngineEvent]) -> Vec<f32> {
        events.iter().filter(|e| e.is(EventKind::NarrativeCue)).map(|e| e.a).collect()
    }

    #[test]
    fn cues_fire_once_in_order() {
        let mut timeline = Timeline::new(default_cues());
        let mut events = Vec::new();
        let mut now = 0.0;
        while now < 5.0 {
            now += 1.0 / 60.0;
            timeline.advance(now, &mut events);
        }
        assert_eq!(fired(&events), vec![0.0, 1.0, 2.0]);
        assert!(timeline.is_finished());
    }

    #[test]
    fn large_step_fires_all_passed_cues() {
        let mut timeline = Timeline::new(vec![Cue::new(3.0, "c"), Cue::new(1.0, "a"), Cue::new(2.0, "b")]);
        assert_eq!(timeline.cues()[0].id, "a");
        let mut events = Vec::new();
        timeline.advance(2.5, &mut events);
        assert_eq!(fired(&events), vec![0.0, 1.0]);
        timeline.advance(2.5, &mut events);
        assert_eq!(fired(&events).len(), 2);
    }

    #[test]
    fn reset_replays() {
        let mut timeline = Timeline::new(vec![Cue::new(0.0, "a"), Cue::new(f32::NAN, "bad")]);
        assert_eq!(timeline.cues().len(), 1);
        let mut events = Vec::new();
        timeline.advance(0.0, &mut events);
        timeline.reset();
        timeline.advance(0.0, &mut events);
        assert_eq!(fired(&events), vec![0.0, 0.0]);
    }
}
