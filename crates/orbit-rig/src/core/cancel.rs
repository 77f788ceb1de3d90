//! Scene cancellation.
//!
//! The scene and whoever unmounts it share one token. Every step checks it
//! first, so nothing keeps writing a camera pose after the page has moved on.

use std::cell::Cell;
use std::rc::Rc;

/// Single-threaded cancellation flag shared between a scene and its host.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}
