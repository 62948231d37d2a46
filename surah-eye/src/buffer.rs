//! Single-slot frame hand-off between the guidance loop and the display

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::frame::Frame;

/// Holds only the most recent frame. Writers never block on readers and
/// unread frames are overwritten.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    slot: Mutex<Option<Arc<Frame>>>,
    stopped: AtomicBool,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current frame
    pub fn publish(&self, frame: Frame) {
        *self.slot.lock() = Some(Arc::new(frame));
    }

    /// The most recently published frame, if any
    pub fn latest(&self) -> Option<Arc<Frame>> {
        self.slot.lock().clone()
    }

    /// Ask the display side to finish. Idempotent.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}
