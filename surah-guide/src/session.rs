//! Per-session guidance state

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use surah_core::BoundingBox;

/// The session's liveness flag. Cloned handles share one flag; any holder
/// may end the session, and the display thread reads it.
#[derive(Debug, Clone)]
pub struct ActiveFlag(Arc<AtomicBool>);

impl ActiveFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// End the session. Idempotent.
    pub fn deactivate(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// The underlying flag, for the display loop
    pub fn shared(&self) -> Arc<AtomicBool> {
        self.0.clone()
    }
}

impl Default for ActiveFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// State for one guidance session, written only by the orchestrator thread
#[derive(Debug)]
pub struct GuidanceState {
    pub target_box: BoundingBox,
    pub frame_count: u64,
    pub tracker_initialized: bool,
    active: ActiveFlag,
}

impl GuidanceState {
    pub fn new(target_box: BoundingBox) -> Self {
        Self::with_flag(target_box, ActiveFlag::new())
    }

    pub fn with_flag(target_box: BoundingBox, active: ActiveFlag) -> Self {
        Self {
            target_box,
            frame_count: 0,
            tracker_initialized: false,
            active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_active()
    }

    pub fn deactivate(&self) {
        self.active.deactivate();
    }

    /// A handle that can stop the session from another thread
    pub fn stop_handle(&self) -> ActiveFlag {
        self.active.clone()
    }
}
