//! Single-object tracking of the selected target

use surah_core::BoundingBox;
use tracing::{debug, warn};

use crate::error::VisionError;
use crate::frame::Frame;

/// An opaque single-object visual tracker
#[cfg_attr(test, mockall::automock)]
pub trait VisualTracker: Send {
    fn init(&mut self, frame: &Frame, bbox: BoundingBox) -> Result<(), VisionError>;

    /// Advance one frame, returning the new box and whether tracking held
    fn update(&mut self, frame: &Frame) -> Result<(BoundingBox, bool), VisionError>;
}

/// Outcome of one tracker update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackUpdate {
    pub bbox: BoundingBox,
    pub success: bool,
}

/// Wraps a [`VisualTracker`] and owns the last known target box.
///
/// On a failed update the previous box is kept so callers can keep drawing
/// it while flagging the loss.
pub struct ObjectTracker {
    tracker: Box<dyn VisualTracker>,
    bbox: Option<BoundingBox>,
    initialized: bool,
}

impl ObjectTracker {
    pub fn new(tracker: Box<dyn VisualTracker>) -> Self {
        Self {
            tracker,
            bbox: None,
            initialized: false,
        }
    }

    /// Seed the tracker with the selection
    pub fn initialize(&mut self, frame: &Frame, bbox: BoundingBox) -> Result<(), VisionError> {
        if bbox.is_degenerate() {
            return Err(VisionError::TrackerInit(format!("degenerate box {}", bbox)));
        }

        self.tracker
            .init(frame, bbox)
            .map_err(|e| match e {
                VisionError::TrackerInit(_) => e,
                other => VisionError::TrackerInit(other.to_string()),
            })?;

        self.bbox = Some(bbox);
        self.initialized = true;
        debug!("Tracker initialised on {}", bbox);
        Ok(())
    }

    /// Track one frame. Errors from the underlying tracker are reported as a
    /// failed update rather than propagated.
    pub fn update(&mut self, frame: &Frame) -> Result<TrackUpdate, VisionError> {
        let previous = match (self.initialized, self.bbox) {
            (true, Some(bbox)) => bbox,
            _ => return Err(VisionError::Tracking("tracker used before initialisation".to_string())),
        };

        let (bbox, success) = match self.tracker.update(frame) {
            Ok((bbox, true)) => (bbox, true),
            Ok((_, false)) => (previous, false),
            Err(e) => {
                warn!("Tracker update failed: {}", e);
                (previous, false)
            }
        };

        self.bbox = Some(bbox);
        Ok(TrackUpdate { bbox, success })
    }
}

#[cfg(feature = "opencv")]
pub use mil::OpenCvTracker;

#[cfg(feature = "opencv")]
mod mil {
    use opencv::{
        core::{Ptr, Rect},
        prelude::*,
        video::{TrackerMIL, TrackerMIL_Params},
    };
    use surah_core::BoundingBox;

    use super::VisualTracker;
    use crate::error::VisionError;
    use crate::frame::Frame;
    use crate::utils::frame_to_bgr_mat;

    /// OpenCV's MIL tracker
    pub struct OpenCvTracker {
        inner: Option<Ptr<TrackerMIL>>,
    }

    impl OpenCvTracker {
        pub fn new() -> Self {
            Self { inner: None }
        }
    }

    impl Default for OpenCvTracker {
        fn default() -> Self {
            Self::new()
        }
    }

    impl VisualTracker for OpenCvTracker {
        fn init(&mut self, frame: &Frame, bbox: BoundingBox) -> Result<(), VisionError> {
            let mat = frame_to_bgr_mat(frame)?;
            let mut tracker = TrackerMIL::create(TrackerMIL_Params::default()?)
                .map_err(|e| VisionError::TrackerInit(format!("Failed to create MIL tracker: {}", e)))?;
            let rect = Rect::new(bbox.x, bbox.y, bbox.width as i32, bbox.height as i32);
            tracker
                .init(&mat, rect)
                .map_err(|e| VisionError::TrackerInit(e.to_string()))?;
            self.inner = Some(tracker);
            Ok(())
        }

        fn update(&mut self, frame: &Frame) -> Result<(BoundingBox, bool), VisionError> {
            let tracker = self
                .inner
                .as_mut()
                .ok_or_else(|| VisionError::Tracking("MIL tracker not initialised".to_string()))?;
            let mat = frame_to_bgr_mat(frame)?;
            let mut rect = Rect::default();
            let ok = tracker
                .update(&mat, &mut rect)
                .map_err(|e| VisionError::Tracking(e.to_string()))?;
            let bbox = BoundingBox::from_f64(
                rect.x as f64,
                rect.y as f64,
                rect.width.max(0) as f64,
                rect.height.max(0) as f64,
            )?;
            Ok((bbox, ok))
        }
    }
}
