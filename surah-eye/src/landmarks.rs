//! Cadence-gated hand landmark extraction

use surah_core::LandmarkSet;
use tracing::debug;

use crate::error::VisionError;
use crate::frame::Frame;

/// A hand landmark model. An empty set means no hand is in frame.
#[cfg_attr(test, mockall::automock)]
pub trait HandLandmarkModel: Send {
    fn extract(&mut self, frame: &Frame) -> Result<LandmarkSet, VisionError>;
}

/// Runs the model only on cadence ticks.
///
/// The caller's frame clock decides whether a tick is due for `cadence()`.
/// Skipped ticks yield `None`; no stale landmarks are carried over.
pub struct LandmarkProvider {
    model: Box<dyn HandLandmarkModel>,
    cadence: u64,
}

impl LandmarkProvider {
    pub fn new(model: Box<dyn HandLandmarkModel>, cadence: u32) -> Self {
        Self {
            model,
            cadence: cadence.max(1) as u64,
        }
    }

    pub fn cadence(&self) -> u64 {
        self.cadence
    }

    /// Landmarks for this tick, or `None` if the tick is not `due`
    pub fn poll(&mut self, due: bool, frame: &Frame) -> Result<Option<LandmarkSet>, VisionError> {
        if !due {
            return Ok(None);
        }
        let landmarks = self.model.extract(frame)?;
        debug!("Extracted {} landmarks from frame {}", landmarks.len(), frame.sequence);
        Ok(Some(landmarks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surah_core::{HandLandmark, Landmark};

    #[test]
    fn test_model_runs_only_when_due() {
        let mut model = MockHandLandmarkModel::new();
        model.expect_extract().times(2).returning(|_| {
            Ok(vec![Landmark::new(HandLandmark::Wrist, 5, 5)].into())
        });

        let mut provider = LandmarkProvider::new(Box::new(model), 2);
        let frame = Frame::blank(8, 8, 1);
        let due = [true, false, true, false];
        let results: Vec<_> = due.iter().map(|&d| provider.poll(d, &frame).unwrap()).collect();

        assert!(results[0].is_some());
        assert!(results[1].is_none());
        assert!(results[2].is_some());
        assert!(results[3].is_none());
    }

    #[test]
    fn test_empty_set_is_not_an_error() {
        let mut model = MockHandLandmarkModel::new();
        model.expect_extract().returning(|_| Ok(LandmarkSet::new()));
        let mut provider = LandmarkProvider::new(Box::new(model), 1);

        let set = provider.poll(true, &Frame::blank(8, 8, 1)).unwrap();
        assert_eq!(set, Some(LandmarkSet::new()));
    }

    #[test]
    fn test_zero_cadence_treated_as_every_tick() {
        let model = MockHandLandmarkModel::new();
        let provider = LandmarkProvider::new(Box::new(model), 0);
        assert_eq!(provider.cadence(), 1);
    }
}
