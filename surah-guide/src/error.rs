//! Error types for surah-guide

use surah_core::Error as CoreError;
use surah_eye::VisionError;
use surah_spk::FeedbackError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuidanceError {
    /// Terminal: the camera produced no frame
    #[error("Capture failure: {0}")]
    CaptureFailure(String),

    #[error("Tracker initialization failed: {0}")]
    TrackerInit(String),

    #[error("Track lost after {0} consecutive failures")]
    TrackLost(u32),

    /// Expected when no hand is in frame
    #[error("No landmarks in frame")]
    NoLandmarks,

    #[error("Speech unavailable: {0}")]
    SpeechUnavailable(String),

    #[error("Rate undefined: clock not started")]
    DivisionUndefined,

    #[error("Vision error: {0}")]
    Vision(#[from] VisionError),

    #[error("Feedback error: {0}")]
    Feedback(FeedbackError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Display error: {0}")]
    Display(String),
}

impl From<FeedbackError> for GuidanceError {
    fn from(err: FeedbackError) -> Self {
        match err {
            FeedbackError::SpeechUnavailable(msg) => GuidanceError::SpeechUnavailable(msg),
            other => GuidanceError::Feedback(other),
        }
    }
}

impl From<CoreError> for GuidanceError {
    fn from(err: CoreError) -> Self {
        GuidanceError::Config(err.to_string())
    }
}

impl GuidanceError {
    /// Whether the session can carry on after this error
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, GuidanceError::CaptureFailure(_) | GuidanceError::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_unavailable_maps_through() {
        let err: GuidanceError = FeedbackError::SpeechUnavailable("espeak-ng".to_string()).into();
        assert!(matches!(err, GuidanceError::SpeechUnavailable(_)));

        let err: GuidanceError = FeedbackError::Haptic("port closed".to_string()).into();
        assert!(matches!(err, GuidanceError::Feedback(_)));
    }

    #[test]
    fn test_recoverability() {
        assert!(!GuidanceError::CaptureFailure("eof".to_string()).is_recoverable());
        assert!(GuidanceError::NoLandmarks.is_recoverable());
        assert!(GuidanceError::TrackLost(11).is_recoverable());
    }
}
