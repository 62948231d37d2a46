//! Error types for surah-spk

use surah_core::Error as CoreError;
use thiserror::Error;

/// Feedback output errors
#[derive(Error, Debug)]
pub enum FeedbackError {
    /// The speech collaborator cannot report or render
    #[error("Speech unavailable: {0}")]
    SpeechUnavailable(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("Haptic device error: {0}")]
    Haptic(String),

    #[error("Tone device error: {0}")]
    Tone(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

#[cfg(feature = "serial")]
impl From<serialport::Error> for FeedbackError {
    fn from(err: serialport::Error) -> Self {
        FeedbackError::Haptic(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_error_display() {
        let err = FeedbackError::SpeechUnavailable("espeak-ng missing".to_string());
        assert_eq!(err.to_string(), "Speech unavailable: espeak-ng missing");
    }

    #[test]
    fn test_feedback_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err: FeedbackError = io_err.into();
        match err {
            FeedbackError::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }
}
