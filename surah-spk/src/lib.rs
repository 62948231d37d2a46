//! surah-spk: feedback outputs for hand guidance
//!
//! Provides the three guidance modalities and the speech busy signal:
//! - Spoken directions through an external speech program
//! - Haptic pulses on a vibrating glove (`serial` feature)
//! - Distance tones through the audio device (`audio` feature)

pub mod error;
pub mod haptic;
pub mod phrases;
pub mod speech;
pub mod tone;

pub use error::FeedbackError;
pub use haptic::{GloveLocation, HapticCommand, HapticDevice};
pub use phrases::Phrase;
pub use speech::{BusyGuard, BusySignal, CommandSpeech, MutedSpeech, SpeechOutput};
pub use tone::{ToneDevice, ToneMapping};

#[cfg(feature = "serial")]
pub use haptic::SerialGlove;
#[cfg(feature = "audio")]
pub use tone::CpalTone;
