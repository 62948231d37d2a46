//! surah-guide: real-time hand guidance
//!
//! Once an object has been selected, the orchestrator repeatedly captures a
//! frame, tracks the object, finds the hand landmark nearest to it and
//! steers the hand there through haptic, spoken or tonal feedback until it
//! is within tolerance.

pub mod clock;
pub mod distance;
pub mod error;
pub mod feedback;
pub mod orchestrator;
pub mod report;
pub mod session;

pub use clock::FrameClock;
pub use distance::{closest, direction, Closest};
pub use error::GuidanceError;
pub use feedback::{FeedbackAction, FeedbackDispatcher, FeedbackOutputs, GuidancePhase, Observation};
pub use orchestrator::{Collaborators, GuidanceOrchestrator};
pub use report::{SessionOutcome, SessionReport};
pub use session::{ActiveFlag, GuidanceState};
