//! Fixed announcements and direction utterances

use surah_core::{DirectionVote, Horizontal, Vertical};

/// Announcements outside of directional guidance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phrase {
    Acquired,
    GuidanceComplete,
    TrackLost,
    TrackRecovered,
}

impl Phrase {
    pub fn text(self) -> &'static str {
        match self {
            Phrase::Acquired => "Target acquired.",
            Phrase::GuidanceComplete => "Guidance complete. Returning to inner control loop.",
            Phrase::TrackLost => "Target lost.",
            Phrase::TrackRecovered => "Target found.",
        }
    }
}

/// One spoken direction: a single axis says just that axis, both axes say
/// the vertical word then the horizontal one.
pub fn utterance(vote: &DirectionVote) -> String {
    match (vote.horizontal, vote.vertical) {
        (Horizontal::None, v) => v.word().to_string(),
        (h, Vertical::None) => h.word().to_string(),
        (h, v) => format!("{} {}", v.word(), h.word()),
    }
}
