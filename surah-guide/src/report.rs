//! Summary of a finished guidance session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use surah_core::BoundingBox;
use uuid::Uuid;

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    /// The hand reached the target
    Acquired,
    /// The user or caller stopped the session
    Stopped,
    /// The camera stopped producing frames
    CaptureFailed,
    /// The target stayed lost for too long
    TrackAbandoned,
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionOutcome::Acquired => "acquired",
            SessionOutcome::Stopped => "stopped",
            SessionOutcome::CaptureFailed => "capture failed",
            SessionOutcome::TrackAbandoned => "track abandoned",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub id: Uuid,
    pub outcome: SessionOutcome,
    pub frames: u64,
    /// Mean frames per second over the session
    pub mean_rate: f64,
    pub final_target: BoundingBox,
    /// Last measured hand distance, in pixels
    pub final_distance: Option<f64>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Session {}", self.id)?;
        writeln!(f, "  outcome:  {}", self.outcome)?;
        writeln!(f, "  frames:   {} ({:.1} fps)", self.frames, self.mean_rate)?;
        writeln!(f, "  target:   {}", self.final_target)?;
        if let Some(d) = self.final_distance {
            writeln!(f, "  distance: {:.0}px", d)?;
        }
        write!(
            f,
            "  duration: {:.1}s",
            (self.ended_at - self.started_at).num_milliseconds() as f64 / 1000.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_json() {
        let now = Utc::now();
        let report = SessionReport {
            id: Uuid::new_v4(),
            outcome: SessionOutcome::TrackAbandoned,
            frames: 42,
            mean_rate: 21.0,
            final_target: BoundingBox::new(1, 2, 3, 4),
            final_distance: None,
            started_at: now,
            ended_at: now,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"], "track_abandoned");
        assert_eq!(json["frames"], 42);
        assert!(report.to_string().contains("track abandoned"));
    }
}
