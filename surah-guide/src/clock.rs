//! Frame counting, rate measurement and tick cadences

use std::time::Instant;

use crate::error::GuidanceError;

/// Counts loop iterations since `start`.
///
/// Cadence gates are pure modulus on the count, so they do not depend on
/// how fast frames actually arrive.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    started: Option<Instant>,
    count: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the origin and the counter
    pub fn start(&mut self) {
        self.started = Some(Instant::now());
        self.count = 0;
    }

    /// Record one occurrence, returning the new count
    pub fn tick(&mut self) -> u64 {
        self.count += 1;
        self.count
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Occurrences per second since `start`
    pub fn rate(&self) -> Result<f64, GuidanceError> {
        self.rate_at(Instant::now())
    }

    pub fn rate_at(&self, now: Instant) -> Result<f64, GuidanceError> {
        let started = self.started.ok_or(GuidanceError::DivisionUndefined)?;
        let secs = now.saturating_duration_since(started).as_secs_f64();
        if secs == 0.0 {
            return Ok(0.0);
        }
        Ok(self.count as f64 / secs)
    }

    /// True on every `every`-th count, including zero
    pub fn on_cadence(&self, every: u64) -> bool {
        every > 0 && self.count % every == 0
    }
}
