//! Vibrating glove commands

use surah_core::{DirectionVote, Horizontal, Vertical};

use crate::error::FeedbackError;

/// Buzzer positions on the glove
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GloveLocation {
    Forward,
    Right,
    Backward,
    Left,
    ForwardRight,
    BackwardRight,
    BackwardLeft,
    ForwardLeft,
}

impl GloveLocation {
    /// Four-motor activation pattern understood by the glove firmware
    pub fn code(self) -> &'static str {
        match self {
            GloveLocation::Forward => "1000",
            GloveLocation::Right => "0100",
            GloveLocation::Backward => "0010",
            GloveLocation::Left => "0001",
            GloveLocation::ForwardRight => "1100",
            GloveLocation::BackwardRight => "0110",
            GloveLocation::BackwardLeft => "0011",
            GloveLocation::ForwardLeft => "1001",
        }
    }

    pub fn from_horizontal(h: Horizontal) -> Option<Self> {
        match h {
            Horizontal::Left => Some(GloveLocation::Left),
            Horizontal::Right => Some(GloveLocation::Right),
            Horizontal::None => None,
        }
    }

    pub fn from_vertical(v: Vertical) -> Option<Self> {
        match v {
            Vertical::Forward => Some(GloveLocation::Forward),
            Vertical::Backward => Some(GloveLocation::Backward),
            Vertical::None => None,
        }
    }
}

/// One pulse on one location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HapticCommand {
    pub location: GloveLocation,
    pub duration_ms: u32,
}

impl HapticCommand {
    pub fn new(location: GloveLocation, duration_ms: u32) -> Self {
        Self {
            location,
            duration_ms,
        }
    }

    /// Wire form, e.g. `0100buzz200.`
    pub fn encode(&self) -> String {
        format!("{}buzz{}.", self.location.code(), self.duration_ms)
    }
}

/// Pulses for a vote: horizontal first, then vertical, skipping settled axes
pub fn pulses_for(vote: &DirectionVote, duration_ms: u32) -> Vec<HapticCommand> {
    GloveLocation::from_horizontal(vote.horizontal)
        .into_iter()
        .chain(GloveLocation::from_vertical(vote.vertical))
        .map(|location| HapticCommand::new(location, duration_ms))
        .collect()
}

/// Fire-and-forget command channel to the glove
pub trait HapticDevice: Send {
    fn send(&mut self, code: &str) -> Result<(), FeedbackError>;

    fn close(&mut self) {}
}

#[cfg(feature = "serial")]
pub use serial::SerialGlove;

#[cfg(feature = "serial")]
mod serial {
    use serialport::SerialPort;
    use std::io::Write;
    use std::time::Duration;
    use surah_core::config::HapticConfig;
    use tracing::{debug, info};

    use super::HapticDevice;
    use crate::error::FeedbackError;

    /// Glove on a serial port
    pub struct SerialGlove {
        port_name: String,
        port: Option<Box<dyn SerialPort>>,
    }

    impl SerialGlove {
        pub fn open(config: &HapticConfig) -> Result<Self, FeedbackError> {
            let port = serialport::new(&config.port, config.baud_rate)
                .timeout(Duration::from_millis(100))
                .open()
                .map_err(|e| {
                    FeedbackError::Haptic(format!(
                        "Could not connect to glove on {}: {}. Check that it is switched on and charged.",
                        config.port, e
                    ))
                })?;
            info!("Glove connection opened on {}", config.port);

            Ok(Self {
                port_name: config.port.clone(),
                port: Some(port),
            })
        }
    }

    impl HapticDevice for SerialGlove {
        fn send(&mut self, code: &str) -> Result<(), FeedbackError> {
            let port = self
                .port
                .as_mut()
                .ok_or_else(|| FeedbackError::Haptic(format!("{} is closed", self.port_name)))?;
            port.write_all(code.as_bytes())?;
            debug!("Glove command {} sent", code);
            Ok(())
        }

        fn close(&mut self) {
            if self.port.take().is_some() {
                info!("Glove connection on {} closed", self.port_name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_codes() {
        assert_eq!(GloveLocation::Forward.code(), "1000");
        assert_eq!(GloveLocation::Right.code(), "0100");
        assert_eq!(GloveLocation::Backward.code(), "0010");
        assert_eq!(GloveLocation::Left.code(), "0001");
        assert_eq!(GloveLocation::ForwardRight.code(), "1100");
        assert_eq!(GloveLocation::BackwardRight.code(), "0110");
        assert_eq!(GloveLocation::BackwardLeft.code(), "0011");
        assert_eq!(GloveLocation::ForwardLeft.code(), "1001");
    }

    #[test]
    fn test_encode() {
        assert_eq!(HapticCommand::new(GloveLocation::Right, 200).encode(), "0100buzz200.");
    }

    #[test]
    fn test_pulses_horizontal_then_vertical() {
        let vote = DirectionVote::new(Horizontal::Left, Vertical::Backward);
        let codes: Vec<_> = pulses_for(&vote, 200).iter().map(|c| c.encode()).collect();
        assert_eq!(codes, vec!["0001buzz200.", "0010buzz200."]);
    }

    #[test]
    fn test_settled_axis_skipped() {
        let vote = DirectionVote::new(Horizontal::None, Vertical::Forward);
        assert_eq!(pulses_for(&vote, 150), vec![HapticCommand::new(GloveLocation::Forward, 150)]);
        assert!(pulses_for(&DirectionVote::new(Horizontal::None, Vertical::None), 150).is_empty());
    }
}
