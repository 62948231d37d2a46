//! Direction votes: which way the hand must move on each axis

use serde::{Deserialize, Serialize};
use std::fmt;

/// Horizontal correction the hand needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizontal {
    Left,
    Right,
    /// Already within tolerance on this axis
    None,
}

/// Depth correction the hand needs (image y axis)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vertical {
    Forward,
    Backward,
    /// Already within tolerance on this axis
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectionVote {
    pub horizontal: Horizontal,
    pub vertical: Vertical,
}

impl DirectionVote {
    pub const fn new(horizontal: Horizontal, vertical: Vertical) -> Self {
        Self { horizontal, vertical }
    }

    /// Both axes inside the tolerance band
    pub fn is_centered(&self) -> bool {
        self.horizontal == Horizontal::None && self.vertical == Vertical::None
    }
}

impl Horizontal {
    pub fn word(self) -> &'static str {
        match self {
            Horizontal::Left => "left",
            Horizontal::Right => "right",
            Horizontal::None => "x coordinate acquired",
        }
    }
}

impl Vertical {
    pub fn word(self) -> &'static str {
        match self {
            Vertical::Forward => "forwards",
            Vertical::Backward => "backwards",
            Vertical::None => "y coordinate acquired",
        }
    }
}

impl fmt::Display for DirectionVote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x: {}, y: {}", self.horizontal.word(), self.vertical.word())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered() {
        assert!(DirectionVote::new(Horizontal::None, Vertical::None).is_centered());
        assert!(!DirectionVote::new(Horizontal::Left, Vertical::None).is_centered());
        assert!(!DirectionVote::new(Horizontal::None, Vertical::Forward).is_centered());
    }

    #[test]
    fn test_display() {
        let vote = DirectionVote::new(Horizontal::Right, Vertical::None);
        assert_eq!(vote.to_string(), "x: right, y: y coordinate acquired");
    }
}
