//! Pixel-space geometry shared by the tracker, the landmark model and the
//! distance engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Axis-aligned box in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Centre of the box, `(x + w/2, y + h/2)`
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Centre rounded to the nearest pixel, for drawing
    pub fn center_px(&self) -> (i32, i32) {
        let (cx, cy) = self.center();
        (cx.round() as i32, cy.round() as i32)
    }

    /// A box with no area cannot seed a tracker
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width.min(i32::MAX as u32) as i32)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height.min(i32::MAX as u32) as i32)
    }

    /// Build a box from floating point tracker output, truncating like the
    /// integer conversion the trackers report
    pub fn from_f64(x: f64, y: f64, width: f64, height: f64) -> Result<Self, Error> {
        if !x.is_finite() || !y.is_finite() || !width.is_finite() || !height.is_finite() {
            return Err(Error::InvalidGeometry("box coordinates must be finite".to_string()));
        }
        if width < 0.0 || height < 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "box dimensions must be non-negative, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            x: x as i32,
            y: y as i32,
            width: width as u32,
            height: height as u32,
        })
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x, self.y, self.width, self.height)
    }
}

/// Parses `x,y,w,h`
impl FromStr for BoundingBox {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(Error::InvalidGeometry(format!(
                "expected x,y,width,height, got '{}'",
                s
            )));
        }
        let parse_i = |v: &str| {
            v.parse::<i32>()
                .map_err(|e| Error::InvalidGeometry(format!("invalid coordinate '{}': {}", v, e)))
        };
        let parse_u = |v: &str| {
            v.parse::<u32>()
                .map_err(|e| Error::InvalidGeometry(format!("invalid dimension '{}': {}", v, e)))
        };
        Ok(Self {
            x: parse_i(parts[0])?,
            y: parse_i(parts[1])?,
            width: parse_u(parts[2])?,
            height: parse_u(parts[3])?,
        })
    }
}

/// The 21 hand keypoints reported by the landmark model, in model order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum HandLandmark {
    Wrist = 0,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyFingerMcp,
    PinkyFingerPip,
    PinkyFingerDip,
    PinkyFingerTip,
}

impl HandLandmark {
    pub const COUNT: usize = 21;

    pub const ALL: [HandLandmark; Self::COUNT] = [
        HandLandmark::Wrist,
        HandLandmark::ThumbCmc,
        HandLandmark::ThumbMcp,
        HandLandmark::ThumbIp,
        HandLandmark::ThumbTip,
        HandLandmark::IndexFingerMcp,
        HandLandmark::IndexFingerPip,
        HandLandmark::IndexFingerDip,
        HandLandmark::IndexFingerTip,
        HandLandmark::MiddleFingerMcp,
        HandLandmark::MiddleFingerPip,
        HandLandmark::MiddleFingerDip,
        HandLandmark::MiddleFingerTip,
        HandLandmark::RingFingerMcp,
        HandLandmark::RingFingerPip,
        HandLandmark::RingFingerDip,
        HandLandmark::RingFingerTip,
        HandLandmark::PinkyFingerMcp,
        HandLandmark::PinkyFingerPip,
        HandLandmark::PinkyFingerDip,
        HandLandmark::PinkyFingerTip,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            HandLandmark::Wrist => "wrist",
            HandLandmark::ThumbCmc => "thumb cmc",
            HandLandmark::ThumbMcp => "thumb mcp",
            HandLandmark::ThumbIp => "thumb ip",
            HandLandmark::ThumbTip => "thumb tip",
            HandLandmark::IndexFingerMcp => "index finger mcp",
            HandLandmark::IndexFingerPip => "index finger pip",
            HandLandmark::IndexFingerDip => "index finger dip",
            HandLandmark::IndexFingerTip => "index finger tip",
            HandLandmark::MiddleFingerMcp => "middle finger mcp",
            HandLandmark::MiddleFingerPip => "middle finger pip",
            HandLandmark::MiddleFingerDip => "middle finger dip",
            HandLandmark::MiddleFingerTip => "middle finger tip",
            HandLandmark::RingFingerMcp => "ring finger mcp",
            HandLandmark::RingFingerPip => "ring finger pip",
            HandLandmark::RingFingerDip => "ring finger dip",
            HandLandmark::RingFingerTip => "ring finger tip",
            HandLandmark::PinkyFingerMcp => "pinky finger mcp",
            HandLandmark::PinkyFingerPip => "pinky finger pip",
            HandLandmark::PinkyFingerDip => "pinky finger dip",
            HandLandmark::PinkyFingerTip => "pinky finger tip",
        }
    }
}

impl fmt::Display for HandLandmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single hand keypoint in frame pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Landmark {
    pub id: HandLandmark,
    pub x: i32,
    pub y: i32,
}

impl Landmark {
    pub const fn new(id: HandLandmark, x: i32, y: i32) -> Self {
        Self { id, x, y }
    }
}

/// Landmarks from one model invocation, in arrival order.
///
/// An empty set means no hand was in frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandmarkSet(Vec<Landmark>);

impl LandmarkSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Landmark> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Landmark] {
        &self.0
    }

    pub fn push(&mut self, landmark: Landmark) {
        self.0.push(landmark);
    }
}

impl From<Vec<Landmark>> for LandmarkSet {
    fn from(landmarks: Vec<Landmark>) -> Self {
        Self(landmarks)
    }
}

impl FromIterator<Landmark> for LandmarkSet {
    fn from_iter<I: IntoIterator<Item = Landmark>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a LandmarkSet {
    type Item = &'a Landmark;
    type IntoIter = std::slice::Iter<'a, Landmark>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
