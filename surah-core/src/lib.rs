//! surah-core: shared data model for the Surah hand guidance system
//!
//! Holds the geometry the guidance loop passes between stages (target boxes,
//! hand landmarks, direction votes) and the configuration every crate reads.

pub mod config;
pub mod direction;
pub mod error;
pub mod geometry;

pub use config::{GuidanceConfig, GuidanceMode};
pub use direction::{DirectionVote, Horizontal, Vertical};
pub use error::{Error, Result};
pub use geometry::{BoundingBox, HandLandmark, Landmark, LandmarkSet};
