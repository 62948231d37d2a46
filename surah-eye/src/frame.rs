//! Captured frames and their text annotations

use image::{Rgb, RgbImage};

/// A text annotation rendered by the sink on top of the pixels
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    /// Baseline origin in frame pixels
    pub origin: (i32, i32),
    pub color: Rgb<u8>,
}

impl Label {
    pub fn new(text: impl Into<String>, origin: (i32, i32), color: Rgb<u8>) -> Self {
        Self {
            text: text.into(),
            origin,
            color,
        }
    }
}

/// One camera image plus the annotations drawn on it this tick
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbImage,
    pub labels: Vec<Label>,
    /// Capture order, starting at 1
    pub sequence: u64,
}

impl Frame {
    pub fn new(image: RgbImage, sequence: u64) -> Self {
        Self {
            image,
            labels: Vec::new(),
            sequence,
        }
    }

    /// Solid black frame, mostly useful for tests and headless runs
    pub fn blank(width: u32, height: u32, sequence: u64) -> Self {
        Self::new(RgbImage::new(width, height), sequence)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn add_label(&mut self, label: Label) {
        self.labels.push(label);
    }
}
