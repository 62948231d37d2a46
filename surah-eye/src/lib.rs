//! surah-eye: the visual half of hand guidance
//!
//! Captures frames, tracks the target object, extracts hand landmarks and
//! keeps an annotated view on screen. Hardware backends (OpenCV capture,
//! display and tracking, ONNX landmarks) sit behind the `opencv` and `onnx`
//! features; everything else works on plain `image` buffers.

pub mod buffer;
pub mod camera;
pub mod display;
pub mod error;
pub mod frame;
pub mod landmarks;
pub mod models;
pub mod overlay;
pub mod tracker;
#[cfg(feature = "opencv")]
mod utils;

pub use buffer::FrameBuffer;
pub use camera::Camera;
pub use display::{DisplayHandle, DisplayLoop, FrameSink, NullSink};
pub use error::VisionError;
pub use frame::{Frame, Label};
pub use landmarks::{HandLandmarkModel, LandmarkProvider};
pub use tracker::{ObjectTracker, VisualTracker};

#[cfg(feature = "opencv")]
pub use camera::OpenCvCamera;
#[cfg(feature = "opencv")]
pub use display::HighGuiSink;
#[cfg(feature = "opencv")]
pub use tracker::OpenCvTracker;
#[cfg(feature = "onnx")]
pub use models::OnnxHandLandmarker;
