//! Hand landmark model back-ends

#[cfg(feature = "onnx")]
pub mod hand_landmark;

pub mod decode;

#[cfg(feature = "onnx")]
pub use hand_landmark::OnnxHandLandmarker;
