//! 21-point hand landmark model run through ONNX Runtime

use image::imageops::{self, FilterType};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;
use surah_core::config::LandmarkConfig;
use surah_core::LandmarkSet;
use tracing::{debug, info};

use super::decode::{decode_landmarks, presence_probability};
use crate::error::VisionError;
use crate::frame::Frame;
use crate::landmarks::HandLandmarkModel;

/// Square input edge of the landmark model
const INPUT_SIZE: u32 = 224;

/// Hand landmark model. Expects NHWC `[1, 224, 224, 3]` RGB input in
/// `[0, 1]`; output 0 holds 21 × (x, y, z) in input pixels, output 1 the
/// hand presence score.
pub struct OnnxHandLandmarker {
    session: Session,
    min_confidence: f32,
}

impl OnnxHandLandmarker {
    pub fn new(model_path: &Path, min_confidence: f32) -> Result<Self, VisionError> {
        if !model_path.exists() {
            return Err(VisionError::Model(format!(
                "Hand landmark model not found at {:?}",
                model_path
            )));
        }

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(model_path)
            .map_err(|e| VisionError::Ort(format!("Failed to load hand landmark model: {}", e)))?;

        info!("Hand landmark model loaded from {:?}", model_path);

        Ok(Self {
            session,
            min_confidence,
        })
    }

    pub fn from_config(config: &LandmarkConfig) -> Result<Self, VisionError> {
        Self::new(&config.model_path, config.min_confidence)
    }

    fn preprocess(&self, frame: &Frame) -> Result<Tensor<f32>, VisionError> {
        let resized = imageops::resize(&frame.image, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);
        let data: Vec<f32> = resized.as_raw().iter().map(|&v| v as f32 / 255.0).collect();
        let shape = [1usize, INPUT_SIZE as usize, INPUT_SIZE as usize, 3];
        Ok(Tensor::from_array((shape, data))?)
    }
}

impl HandLandmarkModel for OnnxHandLandmarker {
    fn extract(&mut self, frame: &Frame) -> Result<LandmarkSet, VisionError> {
        let input = self.preprocess(frame)?;
        let outputs = self
            .session
            .run(ort::inputs![input])
            .map_err(|e| VisionError::Ort(format!("Hand landmark inference failed: {}", e)))?;

        if outputs.len() < 2 {
            return Err(VisionError::Model(format!(
                "Hand landmark model produced {} outputs, expected at least 2",
                outputs.len()
            )));
        }

        let (_, presence) = outputs[1].try_extract_tensor::<f32>()?;
        let score = presence
            .first()
            .map(|&raw| presence_probability(raw))
            .unwrap_or(0.0);
        if score < self.min_confidence {
            debug!("No hand in frame (presence {:.2})", score);
            return Ok(LandmarkSet::new());
        }

        let (_, coords) = outputs[0].try_extract_tensor::<f32>()?;
        decode_landmarks(coords, INPUT_SIZE, frame.dimensions())
    }
}
