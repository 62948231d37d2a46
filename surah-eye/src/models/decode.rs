//! Decoding of raw 21-point hand model output into frame pixels

use surah_core::{HandLandmark, Landmark, LandmarkSet};

use crate::error::VisionError;

/// Values per landmark in the raw output (x, y, z)
pub const COORDS_PER_LANDMARK: usize = 3;

/// Convert a presence output to a probability. Some exports emit a logit.
pub fn presence_probability(raw: f32) -> f32 {
    if (0.0..=1.0).contains(&raw) {
        raw
    } else {
        1.0 / (1.0 + (-raw).exp())
    }
}

/// Scale model-space coordinates (`input_size` square) to a frame of
/// `frame_size`, keeping model order
pub fn decode_landmarks(
    coords: &[f32],
    input_size: u32,
    frame_size: (u32, u32),
) -> Result<LandmarkSet, VisionError> {
    let needed = HandLandmark::COUNT * COORDS_PER_LANDMARK;
    if coords.len() < needed {
        return Err(VisionError::Landmarks(format!(
            "expected at least {} landmark values, got {}",
            needed,
            coords.len()
        )));
    }
    if input_size == 0 {
        return Err(VisionError::Model("model input size cannot be zero".to_string()));
    }

    let sx = frame_size.0 as f32 / input_size as f32;
    let sy = frame_size.1 as f32 / input_size as f32;

    Ok(HandLandmark::ALL
        .iter()
        .zip(coords.chunks_exact(COORDS_PER_LANDMARK))
        .map(|(id, c)| Landmark::new(*id, (c[0] * sx).round() as i32, (c[1] * sy).round() as i32))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_scales_to_frame() {
        let mut coords = vec![0.0f32; 63];
        coords[0] = 112.0; // wrist x
        coords[1] = 56.0; // wrist y
        coords[8 * 3] = 224.0; // index finger tip x
        coords[8 * 3 + 1] = 224.0;

        let set = decode_landmarks(&coords, 224, (640, 480)).unwrap();
        assert_eq!(set.len(), 21);
        let wrist = set.as_slice()[0];
        assert_eq!((wrist.id, wrist.x, wrist.y), (HandLandmark::Wrist, 320, 120));
        let tip = set.as_slice()[8];
        assert_eq!((tip.id, tip.x, tip.y), (HandLandmark::IndexFingerTip, 640, 480));
    }

    #[test]
    fn test_decode_rejects_short_output() {
        let err = decode_landmarks(&[0.0; 10], 224, (640, 480)).unwrap_err();
        assert!(matches!(err, VisionError::Landmarks(_)));
    }

    #[test]
    fn test_presence_probability() {
        assert_eq!(presence_probability(0.8), 0.8);
        assert!(presence_probability(5.0) > 0.99);
        assert!(presence_probability(-5.0) < 0.01);
    }
}
