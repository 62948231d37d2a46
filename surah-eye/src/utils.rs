//! Conversions between OpenCV matrices and `image` buffers

use image::RgbImage;
use opencv::{core, imgproc, prelude::*};

use crate::error::VisionError;
use crate::frame::Frame;

/// Copy a BGR `CV_8UC3` matrix into an RGB image
pub fn bgr_mat_to_image(mat: &Mat) -> Result<RgbImage, VisionError> {
    let (width, height) = (mat.cols(), mat.rows());
    if width <= 0 || height <= 0 {
        return Err(VisionError::Camera("Invalid image dimensions".to_string()));
    }
    if mat.typ() != core::CV_8UC3 {
        return Err(VisionError::Camera(format!(
            "Unsupported frame type {} (expected 8-bit BGR)",
            mat.typ()
        )));
    }

    let mut rgb = Mat::default();
    imgproc::cvt_color(mat, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;
    let rgb = if rgb.is_continuous() { rgb } else { rgb.try_clone()? };

    let data = rgb.data_bytes()?.to_vec();
    RgbImage::from_raw(width as u32, height as u32, data)
        .ok_or_else(|| VisionError::Camera("Frame buffer size mismatch".to_string()))
}

/// Copy a frame's pixels into a fresh BGR matrix for OpenCV consumers
pub fn frame_to_bgr_mat(frame: &Frame) -> Result<Mat, VisionError> {
    let (width, height) = frame.dimensions();
    let mut rgb = Mat::new_rows_cols_with_default(
        height as i32,
        width as i32,
        core::CV_8UC3,
        core::Scalar::all(0.0),
    )?;
    rgb.data_bytes_mut()?.copy_from_slice(frame.image.as_raw());

    let mut bgr = Mat::default();
    imgproc::cvt_color(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR, 0)?;
    Ok(bgr)
}
