//! Frame capture

use crate::error::VisionError;
use crate::frame::Frame;

/// Source of frames for the guidance loop
pub trait Camera: Send {
    /// Grab the next frame. An error here ends the session.
    fn read_frame(&mut self) -> Result<Frame, VisionError>;

    /// Release the device. Safe to call more than once.
    fn release(&mut self);
}

#[cfg(feature = "opencv")]
pub use usb::OpenCvCamera;

#[cfg(feature = "opencv")]
mod usb {
    use opencv::{
        core::Mat,
        prelude::*,
        videoio::{VideoCapture, CAP_ANY, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH},
    };
    use surah_core::config::CameraConfig;
    use tracing::{info, warn};

    use super::Camera;
    use crate::error::VisionError;
    use crate::frame::Frame;
    use crate::utils::bgr_mat_to_image;

    /// USB webcam through OpenCV's VideoCapture
    pub struct OpenCvCamera {
        device_id: u32,
        capture: Option<VideoCapture>,
        sequence: u64,
    }

    impl OpenCvCamera {
        /// Open and configure the camera
        pub fn open(config: &CameraConfig) -> Result<Self, VisionError> {
            let mut capture = VideoCapture::new(config.device_id as i32, CAP_ANY)
                .map_err(|e| VisionError::Camera(format!("Failed to open camera {}: {}", config.device_id, e)))?;

            if !capture
                .is_opened()
                .map_err(|e| VisionError::Camera(format!("Camera {} not opened: {}", config.device_id, e)))?
            {
                return Err(VisionError::Camera(format!("Camera {} failed to open", config.device_id)));
            }

            capture
                .set(CAP_PROP_FRAME_WIDTH, config.width as f64)
                .map_err(|e| VisionError::Camera(format!("Failed to set width: {}", e)))?;
            capture
                .set(CAP_PROP_FRAME_HEIGHT, config.height as f64)
                .map_err(|e| VisionError::Camera(format!("Failed to set height: {}", e)))?;

            info!("Camera {} initialized at {}x{}", config.device_id, config.width, config.height);

            Ok(Self {
                device_id: config.device_id,
                capture: Some(capture),
                sequence: 0,
            })
        }
    }

    impl Camera for OpenCvCamera {
        fn read_frame(&mut self) -> Result<Frame, VisionError> {
            let capture = self
                .capture
                .as_mut()
                .ok_or_else(|| VisionError::Camera("Camera has been released".to_string()))?;

            let mut mat = Mat::default();
            let grabbed = capture
                .read(&mut mat)
                .map_err(|e| VisionError::Camera(format!("Camera read error: {}", e)))?;
            if !grabbed || mat.empty() {
                return Err(VisionError::Camera(format!("Camera {} returned no frame", self.device_id)));
            }

            self.sequence += 1;
            Ok(Frame::new(bgr_mat_to_image(&mat)?, self.sequence))
        }

        fn release(&mut self) {
            if let Some(mut capture) = self.capture.take() {
                if let Err(e) = capture.release() {
                    warn!("Failed to release camera {}: {}", self.device_id, e);
                }
                info!("Camera {} released", self.device_id);
            }
        }
    }

    impl Drop for OpenCvCamera {
        fn drop(&mut self) {
            self.release();
        }
    }
}
