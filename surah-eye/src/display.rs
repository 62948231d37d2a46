//! Background display of the most recent frame

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::buffer::FrameBuffer;
use crate::error::VisionError;
use crate::frame::Frame;

/// Somewhere frames are shown
#[cfg_attr(test, mockall::automock)]
pub trait FrameSink: Send {
    fn render(&mut self, frame: &Frame) -> Result<(), VisionError>;

    /// Non-blocking check for a user quit request
    fn poll_quit(&mut self) -> Result<bool, VisionError>;

    fn close(&mut self) {}
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn render(&mut self, frame: &Frame) -> Result<(), VisionError> {
        (**self).render(frame)
    }

    fn poll_quit(&mut self) -> Result<bool, VisionError> {
        (**self).poll_quit()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Sink for headless runs: drops frames and idles briefly on each poll
#[derive(Debug, Clone)]
pub struct NullSink {
    idle: Duration,
}

impl NullSink {
    pub fn new(idle: Duration) -> Self {
        Self { idle }
    }
}

impl Default for NullSink {
    fn default() -> Self {
        Self::new(Duration::from_millis(10))
    }
}

impl FrameSink for NullSink {
    fn render(&mut self, _frame: &Frame) -> Result<(), VisionError> {
        Ok(())
    }

    fn poll_quit(&mut self) -> Result<bool, VisionError> {
        std::thread::sleep(self.idle);
        Ok(false)
    }
}

/// Runs a [`FrameSink`] on its own thread until the buffer is stopped, the
/// session goes inactive, or the user quits.
pub struct DisplayLoop {
    buffer: Arc<FrameBuffer>,
    active: Arc<AtomicBool>,
}

impl DisplayLoop {
    pub fn new(buffer: Arc<FrameBuffer>, active: Arc<AtomicBool>) -> Self {
        Self { buffer, active }
    }

    /// Start the display thread
    pub fn spawn<S>(self, sink: S) -> Result<DisplayHandle, VisionError>
    where
        S: FrameSink + 'static,
    {
        let buffer = self.buffer.clone();
        let handle = std::thread::Builder::new()
            .name("surah-display".to_string())
            .spawn(move || self.run(sink))
            .map_err(|e| VisionError::Display(format!("Failed to spawn display thread: {}", e)))?;

        info!("Display loop started");
        Ok(DisplayHandle {
            buffer,
            thread: Some(handle),
        })
    }

    /// The display loop body. Runs on the calling thread.
    pub fn run<S: FrameSink>(self, mut sink: S) {
        let mut last_rendered = None;

        while !self.buffer.is_stopped() && self.active.load(Ordering::SeqCst) {
            if let Some(frame) = self.buffer.latest() {
                if last_rendered != Some(frame.sequence) {
                    if let Err(e) = sink.render(&frame) {
                        error!("Display render failed: {}", e);
                        self.buffer.stop();
                        break;
                    }
                    last_rendered = Some(frame.sequence);
                }
            }

            match sink.poll_quit() {
                Ok(true) => {
                    info!("Quit requested from display");
                    self.buffer.stop();
                }
                Ok(false) => {}
                Err(e) => warn!("Display input poll failed: {}", e),
            }
        }

        sink.close();
        debug!("Display loop finished");
    }
}

/// Owner's handle on a running display thread
pub struct DisplayHandle {
    buffer: Arc<FrameBuffer>,
    thread: Option<JoinHandle<()>>,
}

impl DisplayHandle {
    /// Signal the display to finish, as if the user had quit
    pub fn stop(&self) {
        self.buffer.stop();
    }

    /// Wait for the display thread to exit
    pub fn join(mut self) -> Result<(), VisionError> {
        match self.thread.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| VisionError::Display("Display thread panicked".to_string())),
            None => Ok(()),
        }
    }
}

impl Drop for DisplayHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.thread.take() {
            self.buffer.stop();
            let _ = handle.join();
        }
    }
}

#[cfg(feature = "opencv")]
pub use window::HighGuiSink;

#[cfg(feature = "opencv")]
mod window {
    use opencv::{core, highgui, imgproc, prelude::*};

    use super::FrameSink;
    use crate::error::VisionError;
    use crate::frame::Frame;
    use crate::utils::frame_to_bgr_mat;

    /// OpenCV window; `q` quits
    pub struct HighGuiSink {
        window: String,
        open: bool,
    }

    impl HighGuiSink {
        pub fn new(window: impl Into<String>) -> Self {
            Self {
                window: window.into(),
                open: false,
            }
        }
    }

    impl FrameSink for HighGuiSink {
        fn render(&mut self, frame: &Frame) -> Result<(), VisionError> {
            if !self.open {
                highgui::named_window(&self.window, highgui::WINDOW_AUTOSIZE)?;
                self.open = true;
            }

            let mut mat = frame_to_bgr_mat(frame)?;
            for label in &frame.labels {
                let [r, g, b] = label.color.0;
                imgproc::put_text(
                    &mut mat,
                    &label.text,
                    core::Point::new(label.origin.0, label.origin.1),
                    imgproc::FONT_HERSHEY_SIMPLEX,
                    0.7,
                    core::Scalar::new(b as f64, g as f64, r as f64, 0.0),
                    1,
                    imgproc::LINE_8,
                    false,
                )?;
            }
            highgui::imshow(&self.window, &mat)?;
            Ok(())
        }

        fn poll_quit(&mut self) -> Result<bool, VisionError> {
            let key = highgui::wait_key(1)?;
            Ok(key == 'q' as i32)
        }

        fn close(&mut self) {
            if self.open {
                let _ = highgui::destroy_window(&self.window);
                self.open = false;
            }
        }
    }
}
