//! Distance tones

use surah_core::config::ToneConfig;

use crate::error::FeedbackError;

/// Linear distance to pitch map: closer is higher
#[derive(Debug, Clone, PartialEq)]
pub struct ToneMapping {
    base_hz: f64,
    hz_per_px: f64,
    min_hz: u32,
    max_hz: u32,
}

impl ToneMapping {
    pub fn new(base_hz: f64, hz_per_px: f64, min_hz: u32, max_hz: u32) -> Self {
        Self {
            base_hz,
            hz_per_px,
            min_hz: min_hz.min(max_hz),
            max_hz,
        }
    }

    pub fn from_config(config: &ToneConfig) -> Self {
        Self::new(config.base_hz, config.hz_per_px, config.min_hz, config.max_hz)
    }

    /// `base − k·distance`, clamped to the audible range
    pub fn frequency_for(&self, distance: f64) -> u32 {
        let raw = self.base_hz - self.hz_per_px * distance.max(0.0);
        if !raw.is_finite() {
            return self.min_hz;
        }
        raw.round().clamp(self.min_hz as f64, self.max_hz as f64) as u32
    }
}

impl Default for ToneMapping {
    fn default() -> Self {
        Self::from_config(&ToneConfig::default())
    }
}

/// Plays single tones
pub trait ToneDevice: Send {
    /// Play one tone, returning when it has finished
    fn beep(&mut self, frequency_hz: u32, duration_ms: u32) -> Result<(), FeedbackError>;
}

#[cfg(feature = "audio")]
pub use audio::CpalTone;

#[cfg(feature = "audio")]
mod audio {
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use std::time::Duration;
    use tracing::{debug, warn};

    use super::ToneDevice;
    use crate::error::FeedbackError;

    /// Sine tone on the default output device
    pub struct CpalTone {
        device: cpal::Device,
        config: cpal::StreamConfig,
    }

    impl CpalTone {
        pub fn open() -> Result<Self, FeedbackError> {
            let host = cpal::default_host();
            let device = host
                .default_output_device()
                .ok_or_else(|| FeedbackError::Tone("No audio output device".to_string()))?;
            let supported = device
                .default_output_config()
                .map_err(|e| FeedbackError::Tone(format!("No output config: {}", e)))?;
            if supported.sample_format() != cpal::SampleFormat::F32 {
                return Err(FeedbackError::Tone(format!(
                    "Unsupported sample format {:?}",
                    supported.sample_format()
                )));
            }
            Ok(Self {
                device,
                config: supported.into(),
            })
        }
    }

    impl ToneDevice for CpalTone {
        fn beep(&mut self, frequency_hz: u32, duration_ms: u32) -> Result<(), FeedbackError> {
            let sample_rate = self.config.sample_rate.0 as f32;
            let channels = self.config.channels as usize;
            let step = frequency_hz as f32 * 2.0 * std::f32::consts::PI / sample_rate;
            let mut phase = 0.0f32;

            let stream = self
                .device
                .build_output_stream(
                    &self.config,
                    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                        for frame in data.chunks_mut(channels) {
                            let sample = phase.sin() * 0.3;
                            phase = (phase + step) % (2.0 * std::f32::consts::PI);
                            for s in frame.iter_mut() {
                                *s = sample;
                            }
                        }
                    },
                    |err| warn!("Audio stream error: {}", err),
                    None,
                )
                .map_err(|e| FeedbackError::Tone(format!("Failed to build stream: {}", e)))?;

            stream
                .play()
                .map_err(|e| FeedbackError::Tone(format!("Failed to play tone: {}", e)))?;
            std::thread::sleep(Duration::from_millis(duration_ms as u64));
            debug!("Beep {}Hz for {}ms", frequency_hz, duration_ms);
            Ok(())
        }
    }
}
