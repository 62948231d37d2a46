//! Configuration for a guidance session

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::Error;

/// Output modality used to guide the hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuidanceMode {
    /// Vibrating glove pulses
    #[serde(alias = "glove")]
    Haptic,
    /// Spoken directions
    #[serde(alias = "voice")]
    Spoken,
    /// Distance-only tone
    #[serde(alias = "beep")]
    Tone,
    /// Visual feedback only
    None,
}

impl GuidanceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuidanceMode::Haptic => "haptic",
            GuidanceMode::Spoken => "spoken",
            GuidanceMode::Tone => "tone",
            GuidanceMode::None => "none",
        }
    }
}

impl std::str::FromStr for GuidanceMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "haptic" | "glove" => Ok(GuidanceMode::Haptic),
            "spoken" | "voice" => Ok(GuidanceMode::Spoken),
            "tone" | "beep" => Ok(GuidanceMode::Tone),
            "none" => Ok(GuidanceMode::None),
            other => Err(Error::Configuration(format!(
                "unknown guidance mode '{}' (expected haptic, spoken, tone or none)",
                other
            ))),
        }
    }
}

/// Camera capture settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// USB camera device index
    pub device_id: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device_id: 1,
            width: 640,
            height: 480,
        }
    }
}

/// Tracker loss policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Consecutive failed tracker updates tolerated before the target is Lost
    pub lost_after_failures: u32,
    /// Ticks spent Lost before the session gives up (0 = never)
    pub abandon_after_lost_ticks: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            lost_after_failures: 10,
            abandon_after_lost_ticks: 300,
        }
    }
}

/// Vibrating glove link
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HapticConfig {
    pub port: String,
    pub baud_rate: u32,
    /// Length of each directional pulse
    pub pulse_ms: u32,
}

impl Default for HapticConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 9600,
            pulse_ms: 200,
        }
    }
}

/// Distance to pitch mapping for tone guidance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneConfig {
    pub base_hz: f64,
    pub hz_per_px: f64,
    pub min_hz: u32,
    pub max_hz: u32,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            base_hz: 3000.0,
            hz_per_px: 3.0,
            min_hz: 200,
            max_hz: 3000,
        }
    }
}

/// Speech renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Program invoked to render utterances
    pub program: String,
    pub words_per_minute: u32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            program: "espeak-ng".to_string(),
            words_per_minute: 165,
        }
    }
}

/// Hand landmark model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkConfig {
    pub model_path: PathBuf,
    /// Hand presence score below which no landmarks are reported
    pub min_confidence: f32,
}

impl Default for LandmarkConfig {
    fn default() -> Self {
        let model_path = dirs::home_dir()
            .map(|mut p| {
                p.push(".surah");
                p.push("models");
                p.push("hand_landmark.onnx");
                p
            })
            .unwrap_or_else(|| PathBuf::from("./models/hand_landmark.onnx"));

        Self {
            model_path,
            min_confidence: 0.75,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub window_title: String,
    /// Run without a window
    pub headless: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_title: "Cam Feed".to_string(),
            headless: false,
        }
    }
}

/// Exit protocol timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Pause after asking the display to close
    pub display_settle_ms: u64,
    /// Interval between speech-busy polls while draining
    pub drain_poll_ms: u64,
    /// Upper bound on the drain wait
    pub drain_timeout_ms: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            display_settle_ms: 1000,
            drain_poll_ms: 100,
            drain_timeout_ms: 30_000,
        }
    }
}

/// Guidance session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceConfig {
    /// Pixel proximity at which the target counts as acquired
    pub target_tolerance_px: u32,
    /// Run the landmark model every N ticks
    pub detection_cadence_ticks: u32,
    /// Dispatch feedback every N ticks
    pub feedback_cadence_ticks: u32,
    pub guidance_mode: GuidanceMode,
    pub beep_duration_ms: u32,
    pub camera: CameraConfig,
    pub tracking: TrackingConfig,
    pub haptic: HapticConfig,
    pub tone: ToneConfig,
    pub speech: SpeechConfig,
    pub landmarks: LandmarkConfig,
    pub display: DisplayConfig,
    pub shutdown: ShutdownConfig,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            target_tolerance_px: 40,
            detection_cadence_ticks: 2,
            feedback_cadence_ticks: 10,
            guidance_mode: GuidanceMode::Spoken,
            beep_duration_ms: 200,
            camera: CameraConfig::default(),
            tracking: TrackingConfig::default(),
            haptic: HapticConfig::default(),
            tone: ToneConfig::default(),
            speech: SpeechConfig::default(),
            landmarks: LandmarkConfig::default(),
            display: DisplayConfig::default(),
            shutdown: ShutdownConfig::default(),
        }
    }
}

impl GuidanceConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        debug!("Loaded configuration from {:?}", path);
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, Error> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, Error> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Override selected fields from `SURAH_*` environment variables
    pub fn apply_env(&mut self) -> Result<(), Error> {
        if let Ok(mode) = std::env::var("SURAH_GUIDANCE_MODE") {
            self.guidance_mode = mode.parse()?;
        }

        if let Ok(id) = std::env::var("SURAH_CAMERA_ID") {
            self.camera.device_id = id.parse().map_err(|_| {
                Error::Configuration(format!("SURAH_CAMERA_ID must be an integer, got '{}'", id))
            })?;
        }

        if let Ok(port) = std::env::var("SURAH_HAPTIC_PORT") {
            self.haptic.port = port;
        }

        Ok(())
    }

    /// Ticks between feedback opportunities: the least common multiple of
    /// the detection and feedback cadences
    pub fn feedback_interval_ticks(&self) -> u64 {
        let detection = self.detection_cadence_ticks.max(1) as u64;
        let feedback = self.feedback_cadence_ticks.max(1) as u64;
        let (mut a, mut b) = (detection, feedback);
        while b != 0 {
            (a, b) = (b, a % b);
        }
        detection / a * feedback
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.target_tolerance_px == 0 {
            return Err("target_tolerance_px must be greater than zero".to_string());
        }

        if self.detection_cadence_ticks == 0 {
            return Err("detection_cadence_ticks must be at least 1".to_string());
        }

        if self.feedback_cadence_ticks == 0 {
            return Err("feedback_cadence_ticks must be at least 1".to_string());
        }

        // Feedback only runs on ticks that produced fresh landmarks
        if self.feedback_cadence_ticks % self.detection_cadence_ticks != 0 {
            warn!(
                "feedback_cadence_ticks ({}) is not a multiple of detection_cadence_ticks ({}); feedback fires every {} ticks",
                self.feedback_cadence_ticks,
                self.detection_cadence_ticks,
                self.feedback_interval_ticks()
            );
        }

        if self.camera.width == 0 || self.camera.height == 0 {
            return Err("Camera resolution must be non-zero".to_string());
        }

        if self.camera.width > 7680 || self.camera.height > 4320 {
            return Err("Camera resolution too large (max 8K)".to_string());
        }

        if self.camera.device_id > 100 {
            return Err("Camera ID too large (max 100)".to_string());
        }

        if self.tracking.lost_after_failures == 0 {
            return Err("tracking.lost_after_failures must be at least 1".to_string());
        }

        if self.guidance_mode == GuidanceMode::Tone {
            if self.beep_duration_ms == 0 {
                return Err("beep_duration_ms must be greater than zero".to_string());
            }
            if self.tone.min_hz == 0 || self.tone.min_hz > self.tone.max_hz {
                return Err(format!(
                    "tone range is invalid: min_hz {} max_hz {}",
                    self.tone.min_hz, self.tone.max_hz
                ));
            }
            if !self.tone.base_hz.is_finite() || !self.tone.hz_per_px.is_finite() {
                return Err("tone.base_hz and tone.hz_per_px must be finite".to_string());
            }
        }

        if self.guidance_mode == GuidanceMode::Haptic {
            if self.haptic.port.trim().is_empty() {
                return Err("haptic.port must be set for haptic guidance".to_string());
            }
            if self.haptic.pulse_ms == 0 {
                return Err("haptic.pulse_ms must be greater than zero".to_string());
            }
        }

        if self.guidance_mode == GuidanceMode::Spoken && self.speech.program.trim().is_empty() {
            return Err("speech.program must be set for spoken guidance".to_string());
        }

        if !(0.0..=1.0).contains(&self.landmarks.min_confidence) {
            return Err("landmarks.min_confidence must be between 0.0 and 1.0".to_string());
        }

        if self.shutdown.drain_poll_ms == 0 {
            return Err("shutdown.drain_poll_ms must be greater than zero".to_string());
        }

        Ok(())
    }
}
