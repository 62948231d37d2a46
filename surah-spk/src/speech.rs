//! Speech output and the busy signal that gates overlapping feedback

use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use surah_core::config::SpeechConfig;
use tracing::{debug, info, warn};

use crate::error::FeedbackError;

/// Something that can speak and report whether it is still speaking
pub trait SpeechOutput: Send + Sync {
    /// Non-blocking check for an utterance still rendering or playing
    fn is_busy(&self) -> Result<bool, FeedbackError>;

    /// Speak `text`. With `background` the call returns once rendering has
    /// started; otherwise it returns when playback ends.
    fn say(&self, text: &str, background: bool) -> Result<(), FeedbackError>;
}

/// Shared count of in-flight utterances
#[derive(Debug, Clone, Default)]
pub struct BusySignal {
    in_flight: Arc<AtomicUsize>,
}

impl BusySignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Mark one utterance in flight until the guard drops
    pub fn acquire(&self) -> BusyGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        BusyGuard {
            in_flight: self.in_flight.clone(),
        }
    }
}

/// Clears its share of the busy signal on drop
#[derive(Debug)]
pub struct BusyGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Speech rendered by an external program such as `espeak-ng`
pub struct CommandSpeech {
    program: String,
    words_per_minute: u32,
    available: bool,
    busy: BusySignal,
}

impl CommandSpeech {
    pub fn new(config: &SpeechConfig) -> Self {
        let available = Command::new(&config.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok();

        if available {
            info!("Speech output using {}", config.program);
        } else {
            warn!("Speech program {} not found; spoken output disabled", config.program);
        }

        Self {
            program: config.program.clone(),
            words_per_minute: config.words_per_minute,
            available,
            busy: BusySignal::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    fn spawn(&self, text: &str) -> Result<Child, FeedbackError> {
        let rate_flag = match Path::new(&self.program).file_name().and_then(|n| n.to_str()) {
            Some("say") => "-r",
            _ => "-s",
        };

        Command::new(&self.program)
            .arg(rate_flag)
            .arg(self.words_per_minute.to_string())
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| FeedbackError::Speech(format!("Failed to start {}: {}", self.program, e)))
    }
}

/// Strip control characters and cap the length of an utterance
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control())
        .take(1000)
        .collect::<String>()
        .trim()
        .to_string()
}

impl SpeechOutput for CommandSpeech {
    fn is_busy(&self) -> Result<bool, FeedbackError> {
        if !self.available {
            return Err(FeedbackError::SpeechUnavailable(self.program.clone()));
        }
        Ok(self.busy.is_busy())
    }

    fn say(&self, text: &str, background: bool) -> Result<(), FeedbackError> {
        if !self.available {
            return Err(FeedbackError::SpeechUnavailable(self.program.clone()));
        }

        let text = sanitize(text);
        if text.is_empty() {
            return Err(FeedbackError::Speech("Text cannot be empty".to_string()));
        }

        let guard = self.busy.acquire();
        let mut child = self.spawn(&text)?;
        debug!("Speaking: {}", text);

        if background {
            std::thread::Builder::new()
                .name("surah-speech".to_string())
                .spawn(move || {
                    let _guard = guard;
                    match child.wait() {
                        Ok(status) if !status.success() => warn!("Speech exited with {}", status),
                        Err(e) => warn!("Speech wait failed: {}", e),
                        _ => {}
                    }
                })?;
            return Ok(());
        }

        let status = child.wait()?;
        drop(guard);
        if !status.success() {
            return Err(FeedbackError::Speech(format!("{} exited with {}", self.program, status)));
        }
        Ok(())
    }
}

/// Speech that only logs; never busy
#[derive(Debug, Clone, Default)]
pub struct MutedSpeech;

impl SpeechOutput for MutedSpeech {
    fn is_busy(&self) -> Result<bool, FeedbackError> {
        Ok(false)
    }

    fn say(&self, text: &str, _background: bool) -> Result<(), FeedbackError> {
        info!("(muted) {}", text);
        Ok(())
    }
}
