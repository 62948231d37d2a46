//! The guidance loop

use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use surah_core::{BoundingBox, GuidanceConfig, GuidanceMode, LandmarkSet};
use surah_eye::overlay;
use surah_eye::{
    Camera, DisplayHandle, DisplayLoop, FrameBuffer, FrameSink, HandLandmarkModel, LandmarkProvider,
    ObjectTracker, VisualTracker,
};
use surah_spk::{HapticDevice, Phrase, SpeechOutput, ToneDevice};
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::clock::FrameClock;
use crate::distance::{closest, direction};
use crate::error::GuidanceError;
use crate::feedback::{FeedbackDispatcher, FeedbackOutputs, GuidancePhase, Observation};
use crate::report::{SessionOutcome, SessionReport};
use crate::session::{ActiveFlag, GuidanceState};

/// Everything a session talks to, constructed by the caller and owned by
/// the orchestrator for the length of the session
pub struct Collaborators {
    pub camera: Box<dyn Camera>,
    pub tracker: Box<dyn VisualTracker>,
    pub landmarks: Box<dyn HandLandmarkModel>,
    pub speech: Arc<dyn SpeechOutput>,
    pub haptic: Option<Box<dyn HapticDevice>>,
    pub tone: Option<Box<dyn ToneDevice>>,
    pub sink: Box<dyn FrameSink>,
}

/// Runs one guidance session from selection to termination
pub struct GuidanceOrchestrator {
    config: GuidanceConfig,
    target_name: String,
    state: GuidanceState,
    clock: FrameClock,
    camera: Box<dyn Camera>,
    tracker: ObjectTracker,
    landmarks: LandmarkProvider,
    dispatcher: FeedbackDispatcher,
    speech: Arc<dyn SpeechOutput>,
    buffer: Arc<FrameBuffer>,
    sink: Option<Box<dyn FrameSink>>,
    lost_ticks: u64,
    last_distance: Option<f64>,
    outcome: Option<SessionOutcome>,
}

impl GuidanceOrchestrator {
    pub fn new(
        config: GuidanceConfig,
        collaborators: Collaborators,
        target: BoundingBox,
        target_name: impl Into<String>,
    ) -> Result<Self, GuidanceError> {
        config.validate().map_err(GuidanceError::Config)?;

        let dispatcher = FeedbackDispatcher::new(
            &config,
            FeedbackOutputs {
                speech: collaborators.speech.clone(),
                haptic: collaborators.haptic,
                tone: collaborators.tone,
            },
        )?;

        Ok(Self {
            landmarks: LandmarkProvider::new(collaborators.landmarks, config.detection_cadence_ticks),
            state: GuidanceState::new(target),
            clock: FrameClock::new(),
            camera: collaborators.camera,
            tracker: ObjectTracker::new(collaborators.tracker),
            dispatcher,
            speech: collaborators.speech,
            buffer: Arc::new(FrameBuffer::new()),
            sink: Some(collaborators.sink),
            lost_ticks: 0,
            last_distance: None,
            outcome: None,
            target_name: target_name.into(),
            config,
        })
    }

    /// Handle for stopping the session from another thread
    pub fn stop_handle(&self) -> ActiveFlag {
        self.state.stop_handle()
    }

    pub fn state(&self) -> &GuidanceState {
        &self.state
    }

    pub fn phase(&self) -> GuidancePhase {
        self.dispatcher.phase()
    }

    pub fn frame_buffer(&self) -> Arc<FrameBuffer> {
        self.buffer.clone()
    }

    /// Run the loop to completion, then the exit protocol
    pub fn run(&mut self) -> Result<SessionReport, GuidanceError> {
        let id = Uuid::new_v4();
        let span = info_span!("guidance", session = %id);
        let _enter = span.enter();

        let sink = self
            .sink
            .take()
            .ok_or_else(|| GuidanceError::Display("session already ran".to_string()))?;
        let display = DisplayLoop::new(self.buffer.clone(), self.state.stop_handle().shared())
            .spawn(sink)
            .map_err(|e| GuidanceError::Display(e.to_string()))?;

        info!(
            "Guiding to {} at {} in {} mode, feedback every {} ticks",
            self.target_name,
            self.state.target_box,
            self.config.guidance_mode.as_str(),
            self.config.feedback_interval_ticks()
        );
        let started_at = Utc::now();
        self.clock.start();

        let outcome = loop {
            if let Some(outcome) = self.outcome {
                break outcome;
            }
            if !self.state.is_active() {
                info!("Session stopped externally");
                break SessionOutcome::Stopped;
            }
            if self.buffer.is_stopped() {
                info!("Display closed, stopping guidance");
                break SessionOutcome::Stopped;
            }

            if let Err(e) = self.step() {
                error!("{}", e);
                break SessionOutcome::CaptureFailed;
            }
        };

        let frames = self.state.frame_count;
        let mean_rate = self.clock.rate().unwrap_or(0.0);
        self.shutdown(display);

        info!("Session ended: {} after {} frames", outcome, frames);
        Ok(SessionReport {
            id,
            outcome,
            frames,
            mean_rate,
            final_target: self.state.target_box,
            final_distance: self.last_distance,
            started_at,
            ended_at: Utc::now(),
        })
    }

    /// One loop iteration. Only a capture failure is returned as an error;
    /// everything else is absorbed into state.
    pub fn step(&mut self) -> Result<(), GuidanceError> {
        let tick = self.clock.count();

        let mut frame = match self.camera.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                self.dispatcher.terminate();
                self.state.deactivate();
                return Err(GuidanceError::CaptureFailure(e.to_string()));
            }
        };

        if !self.state.tracker_initialized {
            match self.tracker.initialize(&frame, self.state.target_box) {
                Ok(()) => self.state.tracker_initialized = true,
                Err(e) => warn!("{}", GuidanceError::TrackerInit(e.to_string())),
            }
        }

        let tracking = if self.state.tracker_initialized {
            match self.tracker.update(&frame) {
                Ok(update) => {
                    self.state.target_box = update.bbox;
                    update.success
                }
                Err(e) => {
                    warn!("Tracker update failed: {}", e);
                    false
                }
            }
        } else {
            false
        };

        let phase = self.dispatcher.observe_tracking(tracking);
        if phase == GuidancePhase::Lost {
            self.lost_ticks += 1;
            let limit = self.config.tracking.abandon_after_lost_ticks;
            if limit > 0 && self.lost_ticks >= limit {
                warn!("Target lost for {} ticks, abandoning guidance", self.lost_ticks);
                self.dispatcher.terminate();
                self.outcome = Some(SessionOutcome::TrackAbandoned);
            }
        } else {
            self.lost_ticks = 0;
        }

        let target = self.state.target_box;
        let due = self.clock.on_cadence(self.landmarks.cadence());
        let landmarks = match self.landmarks.poll(due, &frame) {
            Ok(set) => set,
            Err(e) => {
                warn!("Landmark extraction failed: {}", e);
                None
            }
        };
        let observation = landmarks.as_ref().and_then(|set| self.observe(set, &target));

        match self.dispatcher.step(&self.clock, observation.as_ref()) {
            Ok(Some(action)) => debug!("Feedback on tick {}: {:?}", tick, action),
            Ok(None) => {}
            Err(e) => warn!("Feedback failed on tick {}: {}", tick, e),
        }
        if self.dispatcher.phase() == GuidancePhase::Terminated {
            self.outcome.get_or_insert(SessionOutcome::Acquired);
            self.state.deactivate();
        }

        overlay::annotate_target(&mut frame, &target, &self.target_name, tracking);
        if let Some(set) = &landmarks {
            let closest = observation.as_ref().map(|o| &o.closest.landmark);
            overlay::annotate_landmarks(&mut frame, set.as_slice(), &target, closest);
        }
        if let Some(obs) = &observation {
            overlay::annotate_distance(&mut frame, obs.closest.distance);
        }
        overlay::annotate_rate(&mut frame, self.clock.rate().unwrap_or(0.0));
        self.buffer.publish(frame);

        self.clock.tick();
        self.state.frame_count += 1;
        Ok(())
    }

    fn observe(&mut self, set: &LandmarkSet, target: &BoundingBox) -> Option<Observation> {
        match closest(set, target) {
            Ok(closest) => {
                let vote = direction(&closest.landmark, target, self.config.target_tolerance_px as i32);
                debug!(
                    "Closest landmark {} at ({}, {}), {:.1}px from target",
                    closest.landmark.id, closest.landmark.x, closest.landmark.y, closest.distance
                );
                self.last_distance = Some(closest.distance);
                Some(Observation { closest, vote })
            }
            Err(GuidanceError::NoLandmarks) => {
                debug!("No hand in frame");
                None
            }
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    /// Stop the display, release the camera, wait out speech, then sign off
    fn shutdown(&mut self, display: DisplayHandle) {
        self.dispatcher.terminate();
        self.state.deactivate();
        display.stop();
        std::thread::sleep(Duration::from_millis(self.config.shutdown.display_settle_ms));
        if let Err(e) = display.join() {
            warn!("{}", e);
        }

        self.camera.release();
        self.drain_speech();

        if self.config.guidance_mode != GuidanceMode::None {
            if let Err(e) = self.speech.say(Phrase::GuidanceComplete.text(), false) {
                warn!("Could not announce completion: {}", e);
            }
        } else {
            info!("{}", Phrase::GuidanceComplete.text());
        }

        self.dispatcher.close();
    }

    /// Block until speech is idle, unavailable, or the drain timeout passes
    fn drain_speech(&self) {
        let poll = Duration::from_millis(self.config.shutdown.drain_poll_ms.max(1));
        let deadline = Instant::now() + Duration::from_millis(self.config.shutdown.drain_timeout_ms);

        loop {
            match self.speech.is_busy() {
                Ok(false) => break,
                Err(e) => {
                    debug!("Speech unavailable during drain: {}", e);
                    break;
                }
                Ok(true) if Instant::now() >= deadline => {
                    warn!("Speech still busy after drain timeout");
                    break;
                }
                Ok(true) => std::thread::sleep(poll),
            }
        }
    }
}
