//! Feedback state machine and modality dispatch

use std::sync::Arc;
use surah_core::{DirectionVote, GuidanceConfig, GuidanceMode};
use surah_spk::haptic::pulses_for;
use surah_spk::phrases::utterance;
use surah_spk::{HapticCommand, HapticDevice, Phrase, SpeechOutput, ToneDevice, ToneMapping};
use tracing::{debug, info, warn};

use crate::clock::FrameClock;
use crate::distance::Closest;
use crate::error::GuidanceError;

/// Where a session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidancePhase {
    Guiding,
    /// Within tolerance; the notification has not gone out yet
    Acquired,
    /// Tracker failing; no directional guidance
    Lost,
    Terminated,
}

/// What the dispatcher sent on a tick
#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackAction {
    Haptic(Vec<HapticCommand>),
    Spoken(String),
    Tone { frequency_hz: u32, duration_ms: u32 },
    Announce(Phrase),
}

/// A fresh measurement from this tick's landmarks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub closest: Closest,
    pub vote: DirectionVote,
}

/// Output devices for the dispatcher. Only the device for the active mode
/// is required.
pub struct FeedbackOutputs {
    pub speech: Arc<dyn SpeechOutput>,
    pub haptic: Option<Box<dyn HapticDevice>>,
    pub tone: Option<Box<dyn ToneDevice>>,
}

pub struct FeedbackDispatcher {
    mode: GuidanceMode,
    tolerance: f64,
    feedback_cadence: u64,
    lost_after_failures: u32,
    pulse_ms: u32,
    beep_ms: u32,
    tone_mapping: ToneMapping,
    speech: Arc<dyn SpeechOutput>,
    haptic: Option<Box<dyn HapticDevice>>,
    tone: Option<Box<dyn ToneDevice>>,
    phase: GuidancePhase,
    consecutive_failures: u32,
    pending_notice: Option<Phrase>,
    speech_degraded: bool,
}

impl FeedbackDispatcher {
    pub fn new(config: &GuidanceConfig, outputs: FeedbackOutputs) -> Result<Self, GuidanceError> {
        match config.guidance_mode {
            GuidanceMode::Haptic if outputs.haptic.is_none() => {
                return Err(GuidanceError::Config("haptic guidance needs a glove".to_string()));
            }
            GuidanceMode::Tone if outputs.tone.is_none() => {
                return Err(GuidanceError::Config("tone guidance needs a tone device".to_string()));
            }
            _ => {}
        }

        Ok(Self {
            mode: config.guidance_mode,
            tolerance: config.target_tolerance_px as f64,
            feedback_cadence: config.feedback_cadence_ticks.max(1) as u64,
            lost_after_failures: config.tracking.lost_after_failures,
            pulse_ms: config.haptic.pulse_ms,
            beep_ms: config.beep_duration_ms,
            tone_mapping: ToneMapping::from_config(&config.tone),
            speech: outputs.speech,
            haptic: outputs.haptic,
            tone: outputs.tone,
            phase: GuidancePhase::Guiding,
            consecutive_failures: 0,
            pending_notice: None,
            speech_degraded: false,
        })
    }

    pub fn phase(&self) -> GuidancePhase {
        self.phase
    }

    /// Feed one tracker result into the Lost/Guiding transitions
    pub fn observe_tracking(&mut self, success: bool) -> GuidancePhase {
        if success {
            self.consecutive_failures = 0;
            if self.phase == GuidancePhase::Lost {
                info!("Target found, resuming guidance");
                self.phase = GuidancePhase::Guiding;
                self.pending_notice = Some(Phrase::TrackRecovered);
            }
        } else {
            self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            if self.phase == GuidancePhase::Guiding && self.consecutive_failures > self.lost_after_failures {
                warn!(
                    "{}",
                    GuidanceError::TrackLost(self.consecutive_failures)
                );
                self.phase = GuidancePhase::Lost;
                self.pending_notice = Some(Phrase::TrackLost);
            }
        }
        self.phase
    }

    /// End the session without an acquisition
    pub fn terminate(&mut self) {
        self.phase = GuidancePhase::Terminated;
    }

    /// Non-blocking busy poll. An unavailable speech collaborator counts as
    /// idle so guidance keeps going.
    pub fn speech_busy(&mut self) -> bool {
        match self.speech.is_busy() {
            Ok(busy) => busy,
            Err(e) => {
                if !self.speech_degraded {
                    warn!("Speech busy signal unavailable, gating disabled: {}", e);
                    self.speech_degraded = true;
                }
                false
            }
        }
    }

    /// Advance the state machine for one tick, sending at most one action.
    ///
    /// `observation` is present only on landmark ticks with a hand in view.
    /// Directional feedback waits for the clock's feedback cadence.
    pub fn step(
        &mut self,
        clock: &FrameClock,
        observation: Option<&Observation>,
    ) -> Result<Option<FeedbackAction>, GuidanceError> {
        if let (GuidancePhase::Guiding, Some(obs)) = (self.phase, observation) {
            if obs.closest.distance < self.tolerance {
                info!(
                    "Target acquired: {} at {:.1}px",
                    obs.closest.landmark.id, obs.closest.distance
                );
                self.phase = GuidancePhase::Acquired;
                self.pending_notice = None;
            }
        }

        match self.phase {
            GuidancePhase::Terminated => Ok(None),
            GuidancePhase::Acquired => {
                if self.speech_busy() {
                    return Ok(None);
                }
                self.phase = GuidancePhase::Terminated;
                self.announce(Phrase::Acquired)?;
                Ok(Some(FeedbackAction::Announce(Phrase::Acquired)))
            }
            GuidancePhase::Lost | GuidancePhase::Guiding => {
                if let Some(phrase) = self.pending_notice {
                    if self.speech_busy() {
                        return Ok(None);
                    }
                    self.pending_notice = None;
                    self.announce(phrase)?;
                    return Ok(Some(FeedbackAction::Announce(phrase)));
                }

                match (self.phase, observation) {
                    (GuidancePhase::Guiding, Some(obs)) if clock.on_cadence(self.feedback_cadence) => {
                        if self.speech_busy() {
                            debug!("Speech busy, skipping feedback on tick {}", clock.count());
                            return Ok(None);
                        }
                        self.guide(obs)
                    }
                    _ => Ok(None),
                }
            }
        }
    }

    fn guide(&mut self, obs: &Observation) -> Result<Option<FeedbackAction>, GuidanceError> {
        debug!("{}", obs.vote);
        match self.mode {
            GuidanceMode::Haptic => {
                let pulses = pulses_for(&obs.vote, self.pulse_ms);
                if pulses.is_empty() {
                    return Ok(None);
                }
                let glove = self
                    .haptic
                    .as_mut()
                    .ok_or_else(|| GuidanceError::Config("no glove attached".to_string()))?;
                for pulse in &pulses {
                    glove.send(&pulse.encode())?;
                }
                Ok(Some(FeedbackAction::Haptic(pulses)))
            }
            GuidanceMode::Spoken => {
                let text = utterance(&obs.vote);
                self.speech.say(&text, true)?;
                Ok(Some(FeedbackAction::Spoken(text)))
            }
            GuidanceMode::Tone => {
                let frequency_hz = self.tone_mapping.frequency_for(obs.closest.distance);
                let tone = self
                    .tone
                    .as_mut()
                    .ok_or_else(|| GuidanceError::Config("no tone device attached".to_string()))?;
                tone.beep(frequency_hz, self.beep_ms)?;
                Ok(Some(FeedbackAction::Tone {
                    frequency_hz,
                    duration_ms: self.beep_ms,
                }))
            }
            GuidanceMode::None => Ok(None),
        }
    }

    fn announce(&self, phrase: Phrase) -> Result<(), GuidanceError> {
        if self.mode == GuidanceMode::None {
            info!("{}", phrase.text());
            return Ok(());
        }
        match self.speech.say(phrase.text(), true) {
            Ok(()) => Ok(()),
            // Nothing to gate on and nothing to say with; the state still moves
            Err(surah_spk::FeedbackError::SpeechUnavailable(_)) => {
                info!("{}", phrase.text());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Close the glove link, if any
    pub fn close(&mut self) {
        if let Some(glove) = self.haptic.as_mut() {
            glove.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use mockall::predicate::eq;
    use surah_core::{BoundingBox, HandLandmark, Horizontal, Landmark, Vertical};
    use surah_spk::FeedbackError;

    use crate::distance::{closest, direction};

    mock! {
        Speech {}
        impl SpeechOutput for Speech {
            fn is_busy(&self) -> Result<bool, FeedbackError>;
            fn say(&self, text: &str, background: bool) -> Result<(), FeedbackError>;
        }
    }

    mock! {
        Glove {}
        impl HapticDevice for Glove {
            fn send(&mut self, code: &str) -> Result<(), FeedbackError>;
            fn close(&mut self);
        }
    }

    mock! {
        Beeper {}
        impl ToneDevice for Beeper {
            fn beep(&mut self, frequency_hz: u32, duration_ms: u32) -> Result<(), FeedbackError>;
        }
    }

    fn config(mode: GuidanceMode) -> GuidanceConfig {
        GuidanceConfig {
            guidance_mode: mode,
            ..GuidanceConfig::default()
        }
    }

    fn observe(x: i32, y: i32, target: BoundingBox) -> Observation {
        let set = vec![Landmark::new(HandLandmark::IndexFingerTip, x, y)].into();
        let closest = closest(&set, &target).unwrap();
        let vote = direction(&closest.landmark, &target, 40);
        Observation { closest, vote }
    }

    fn at(count: u64) -> FrameClock {
        let mut clock = FrameClock::new();
        clock.start();
        for _ in 0..count {
            clock.tick();
        }
        clock
    }

    fn idle_speech() -> MockSpeech {
        let mut speech = MockSpeech::new();
        speech.expect_is_busy().returning(|| Ok(false));
        speech
    }

    fn dispatcher(mode: GuidanceMode, speech: MockSpeech) -> FeedbackDispatcher {
        FeedbackDispatcher::new(
            &config(mode),
            FeedbackOutputs {
                speech: Arc::new(speech),
                haptic: None,
                tone: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_missing_device_rejected() {
        let outputs = FeedbackOutputs {
            speech: Arc::new(idle_speech()),
            haptic: None,
            tone: None,
        };
        assert!(FeedbackDispatcher::new(&config(GuidanceMode::Haptic), outputs).is_err());
    }

    #[test]
    fn test_within_tolerance_acquires_then_terminates() {
        let mut speech = idle_speech();
        speech
            .expect_say()
            .with(eq("Target acquired."), eq(true))
            .times(1)
            .returning(|_, _| Ok(()));
        let mut d = dispatcher(GuidanceMode::Spoken, speech);

        let target = BoundingBox::new(100, 100, 50, 50);
        let action = d.step(&at(1), Some(&observe(120, 120, target))).unwrap();
        assert_eq!(action, Some(FeedbackAction::Announce(Phrase::Acquired)));
        assert_eq!(d.phase(), GuidancePhase::Terminated);
        assert_eq!(d.step(&at(10), Some(&observe(120, 120, target))).unwrap(), None);
    }

    #[test]
    fn test_acquired_notice_waits_for_speech() {
        let mut speech = MockSpeech::new();
        let mut polls = 0;
        speech.expect_is_busy().returning(move || {
            polls += 1;
            Ok(polls < 3)
        });
        speech.expect_say().times(1).returning(|_, _| Ok(()));
        let mut d = dispatcher(GuidanceMode::Spoken, speech);

        let target = BoundingBox::new(100, 100, 50, 50);
        assert_eq!(d.step(&at(0), Some(&observe(125, 125, target))).unwrap(), None);
        assert_eq!(d.phase(), GuidancePhase::Acquired);
        assert_eq!(d.step(&at(1), None).unwrap(), None);
        assert_eq!(
            d.step(&at(2), None).unwrap(),
            Some(FeedbackAction::Announce(Phrase::Acquired))
        );
        assert_eq!(d.phase(), GuidancePhase::Terminated);
    }

    #[test]
    fn test_at_tolerance_is_not_acquired() {
        let mut speech = idle_speech();
        speech.expect_say().returning(|_, _| Ok(()));
        let mut d = dispatcher(GuidanceMode::Spoken, speech);
        // Centre (125, 125), exactly 40px away
        let target = BoundingBox::new(100, 100, 50, 50);
        d.step(&at(0), Some(&observe(165, 125, target))).unwrap();
        assert_eq!(d.phase(), GuidancePhase::Guiding);
    }

    #[test]
    fn test_spoken_guidance_on_cadence_only() {
        let mut speech = idle_speech();
        speech
            .expect_say()
            .with(eq("left"), eq(true))
            .times(2)
            .returning(|_, _| Ok(()));
        let mut d = dispatcher(GuidanceMode::Spoken, speech);

        let target = BoundingBox::new(150, 150, 100, 100);
        let obs = observe(260, 200, target);
        let mut emitted = 0;
        for tick in 0..20 {
            if d.step(&at(tick), Some(&obs)).unwrap().is_some() {
                emitted += 1;
            }
        }
        assert_eq!(emitted, 2);
    }

    #[test]
    fn test_busy_speech_suppresses_guidance() {
        let mut speech = MockSpeech::new();
        speech.expect_is_busy().returning(|| Ok(true));
        speech.expect_say().never();
        let mut d = dispatcher(GuidanceMode::Spoken, speech);

        let target = BoundingBox::new(150, 150, 100, 100);
        for tick in 0..50 {
            assert_eq!(d.step(&at(tick), Some(&observe(400, 400, target))).unwrap(), None);
        }
    }

    #[test]
    fn test_unavailable_speech_does_not_stall() {
        let mut speech = MockSpeech::new();
        speech
            .expect_is_busy()
            .returning(|| Err(FeedbackError::SpeechUnavailable("gone".to_string())));
        speech.expect_say().never();

        let mut glove = MockGlove::new();
        glove.expect_send().times(2).returning(|_| Ok(()));
        let mut d = FeedbackDispatcher::new(
            &config(GuidanceMode::Haptic),
            FeedbackOutputs {
                speech: Arc::new(speech),
                haptic: Some(Box::new(glove)),
                tone: None,
            },
        )
        .unwrap();

        let target = BoundingBox::new(150, 150, 100, 100);
        let action = d.step(&at(0), Some(&observe(100, 300, target))).unwrap();
        assert!(matches!(action, Some(FeedbackAction::Haptic(ref p)) if p.len() == 2));
    }

    #[test]
    fn test_haptic_pulses_in_order() {
        let mut glove = MockGlove::new();
        let mut seq = mockall::Sequence::new();
        glove
            .expect_send()
            .with(eq("0100buzz200."))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        glove
            .expect_send()
            .with(eq("0010buzz200."))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        glove.expect_close().times(1).return_const(());

        let mut d = FeedbackDispatcher::new(
            &config(GuidanceMode::Haptic),
            FeedbackOutputs {
                speech: Arc::new(idle_speech()),
                haptic: Some(Box::new(glove)),
                tone: None,
            },
        )
        .unwrap();

        // Up and to the left of centre (200, 200)
        let target = BoundingBox::new(150, 150, 100, 100);
        d.step(&at(0), Some(&observe(100, 100, target))).unwrap();
        d.close();
    }

    #[test]
    fn test_tone_uses_distance() {
        let mut beeper = MockBeeper::new();
        beeper.expect_beep().with(eq(2700), eq(200)).times(1).returning(|_, _| Ok(()));

        let mut d = FeedbackDispatcher::new(
            &config(GuidanceMode::Tone),
            FeedbackOutputs {
                speech: Arc::new(idle_speech()),
                haptic: None,
                tone: Some(Box::new(beeper)),
            },
        )
        .unwrap();

        // Centre (200, 200), 100px right
        let target = BoundingBox::new(150, 150, 100, 100);
        let action = d.step(&at(0), Some(&observe(300, 200, target))).unwrap();
        assert_eq!(
            action,
            Some(FeedbackAction::Tone {
                frequency_hz: 2700,
                duration_ms: 200
            })
        );
    }

    #[test]
    fn test_lost_after_threshold_and_recovers() {
        let mut speech = idle_speech();
        speech
            .expect_say()
            .with(eq("Target lost."), eq(true))
            .times(1)
            .returning(|_, _| Ok(()));
        speech
            .expect_say()
            .with(eq("Target found."), eq(true))
            .times(1)
            .returning(|_, _| Ok(()));
        let mut d = dispatcher(GuidanceMode::Spoken, speech);
        let limit = GuidanceConfig::default().tracking.lost_after_failures;

        for _ in 0..limit {
            assert_eq!(d.observe_tracking(false), GuidancePhase::Guiding);
        }
        assert_eq!(d.observe_tracking(false), GuidancePhase::Lost);

        let target = BoundingBox::new(150, 150, 100, 100);
        let far = observe(400, 400, target);
        assert_eq!(
            d.step(&at(0), Some(&far)).unwrap(),
            Some(FeedbackAction::Announce(Phrase::TrackLost))
        );
        // No directional guidance or acquisition while lost
        assert_eq!(d.step(&at(10), Some(&far)).unwrap(), None);
        assert_eq!(d.step(&at(20), Some(&observe(200, 200, target))).unwrap(), None);
        assert_eq!(d.phase(), GuidancePhase::Lost);

        assert_eq!(d.observe_tracking(true), GuidancePhase::Guiding);
        assert_eq!(
            d.step(&at(21), None).unwrap(),
            Some(FeedbackAction::Announce(Phrase::TrackRecovered))
        );
    }

    #[test]
    fn test_none_mode_only_logs() {
        let mut speech = idle_speech();
        speech.expect_say().never();
        let mut d = dispatcher(GuidanceMode::None, speech);

        let target = BoundingBox::new(150, 150, 100, 100);
        assert_eq!(d.step(&at(0), Some(&observe(400, 400, target))).unwrap(), None);
        assert_eq!(
            d.step(&at(1), Some(&observe(200, 200, target))).unwrap(),
            Some(FeedbackAction::Announce(Phrase::Acquired))
        );
    }

    #[test]
    fn test_vote_with_settled_axis() {
        let target = BoundingBox::new(150, 150, 100, 100);
        let obs = observe(200, 300, target);
        assert_eq!(obs.vote, DirectionVote::new(Horizontal::None, Vertical::Forward));
    }
}
