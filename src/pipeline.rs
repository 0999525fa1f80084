//! Pipeline orchestration
//!
//! `AnalysisEngine` is the public entry point: one `update` per rendered
//! frame, driving the stages in their required order:
//! 1. hand-identity assignment from handedness labels
//! 2. motion feature extraction per present hand
//! 3. emotion classification + transition ramp per present hand
//! 4. removal of hands absent from this frame (after processing, so a hand
//!    re-identified under another slot in the same frame is not reset)
//! 5. two-hand interaction arbitration
//!
//! All timing derives from the monotonic frame timestamps supplied by the
//! caller; the engine keeps no wall clock.

use crate::analyzer::MotionAnalyzer;
use crate::config::AnalysisConfig;
use crate::emotion::EmotionDetector;
use crate::interaction::TwoHandController;
use crate::schema::{HandDetection, RawFrame};
use crate::types::{FrameAnalysis, HandAnalysis, HandId, TrackedHand};

/// Only two identity slots exist; extra detections are dropped.
const MAX_HANDS: usize = 2;

/// Stateful analysis engine: motion, emotion, and interaction in one place.
#[derive(Debug, Clone)]
pub struct AnalysisEngine {
    config: AnalysisConfig,
    motion: MotionAnalyzer,
    emotion: EmotionDetector,
    interaction: TwoHandController,
    last_timestamp_ms: Option<f64>,
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisEngine {
    /// Create an engine with default settings.
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            motion: MotionAnalyzer::new(config.motion.clone()),
            emotion: EmotionDetector::new(&config),
            interaction: TwoHandController::new(config.two_hand.clone()),
            config,
            last_timestamp_ms: None,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Apply a new configuration to all components at runtime.
    pub fn set_config(&mut self, config: AnalysisConfig) {
        self.motion.set_config(config.motion.clone());
        self.emotion.set_config(&config);
        self.interaction.set_config(config.two_hand.clone());
        self.config = config;
    }

    /// Process one frame of detector output.
    ///
    /// Delta time comes from consecutive frame timestamps; the first frame
    /// (and any clock rewind) runs with a non-positive delta, which the
    /// motion layer absorbs as a no-op.
    pub fn update(&mut self, frame: &RawFrame) -> FrameAnalysis {
        let now_ms = frame.timestamp_ms;
        let delta_time = match self.last_timestamp_ms {
            Some(prev) => (now_ms - prev) / 1000.0,
            None => 0.0,
        };
        self.last_timestamp_ms = Some(now_ms);

        let assigned = assign_identities(&frame.hands);

        for (hand, detection) in &assigned {
            let snapshot = self
                .motion
                .update(*hand, &detection.landmarks, delta_time, now_ms);
            self.emotion
                .update(*hand, Some(&snapshot), detection.gesture.as_ref(), now_ms);
            self.emotion.update_transition(*hand, delta_time);
        }

        // Remove absent hands only after every present hand is processed
        for hand in [HandId::Left, HandId::Right] {
            if !assigned.iter().any(|(assigned_hand, _)| *assigned_hand == hand) {
                self.motion.remove_hand(hand);
                self.emotion.remove_hand(hand);
            }
        }

        let hands: Vec<HandAnalysis> = assigned
            .iter()
            .map(|(hand, _)| HandAnalysis {
                hand: *hand,
                palm: self.motion.position(*hand),
                motion: self.motion.snapshot(*hand).unwrap_or_default(),
                emotion: self
                    .emotion
                    .state(*hand)
                    .cloned()
                    .unwrap_or_default(),
            })
            .collect();

        let interaction = self.interaction.update(
            self.tracked_hand(HandId::Left),
            self.tracked_hand(HandId::Right),
            now_ms,
        );

        FrameAnalysis {
            timestamp_ms: now_ms,
            hands,
            interaction,
        }
    }

    /// Motion front end, for direct feature queries.
    pub fn motion(&self) -> &MotionAnalyzer {
        &self.motion
    }

    /// Emotion state machine, for direct state queries.
    pub fn emotion(&self) -> &EmotionDetector {
        &self.emotion
    }

    /// Interaction controller, for mode and fusion-progress queries.
    pub fn interaction(&self) -> &TwoHandController {
        &self.interaction
    }

    /// Discard all per-hand state and timers.
    pub fn reset(&mut self) {
        self.motion.remove_hand(HandId::Left);
        self.motion.remove_hand(HandId::Right);
        self.emotion.remove_hand(HandId::Left);
        self.emotion.remove_hand(HandId::Right);
        self.interaction.reset();
        self.last_timestamp_ms = None;
    }

    fn tracked_hand(&self, hand: HandId) -> Option<TrackedHand> {
        let pos = self.motion.position(hand)?;
        Some(TrackedHand {
            pos,
            emotion: self.emotion.current(hand),
        })
    }
}

/// Assign identity slots to this frame's detections.
///
/// The handedness label picks the slot; when a second detection claims an
/// already-taken (or the same) label, it is force-assigned the remaining
/// slot, right first. Detections past the second are ignored.
pub fn assign_identities(hands: &[HandDetection]) -> Vec<(HandId, &HandDetection)> {
    let mut assigned: Vec<(HandId, &HandDetection)> = Vec::new();

    for detection in hands.iter().take(MAX_HANDS) {
        let mut hand = HandId::from(detection.handedness.label);

        if assigned.iter().any(|(taken, _)| *taken == hand) {
            hand = if assigned.iter().any(|(taken, _)| *taken == HandId::Right) {
                HandId::Left
            } else {
                HandId::Right
            };
        }

        assigned.push((hand, detection));
    }

    assigned
}
