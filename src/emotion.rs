//! Emotion detection
//!
//! Maps per-hand motion features (plus an optional coarse gesture hint) to a
//! discrete emotion label. Two layers:
//! - a pure, priority-ordered rule list; first matching rule wins
//! - a per-hand hysteresis state machine that only confirms a new label after
//!   it has been re-observed continuously for the configured delay
//!
//! Gesture hints short-circuit the motion rules: a closed fist always reads
//! as anger, an open palm reads as rest/joy depending on tempo.

use crate::config::{AnalysisConfig, EmotionConfig, MotionConfig};
use crate::schema::GestureReport;
use crate::types::{Emotion, EmotionState, HandId, MotionSnapshot, PendingEmotion, Vec2};
use std::collections::HashMap;

/// Detections below this confidence never alter the state machine.
const MIN_DETECTION_CONFIDENCE: f64 = 0.5;

/// Speeds below this floor count as standing still.
const IDLE_SPEED_FLOOR: f64 = 0.005;

/// How far direction.y must point downward for the sadness rule.
const SADNESS_DOWNWARD_MIN: f64 = 0.5;

/// One rule's verdict: a label and how sure the rule is about it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub emotion: Emotion,
    pub confidence: f64,
}

/// Everything a detection rule is allowed to look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub speed: f64,
    pub jerk: f64,
    pub direction: Vec2,
    pub circular_score: f64,
    pub closed_fist: bool,
    pub open_palm: bool,
    pub thresholds: &'a MotionConfig,
}

type DetectionRule = fn(&RuleInput) -> Option<Detection>;

/// Detection rules in priority order; the first match wins.
///
/// The open-palm/circular rule sits after the open-palm tempo rule on
/// purpose: it only fires in the tempo rule's middle speed band.
const DETECTION_RULES: &[DetectionRule] = &[
    rule_closed_fist,
    rule_open_palm_tempo,
    rule_open_palm_circular,
    rule_fast_horizontal,
    rule_slow_downward,
    rule_circular_smooth,
    rule_trembling,
    rule_idle,
];

/// Closed fist is the strongest signal; it overrides all motion heuristics.
fn rule_closed_fist(input: &RuleInput) -> Option<Detection> {
    if input.closed_fist {
        return Some(Detection {
            emotion: Emotion::Anger,
            confidence: 0.95,
        });
    }
    None
}

/// Open palm reads by tempo: still hand is at rest, fast hand is joyful.
fn rule_open_palm_tempo(input: &RuleInput) -> Option<Detection> {
    if !input.open_palm {
        return None;
    }
    if input.speed < input.thresholds.velocity_low {
        return Some(Detection {
            emotion: Emotion::Rest,
            confidence: 0.85,
        });
    }
    if input.speed > input.thresholds.velocity_high {
        return Some(Detection {
            emotion: Emotion::Joy,
            confidence: 0.85,
        });
    }
    None
}

/// Open palm sweeping a moderate circle.
fn rule_open_palm_circular(input: &RuleInput) -> Option<Detection> {
    if input.open_palm && input.circular_score > input.thresholds.circular_threshold * 0.5 {
        return Some(Detection {
            emotion: Emotion::Calm,
            confidence: 0.8,
        });
    }
    None
}

/// Fast, abrupt, predominantly horizontal motion.
fn rule_fast_horizontal(input: &RuleInput) -> Option<Detection> {
    if input.speed > input.thresholds.velocity_high && input.jerk > input.thresholds.jerk_high {
        let is_horizontal = input.direction.x.abs() > input.direction.y.abs();
        if is_horizontal {
            return Some(Detection {
                emotion: Emotion::Anger,
                confidence: 0.85,
            });
        }
    }
    None
}

/// Slow sinking motion. Positive y points downward in image space.
fn rule_slow_downward(input: &RuleInput) -> Option<Detection> {
    if input.speed < input.thresholds.velocity_low
        && input.speed > IDLE_SPEED_FLOOR
        && input.direction.y > SADNESS_DOWNWARD_MIN
    {
        return Some(Detection {
            emotion: Emotion::Sadness,
            confidence: 0.8,
        });
    }
    None
}

/// Smooth circular pattern.
fn rule_circular_smooth(input: &RuleInput) -> Option<Detection> {
    if input.circular_score > input.thresholds.circular_threshold
        && input.jerk < input.thresholds.jerk_low
    {
        return Some(Detection {
            emotion: Emotion::Calm,
            confidence: 0.9,
        });
    }
    None
}

/// Trembling: high-frequency jerk without much displacement.
fn rule_trembling(input: &RuleInput) -> Option<Detection> {
    if input.jerk > input.thresholds.jerk_high && input.speed < input.thresholds.velocity_medium {
        return Some(Detection {
            emotion: Emotion::Fear,
            confidence: 0.7,
        });
    }
    None
}

/// Barely moving at all.
fn rule_idle(input: &RuleInput) -> Option<Detection> {
    if input.speed < IDLE_SPEED_FLOOR {
        return Some(Detection {
            emotion: Emotion::Neutral,
            confidence: 0.5,
        });
    }
    None
}

/// Advance the hysteresis state machine by one observation.
///
/// Transitions:
/// - no detection: leave `current` alone; a stale pending candidate decays
///   after twice the delay
/// - detection equals `current`: drop any pending candidate, refresh confidence
/// - detection differs from both `current` and `pending`: (re)start the
///   pending timer under the new candidate
/// - detection equals `pending` for at least `delay_ms`: confirm the change
pub(crate) fn apply_hysteresis(
    state: &mut EmotionState,
    detected: Option<Detection>,
    now_ms: f64,
    delay_ms: f64,
) {
    let detected = match detected {
        Some(d) if d.confidence >= MIN_DETECTION_CONFIDENCE => d,
        _ => {
            if let Some(pending) = state.pending {
                if now_ms - pending.since_ms > delay_ms * 2.0 {
                    state.pending = None;
                }
            }
            return;
        }
    };

    if detected.emotion == state.current {
        state.pending = None;
        state.confidence = detected.confidence;
        return;
    }

    match state.pending {
        Some(pending) if pending.label == detected.emotion => {
            if now_ms - pending.since_ms >= delay_ms {
                state.previous = state.current;
                state.current = pending.label;
                state.pending = None;
                state.confidence = detected.confidence;
                state.transition_progress = 0.0;
            }
        }
        // A different (or first) candidate always restarts the timer
        _ => {
            state.pending = Some(PendingEmotion {
                label: detected.emotion,
                since_ms: now_ms,
            });
        }
    }
}

/// Per-hand emotion state machine front end.
#[derive(Debug, Clone)]
pub struct EmotionDetector {
    thresholds: MotionConfig,
    timing: EmotionConfig,
    states: HashMap<HandId, EmotionState>,
}

impl Default for EmotionDetector {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl EmotionDetector {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            thresholds: config.motion.clone(),
            timing: config.emotion.clone(),
            states: HashMap::new(),
        }
    }

    /// Swap in new thresholds and timing.
    pub fn set_config(&mut self, config: &AnalysisConfig) {
        self.thresholds = config.motion.clone();
        self.timing = config.emotion.clone();
    }

    /// Run the rule list against one motion snapshot. Pure; no state change.
    pub fn classify(
        &self,
        motion: &MotionSnapshot,
        gesture: Option<&GestureReport>,
    ) -> Option<Detection> {
        let input = RuleInput {
            speed: motion.velocity.magnitude,
            jerk: motion.jerk,
            direction: motion.direction,
            circular_score: motion.circular_score,
            closed_fist: gesture.map(GestureReport::is_closed_fist).unwrap_or(false),
            open_palm: gesture.map(GestureReport::is_open_palm).unwrap_or(false),
            thresholds: &self.thresholds,
        };

        DETECTION_RULES.iter().find_map(|rule| rule(&input))
    }

    /// Classify one hand's motion and fold the result through hysteresis.
    ///
    /// Returns the hand's state after the observation. State is created
    /// lazily per identity; a missing motion snapshot changes nothing.
    pub fn update(
        &mut self,
        hand: HandId,
        motion: Option<&MotionSnapshot>,
        gesture: Option<&GestureReport>,
        now_ms: f64,
    ) -> EmotionState {
        let delay_ms = self.timing.hysteresis_delay_ms;

        let detected = motion.and_then(|m| self.classify(m, gesture));

        let state = self.states.entry(hand).or_default();
        if motion.is_some() {
            apply_hysteresis(state, detected, now_ms, delay_ms);
        }
        state.clone()
    }

    /// Advance the visual cross-fade toward completion.
    pub fn update_transition(&mut self, hand: HandId, delta_time: f64) {
        let duration_ms = self.timing.transition_duration_ms;
        if let Some(state) = self.states.get_mut(&hand) {
            if state.transition_progress < 1.0 {
                state.transition_progress += (delta_time * 1000.0) / duration_ms;
                state.transition_progress = state.transition_progress.min(1.0);
            }
        }
    }

    /// Full state for one hand, if tracked.
    pub fn state(&self, hand: HandId) -> Option<&EmotionState> {
        self.states.get(&hand)
    }

    /// Confirmed emotion for one hand; neutral when untracked.
    pub fn current(&self, hand: HandId) -> Emotion {
        self.states
            .get(&hand)
            .map(|s| s.current)
            .unwrap_or(Emotion::Neutral)
    }

    /// Confirmed emotions for both slots.
    pub fn all_emotions(&self) -> (Emotion, Emotion) {
        (self.current(HandId::Left), self.current(HandId::Right))
    }

    /// The shared emotion when both hands agree on a non-neutral label,
    /// with the weaker of the two confidences.
    pub fn matching_emotion(&self) -> Option<(Emotion, f64)> {
        let left = self.states.get(&HandId::Left)?;
        let right = self.states.get(&HandId::Right)?;

        if left.current == right.current && !left.current.is_neutral() {
            Some((left.current, left.confidence.min(right.confidence)))
        } else {
            None
        }
    }

    /// Return one hand to neutral without discarding the slot.
    pub fn reset_hand(&mut self, hand: HandId) {
        if let Some(state) = self.states.get_mut(&hand) {
            state.current = Emotion::Neutral;
            state.pending = None;
            state.confidence = 1.0;
            state.transition_progress = 1.0;
        }
    }

    /// Return every hand to neutral.
    pub fn reset(&mut self) {
        let hands: Vec<HandId> = self.states.keys().copied().collect();
        for hand in hands {
            self.reset_hand(hand);
        }
    }

    /// Drop a hand's state entirely.
    pub fn remove_hand(&mut self, hand: HandId) {
        self.states.remove(&hand);
    }
}
