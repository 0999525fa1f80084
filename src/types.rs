//! Core types for the Limbus analysis pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! per-frame pipeline: motion snapshots, emotion states, two-hand interaction
//! states, and the encoded frame payload consumed by the rendering layer.

use serde::{Deserialize, Serialize};

/// Hand identity slot. At most two hands are tracked at a time; every
/// detection is assigned exactly one of these slots per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandId {
    Left,
    Right,
}

impl HandId {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandId::Left => "left",
            HandId::Right => "right",
        }
    }

    /// The other slot.
    pub fn opposite(&self) -> HandId {
        match self {
            HandId::Left => HandId::Right,
            HandId::Right => HandId::Left,
        }
    }
}

/// 2D point or vector in normalized [0,1] camera coordinates.
/// Y grows downward, matching the landmark model's image space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance_to(&self, other: Vec2) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(a: Vec2, b: Vec2) -> Vec2 {
        Vec2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    }
}

/// Discrete emotion labels produced by the detector.
///
/// `Rest` is an auxiliary label only reachable through the open-palm gesture
/// override; the motion-only rules resolve to the remaining labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Anger,
    Sadness,
    Calm,
    Joy,
    Fear,
    Rest,
    Neutral,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Anger => "anger",
            Emotion::Sadness => "sadness",
            Emotion::Calm => "calm",
            Emotion::Joy => "joy",
            Emotion::Fear => "fear",
            Emotion::Rest => "rest",
            Emotion::Neutral => "neutral",
        }
    }

    pub fn is_neutral(&self) -> bool {
        matches!(self, Emotion::Neutral)
    }
}

impl Default for Emotion {
    fn default() -> Self {
        Emotion::Neutral
    }
}

/// Smoothed velocity with its cached Euclidean norm.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
    pub magnitude: f64,
}

/// Per-hand motion features exported each frame.
///
/// Velocity and jerk stay at zero until at least two samples exist;
/// the circular score stays at zero until the trajectory buffer holds
/// enough points for pattern detection.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionSnapshot {
    /// EMA-smoothed velocity in normalized units per second
    pub velocity: Velocity,
    /// EMA-smoothed magnitude of velocity change per second
    pub jerk: f64,
    /// Unit vector of velocity, zeroed below a small magnitude floor
    pub direction: Vec2,
    /// How strongly the recent trajectory traces a circle (0-1)
    pub circular_score: f64,
    /// Number of samples currently buffered
    pub trajectory_len: usize,
}

/// A candidate emotion waiting out the hysteresis delay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingEmotion {
    pub label: Emotion,
    /// Monotonic timestamp at which this candidate was first observed
    pub since_ms: f64,
}

/// Per-hand emotion state machine output.
///
/// `current` only changes after `pending` has been continuously re-observed
/// for the configured hysteresis delay without interruption by a different
/// candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionState {
    /// Confirmed emotion label
    pub current: Emotion,
    /// Candidate awaiting confirmation, if any
    pub pending: Option<PendingEmotion>,
    /// Confidence of the last confirmed or re-observed detection (0-1)
    pub confidence: f64,
    /// Cross-fade progress toward the current label (0-1), consumer-side only
    pub transition_progress: f64,
    /// Label held before the most recent confirmed transition
    pub previous: Emotion,
}

impl Default for EmotionState {
    fn default() -> Self {
        Self {
            current: Emotion::Neutral,
            pending: None,
            confidence: 1.0,
            transition_progress: 0.0,
            previous: Emotion::Neutral,
        }
    }
}

/// Resolved position and emotion for one hand, as fed to the two-hand
/// controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackedHand {
    pub pos: Vec2,
    pub emotion: Emotion,
}

/// Interaction mode discriminant, for callers that only need the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    None,
    Solo,
    CreateAndCatch,
    Amplify,
    Fusion,
}

impl InteractionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionMode::None => "none",
            InteractionMode::Solo => "solo",
            InteractionMode::CreateAndCatch => "create_and_catch",
            InteractionMode::Amplify => "amplify",
            InteractionMode::Fusion => "fusion",
        }
    }
}

/// Two-hand interaction state, recomputed fresh each frame.
///
/// Source/magnet roles follow the configured role assignment (right creates
/// particles, left catches them, by default).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InteractionState {
    /// Neither hand present
    None,
    /// Exactly one hand present
    Solo {
        hand: HandId,
        pos: Vec2,
        emotion: Emotion,
    },
    /// Default two-hand mode: one hand creates, the other catches
    CreateAndCatch {
        source_pos: Vec2,
        magnet_pos: Vec2,
        source_emotion: Emotion,
        magnet_emotion: Emotion,
        distance: f64,
    },
    /// Both hands share the same non-neutral emotion
    Amplify {
        source_pos: Vec2,
        magnet_pos: Vec2,
        emotion: Emotion,
        distance: f64,
    },
    /// Hands held close together long enough, cooldown permitting
    Fusion {
        center: Vec2,
        left_emotion: Emotion,
        right_emotion: Emotion,
        emotions_match: bool,
    },
}

impl InteractionState {
    pub fn mode(&self) -> InteractionMode {
        match self {
            InteractionState::None => InteractionMode::None,
            InteractionState::Solo { .. } => InteractionMode::Solo,
            InteractionState::CreateAndCatch { .. } => InteractionMode::CreateAndCatch,
            InteractionState::Amplify { .. } => InteractionMode::Amplify,
            InteractionState::Fusion { .. } => InteractionMode::Fusion,
        }
    }

    pub fn is_two_hand(&self) -> bool {
        matches!(
            self.mode(),
            InteractionMode::CreateAndCatch | InteractionMode::Amplify | InteractionMode::Fusion
        )
    }

    pub fn is_amplifying(&self) -> bool {
        self.mode() == InteractionMode::Amplify
    }
}

impl Default for InteractionState {
    fn default() -> Self {
        InteractionState::None
    }
}

/// Complete analysis for one tracked hand in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandAnalysis {
    pub hand: HandId,
    /// Last known palm center, absent if no valid landmark set has been seen
    pub palm: Option<Vec2>,
    pub motion: MotionSnapshot,
    pub emotion: EmotionState,
}

/// Full output of one engine update: everything the rendering layer consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAnalysis {
    /// Monotonic frame timestamp in milliseconds
    pub timestamp_ms: f64,
    pub hands: Vec<HandAnalysis>,
    pub interaction: InteractionState,
}

/// Frame payload producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Frame payload provenance information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameProvenance {
    pub frame_timestamp_ms: f64,
    pub computed_at_utc: String,
}

/// Frame payload quality metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameQuality {
    /// Number of hands tracked this frame
    pub hands_tracked: usize,
    /// Minimum emotion confidence across tracked hands (1.0 when none)
    pub confidence: f64,
}

/// Complete encoded frame payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FramePayload {
    pub payload_version: String,
    pub producer: FrameProducer,
    pub provenance: FrameProvenance,
    pub quality: FrameQuality,
    pub analysis: FrameAnalysis,
}
