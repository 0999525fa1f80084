//! Two-hand interaction arbitration
//!
//! Classifies the pair of tracked hands into an interaction mode each frame:
//! - none: no hands
//! - solo: one hand
//! - create-and-catch: both hands, different emotions (the default pairing)
//! - amplify: both hands share the same non-neutral emotion
//! - fusion: hands held close together long enough, gated by a cooldown
//!
//! Mode is recomputed fresh every update; only the fusion dwell timer and
//! cooldown stamp persist between frames. Fusion always preempts amplify.

use crate::config::{MagnetFalloff, TwoHandConfig};
use crate::types::{HandId, InteractionMode, InteractionState, TrackedHand, Vec2};

/// Distances closer than this skip force computation entirely.
const MAGNET_CONTACT_EPSILON: f64 = 0.001;

/// Two-hand interaction state machine.
#[derive(Debug, Clone)]
pub struct TwoHandController {
    config: TwoHandConfig,

    left_pos: Option<Vec2>,
    right_pos: Option<Vec2>,

    fusion_pending: bool,
    fusion_start_ms: f64,
    last_fusion_ms: f64,

    mode: InteractionMode,
}

impl Default for TwoHandController {
    fn default() -> Self {
        Self::new(TwoHandConfig::default())
    }
}

impl TwoHandController {
    pub fn new(config: TwoHandConfig) -> Self {
        Self {
            config,
            left_pos: None,
            right_pos: None,
            fusion_pending: false,
            fusion_start_ms: 0.0,
            last_fusion_ms: f64::NEG_INFINITY,
            mode: InteractionMode::Solo,
        }
    }

    pub fn set_config(&mut self, config: TwoHandConfig) {
        self.config = config;
    }

    /// Arbitrate the interaction mode for this frame.
    pub fn update(
        &mut self,
        left: Option<TrackedHand>,
        right: Option<TrackedHand>,
        now_ms: f64,
    ) -> InteractionState {
        self.left_pos = left.map(|h| h.pos);
        self.right_pos = right.map(|h| h.pos);

        let state = match (left, right) {
            (None, None) => InteractionState::None,

            (Some(hand), None) => InteractionState::Solo {
                hand: HandId::Left,
                pos: hand.pos,
                emotion: hand.emotion,
            },
            (None, Some(hand)) => InteractionState::Solo {
                hand: HandId::Right,
                pos: hand.pos,
                emotion: hand.emotion,
            },

            (Some(left), Some(right)) => {
                let distance = left.pos.distance_to(right.pos);
                let emotions_match =
                    left.emotion == right.emotion && !left.emotion.is_neutral();

                if self.check_fusion(distance, now_ms) {
                    InteractionState::Fusion {
                        center: Vec2::midpoint(left.pos, right.pos),
                        left_emotion: left.emotion,
                        right_emotion: right.emotion,
                        emotions_match,
                    }
                } else {
                    let (source, magnet) = self.assign_roles(left, right);
                    if emotions_match {
                        InteractionState::Amplify {
                            source_pos: source.pos,
                            magnet_pos: magnet.pos,
                            emotion: left.emotion,
                            distance,
                        }
                    } else {
                        InteractionState::CreateAndCatch {
                            source_pos: source.pos,
                            magnet_pos: magnet.pos,
                            source_emotion: source.emotion,
                            magnet_emotion: magnet.emotion,
                            distance,
                        }
                    }
                }
            }
        };

        self.mode = state.mode();
        state
    }

    /// Distance between the hands, infinite unless both are present.
    pub fn hand_distance(&self) -> f64 {
        match (self.left_pos, self.right_pos) {
            (Some(left), Some(right)) => left.distance_to(right),
            _ => f64::INFINITY,
        }
    }

    /// Dwell progress toward a fusion trigger, 0 when no dwell is running.
    pub fn fusion_progress(&self, now_ms: f64) -> f64 {
        if !self.fusion_pending || self.config.fusion_hold_ms <= 0.0 {
            return 0.0;
        }
        ((now_ms - self.fusion_start_ms) / self.config.fusion_hold_ms).clamp(0.0, 1.0)
    }

    /// Position of the particle-creating hand, per the configured roles.
    pub fn source_pos(&self) -> Option<Vec2> {
        match self.config.source_hand {
            HandId::Left => self.left_pos,
            HandId::Right => self.right_pos,
        }
    }

    /// Position of the particle-catching hand.
    pub fn magnet_pos(&self) -> Option<Vec2> {
        match self.config.magnet_hand {
            HandId::Left => self.left_pos,
            HandId::Right => self.right_pos,
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn is_two_hand_mode(&self) -> bool {
        matches!(
            self.mode,
            InteractionMode::CreateAndCatch | InteractionMode::Amplify | InteractionMode::Fusion
        )
    }

    pub fn is_amplifying(&self) -> bool {
        self.mode == InteractionMode::Amplify
    }

    /// Clear positions and the fusion dwell/cooldown timers.
    pub fn reset(&mut self) {
        self.left_pos = None;
        self.right_pos = None;
        self.fusion_pending = false;
        self.fusion_start_ms = 0.0;
        self.last_fusion_ms = f64::NEG_INFINITY;
        self.mode = InteractionMode::Solo;
    }

    fn assign_roles(&self, left: TrackedHand, right: TrackedHand) -> (TrackedHand, TrackedHand) {
        match self.config.source_hand {
            HandId::Right => (right, left),
            HandId::Left => (left, right),
        }
    }

    /// Run the fusion dwell timer; true exactly when fusion triggers.
    ///
    /// The cooldown gate runs before the dwell timer is consulted; leaving
    /// the distance threshold resets the dwell.
    fn check_fusion(&mut self, distance: f64, now_ms: f64) -> bool {
        if now_ms - self.last_fusion_ms < self.config.fusion_cooldown_ms {
            return false;
        }

        if distance > self.config.fusion_distance {
            self.fusion_pending = false;
            return false;
        }

        if !self.fusion_pending {
            self.fusion_pending = true;
            self.fusion_start_ms = now_ms;
        }

        if now_ms - self.fusion_start_ms >= self.config.fusion_hold_ms {
            self.fusion_pending = false;
            self.last_fusion_ms = now_ms;
            return true;
        }

        false
    }
}

/// Pull force the magnet hand exerts at `distance`, or `None` outside its
/// radius. The falloff curve is selected by configuration.
pub fn magnet_force(config: &TwoHandConfig, distance: f64) -> Option<f64> {
    if distance > config.magnet_radius {
        return None;
    }
    if distance < MAGNET_CONTACT_EPSILON {
        return Some(0.0);
    }

    let normalized = distance / config.magnet_radius;
    let force = match config.magnet_falloff {
        MagnetFalloff::Linear => config.magnet_strength * (1.0 - normalized),
        MagnetFalloff::Exponential => config.magnet_strength * (-normalized * 3.0).exp(),
        MagnetFalloff::Inverse => config.magnet_strength / (distance * 10.0 + 0.1),
    };

    Some(force)
}
