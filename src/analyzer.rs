//! Motion analysis coordinator
//!
//! Owns one `HandMotionState` per tracked hand identity, computes palm
//! centers from raw landmark sets, and answers cross-hand queries (inter-hand
//! distance, approach detection). Emotion classification happens downstream
//! in `EmotionDetector`; this module only does motion physics.

use crate::config::MotionConfig;
use crate::motion::HandMotionState;
use crate::schema::{self, Landmark};
use crate::types::{HandId, MotionSnapshot, Vec2};
use std::collections::HashMap;

/// Minimum x-velocity for the hands-approaching predicate.
const APPROACH_SPEED_FLOOR: f64 = 0.01;

/// Per-hand motion tracking front end.
#[derive(Debug, Clone)]
pub struct MotionAnalyzer {
    config: MotionConfig,
    states: HashMap<HandId, HandMotionState>,
}

impl Default for MotionAnalyzer {
    fn default() -> Self {
        Self::new(MotionConfig::default())
    }
}

impl MotionAnalyzer {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            config,
            states: HashMap::new(),
        }
    }

    /// Swap in new tuning values and propagate them to live hand states.
    pub fn set_config(&mut self, config: MotionConfig) {
        self.config = config;
        for state in self.states.values_mut() {
            state.set_config(&self.config);
        }
    }

    /// Update motion state for one hand from its raw landmark set.
    ///
    /// An undersized landmark set yields no palm center, which makes the
    /// underlying update a no-op returning the last valid snapshot. State is
    /// created lazily the first time an identity is seen.
    pub fn update(
        &mut self,
        hand: HandId,
        landmarks: &[Landmark],
        delta_time: f64,
        now_ms: f64,
    ) -> MotionSnapshot {
        let palm_center = self.palm_center(landmarks);

        let state = self
            .states
            .entry(hand)
            .or_insert_with(|| HandMotionState::new(&self.config));

        state.update(palm_center, delta_time, now_ms)
    }

    /// Palm center: arithmetic mean of the wrist + finger-base landmarks.
    /// `None` if the landmark set is undersized.
    pub fn palm_center(&self, landmarks: &[Landmark]) -> Option<Vec2> {
        if landmarks.len() < schema::LANDMARK_COUNT {
            return None;
        }
        schema::mean_of(landmarks, &self.config.palm_landmarks)
    }

    /// Feature snapshot for one hand, if tracked.
    pub fn snapshot(&self, hand: HandId) -> Option<MotionSnapshot> {
        self.states.get(&hand).map(HandMotionState::snapshot)
    }

    /// Snapshots for both slots.
    pub fn all_snapshots(&self) -> (Option<MotionSnapshot>, Option<MotionSnapshot>) {
        (self.snapshot(HandId::Left), self.snapshot(HandId::Right))
    }

    /// Last known palm position for one hand.
    pub fn position(&self, hand: HandId) -> Option<Vec2> {
        self.states.get(&hand).and_then(HandMotionState::position)
    }

    /// Direct access to a hand's motion state, for predicate queries.
    pub fn state(&self, hand: HandId) -> Option<&HandMotionState> {
        self.states.get(&hand)
    }

    /// Euclidean distance between the two hands' last known positions.
    /// `None` unless both hands have been seen.
    pub fn hand_distance(&self) -> Option<f64> {
        let left = self.position(HandId::Left)?;
        let right = self.position(HandId::Right)?;
        Some(left.distance_to(right))
    }

    /// True when the left hand moves rightward and the right hand moves
    /// leftward, both past a small speed floor.
    pub fn hands_approaching(&self) -> bool {
        let (Some(left), Some(right)) = (
            self.states.get(&HandId::Left),
            self.states.get(&HandId::Right),
        ) else {
            return false;
        };

        let left_moving_right = left.snapshot().velocity.x > APPROACH_SPEED_FLOOR;
        let right_moving_left = right.snapshot().velocity.x < -APPROACH_SPEED_FLOOR;

        left_moving_right && right_moving_left
    }

    /// Reset one hand's accumulated state without discarding the slot.
    pub fn reset_hand(&mut self, hand: HandId) {
        if let Some(state) = self.states.get_mut(&hand) {
            state.reset();
        }
    }

    /// Reset every tracked hand.
    pub fn reset(&mut self) {
        for state in self.states.values_mut() {
            state.reset();
        }
    }

    /// Drop a hand entirely; called when it disappears from detections.
    pub fn remove_hand(&mut self, hand: HandId) {
        if let Some(mut state) = self.states.remove(&hand) {
            state.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::LANDMARK_COUNT;

    const DT: f64 = 1.0 / 30.0;

    /// A landmark set whose palm landmarks all sit on `center`.
    fn landmarks_at(center: Vec2) -> Vec<Landmark> {
        (0..LANDMARK_COUNT)
            .map(|_| Landmark {
                x: center.x,
                y: center.y,
                z: 0.0,
            })
            .collect()
    }

    fn feed_position(analyzer: &mut MotionAnalyzer, hand: HandId, positions: &[Vec2]) {
        for (i, pos) in positions.iter().enumerate() {
            analyzer.update(hand, &landmarks_at(*pos), DT, i as f64 * DT * 1000.0);
        }
    }

    #[test]
    fn test_palm_center_is_mean_of_palm_landmarks() {
        let analyzer = MotionAnalyzer::default();
        let mut landmarks = landmarks_at(Vec2::new(0.0, 0.0));
        // Spread the palm landmarks; fingertips should not matter
        for (offset, &idx) in schema::PALM_LANDMARKS.iter().enumerate() {
            landmarks[idx].x = offset as f64 * 0.1;
            landmarks[idx].y = 0.4;
        }
        landmarks[8].x = 99.0;

        let palm = analyzer.palm_center(&landmarks).unwrap();
        assert!((palm.x - 0.2).abs() < 1e-12);
        assert!((palm.y - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_undersized_landmarks_are_noop() {
        let mut analyzer = MotionAnalyzer::default();
        feed_position(
            &mut analyzer,
            HandId::Right,
            &[Vec2::new(0.5, 0.5), Vec2::new(0.52, 0.5)],
        );
        let before = analyzer.snapshot(HandId::Right).unwrap();

        let short: Vec<Landmark> = landmarks_at(Vec2::new(0.9, 0.9))[..5].to_vec();
        let after = analyzer.update(HandId::Right, &short, DT, 5000.0);
        assert_eq!(before, after);
    }

    #[test]
    fn test_lazy_state_creation() {
        let mut analyzer = MotionAnalyzer::default();
        assert!(analyzer.snapshot(HandId::Left).is_none());

        analyzer.update(HandId::Left, &landmarks_at(Vec2::new(0.3, 0.5)), DT, 0.0);
        assert!(analyzer.snapshot(HandId::Left).is_some());
        assert!(analyzer.snapshot(HandId::Right).is_none());
    }

    #[test]
    fn test_hand_distance_requires_both_hands() {
        let mut analyzer = MotionAnalyzer::default();
        assert!(analyzer.hand_distance().is_none());

        feed_position(&mut analyzer, HandId::Left, &[Vec2::new(0.2, 0.5)]);
        assert!(analyzer.hand_distance().is_none());

        feed_position(&mut analyzer, HandId::Right, &[Vec2::new(0.5, 0.9)]);
        let distance = analyzer.hand_distance().unwrap();
        assert!((distance - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_hands_approaching() {
        let mut analyzer = MotionAnalyzer::default();

        // Left sweeping right, right sweeping left
        let left: Vec<Vec2> = (0..20).map(|i| Vec2::new(0.1 + i as f64 * 0.01, 0.5)).collect();
        let right: Vec<Vec2> = (0..20).map(|i| Vec2::new(0.9 - i as f64 * 0.01, 0.5)).collect();
        feed_position(&mut analyzer, HandId::Left, &left);
        feed_position(&mut analyzer, HandId::Right, &right);
        assert!(analyzer.hands_approaching());

        // Both drifting the same way is not approaching
        let mut analyzer = MotionAnalyzer::default();
        feed_position(&mut analyzer, HandId::Left, &left);
        let right_same: Vec<Vec2> =
            (0..20).map(|i| Vec2::new(0.5 + i as f64 * 0.01, 0.5)).collect();
        feed_position(&mut analyzer, HandId::Right, &right_same);
        assert!(!analyzer.hands_approaching());
    }

    #[test]
    fn test_remove_hand_discards_state() {
        let mut analyzer = MotionAnalyzer::default();
        feed_position(&mut analyzer, HandId::Right, &[Vec2::new(0.5, 0.5)]);
        assert!(analyzer.snapshot(HandId::Right).is_some());

        analyzer.remove_hand(HandId::Right);
        assert!(analyzer.snapshot(HandId::Right).is_none());
        assert!(analyzer.position(HandId::Right).is_none());

        // Removing an unknown hand is harmless
        analyzer.remove_hand(HandId::Right);
    }

    #[test]
    fn test_set_config_propagates_to_live_states() {
        let mut analyzer = MotionAnalyzer::default();
        let positions: Vec<Vec2> = (0..34).map(|i| Vec2::new(i as f64 * 0.01, 0.5)).collect();
        feed_position(&mut analyzer, HandId::Left, &positions);
        assert_eq!(analyzer.snapshot(HandId::Left).unwrap().trajectory_len, 34);

        let mut config = MotionConfig::default();
        config.trajectory_capacity = 16;
        analyzer.set_config(config);
        assert_eq!(analyzer.snapshot(HandId::Left).unwrap().trajectory_len, 16);
    }
}
