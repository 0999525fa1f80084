//! Per-hand motion state
//!
//! Tracks one hand's palm center over time and derives smoothed kinematic
//! features from it:
//! - EMA-smoothed velocity and jerk
//! - Normalized movement direction
//! - A circular-pattern score over the recent trajectory
//!
//! The same type serves both hands; `MotionAnalyzer` owns one instance per
//! tracked hand identity.

use crate::config::MotionConfig;
use crate::types::{MotionSnapshot, Vec2, Velocity};
use std::collections::VecDeque;

/// Velocity magnitudes below this produce a zero direction vector.
const DIRECTION_EPSILON: f64 = 0.001;

/// Minimum buffered samples before pattern detection runs.
const MIN_PATTERN_SAMPLES: usize = 10;

/// Velocity floor for the downward-movement predicate.
const DOWNWARD_SPEED_FLOOR: f64 = 0.01;

/// One buffered trajectory point.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TrajectorySample {
    x: f64,
    y: f64,
    time_ms: f64,
}

/// Motion physics for a single hand.
#[derive(Debug, Clone)]
pub struct HandMotionState {
    /// Bounded FIFO of recent palm positions, oldest first
    buffer: VecDeque<TrajectorySample>,
    capacity: usize,
    alpha: f64,
    downward_threshold: f64,
    circular_threshold: f64,

    prev_position: Option<Vec2>,
    prev_velocity: Velocity,

    velocity: Velocity,
    jerk: f64,
    direction: Vec2,
    circular_score: f64,
}

impl HandMotionState {
    pub fn new(config: &MotionConfig) -> Self {
        Self {
            buffer: VecDeque::with_capacity(config.trajectory_capacity),
            capacity: config.trajectory_capacity,
            alpha: config.smoothing_alpha,
            downward_threshold: config.downward_threshold,
            circular_threshold: config.circular_threshold,
            prev_position: None,
            prev_velocity: Velocity::default(),
            velocity: Velocity::default(),
            jerk: 0.0,
            direction: Vec2::default(),
            circular_score: 0.0,
        }
    }

    /// Pick up changed tuning values without dropping accumulated state.
    pub fn set_config(&mut self, config: &MotionConfig) {
        self.capacity = config.trajectory_capacity;
        self.alpha = config.smoothing_alpha;
        self.downward_threshold = config.downward_threshold;
        self.circular_threshold = config.circular_threshold;
        while self.buffer.len() > self.capacity {
            self.buffer.pop_front();
        }
    }

    /// Feed one palm sample and return the refreshed feature snapshot.
    ///
    /// A missing sample or non-positive `delta_time` (first frame, stalled or
    /// rewound clock) leaves all features untouched and returns the current
    /// snapshot unchanged.
    pub fn update(
        &mut self,
        palm_center: Option<Vec2>,
        delta_time: f64,
        now_ms: f64,
    ) -> MotionSnapshot {
        let palm = match palm_center {
            Some(palm) if delta_time > 0.0 => palm,
            _ => return self.snapshot(),
        };

        self.push_sample(palm, now_ms);

        if let Some(prev) = self.prev_position {
            self.update_velocity(prev, palm, delta_time);
            self.update_jerk(delta_time);
            self.update_direction();
            self.update_circular_score();
        }

        self.prev_position = Some(palm);
        self.prev_velocity = self.velocity;

        self.snapshot()
    }

    /// Current features without mutating anything.
    pub fn snapshot(&self) -> MotionSnapshot {
        MotionSnapshot {
            velocity: self.velocity,
            jerk: self.jerk,
            direction: self.direction,
            circular_score: self.circular_score,
            trajectory_len: self.buffer.len(),
        }
    }

    /// Last position fed in, if any.
    pub fn position(&self) -> Option<Vec2> {
        self.prev_position
    }

    /// Wall time covered by the trajectory buffer, in milliseconds.
    pub fn trajectory_span_ms(&self) -> f64 {
        match (self.buffer.front(), self.buffer.back()) {
            (Some(first), Some(last)) => last.time_ms - first.time_ms,
            _ => 0.0,
        }
    }

    /// Movement predominantly toward the downward threshold at meaningful speed.
    pub fn is_moving_down(&self) -> bool {
        self.direction.y < self.downward_threshold
            && self.velocity.magnitude > DOWNWARD_SPEED_FLOOR
    }

    /// Trajectory currently tracing a circle.
    pub fn is_circular(&self) -> bool {
        self.circular_score > self.circular_threshold
    }

    /// Clear everything back to the newly-constructed state.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.prev_position = None;
        self.prev_velocity = Velocity::default();
        self.velocity = Velocity::default();
        self.jerk = 0.0;
        self.direction = Vec2::default();
        self.circular_score = 0.0;
    }

    fn push_sample(&mut self, position: Vec2, now_ms: f64) {
        self.buffer.push_back(TrajectorySample {
            x: position.x,
            y: position.y,
            time_ms: now_ms,
        });
        while self.buffer.len() > self.capacity {
            self.buffer.pop_front();
        }
    }

    fn update_velocity(&mut self, prev: Vec2, current: Vec2, delta_time: f64) {
        let raw_vx = (current.x - prev.x) / delta_time;
        let raw_vy = (current.y - prev.y) / delta_time;

        // new = alpha * raw + (1 - alpha) * old
        self.velocity.x = self.alpha * raw_vx + (1.0 - self.alpha) * self.prev_velocity.x;
        self.velocity.y = self.alpha * raw_vy + (1.0 - self.alpha) * self.prev_velocity.y;
        self.velocity.magnitude =
            (self.velocity.x * self.velocity.x + self.velocity.y * self.velocity.y).sqrt();
    }

    fn update_jerk(&mut self, delta_time: f64) {
        let dvx = self.velocity.x - self.prev_velocity.x;
        let dvy = self.velocity.y - self.prev_velocity.y;
        let raw_jerk = (dvx * dvx + dvy * dvy).sqrt() / delta_time;

        self.jerk = self.alpha * raw_jerk + (1.0 - self.alpha) * self.jerk;
    }

    fn update_direction(&mut self) {
        let mag = self.velocity.magnitude;
        if mag > DIRECTION_EPSILON {
            self.direction = Vec2::new(self.velocity.x / mag, self.velocity.y / mag);
        } else {
            self.direction = Vec2::default();
        }
    }

    /// Score how strongly the buffered trajectory traces a circle.
    ///
    /// Three factors multiply into the score:
    /// - radius consistency: low variance of point distances from the centroid
    /// - angular progress: total absolute bearing change around the centroid,
    ///   saturating at half a revolution's worth of sweep
    /// - movement floor: ramps the score down when the whole trajectory sits
    ///   within jitter range of the centroid
    fn update_circular_score(&mut self) {
        if self.buffer.len() < MIN_PATTERN_SAMPLES {
            self.circular_score = 0.0;
            return;
        }

        let len = self.buffer.len() as f64;

        let mut cx = 0.0;
        let mut cy = 0.0;
        for point in &self.buffer {
            cx += point.x;
            cy += point.y;
        }
        cx /= len;
        cy /= len;

        let distances: Vec<f64> = self
            .buffer
            .iter()
            .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
            .collect();
        let avg_dist = distances.iter().sum::<f64>() / len;

        let variance = distances
            .iter()
            .map(|d| (d - avg_dist) * (d - avg_dist))
            .sum::<f64>()
            / len;

        let mut total_angle = 0.0;
        for window in self
            .buffer
            .iter()
            .zip(self.buffer.iter().skip(1))
        {
            let (prev, curr) = window;
            let angle1 = (prev.y - cy).atan2(prev.x - cx);
            let angle2 = (curr.y - cy).atan2(curr.x - cx);

            let mut d_angle = angle2 - angle1;
            while d_angle > std::f64::consts::PI {
                d_angle -= 2.0 * std::f64::consts::PI;
            }
            while d_angle < -std::f64::consts::PI {
                d_angle += 2.0 * std::f64::consts::PI;
            }

            total_angle += d_angle.abs();
        }

        let radius_consistency = if avg_dist > 0.01 {
            (-variance / (avg_dist * avg_dist)).exp()
        } else {
            0.0
        };
        let angular_progress = (total_angle / std::f64::consts::PI).min(1.0);
        let has_movement = if avg_dist > 0.02 { 1.0 } else { avg_dist / 0.02 };

        self.circular_score = radius_consistency * angular_progress * has_movement;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 30.0;

    fn make_state() -> HandMotionState {
        HandMotionState::new(&MotionConfig::default())
    }

    /// Drive the state with a sequence of positions at a fixed frame rate.
    fn feed(state: &mut HandMotionState, positions: &[Vec2]) -> MotionSnapshot {
        let mut snapshot = state.snapshot();
        for (i, pos) in positions.iter().enumerate() {
            snapshot = state.update(Some(*pos), DT, i as f64 * DT * 1000.0);
        }
        snapshot
    }

    #[test]
    fn test_null_sample_is_noop() {
        let mut state = make_state();
        feed(
            &mut state,
            &[Vec2::new(0.5, 0.5), Vec2::new(0.52, 0.5), Vec2::new(0.54, 0.5)],
        );
        let before = state.snapshot();

        let after = state.update(None, DT, 1000.0);
        assert_eq!(before, after);
    }

    #[test]
    fn test_non_positive_delta_time_is_noop() {
        let mut state = make_state();
        feed(&mut state, &[Vec2::new(0.5, 0.5), Vec2::new(0.52, 0.5)]);
        let before = state.snapshot();

        let after = state.update(Some(Vec2::new(0.9, 0.9)), 0.0, 2000.0);
        assert_eq!(before, after);
        let after = state.update(Some(Vec2::new(0.9, 0.9)), -DT, 3000.0);
        assert_eq!(before, after);
    }

    #[test]
    fn test_single_sample_has_zero_features() {
        let mut state = make_state();
        let snapshot = state.update(Some(Vec2::new(0.5, 0.5)), DT, 0.0);

        assert_eq!(snapshot.velocity.magnitude, 0.0);
        assert_eq!(snapshot.jerk, 0.0);
        assert_eq!(snapshot.direction, Vec2::default());
        assert_eq!(snapshot.circular_score, 0.0);
        assert_eq!(snapshot.trajectory_len, 1);
    }

    #[test]
    fn test_ema_velocity_converges_to_constant_input() {
        let mut state = make_state();
        // Constant velocity: 0.002 units per frame = 0.06 units/sec at 30fps
        let positions: Vec<Vec2> = (0..120)
            .map(|i| Vec2::new(0.1 + i as f64 * 0.002, 0.5))
            .collect();
        let snapshot = feed(&mut state, &positions);

        let raw_velocity = 0.002 / DT;
        assert!(
            (snapshot.velocity.x - raw_velocity).abs() < raw_velocity * 0.01,
            "smoothed {} vs raw {}",
            snapshot.velocity.x,
            raw_velocity
        );
        // Constant velocity means jerk decays toward zero
        assert!(snapshot.jerk < 0.05);
        // Direction settles on +x
        assert!((snapshot.direction.x - 1.0).abs() < 1e-6);
        assert!(snapshot.direction.y.abs() < 1e-6);
    }

    #[test]
    fn test_direction_zeroed_below_epsilon() {
        let mut state = make_state();
        // Sub-epsilon displacement per frame
        let positions: Vec<Vec2> = (0..20)
            .map(|i| Vec2::new(0.5 + i as f64 * 1e-7, 0.5))
            .collect();
        let snapshot = feed(&mut state, &positions);

        assert!(snapshot.velocity.magnitude < DIRECTION_EPSILON);
        assert_eq!(snapshot.direction, Vec2::default());
    }

    #[test]
    fn test_circle_scores_high() {
        let mut state = make_state();
        // Full revolution around (0.5, 0.5) at radius 0.1
        let positions: Vec<Vec2> = (0..30)
            .map(|i| {
                let theta = i as f64 / 30.0 * std::f64::consts::TAU;
                Vec2::new(0.5 + 0.1 * theta.cos(), 0.5 + 0.1 * theta.sin())
            })
            .collect();
        let snapshot = feed(&mut state, &positions);

        assert!(
            snapshot.circular_score > 0.9,
            "circle scored {}",
            snapshot.circular_score
        );
        assert!(state.is_circular());
    }

    #[test]
    fn test_small_line_scores_low() {
        let mut state = make_state();
        // Straight drift whose spread stays within the movement floor
        let positions: Vec<Vec2> = (0..12)
            .map(|i| Vec2::new(0.5 + i as f64 * 0.003, 0.5))
            .collect();
        let snapshot = feed(&mut state, &positions);

        assert!(
            snapshot.circular_score < 0.1,
            "line scored {}",
            snapshot.circular_score
        );
        assert!(!state.is_circular());
    }

    #[test]
    fn test_stationary_jitter_scores_zero() {
        let mut state = make_state();
        let positions: Vec<Vec2> = (0..20)
            .map(|i| {
                let wobble = if i % 2 == 0 { 0.002 } else { -0.002 };
                Vec2::new(0.5 + wobble, 0.5)
            })
            .collect();
        let snapshot = feed(&mut state, &positions);

        assert!(snapshot.circular_score < 1e-6);
    }

    #[test]
    fn test_buffer_eviction_is_fifo() {
        let mut config = MotionConfig::default();
        config.trajectory_capacity = 10;
        let mut state = HandMotionState::new(&config);

        for i in 0..25 {
            state.update(Some(Vec2::new(i as f64 * 0.01, 0.5)), DT, i as f64 * 33.0);
        }
        assert_eq!(state.snapshot().trajectory_len, 10);
        // Oldest sample evicted: front of buffer is sample 15
        assert!((state.buffer.front().unwrap().x - 0.15).abs() < 1e-12);
        assert!((state.buffer.back().unwrap().x - 0.24).abs() < 1e-12);
        // 9 frame gaps at 33ms
        assert!((state.trajectory_span_ms() - 297.0).abs() < 1e-9);
    }

    #[test]
    fn test_is_moving_down_needs_speed_and_direction() {
        let mut config = MotionConfig::default();
        // Positive y grows downward in image space
        config.downward_threshold = 0.5;
        let mut state = HandMotionState::new(&config);

        // Sinking motion: direction.y is +1, which is not below a +0.5 threshold
        let positions: Vec<Vec2> = (0..30)
            .map(|i| Vec2::new(0.5, 0.8 + i as f64 * 0.005))
            .collect();
        feed(&mut state, &positions);
        assert!(!state.is_moving_down());

        config.downward_threshold = -0.5;
        let mut state = HandMotionState::new(&config);
        let positions: Vec<Vec2> = (0..30)
            .map(|i| Vec2::new(0.5, 0.8 - i as f64 * 0.005))
            .collect();
        feed(&mut state, &positions);
        // direction.y is -1, below -0.5, with ample speed
        assert!(state.is_moving_down());
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut state = make_state();
        let positions: Vec<Vec2> = (0..20)
            .map(|i| Vec2::new(0.1 + i as f64 * 0.01, 0.5))
            .collect();
        feed(&mut state, &positions);
        assert!(state.snapshot().velocity.magnitude > 0.0);

        state.reset();
        let snapshot = state.snapshot();
        assert_eq!(snapshot, MotionSnapshot::default());
        assert!(state.position().is_none());
    }

    #[test]
    fn test_set_config_shrinks_buffer() {
        let mut state = make_state();
        for i in 0..34 {
            state.update(Some(Vec2::new(i as f64 * 0.01, 0.5)), DT, i as f64 * 33.0);
        }
        assert_eq!(state.snapshot().trajectory_len, 34);

        let mut config = MotionConfig::default();
        config.trajectory_capacity = 12;
        state.set_config(&config);
        assert_eq!(state.snapshot().trajectory_len, 12);
    }
}
