//! Runtime configuration
//!
//! All thresholds and tuning knobs in one place, grouped by the component
//! that reads them. Every field can be changed at runtime through
//! `AnalysisEngine::set_config`; JSON round-tripping supports live tuning
//! from a debug panel or a config file.

use crate::error::AnalysisError;
use crate::types::HandId;
use serde::{Deserialize, Serialize};

/// Motion feature extraction thresholds and smoothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Below = slow/static (normalized units per second)
    pub velocity_low: f64,
    /// Upper bound of the trembling band
    pub velocity_medium: f64,
    /// Above = fast, burst-like motion
    pub velocity_high: f64,
    /// Below = smooth movement
    pub jerk_low: f64,
    /// Above = abrupt movement
    pub jerk_high: f64,
    /// Y-direction threshold for the downward-motion predicate
    pub downward_threshold: f64,
    /// Circular score above this counts as a circular pattern
    pub circular_threshold: f64,
    /// Trajectory ring capacity in frames
    pub trajectory_capacity: usize,
    /// EMA smoothing factor in (0, 1]
    pub smoothing_alpha: f64,
    /// Landmark indices averaged into the palm center (wrist + finger bases)
    pub palm_landmarks: Vec<usize>,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            velocity_low: 0.018,
            velocity_medium: 0.055,
            velocity_high: 0.09,
            jerk_low: 0.012,
            jerk_high: 0.06,
            downward_threshold: -0.03,
            circular_threshold: 0.55,
            trajectory_capacity: 34,
            smoothing_alpha: 0.25,
            palm_landmarks: vec![0, 5, 9, 13, 17],
        }
    }
}

/// Emotion state machine timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionConfig {
    /// How long a candidate must persist before being confirmed (ms)
    pub hysteresis_delay_ms: f64,
    /// Visual cross-fade duration (ms)
    pub transition_duration_ms: f64,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            hysteresis_delay_ms: 500.0,
            transition_duration_ms: 300.0,
        }
    }
}

/// Falloff curve applied to the magnet's pull force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnetFalloff {
    /// Force decreases linearly with distance
    Linear,
    /// Clamped inverse-distance force
    Inverse,
    /// Force decays exponentially with distance
    Exponential,
}

/// Two-hand interaction tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwoHandConfig {
    /// Hand that creates particles
    pub source_hand: HandId,
    /// Hand that catches particles
    pub magnet_hand: HandId,
    /// Attraction range in normalized units
    pub magnet_radius: f64,
    /// Pull force multiplier
    pub magnet_strength: f64,
    pub magnet_falloff: MagnetFalloff,
    /// Hands closer than this start the fusion dwell timer
    pub fusion_distance: f64,
    /// How long hands must stay close to trigger fusion (ms)
    pub fusion_hold_ms: f64,
    /// Minimum gap between fusion triggers (ms)
    pub fusion_cooldown_ms: f64,
    /// Particle count multiplier while amplifying
    pub amplify_multiplier: f64,
    /// Particle size multiplier while amplifying
    pub amplify_scale: f64,
}

impl Default for TwoHandConfig {
    fn default() -> Self {
        Self {
            source_hand: HandId::Right,
            magnet_hand: HandId::Left,
            magnet_radius: 0.45,
            magnet_strength: 2.3,
            magnet_falloff: MagnetFalloff::Inverse,
            fusion_distance: 0.13,
            fusion_hold_ms: 280.0,
            fusion_cooldown_ms: 1000.0,
            amplify_multiplier: 1.6,
            amplify_scale: 1.35,
        }
    }
}

/// Top-level configuration for the analysis engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub motion: MotionConfig,
    pub emotion: EmotionConfig,
    pub two_hand: TwoHandConfig,
}

impl AnalysisConfig {
    /// Load configuration from JSON, filling omitted fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let config: AnalysisConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to pretty JSON.
    pub fn to_json(&self) -> Result<String, AnalysisError> {
        serde_json::to_string_pretty(self).map_err(AnalysisError::JsonError)
    }

    /// Reject values the pipeline cannot operate with.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let m = &self.motion;
        if !(m.smoothing_alpha > 0.0 && m.smoothing_alpha <= 1.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "smoothing_alpha must be in (0, 1], got {}",
                m.smoothing_alpha
            )));
        }
        if m.trajectory_capacity < 10 {
            return Err(AnalysisError::InvalidConfig(format!(
                "trajectory_capacity must be at least 10, got {}",
                m.trajectory_capacity
            )));
        }
        if !(m.velocity_low < m.velocity_medium && m.velocity_medium < m.velocity_high) {
            return Err(AnalysisError::InvalidConfig(
                "velocity thresholds must satisfy low < medium < high".to_string(),
            ));
        }
        if m.jerk_low >= m.jerk_high {
            return Err(AnalysisError::InvalidConfig(
                "jerk thresholds must satisfy low < high".to_string(),
            ));
        }
        if m.palm_landmarks.is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "palm_landmarks must not be empty".to_string(),
            ));
        }
        if let Some(&idx) = m
            .palm_landmarks
            .iter()
            .find(|&&idx| idx >= crate::schema::LANDMARK_COUNT)
        {
            return Err(AnalysisError::InvalidConfig(format!(
                "palm landmark index {} out of range",
                idx
            )));
        }

        let t = &self.two_hand;
        if t.source_hand == t.magnet_hand {
            return Err(AnalysisError::InvalidConfig(
                "source and magnet hands must differ".to_string(),
            ));
        }
        if t.fusion_distance <= 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "fusion_distance must be positive, got {}",
                t.fusion_distance
            )));
        }
        if t.fusion_hold_ms < 0.0 || t.fusion_cooldown_ms < 0.0 {
            return Err(AnalysisError::InvalidConfig(
                "fusion timings must be non-negative".to_string(),
            ));
        }
        if t.magnet_radius <= 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "magnet_radius must be positive, got {}",
                t.magnet_radius
            )));
        }

        let e = &self.emotion;
        if e.hysteresis_delay_ms < 0.0 || e.transition_duration_ms <= 0.0 {
            return Err(AnalysisError::InvalidConfig(
                "emotion timings must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
