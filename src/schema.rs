//! hand.frame.v1 schema definition
//!
//! Input contract with the external hand-landmark detector. One frame carries
//! up to two hand detections, each with:
//! - 21 normalized landmarks (x/y in 0-1 image space, z relative depth)
//! - a handedness label with confidence
//! - an optional coarse gesture classification
//!
//! Landmark index reference: 0 wrist, 1-4 thumb, 5-8 index, 9-12 middle,
//! 13-16 ring, 17-20 pinky (base..tip per finger).

use crate::error::AnalysisError;
use crate::types::{HandId, Vec2};
use serde::{Deserialize, Serialize};

/// Current input schema version
pub const SCHEMA_VERSION: &str = "hand.frame.v1";

/// Landmarks per hand produced by the detection model
pub const LANDMARK_COUNT: usize = 21;

/// Wrist landmark index
pub const WRIST: usize = 0;

/// Finger base (MCP) landmarks averaged with the wrist into the palm center
pub const PALM_LANDMARKS: [usize; 5] = [0, 5, 9, 13, 17];

/// Fingertip landmarks, thumb through pinky
pub const FINGERTIPS: [usize; 5] = [4, 8, 12, 16, 20];

/// One landmark point in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    /// Relative depth; unused by the analysis core but preserved for consumers
    #[serde(default)]
    pub z: f64,
}

/// Handedness label as reported by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Handedness::Left => "Left",
            Handedness::Right => "Right",
        }
    }
}

impl From<Handedness> for HandId {
    fn from(label: Handedness) -> Self {
        match label {
            Handedness::Left => HandId::Left,
            Handedness::Right => HandId::Right,
        }
    }
}

/// Handedness report with model confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandednessReport {
    pub label: Handedness,
    #[serde(default)]
    pub confidence: f64,
}

/// Coarse gesture categories emitted by the detection model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GestureLabel {
    #[serde(rename = "Closed_Fist")]
    ClosedFist,
    #[serde(rename = "Open_Palm")]
    OpenPalm,
    #[serde(rename = "Pointing_Up")]
    PointingUp,
    #[serde(rename = "Thumb_Up")]
    ThumbUp,
    #[serde(rename = "Thumb_Down")]
    ThumbDown,
    Victory,
    #[serde(rename = "ILoveYou")]
    ILoveYou,
    None,
    /// For categories added by newer models
    #[serde(untagged)]
    Other(String),
}

/// Gesture classification with model confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureReport {
    pub label: GestureLabel,
    #[serde(default)]
    pub confidence: f64,
}

impl GestureReport {
    pub fn is_closed_fist(&self) -> bool {
        self.label == GestureLabel::ClosedFist
    }

    pub fn is_open_palm(&self) -> bool {
        self.label == GestureLabel::OpenPalm
    }
}

/// One detected hand in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandDetection {
    pub landmarks: Vec<Landmark>,
    pub handedness: HandednessReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gesture: Option<GestureReport>,
}

impl HandDetection {
    /// Check the detection carries a complete landmark set.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.landmarks.len() < LANDMARK_COUNT {
            return Err(AnalysisError::MalformedDetection(format!(
                "expected {} landmarks, got {}",
                LANDMARK_COUNT,
                self.landmarks.len()
            )));
        }
        Ok(())
    }

    /// How open the hand is, 0 (closed fist) to 1 (fully spread).
    ///
    /// Average fingertip distance from the palm center, rescaled between the
    /// empirical closed (~0.08) and open (~0.25) extremes. Returns `None` for
    /// undersized landmark sets.
    pub fn finger_spread(&self) -> Option<f64> {
        if self.landmarks.len() < LANDMARK_COUNT {
            return None;
        }

        let palm = mean_of(&self.landmarks, &PALM_LANDMARKS)?;
        let total: f64 = FINGERTIPS
            .iter()
            .map(|&idx| {
                let lm = &self.landmarks[idx];
                Vec2::new(lm.x, lm.y).distance_to(palm)
            })
            .sum();
        let avg = total / FINGERTIPS.len() as f64;

        Some(((avg - 0.08) / 0.17).clamp(0.0, 1.0))
    }
}

/// One frame of detector output, timestamped with the caller's monotonic
/// clock in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFrame {
    pub timestamp_ms: f64,
    #[serde(default)]
    pub hands: Vec<HandDetection>,
}

impl RawFrame {
    /// Parse a single frame from JSON.
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let frame: RawFrame = serde_json::from_str(json)
            .map_err(|e| AnalysisError::ParseError(format!("invalid frame: {}", e)))?;
        Ok(frame)
    }

    /// Parse newline-delimited JSON into frames.
    pub fn parse_ndjson(data: &str) -> Result<Vec<Self>, AnalysisError> {
        data.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(Self::from_json)
            .collect()
    }

    /// Validate every detection in the frame.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        for hand in &self.hands {
            hand.validate()?;
        }
        Ok(())
    }
}

/// Arithmetic mean of the selected landmark positions.
pub(crate) fn mean_of(landmarks: &[Landmark], indices: &[usize]) -> Option<Vec2> {
    if indices.is_empty() {
        return None;
    }
    let mut x = 0.0;
    let mut y = 0.0;
    for &idx in indices {
        let lm = landmarks.get(idx)?;
        x += lm.x;
        y += lm.y;
    }
    let count = indices.len() as f64;
    Some(Vec2::new(x / count, y / count))
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn make_landmarks(center: Vec2) -> Vec<Landmark> {
        (0..LANDMARK_COUNT)
            .map(|i| Landmark {
                x: center.x + (i as f64) * 0.001,
                y: center.y - (i as f64) * 0.001,
                z: 0.0,
            })
            .collect()
    }

    #[test]
    fn test_gesture_label_mediapipe_names() {
        let label: GestureLabel = serde_json::from_str("\"Closed_Fist\"").unwrap();
        assert_eq!(label, GestureLabel::ClosedFist);
        let label: GestureLabel = serde_json::from_str("\"Open_Palm\"").unwrap();
        assert_eq!(label, GestureLabel::OpenPalm);
        let label: GestureLabel = serde_json::from_str("\"Spock\"").unwrap();
        assert_eq!(label, GestureLabel::Other("Spock".to_string()));
    }

    #[test]
    fn test_detection_validates_landmark_count() {
        let detection = HandDetection {
            landmarks: make_landmarks(Vec2::new(0.5, 0.5)),
            handedness: HandednessReport {
                label: Handedness::Right,
                confidence: 0.99,
            },
            gesture: None,
        };
        assert!(detection.validate().is_ok());

        let short = HandDetection {
            landmarks: detection.landmarks[..10].to_vec(),
            ..detection
        };
        assert!(short.validate().is_err());
    }

    #[test]
    fn test_frame_from_json() {
        let json = r#"{
            "timestamp_ms": 1234.5,
            "hands": [{
                "landmarks": [
                    {"x": 0.1, "y": 0.2, "z": 0.0}, {"x": 0.1, "y": 0.2}, {"x": 0.1, "y": 0.2},
                    {"x": 0.1, "y": 0.2}, {"x": 0.1, "y": 0.2}, {"x": 0.1, "y": 0.2},
                    {"x": 0.1, "y": 0.2}, {"x": 0.1, "y": 0.2}, {"x": 0.1, "y": 0.2},
                    {"x": 0.1, "y": 0.2}, {"x": 0.1, "y": 0.2}, {"x": 0.1, "y": 0.2},
                    {"x": 0.1, "y": 0.2}, {"x": 0.1, "y": 0.2}, {"x": 0.1, "y": 0.2},
                    {"x": 0.1, "y": 0.2}, {"x": 0.1, "y": 0.2}, {"x": 0.1, "y": 0.2},
                    {"x": 0.1, "y": 0.2}, {"x": 0.1, "y": 0.2}, {"x": 0.1, "y": 0.2}
                ],
                "handedness": {"label": "Right", "confidence": 0.97},
                "gesture": {"label": "Open_Palm", "confidence": 0.88}
            }]
        }"#;

        let frame = RawFrame::from_json(json).unwrap();
        assert_eq!(frame.timestamp_ms, 1234.5);
        assert_eq!(frame.hands.len(), 1);
        assert!(frame.validate().is_ok());
        assert!(frame.hands[0].gesture.as_ref().unwrap().is_open_palm());
    }

    #[test]
    fn test_parse_ndjson_skips_blank_lines() {
        let data = "\n{\"timestamp_ms\": 1.0}\n\n{\"timestamp_ms\": 2.0}\n";
        let frames = RawFrame::parse_ndjson(data).unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames[0].hands.is_empty());
    }

    #[test]
    fn test_finger_spread_extremes() {
        // All fingertips on the palm center = closed
        let mut closed = make_landmarks(Vec2::new(0.5, 0.5));
        for lm in closed.iter_mut() {
            lm.x = 0.5;
            lm.y = 0.5;
        }
        let detection = HandDetection {
            landmarks: closed,
            handedness: HandednessReport {
                label: Handedness::Left,
                confidence: 1.0,
            },
            gesture: None,
        };
        assert_eq!(detection.finger_spread(), Some(0.0));

        // Fingertips pushed far out = open
        let mut open = detection.clone();
        for &idx in FINGERTIPS.iter() {
            open.landmarks[idx].x = 0.8;
        }
        assert!(open.finger_spread().unwrap() > 0.9);
    }

    #[test]
    fn test_mean_of_out_of_range_index() {
        let landmarks = make_landmarks(Vec2::new(0.5, 0.5));
        assert!(mean_of(&landmarks, &[0, 50]).is_none());
    }
}
