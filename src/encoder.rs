//! Frame payload encoding
//!
//! Wraps a frame's analysis output in a versioned payload with producer and
//! provenance metadata, ready to hand to the rendering layer, a debug panel,
//! or a downstream process over NDJSON.

use crate::error::AnalysisError;
use crate::types::{FrameAnalysis, FramePayload, FrameProducer, FrameProvenance, FrameQuality};
use crate::{CORE_VERSION, PRODUCER_NAME};
use chrono::Utc;
use uuid::Uuid;

/// Current output payload version
pub const PAYLOAD_VERSION: &str = "limbus.frame.v1";

/// Encoder producing versioned frame payloads.
pub struct FrameEncoder {
    instance_id: String,
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameEncoder {
    /// Create a new encoder with a unique instance ID.
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID.
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Wrap one frame's analysis in a payload.
    pub fn encode(&self, analysis: &FrameAnalysis) -> FramePayload {
        let producer = FrameProducer {
            name: PRODUCER_NAME.to_string(),
            version: CORE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let provenance = FrameProvenance {
            frame_timestamp_ms: analysis.timestamp_ms,
            computed_at_utc: Utc::now().to_rfc3339(),
        };

        let confidence = analysis
            .hands
            .iter()
            .map(|h| h.emotion.confidence)
            .fold(1.0_f64, f64::min);

        let quality = FrameQuality {
            hands_tracked: analysis.hands.len(),
            confidence,
        };

        FramePayload {
            payload_version: PAYLOAD_VERSION.to_string(),
            producer,
            provenance,
            quality,
            analysis: analysis.clone(),
        }
    }

    /// Encode to a single JSON line (for NDJSON streams).
    pub fn encode_to_json(&self, analysis: &FrameAnalysis) -> Result<String, AnalysisError> {
        serde_json::to_string(&self.encode(analysis)).map_err(AnalysisError::JsonError)
    }

    /// Encode to pretty-printed JSON.
    pub fn encode_to_json_pretty(&self, analysis: &FrameAnalysis) -> Result<String, AnalysisError> {
        serde_json::to_string_pretty(&self.encode(analysis)).map_err(AnalysisError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        EmotionState, Emotion, HandAnalysis, HandId, InteractionState, MotionSnapshot, Vec2,
    };

    fn make_analysis() -> FrameAnalysis {
        let emotion = EmotionState {
            current: Emotion::Joy,
            confidence: 0.85,
            ..EmotionState::default()
        };

        FrameAnalysis {
            timestamp_ms: 1234.5,
            hands: vec![HandAnalysis {
                hand: HandId::Right,
                palm: Some(Vec2::new(0.6, 0.4)),
                motion: MotionSnapshot::default(),
                emotion,
            }],
            interaction: InteractionState::Solo {
                hand: HandId::Right,
                pos: Vec2::new(0.6, 0.4),
                emotion: Emotion::Joy,
            },
        }
    }

    #[test]
    fn test_encode_payload_metadata() {
        let encoder = FrameEncoder::with_instance_id("test-instance".to_string());
        let payload = encoder.encode(&make_analysis());

        assert_eq!(payload.payload_version, PAYLOAD_VERSION);
        assert_eq!(payload.producer.name, PRODUCER_NAME);
        assert_eq!(payload.producer.version, CORE_VERSION);
        assert_eq!(payload.producer.instance_id, "test-instance");
        assert_eq!(payload.provenance.frame_timestamp_ms, 1234.5);
        assert_eq!(payload.quality.hands_tracked, 1);
        assert_eq!(payload.quality.confidence, 0.85);
    }

    #[test]
    fn test_empty_frame_has_full_confidence() {
        let encoder = FrameEncoder::new();
        let analysis = FrameAnalysis {
            timestamp_ms: 0.0,
            hands: vec![],
            interaction: InteractionState::None,
        };
        let payload = encoder.encode(&analysis);
        assert_eq!(payload.quality.hands_tracked, 0);
        assert_eq!(payload.quality.confidence, 1.0);
    }

    #[test]
    fn test_encode_to_json_round_trips() {
        let encoder = FrameEncoder::new();
        let json = encoder.encode_to_json(&make_analysis()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["payload_version"], "limbus.frame.v1");
        assert_eq!(value["analysis"]["interaction"]["mode"], "solo");

        let parsed: FramePayload = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.analysis, make_analysis());
    }
}
