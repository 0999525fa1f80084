//! Limbus Core - motion-to-emotion analysis for hand-driven particle visuals
//!
//! Limbus Core turns raw hand landmarks into the signals a particle renderer
//! consumes, through a deterministic per-frame pipeline: identity assignment
//! → motion feature extraction → emotion classification with hysteresis →
//! two-hand interaction arbitration.
//!
//! ## Modules
//!
//! - **Motion**: per-hand velocity/jerk/direction/circularity features
//! - **Emotion**: priority-ordered detection rules behind a debounced state
//!   machine
//! - **Interaction**: solo / create-and-catch / amplify / fusion arbitration
//!
//! Camera capture, the landmark model, and rendering stay outside this crate;
//! they talk to it through `RawFrame` in and `FrameAnalysis` out.

pub mod analyzer;
pub mod config;
pub mod emotion;
pub mod encoder;
pub mod error;
pub mod interaction;
pub mod motion;
pub mod pipeline;
pub mod schema;
pub mod types;

pub use analyzer::MotionAnalyzer;
pub use config::{AnalysisConfig, EmotionConfig, MagnetFalloff, MotionConfig, TwoHandConfig};
pub use emotion::EmotionDetector;
pub use encoder::{FrameEncoder, PAYLOAD_VERSION};
pub use error::AnalysisError;
pub use interaction::TwoHandController;
pub use motion::HandMotionState;
pub use pipeline::AnalysisEngine;
pub use schema::{HandDetection, RawFrame, SCHEMA_VERSION};
pub use types::{
    Emotion, EmotionState, FrameAnalysis, HandId, InteractionMode, InteractionState,
    MotionSnapshot, Vec2,
};

/// Core version embedded in all frame payloads
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for frame payloads
pub const PRODUCER_NAME: &str = "limbus-core";
