//! Core repetition-counting engine
//!
//! Pure host-testable Rust: no wasm types in here. Re-exports only,
//! all logic in submodules.

mod calibration;
mod config;
mod depth_gate;
mod geometry;
mod rep_counter;
mod session;
mod smoothing;

pub use calibration::Calibrator;
pub use config::{ConfigError, EngineConfig, ViewMode};
pub use depth_gate::BodyDepthTracker;
pub use geometry::{calculate_angle, distance, midpoint, Point};
pub use rep_counter::{Phase, RepCounter, TickOutcome};
pub use session::{
    FrameStatus, PoseFrame, PushupSession, SessionUpdate, LANDMARK_COUNT, LEFT_ANKLE, LEFT_ELBOW,
    LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, LEFT_WRIST, NOSE, RIGHT_ANKLE, RIGHT_ELBOW, RIGHT_HIP,
    RIGHT_KNEE, RIGHT_SHOULDER, RIGHT_WRIST,
};
pub use smoothing::{Ema, PointSmoother};
