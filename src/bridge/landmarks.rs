//! Landmark ingest - JS → engine
//!
//! MediaPipe Pose runs in the browser; JavaScript pushes each result here as
//! a flat Float32Array of 33 landmarks × 4 values (x, y, z, visibility) plus
//! the frame's monotonic timestamp. The z coordinate is accepted on the wire
//! and ignored by the engine.

use wasm_bindgen::prelude::*;

use crate::engine::{Point, PoseFrame, LANDMARK_COUNT};

const VALUES_PER_LANDMARK: usize = 4;
const EXPECTED_LEN: usize = LANDMARK_COUNT * VALUES_PER_LANDMARK;

/// Called from JavaScript once per detector result
///
/// Malformed payloads are warned about and dropped; a missing frame never
/// resets accumulated session state.
#[wasm_bindgen]
pub fn update_landmarks(data: &[f32], timestamp_ms: f64) {
    if data.len() != EXPECTED_LEN {
        web_sys::console::warn_1(
            &format!(
                "Invalid landmark data length: {} (expected {})",
                data.len(),
                EXPECTED_LEN
            )
            .into(),
        );
        return;
    }

    let mut landmarks = [Point::new(0.0, 0.0, 0.0); LANDMARK_COUNT];
    for (i, landmark) in landmarks.iter_mut().enumerate() {
        let base = i * VALUES_PER_LANDMARK;
        *landmark = Point::new(data[base], data[base + 1], data[base + 3]);
    }

    super::session::process_pose_frame(PoseFrame {
        landmarks,
        timestamp_ms,
    });
}
