//! Pushup Web - push-up repetition counting engine
//!
//! Entry point for WASM module. Only contains:
//! - Module declarations
//! - wasm_bindgen entry points that delegate to submodules
//!
//! MediaPipe Pose runs in the browser and pushes landmarks in through
//! `update_landmarks`; the UI polls the bridge getters for the current
//! `(reps, phase)` and validity flags. The engine itself is pure Rust.

mod bridge;
pub mod engine;

use wasm_bindgen::prelude::*;

// Re-export wasm_bindgen functions for JS access
pub use bridge::{
    current_phase, is_depth_valid, is_searching, is_symmetric, rep_count, start_session,
    start_session_with, stop_session, update_landmarks,
};

// ============================================================================
// CONSOLE LOGGING
// ============================================================================

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

macro_rules! console_log {
    ($($t:tt)*) => ($crate::log(&format_args!($($t)*).to_string()))
}
pub(crate) use console_log;

// ============================================================================
// WASM ENTRY POINTS
// ============================================================================

/// Called automatically when WASM module loads
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}
