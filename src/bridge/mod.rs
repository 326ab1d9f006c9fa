//! Bridge module - JS ↔ Rust communication
//!
//! All #[wasm_bindgen] entry points live here.
//! Re-exports only in mod.rs, logic in submodules.

mod landmarks;
mod session;

pub use landmarks::update_landmarks;
pub use session::{
    current_phase, is_depth_valid, is_searching, is_symmetric, rep_count, start_session,
    start_session_with, stop_session,
};
