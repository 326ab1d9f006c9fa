//! Session lifecycle and status getters for the JS host
//!
//! WASM is single-threaded, so one thread-local slot holds the active
//! session. The UI polls the getters after each `update_landmarks` call;
//! persistence of finished-session statistics is the host's business, it
//! just receives the final count from `stop_session`.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use crate::console_log;
use crate::engine::{EngineConfig, PoseFrame, PushupSession, ViewMode};

thread_local! {
    static SESSION: RefCell<Option<PushupSession>> = RefCell::new(None);
}

fn parse_view_mode(view_mode: &str) -> Result<ViewMode, JsValue> {
    match view_mode {
        "front" => Ok(ViewMode::Front),
        "side" => Ok(ViewMode::Side),
        other => Err(JsValue::from_str(&format!(
            "unknown view mode '{other}' (expected 'front' or 'side')"
        ))),
    }
}

fn install(config: EngineConfig) -> Result<(), JsValue> {
    let session = PushupSession::new(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
    SESSION.with(|slot| *slot.borrow_mut() = Some(session));
    console_log!("Push-up session started");
    Ok(())
}

/// Start a session with per-mode default thresholds
#[wasm_bindgen]
pub fn start_session(view_mode: &str) -> Result<(), JsValue> {
    install(EngineConfig::for_mode(parse_view_mode(view_mode)?))
}

/// Start a session with explicit calibration thresholds
///
/// `calibration_frames > 0` enables the warm-up pass that overrides
/// `up_angle` with a personalized lockout threshold. `depth_factor` and
/// `min_drop` scale the anti-cheat displacement requirement. Invalid
/// combinations are rejected here, before any frame is processed.
#[wasm_bindgen]
pub fn start_session_with(
    view_mode: &str,
    up_angle: f32,
    down_angle: f32,
    debounce_frames: u32,
    cooldown_ms: f64,
    min_rep_duration_ms: f64,
    depth_factor: f32,
    min_drop: f32,
    calibration_frames: u32,
) -> Result<(), JsValue> {
    let mut config = EngineConfig::for_mode(parse_view_mode(view_mode)?);
    config.up_angle = up_angle;
    config.down_angle = down_angle;
    config.debounce_frames = debounce_frames;
    config.cooldown_ms = cooldown_ms;
    config.min_rep_duration_ms = min_rep_duration_ms;
    config.depth_factor = depth_factor;
    config.min_drop = min_drop;
    config.calibration_frames = calibration_frames;
    install(config)
}

/// Stop the session and hand back the final rep count
///
/// Drops all engine state; there is never a tick in progress, so stopping
/// can't leave anything half-updated. Returns 0 when no session was active.
#[wasm_bindgen]
pub fn stop_session() -> u32 {
    SESSION.with(|slot| {
        slot.borrow_mut()
            .take()
            .map(PushupSession::finish)
            .unwrap_or(0)
    })
}

#[wasm_bindgen]
pub fn rep_count() -> u32 {
    SESSION.with(|slot| slot.borrow().as_ref().map_or(0, PushupSession::reps))
}

#[wasm_bindgen]
pub fn current_phase() -> String {
    SESSION.with(|slot| {
        slot.borrow()
            .as_ref()
            .map_or("UP", |s| s.phase().name())
            .to_string()
    })
}

#[wasm_bindgen]
pub fn is_depth_valid() -> bool {
    SESSION.with(|slot| {
        slot.borrow()
            .as_ref()
            .is_some_and(|s| s.last_update().depth_ok)
    })
}

#[wasm_bindgen]
pub fn is_symmetric() -> bool {
    SESSION.with(|slot| {
        slot.borrow()
            .as_ref()
            .map_or(true, |s| s.last_update().symmetric)
    })
}

#[wasm_bindgen]
pub fn is_searching() -> bool {
    SESSION.with(|slot| {
        slot.borrow()
            .as_ref()
            .map_or(true, PushupSession::is_searching)
    })
}

/// Tick the active session with a parsed frame; no session, no work
pub(crate) fn process_pose_frame(frame: PoseFrame) {
    SESSION.with(|slot| {
        if let Some(session) = slot.borrow_mut().as_mut() {
            session.process_frame(&frame);
        }
    });
}
