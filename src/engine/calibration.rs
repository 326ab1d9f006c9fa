//! Warm-up threshold calibration
//!
//! Not everyone locks out at the same elbow angle. When enabled, the first
//! frames of a session sample the peak smoothed angle while the subject holds
//! the top position, then derive a personalized lockout threshold that feeds
//! the unchanged state machine. A pre-phase of the same tick path, not a
//! separate code path.

/// Samples the peak angle over a fixed warm-up window
pub struct Calibrator {
    remaining: u32,
    peak: Option<f32>,
}

impl Calibrator {
    pub fn new(frames: u32) -> Self {
        Self {
            remaining: frames,
            peak: None,
        }
    }

    /// Still collecting warm-up frames?
    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    /// Feed one smoothed angle sample
    ///
    /// Non-finite samples do not consume a warm-up frame. On the completing
    /// frame, returns the derived lockout threshold: the observed peak minus
    /// the hysteresis margin, clamped so it can never collide with the down
    /// threshold's band.
    pub fn observe(&mut self, angle: f32, down_angle: f32, margin: f32) -> Option<f32> {
        if self.remaining == 0 || !angle.is_finite() {
            return None;
        }

        let peak = match self.peak {
            Some(p) => p.max(angle),
            None => angle,
        };
        self.peak = Some(peak);
        self.remaining -= 1;

        if self.remaining == 0 {
            let floor = down_angle + 2.0 * margin;
            Some((peak - margin).max(floor))
        } else {
            None
        }
    }
}
