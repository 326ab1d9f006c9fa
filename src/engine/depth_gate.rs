//! Body-depth anti-cheat gate
//!
//! The angle machine alone can be satisfied by bending the elbows while the
//! torso stays up. This tracker demands real vertical displacement of a body
//! reference point, scaled to the subject's on-screen extent so the check
//! holds at any distance from the camera.

use super::smoothing::Ema;

/// Tracks the resting height of a body reference point and the deepest
/// excursion of the current candidate rep
///
/// y grows downward in screen space, so "deeper" means a larger y.
pub struct BodyDepthTracker {
    /// Slow EMA of the resting ("top") height, adapts to natural stance drift
    baseline: Ema,
    /// Deepest y seen during the current candidate rep
    max_down_y: Option<f32>,
    /// Displacement demanded of the current frame's subject scale
    required_drop: Option<f32>,
    /// Fraction of the reference extent that must be travelled
    factor: f32,
    /// Floor on the requirement, in normalized units
    min_drop: f32,
}

impl BodyDepthTracker {
    pub fn new(baseline_alpha: f32, factor: f32, min_drop: f32) -> Self {
        Self {
            baseline: Ema::new(baseline_alpha),
            max_down_y: None,
            required_drop: None,
            factor,
            min_drop,
        }
    }

    /// Recompute the required drop from the subject's on-screen extent
    /// (shoulder width in front view, shoulder-to-hip length in side view).
    /// Called every frame; a non-positive or non-finite extent leaves the
    /// previous requirement in place.
    pub fn set_required_drop(&mut self, reference_extent: f32) {
        if reference_extent.is_finite() && reference_extent > 0.0 {
            self.required_drop = Some((reference_extent * self.factor).max(self.min_drop));
        }
    }

    /// Feed the resting height while the body is up
    pub fn update_baseline(&mut self, y: f32) {
        if y.is_finite() {
            self.baseline.add(y);
        }
    }

    /// Record the excursion while descending or at the bottom
    pub fn track_depth(&mut self, y: f32) {
        if !y.is_finite() {
            return;
        }
        self.max_down_y = Some(match self.max_down_y {
            Some(current) => current.max(y),
            None => y,
        });
    }

    /// Did the current candidate rep travel far enough?
    ///
    /// False until a baseline, an excursion and a requirement all exist.
    pub fn is_depth_sufficient(&self) -> bool {
        match (self.baseline.value(), self.max_down_y, self.required_drop) {
            (Some(baseline), Some(deepest), Some(required)) => deepest - baseline >= required,
            _ => false,
        }
    }

    /// Forget the excursion when a new candidate rep begins
    pub fn reset_rep(&mut self) {
        self.max_down_y = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> BodyDepthTracker {
        // factor 0.25, floor 0.03, fast baseline for test brevity
        BodyDepthTracker::new(1.0, 0.25, 0.03)
    }

    #[test]
    fn test_insufficient_until_all_inputs_present() {
        let mut t = tracker();
        assert!(!t.is_depth_sufficient());
        t.update_baseline(0.3);
        assert!(!t.is_depth_sufficient());
        t.track_depth(0.5);
        // still no requirement set
        assert!(!t.is_depth_sufficient());
        t.set_required_drop(0.4);
        assert!(t.is_depth_sufficient());
    }

    #[test]
    fn test_shallow_drop_fails() {
        let mut t = tracker();
        t.set_required_drop(0.4); // requires 0.1
        t.update_baseline(0.3);
        t.track_depth(0.35);
        assert!(!t.is_depth_sufficient());
        t.track_depth(0.42);
        assert!(t.is_depth_sufficient());
    }

    #[test]
    fn test_minimum_drop_floor() {
        let mut t = tracker();
        // Tiny subject: 0.05 * 0.25 would be 0.0125, floor lifts it to 0.03
        t.set_required_drop(0.05);
        t.update_baseline(0.3);
        t.track_depth(0.32);
        assert!(!t.is_depth_sufficient());
        t.track_depth(0.34);
        assert!(t.is_depth_sufficient());
    }

    #[test]
    fn test_reset_rep_clears_excursion() {
        let mut t = tracker();
        t.set_required_drop(0.4);
        t.update_baseline(0.3);
        t.track_depth(0.5);
        assert!(t.is_depth_sufficient());
        t.reset_rep();
        assert!(!t.is_depth_sufficient());
    }

    #[test]
    fn test_bad_extent_keeps_previous_requirement() {
        let mut t = tracker();
        t.set_required_drop(0.4);
        t.set_required_drop(f32::NAN);
        t.set_required_drop(-1.0);
        t.update_baseline(0.3);
        t.track_depth(0.5);
        assert!(t.is_depth_sufficient());
    }
}
