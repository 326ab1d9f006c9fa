//! Engine configuration with fail-fast validation
//!
//! Bad thresholds are a setup error, not something to tolerate per-frame:
//! a session refuses to start with a config whose hysteresis bands overlap.

use core::fmt;

/// Camera orientation relative to the subject
///
/// Changes which joints are tracked and how body depth is measured:
/// a side view sees the full torso drop, a front view sees a foreshortened
/// version of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
    Front,
    Side,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// up/down thresholds (with margins) overlap or sit outside 0-180
    InvalidAngleThresholds,
    /// a smoothing alpha is outside (0, 1]
    InvalidAlpha,
    /// debounce must require at least one frame
    ZeroDebounce,
    /// cooldown or minimum rep duration is negative
    NegativeDuration,
    /// depth factor or minimum drop outside (0, 1)
    InvalidDepthScale,
    /// visibility threshold outside (0, 1)
    InvalidVisibilityThreshold,
    /// symmetry tolerance must be positive
    InvalidSymmetryTolerance,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidAngleThresholds => {
                write!(f, "down_angle + margin must stay below up_angle - margin, within 0-180")
            }
            ConfigError::InvalidAlpha => write!(f, "smoothing alpha must be in (0, 1]"),
            ConfigError::ZeroDebounce => write!(f, "debounce_frames must be at least 1"),
            ConfigError::NegativeDuration => {
                write!(f, "cooldown_ms and min_rep_duration_ms must not be negative")
            }
            ConfigError::InvalidDepthScale => {
                write!(f, "depth_factor and min_drop must be in (0, 1)")
            }
            ConfigError::InvalidVisibilityThreshold => {
                write!(f, "visibility_threshold must be in (0, 1)")
            }
            ConfigError::InvalidSymmetryTolerance => {
                write!(f, "symmetry_tolerance must be positive")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// All tunables for one counting session
#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    pub view_mode: ViewMode,
    /// Elbow angle (degrees) above which the arm counts as locked out
    pub up_angle: f32,
    /// Elbow angle (degrees) below which the body counts as at the bottom
    pub down_angle: f32,
    /// Hysteresis band around both thresholds to stop chatter
    pub hysteresis_margin: f32,
    /// Consecutive frames a candidate condition must hold
    pub debounce_frames: u32,
    /// Minimum gap between two counted reps
    pub cooldown_ms: f64,
    /// Reps faster than this are physically implausible and rejected
    pub min_rep_duration_ms: f64,
    /// Landmarks below this confidence freeze the frame ("searching")
    pub visibility_threshold: f32,
    /// EMA alpha for the reconciled elbow angle
    pub angle_alpha: f32,
    /// EMA alpha for per-joint position smoothing
    pub position_alpha: f32,
    /// Slow EMA alpha for the depth tracker's resting baseline
    pub baseline_alpha: f32,
    /// Required torso drop as a fraction of the subject's reference extent
    pub depth_factor: f32,
    /// Floor on the required drop (normalized units)
    pub min_drop: f32,
    /// Front mode: left/right elbow angles diverging beyond this are asymmetric
    pub symmetry_tolerance: f32,
    /// Warm-up frames for peak-angle threshold calibration, 0 = disabled
    pub calibration_frames: u32,
}

impl EngineConfig {
    /// Defaults for a camera facing the subject head-on
    pub fn front() -> Self {
        Self {
            view_mode: ViewMode::Front,
            up_angle: 155.0,
            down_angle: 90.0,
            hysteresis_margin: 5.0,
            debounce_frames: 3,
            cooldown_ms: 350.0,
            min_rep_duration_ms: 350.0,
            visibility_threshold: 0.5,
            angle_alpha: 0.4,
            position_alpha: 0.4,
            baseline_alpha: 0.1,
            // Front view foreshortens the drop, so demand a larger fraction
            depth_factor: 0.35,
            min_drop: 0.03,
            symmetry_tolerance: 25.0,
            calibration_frames: 0,
        }
    }

    /// Defaults for a profile (side-on) camera
    pub fn side() -> Self {
        Self {
            view_mode: ViewMode::Side,
            visibility_threshold: 0.6,
            depth_factor: 0.25,
            ..Self::front()
        }
    }

    pub fn for_mode(mode: ViewMode) -> Self {
        match mode {
            ViewMode::Front => Self::front(),
            ViewMode::Side => Self::side(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let in_alpha_range = |a: f32| a > 0.0 && a <= 1.0;

        // Hysteresis bands must not touch, and both thresholds must be
        // plausible elbow angles
        if self.hysteresis_margin < 0.0
            || self.down_angle <= 0.0
            || self.up_angle > 180.0
            || self.down_angle + self.hysteresis_margin >= self.up_angle - self.hysteresis_margin
        {
            return Err(ConfigError::InvalidAngleThresholds);
        }

        if !in_alpha_range(self.angle_alpha)
            || !in_alpha_range(self.position_alpha)
            || !in_alpha_range(self.baseline_alpha)
        {
            return Err(ConfigError::InvalidAlpha);
        }

        if self.debounce_frames == 0 {
            return Err(ConfigError::ZeroDebounce);
        }

        if self.cooldown_ms < 0.0 || self.min_rep_duration_ms < 0.0 {
            return Err(ConfigError::NegativeDuration);
        }

        if self.depth_factor <= 0.0
            || self.depth_factor >= 1.0
            || self.min_drop <= 0.0
            || self.min_drop >= 1.0
        {
            return Err(ConfigError::InvalidDepthScale);
        }

        if self.visibility_threshold <= 0.0 || self.visibility_threshold >= 1.0 {
            return Err(ConfigError::InvalidVisibilityThreshold);
        }

        if self.symmetry_tolerance <= 0.0 {
            return Err(ConfigError::InvalidSymmetryTolerance);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(EngineConfig::front().validate(), Ok(()));
        assert_eq!(EngineConfig::side().validate(), Ok(()));
    }

    #[test]
    fn test_overlapping_bands_rejected() {
        let mut config = EngineConfig::front();
        config.down_angle = 150.0;
        config.up_angle = 155.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidAngleThresholds));
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let mut config = EngineConfig::front();
        config.down_angle = 160.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidAngleThresholds));
    }

    #[test]
    fn test_alpha_bounds() {
        let mut config = EngineConfig::front();
        config.angle_alpha = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidAlpha));
        config.angle_alpha = 1.0;
        assert_eq!(config.validate(), Ok(()));
        config.angle_alpha = 1.1;
        assert_eq!(config.validate(), Err(ConfigError::InvalidAlpha));
    }

    #[test]
    fn test_zero_debounce_rejected() {
        let mut config = EngineConfig::side();
        config.debounce_frames = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroDebounce));
    }

    #[test]
    fn test_negative_cooldown_rejected() {
        let mut config = EngineConfig::front();
        config.cooldown_ms = -1.0;
        assert_eq!(config.validate(), Err(ConfigError::NegativeDuration));
    }

    #[test]
    fn test_depth_scale_bounds() {
        let mut config = EngineConfig::front();
        config.depth_factor = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidDepthScale));
        config = EngineConfig::front();
        config.min_drop = 1.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidDepthScale));
    }
}
