//! Debounced push-up phase state machine
//!
//! Consumes one smoothed elbow angle and a monotonic timestamp per frame and
//! decides when a full down/up cycle counts as a repetition. Hysteresis
//! margins, frame debouncing, a cooldown and a minimum rep duration all guard
//! against jitter and trivially fast cheating.

use super::config::EngineConfig;

/// Where in the rep cycle the body currently is
///
/// `Up` is both the initial state and the steady state between reps; the
/// machine runs for the lifetime of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Up,
    GoingDown,
    Down,
    GoingUp,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Up => "UP",
            Phase::GoingDown => "GOING_DOWN",
            Phase::Down => "DOWN",
            Phase::GoingUp => "GOING_UP",
        }
    }
}

/// What a single tick did, so the orchestrator can drive the depth tracker
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// No transition this frame
    None,
    /// Left `Up`, a new candidate rep begins
    DescentStarted,
    /// Bottom confirmed after debounce and depth approval
    BottomReached,
    /// Left `Down`, ascending
    AscentStarted,
    /// Full cycle closed and all gates passed, `reps` incremented
    RepCounted,
    /// Candidate collapsed without producing a rep
    CandidateAborted,
}

/// The repetition counter proper
pub struct RepCounter {
    up_angle: f32,
    down_angle: f32,
    margin: f32,
    debounce_frames: u32,
    cooldown_ms: f64,
    min_rep_duration_ms: f64,

    phase: Phase,
    reps: u32,
    hold_frames: u32,
    last_rep_at: Option<f64>,
    rep_started_at: Option<f64>,
}

impl RepCounter {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            up_angle: config.up_angle,
            down_angle: config.down_angle,
            margin: config.hysteresis_margin,
            debounce_frames: config.debounce_frames,
            cooldown_ms: config.cooldown_ms,
            min_rep_duration_ms: config.min_rep_duration_ms,
            phase: Phase::Up,
            reps: 0,
            hold_frames: 0,
            last_rep_at: None,
            rep_started_at: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn reps(&self) -> u32 {
        self.reps
    }

    /// Replace the lockout threshold, used by warm-up calibration
    pub fn set_up_angle(&mut self, up_angle: f32) {
        self.up_angle = up_angle;
    }

    /// Advance the machine by one frame
    ///
    /// `depth_ok` is the anti-cheat verdict for the current candidate rep;
    /// the bottom cannot be confirmed without it (block reconciliation).
    /// A NaN or out-of-range angle is a no-op: phase held, debounce frozen.
    pub fn tick(&mut self, angle: f32, now_ms: f64, depth_ok: bool) -> TickOutcome {
        if !angle.is_finite() || !(0.0..=180.0).contains(&angle) {
            return TickOutcome::None;
        }

        match self.phase {
            Phase::Up => {
                if angle < self.up_angle - self.margin {
                    self.phase = Phase::GoingDown;
                    self.hold_frames = 0;
                    TickOutcome::DescentStarted
                } else {
                    TickOutcome::None
                }
            }

            Phase::GoingDown => {
                if angle >= self.up_angle {
                    // Reversed before reaching the bottom
                    self.phase = Phase::Up;
                    self.hold_frames = 0;
                    TickOutcome::CandidateAborted
                } else if angle <= self.down_angle {
                    self.hold_frames += 1;
                    if self.hold_frames >= self.debounce_frames && depth_ok {
                        self.phase = Phase::Down;
                        self.hold_frames = 0;
                        self.rep_started_at = Some(now_ms);
                        TickOutcome::BottomReached
                    } else {
                        // Angle is there but debounce or depth is not; keep
                        // accumulating while the condition holds
                        TickOutcome::None
                    }
                } else {
                    self.hold_frames = 0;
                    TickOutcome::None
                }
            }

            Phase::Down => {
                if angle > self.down_angle + self.margin {
                    self.phase = Phase::GoingUp;
                    self.hold_frames = 0;
                    TickOutcome::AscentStarted
                } else {
                    TickOutcome::None
                }
            }

            Phase::GoingUp => {
                if angle <= self.down_angle {
                    // Sank back to the bottom
                    self.phase = Phase::Down;
                    self.hold_frames = 0;
                    TickOutcome::CandidateAborted
                } else if angle >= self.up_angle {
                    self.hold_frames += 1;
                    if self.hold_frames >= self.debounce_frames {
                        self.phase = Phase::Up;
                        self.hold_frames = 0;
                        self.confirm_rep(now_ms)
                    } else {
                        TickOutcome::None
                    }
                } else {
                    self.hold_frames = 0;
                    TickOutcome::None
                }
            }
        }
    }

    /// Cycle closed; count it only if the timing gates agree
    fn confirm_rep(&mut self, now_ms: f64) -> TickOutcome {
        let cooled_down = self
            .last_rep_at
            .map_or(true, |t| now_ms - t > self.cooldown_ms);
        let slow_enough = self
            .rep_started_at
            .map_or(true, |t| now_ms - t >= self.min_rep_duration_ms);

        if cooled_down && slow_enough {
            self.reps += 1;
            self.last_rep_at = Some(now_ms);
            TickOutcome::RepCounted
        } else {
            TickOutcome::CandidateAborted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> RepCounter {
        RepCounter::new(&EngineConfig::side())
    }

    /// Drive a sequence of (angle, depth_ok) at a fixed frame interval
    fn run(counter: &mut RepCounter, angles: &[f32], dt_ms: f64, depth_ok: bool) {
        for (i, &angle) in angles.iter().enumerate() {
            counter.tick(angle, i as f64 * dt_ms, depth_ok);
        }
    }

    #[test]
    fn test_reference_sequence_counts_one_rep() {
        // A_UP = 155, A_DOWN = 90, debounce 3, 100ms frames
        let mut c = counter();
        let angles = [
            170.0, 170.0, 150.0, 120.0, 90.0, 90.0, 90.0, 130.0, 160.0, 170.0, 170.0,
        ];
        run(&mut c, &angles, 100.0, true);
        assert_eq!(c.reps(), 1);
        assert_eq!(c.phase(), Phase::Up);
    }

    #[test]
    fn test_shallow_descent_does_not_count() {
        let mut c = counter();
        // Dips to 120 (above A_DOWN) and comes straight back up
        let angles = [170.0, 170.0, 140.0, 120.0, 140.0, 170.0, 170.0, 170.0];
        run(&mut c, &angles, 100.0, true);
        assert_eq!(c.reps(), 0);
        assert_eq!(c.phase(), Phase::Up);
    }

    #[test]
    fn test_single_frame_spike_is_debounced() {
        let mut c = counter();
        // One frame at the bottom is not enough to confirm Down
        let angles = [170.0, 140.0, 85.0, 120.0, 85.0, 130.0, 170.0, 170.0, 170.0];
        run(&mut c, &angles, 100.0, true);
        assert_eq!(c.reps(), 0);
    }

    #[test]
    fn test_second_rep_inside_cooldown_suppressed() {
        let mut config = EngineConfig::side();
        config.min_rep_duration_ms = 0.0;
        let mut c = RepCounter::new(&config);

        // First rep, generous timing
        let first = [170.0, 140.0, 85.0, 85.0, 85.0, 130.0, 170.0, 170.0, 170.0];
        let mut t = 0.0;
        for &angle in &first {
            c.tick(angle, t, true);
            t += 100.0;
        }
        assert_eq!(c.reps(), 1);

        // Second full cycle crammed into 80ms, well inside the 350ms cooldown
        let second = [140.0, 85.0, 85.0, 85.0, 130.0, 170.0, 170.0, 170.0];
        for &angle in &second {
            c.tick(angle, t, true);
            t += 10.0;
        }
        assert_eq!(c.reps(), 1);
        assert_eq!(c.phase(), Phase::Up);
    }

    #[test]
    fn test_impossibly_fast_rep_rejected() {
        let mut c = counter();
        // Whole cycle inside ~80ms: min_rep_duration_ms (350) rejects it
        let angles = [170.0, 140.0, 85.0, 85.0, 85.0, 130.0, 170.0, 170.0, 170.0];
        run(&mut c, &angles, 10.0, true);
        assert_eq!(c.reps(), 0);
        assert_eq!(c.phase(), Phase::Up);
    }

    #[test]
    fn test_depth_block_stalls_bottom() {
        let mut c = counter();
        // Angle machine alone would confirm Down, but depth never approves
        let angles = [170.0, 140.0, 85.0, 85.0, 85.0, 85.0, 130.0, 170.0, 170.0, 170.0];
        run(&mut c, &angles, 100.0, false);
        assert_eq!(c.reps(), 0);
        assert_eq!(c.phase(), Phase::Up);
    }

    #[test]
    fn test_depth_arriving_late_still_counts() {
        let mut c = counter();
        let mut t = 0.0;
        let mut step = |c: &mut RepCounter, angle: f32, depth: bool| {
            let out = c.tick(angle, t, depth);
            t += 100.0;
            out
        };
        step(&mut c, 170.0, false);
        step(&mut c, 140.0, false);
        // At the bottom but torso not yet low enough
        step(&mut c, 85.0, false);
        step(&mut c, 85.0, false);
        step(&mut c, 85.0, false);
        // Torso catches up; debounce already satisfied
        assert_eq!(step(&mut c, 85.0, true), TickOutcome::BottomReached);
        step(&mut c, 130.0, true);
        step(&mut c, 170.0, true);
        step(&mut c, 170.0, true);
        assert_eq!(step(&mut c, 170.0, true), TickOutcome::RepCounted);
        assert_eq!(c.reps(), 1);
    }

    #[test]
    fn test_nan_angle_is_noop() {
        let mut c = counter();
        c.tick(140.0, 0.0, true);
        assert_eq!(c.phase(), Phase::GoingDown);
        assert_eq!(c.tick(f32::NAN, 100.0, true), TickOutcome::None);
        assert_eq!(c.phase(), Phase::GoingDown);
        assert_eq!(c.tick(250.0, 200.0, true), TickOutcome::None);
        assert_eq!(c.phase(), Phase::GoingDown);
    }

    #[test]
    fn test_reps_never_decrease() {
        let mut c = counter();
        let mut t = 0.0;
        let mut max_seen = 0;
        // Noisy oscillation around both thresholds
        let angles = [
            170.0, 150.0, 95.0, 85.0, 100.0, 85.0, 85.0, 85.0, 120.0, 160.0, 158.0, 170.0, 170.0,
            170.0, 140.0, 85.0, 85.0, 85.0, 160.0, 170.0, 170.0,
        ];
        for &angle in &angles {
            c.tick(angle, t, true);
            t += 100.0;
            assert!(c.reps() >= max_seen);
            max_seen = c.reps();
        }
    }

    #[test]
    fn test_calibrated_threshold_applies() {
        let mut c = counter();
        c.set_up_angle(140.0);
        // 150 never reaches the default 155 lockout, but clears 140
        let angles = [150.0, 120.0, 85.0, 85.0, 85.0, 120.0, 145.0, 145.0, 145.0];
        run(&mut c, &angles, 100.0, true);
        assert_eq!(c.reps(), 1);
    }
}
