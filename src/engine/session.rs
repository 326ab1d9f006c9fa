//! Per-frame orchestrator
//!
//! Owns every piece of per-session state: one smoother per tracked joint,
//! the rep counter, the depth gate and the optional warm-up calibrator.
//! Each incoming frame flows one direction: visibility gate → smoothing →
//! angle/depth computation → state machine tick → emitted status.

use super::calibration::Calibrator;
use super::config::{ConfigError, EngineConfig, ViewMode};
use super::depth_gate::BodyDepthTracker;
use super::geometry::{calculate_angle, distance, midpoint, Point};
use super::rep_counter::{Phase, RepCounter, TickOutcome};
use super::smoothing::{Ema, PointSmoother};

// MediaPipe Pose landmark indices (33 total)
pub const LANDMARK_COUNT: usize = 33;
pub const NOSE: usize = 0;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;

/// One frame of detector output
pub struct PoseFrame {
    pub landmarks: [Point; LANDMARK_COUNT],
    /// Monotonic milliseconds; frames must arrive strictly ordered
    pub timestamp_ms: f64,
}

/// Snapshot handed to the presentation layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionUpdate {
    pub reps: u32,
    pub phase: Phase,
    /// Current candidate rep has travelled far enough
    pub depth_ok: bool,
    /// Front mode: both elbow angles agree (always true in side mode)
    pub symmetric: bool,
}

/// What one frame produced
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    /// Something the UI cares about changed
    Update(SessionUpdate),
    /// Frame processed, nothing visible changed
    Unchanged,
    /// Required landmarks below the confidence threshold or numerically
    /// broken; state frozen
    Searching,
    /// Timestamp not strictly increasing; frame dropped
    Stale,
}

/// Dedicated smoothers for one side of the body
struct JointSmoothers {
    shoulder: PointSmoother,
    elbow: PointSmoother,
    wrist: PointSmoother,
    hip: PointSmoother,
}

impl JointSmoothers {
    fn new(alpha: f32) -> Self {
        Self {
            shoulder: PointSmoother::new(alpha),
            elbow: PointSmoother::new(alpha),
            wrist: PointSmoother::new(alpha),
            hip: PointSmoother::new(alpha),
        }
    }
}

/// Everything the engine derived from one accepted frame
struct FrameMeasure {
    angle: f32,
    /// Vertical position of the depth reference point
    reference_y: f32,
    /// Subject scale: shoulder width (front) or shoulder-to-hip (side)
    reference_extent: f32,
    symmetric: bool,
}

/// A single push-up counting session
///
/// Created per session or camera-mode change; switching modes must construct
/// a fresh session so no smoothing history leaks across contexts.
pub struct PushupSession {
    config: EngineConfig,
    counter: RepCounter,
    depth: BodyDepthTracker,
    calibrator: Option<Calibrator>,
    angle_ema: Ema,
    left: JointSmoothers,
    right: JointSmoothers,
    last_timestamp: Option<f64>,
    last_update: SessionUpdate,
    searching: bool,
}

impl PushupSession {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let calibrator = if config.calibration_frames > 0 {
            Some(Calibrator::new(config.calibration_frames))
        } else {
            None
        };
        Ok(Self {
            counter: RepCounter::new(&config),
            depth: BodyDepthTracker::new(
                config.baseline_alpha,
                config.depth_factor,
                config.min_drop,
            ),
            calibrator,
            angle_ema: Ema::new(config.angle_alpha),
            left: JointSmoothers::new(config.position_alpha),
            right: JointSmoothers::new(config.position_alpha),
            last_timestamp: None,
            last_update: SessionUpdate {
                reps: 0,
                phase: Phase::Up,
                depth_ok: false,
                symmetric: true,
            },
            config,
            searching: true,
        })
    }

    pub fn reps(&self) -> u32 {
        self.counter.reps()
    }

    pub fn phase(&self) -> Phase {
        self.counter.phase()
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn last_update(&self) -> SessionUpdate {
        self.last_update
    }

    /// End the session, yielding the final count for the caller to persist
    pub fn finish(self) -> u32 {
        self.counter.reps()
    }

    /// Process one detector frame
    pub fn process_frame(&mut self, frame: &PoseFrame) -> FrameStatus {
        // Cooldown and duration checks assume monotonic time; anything else
        // is dropped, never reordered
        if let Some(last) = self.last_timestamp {
            if frame.timestamp_ms <= last {
                return FrameStatus::Stale;
            }
        }
        self.last_timestamp = Some(frame.timestamp_ms);

        let measure = match self.config.view_mode {
            ViewMode::Front => self.measure_front(frame),
            ViewMode::Side => self.measure_side(frame),
        };
        let measure = match measure {
            Some(m) => m,
            None => {
                // Not an error: the subject is out of frame or occluded.
                // All engine state holds until a pose comes back.
                self.searching = true;
                return FrameStatus::Searching;
            }
        };
        self.searching = false;

        let angle = if measure.angle.is_finite() {
            self.angle_ema.add(measure.angle)
        } else {
            // Keep the EMA history intact; the counter treats NaN as a no-op
            f32::NAN
        };

        self.depth.set_required_drop(measure.reference_extent);

        // Warm-up calibration runs in place of counting until its window closes
        if let Some(calibrator) = self.calibrator.as_mut() {
            if calibrator.is_active() {
                if let Some(up_angle) = calibrator.observe(
                    angle,
                    self.config.down_angle,
                    self.config.hysteresis_margin,
                ) {
                    self.counter.set_up_angle(up_angle);
                }
                self.depth.update_baseline(measure.reference_y);
                return self.emit(measure.symmetric);
            }
        }

        let depth_ok = self.depth.is_depth_sufficient();
        let outcome = self
            .counter
            .tick(angle, frame.timestamp_ms, depth_ok);

        if outcome == TickOutcome::DescentStarted {
            self.depth.reset_rep();
        }

        // Keyed to the post-tick phase: the frame that leaves Up already
        // belongs to the new candidate, not to the resting baseline
        match self.counter.phase() {
            Phase::Up => self.depth.update_baseline(measure.reference_y),
            Phase::GoingDown | Phase::Down => self.depth.track_depth(measure.reference_y),
            Phase::GoingUp => {}
        }

        self.emit(measure.symmetric)
    }

    /// Publish the snapshot only when something visible changed
    fn emit(&mut self, symmetric: bool) -> FrameStatus {
        let update = SessionUpdate {
            reps: self.counter.reps(),
            phase: self.counter.phase(),
            depth_ok: self.depth.is_depth_sufficient(),
            symmetric,
        };
        if update != self.last_update {
            self.last_update = update;
            FrameStatus::Update(update)
        } else {
            FrameStatus::Unchanged
        }
    }

    /// Front view: both arms tracked, angles reconciled conservatively
    fn measure_front(&mut self, frame: &PoseFrame) -> Option<FrameMeasure> {
        let required = [
            LEFT_SHOULDER,
            RIGHT_SHOULDER,
            LEFT_ELBOW,
            RIGHT_ELBOW,
            LEFT_WRIST,
            RIGHT_WRIST,
        ];
        if !self.usable(frame, &required) {
            return None;
        }

        let l_shoulder = self.left.shoulder.add(frame.landmarks[LEFT_SHOULDER]);
        let l_elbow = self.left.elbow.add(frame.landmarks[LEFT_ELBOW]);
        let l_wrist = self.left.wrist.add(frame.landmarks[LEFT_WRIST]);
        let r_shoulder = self.right.shoulder.add(frame.landmarks[RIGHT_SHOULDER]);
        let r_elbow = self.right.elbow.add(frame.landmarks[RIGHT_ELBOW]);
        let r_wrist = self.right.wrist.add(frame.landmarks[RIGHT_WRIST]);

        let left_angle = calculate_angle(l_shoulder, l_elbow, l_wrist);
        let right_angle = calculate_angle(r_shoulder, r_elbow, r_wrist);

        // Extending one arm while pumping the other must not look like a rep:
        // diverging angles fall back to the smaller (more bent) one
        let (angle, symmetric) = match (left_angle.is_finite(), right_angle.is_finite()) {
            (true, true) => {
                if (left_angle - right_angle).abs() <= self.config.symmetry_tolerance {
                    ((left_angle + right_angle) / 2.0, true)
                } else {
                    (left_angle.min(right_angle), false)
                }
            }
            (true, false) => (left_angle, true),
            (false, true) => (right_angle, true),
            (false, false) => (f32::NAN, true),
        };

        Some(FrameMeasure {
            angle,
            reference_y: midpoint(l_shoulder, r_shoulder).y,
            reference_extent: distance(l_shoulder, r_shoulder),
            symmetric,
        })
    }

    /// Side view: the better-visible side's arm and torso
    fn measure_side(&mut self, frame: &PoseFrame) -> Option<FrameMeasure> {
        let left_score = Self::side_score(frame, LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST, LEFT_HIP);
        let right_score =
            Self::side_score(frame, RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST, RIGHT_HIP);

        let (indices, use_left) = if left_score >= right_score {
            ([LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST, LEFT_HIP], true)
        } else {
            ([RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST, RIGHT_HIP], false)
        };

        if !self.usable(frame, &indices) {
            return None;
        }

        let smoothers = if use_left {
            &mut self.left
        } else {
            &mut self.right
        };

        let shoulder = smoothers.shoulder.add(frame.landmarks[indices[0]]);
        let elbow = smoothers.elbow.add(frame.landmarks[indices[1]]);
        let wrist = smoothers.wrist.add(frame.landmarks[indices[2]]);
        let hip = smoothers.hip.add(frame.landmarks[indices[3]]);

        Some(FrameMeasure {
            angle: calculate_angle(shoulder, elbow, wrist),
            reference_y: shoulder.y,
            reference_extent: distance(shoulder, hip),
            symmetric: true,
        })
    }

    /// A landmark is usable when it is confident enough AND carries finite
    /// coordinates. A non-finite coordinate must never reach a smoother:
    /// once an EMA ingests NaN it stays NaN for the rest of the session.
    fn usable(&self, frame: &PoseFrame, indices: &[usize]) -> bool {
        indices.iter().all(|&i| {
            let landmark = frame.landmarks[i];
            landmark.visibility >= self.config.visibility_threshold
                && landmark.x.is_finite()
                && landmark.y.is_finite()
        })
    }

    fn side_score(frame: &PoseFrame, shoulder: usize, elbow: usize, wrist: usize, hip: usize) -> f32 {
        frame.landmarks[shoulder].visibility
            + frame.landmarks[elbow].visibility
            + frame.landmarks[wrist].visibility
            + frame.landmarks[hip].visibility
    }
}
