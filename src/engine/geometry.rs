//! Joint geometry - angles, distances, midpoints
//!
//! All positions are normalized screen coordinates (0-1) as delivered by
//! MediaPipe Pose. Pure functions, no state.

use nalgebra::Point2;

/// Shortest representable limb segment. Anything smaller is treated as a
/// degenerate (overlapping) joint pair.
const MIN_SEGMENT: f32 = 1e-6;

/// A single 2D body point with detection confidence
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    /// Detection confidence (0-1) from the pose model
    pub visibility: f32,
}

impl Point {
    pub fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self { x, y, visibility }
    }

    pub fn coords(&self) -> Point2<f32> {
        Point2::new(self.x, self.y)
    }
}

/// Calculate the angle at vertex `b` formed by rays b→a and b→c
///
/// Uses the difference of atan2 bearings; reflex angles are folded so the
/// result is always in 0-180 degrees:
/// - 180° = a, b, c collinear with b in the middle (arm fully straight)
/// - 0°   = a and c on the same ray from b (arm folded shut)
///
/// Returns NaN when `a` or `c` coincides with `b` (zero-length limb).
/// Callers must gate on `is_finite()` before acting on the result.
pub fn calculate_angle(a: Point, b: Point, c: Point) -> f32 {
    let ba = a.coords() - b.coords();
    let bc = c.coords() - b.coords();

    if ba.norm() < MIN_SEGMENT || bc.norm() < MIN_SEGMENT {
        return f32::NAN;
    }

    let bearing_a = ba.y.atan2(ba.x);
    let bearing_c = bc.y.atan2(bc.x);

    let mut angle = (bearing_c - bearing_a).to_degrees().abs();
    if angle > 180.0 {
        angle = 360.0 - angle;
    }
    angle
}

/// Euclidean distance between two points
pub fn distance(a: Point, b: Point) -> f32 {
    (b.coords() - a.coords()).norm()
}

/// Componentwise midpoint
///
/// Visibility of the result is the minimum of the two inputs, so a pair
/// containing one barely-detected joint stays barely-detected.
pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new(
        (a.x + b.x) / 2.0,
        (a.y + b.y) / 2.0,
        a.visibility.min(b.visibility),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y, 1.0)
    }

    #[test]
    fn test_straight_limb_is_180() {
        // b between a and c on a line
        let angle = calculate_angle(p(0.0, 0.0), p(0.5, 0.0), p(1.0, 0.0));
        assert!((angle - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_folded_limb_is_0() {
        // a and c on the same ray from b
        let angle = calculate_angle(p(1.0, 0.0), p(0.0, 0.0), p(2.0, 0.0));
        assert!(angle.abs() < 1e-3);
    }

    #[test]
    fn test_right_angle() {
        let angle = calculate_angle(p(1.0, 0.0), p(0.0, 0.0), p(0.0, 1.0));
        assert!((angle - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_reflex_angle_folds_below_180() {
        // c placed so the raw bearing difference exceeds 180 degrees
        let angle = calculate_angle(p(1.0, 0.0), p(0.0, 0.0), p(0.5, -0.1));
        assert!(angle <= 180.0);
        assert!(angle >= 0.0);
    }

    #[test]
    fn test_degenerate_limb_is_nan() {
        let angle = calculate_angle(p(0.5, 0.5), p(0.5, 0.5), p(1.0, 1.0));
        assert!(angle.is_nan());
    }

    #[test]
    fn test_distance() {
        assert!((distance(p(0.0, 0.0), p(3.0, 4.0)) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_midpoint_takes_min_visibility() {
        let a = Point::new(0.0, 0.0, 0.9);
        let b = Point::new(1.0, 0.5, 0.3);
        let m = midpoint(a, b);
        assert!((m.x - 0.5).abs() < 1e-6);
        assert!((m.y - 0.25).abs() < 1e-6);
        assert!((m.visibility - 0.3).abs() < 1e-6);
    }
}
