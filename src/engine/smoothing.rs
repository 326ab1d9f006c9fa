//! Exponential smoothing for noisy landmark streams
//!
//! Raw per-frame joint coordinates carry enough sensor noise to flicker the
//! phase state machine near its thresholds. An EMA trades a small fixed lag
//! for motion the discrete thresholds can rely on.

use super::geometry::Point;

/// Exponential moving average over a scalar stream
///
/// Update rule: `smoothed = alpha * raw + (1 - alpha) * previous`.
/// The very first sample passes through unchanged. Higher alpha = less lag,
/// more jitter; typical values here are 0.35-0.45.
pub struct Ema {
    alpha: f32,
    value: Option<f32>,
}

impl Ema {
    pub fn new(alpha: f32) -> Self {
        Self { alpha, value: None }
    }

    /// Feed one raw sample, returns the smoothed value
    pub fn add(&mut self, raw: f32) -> f32 {
        let smoothed = match self.value {
            None => raw,
            Some(prev) => self.alpha * raw + (1.0 - self.alpha) * prev,
        };
        self.value = Some(smoothed);
        smoothed
    }

    /// Current smoothed value, None until the first sample arrives
    pub fn value(&self) -> Option<f32> {
        self.value
    }

    /// Clear to uninitialized so the next `add` reseeds
    pub fn reset(&mut self) {
        self.value = None;
    }
}

/// Independent x/y EMA pair for a single joint
///
/// One instance per joint for the life of a session - sharing a smoother
/// between joints would blend their histories together.
pub struct PointSmoother {
    x: Ema,
    y: Ema,
}

impl PointSmoother {
    pub fn new(alpha: f32) -> Self {
        Self {
            x: Ema::new(alpha),
            y: Ema::new(alpha),
        }
    }

    /// Smooth a joint position. Visibility passes through untouched.
    pub fn add(&mut self, point: Point) -> Point {
        Point::new(self.x.add(point.x), self.y.add(point.y), point.visibility)
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_passes_through() {
        let mut ema = Ema::new(0.4);
        assert_eq!(ema.add(123.5), 123.5);
    }

    #[test]
    fn test_second_sample_blends() {
        let mut ema = Ema::new(0.4);
        ema.add(100.0);
        let v = ema.add(200.0);
        // 0.4 * 200 + 0.6 * 100
        assert!((v - 140.0).abs() < 1e-4);
    }

    #[test]
    fn test_constant_stream_converges() {
        let mut ema = Ema::new(0.4);
        ema.add(10.0);
        for _ in 0..50 {
            ema.add(42.0);
        }
        let v = ema.value().unwrap();
        assert!((v - 42.0).abs() < 1e-3);
    }

    #[test]
    fn test_reset_reseeds() {
        let mut ema = Ema::new(0.4);
        ema.add(100.0);
        ema.add(200.0);
        ema.reset();
        assert_eq!(ema.value(), None);
        assert_eq!(ema.add(7.0), 7.0);
    }

    #[test]
    fn test_point_smoother_keeps_visibility() {
        let mut smoother = PointSmoother::new(0.5);
        smoother.add(Point::new(0.0, 0.0, 0.9));
        let p = smoother.add(Point::new(1.0, 1.0, 0.3));
        assert!((p.x - 0.5).abs() < 1e-6);
        assert!((p.y - 0.5).abs() < 1e-6);
        assert!((p.visibility - 0.3).abs() < 1e-6);
    }
}
