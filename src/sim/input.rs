//! Input samplers
//!
//! Platform events are converted into tagged samples by per-event adapters
//! (see `platform::web::adapters`); everything here consumes those samples
//! uniformly.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::MotionConfig;
use crate::{NEUTRAL_POINT, clamp_unit};

/// A pointer or single-touch position in client (viewport) pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
}

impl PointerSample {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Screen rectangle of the container the pointer is measured against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Normalized `(sx, sy)` inside the rectangle, clamped to [0,1]².
    ///
    /// Degenerate rectangles or non-finite samples map to the neutral point.
    pub fn normalize(&self, sample: PointerSample) -> Vec2 {
        let usable = |scale: f32| scale.is_finite() && scale > 0.0;
        if !usable(self.width) || !usable(self.height) {
            return NEUTRAL_POINT;
        }
        let sx = (sample.x - self.left) / self.width;
        let sy = (sample.y - self.top) / self.height;
        if !sx.is_finite() || !sy.is_finite() {
            return NEUTRAL_POINT;
        }
        Vec2::new(clamp_unit(sx), clamp_unit(sy))
    }
}

/// One device-orientation reading; either axis may be missing
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrientationReading {
    /// Front-back tilt (degrees)
    pub beta: Option<f32>,
    /// Left-right tilt (degrees)
    pub gamma: Option<f32>,
}

impl OrientationReading {
    pub fn new(beta: Option<f32>, gamma: Option<f32>) -> Self {
        Self { beta, gamma }
    }

    /// Both axes, if present and finite
    pub fn axes(&self) -> Option<(f32, f32)> {
        match (self.beta, self.gamma) {
            (Some(b), Some(g)) if b.is_finite() && g.is_finite() => Some((b, g)),
            _ => None,
        }
    }
}

/// Pointer-derived tilt targets (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerTilt {
    pub target_pitch: f32,
    pub target_roll: f32,
    /// Pointer currently inside the container
    pub inside: bool,
    /// Last normalized position, used as the manual gaze
    pub gaze: Vec2,
}

impl PointerTilt {
    pub fn new() -> Self {
        Self {
            gaze: NEUTRAL_POINT,
            ..Default::default()
        }
    }

    /// Apply a pointer/touch sample measured against `rect`
    pub fn sample(&mut self, sample: PointerSample, rect: &Rect, config: &MotionConfig) {
        let s = rect.normalize(sample);
        self.target_roll = (s.x * 2.0 - 1.0) * config.max_roll;
        self.target_pitch = -(s.y * 2.0 - 1.0) * config.max_pitch;
        self.gaze = s;
        self.inside = true;
    }

    /// Pointer left / touch ended: relax toward neutral
    pub fn release(&mut self) {
        self.target_pitch = 0.0;
        self.target_roll = 0.0;
        self.inside = false;
    }

    pub fn target(&self) -> Vec2 {
        Vec2::new(self.target_pitch, self.target_roll)
    }
}

/// Low-pass-filtered gyroscope targets (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GyroTilt {
    pub target_pitch: f32,
    pub target_roll: f32,
    /// Latches true on the first valid reading
    pub has_signal: bool,
}

impl GyroTilt {
    /// Filter in one reading. Returns false (state untouched) when an axis is missing.
    pub fn sample(&mut self, reading: OrientationReading, config: &MotionConfig) -> bool {
        let Some((beta, gamma)) = reading.axes() else {
            return false;
        };

        let beta = beta.clamp(-config.beta_range, config.beta_range);
        let gamma = gamma.clamp(-config.gamma_range, config.gamma_range);
        let pitch = (beta / config.beta_range) * config.max_pitch * config.gyro_gain;
        let roll = (gamma / config.gamma_range) * config.max_roll * config.gyro_gain;

        let a = config.gyro_low_pass;
        self.target_pitch = self.target_pitch * (1.0 - a) + pitch * a;
        self.target_roll = self.target_roll * (1.0 - a) + roll * a;
        self.has_signal = true;
        true
    }

    pub fn target(&self) -> Vec2 {
        Vec2::new(self.target_pitch, self.target_roll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rect() -> Rect {
        Rect::new(100.0, 50.0, 400.0, 300.0)
    }

    #[test]
    fn test_top_right_corner_tilts_up_and_right() {
        let config = MotionConfig::default();
        let mut tilt = PointerTilt::new();
        tilt.sample(PointerSample::new(500.0, 50.0), &rect(), &config);

        assert!((tilt.target_roll - 30.0).abs() < 1e-4);
        assert!((tilt.target_pitch - 30.0).abs() < 1e-4);
        assert_eq!(tilt.gaze, Vec2::new(1.0, 0.0));
        assert!(tilt.inside);
    }

    #[test]
    fn test_release_resets_targets() {
        let config = MotionConfig::default();
        let mut tilt = PointerTilt::new();
        tilt.sample(PointerSample::new(120.0, 330.0), &rect(), &config);
        tilt.release();

        assert_eq!(tilt.target(), Vec2::ZERO);
        assert!(!tilt.inside);
        // Manual gaze is kept for the hold window
        assert!(tilt.gaze.x < 0.1);
    }

    #[test]
    fn test_degenerate_rect_is_neutral() {
        let sample = PointerSample::new(10.0, 10.0);
        assert_eq!(Rect::new(0.0, 0.0, 0.0, 100.0).normalize(sample), NEUTRAL_POINT);
        assert_eq!(
            Rect::new(0.0, 0.0, f32::NAN, 100.0).normalize(sample),
            NEUTRAL_POINT
        );
        assert_eq!(
            rect().normalize(PointerSample::new(f32::INFINITY, 0.0)),
            NEUTRAL_POINT
        );
    }

    #[test]
    fn test_gyro_clamps_and_filters() {
        let config = MotionConfig::default();
        let mut gyro = GyroTilt::default();

        assert!(gyro.sample(OrientationReading::new(Some(70.0), Some(0.0)), &config));
        assert!(gyro.has_signal);
        // 70 clamps to 35 -> 30 * 1.45 = 43.5, filtered by 0.32
        assert!((gyro.target_pitch - 43.5 * 0.32).abs() < 1e-3);

        for _ in 0..200 {
            gyro.sample(OrientationReading::new(Some(70.0), Some(-90.0)), &config);
        }
        assert!((gyro.target_pitch - 43.5).abs() < 1e-2);
        assert!((gyro.target_roll + 43.5).abs() < 1e-2);
    }

    #[test]
    fn test_gyro_skips_missing_axis() {
        let config = MotionConfig::default();
        let mut gyro = GyroTilt::default();
        gyro.sample(OrientationReading::new(Some(10.0), Some(10.0)), &config);
        let before = gyro;

        assert!(!gyro.sample(OrientationReading::new(None, Some(20.0)), &config));
        assert!(!gyro.sample(OrientationReading::new(Some(20.0), None), &config));
        assert_eq!(gyro, before);
    }

    proptest! {
        #[test]
        fn prop_gaze_stays_in_unit_square(x in -1e6f32..1e6, y in -1e6f32..1e6) {
            let s = rect().normalize(PointerSample::new(x, y));
            prop_assert!((0.0..=1.0).contains(&s.x));
            prop_assert!((0.0..=1.0).contains(&s.y));
        }

        #[test]
        fn prop_gyro_target_bounded(
            readings in proptest::collection::vec((-720f32..720.0, -720f32..720.0), 1..64)
        ) {
            let config = MotionConfig::default();
            let bound = config.max_pitch * config.gyro_gain * 1.2;
            let mut gyro = GyroTilt::default();
            for (beta, gamma) in readings {
                gyro.sample(OrientationReading::new(Some(beta), Some(gamma)), &config);
                prop_assert!(gyro.target_pitch.abs() <= bound);
                prop_assert!(gyro.target_roll.abs() <= bound);
            }
        }
    }
}
