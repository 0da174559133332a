//! Shine position and gloss intensity
//!
//! The shine follows the pointer while it is on the card (and briefly after it
//! leaves), otherwise it tracks the card's own rotation so gyro tilt and the
//! relaxing spring still move the highlight.

use glam::Vec2;

use super::input::PointerTilt;
use super::spring::DisplayRotation;
use crate::settings::MotionConfig;
use crate::{NEUTRAL_POINT, clamp_unit, finite_or};

/// Blended highlight coordinate in [0,1]²
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazePoint {
    pub point: Vec2,
    /// Seconds left during which the last pointer sample still counts
    hold_remaining: f32,
}

impl Default for GazePoint {
    fn default() -> Self {
        Self {
            point: NEUTRAL_POINT,
            hold_remaining: 0.0,
        }
    }
}

/// Gaze derived purely from the display rotation
pub fn auto_gaze(rotation: &DisplayRotation, config: &MotionConfig) -> Vec2 {
    let pitch_norm = rotation.pitch.current / config.max_pitch;
    let roll_norm = rotation.roll.current / config.max_roll;
    let x = (roll_norm + 1.0) / 2.0;
    let y = (-pitch_norm + 1.0) / 2.0;
    if !x.is_finite() || !y.is_finite() {
        return NEUTRAL_POINT;
    }
    Vec2::new(clamp_unit(x), clamp_unit(y))
}

impl GazePoint {
    /// Pointer is inside or was within the hold window
    pub fn manual_recent(&self, pointer: &PointerTilt) -> bool {
        pointer.inside || self.hold_remaining > 0.0
    }

    /// Move toward the chosen source for this frame
    pub fn update(
        &mut self,
        pointer: &PointerTilt,
        rotation: &DisplayRotation,
        config: &MotionConfig,
        dt: f32,
    ) {
        let auto = auto_gaze(rotation, config);
        let source = if self.manual_recent(pointer) {
            let w = config.manual_gaze_weight;
            pointer.gaze * w + auto * (1.0 - w)
        } else {
            auto
        };

        if pointer.inside {
            self.hold_remaining = config.gaze_hold_secs;
        } else {
            self.hold_remaining = (self.hold_remaining - dt).max(0.0);
        }

        let next = self.point.lerp(source, config.gaze_smoothing);
        self.point = Vec2::new(
            clamp_unit(finite_or(next.x, 0.5)),
            clamp_unit(finite_or(next.y, 0.5)),
        );
    }

    /// Percent coordinates for the view layer
    pub fn percent(&self) -> Vec2 {
        self.point * 100.0
    }
}

/// Gloss intensity from rotational speed: base + capped boost
pub fn gloss_intensity(rotation: &DisplayRotation, config: &MotionConfig) -> f32 {
    let speed = finite_or(rotation.speed(), 0.0);
    config.gloss_base + (speed * config.gloss_speed_gain).min(config.gloss_max_boost)
}
