//! Postcard Motion - physically animated postcard preview
//!
//! Core modules:
//! - `sim`: Per-card simulation (input sampling, drop/bounce, springs, gloss)
//! - `engine`: Event + frame entry points wrapping the simulation state
//! - `publish`: Output record and render sinks
//! - `platform`: Browser glue (listeners, frame loop, permission request)
//! - `settings`: Data-driven motion tuning

pub mod engine;
pub mod platform;
pub mod publish;
pub mod settings;
pub mod sim;

pub use engine::CardEngine;
pub use publish::{FrameOutput, RenderSink};
pub use settings::{ConfigError, MotionConfig};

use glam::Vec2;

/// Motion constants (defaults for `MotionConfig`)
pub mod consts {
    /// Largest frame delta fed to the integrators (seconds)
    pub const MAX_DT: f32 = 1.0 / 30.0;
    /// Delta used for the very first frame, before a previous timestamp exists
    pub const FIRST_FRAME_DT: f32 = 1.0 / 60.0;

    /// Tilt range (degrees)
    pub const MAX_PITCH: f32 = 30.0;
    pub const MAX_ROLL: f32 = 30.0;

    /// Display rotation spring
    pub const SPRING_STIFFNESS: f32 = 100.0;
    pub const SPRING_DAMPING: f32 = 14.0;

    /// Gloss intensity = base + min(speed * speed_gain, max_boost)
    pub const GLOSS_BASE: f32 = 0.10;
    pub const GLOSS_MAX_BOOST: f32 = 0.10;
    pub const GLOSS_SPEED_GAIN: f32 = 0.06;

    /// Gyroscope sampling
    pub const GYRO_GAIN: f32 = 1.45;
    pub const BETA_RANGE: f32 = 35.0;
    pub const GAMMA_RANGE: f32 = 35.0;
    /// Low-pass coefficient applied per orientation sample
    pub const GYRO_LOW_PASS: f32 = 0.32;
    /// Share of the fused target taken from the gyroscope when active
    pub const GYRO_WEIGHT: f32 = 0.92;

    /// Drop-and-bounce (heights in viewport-height units)
    pub const DROP_START_HEIGHT: f32 = -120.0;
    pub const DROP_GRAVITY: f32 = 400.0;
    pub const DROP_RESTITUTION: f32 = 0.2;
    pub const DROP_STOP_VELOCITY: f32 = 10.0;
    /// Roll wobble spring
    pub const SPIN_STIFFNESS: f32 = 80.0;
    pub const SPIN_DAMPING: f32 = 14.0;
    /// Random spin kick on each ground contact (deg/s, symmetric)
    pub const SPIN_IMPULSE: f32 = 5.0;
    /// Spin below this (angle and velocity) snaps to rest
    pub const SPIN_REST_EPSILON: f32 = 0.001;
    pub const IMPACT_GLOSS: f32 = 0.22;
    pub const IMPACT_DECAY: f32 = 5.5;

    /// Gaze blending
    pub const MANUAL_GAZE_WEIGHT: f32 = 0.8;
    /// Per-frame approach factor of the stored gaze toward its source
    pub const GAZE_SMOOTHING: f32 = 0.2;
    /// How long a pointer sample keeps steering the gaze after leaving (seconds)
    pub const GAZE_HOLD_SECS: f32 = 0.5;

    /// Horizontal swipe needed to flip the card (pixels)
    pub const SWIPE_THRESHOLD: f32 = 40.0;
    /// Vertical drift allowed during a flip swipe (pixels)
    pub const SWIPE_VERTICAL_LIMIT: f32 = 60.0;
}

/// Neutral gaze / pointer position in the middle of the card
pub const NEUTRAL_POINT: Vec2 = Vec2::new(0.5, 0.5);

/// Clamp into [0, 1], mapping NaN to the midpoint
#[inline]
pub fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() { 0.5 } else { v.clamp(0.0, 1.0) }
}

/// Replace a non-finite value with `fallback`
#[inline]
pub fn finite_or(v: f32, fallback: f32) -> f32 {
    if v.is_finite() { v } else { fallback }
}

/// Clamp a raw frame delta (seconds) to the integrator-safe range
#[inline]
pub fn clamp_dt(dt: f32, max_dt: f32) -> f32 {
    if dt.is_nan() { 0.0 } else { dt.clamp(0.0, max_dt) }
}
