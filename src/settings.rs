//! Motion tuning
//!
//! Every physics constant is data-driven so a host page can soften or exaggerate
//! the card without rebuilding. Parsed from JSON (e.g. a `data-motion-config`
//! attribute), missing fields take the defaults in [`crate::consts`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Configuration problems (never fatal to the card, callers fall back to defaults)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid motion config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("`{field}` must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f32,
    },
    #[error("`{field}` = {value} must stay {bound} {limit} at max_dt")]
    Unstable {
        field: &'static str,
        bound: &'static str,
        limit: f32,
        value: f32,
    },
}

/// Tunable parameters for one card engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    // === Tilt ===
    /// Max pitch/roll produced by pointer input (degrees)
    pub max_pitch: f32,
    pub max_roll: f32,
    /// Display rotation spring
    pub stiffness: f32,
    pub damping: f32,
    /// Frame delta clamp (seconds)
    pub max_dt: f32,

    // === Gyroscope ===
    pub gyro_gain: f32,
    pub beta_range: f32,
    pub gamma_range: f32,
    pub gyro_low_pass: f32,
    pub gyro_weight: f32,

    // === Drop-in ===
    /// Play the entrance drop when the engine starts
    pub play_drop: bool,
    pub drop_start_height: f32,
    pub gravity: f32,
    pub restitution: f32,
    pub stop_velocity: f32,
    pub spin_stiffness: f32,
    pub spin_damping: f32,
    pub spin_impulse: f32,
    pub impact_gloss: f32,
    pub impact_decay: f32,

    // === Gloss ===
    pub gloss_base: f32,
    pub gloss_max_boost: f32,
    pub gloss_speed_gain: f32,
    pub manual_gaze_weight: f32,
    pub gaze_smoothing: f32,
    /// Seconds the last pointer sample keeps steering the gaze after leaving
    pub gaze_hold_secs: f32,

    // === Flip gesture ===
    pub swipe_threshold: f32,
    pub swipe_vertical_limit: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            max_pitch: MAX_PITCH,
            max_roll: MAX_ROLL,
            stiffness: SPRING_STIFFNESS,
            damping: SPRING_DAMPING,
            max_dt: MAX_DT,

            gyro_gain: GYRO_GAIN,
            beta_range: BETA_RANGE,
            gamma_range: GAMMA_RANGE,
            gyro_low_pass: GYRO_LOW_PASS,
            gyro_weight: GYRO_WEIGHT,

            play_drop: true,
            drop_start_height: DROP_START_HEIGHT,
            gravity: DROP_GRAVITY,
            restitution: DROP_RESTITUTION,
            stop_velocity: DROP_STOP_VELOCITY,
            spin_stiffness: SPIN_STIFFNESS,
            spin_damping: SPIN_DAMPING,
            spin_impulse: SPIN_IMPULSE,
            impact_gloss: IMPACT_GLOSS,
            impact_decay: IMPACT_DECAY,

            gloss_base: GLOSS_BASE,
            gloss_max_boost: GLOSS_MAX_BOOST,
            gloss_speed_gain: GLOSS_SPEED_GAIN,
            manual_gaze_weight: MANUAL_GAZE_WEIGHT,
            gaze_smoothing: GAZE_SMOOTHING,
            gaze_hold_secs: GAZE_HOLD_SECS,

            swipe_threshold: SWIPE_THRESHOLD,
            swipe_vertical_limit: SWIPE_VERTICAL_LIMIT,
        }
    }
}

impl MotionConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config, logging and falling back to defaults on any problem
    pub fn from_json_or_default(json: Option<&str>) -> Self {
        match json.map(Self::from_json) {
            Some(Ok(config)) => {
                log::info!("Loaded motion config");
                config
            }
            Some(Err(e)) => {
                log::warn!("Ignoring motion config: {e}");
                Self::default()
            }
            None => Self::default(),
        }
    }

    /// Reject values that would make the integrators diverge or emit NaN
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("max_pitch", self.max_pitch),
            ("max_roll", self.max_roll),
            ("stiffness", self.stiffness),
            ("max_dt", self.max_dt),
            ("gyro_gain", self.gyro_gain),
            ("beta_range", self.beta_range),
            ("gamma_range", self.gamma_range),
            ("gravity", self.gravity),
            ("spin_stiffness", self.spin_stiffness),
            ("swipe_threshold", self.swipe_threshold),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::OutOfRange {
                    field,
                    expected: "a positive number",
                    value,
                });
            }
        }

        let non_negative = [
            ("damping", self.damping),
            ("stop_velocity", self.stop_velocity),
            ("spin_damping", self.spin_damping),
            ("spin_impulse", self.spin_impulse),
            ("impact_gloss", self.impact_gloss),
            ("impact_decay", self.impact_decay),
            ("gloss_base", self.gloss_base),
            ("gloss_max_boost", self.gloss_max_boost),
            ("gloss_speed_gain", self.gloss_speed_gain),
            ("gaze_hold_secs", self.gaze_hold_secs),
            ("swipe_vertical_limit", self.swipe_vertical_limit),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::OutOfRange {
                    field,
                    expected: "zero or more",
                    value,
                });
            }
        }

        let unit = [
            ("gyro_low_pass", self.gyro_low_pass),
            ("gyro_weight", self.gyro_weight),
            ("manual_gaze_weight", self.manual_gaze_weight),
            ("gaze_smoothing", self.gaze_smoothing),
        ];
        for (field, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    field,
                    expected: "within [0, 1]",
                    value,
                });
            }
        }

        if !(0.0..1.0).contains(&self.restitution) {
            return Err(ConfigError::OutOfRange {
                field: "restitution",
                expected: "within [0, 1)",
                value: self.restitution,
            });
        }
        if !self.drop_start_height.is_finite() {
            return Err(ConfigError::OutOfRange {
                field: "drop_start_height",
                expected: "finite",
                value: self.drop_start_height,
            });
        }
        if self.max_dt > MAX_DT {
            return Err(ConfigError::OutOfRange {
                field: "max_dt",
                expected: "at most 1/30 s",
                value: self.max_dt,
            });
        }

        let springs = [
            ("stiffness", self.stiffness, self.damping),
            ("spin_stiffness", self.spin_stiffness, self.spin_damping),
        ];
        for (field, stiffness, damping) in springs {
            let limit = stiffness_limit(damping, self.max_dt);
            if stiffness >= limit {
                return Err(ConfigError::Unstable {
                    field,
                    bound: "below",
                    limit,
                    value: stiffness,
                });
            }
        }

        // A card at rest on the floor rebounds with at most restitution * gravity * dt
        let rebound = self.restitution * self.gravity * self.max_dt;
        if self.stop_velocity <= rebound {
            return Err(ConfigError::Unstable {
                field: "stop_velocity",
                bound: "above",
                limit: rebound,
                value: self.stop_velocity,
            });
        }

        Ok(())
    }
}

/// Largest stiffness the semi-implicit spring tolerates at step `dt`.
/// Both eigenvalues stay inside the unit circle while `k*dt^2 + 2*c*dt < 4`.
fn stiffness_limit(damping: f32, dt: f32) -> f32 {
    (4.0 - 2.0 * damping * dt) / (dt * dt)
}
