//! Damped-spring display rotation
//!
//! Targets can jump (pointer re-entry, gyro enable); the spring keeps the
//! visible rotation continuous.

use glam::Vec2;

use crate::settings::MotionConfig;

/// One spring-integrated axis
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpringAxis {
    pub current: f32,
    pub velocity: f32,
}

impl SpringAxis {
    /// Semi-implicit Euler step toward `target`
    pub fn step(&mut self, target: f32, stiffness: f32, damping: f32, dt: f32) {
        let accel = (target - self.current) * stiffness - self.velocity * damping;
        self.velocity += accel * dt;
        self.current += self.velocity * dt;
    }
}

/// The user-visible rotation (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayRotation {
    pub pitch: SpringAxis,
    pub roll: SpringAxis,
}

impl DisplayRotation {
    /// Integrate both axes independently; `target` is (pitch, roll)
    pub fn step(&mut self, target: Vec2, config: &MotionConfig, dt: f32) {
        self.pitch.step(target.x, config.stiffness, config.damping, dt);
        self.roll.step(target.y, config.stiffness, config.damping, dt);
    }

    pub fn angles(&self) -> Vec2 {
        Vec2::new(self.pitch.current, self.roll.current)
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.pitch.velocity, self.roll.velocity)
    }

    /// Magnitude of the angular velocity (deg/s)
    pub fn speed(&self) -> f32 {
        self.velocity().length()
    }

    pub fn is_finite(&self) -> bool {
        self.angles().is_finite() && self.velocity().is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_converges_to_constant_target() {
        let config = MotionConfig::default();
        for target in [
            Vec2::new(30.0, -30.0),
            Vec2::new(-43.5, 12.0),
            Vec2::new(0.0, 0.0),
        ] {
            let mut rot = DisplayRotation {
                pitch: SpringAxis {
                    current: -20.0,
                    velocity: 150.0,
                },
                ..Default::default()
            };
            for _ in 0..120 {
                rot.step(target, &config, DT);
            }
            assert!((rot.angles() - target).abs().max_element() < 0.1);
            assert!(rot.speed() < 0.01, "speed {}", rot.speed());
        }
    }

    #[test]
    fn test_jump_is_continuous() {
        let config = MotionConfig::default();
        let mut rot = DisplayRotation::default();
        rot.step(Vec2::new(30.0, 30.0), &config, DT);
        // One frame moves only a fraction of the way
        assert!(rot.pitch.current > 0.0 && rot.pitch.current < 2.0);
    }

    #[test]
    fn test_stable_at_max_dt() {
        let config = MotionConfig::default();
        let mut rot = DisplayRotation::default();
        for _ in 0..300 {
            rot.step(Vec2::new(-30.0, 30.0), &config, config.max_dt);
            assert!(rot.is_finite());
            assert!(rot.angles().abs().max_element() < 60.0);
        }
    }
}
