//! Drop-and-bounce entrance
//!
//! The card falls in from above the viewport, bounces a couple of times with a
//! roll wobble and a gloss flash on each contact, then comes to rest for good.

use rand::Rng;
use rand_pcg::Pcg32;

use crate::settings::MotionConfig;

/// Phase of the entrance animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPhase {
    /// Before the first ground contact
    Falling,
    /// Bouncing after the first contact
    Settling,
    /// At rest; no further fall physics
    Idle,
}

/// Vertical offset of the card (viewport-height units, negative = above)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropState {
    pub height: f32,
    pub velocity: f32,
    pub phase: DropPhase,
}

impl DropState {
    pub fn new(config: &MotionConfig) -> Self {
        if config.play_drop {
            Self::falling(config)
        } else {
            Self::at_rest()
        }
    }

    fn falling(config: &MotionConfig) -> Self {
        Self {
            height: config.drop_start_height,
            velocity: 0.0,
            phase: DropPhase::Falling,
        }
    }

    pub fn at_rest() -> Self {
        Self {
            height: 0.0,
            velocity: 0.0,
            phase: DropPhase::Idle,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase != DropPhase::Idle
    }

    /// Start the entrance over
    pub fn replay(&mut self, config: &MotionConfig) {
        *self = Self::falling(config);
    }
}

/// Decorative roll twist, sprung back toward zero
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpinState {
    pub angle: f32,
    pub angular_velocity: f32,
}

impl SpinState {
    fn integrate(&mut self, config: &MotionConfig, dt: f32) {
        let accel = -config.spin_stiffness * self.angle - config.spin_damping * self.angular_velocity;
        self.angular_velocity += accel * dt;
        self.angle += self.angular_velocity * dt;
    }

    pub fn is_at_rest(&self) -> bool {
        self.angle == 0.0 && self.angular_velocity == 0.0
    }
}

/// Everything the entrance animation owns
#[derive(Debug, Clone)]
pub struct DropSimulator {
    pub drop: DropState,
    pub spin: SpinState,
    /// Extra gloss flashed on each bounce, in [0, impact_gloss]
    pub gloss_impact: f32,
    rng: Pcg32,
}

/// Something notable that happened during a drop step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropEvent {
    /// Ground contact with the post-bounce velocity
    Bounce { velocity: f32 },
    /// The card came to rest
    Landed,
}

impl DropSimulator {
    pub fn new(config: &MotionConfig, rng: Pcg32) -> Self {
        Self {
            drop: DropState::new(config),
            spin: SpinState::default(),
            gloss_impact: 0.0,
            rng,
        }
    }

    pub fn replay(&mut self, config: &MotionConfig) {
        self.drop.replay(config);
    }

    /// Advance one frame
    pub fn step(&mut self, config: &MotionConfig, dt: f32) -> Option<DropEvent> {
        let mut event = None;

        if self.drop.is_active() {
            let d = &mut self.drop;
            d.velocity += config.gravity * dt;
            d.height += d.velocity * dt;

            if d.height >= 0.0 {
                d.height = 0.0;
                d.velocity = -d.velocity * config.restitution;
                d.phase = DropPhase::Settling;
                self.gloss_impact = config.impact_gloss;
                if config.spin_impulse > 0.0 {
                    self.spin.angular_velocity +=
                        self.rng.random_range(-config.spin_impulse..=config.spin_impulse);
                }
                event = Some(DropEvent::Bounce {
                    velocity: d.velocity,
                });

                if d.velocity.abs() < config.stop_velocity {
                    *d = DropState::at_rest();
                    event = Some(DropEvent::Landed);
                }
            }
            self.spin.integrate(config, dt);
        } else if !self.spin.is_at_rest() {
            let eps = crate::consts::SPIN_REST_EPSILON;
            if self.spin.angle.abs() > eps || self.spin.angular_velocity.abs() > eps {
                self.spin.integrate(config, dt);
            } else {
                self.spin = SpinState::default();
            }
        }

        self.gloss_impact = (self.gloss_impact - config.impact_decay * dt).max(0.0);
        event
    }
}
