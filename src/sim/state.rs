//! Per-card simulation state
//!
//! One `EngineState` per visible card; nothing here is global, so any number of
//! cards can animate side by side.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::controls::CardControls;
use super::drop::DropSimulator;
use super::highlight::GazePoint;
use super::input::{GyroTilt, PointerTilt};
use super::permission::{GyroPermissionFlow, PermissionApi};
use super::spring::DisplayRotation;
use crate::settings::MotionConfig;

/// Complete motion state of one card
#[derive(Debug, Clone)]
pub struct EngineState {
    /// Seed for the bounce wobble
    pub seed: u64,
    pub pointer: PointerTilt,
    pub gyro: GyroTilt,
    pub permission: GyroPermissionFlow,
    pub entrance: DropSimulator,
    pub rotation: DisplayRotation,
    pub gaze: GazePoint,
    pub controls: CardControls,
    /// Frames simulated so far
    pub frames: u64,
}

impl EngineState {
    pub fn new(seed: u64, api: PermissionApi, config: &MotionConfig) -> Self {
        Self {
            seed,
            pointer: PointerTilt::new(),
            gyro: GyroTilt::default(),
            permission: GyroPermissionFlow::new(api),
            entrance: DropSimulator::new(config, Pcg32::seed_from_u64(seed)),
            rotation: DisplayRotation::default(),
            gaze: GazePoint::default(),
            controls: CardControls::default(),
            frames: 0,
        }
    }
}
