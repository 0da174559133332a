//! Card motion simulation
//!
//! Pure and platform-free so it can be unit tested natively:
//! - Caller-supplied `dt` only (already clamped)
//! - Seeded RNG only
//! - No DOM or rendering dependencies

pub mod controls;
pub mod drop;
pub mod fusion;
pub mod highlight;
pub mod input;
pub mod permission;
pub mod spring;
pub mod state;
pub mod tick;

pub use controls::{CardControls, KeyResponse};
pub use drop::{DropEvent, DropPhase, DropSimulator, DropState, SpinState};
pub use fusion::{fuse, gyro_active};
pub use highlight::{GazePoint, auto_gaze, gloss_intensity};
pub use input::{GyroTilt, OrientationReading, PointerSample, PointerTilt, Rect};
pub use permission::{
    AffordanceChange, GyroPermission, GyroPermissionFlow, PermissionApi, PermissionError, RequestAction,
    parse_permission_response,
};
pub use spring::{DisplayRotation, SpringAxis};
pub use state::EngineState;
pub use tick::{Fault, TickReport, tick};
