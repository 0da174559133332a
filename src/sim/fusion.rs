//! Pointer / gyroscope target fusion

use glam::Vec2;

use super::input::{GyroTilt, PointerTilt};
use super::permission::GyroPermissionFlow;

/// Gyro contributes only once permission is granted and a reading has arrived
pub fn gyro_active(permission: &GyroPermissionFlow, gyro: &GyroTilt) -> bool {
    permission.is_granted() && gyro.has_signal
}

/// Fused (pitch, roll) target for this frame
pub fn fuse(
    pointer: &PointerTilt,
    gyro: &GyroTilt,
    permission: &GyroPermissionFlow,
    gyro_weight: f32,
) -> Vec2 {
    if gyro_active(permission, gyro) {
        gyro.target() * gyro_weight + pointer.target() * (1.0 - gyro_weight)
    } else {
        pointer.target()
    }
}
