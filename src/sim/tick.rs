//! Per-frame simulation step
//!
//! Input samplers run on their events between frames; a frame then advances
//! drop/bounce, fusion, the rotation spring and the highlight, in that order.

use super::drop::{DropEvent, DropState, SpinState};
use super::fusion::fuse;
use super::highlight::GazePoint;
use super::spring::DisplayRotation;
use super::state::EngineState;
use crate::settings::MotionConfig;

/// A component that went non-finite and was reset this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Rotation,
    Entrance,
    Gaze,
}

/// What a frame produced besides the new state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub drop_event: Option<DropEvent>,
    pub faults: Vec<Fault>,
}

/// Advance the card by one frame. `dt` must already be clamped.
pub fn tick(state: &mut EngineState, config: &MotionConfig, dt: f32) -> TickReport {
    let mut report = TickReport {
        drop_event: state.entrance.step(config, dt),
        ..Default::default()
    };

    let target = fuse(
        &state.pointer,
        &state.gyro,
        &state.permission,
        config.gyro_weight,
    );
    state.rotation.step(target, config, dt);

    state
        .gaze
        .update(&state.pointer, &state.rotation, config, dt);

    state.frames += 1;

    recover_non_finite(state, &mut report);
    report
}

/// Reset anything that would publish NaN/inf
fn recover_non_finite(state: &mut EngineState, report: &mut TickReport) {
    if !state.rotation.is_finite() {
        state.rotation = DisplayRotation::default();
        report.faults.push(Fault::Rotation);
    }

    let e = &mut state.entrance;
    let entrance_ok = e.drop.height.is_finite()
        && e.drop.velocity.is_finite()
        && e.spin.angle.is_finite()
        && e.spin.angular_velocity.is_finite()
        && e.gloss_impact.is_finite();
    if !entrance_ok {
        e.drop = DropState::at_rest();
        e.spin = SpinState::default();
        e.gloss_impact = 0.0;
        report.faults.push(Fault::Entrance);
    }

    if !state.gaze.point.is_finite() {
        state.gaze = GazePoint::default();
        report.faults.push(Fault::Gaze);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::drop::DropPhase;
    use crate::sim::input::{PointerSample, Rect};
    use crate::sim::permission::PermissionApi;

    const DT: f32 = 1.0 / 60.0;

    fn state(config: &MotionConfig) -> EngineState {
        EngineState::new(12345, PermissionApi::Implicit, config)
    }

    #[test]
    fn test_entrance_then_rest() {
        let config = MotionConfig::default();
        let mut s = state(&config);
        assert_eq!(s.entrance.drop.phase, DropPhase::Falling);

        let mut landed = false;
        for _ in 0..(60 * 5) {
            let report = tick(&mut s, &config, DT);
            assert!(report.faults.is_empty());
            landed |= report.drop_event == Some(DropEvent::Landed);
        }
        assert!(landed);
        assert_eq!(s.entrance.drop.phase, DropPhase::Idle);
        assert_eq!(s.frames, 300);
    }

    #[test]
    fn test_corner_pointer_settles_gaze_to_corner() {
        let config = MotionConfig::default();
        let mut s = state(&config);
        s.pointer.sample(
            PointerSample::new(300.0, 0.0),
            &Rect::new(0.0, 0.0, 300.0, 200.0),
            &config,
        );

        for _ in 0..(60 * 3) {
            tick(&mut s, &config, DT);
        }
        assert!((s.rotation.roll.current - 30.0).abs() < 0.1);
        assert!((s.rotation.pitch.current - 30.0).abs() < 0.1);
        let pct = s.gaze.percent();
        assert!(pct.x > 99.0, "gaze x {}", pct.x);
        assert!(pct.y < 1.0, "gaze y {}", pct.y);
    }

    #[test]
    fn test_non_finite_state_recovers() {
        let config = MotionConfig::default();
        let mut s = state(&config);
        s.rotation.pitch.velocity = f32::NAN;
        s.entrance.drop.velocity = f32::INFINITY;

        let report = tick(&mut s, &config, DT);
        assert!(report.faults.contains(&Fault::Rotation));
        assert!(report.faults.contains(&Fault::Entrance));
        assert!(s.rotation.is_finite());
        assert!(s.gaze.point.is_finite());
        assert!(!s.entrance.drop.is_active());
    }

    #[test]
    fn test_determinism() {
        let config = MotionConfig::default();
        let mut a = state(&config);
        let mut b = state(&config);
        for i in 0..240 {
            if i == 30 {
                let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
                a.pointer.sample(PointerSample::new(20.0, 70.0), &rect, &config);
                b.pointer.sample(PointerSample::new(20.0, 70.0), &rect, &config);
            }
            tick(&mut a, &config, DT);
            tick(&mut b, &config, DT);
        }
        assert_eq!(a.rotation, b.rotation);
        assert_eq!(a.entrance.spin, b.entrance.spin);
        assert_eq!(a.gaze, b.gaze);
    }
}
