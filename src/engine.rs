//! Card engine: the single owner of one card's motion state
//!
//! Platform glue forwards normalized events here and calls [`CardEngine::frame`]
//! once per display refresh. Nothing in this module touches the DOM.

use glam::Vec2;

use crate::publish::FrameOutput;
use crate::settings::MotionConfig;
use crate::sim::{
    AffordanceChange, DropEvent, EngineState, KeyResponse, OrientationReading, PermissionApi, PermissionError,
    PointerSample, Rect, RequestAction, tick,
};
use crate::{clamp_dt, consts::FIRST_FRAME_DT};

/// Host predicate: true while pointer input must be ignored (e.g. editor open)
pub type InputGate = Box<dyn Fn() -> bool>;

/// Converts display-refresh timestamps into clamped frame deltas
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    /// Delta in seconds for a frame at `now_ms`, clamped to `[0, max_dt]`
    pub fn advance(&mut self, now_ms: f64, max_dt: f32) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => FIRST_FRAME_DT,
        };
        self.last_ms = Some(now_ms);
        clamp_dt(dt, max_dt)
    }
}

pub struct CardEngine {
    state: EngineState,
    config: MotionConfig,
    clock: FrameClock,
    gate: InputGate,
}

impl CardEngine {
    pub fn new(seed: u64, api: PermissionApi, config: MotionConfig) -> Self {
        Self {
            state: EngineState::new(seed, api, &config),
            config,
            clock: FrameClock::default(),
            gate: Box::new(|| false),
        }
    }

    /// Install the host's input-suppression predicate
    pub fn with_input_gate(mut self, gate: InputGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn input_suppressed(&self) -> bool {
        (self.gate)()
    }

    // === Pointer / touch ===

    pub fn pointer_moved(&mut self, sample: PointerSample, rect: Rect) {
        if self.input_suppressed() {
            return;
        }
        self.state.pointer.sample(sample, &rect, &self.config);
    }

    pub fn pointer_left(&mut self) {
        if self.input_suppressed() {
            return;
        }
        self.state.pointer.release();
    }

    /// Pointer-down / touch-start. Returns whether the platform permission API
    /// should be called now.
    pub fn pointer_down(&mut self) -> RequestAction {
        if self.input_suppressed() {
            return RequestAction::None;
        }
        self.state.controls.pointer_down();
        self.state.permission.on_gesture()
    }

    pub fn pointer_up(&mut self) {
        self.state.controls.pointer_up();
    }

    // === Flip controls ===

    /// Click on the card. Returns whether it flipped.
    pub fn click(&mut self) -> bool {
        if self.input_suppressed() {
            return false;
        }
        self.state.controls.toggle();
        true
    }

    pub fn key(&mut self, code: &str) -> KeyResponse {
        if self.input_suppressed() {
            return KeyResponse::Ignore;
        }
        self.state.controls.key(code)
    }

    pub fn touch_started(&mut self, touches: u32, at: Option<Vec2>) {
        if self.input_suppressed() {
            return;
        }
        self.state.controls.touch_start(touches, at);
    }

    /// Returns the new side if the touch was a flip swipe
    pub fn touch_ended(&mut self, at: Option<Vec2>) -> Option<bool> {
        if self.input_suppressed() {
            return None;
        }
        self.state.controls.touch_end(at, &self.config)
    }

    pub fn touch_cancelled(&mut self) {
        self.state.controls.touch_cancel();
    }

    // === Gyroscope ===

    /// Device-orientation reading. Returns whether it was fused.
    pub fn orientation(&mut self, reading: OrientationReading) -> bool {
        if reading.axes().is_none() {
            return false;
        }
        if !self.state.permission.on_reading() {
            return false;
        }
        self.state.gyro.sample(reading, &self.config)
    }

    /// Manual "enable gyro" request
    pub fn request_gyro_permission(&mut self) -> RequestAction {
        self.state.permission.on_manual_request()
    }

    pub fn permission_resolved(&mut self, result: Result<(), PermissionError>) {
        self.state.permission.resolve(result);
    }

    pub fn needs_gyro_affordance(&self) -> bool {
        self.state.permission.needs_affordance()
    }

    /// What to do with this card's gyro button, given whether it is shown
    pub fn gyro_affordance_change(&self, shown: bool) -> Option<AffordanceChange> {
        self.state.permission.affordance_change(shown)
    }

    // === Frames ===

    /// Restart the drop-in
    pub fn replay_drop(&mut self) {
        self.state.entrance.replay(&self.config);
    }

    /// Run one frame at display timestamp `now_ms` and return what to publish
    pub fn frame(&mut self, now_ms: f64) -> FrameOutput {
        let dt = self.clock.advance(now_ms, self.config.max_dt);
        self.step(dt)
    }

    /// Run one frame with an explicit (unclamped) delta in seconds
    pub fn step(&mut self, dt: f32) -> FrameOutput {
        let dt = clamp_dt(dt, self.config.max_dt);
        let report = tick(&mut self.state, &self.config, dt);
        if report.drop_event == Some(DropEvent::Landed) {
            log::info!("Card landed after {} frames", self.state.frames);
        }
        for fault in &report.faults {
            log::warn!("Non-finite {fault:?} state reset");
        }
        FrameOutput::from_state(&self.state, &self.config)
    }

    /// Current output without advancing
    pub fn output(&self) -> FrameOutput {
        FrameOutput::from_state(&self.state, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{DropPhase, GyroPermission};
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn rect() -> Rect {
        Rect::new(0.0, 0.0, 200.0, 100.0)
    }

    fn engine(api: PermissionApi) -> CardEngine {
        CardEngine::new(77, api, MotionConfig::default())
    }

    #[test]
    fn test_clock_first_frame_and_clamp() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.advance(1000.0, 1.0 / 30.0), FIRST_FRAME_DT);
        assert!((clock.advance(1016.0, 1.0 / 30.0) - 0.016).abs() < 1e-6);
        // Tab was backgrounded for 5 seconds
        assert_eq!(clock.advance(6016.0, 1.0 / 30.0), 1.0 / 30.0);
        // Timestamps going backwards never integrate negative time
        assert_eq!(clock.advance(5000.0, 1.0 / 30.0), 0.0);
    }

    #[test]
    fn test_long_stall_matches_max_dt_step() {
        let mut a = engine(PermissionApi::Unsupported);
        let mut b = engine(PermissionApi::Unsupported);
        for e in [&mut a, &mut b] {
            e.pointer_moved(PointerSample::new(200.0, 0.0), rect());
        }
        let out_a = a.step(5.0);
        let out_b = b.step(1.0 / 30.0);
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn test_suppressed_input_is_ignored_but_physics_runs() {
        let suppressed = Rc::new(Cell::new(true));
        let flag = suppressed.clone();
        let mut e = engine(PermissionApi::Required).with_input_gate(Box::new(move || flag.get()));

        e.pointer_moved(PointerSample::new(200.0, 0.0), rect());
        assert_eq!(e.pointer_down(), RequestAction::None);
        assert!(!e.click());
        assert_eq!(e.key("Enter"), KeyResponse::Ignore);
        assert_eq!(e.state().pointer.target(), Vec2::ZERO);
        assert_eq!(e.state().permission.state(), GyroPermission::Unrequested);

        let before = e.output().drop_height;
        e.step(1.0 / 60.0);
        assert!(e.output().drop_height > before);

        suppressed.set(false);
        e.pointer_moved(PointerSample::new(200.0, 0.0), rect());
        assert!(e.state().pointer.target_roll > 29.0);
        assert_eq!(e.pointer_down(), RequestAction::CallPlatform);
    }

    #[test]
    fn test_gyro_readings_wait_for_grant() {
        let mut e = engine(PermissionApi::Required);
        let reading = OrientationReading::new(Some(20.0), Some(-10.0));
        assert!(!e.orientation(reading));
        assert!(!e.state().gyro.has_signal);
        assert!(e.needs_gyro_affordance());

        assert_eq!(e.request_gyro_permission(), RequestAction::CallPlatform);
        e.permission_resolved(Ok(()));
        assert!(!e.needs_gyro_affordance());
        assert!(e.orientation(reading));
        assert!(e.orientation(OrientationReading::new(Some(20.0), Some(-10.0))));
        assert!(!e.orientation(OrientationReading::new(None, Some(3.0))));
        assert!(e.state().gyro.has_signal);
    }

    #[test]
    fn test_denied_gyro_never_moves_card() {
        let mut e = engine(PermissionApi::Required);
        e.pointer_down();
        e.permission_resolved(Err(PermissionError::Refused("denied".into())));
        for _ in 0..100 {
            e.orientation(OrientationReading::new(Some(35.0), Some(35.0)));
        }
        for _ in 0..240 {
            e.step(1.0 / 60.0);
        }
        let out = e.output();
        assert!(out.pitch.abs() < 0.1 && out.roll.abs() < 0.1);
    }

    #[test]
    fn test_gyro_tilt_with_extreme_beta_stays_bounded() {
        let mut e = engine(PermissionApi::Implicit);
        let bound = 30.0 * 1.45 * 1.2;
        for _ in 0..(60 * 4) {
            e.orientation(OrientationReading::new(Some(70.0), Some(0.0)));
            assert!(e.state().gyro.target_pitch.abs() <= bound);
            let out = e.step(1.0 / 60.0);
            assert!(out.pitch.is_finite());
            assert!(out.pitch.abs() <= bound + 5.0);
        }
        // 43.5 * 0.92 once converged
        assert!((e.output().pitch - 40.02).abs() < 0.1);
    }

    #[test]
    fn test_replay_drop() {
        let mut e = engine(PermissionApi::Unsupported);
        for _ in 0..(60 * 5) {
            e.step(1.0 / 60.0);
        }
        assert_eq!(e.state().entrance.drop.phase, DropPhase::Idle);
        e.replay_drop();
        assert_eq!(e.output().drop_height, -120.0);
    }

    #[test]
    fn test_swipe_through_engine() {
        let mut e = engine(PermissionApi::Unsupported);
        e.touch_started(1, Some(Vec2::new(150.0, 50.0)));
        assert_eq!(e.touch_ended(Some(Vec2::new(60.0, 55.0))), Some(true));
        assert!(e.state().controls.flipped);
    }

    proptest! {
        #[test]
        fn prop_any_stall_equals_max_dt(stall in (1.0f32 / 30.0)..1000.0) {
            let mut a = engine(PermissionApi::Unsupported);
            let mut b = engine(PermissionApi::Unsupported);
            prop_assert_eq!(a.step(stall), b.step(1.0 / 30.0));
        }

        #[test]
        fn prop_output_always_finite(
            moves in proptest::collection::vec((-1e4f32..1e4, -1e4f32..1e4, 0.0f32..0.5), 1..40)
        ) {
            let mut e = engine(PermissionApi::Implicit);
            for (x, y, dt) in moves {
                e.pointer_moved(PointerSample::new(x, y), rect());
                e.orientation(OrientationReading::new(Some(x), Some(y)));
                let out = e.step(dt);
                prop_assert!(out.pitch.is_finite() && out.roll.is_finite());
                prop_assert!((0.0..=100.0).contains(&out.gaze_x_percent));
                prop_assert!((0.0..=100.0).contains(&out.gaze_y_percent));
            }
        }
    }
}
