//! Render publishing
//!
//! The only outward-facing write of the engine: one fixed record per frame,
//! handed to every attached surface.

use serde::Serialize;
use thiserror::Error;

use crate::sim::{EngineState, gloss_intensity};
use crate::settings::MotionConfig;

/// Scalar outputs for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FrameOutput {
    /// Vertical drop offset (vh)
    pub drop_height: f32,
    /// Bounce wobble (deg)
    pub spin_angle: f32,
    /// Display rotation (deg)
    pub pitch: f32,
    pub roll: f32,
    /// Shine position (percent)
    pub gaze_x_percent: f32,
    pub gaze_y_percent: f32,
    pub gloss_impact: f32,
    pub gloss_intensity: f32,
}

impl FrameOutput {
    /// Read the current state; no side effects
    pub fn from_state(state: &EngineState, config: &MotionConfig) -> Self {
        let gaze = state.gaze.percent();
        Self {
            drop_height: state.entrance.drop.height,
            spin_angle: state.entrance.spin.angle,
            pitch: state.rotation.pitch.current,
            roll: state.rotation.roll.current,
            gaze_x_percent: gaze.x,
            gaze_y_percent: gaze.y,
            gloss_impact: state.entrance.gloss_impact,
            gloss_intensity: gloss_intensity(&state.rotation, config),
        }
    }

    /// CSS custom properties understood by the card stylesheet
    pub fn css_properties(&self) -> [(&'static str, String); 8] {
        [
            ("--dropY", format!("{}vh", self.drop_height)),
            ("--rz", format!("{:.3}deg", self.spin_angle)),
            ("--rx", format!("{:.3}deg", self.pitch)),
            ("--ry", format!("{:.3}deg", self.roll)),
            ("--shineX", format!("{}%", self.gaze_x_percent.round())),
            ("--shineY", format!("{}%", self.gaze_y_percent.round())),
            ("--glossImpact", format!("{:.3}", self.gloss_impact)),
            ("--gloss", format!("{:.3}", self.gloss_intensity)),
        ]
    }
}

/// A surface failed to accept a frame
#[derive(Debug, Error)]
#[error("failed to publish to {surface}: {message}")]
pub struct PublishError {
    pub surface: String,
    pub message: String,
}

/// Anything that renders the card from a frame record (card face, background layers, ...)
pub trait RenderSink {
    fn publish(&mut self, frame: &FrameOutput) -> Result<(), PublishError>;
}

/// Publish to every sink; a failing sink is logged and skipped
pub fn publish_all(sinks: &mut [Box<dyn RenderSink>], frame: &FrameOutput) -> usize {
    let mut failed = 0;
    for sink in sinks.iter_mut() {
        if let Err(e) = sink.publish(frame) {
            log::warn!("{e}");
            failed += 1;
        }
    }
    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::PermissionApi;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<FrameOutput>>>);

    impl RenderSink for Recorder {
        fn publish(&mut self, frame: &FrameOutput) -> Result<(), PublishError> {
            self.0.borrow_mut().push(*frame);
            Ok(())
        }
    }

    struct Broken;

    impl RenderSink for Broken {
        fn publish(&mut self, _frame: &FrameOutput) -> Result<(), PublishError> {
            Err(PublishError {
                surface: "detached node".into(),
                message: "gone".into(),
            })
        }
    }

    #[test]
    fn test_initial_frame() {
        let config = MotionConfig::default();
        let state = EngineState::new(1, PermissionApi::Unsupported, &config);
        let out = FrameOutput::from_state(&state, &config);

        assert_eq!(out.drop_height, -120.0);
        assert_eq!(out.pitch, 0.0);
        assert_eq!(out.gaze_x_percent, 50.0);
        assert_eq!(out.gaze_y_percent, 50.0);
        assert!((out.gloss_intensity - 0.10).abs() < 1e-6);
    }

    #[test]
    fn test_css_formatting() {
        let out = FrameOutput {
            drop_height: -12.5,
            spin_angle: 1.23456,
            pitch: -3.0,
            roll: 29.99951,
            gaze_x_percent: 99.6,
            gaze_y_percent: 0.4,
            gloss_impact: 0.22,
            gloss_intensity: 0.1,
        };
        let props = out.css_properties();
        assert_eq!(props[0], ("--dropY", "-12.5vh".to_string()));
        assert_eq!(props[1], ("--rz", "1.235deg".to_string()));
        assert_eq!(props[2], ("--rx", "-3.000deg".to_string()));
        assert_eq!(props[3], ("--ry", "30.000deg".to_string()));
        assert_eq!(props[4], ("--shineX", "100%".to_string()));
        assert_eq!(props[5], ("--shineY", "0%".to_string()));
        assert_eq!(props[6], ("--glossImpact", "0.220".to_string()));
        assert_eq!(props[7], ("--gloss", "0.100".to_string()));
    }

    #[test]
    fn test_failing_sink_does_not_block_others() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut sinks: Vec<Box<dyn RenderSink>> = vec![
            Box::new(Broken),
            Box::new(Recorder(seen.clone())),
            Box::new(Recorder(seen.clone())),
        ];
        let failed = publish_all(&mut sinks, &FrameOutput::default());
        assert_eq!(failed, 1);
        assert_eq!(seen.borrow().len(), 2);
    }
}
