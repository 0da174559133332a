//! Event adapters: one function per browser event type, each producing the
//! tagged samples the engine consumes.

use glam::Vec2;
use web_sys::{DeviceOrientationEvent, Element, MouseEvent, Touch, TouchEvent};

use crate::sim::{OrientationReading, PointerSample, Rect};

pub fn pointer_from_mouse(event: &MouseEvent) -> PointerSample {
    PointerSample::new(event.client_x() as f32, event.client_y() as f32)
}

fn pointer_from_touch_point(touch: &Touch) -> PointerSample {
    PointerSample::new(touch.client_x() as f32, touch.client_y() as f32)
}

/// First active touch, if any
pub fn pointer_from_touch(event: &TouchEvent) -> Option<PointerSample> {
    event.touches().get(0).map(|t| pointer_from_touch_point(&t))
}

/// First touch that changed in this event (the lifted finger on `touchend`)
pub fn changed_touch_point(event: &TouchEvent) -> Option<Vec2> {
    event
        .changed_touches()
        .get(0)
        .map(|t| pointer_from_touch_point(&t))
        .map(|s| Vec2::new(s.x, s.y))
}

pub fn touch_point(event: &TouchEvent) -> Option<Vec2> {
    pointer_from_touch(event).map(|s| Vec2::new(s.x, s.y))
}

pub fn orientation_from_event(event: &DeviceOrientationEvent) -> OrientationReading {
    OrientationReading::new(event.beta().map(|b| b as f32), event.gamma().map(|g| g as f32))
}

/// Current on-screen rectangle of `element`
pub fn rect_of(element: &Element) -> Rect {
    let r = element.get_bounding_client_rect();
    Rect::new(r.left() as f32, r.top() as f32, r.width() as f32, r.height() as f32)
}
