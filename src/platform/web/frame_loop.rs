//! Animation-frame scheduler
//!
//! A task re-armed after every tick with `requestAnimationFrame`. Stopping
//! cancels the pending frame, so a detached card costs nothing.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

struct LoopInner {
    /// Id of the pending animation frame
    pending: Cell<Option<i32>>,
    running: Cell<bool>,
    callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl LoopInner {
    fn arm(&self) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let callback = self.callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return Ok(());
        };
        let id = window.request_animation_frame(callback.as_ref().unchecked_ref())?;
        self.pending.set(Some(id));
        Ok(())
    }
}

pub struct FrameLoop {
    inner: Rc<LoopInner>,
}

impl FrameLoop {
    /// Start calling `on_frame(timestamp_ms)` once per display refresh
    pub fn start(mut on_frame: impl FnMut(f64) + 'static) -> Result<Self, JsValue> {
        let inner = Rc::new(LoopInner {
            pending: Cell::new(None),
            running: Cell::new(true),
            callback: RefCell::new(None),
        });

        let weak: Weak<LoopInner> = Rc::downgrade(&inner);
        let closure = Closure::<dyn FnMut(f64)>::new(move |time: f64| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.pending.set(None);
            if !inner.running.get() {
                return;
            }

            on_frame(time);

            // Always re-arm; a skipped frame beats a dead animation
            if inner.running.get() {
                if let Err(e) = inner.arm() {
                    log::error!("Failed to schedule next frame: {:?}", e);
                }
            }
        });
        *inner.callback.borrow_mut() = Some(closure);

        inner.arm()?;
        Ok(Self { inner })
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    /// Cancel the pending frame and stop re-arming
    pub fn stop(&self) {
        if !self.inner.running.replace(false) {
            return;
        }
        if let Some(id) = self.inner.pending.take() {
            if let Some(window) = web_sys::window() {
                if let Err(e) = window.cancel_animation_frame(id) {
                    log::warn!("cancelAnimationFrame failed: {:?}", e);
                }
            }
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
