//! Event listener registry
//!
//! Every listener the card installs is kept here so detaching removes them all
//! instead of leaking forgotten closures.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Event, EventTarget};

use crate::platform::ListenMode;

struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

#[derive(Default)]
pub struct ListenerSet {
    entries: Vec<Listener>,
}

impl ListenerSet {
    /// Add a passive listener
    pub fn listen(
        &mut self,
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), JsValue> {
        self.add(target, kind, ListenMode::Passive, handler)
    }

    /// Add a listener that may call `prevent_default` (wheel/touchmove on window)
    pub fn listen_active(
        &mut self,
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), JsValue> {
        self.add(target, kind, ListenMode::Active, handler)
    }

    pub fn add(
        &mut self,
        target: &EventTarget,
        kind: &'static str,
        mode: ListenMode,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        let options = AddEventListenerOptions::new();
        options.set_passive(mode.passive());
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            closure.as_ref().unchecked_ref(),
            &options,
        )?;
        self.push(target, kind, closure);
        Ok(())
    }

    fn push(&mut self, target: &EventTarget, kind: &'static str, closure: Closure<dyn FnMut(Event)>) {
        self.entries.push(Listener {
            target: target.clone(),
            kind,
            closure,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unsubscribe and drop every listener
    pub fn clear(&mut self) {
        for l in self.entries.drain(..) {
            if let Err(e) = l
                .target
                .remove_event_listener_with_callback(l.kind, l.closure.as_ref().unchecked_ref())
            {
                log::warn!("Failed to remove {} listener: {:?}", l.kind, e);
            }
        }
    }
}

impl Drop for ListenerSet {
    fn drop(&mut self) {
        self.clear();
    }
}
