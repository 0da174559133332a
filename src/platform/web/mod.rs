//! Browser host for the card engine
//!
//! `attach` wires one card: listeners on the container and window, a frame
//! loop publishing to the card's surfaces, and the orientation permission
//! flow. The returned handle detaches everything again.

pub mod adapters;
pub mod frame_loop;
pub mod listeners;
pub mod permission;
pub mod surface;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    DeviceOrientationEvent, Document, Element, Event, HtmlElement, KeyboardEvent, MouseEvent, TouchEvent,
};

use crate::engine::{CardEngine, InputGate};
use crate::platform::ListenMode;
use crate::publish::{RenderSink, publish_all};
use crate::settings::MotionConfig;
use crate::sim::{AffordanceChange, KeyResponse, PermissionApi, RequestAction};

use frame_loop::FrameLoop;
use listeners::ListenerSet;

/// Everything owned by one attached card
struct AttachedCard {
    engine: RefCell<CardEngine>,
    document: Document,
    container: HtmlElement,
    card: HtmlElement,
    /// This card's manual "enable tilt" button, while shown
    gyro_button: RefCell<Option<Element>>,
    sinks: RefCell<Vec<Box<dyn RenderSink>>>,
    listeners: RefCell<ListenerSet>,
    frame_loop: RefCell<Option<FrameLoop>>,
}

impl AttachedCard {
    fn sync_controls(&self) {
        let engine = self.engine.borrow();
        if let Err(e) = surface::sync_controls(&self.card, &engine.state().controls) {
            log::warn!("Failed to update card classes: {:?}", e);
        }
    }

    /// Show or remove the manual gyro button to match the permission state
    fn sync_affordance(self: &Rc<Self>) {
        let shown = self.gyro_button.borrow().is_some();
        let change = self.engine.borrow().gyro_affordance_change(shown);
        match change {
            Some(AffordanceChange::Show) => {}
            Some(AffordanceChange::Hide) => {
                self.hide_gyro_button();
                return;
            }
            None => return,
        }
        match surface::show_gyro_button(&self.document, &self.card) {
            Ok(Some(btn)) => {
                let weak = Rc::downgrade(self);
                let result = self.listeners.borrow_mut().listen(&btn, "click", move |event: Event| {
                    event.stop_propagation();
                    if let Some(card) = weak.upgrade() {
                        card.request_gyro_permission();
                    }
                });
                if let Err(e) = result {
                    log::warn!("Failed to hook gyro button: {:?}", e);
                }
                *self.gyro_button.borrow_mut() = Some(btn);
            }
            Ok(None) => {}
            Err(e) => log::warn!("Failed to show gyro button: {:?}", e),
        }
    }

    fn hide_gyro_button(&self) {
        if let Some(btn) = self.gyro_button.borrow_mut().take() {
            btn.remove();
        }
    }

    fn request_gyro_permission(self: &Rc<Self>) {
        let action = self.engine.borrow_mut().request_gyro_permission();
        self.run(action);
    }

    /// Perform a permission action outside the frame loop
    fn run(self: &Rc<Self>, action: RequestAction) {
        if action != RequestAction::CallPlatform {
            return;
        }
        let weak = Rc::downgrade(self);
        wasm_bindgen_futures::spawn_local(async move {
            let result = permission::request_permission().await;
            let Some(card) = weak.upgrade() else {
                return;
            };
            card.engine.borrow_mut().permission_resolved(result);
            card.sync_affordance();
        });
    }

    fn frame(&self, time: f64) {
        let output = self.engine.borrow_mut().frame(time);
        publish_all(&mut self.sinks.borrow_mut(), &output);
    }

    fn detach(&self) {
        if let Some(frame_loop) = self.frame_loop.borrow_mut().take() {
            frame_loop.stop();
        }
        self.listeners.borrow_mut().clear();
        self.hide_gyro_button();
        log::info!("Card detached");
    }
}

/// Handle to an attached card
#[wasm_bindgen]
pub struct CardHandle {
    card: Option<Rc<AttachedCard>>,
}

#[wasm_bindgen]
impl CardHandle {
    /// Manual trigger for the orientation permission prompt
    #[wasm_bindgen(js_name = requestGyroPermission)]
    pub fn request_gyro_permission(&self) {
        if let Some(card) = &self.card {
            card.request_gyro_permission();
        }
    }

    /// Play the drop-in entrance again
    #[wasm_bindgen(js_name = replayDrop)]
    pub fn replay_drop(&self) {
        if let Some(card) = &self.card {
            card.engine.borrow_mut().replay_drop();
        }
    }

    /// Stop the frame loop and remove every listener
    pub fn detach(&mut self) {
        if let Some(card) = self.card.take() {
            card.detach();
        }
    }

    #[wasm_bindgen(js_name = isAttached)]
    pub fn is_attached(&self) -> bool {
        self.card.is_some()
    }
}

impl Drop for CardHandle {
    fn drop(&mut self) {
        self.detach();
    }
}

/// JavaScript entry: `attachCard(container, card, isInputSuppressed?)`
#[wasm_bindgen(js_name = attachCard)]
pub fn attach_card(
    container: HtmlElement,
    card: HtmlElement,
    is_input_suppressed: Option<js_sys::Function>,
) -> Result<CardHandle, JsValue> {
    let gate: InputGate = match is_input_suppressed {
        Some(f) => Box::new(move || {
            f.call0(&JsValue::NULL)
                .map(|v| v.is_truthy())
                .unwrap_or(false)
        }),
        None => Box::new(|| false),
    };
    attach(container, card, gate)
}

/// Start animating `card`, sampling pointer input over `container`
pub fn attach(container: HtmlElement, card: HtmlElement, gate: InputGate) -> Result<CardHandle, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;

    let config = MotionConfig::from_json_or_default(card.get_attribute("data-motion-config").as_deref());
    let seed = js_sys::Date::now() as u64;
    let api = permission::detect_api();
    let engine = CardEngine::new(seed, api, config).with_input_gate(gate);

    let attached = Rc::new(AttachedCard {
        engine: RefCell::new(engine),
        document,
        sinks: RefCell::new(surface::collect_surfaces(&card)),
        container,
        card,
        gyro_button: RefCell::new(None),
        listeners: RefCell::new(ListenerSet::default()),
        frame_loop: RefCell::new(None),
    });

    setup_pointer_handlers(&attached)?;
    setup_control_handlers(&attached, &window)?;
    if api != PermissionApi::Unsupported {
        setup_orientation_handler(&attached, &window)?;
    }
    attached.sync_affordance();
    attached.sync_controls();

    let weak = Rc::downgrade(&attached);
    let frame_loop = FrameLoop::start(move |time| {
        if let Some(card) = weak.upgrade() {
            card.frame(time);
        }
    })?;
    *attached.frame_loop.borrow_mut() = Some(frame_loop);

    log::info!(
        "Card attached (seed {}, orientation {:?}, {} surfaces, {} listeners)",
        seed,
        api,
        attached.sinks.borrow().len(),
        attached.listeners.borrow().len()
    );

    Ok(CardHandle {
        card: Some(attached),
    })
}

/// Register a passive `handler` on `target`, giving it the live card
fn on(
    card: &Rc<AttachedCard>,
    target: &web_sys::EventTarget,
    kind: &'static str,
    handler: impl FnMut(&Rc<AttachedCard>, Event) + 'static,
) -> Result<(), JsValue> {
    on_with(card, target, kind, ListenMode::Passive, handler)
}

fn on_with(
    card: &Rc<AttachedCard>,
    target: &web_sys::EventTarget,
    kind: &'static str,
    mode: ListenMode,
    mut handler: impl FnMut(&Rc<AttachedCard>, Event) + 'static,
) -> Result<(), JsValue> {
    let weak: Weak<AttachedCard> = Rc::downgrade(card);
    card.listeners.borrow_mut().add(target, kind, mode, move |event: Event| {
        if let Some(card) = weak.upgrade() {
            handler(&card, event);
        }
    })
}

fn setup_pointer_handlers(card: &Rc<AttachedCard>) -> Result<(), JsValue> {
    let container = card.container.clone();
    let target: &web_sys::EventTarget = &container;

    on(card, target, "mousemove", |card, event| {
        if let Some(e) = event.dyn_ref::<MouseEvent>() {
            let rect = adapters::rect_of(&card.container);
            card.engine.borrow_mut().pointer_moved(adapters::pointer_from_mouse(e), rect);
        }
    })?;

    on(card, target, "touchmove", |card, event| {
        if let Some(sample) = event.dyn_ref::<TouchEvent>().and_then(adapters::pointer_from_touch) {
            let rect = adapters::rect_of(&card.container);
            card.engine.borrow_mut().pointer_moved(sample, rect);
        }
    })?;

    on(card, target, "mouseleave", |card, _event| {
        card.engine.borrow_mut().pointer_left();
    })?;

    on(card, target, "mousedown", |card, _event| {
        let action = card.engine.borrow_mut().pointer_down();
        card.sync_controls();
        card.run(action);
    })?;

    on(card, target, "touchstart", |card, event| {
        let Some(e) = event.dyn_ref::<TouchEvent>() else {
            return;
        };
        let action = {
            let mut engine = card.engine.borrow_mut();
            engine.touch_started(e.touches().length(), adapters::touch_point(e));
            if let Some(sample) = adapters::pointer_from_touch(e) {
                engine.pointer_moved(sample, adapters::rect_of(&card.container));
            }
            engine.pointer_down()
        };
        card.sync_controls();
        card.run(action);
    })?;

    on(card, target, "touchend", |card, event| {
        let Some(e) = event.dyn_ref::<TouchEvent>() else {
            return;
        };
        {
            let mut engine = card.engine.borrow_mut();
            if let Some(flipped) = engine.touch_ended(adapters::changed_touch_point(e)) {
                log::info!("Swiped to {}", if flipped { "back" } else { "front" });
            }
            if e.touches().length() == 0 {
                engine.pointer_left();
            }
        }
        card.sync_controls();
    })?;

    on(card, target, "touchcancel", |card, _event| {
        let mut engine = card.engine.borrow_mut();
        engine.touch_cancelled();
        engine.pointer_left();
    })?;

    Ok(())
}

fn setup_control_handlers(card: &Rc<AttachedCard>, window: &web_sys::Window) -> Result<(), JsValue> {
    let container = card.container.clone();
    let win: &web_sys::EventTarget = window;

    on(card, &container, "click", |card, _event| {
        if card.engine.borrow_mut().click() {
            card.sync_controls();
        }
    })?;

    for kind in ["mouseup", "touchend"] {
        on(card, win, kind, |card, _event| {
            card.engine.borrow_mut().pointer_up();
            card.sync_controls();
        })?;
    }

    on_with(card, win, "keydown", ListenMode::Active, |card, event| {
        let Some(e) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        let response = card.engine.borrow_mut().key(&e.code());
        match response {
            KeyResponse::Flipped => {
                e.prevent_default();
                card.sync_controls();
            }
            KeyResponse::Swallow => e.prevent_default(),
            KeyResponse::Ignore => {}
        }
    })?;

    // Keep the page still under the card unless the host has input suppressed
    for kind in ["wheel", "touchmove", "gesturestart"] {
        let weak = Rc::downgrade(card);
        card.listeners.borrow_mut().listen_active(win, kind, move |event: Event| {
            if let Some(card) = weak.upgrade() {
                if !card.engine.borrow().input_suppressed() {
                    event.prevent_default();
                }
            }
        })?;
    }

    Ok(())
}

fn setup_orientation_handler(card: &Rc<AttachedCard>, window: &web_sys::Window) -> Result<(), JsValue> {
    on(card, window, "deviceorientation", |card, event| {
        let Some(e) = event.dyn_ref::<DeviceOrientationEvent>() else {
            return;
        };
        let was_granted = card.engine.borrow().state().permission.is_granted();
        card.engine
            .borrow_mut()
            .orientation(adapters::orientation_from_event(e));
        if !was_granted && card.engine.borrow().state().permission.is_granted() {
            card.sync_affordance();
        }
    })
}
