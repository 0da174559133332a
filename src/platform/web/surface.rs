//! DOM surfaces: CSS custom-property sinks and class/ARIA sync

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement};

use crate::publish::{FrameOutput, PublishError, RenderSink};
use crate::sim::CardControls;

/// Writes each frame as CSS custom properties on one element
pub struct StyleSurface {
    element: HtmlElement,
    label: String,
}

impl StyleSurface {
    pub fn new(element: HtmlElement, label: impl Into<String>) -> Self {
        Self {
            element,
            label: label.into(),
        }
    }
}

impl RenderSink for StyleSurface {
    fn publish(&mut self, frame: &FrameOutput) -> Result<(), PublishError> {
        let style = self.element.style();
        for (name, value) in frame.css_properties() {
            style.set_property(name, &value).map_err(|e| PublishError {
                surface: self.label.clone(),
                message: format!("{name}: {e:?}"),
            })?;
        }
        Ok(())
    }
}

/// The card itself plus every `.bg` layer inside it
pub fn collect_surfaces(card: &HtmlElement) -> Vec<Box<dyn RenderSink>> {
    let mut sinks: Vec<Box<dyn RenderSink>> = vec![Box::new(StyleSurface::new(card.clone(), "card"))];

    match card.query_selector_all(".bg") {
        Ok(layers) => {
            for i in 0..layers.length() {
                let Some(node) = layers.get(i) else { continue };
                if let Ok(el) = node.dyn_into::<HtmlElement>() {
                    sinks.push(Box::new(StyleSurface::new(el, format!("bg layer {i}"))));
                }
            }
        }
        Err(e) => log::warn!("Could not query .bg layers: {:?}", e),
    }

    sinks
}

/// Mirror flip/press/hint state onto the card's classes and ARIA attributes
pub fn sync_controls(card: &Element, controls: &CardControls) -> Result<(), JsValue> {
    let classes = card.class_list();
    classes.toggle_with_force("flipped", controls.flipped)?;
    classes.toggle_with_force("is-pressing", controls.pressing)?;
    if controls.hint_dismissed {
        classes.add_1("tap-hint-dismissed")?;
    }
    card.set_attribute("aria-pressed", if controls.flipped { "true" } else { "false" })
}

/// Class on every manual "enable tilt" button
pub const GYRO_BUTTON_CLASS: &str = "gyro-btn";

/// Create the manual "enable tilt" button for `card`.
///
/// Each card owns its own button so several cards on one page can be granted
/// and detached independently. A card with an id gets `<id>-gyro-btn` and
/// `aria-controls` pointing back at it.
pub fn show_gyro_button(document: &Document, card: &Element) -> Result<Option<Element>, JsValue> {
    let Some(body) = document.body() else {
        return Ok(None);
    };

    let btn = document.create_element("button")?;
    btn.set_attribute("type", "button")?;
    btn.set_attribute("class", &format!("floating-cta floating-cta--right {GYRO_BUTTON_CLASS}"))?;
    let card_id = card.id();
    if !card_id.is_empty() {
        btn.set_id(&format!("{card_id}-{GYRO_BUTTON_CLASS}"));
        btn.set_attribute("aria-controls", &card_id)?;
    }
    btn.set_text_content(Some("Enable tilt"));
    body.append_child(&btn)?;
    Ok(Some(btn))
}
