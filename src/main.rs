//! Postcard Motion entry point
//!
//! Web: attaches the engine to the page's postcard. Native: runs a headless
//! simulation and logs the entrance and tilt timeline.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_app {
    use std::cell::RefCell;

    use wasm_bindgen::JsCast;
    use web_sys::HtmlElement;

    use postcard_motion::platform::web::{CardHandle, attach};

    thread_local! {
        /// Keeps the page's card alive for the lifetime of the document
        static CARD: RefCell<Option<CardHandle>> = const { RefCell::new(None) };
    }

    fn element_by_id(document: &web_sys::Document, id: &str) -> Option<HtmlElement> {
        document.get_element_by_id(id)?.dyn_into::<HtmlElement>().ok()
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"logger already initialized".into());
        }

        log::info!("Postcard Motion starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        let (Some(container), Some(card)) = (
            element_by_id(&document, "card-container"),
            element_by_id(&document, "card"),
        ) else {
            log::warn!("Card container/card element not found, skipping card motion");
            return;
        };

        // Editor overlay owns input while open
        let doc = document.clone();
        let editor_open = Box::new(move || {
            doc.document_element()
                .map(|el| el.class_list().contains("editing-open"))
                .unwrap_or(false)
        });

        match attach(container, card, editor_open) {
            Ok(handle) => CARD.with(|slot| *slot.borrow_mut() = Some(handle)),
            Err(e) => log::error!("Failed to attach card motion: {:?}", e),
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    web_app::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use postcard_motion::sim::{PermissionApi, PointerSample, Rect};
    use postcard_motion::{CardEngine, MotionConfig};

    env_logger::init();
    log::info!("Postcard Motion (native) starting...");
    log::info!("Native mode is headless - serve the wasm build for the interactive card");

    let config = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(json) => MotionConfig::from_json_or_default(Some(&json)),
            Err(e) => {
                log::warn!("Could not read {path}: {e}");
                MotionConfig::default()
            }
        },
        None => MotionConfig::default(),
    };

    let mut engine = CardEngine::new(2024, PermissionApi::Unsupported, config);
    let rect = Rect::new(0.0, 0.0, 360.0, 240.0);
    let dt = 1.0 / 60.0;

    println!("\n  time   dropY     rz      rx      ry   shineX shineY  gloss");
    for frame in 0..(60 * 4) {
        // Pointer enters the top-right corner after the card has landed
        if frame == 120 {
            engine.pointer_moved(PointerSample::new(360.0, 0.0), rect);
        }
        let out = engine.step(dt);
        if frame % 10 == 0 {
            println!(
                "{:6.2} {:7.2} {:6.2} {:7.2} {:7.2} {:6.0} {:6.0} {:6.3}",
                frame as f32 * dt,
                out.drop_height,
                out.spin_angle,
                out.pitch,
                out.roll,
                out.gaze_x_percent,
                out.gaze_y_percent,
                out.gloss_intensity + out.gloss_impact,
            );
        }
    }

    match serde_json::to_string_pretty(&engine.output()) {
        Ok(json) => println!("\nFinal frame:\n{json}"),
        Err(e) => log::error!("Could not serialize frame: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
