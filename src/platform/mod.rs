//! Platform abstraction layer
//!
//! Browser glue for:
//! - Input events (pointer, touch, keyboard, device orientation)
//! - Frame scheduling with cancellation
//! - Orientation permission requests
//! - Publishing frames as CSS custom properties
//!
//! Native builds have no platform layer; drive [`crate::CardEngine`] directly.

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Whether a listener may cancel the event's default action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListenMode {
    /// Registered with `passive: true`; the browser never waits on it
    #[default]
    Passive,
    /// Needs `prevent_default` (scroll blocking, Enter/Space on the card)
    Active,
}

impl ListenMode {
    pub fn passive(self) -> bool {
        self == ListenMode::Passive
    }
}
