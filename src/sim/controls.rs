//! Card flip controls
//!
//! Click / Enter toggles the card between front and back, a horizontal swipe
//! sets the side directly (left = back, right = front). The first interaction
//! dismisses the tap hint.

use glam::Vec2;

use crate::settings::MotionConfig;

/// Keys that would scroll the page under the card
const SCROLL_KEYS: [&str; 7] = [
    "Space", "PageUp", "PageDown", "ArrowUp", "ArrowDown", "Home", "End",
];

/// What the host should do with a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResponse {
    /// Card flipped; swallow the key
    Flipped,
    /// Scrolling key; swallow it so the page stays put
    Swallow,
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CardControls {
    pub flipped: bool,
    pub hint_dismissed: bool,
    pub pressing: bool,
    swipe_origin: Option<Vec2>,
}

impl CardControls {
    pub fn toggle(&mut self) {
        self.hint_dismissed = true;
        self.flipped = !self.flipped;
    }

    pub fn set_flipped(&mut self, flipped: bool) {
        self.hint_dismissed = true;
        self.flipped = flipped;
    }

    pub fn pointer_down(&mut self) {
        self.hint_dismissed = true;
        self.pressing = true;
    }

    pub fn pointer_up(&mut self) {
        self.pressing = false;
    }

    pub fn key(&mut self, code: &str) -> KeyResponse {
        match code {
            "Enter" | "NumpadEnter" => {
                self.toggle();
                KeyResponse::Flipped
            }
            c if SCROLL_KEYS.contains(&c) => KeyResponse::Swallow,
            _ => KeyResponse::Ignore,
        }
    }

    /// Touch began with `touches` fingers down; `at` is the first touch
    pub fn touch_start(&mut self, touches: u32, at: Option<Vec2>) {
        self.swipe_origin = if touches == 1 { at } else { None };
    }

    /// Touch ended at `at`. Returns the new side if it was a flip swipe.
    pub fn touch_end(&mut self, at: Option<Vec2>, config: &MotionConfig) -> Option<bool> {
        let origin = self.swipe_origin.take()?;
        let delta = at? - origin;
        if delta.x.abs() < config.swipe_threshold || delta.y.abs() > config.swipe_vertical_limit {
            return None;
        }
        let flip = delta.x < 0.0;
        self.set_flipped(flip);
        Some(flip)
    }

    pub fn touch_cancel(&mut self) {
        self.swipe_origin = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_and_keys() {
        let mut c = CardControls::default();
        assert!(!c.hint_dismissed);
        c.toggle();
        assert!(c.flipped && c.hint_dismissed);

        assert_eq!(c.key("Enter"), KeyResponse::Flipped);
        assert!(!c.flipped);
        assert_eq!(c.key("NumpadEnter"), KeyResponse::Flipped);
        assert!(c.flipped);
        assert_eq!(c.key("Space"), KeyResponse::Swallow);
        assert_eq!(c.key("KeyA"), KeyResponse::Ignore);
        assert!(c.flipped);
    }

    #[test]
    fn test_swipe_left_flips_to_back() {
        let config = MotionConfig::default();
        let mut c = CardControls::default();
        c.touch_start(1, Some(Vec2::new(200.0, 100.0)));
        assert_eq!(c.touch_end(Some(Vec2::new(120.0, 130.0)), &config), Some(true));
        assert!(c.flipped);

        c.touch_start(1, Some(Vec2::new(100.0, 100.0)));
        assert_eq!(c.touch_end(Some(Vec2::new(180.0, 100.0)), &config), Some(false));
        assert!(!c.flipped);
    }

    #[test]
    fn test_short_or_vertical_swipes_ignored() {
        let config = MotionConfig::default();
        let mut c = CardControls::default();

        c.touch_start(1, Some(Vec2::new(100.0, 100.0)));
        assert_eq!(c.touch_end(Some(Vec2::new(70.0, 100.0)), &config), None);

        c.touch_start(1, Some(Vec2::new(100.0, 100.0)));
        assert_eq!(c.touch_end(Some(Vec2::new(0.0, 200.0)), &config), None);

        // Multi-touch never starts a swipe
        c.touch_start(2, Some(Vec2::new(100.0, 100.0)));
        assert_eq!(c.touch_end(Some(Vec2::new(0.0, 100.0)), &config), None);

        c.touch_start(1, Some(Vec2::new(100.0, 100.0)));
        c.touch_cancel();
        assert_eq!(c.touch_end(Some(Vec2::new(0.0, 100.0)), &config), None);
        assert!(!c.flipped);
    }

    #[test]
    fn test_press_state() {
        let mut c = CardControls::default();
        c.pointer_down();
        assert!(c.pressing && c.hint_dismissed);
        c.pointer_up();
        assert!(!c.pressing);
    }
}
