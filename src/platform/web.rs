//! JavaScript binding
//!
//! The page owns the canvas and DOM; it forwards events here and draws from
//! the JSON snapshot after every frame.

use wasm_bindgen::prelude::*;

use super::{Direction, Session};
use crate::settings::{Difficulty, Settings};

fn hold_direction(up: bool) -> Direction {
    if up { Direction::Up } else { Direction::Down }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::warn!("Snapshot serialization failed: {}", e);
        String::from("null")
    })
}

#[wasm_bindgen]
pub struct WebGame {
    session: Session,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebGame {
        let settings = Settings::load();
        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        WebGame {
            session: Session::new(settings, seed),
        }
    }

    /// Select a difficulty by name; false if unknown or a run is in progress
    pub fn set_difficulty(&mut self, name: &str) -> bool {
        match Difficulty::from_str(name) {
            Some(d) => self.session.select_difficulty(d),
            None => {
                log::warn!("Unknown difficulty: {}", name);
                false
            }
        }
    }

    pub fn difficulty(&self) -> String {
        self.session.settings.difficulty.as_str().to_string()
    }

    pub fn start(&mut self) -> bool {
        self.session.start()
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    /// Returns true when the page should `preventDefault` the event
    pub fn key_down(&mut self, key: &str) -> bool {
        self.session.key_down(key)
    }

    pub fn key_up(&mut self, key: &str) {
        self.session.key_up(key);
    }

    pub fn touch_start(&mut self, x: f32) {
        self.session.touch_start(x);
    }

    pub fn touch_end(&mut self, x: f32) {
        self.session.touch_end(x);
    }

    pub fn hold_start(&mut self, up: bool) {
        self.session.hold_start(hold_direction(up));
    }

    pub fn hold_end(&mut self, up: bool) {
        self.session.hold_end(hold_direction(up));
    }

    /// Advance one animation frame; returns this frame's events as JSON
    pub fn frame(&mut self, now_ms: f64) -> String {
        let events = self.session.frame(now_ms);
        to_json(&events)
    }

    /// Live state for drawing, as JSON
    pub fn snapshot(&self) -> String {
        to_json(&self.session.snapshot())
    }
}

impl Default for WebGame {
    fn default() -> Self {
        Self::new()
    }
}
