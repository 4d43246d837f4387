//! Input mapping
//!
//! Browser events only flip flags here; the frame loop drains them once per
//! frame into a `TickInput`.

use crate::sim::{Intent, TickInput};

/// Horizontal travel (CSS px) a touch must cover to count as a lane swipe
pub const SWIPE_THRESHOLD: f32 = 20.0;

/// A direction key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Map a `KeyboardEvent.key` value; only the arrow keys count
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Direction::Up),
            "ArrowDown" => Some(Direction::Down),
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Held arrow keys
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyboardIntent {
    intent: Intent,
}

impl KeyboardIntent {
    /// Press a key. Returns whether it is an arrow key (and so may arm a run).
    pub fn key_down(&mut self, key: &str) -> bool {
        match Direction::from_key(key) {
            Some(dir) => {
                self.set(dir, true);
                true
            }
            None => false,
        }
    }

    pub fn key_up(&mut self, key: &str) {
        if let Some(dir) = Direction::from_key(key) {
            self.set(dir, false);
        }
    }

    fn set(&mut self, dir: Direction, held: bool) {
        match dir {
            Direction::Up => self.intent.up = held,
            Direction::Down => self.intent.down = held,
            Direction::Left => self.intent.left = held,
            Direction::Right => self.intent.right = held,
        }
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn clear(&mut self) {
        self.intent = Intent::default();
    }
}

/// Touch gestures: a tap arms, a horizontal swipe changes lane, and the two
/// hold zones drive vertical movement
#[derive(Debug, Clone, Copy, Default)]
pub struct TouchGestures {
    start_x: Option<f32>,
    hold_up: bool,
    hold_down: bool,
    tapped: bool,
    lane_shift: i8,
}

impl TouchGestures {
    pub fn touch_start(&mut self, x: f32) {
        self.start_x = Some(x);
        self.tapped = true;
    }

    pub fn touch_end(&mut self, x: f32) {
        let Some(start) = self.start_x.take() else {
            return;
        };
        let dx = x - start;
        if dx < -SWIPE_THRESHOLD {
            self.lane_shift = -1;
        } else if dx > SWIPE_THRESHOLD {
            self.lane_shift = 1;
        }
    }

    pub fn touch_cancel(&mut self) {
        self.start_x = None;
    }

    /// Press a hold zone (`Up` or `Down`; horizontal zones do not exist)
    pub fn hold_start(&mut self, dir: Direction) {
        self.tapped = true;
        match dir {
            Direction::Up => self.hold_up = true,
            Direction::Down => self.hold_down = true,
            Direction::Left | Direction::Right => {}
        }
    }

    pub fn hold_end(&mut self, dir: Direction) {
        match dir {
            Direction::Up => self.hold_up = false,
            Direction::Down => self.hold_down = false,
            Direction::Left | Direction::Right => {}
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Everything the host feeds the simulation
#[derive(Debug, Clone, Copy, Default)]
pub struct InputCollector {
    pub keyboard: KeyboardIntent,
    pub touch: TouchGestures,
}

impl InputCollector {
    /// Input for this frame. One-shot gestures are consumed.
    pub fn take(&mut self) -> TickInput {
        let mut intent = self.keyboard.intent();
        intent.up |= self.touch.hold_up;
        intent.down |= self.touch.hold_down;

        let input = TickInput {
            intent,
            touch: self.touch.tapped,
            lane_shift: self.touch.lane_shift,
        };
        self.touch.tapped = false;
        self.touch.lane_shift = 0;
        input
    }

    pub fn clear(&mut self) {
        self.keyboard.clear();
        self.touch.clear();
    }
}
