//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (keyboard, touch swipes, hold zones)
//! - Frame timing
//! - The wasm host binding

pub mod input;
pub mod time;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use input::{Direction, InputCollector, KeyboardIntent, SWIPE_THRESHOLD, TouchGestures};
pub use time::FrameClock;

use serde::Serialize;

use crate::settings::{Difficulty, Settings};
use crate::sim::{
    Collectible, GameEvent, GameState, Hazard, Obstacle, Player, RunPhase, tick,
};

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub phase: RunPhase,
    pub player: &'a Player,
    pub camera_y: f32,
    pub elapsed: f32,
    pub elapsed_text: String,
    pub collected: u32,
    pub final_time: Option<f32>,
    pub obstacles: Vec<&'a Obstacle>,
    pub hazards: Vec<&'a Hazard>,
    pub collectibles: Vec<&'a Collectible>,
}

impl<'a> Snapshot<'a> {
    pub fn capture(state: &'a GameState) -> Self {
        Self {
            phase: state.phase,
            player: &state.player,
            camera_y: state.camera_y,
            elapsed: state.elapsed,
            elapsed_text: crate::format_time(state.elapsed),
            collected: state.collected,
            final_time: state.final_time,
            obstacles: state.world.obstacles.iter().map(|(_, o)| o).collect(),
            hazards: state.world.hazards.iter().map(|(_, h)| h).collect(),
            collectibles: state.world.collectibles.iter().map(|(_, c)| c).collect(),
        }
    }
}

/// Host-side session: game state plus the input and clock that feed it
#[derive(Debug, Clone)]
pub struct Session {
    pub state: GameState,
    pub settings: Settings,
    input: InputCollector,
    clock: FrameClock,
}

impl Session {
    pub fn new(settings: Settings, seed: u64) -> Self {
        let state = GameState::with_tuning(seed, settings.difficulty, settings.custom_tuning.clone());
        log::info!(
            "Session created: seed {}, difficulty {}",
            seed,
            settings.difficulty.as_str()
        );
        Self {
            state,
            settings,
            input: InputCollector::default(),
            clock: FrameClock::new(),
        }
    }

    fn in_run(&self) -> bool {
        matches!(self.state.phase, RunPhase::Armed | RunPhase::Playing)
    }

    /// Pick a difficulty. Locked while a run is armed or playing.
    pub fn select_difficulty(&mut self, difficulty: Difficulty) -> bool {
        if self.in_run() {
            log::debug!("Difficulty locked during a run");
            return false;
        }
        self.settings.difficulty = difficulty;
        self.state.custom_tuning = self.settings.custom_tuning.clone();
        self.state.set_difficulty(difficulty);
        self.settings.save();
        true
    }

    pub fn start(&mut self) -> bool {
        self.input.clear();
        self.clock.reset();
        self.state.start()
    }

    pub fn reset(&mut self) {
        self.input.clear();
        self.clock.reset();
        self.state.reset();
    }

    /// Returns whether the key is one the game uses
    pub fn key_down(&mut self, key: &str) -> bool {
        if !self.in_run() {
            return Direction::from_key(key).is_some();
        }
        self.input.keyboard.key_down(key)
    }

    pub fn key_up(&mut self, key: &str) {
        self.input.keyboard.key_up(key);
    }

    pub fn touch_start(&mut self, x: f32) {
        if self.in_run() {
            self.input.touch.touch_start(x);
        }
    }

    pub fn touch_end(&mut self, x: f32) {
        if self.state.phase == RunPhase::Playing {
            self.input.touch.touch_end(x);
        } else {
            self.input.touch.touch_cancel();
        }
    }

    pub fn hold_start(&mut self, dir: Direction) {
        if self.in_run() {
            self.input.touch.hold_start(dir);
        }
    }

    pub fn hold_end(&mut self, dir: Direction) {
        self.input.touch.hold_end(dir);
    }

    /// Run one frame at timestamp `now_ms`
    pub fn frame(&mut self, now_ms: f64) -> Vec<GameEvent> {
        let dt = self.clock.advance(now_ms);
        let input = self.input.take();
        let events = tick(&mut self.state, &input, dt);
        if events
            .iter()
            .any(|e| matches!(e, GameEvent::Finished { .. }))
        {
            self.input.clear();
        }
        events
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::capture(&self.state)
    }
}
