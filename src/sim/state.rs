//! Game state and core simulation types
//!
//! Everything a run needs lives in `GameState`; the frame loop is its only
//! writer.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::arena::Arena;
use super::track::{Track, build_track};
use crate::consts::*;
use crate::settings::Difficulty;
use crate::tuning::GeneratorConfig;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunPhase {
    /// Before the first start (menu showing)
    #[default]
    Idle,
    /// Track built, waiting for the first directional input
    Armed,
    /// Timer and movement active
    Playing,
    /// Finish line crossed, final time recorded
    Finished,
}

/// Things that can move a run between phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseTrigger {
    Start,
    FirstInput,
    ReachedFinish,
    Reset,
}

impl RunPhase {
    /// Next phase for `trigger`, or `None` if the transition is illegal
    pub fn transition(self, trigger: PhaseTrigger) -> Option<RunPhase> {
        use PhaseTrigger::*;
        use RunPhase::*;
        match (self, trigger) {
            (_, Reset) => Some(Idle),
            (Idle | Armed | Finished, Start) => Some(Armed),
            (Armed, FirstInput) => Some(Playing),
            (Playing, ReachedFinish) => Some(Finished),
            _ => None,
        }
    }
}

/// Solid wall segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub pos: Vec2,
    pub size: Vec2,
}

/// Time-penalty pickup ("black jug")
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub pos: Vec2,
    pub size: Vec2,
}

/// Time-rebate pickup ("yellow jug")
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub pos: Vec2,
}

/// Live entities of the current run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    pub obstacles: Arena<Obstacle>,
    pub hazards: Arena<Hazard>,
    pub collectibles: Arena<Collectible>,
}

impl World {
    pub fn from_track(track: Track) -> Self {
        Self {
            obstacles: track.obstacles.into_iter().collect(),
            hazards: track.hazards.into_iter().collect(),
            collectibles: track.collectibles.into_iter().collect(),
        }
    }
}

/// Held directional intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Intent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Intent {
    pub const UP: Intent = Intent {
        up: true,
        down: false,
        left: false,
        right: false,
    };

    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

/// Direction the runner sprite faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    #[default]
    Up,
    Down,
    Left,
    Right,
}

/// The runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub facing: Facing,
    /// Whether the runner moved this frame (drives the run animation)
    pub moving: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(crate::lane_x(LANE_COUNT / 2), START_Y),
            facing: Facing::Up,
            moving: false,
        }
    }
}

/// Something the host should react to (sound, toast, best-time save)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// First input received, timer running
    Started,
    /// A collectible was consumed; elapsed time dropped by `rebate`
    Collected { rebate: f32 },
    /// A hazard was consumed; elapsed time grew by `penalty`
    HazardHit { penalty: f32 },
    /// Finish line crossed
    Finished { final_time: f32 },
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    /// Bumped on every track build so each run gets a fresh layout
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed ^ self.stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
}

/// Complete run state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    pub rng_state: RngState,
    /// Difficulty the current track was built for
    pub difficulty: Difficulty,
    /// Tuning used when `difficulty` is `Custom`
    pub custom_tuning: GeneratorConfig,
    pub phase: RunPhase,
    pub player: Player,
    /// Held directions as of the last tick
    pub intent: Intent,
    /// World y of the bottom of the viewport; never decreases during a run
    pub camera_y: f32,
    /// Run clock (seconds)
    pub elapsed: f32,
    /// Collectibles consumed this run
    pub collected: u32,
    /// Hazards consumed this run
    pub hazards_hit: u32,
    /// Recorded when the run finishes
    pub final_time: Option<f32>,
    pub world: World,
}

impl GameState {
    /// Create an idle game with its first track already built
    pub fn new(seed: u64, difficulty: Difficulty) -> Self {
        Self::with_tuning(seed, difficulty, GeneratorConfig::default())
    }

    /// Like `new`, with explicit tuning for the `Custom` difficulty
    pub fn with_tuning(seed: u64, difficulty: Difficulty, custom_tuning: GeneratorConfig) -> Self {
        let mut state = Self {
            seed,
            rng_state: RngState::new(seed),
            difficulty,
            custom_tuning,
            phase: RunPhase::Idle,
            player: Player::default(),
            intent: Intent::default(),
            camera_y: 0.0,
            elapsed: 0.0,
            collected: 0,
            hazards_hit: 0,
            final_time: None,
            world: World::default(),
        };
        state.rebuild_world();
        state
    }

    /// Apply a phase trigger. Returns false (and changes nothing) if illegal.
    pub fn apply_trigger(&mut self, trigger: PhaseTrigger) -> bool {
        match self.phase.transition(trigger) {
            Some(next) => {
                log::debug!("Run phase {:?} -> {:?} ({:?})", self.phase, next, trigger);
                self.phase = next;
                true
            }
            None => {
                log::debug!("Ignored {:?} while {:?}", trigger, self.phase);
                false
            }
        }
    }

    /// Return to the menu with a fresh track and a zeroed run
    pub fn reset(&mut self) {
        self.apply_trigger(PhaseTrigger::Reset);
        self.reset_run();
    }

    /// Build a fresh track and wait for the first input
    pub fn start(&mut self) -> bool {
        if !self.apply_trigger(PhaseTrigger::Start) {
            return false;
        }
        self.reset_run();
        log::info!(
            "Run armed: {} ({} obstacles, {} hazards, {} jugs)",
            self.difficulty.as_str(),
            self.world.obstacles.len(),
            self.world.hazards.len(),
            self.world.collectibles.len()
        );
        true
    }

    /// Change difficulty; takes effect on the next track build
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    fn reset_run(&mut self) {
        self.player = Player::default();
        self.intent = Intent::default();
        self.camera_y = 0.0;
        self.elapsed = 0.0;
        self.collected = 0;
        self.hazards_hit = 0;
        self.final_time = None;
        self.rebuild_world();
    }

    fn rebuild_world(&mut self) {
        let mut rng = self.rng_state.to_rng();
        self.rng_state.stream = self.rng_state.stream.wrapping_add(1);
        let track = build_track(self.difficulty, &self.custom_tuning, &mut rng);
        self.world = World::from_track(track);
    }
}
