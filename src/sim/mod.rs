//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only (track generation)
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod arena;
pub mod collision;
pub mod grid;
pub mod patterns;
pub mod pickup;
pub mod state;
pub mod tick;
pub mod track;

pub use arena::{Arena, EntityId};
pub use collision::{Aabb, Resolution, integrate_movement, resolve_obstacles};
pub use grid::{Cell, RowCarry, RowLayout, build_row};
pub use pickup::apply_triggers;
pub use state::{
    Collectible, Facing, GameEvent, GameState, Hazard, Intent, Obstacle, PhaseTrigger, Player,
    RunPhase, World,
};
pub use tick::{TickInput, tick};
pub use track::{Track, build_track};
