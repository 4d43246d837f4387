//! Jug and hazard triggers

use glam::Vec2;

use super::state::{Collectible, GameEvent, GameState, Hazard};
use crate::consts::*;

/// Whether a runner at `pos` grabs the collectible
pub fn reaches_collectible(pos: Vec2, jug: &Collectible) -> bool {
    (jug.pos.x - pos.x).abs() < PICKUP_REACH_X && (jug.pos.y - pos.y).abs() < PICKUP_REACH_Y
}

/// Whether a runner at `pos` runs into the hazard
pub fn touches_hazard(pos: Vec2, hazard: &Hazard) -> bool {
    let in_lane = (hazard.pos.x - pos.x).abs() < hazard.size.x * HAZARD_LANE_FRAC;
    let bottom = hazard.pos.y - hazard.size.y / 2.0;
    let top = hazard.pos.y + hazard.size.y / 2.0;
    let in_band = !(pos.y - HAZARD_BAND_BELOW > top || pos.y + HAZARD_BAND_ABOVE < bottom);
    in_lane && in_band
}

/// Consume every collectible and hazard the runner is touching
pub fn apply_triggers(state: &mut GameState) -> Vec<GameEvent> {
    let pos = state.player.pos;
    let mut events = Vec::new();

    let grabbed: Vec<_> = state
        .world
        .collectibles
        .iter()
        .filter(|(_, jug)| reaches_collectible(pos, jug))
        .map(|(id, _)| id)
        .collect();
    for id in grabbed {
        state.world.collectibles.remove(id);
        state.collected += 1;
        state.elapsed = (state.elapsed - COLLECTIBLE_REBATE).max(0.0);
        events.push(GameEvent::Collected {
            rebate: COLLECTIBLE_REBATE,
        });
    }

    let hit: Vec<_> = state
        .world
        .hazards
        .iter()
        .filter(|(_, hazard)| touches_hazard(pos, hazard))
        .map(|(id, _)| id)
        .collect();
    for id in hit {
        state.world.hazards.remove(id);
        state.hazards_hit += 1;
        state.elapsed += HAZARD_PENALTY;
        events.push(GameEvent::HazardHit {
            penalty: HAZARD_PENALTY,
        });
    }

    if !events.is_empty() {
        log::debug!(
            "Triggers at y={:.0}: {} events, elapsed now {:.2}",
            pos.y,
            events.len(),
            state.elapsed
        );
    }
    events
}
