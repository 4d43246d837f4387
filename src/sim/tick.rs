//! Per-frame simulation step
//!
//! Advances a run by one rendered frame: arming, movement, wall resolution,
//! camera, clock, triggers and the finish line, in that order.

use serde::{Deserialize, Serialize};

use super::collision::{Resolution, integrate_movement, resolve_obstacles};
use super::pickup::apply_triggers;
use super::state::{Facing, GameEvent, GameState, Intent, PhaseTrigger, RunPhase};
use crate::consts::*;
use crate::{lane_x, nearest_lane};

/// Input sampled for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    /// Held directions
    pub intent: Intent,
    /// Touch on the play area this frame (arms without moving)
    pub touch: bool,
    /// Lane swipe: negative snaps one lane left, positive one lane right
    pub lane_shift: i8,
}

impl TickInput {
    pub fn held(intent: Intent) -> Self {
        Self {
            intent,
            ..Default::default()
        }
    }

    /// Whether this input counts as the gesture that starts an armed run
    pub fn arms(&self) -> bool {
        self.intent.any() || self.touch
    }
}

/// Advance the run by one frame of `dt` seconds and report what happened
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let mut dt = if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    };

    match state.phase {
        RunPhase::Idle | RunPhase::Finished => return events,
        RunPhase::Armed => {
            if !input.arms() {
                return events;
            }
            state.apply_trigger(PhaseTrigger::FirstInput);
            log::info!("Run started ({})", state.difficulty.as_str());
            events.push(GameEvent::Started);
            // Arming frame moves the runner but costs no time
            dt = 0.0;
        }
        RunPhase::Playing => {}
    }

    state.intent = input.intent;
    let prev = state.player.pos;

    let lane_target = match input.lane_shift.signum() {
        0 => None,
        shift => {
            let lane = (nearest_lane(prev.x) as i32 + shift as i32).clamp(0, LANE_COUNT as i32 - 1);
            Some(lane_x(lane as usize))
        }
    };
    let moved = integrate_movement(prev, input.intent, lane_target, dt);
    let (pos, resolution) = resolve_obstacles(prev, moved, &state.world.obstacles);
    if resolution == Resolution::Blocked {
        log::trace!("Move blocked at ({:.1}, {:.1})", prev.x, prev.y);
    }

    state.player.pos = pos;
    state.player.moving = pos != prev;
    state.player.facing = facing_for(input, state.player.facing);

    state.camera_y = state.camera_y.max(pos.y - CAMERA_LEAD_FRAC * VIEW_H);
    state.elapsed += dt;

    events.extend(apply_triggers(state));

    if state.player.pos.y >= TRACK_LEN && state.apply_trigger(PhaseTrigger::ReachedFinish) {
        state.final_time = Some(state.elapsed);
        log::info!(
            "Finished in {} ({} jugs, {} hazards)",
            crate::format_time(state.elapsed),
            state.collected,
            state.hazards_hit
        );
        events.push(GameEvent::Finished {
            final_time: state.elapsed,
        });
    }

    events
}

fn facing_for(input: &TickInput, current: Facing) -> Facing {
    let intent = input.intent;
    if intent.up {
        Facing::Up
    } else if intent.down {
        Facing::Down
    } else if intent.left || input.lane_shift < 0 {
        Facing::Left
    } else if intent.right || input.lane_shift > 0 {
        Facing::Right
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Difficulty;
    use crate::sim::state::World;

    const FRAME: f32 = 1.0 / 60.0;

    fn armed(difficulty: Difficulty) -> GameState {
        let mut state = GameState::new(5, difficulty);
        assert!(state.start());
        state
    }

    #[test]
    fn test_idle_and_armed_ignore_empty_input() {
        let mut state = GameState::new(5, Difficulty::Easy);
        assert!(tick(&mut state, &TickInput::held(Intent::UP), FRAME).is_empty());
        assert_eq!(state.phase, RunPhase::Idle);

        state.start();
        for _ in 0..10 {
            assert!(tick(&mut state, &TickInput::default(), FRAME).is_empty());
        }
        assert_eq!(state.phase, RunPhase::Armed);
        assert_eq!(state.elapsed, 0.0);
        assert_eq!(state.player.pos.y, START_Y);
    }

    #[test]
    fn test_touch_arms_without_moving() {
        let mut state = armed(Difficulty::Easy);
        let input = TickInput {
            touch: true,
            ..Default::default()
        };
        let events = tick(&mut state, &input, FRAME);
        assert_eq!(events, vec![GameEvent::Started]);
        assert_eq!(state.phase, RunPhase::Playing);
        assert_eq!(state.player.pos.y, START_Y);
        assert!(!state.player.moving);
    }

    #[test]
    fn test_arming_frame_costs_no_time() {
        let mut state = armed(Difficulty::Easy);
        tick(&mut state, &TickInput::held(Intent::UP), FRAME);
        assert_eq!(state.elapsed, 0.0);
        tick(&mut state, &TickInput::held(Intent::UP), FRAME);
        assert!((state.elapsed - FRAME).abs() < 1e-6);
    }

    #[test]
    fn test_frame_delta_is_clamped() {
        let mut state = armed(Difficulty::Easy);
        state.world = World::default();
        tick(&mut state, &TickInput::held(Intent::UP), FRAME);

        tick(&mut state, &TickInput::held(Intent::UP), 1.0);
        assert!((state.elapsed - MAX_FRAME_DT).abs() < 1e-6);
        assert!((state.player.pos.y - (START_Y + MOVE_SPEED * MAX_FRAME_DT)).abs() < 1e-3);

        // Negative deltas from a skewed host clock count as zero
        tick(&mut state, &TickInput::held(Intent::UP), -0.5);
        assert!((state.elapsed - MAX_FRAME_DT).abs() < 1e-6);
    }

    #[test]
    fn test_easy_run_finishes_once() {
        let mut state = armed(Difficulty::Easy);
        state.world = World::default();

        let mut finishes = Vec::new();
        for _ in 0..2000 {
            for event in tick(&mut state, &TickInput::held(Intent::UP), FRAME) {
                if let GameEvent::Finished { final_time } = event {
                    finishes.push(final_time);
                }
            }
        }

        assert_eq!(finishes.len(), 1);
        assert_eq!(state.phase, RunPhase::Finished);
        let expected = (TRACK_LEN - START_Y) / MOVE_SPEED;
        assert!((finishes[0] - expected).abs() <= MAX_FRAME_DT);
        assert_eq!(state.final_time, Some(finishes[0]));
        assert!(state.player.pos.y >= TRACK_LEN);
    }

    #[test]
    fn test_first_wall_blocks_straight_run() {
        let mut state = armed(Difficulty::Easy);
        for _ in 0..120 {
            tick(&mut state, &TickInput::held(Intent::UP), FRAME);
        }
        // First Easy row is a centre wall at y=320; its padded bottom is 306
        assert_eq!(state.phase, RunPhase::Playing);
        assert!(state.player.pos.y + RUNNER_BOTTOM_OFFSET < 306.0);
        assert!(state.player.pos.y > 280.0);
        assert!(!state.player.moving);
        // The jug embedded in that wall is still within reach
        assert_eq!(state.collected, 1);
    }

    #[test]
    fn test_camera_never_decreases() {
        let mut state = armed(Difficulty::Easy);
        state.world = World::default();
        let down = Intent {
            down: true,
            ..Default::default()
        };

        let mut last = state.camera_y;
        for frame in 0..600 {
            let intent = if (frame / 90) % 3 == 2 { down } else { Intent::UP };
            tick(&mut state, &TickInput::held(intent), FRAME);
            assert!(state.camera_y >= last);
            last = state.camera_y;
        }
        assert!(last > 0.0);
    }

    #[test]
    fn test_lane_swipe_snaps_and_faces() {
        let mut state = armed(Difficulty::Easy);
        state.world = World::default();
        tick(&mut state, &TickInput::held(Intent::UP), FRAME);

        let swipe = TickInput {
            lane_shift: 1,
            ..Default::default()
        };
        tick(&mut state, &swipe, FRAME);
        assert_eq!(state.player.pos.x, lane_x(2));
        assert_eq!(state.player.facing, Facing::Right);

        // Already in the last lane: stays put
        tick(&mut state, &swipe, FRAME);
        assert_eq!(state.player.pos.x, lane_x(2));

        let back = TickInput {
            lane_shift: -1,
            ..Default::default()
        };
        tick(&mut state, &back, FRAME);
        assert_eq!(state.player.pos.x, lane_x(1));
        assert_eq!(state.player.facing, Facing::Left);
    }

    #[test]
    fn test_same_inputs_same_run() {
        let script = |state: &mut GameState| {
            for frame in 0..900 {
                let mut intent = Intent::UP;
                intent.left = (frame / 40) % 2 == 0;
                intent.right = !intent.left && frame % 7 == 0;
                tick(state, &TickInput::held(intent), FRAME);
            }
        };
        let mut a = armed(Difficulty::Hard);
        let mut b = armed(Difficulty::Hard);
        script(&mut a);
        script(&mut b);
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.elapsed, b.elapsed);
        assert_eq!(a.collected, b.collected);
        assert_eq!(a.hazards_hit, b.hazards_hit);
    }
}
