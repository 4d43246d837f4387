//! Movement integration and wall collision
//!
//! World y grows up the track. The runner box reaches further below its
//! anchor (the feet) than above it, and walls are shrunk by a fixed padding
//! so grazing contact is forgiven.

use glam::Vec2;

use super::arena::Arena;
use super::state::{Intent, Obstacle};
use crate::consts::*;
use crate::clamp_runner_x;

/// Axis-aligned box, edges inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Touching edges count as overlap
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !(self.max.x < other.min.x
            || self.min.x > other.max.x
            || self.max.y < other.min.y
            || self.min.y > other.max.y)
    }
}

/// Collision box of a runner anchored at `pos`
pub fn runner_box(pos: Vec2) -> Aabb {
    Aabb {
        min: Vec2::new(pos.x - RUNNER_HALF_WIDTH, pos.y - RUNNER_TOP_OFFSET),
        max: Vec2::new(pos.x + RUNNER_HALF_WIDTH, pos.y + RUNNER_BOTTOM_OFFSET),
    }
}

/// Wall box shrunk by the padding on every side
pub fn obstacle_box(obstacle: &Obstacle) -> Aabb {
    let half = obstacle.size / 2.0 - Vec2::splat(OBSTACLE_PADDING);
    Aabb {
        min: obstacle.pos - half,
        max: obstacle.pos + half,
    }
}

pub fn runner_hits(pos: Vec2, obstacle: &Obstacle) -> bool {
    runner_box(pos).overlaps(&obstacle_box(obstacle))
}

/// Position after one frame of held movement.
///
/// `lane_target` replaces x before held left/right is applied. Moving down
/// never goes below the start line and x always stays inside the edge margin.
pub fn integrate_movement(pos: Vec2, intent: Intent, lane_target: Option<f32>, dt: f32) -> Vec2 {
    let step = MOVE_SPEED * dt;
    let mut next = pos;
    if let Some(x) = lane_target {
        next.x = clamp_runner_x(x);
    }
    if intent.up {
        next.y += step;
    }
    if intent.down {
        next.y = (next.y - step).max(START_Y);
    }
    if intent.left {
        next.x = clamp_runner_x(next.x - step);
    }
    if intent.right {
        next.x = clamp_runner_x(next.x + step);
    }
    next
}

/// How a frame's move ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// No wall touched
    Clear,
    /// At least one axis was pulled back
    Partial,
    /// Both axes reverted to the previous position
    Blocked,
}

/// Pull `pos` out of any wall it moved into from `prev`.
///
/// Per wall: drop the vertical move, else drop the horizontal move, else
/// revert to `prev` and stop. Only axes that actually moved are tried.
pub fn resolve_obstacles(prev: Vec2, pos: Vec2, obstacles: &Arena<Obstacle>) -> (Vec2, Resolution) {
    let mut pos = pos;
    let mut resolution = Resolution::Clear;

    for (_, obstacle) in obstacles.iter() {
        if !runner_hits(pos, obstacle) {
            continue;
        }

        if pos.y != prev.y {
            let candidate = Vec2::new(pos.x, prev.y);
            if !runner_hits(candidate, obstacle) {
                pos = candidate;
                resolution = Resolution::Partial;
                continue;
            }
        }

        if pos.x != prev.x {
            let candidate = Vec2::new(prev.x, pos.y);
            if !runner_hits(candidate, obstacle) {
                pos = candidate;
                resolution = Resolution::Partial;
                continue;
            }
        }

        return (prev, Resolution::Blocked);
    }

    (pos, resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn wall(x: f32, y: f32, w: f32) -> Obstacle {
        Obstacle {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, OBSTACLE_HEIGHT),
        }
    }

    #[test]
    fn test_overlap_is_inclusive() {
        let a = Aabb {
            min: Vec2::ZERO,
            max: Vec2::splat(10.0),
        };
        let touching = Aabb {
            min: Vec2::new(10.0, 0.0),
            max: Vec2::new(20.0, 10.0),
        };
        let apart = Aabb {
            min: Vec2::new(10.5, 0.0),
            max: Vec2::new(20.0, 10.0),
        };
        assert!(a.overlaps(&touching));
        assert!(!a.overlaps(&apart));
    }

    #[test]
    fn test_padding_forgives_grazes() {
        let ob = wall(240.0, 500.0, 240.0);
        // Runner edge 6 units inside the raw wall edge, still outside the padded box
        let pos = Vec2::new(120.0 - RUNNER_HALF_WIDTH + 6.0, 500.0);
        assert!(!runner_hits(pos, &ob));
        assert!(runner_hits(Vec2::new(240.0, 500.0), &ob));
    }

    #[test]
    fn test_integrate_clamps() {
        let down = Intent {
            down: true,
            ..Default::default()
        };
        let pos = integrate_movement(Vec2::new(240.0, START_Y + 1.0), down, None, 0.048);
        assert_eq!(pos.y, START_Y);

        let left = Intent {
            left: true,
            ..Default::default()
        };
        let pos = integrate_movement(Vec2::new(EDGE_MARGIN + 2.0, 300.0), left, None, 0.048);
        assert_eq!(pos.x, EDGE_MARGIN);
    }

    #[test]
    fn test_lane_target_then_held_move() {
        let right = Intent {
            right: true,
            ..Default::default()
        };
        let pos = integrate_movement(Vec2::new(240.0, 300.0), right, Some(460.0), 0.02);
        assert_eq!(pos.x, VIEW_W - EDGE_MARGIN);
    }

    #[test]
    fn test_blocked_upward_move_keeps_sideways_slide() {
        let walls: Arena<Obstacle> = [wall(240.0, 400.0, 240.0)].into_iter().collect();
        // Runner top just below the padded wall bottom, moving up and right
        let prev = Vec2::new(240.0, 400.0 - 14.0 - RUNNER_BOTTOM_OFFSET - 1.0);
        let next = prev + Vec2::new(5.0, 5.0);
        let (pos, res) = resolve_obstacles(prev, next, &walls);
        assert_eq!(res, Resolution::Partial);
        assert_eq!(pos, Vec2::new(prev.x + 5.0, prev.y));
    }

    #[test]
    fn test_deep_overlap_reverts_fully() {
        let walls: Arena<Obstacle> = [wall(240.0, 400.0, 240.0)].into_iter().collect();
        // Already inside: neither single-axis revert clears it
        let prev = Vec2::new(240.0, 400.0);
        let next = Vec2::new(244.0, 404.0);
        let (pos, res) = resolve_obstacles(prev, next, &walls);
        assert_eq!(res, Resolution::Blocked);
        assert_eq!(pos, prev);
    }

    #[test]
    fn test_removed_walls_are_ignored() {
        let mut walls: Arena<Obstacle> = [wall(240.0, 400.0, 240.0)].into_iter().collect();
        walls.remove(0);
        let next = Vec2::new(240.0, 400.0);
        assert_eq!(
            resolve_obstacles(Vec2::new(240.0, 390.0), next, &walls),
            (next, Resolution::Clear)
        );
    }

    fn arb_wall() -> impl Strategy<Value = Obstacle> {
        (0usize..GRID_COLS, 1usize..6, 150.0f32..1200.0).prop_map(|(start, width, y)| {
            let width = width.min(GRID_COLS - start);
            let w = width as f32 * CELL_WIDTH;
            wall(start as f32 * CELL_WIDTH + w / 2.0, y, w)
        })
    }

    proptest! {
        #[test]
        fn prop_clear_position_is_untouched(
            walls in prop::collection::vec(arb_wall(), 0..8),
            x in EDGE_MARGIN..(VIEW_W - EDGE_MARGIN),
            y in START_Y..1300.0f32,
        ) {
            let arena: Arena<Obstacle> = walls.into_iter().collect();
            let pos = Vec2::new(x, y);
            prop_assume!(arena.iter().all(|(_, ob)| !runner_hits(pos, ob)));
            let (resolved, res) = resolve_obstacles(pos, pos, &arena);
            prop_assert_eq!(resolved, pos);
            prop_assert_eq!(res, Resolution::Clear);
        }

        #[test]
        fn prop_single_axis_move_ends_outside(
            ob in arb_wall(),
            x in EDGE_MARGIN..(VIEW_W - EDGE_MARGIN),
            y in START_Y..1300.0f32,
            delta in -12.0f32..12.0,
            vertical in any::<bool>(),
        ) {
            let prev = Vec2::new(x, y);
            prop_assume!(!runner_hits(prev, &ob));
            let next = if vertical {
                Vec2::new(x, (y + delta).max(START_Y))
            } else {
                Vec2::new(clamp_runner_x(x + delta), y)
            };
            let arena: Arena<Obstacle> = [ob].into_iter().collect();
            let (resolved, _) = resolve_obstacles(prev, next, &arena);
            prop_assert!(!runner_hits(resolved, &ob));
        }
    }
}
