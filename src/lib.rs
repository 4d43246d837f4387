//! Jug Dash - A vertical lane runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (track generation, movement, triggers, run state)
//! - `platform`: Browser/native platform abstraction (input mapping, frame clock, wasm host)
//! - `settings`: Persisted player preferences (difficulty, custom tuning)
//! - `tuning`: Data-driven generator balance

pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::{Difficulty, Settings};
pub use tuning::{ConfigError, GeneratorConfig};

/// Game configuration constants
pub mod consts {
    /// Play field dimensions (world units == CSS pixels at 1x)
    pub const VIEW_W: f32 = 480.0;
    pub const VIEW_H: f32 = 720.0;

    /// Distance from the start line to the finish line
    pub const TRACK_LEN: f32 = 5200.0;
    /// Horizontal inset of the playable width and outer lanes
    pub const EDGE_MARGIN: f32 = 20.0;
    pub const LANE_COUNT: usize = 3;

    /// Runner hit box, relative to the runner's anchor point
    pub const RUNNER_HALF_WIDTH: f32 = 18.0;
    pub const RUNNER_TOP_OFFSET: f32 = 40.0;
    pub const RUNNER_BOTTOM_OFFSET: f32 = 12.0;
    /// Obstacles are shrunk by this much on every side before overlap tests
    pub const OBSTACLE_PADDING: f32 = 12.0;

    /// Runner spawn height; the runner can never back up past it
    pub const START_Y: f32 = 80.0;
    /// Runner speed along every held axis (units/s)
    pub const MOVE_SPEED: f32 = 252.0;
    /// Upper bound on a single frame step (seconds)
    pub const MAX_FRAME_DT: f32 = 0.048;
    /// Camera keeps the runner this far up the viewport
    pub const CAMERA_LEAD_FRAC: f32 = 0.68;

    /// Row grid
    pub const GRID_COLS: usize = 12;
    pub const CELL_WIDTH: f32 = VIEW_W / GRID_COLS as f32;

    /// Placed entity sizes
    pub const OBSTACLE_HEIGHT: f32 = 52.0;
    pub const HAZARD_W: f32 = 46.0;
    pub const HAZARD_H: f32 = 26.0;

    /// Collectible pickup box (half extents around the runner anchor)
    pub const PICKUP_REACH_X: f32 = 28.0;
    pub const PICKUP_REACH_Y: f32 = 42.0;
    /// Hazard lane overlap as a fraction of the hazard width
    pub const HAZARD_LANE_FRAC: f32 = 0.6;
    /// Vertical band around the runner that can touch a hazard
    pub const HAZARD_BAND_BELOW: f32 = 40.0;
    pub const HAZARD_BAND_ABOVE: f32 = 20.0;

    /// Time adjustments (seconds)
    pub const COLLECTIBLE_REBATE: f32 = 3.0;
    pub const HAZARD_PENALTY: f32 = 4.0;
}

/// Center x of the given lane
#[inline]
pub fn lane_x(lane: usize) -> f32 {
    use consts::*;
    if LANE_COUNT == 1 {
        return VIEW_W / 2.0;
    }
    let spacing = (VIEW_W - EDGE_MARGIN * 2.0) / (LANE_COUNT - 1) as f32;
    EDGE_MARGIN + lane.min(LANE_COUNT - 1) as f32 * spacing
}

/// Index of the lane whose center is closest to `x`
pub fn nearest_lane(x: f32) -> usize {
    (0..consts::LANE_COUNT)
        .min_by(|&a, &b| {
            (lane_x(a) - x)
                .abs()
                .partial_cmp(&(lane_x(b) - x).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(0)
}

/// Clamp a runner x coordinate to the playable width
#[inline]
pub fn clamp_runner_x(x: f32) -> f32 {
    x.clamp(consts::EDGE_MARGIN, consts::VIEW_W - consts::EDGE_MARGIN)
}

/// HUD time string, e.g. `12.34s`
pub fn format_time(seconds: f32) -> String {
    format!("{:.2}s", (seconds * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lanes_span_playable_width() {
        assert_eq!(lane_x(0), consts::EDGE_MARGIN);
        assert_eq!(lane_x(1), consts::VIEW_W / 2.0);
        assert_eq!(lane_x(2), consts::VIEW_W - consts::EDGE_MARGIN);
        // Out-of-range lanes clamp to the last one
        assert_eq!(lane_x(9), lane_x(2));
    }

    #[test]
    fn test_nearest_lane() {
        assert_eq!(nearest_lane(0.0), 0);
        assert_eq!(nearest_lane(200.0), 1);
        assert_eq!(nearest_lane(470.0), 2);
    }

    #[test]
    fn test_clamp_runner_x() {
        assert_eq!(clamp_runner_x(-5.0), 20.0);
        assert_eq!(clamp_runner_x(250.0), 250.0);
        assert_eq!(clamp_runner_x(999.0), 460.0);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0.00s");
        assert_eq!(format_time(12.346), "12.35s");
        assert_eq!(format_time(3.1), "3.10s");
    }
}
