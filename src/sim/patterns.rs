//! Hand-authored row patterns for the fixed difficulties
//!
//! Columns refer to the 12-column row grid. A pattern is replayed
//! cyclically up the track.

/// One authored row
#[derive(Debug, Clone, Copy)]
pub struct PatternRow {
    /// Obstacle segments as (start column, width in columns)
    pub obstacles: &'static [(usize, usize)],
    pub hazards: &'static [usize],
    pub collectibles: &'static [usize],
    /// Distance to the next row, if different from the pattern spacing
    pub spacing: Option<f32>,
}

impl PatternRow {
    pub fn has_obstacles(&self) -> bool {
        !self.obstacles.is_empty()
    }
}

/// A replayable pattern
#[derive(Debug, Clone, Copy)]
pub struct Pattern {
    pub rows: &'static [PatternRow],
    /// World y of the first row
    pub start_y: f32,
    /// Nominal distance between rows
    pub spacing: f32,
    /// Row used to cover a bare finish stretch
    pub final_row: usize,
}

impl Pattern {
    /// Distance to advance after `row`
    pub fn step(&self, row: &PatternRow) -> f32 {
        row.spacing.unwrap_or(self.spacing)
    }
}

const fn row(
    obstacles: &'static [(usize, usize)],
    hazards: &'static [usize],
    collectibles: &'static [usize],
) -> PatternRow {
    PatternRow {
        obstacles,
        hazards,
        collectibles,
        spacing: None,
    }
}

const NORMAL_HALF: Option<f32> = Some(NORMAL_SPACING / 2.0);

const fn half(
    obstacles: &'static [(usize, usize)],
    hazards: &'static [usize],
    collectibles: &'static [usize],
) -> PatternRow {
    PatternRow {
        obstacles,
        hazards,
        collectibles,
        spacing: NORMAL_HALF,
    }
}

const EASY_SPACING: f32 = 125.0;
const NORMAL_SPACING: f32 = 110.0;

/// Alternating center wall / split walls
pub const EASY: Pattern = Pattern {
    rows: &[
        row(&[(3, 6)], &[1, 10], &[5]),
        row(&[(0, 4), (8, 4)], &[4, 7], &[1, 10]),
        row(&[(3, 6)], &[5], &[1, 10]),
        row(&[(0, 4), (8, 4)], &[4, 7], &[5]),
    ],
    start_y: 320.0,
    spacing: EASY_SPACING,
    final_row: 0,
};

/// Wall rows interleaved with hazard-only spacer rows at half spacing
pub const NORMAL: Pattern = Pattern {
    rows: &[
        // A1
        half(&[(2, 3), (7, 3), (11, 1)], &[0, 1, 6, 10], &[5]),
        half(&[], &[8], &[]),
        // B1
        half(&[(0, 1), (3, 5), (10, 2)], &[2, 9], &[7]),
        half(&[], &[6], &[]),
        // C1
        half(&[(0, 4), (8, 4)], &[4, 7], &[6]),
        half(&[], &[8], &[]),
        // D1
        half(&[(0, 1), (3, 7)], &[1, 10], &[2, 9]),
        half(&[], &[0, 6, 8], &[]),
        // A2
        half(&[(2, 3), (7, 3), (11, 1)], &[1, 6], &[5]),
        half(&[], &[0, 9], &[]),
        // B2
        half(&[(0, 1), (3, 5), (10, 2)], &[1, 2, 9], &[7]),
        half(&[], &[0, 3, 5, 9], &[]),
        // C2
        half(&[(0, 4), (8, 4)], &[4, 7], &[6]),
        half(&[], &[2], &[]),
        // D2
        half(&[(0, 1), (3, 7)], &[1, 10], &[2, 9]),
        half(&[], &[0, 6, 8], &[]),
    ],
    start_y: 300.0,
    spacing: NORMAL_SPACING,
    final_row: 14,
};
