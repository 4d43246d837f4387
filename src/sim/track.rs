//! Track building
//!
//! Easy and Normal replay a hand-authored pattern up the track. Hard and
//! Custom lay out procedural rows with the grid generator, then decide every
//! row's hazards and collectibles together so the whole track hits the
//! configured hazard share.

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;

use super::grid::{Cell, RowCarry, RowLayout, build_row};
use super::patterns::{self, Pattern, PatternRow};
use super::state::{Collectible, Hazard, Obstacle};
use crate::consts::*;
use crate::settings::Difficulty;
use crate::tuning::GeneratorConfig;

/// Pattern rows stop this far before the finish line
pub const PATTERN_END_MARGIN: f32 = 200.0;
/// First procedural row
pub const PROCEDURAL_START_Y: f32 = 260.0;
/// Procedural rows stop this far before the finish line
pub const PROCEDURAL_END_MARGIN: f32 = 220.0;

/// Placed entities for one run
#[derive(Debug, Clone, Default)]
pub struct Track {
    pub obstacles: Vec<Obstacle>,
    pub hazards: Vec<Hazard>,
    pub collectibles: Vec<Collectible>,
    /// Number of rows laid down
    pub rows: usize,
}

impl Track {
    /// Wall covering `width` columns from `start`
    fn add_wall(&mut self, start: usize, width: usize, y: f32) {
        let left = start as f32 * CELL_WIDTH;
        let w = width as f32 * CELL_WIDTH;
        self.obstacles.push(Obstacle {
            pos: Vec2::new(left + w / 2.0, y),
            size: Vec2::new(w, OBSTACLE_HEIGHT),
        });
    }

    fn add_hazard(&mut self, col: usize, y: f32) {
        self.hazards.push(Hazard {
            pos: Vec2::new(cell_center(col), y),
            size: Vec2::new(HAZARD_W, HAZARD_H),
        });
    }

    fn add_collectible(&mut self, col: usize, y: f32) {
        self.collectibles.push(Collectible {
            pos: Vec2::new(cell_center(col), y),
        });
    }

    fn place_pattern_row(&mut self, row: &PatternRow, y: f32) {
        for &(start, width) in row.obstacles {
            self.add_wall(start, width, y);
        }
        for &col in row.hazards {
            self.add_hazard(col, y);
        }
        for &col in row.collectibles {
            self.add_collectible(col, y);
        }
        self.rows += 1;
    }

    /// Turn a finished cell row into entities, merging runs of wall cells
    fn place_layout(&mut self, layout: &RowLayout) {
        let cells = &layout.cells;
        let mut col = 0;
        while col < cells.len() {
            match cells[col] {
                Cell::Obstacle => {
                    let mut end = col;
                    while end + 1 < cells.len() && cells[end + 1] == Cell::Obstacle {
                        end += 1;
                    }
                    self.add_wall(col, end + 1 - col, layout.y);
                    col = end + 1;
                    continue;
                }
                Cell::Hazard => self.add_hazard(col, layout.y),
                Cell::Collectible => self.add_collectible(col, layout.y),
                Cell::Empty => {}
            }
            col += 1;
        }
        self.rows += 1;
    }
}

#[inline]
fn cell_center(col: usize) -> f32 {
    col as f32 * CELL_WIDTH + CELL_WIDTH / 2.0
}

/// Build the track for a difficulty
pub fn build_track<R: Rng + ?Sized>(
    difficulty: Difficulty,
    custom: &GeneratorConfig,
    rng: &mut R,
) -> Track {
    let track = match difficulty {
        Difficulty::Easy => build_pattern_track(&patterns::EASY),
        Difficulty::Normal => build_pattern_track(&patterns::NORMAL),
        Difficulty::Hard => build_procedural_track(&GeneratorConfig::hard(), rng),
        Difficulty::Custom => build_procedural_track(custom, rng),
    };
    log::info!(
        "Built {} track: {} rows, {} obstacles, {} hazards, {} jugs",
        difficulty.as_str(),
        track.rows,
        track.obstacles.len(),
        track.hazards.len(),
        track.collectibles.len()
    );
    track
}

/// Replay `pattern` up the track, covering a bare finish stretch if needed
pub fn build_pattern_track(pattern: &Pattern) -> Track {
    let mut track = Track::default();
    let rows = pattern.rows;
    if rows.is_empty() {
        return track;
    }

    let mut y = pattern.start_y;
    let mut index = 0;
    let mut last_wall_y = f32::NEG_INFINITY;
    while y < TRACK_LEN - PATTERN_END_MARGIN {
        let row = &rows[index % rows.len()];
        track.place_pattern_row(row, y);
        if row.has_obstacles() {
            last_wall_y = y;
        }
        y += pattern.step(row);
        index += 1;
    }

    if TRACK_LEN - last_wall_y > pattern.spacing {
        let row = &rows[pattern.final_row % rows.len()];
        track.place_pattern_row(row, TRACK_LEN - pattern.step(row));
    }
    track
}

/// World y of every procedural row
pub fn procedural_row_ys<R: Rng + ?Sized>(config: &GeneratorConfig, rng: &mut R) -> Vec<f32> {
    let (gap_min, gap_max) = config.row_gap;
    let gap_min = gap_min.max(1.0);
    let gap_range = (gap_max - gap_min).max(0.0);

    let mut ys = Vec::new();
    let mut y = PROCEDURAL_START_Y;
    while y < TRACK_LEN - PROCEDURAL_END_MARGIN {
        ys.push(y);
        y += gap_min + rng.random::<f32>() * gap_range;
    }
    ys
}

/// Lay out every procedural row, still holding eligible slots
pub fn generate_rows<R: Rng + ?Sized>(config: &GeneratorConfig, rng: &mut R) -> Vec<RowLayout> {
    let ys = procedural_row_ys(config, rng);
    let mut carry = RowCarry::new(GRID_COLS);
    ys.into_iter()
        .map(|y| build_row(y, config, &mut carry, rng))
        .collect()
}

/// Convert eligible slots to hazards until the track-wide hazard share is met.
///
/// Hazards the rows already forced count toward the target and floor it. The
/// first pass skips slots that would push a row under its open floor; a second
/// pass over the leftovers ignores the floor. Returns how many hazards are
/// still missing (zero unless the pool ran dry).
pub fn assign_hazards<R: Rng + ?Sized>(rows: &mut [RowLayout], share: f32, rng: &mut R) -> usize {
    let forced: usize = rows.iter().map(|r| r.forced_hazards).sum();
    let pool_slots = |rows: &[RowLayout]| -> Vec<(usize, usize)> {
        rows.iter()
            .enumerate()
            .flat_map(|(r, row)| row.eligible.iter().map(move |&c| (r, c)))
            .collect()
    };

    let mut pool = pool_slots(rows);
    let target = forced.max((share * (pool.len() + forced) as f32).round() as usize);
    let mut remaining = target - forced;

    pool.shuffle(rng);
    for &(r, col) in &pool {
        if remaining == 0 {
            break;
        }
        let row = &mut rows[r];
        if !row.eligible.contains(&col) {
            continue;
        }
        if row.open_count() - 1 < row.min_open {
            continue;
        }
        row.cells[col] = Cell::Hazard;
        row.eligible.remove(&col);
        remaining -= 1;
    }

    if remaining > 0 {
        log::debug!("{} hazards short after floor-respecting pass", remaining);
        let mut leftovers = pool_slots(rows);
        leftovers.shuffle(rng);
        for (r, col) in leftovers {
            if remaining == 0 {
                break;
            }
            let row = &mut rows[r];
            row.cells[col] = Cell::Hazard;
            row.eligible.remove(&col);
            remaining -= 1;
        }
    }
    remaining
}

/// Full procedural track
pub fn build_procedural_track<R: Rng + ?Sized>(config: &GeneratorConfig, rng: &mut R) -> Track {
    let mut rows = generate_rows(config, rng);
    let missing = assign_hazards(&mut rows, config.hazard_share(), rng);
    if missing > 0 {
        log::debug!("Track is {} hazards under target", missing);
    }

    let mut track = Track::default();
    for row in &mut rows {
        for col in std::mem::take(&mut row.eligible) {
            row.cells[col] = Cell::Collectible;
        }
        track.place_layout(row);
    }
    track
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn has_wall_at(track: &Track, y: f32) -> bool {
        track.obstacles.iter().any(|o| (o.pos.y - y).abs() < 0.01)
    }

    #[test]
    fn test_easy_pattern_layout() {
        let track = build_pattern_track(&patterns::EASY);
        // 38 cycled rows plus the finish row
        assert_eq!(track.rows, 39);
        assert!(has_wall_at(&track, 320.0));
        assert!(has_wall_at(&track, TRACK_LEN - 125.0));

        // First row: one 6-column wall centred on the track
        let first = track.obstacles[0];
        assert_eq!(first.pos, Vec2::new(240.0, 320.0));
        assert_eq!(first.size, Vec2::new(240.0, OBSTACLE_HEIGHT));
    }

    #[test]
    fn test_normal_pattern_finish_row() {
        let track = build_pattern_track(&patterns::NORMAL);
        assert_eq!(track.rows, 87);
        assert!(has_wall_at(&track, TRACK_LEN - 55.0));
        // Every row stays below the end margin except the finish row
        let max_y = track
            .hazards
            .iter()
            .map(|h| h.pos.y)
            .fold(f32::NEG_INFINITY, f32::max);
        assert!(max_y <= TRACK_LEN - 55.0 + 0.01);
    }

    #[test]
    fn test_pattern_cells_are_centered() {
        let track = build_pattern_track(&patterns::EASY);
        let hazard = track.hazards[0];
        assert_eq!(hazard.pos, Vec2::new(60.0, 320.0));
        assert_eq!(hazard.size, Vec2::new(HAZARD_W, HAZARD_H));
        assert_eq!(track.collectibles[0].pos, Vec2::new(220.0, 320.0));
    }

    #[test]
    fn test_row_ys_walk_within_gap_range() {
        let config = GeneratorConfig::hard();
        let mut rng = Pcg32::seed_from_u64(11);
        let ys = procedural_row_ys(&config, &mut rng);
        assert_eq!(ys[0], PROCEDURAL_START_Y);
        assert!(*ys.last().unwrap() < TRACK_LEN - PROCEDURAL_END_MARGIN);
        for pair in ys.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= config.row_gap.0 - 0.01 && gap <= config.row_gap.1 + 0.01);
        }
    }

    #[test]
    fn test_assign_hazards_hits_target() {
        for config in [GeneratorConfig::relaxed(), GeneratorConfig::hard()] {
            let mut rng = Pcg32::seed_from_u64(12);
            let mut rows = generate_rows(&config, &mut rng);
            let forced: usize = rows.iter().map(|r| r.forced_hazards).sum();
            let pool: usize = rows.iter().map(|r| r.eligible.len()).sum();
            let target = forced.max((config.hazard_share() * (pool + forced) as f32).round() as usize);

            let missing = assign_hazards(&mut rows, config.hazard_share(), &mut rng);
            assert_eq!(missing, 0);

            let hazards: usize = rows
                .iter()
                .map(|r| r.cells.iter().filter(|&&c| c == Cell::Hazard).count())
                .sum();
            assert_eq!(hazards, target);
            // Reserved columns are never touched
            for row in &rows {
                assert!(row.empty_count() >= row.reserved_empty);
            }
        }
    }

    #[test]
    fn test_assign_hazards_overrides_floor_when_short() {
        // Every slot is protected by the open floor, so only the second pass can fill them
        let mut rows = vec![RowLayout {
            y: 400.0,
            cells: vec![Cell::Empty; 2],
            eligible: [0, 1].into_iter().collect(),
            reserved_empty: 0,
            min_open: 2,
            forced_hazards: 0,
            forced_overlap: false,
            relaxed_cols: Vec::new(),
        }];
        let mut rng = Pcg32::seed_from_u64(14);

        let missing = assign_hazards(&mut rows, 1.0, &mut rng);
        assert_eq!(missing, 0);
        assert!(rows[0].eligible.is_empty());
        assert_eq!(rows[0].cells, vec![Cell::Hazard, Cell::Hazard]);
    }

    #[test]
    fn test_procedural_track_geometry() {
        let config = GeneratorConfig::hard();
        let mut rng = Pcg32::seed_from_u64(13);
        let track = build_procedural_track(&config, &mut rng);

        assert!(track.rows > 0);
        for o in &track.obstacles {
            let cols = o.size.x / CELL_WIDTH;
            assert!((cols - cols.round()).abs() < 1e-4);
            assert!(o.pos.x - o.size.x / 2.0 >= -0.01);
            assert!(o.pos.x + o.size.x / 2.0 <= VIEW_W + 0.01);
        }
        for c in &track.collectibles {
            assert!(c.pos.x > 0.0 && c.pos.x < VIEW_W);
        }
    }

    #[test]
    fn test_adjacent_wall_cells_merge() {
        let mut layout = RowLayout {
            y: 400.0,
            cells: vec![Cell::Empty; GRID_COLS],
            eligible: Default::default(),
            reserved_empty: 0,
            min_open: 0,
            forced_hazards: 0,
            forced_overlap: false,
            relaxed_cols: Vec::new(),
        };
        for col in [0, 1, 2, 5, 9, 10] {
            layout.cells[col] = Cell::Obstacle;
        }
        layout.cells[7] = Cell::Hazard;

        let mut track = Track::default();
        track.place_layout(&layout);
        assert_eq!(track.obstacles.len(), 3);
        assert_eq!(track.obstacles[0].size.x, 3.0 * CELL_WIDTH);
        assert_eq!(track.obstacles[0].pos.x, 60.0);
        assert_eq!(track.obstacles[2].pos.x, 400.0);
        assert_eq!(track.hazards.len(), 1);
        assert_eq!(track.hazards[0].pos.x, 300.0);
    }

    #[test]
    fn test_same_seed_same_procedural_track() {
        let config = GeneratorConfig::relaxed();
        let a = build_procedural_track(&config, &mut Pcg32::seed_from_u64(99));
        let b = build_procedural_track(&config, &mut Pcg32::seed_from_u64(99));
        assert_eq!(a.obstacles, b.obstacles);
        assert_eq!(a.hazards, b.hazards);
        assert_eq!(a.collectibles, b.collectibles);
    }
}
