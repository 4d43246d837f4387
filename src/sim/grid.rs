//! Procedural row layout
//!
//! A row is a strip of equal-width grid columns at one world y. Each row is
//! built against a `RowCarry` holding what the previous rows left behind:
//! which columns the last row walled off, and for how many rows each column
//! has stayed open. That memory is what keeps the generated track fair:
//! - walls never stack on the same column in back-to-back rows
//! - no column stays open long enough to become a free straight line
//! - every row keeps a reserved set of truly empty columns as a safe path
//!
//! Hazards and collectibles are only partially decided here. Columns that
//! could hold either are handed back as the row's eligible set and resolved
//! across the whole track by the track builder.

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use crate::tuning::GeneratorConfig;

/// Longest run of rows a column may stay open before it gets a hazard
pub const MAX_EMPTY_STREAK: u32 = 3;
/// Segment placement gives up after this many tries per row
pub const PLACEMENT_ATTEMPTS: u32 = 120;
/// Shrink passes allowed when restoring the empty floor after placement
pub const SHRINK_GUARD: u32 = 10;
/// Absolute limits on obstacle width, as fractions of the row
pub const BASE_OBSTACLE_MIN_FRAC: f32 = 0.15;
pub const BASE_OBSTACLE_MAX_FRAC: f32 = 0.40;
/// Start of the "large" width band, as a fraction of the max width
const LARGE_BAND_START: f32 = 0.75;

/// Classification of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Obstacle,
    Hazard,
    Collectible,
}

/// Inclusive run of obstacle columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.end + 1 - self.start
    }
}

/// State carried from one row to the next
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCarry {
    /// Columns the previous row's obstacles occupy
    pub prev_obstacle: Vec<bool>,
    /// Consecutive rows each column has been open
    pub empty_streak: Vec<u32>,
}

impl RowCarry {
    pub fn new(cols: usize) -> Self {
        Self {
            prev_obstacle: vec![false; cols],
            empty_streak: vec![0; cols],
        }
    }

    pub fn cols(&self) -> usize {
        self.prev_obstacle.len()
    }
}

/// Column counts derived from a config for a given row width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBounds {
    pub cols: usize,
    pub min_empty: usize,
    pub max_empty: usize,
    /// Base floor on empty + collectible columns
    pub open_base: usize,
    pub min_width: usize,
    pub max_width: usize,
    /// Shrinking never takes a segment below this width
    pub shrink_floor: usize,
}

impl RowBounds {
    pub fn new(cols: usize, config: &GeneratorConfig) -> Self {
        let frac_cols = |frac: f32| (cols as f32 * frac).round() as usize;

        let min_empty = frac_cols(config.empty_frac_min).max(1).min(cols);
        let max_empty = frac_cols(config.empty_frac_max).max(min_empty).min(cols);
        let size = &config.obstacle_size;
        let min_width = frac_cols(BASE_OBSTACLE_MIN_FRAC.max(size.min)).max(1);
        let max_width = frac_cols(BASE_OBSTACLE_MAX_FRAC.min(size.max)).max(min_width);

        Self {
            cols,
            min_empty,
            max_empty,
            open_base: frac_cols(config.open_frac_min),
            min_width,
            max_width,
            shrink_floor: frac_cols(BASE_OBSTACLE_MIN_FRAC).max(1),
        }
    }
}

/// One generated row, before hazards and collectibles are assigned
#[derive(Debug, Clone)]
pub struct RowLayout {
    pub y: f32,
    pub cells: Vec<Cell>,
    /// Open columns still free to become a hazard or a collectible
    pub eligible: BTreeSet<usize>,
    /// Open columns guaranteed to stay empty
    pub reserved_empty: usize,
    /// Hazard assignment must keep reserved + eligible at or above this
    pub min_open: usize,
    /// Hazards placed by the streak rule or the density cap
    pub forced_hazards: usize,
    /// The forced placement fallback walled a column the previous row also walled
    pub forced_overlap: bool,
    /// Columns left open past the streak limit because no remedy existed
    pub relaxed_cols: Vec<usize>,
}

impl RowLayout {
    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == Cell::Empty).count()
    }

    /// Reserved plus eligible columns
    pub fn open_count(&self) -> usize {
        self.reserved_empty + self.eligible.len()
    }

    pub fn obstacle_cols(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == Cell::Obstacle)
            .map(|(i, _)| i)
    }
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// Working state while a single row is laid out
struct RowBuilder {
    bounds: RowBounds,
    cells: Vec<Cell>,
    segments: Vec<Segment>,
}

impl RowBuilder {
    fn new(bounds: RowBounds) -> Self {
        Self {
            bounds,
            cells: vec![Cell::Empty; bounds.cols],
            segments: Vec::new(),
        }
    }

    fn empty_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == Cell::Empty).count()
    }

    fn empty_cols(&self) -> Vec<usize> {
        (0..self.bounds.cols)
            .filter(|&c| self.cells[c] == Cell::Empty)
            .collect()
    }

    /// Pick a segment width, biased toward the wide end by `large_chance`
    fn choose_width<R: Rng + ?Sized>(&self, config: &GeneratorConfig, rng: &mut R) -> usize {
        let RowBounds {
            min_width,
            max_width,
            ..
        } = self.bounds;
        if min_width == max_width {
            return min_width;
        }
        if rng.random::<f32>() < config.obstacle_size.large_chance {
            let large_start = ((max_width as f32 * LARGE_BAND_START).floor() as usize).max(min_width);
            rng.random_range(large_start..=max_width)
        } else {
            let mid = (min_width + max_width).div_ceil(2).max(min_width);
            rng.random_range(min_width..=mid)
        }
    }

    /// Find a start column for a segment of `width`.
    ///
    /// The span must be open and must not touch another obstacle. Unless
    /// `force` is set it must also avoid the previous row's obstacle columns
    /// and leave `min_empty` open columns behind. Edge-touching spans win.
    fn find_slot<R: Rng + ?Sized>(
        &self,
        width: usize,
        prev: &[bool],
        force: bool,
        rng: &mut R,
    ) -> Option<usize> {
        let cols = self.bounds.cols;
        if width == 0 || width > cols {
            return None;
        }
        let open = self.empty_count();

        let candidates: Vec<usize> = (0..=cols - width)
            .filter(|&start| {
                let end = start + width;
                (start..end).all(|c| self.cells[c] == Cell::Empty && (force || !prev[c]))
                    && !(start > 0 && self.cells[start - 1] == Cell::Obstacle)
                    && !(end < cols && self.cells[end] == Cell::Obstacle)
                    && (force || open - width >= self.bounds.min_empty)
            })
            .collect();

        let edge: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&start| start == 0 || start + width == cols)
            .collect();

        if let Some(&start) = edge.choose(rng) {
            return Some(start);
        }
        candidates.choose(rng).copied()
    }

    fn apply_segment(&mut self, start: usize, width: usize) {
        for cell in &mut self.cells[start..start + width] {
            *cell = Cell::Obstacle;
        }
        self.segments.push(Segment {
            start,
            end: start + width - 1,
        });
    }

    /// Trim one column off the longest shrinkable segment.
    ///
    /// Prefers trimming a side the previous row did not wall off. Returns the
    /// freed column, or `None` if every segment is already at the floor.
    fn shrink<R: Rng + ?Sized>(&mut self, prev: &[bool], rng: &mut R) -> Option<usize> {
        // Leaves `segments` in placement order for `release_last_segment`
        let floor = self.bounds.shrink_floor;
        let idx = self
            .segments
            .iter()
            .enumerate()
            .filter(|(_, s)| s.len() > floor)
            .min_by_key(|(_, s)| std::cmp::Reverse(s.len()))
            .map(|(i, _)| i)?;
        let seg = self.segments[idx];

        let mut options = Vec::with_capacity(2);
        if !prev[seg.start] {
            options.push(Side::Left);
        }
        if !prev[seg.end] {
            options.push(Side::Right);
        }
        let side = options.choose(rng).copied().unwrap_or(Side::Left);

        let freed = match side {
            Side::Left => {
                self.segments[idx].start += 1;
                seg.start
            }
            Side::Right => {
                self.segments[idx].end -= 1;
                seg.end
            }
        };
        self.cells[freed] = Cell::Empty;
        Some(freed)
    }

    /// Drop the most recently placed segment entirely
    fn release_last_segment(&mut self) -> bool {
        match self.segments.pop() {
            Some(seg) => {
                for cell in &mut self.cells[seg.start..=seg.end] {
                    *cell = Cell::Empty;
                }
                true
            }
            None => false,
        }
    }

    /// Step 1: wall segments
    fn place_segments<R: Rng + ?Sized>(
        &mut self,
        config: &GeneratorConfig,
        prev: &[bool],
        rng: &mut R,
    ) {
        let (seg_min, seg_max) = config.obstacle_segments;
        let target = if seg_max > seg_min {
            rng.random_range(seg_min..=seg_max)
        } else {
            seg_min
        };
        let RowBounds {
            cols,
            min_width,
            max_width,
            min_empty,
            ..
        } = self.bounds;

        let mut placed = 0;
        let mut attempts = 0;
        while placed < target && attempts < PLACEMENT_ATTEMPTS {
            attempts += 1;
            let width = self.choose_width(config, rng).min(cols.saturating_sub(1));
            let found = (min_width..=width.min(max_width))
                .rev()
                .find_map(|w| self.find_slot(w, prev, false, rng).map(|start| (start, w)));
            if let Some((start, w)) = found {
                self.apply_segment(start, w);
                placed += 1;
            }
        }

        if placed < seg_min {
            log::debug!(
                "Row placed {}/{} segments, forcing minimum-width fallback",
                placed,
                seg_min
            );
            for _ in placed..seg_min {
                let Some(start) = self.find_slot(min_width, prev, true, rng) else {
                    break;
                };
                self.apply_segment(start, min_width);
            }
        }

        let mut guard = 0;
        while self.empty_count() < min_empty && guard < SHRINK_GUARD {
            guard += 1;
            if self.shrink(prev, rng).is_none() {
                break;
            }
        }
        while self.empty_count() < min_empty {
            if !self.release_last_segment() {
                break;
            }
            log::debug!("Row released a segment to keep {} open columns", min_empty);
        }
    }

    /// Step 2: break up columns that have stayed open too long.
    /// Returns (forced hazards, relaxed columns).
    fn enforce_streaks<R: Rng + ?Sized>(
        &mut self,
        carry: &mut RowCarry,
        rng: &mut R,
    ) -> (usize, Vec<usize>) {
        let min_empty = self.bounds.min_empty;
        let prior = carry.empty_streak.clone();
        let prev = carry.prev_obstacle.clone();
        let streak = &mut carry.empty_streak;
        let mut forced = 0;
        let mut relaxed = Vec::new();

        for col in 0..self.bounds.cols {
            if self.cells[col] != Cell::Empty {
                streak[col] = 0;
                continue;
            }
            streak[col] = prior[col] + 1;
            if streak[col] <= MAX_EMPTY_STREAK {
                continue;
            }

            if self.empty_count() > min_empty {
                self.cells[col] = Cell::Hazard;
                streak[col] = 0;
                forced += 1;
                continue;
            }

            if let Some(freed) = self.shrink(&prev, rng) {
                // A column already walked past as an obstacle is open after all
                if freed < col {
                    streak[freed] = prior[freed] + 1;
                    if streak[freed] > MAX_EMPTY_STREAK {
                        streak[freed] = MAX_EMPTY_STREAK;
                        relaxed.push(freed);
                    }
                }
                if self.empty_count() > min_empty {
                    self.cells[col] = Cell::Hazard;
                    streak[col] = 0;
                    forced += 1;
                    continue;
                }
            }

            log::debug!("Column {} stays open past the streak limit", col);
            streak[col] = MAX_EMPTY_STREAK;
            relaxed.push(col);
        }

        relaxed.sort_unstable();
        (forced, relaxed)
    }

    /// Step 3: cap the open columns at `max_empty`
    fn cap_density<R: Rng + ?Sized>(&mut self, carry: &mut RowCarry, rng: &mut R) -> usize {
        let mut empties = self.empty_cols();
        let max_empty = self.bounds.max_empty;
        if empties.len() <= max_empty {
            return 0;
        }
        empties.shuffle(rng);
        let excess = empties.len() - max_empty;
        for &col in &empties[..excess] {
            self.cells[col] = Cell::Hazard;
            carry.empty_streak[col] = 0;
        }
        excess
    }
}

/// Lay out one row at world height `y`, updating `carry` for the next row
pub fn build_row<R: Rng + ?Sized>(
    y: f32,
    config: &GeneratorConfig,
    carry: &mut RowCarry,
    rng: &mut R,
) -> RowLayout {
    let bounds = RowBounds::new(carry.cols(), config);
    let mut row = RowBuilder::new(bounds);

    row.place_segments(config, &carry.prev_obstacle, rng);
    let (streak_hazards, relaxed_cols) = row.enforce_streaks(carry, rng);
    let cap_hazards = row.cap_density(carry, rng);

    // Step 4: split what is still open into a reserved path and eligible slots
    let mut empties = row.empty_cols();
    empties.shuffle(rng);
    let reserve_max = empties.len().min(bounds.max_empty);
    let reserve_min = empties.len().min(bounds.min_empty);
    let reserved_empty = if reserve_max > reserve_min {
        rng.random_range(reserve_min..=reserve_max)
    } else {
        reserve_max
    };
    let eligible: BTreeSet<usize> = empties[reserved_empty..].iter().copied().collect();
    let min_open = (reserved_empty + eligible.len()).min(reserved_empty.max(bounds.open_base));

    // Step 5: hand this row's walls to the next row
    let mut forced_overlap = false;
    for (col, cell) in row.cells.iter().enumerate() {
        let walled = *cell == Cell::Obstacle;
        forced_overlap |= walled && carry.prev_obstacle[col];
        carry.prev_obstacle[col] = walled;
    }

    RowLayout {
        y,
        cells: row.cells,
        eligible,
        reserved_empty,
        min_open,
        forced_hazards: streak_hazards + cap_hazards,
        forced_overlap,
        relaxed_cols,
    }
}
