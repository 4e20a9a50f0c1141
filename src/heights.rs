//! Height Grid - 2D integer elevation array with clamped, total accessors
//! Terrain Data Store - committed "base" grid + live "working" grid

use bevy::prelude::*;

use crate::constants::{DEFAULT_HEIGHT, MAX_HEIGHT, MIN_HEIGHT};

/// Clamp any height into `[MIN_HEIGHT, MAX_HEIGHT]`.
#[inline]
pub fn clamp_height(h: i32) -> i32 {
    h.clamp(MIN_HEIGHT, MAX_HEIGHT)
}

// ============================================================================
// HEIGHT GRID
// ============================================================================

/// Row-major `rows × cols` elevations. Dimensions never change after construction.
/// Reads outside the grid return `DEFAULT_HEIGHT`; writes outside are ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeightGrid {
    rows: usize,
    cols: usize,
    cells: Vec<i32>,
}

impl Default for HeightGrid {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl HeightGrid {
    /// Flat grid (every cell at `DEFAULT_HEIGHT`).
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols, cells: vec![DEFAULT_HEIGHT; rows * cols] }
    }

    /// Build from nested rows (`rows[y][x]`). Short rows are padded with the default,
    /// every value is clamped.
    pub fn from_rows(rows: &[Vec<i32>]) -> Self {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut grid = Self::new(rows.len(), cols);
        for (y, row) in rows.iter().enumerate() {
            for (x, &h) in row.iter().enumerate() {
                grid.cells[y * cols + x] = clamp_height(h);
            }
        }
        grid
    }

    pub fn rows(&self) -> usize { self.rows }
    pub fn cols(&self) -> usize { self.cols }
    pub fn is_empty(&self) -> bool { self.cells.is_empty() }

    /// Largest depth-band key `x + y` present in the grid, or `None` for an empty grid.
    pub fn max_depth(&self) -> Option<i32> {
        if self.is_empty() { return None; }
        Some((self.rows - 1 + self.cols - 1) as i32)
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.cols && (y as usize) < self.rows
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y).then(|| y as usize * self.cols + x as usize)
    }

    /// Height at (x, y), `DEFAULT_HEIGHT` when out of bounds.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> i32 {
        self.index(x, y).map_or(DEFAULT_HEIGHT, |i| self.cells[i])
    }

    /// Store a clamped height. Returns true if the stored value changed.
    pub fn set(&mut self, x: i32, y: i32, h: i32) -> bool {
        let Some(i) = self.index(x, y) else { return false };
        let next = clamp_height(h);
        if self.cells[i] == next { return false; }
        self.cells[i] = next;
        true
    }

    /// Raw row-major values.
    pub fn as_slice(&self) -> &[i32] { &self.cells }

    /// Iterate `(x, y, height)` over every cell, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, i32)> + '_ {
        let cols = self.cols.max(1);
        self.cells.iter().enumerate().map(move |(i, &h)| ((i % cols) as i32, (i / cols) as i32, h))
    }

    /// Copied 2D array, `rows[y][x]`.
    pub fn to_rows(&self) -> Vec<Vec<i32>> {
        if self.cols == 0 { return vec![Vec::new(); self.rows]; }
        self.cells.chunks(self.cols).map(<[i32]>::to_vec).collect()
    }

    /// New grid of the given size holding the overlapping sub-rectangle of `self`.
    pub fn resized(&self, rows: usize, cols: usize) -> Self {
        let mut out = Self::new(rows, cols);
        let keep_rows = rows.min(self.rows);
        let keep_cols = cols.min(self.cols);
        for y in 0..keep_rows {
            let src = y * self.cols;
            let dst = y * cols;
            out.cells[dst..dst + keep_cols].copy_from_slice(&self.cells[src..src + keep_cols]);
        }
        out
    }

    /// Overwrite with another grid's values. Sizes differ only if a caller mixes boards;
    /// in that case the overlap is copied and the rest reset.
    pub fn copy_from(&mut self, other: &HeightGrid) {
        if self.rows == other.rows && self.cols == other.cols {
            self.cells.copy_from_slice(&other.cells);
        } else {
            *self = other.resized(self.rows, self.cols);
        }
    }

    /// Lowest and highest stored height (`(0, 0)` for an empty grid).
    pub fn height_range(&self) -> (i32, i32) {
        let lo = self.cells.iter().copied().min().unwrap_or(DEFAULT_HEIGHT);
        let hi = self.cells.iter().copied().max().unwrap_or(DEFAULT_HEIGHT);
        (lo, hi)
    }
}

// ============================================================================
// TERRAIN DATA STORE
// ============================================================================

/// Owns the committed and live height grids for one board.
/// `working` is the only shared mutable state in the engine.
#[derive(Resource, Clone, Debug, Default)]
pub struct TerrainDataStore {
    base: HeightGrid,
    working: HeightGrid,
}

impl TerrainDataStore {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { base: HeightGrid::new(rows, cols), working: HeightGrid::new(rows, cols) }
    }

    pub fn rows(&self) -> usize { self.working.rows() }
    pub fn cols(&self) -> usize { self.working.cols() }

    pub fn base(&self) -> &HeightGrid { &self.base }
    pub fn working(&self) -> &HeightGrid { &self.working }
    pub fn working_mut(&mut self) -> &mut HeightGrid { &mut self.working }

    /// working -> base. Called when leaving edit mode.
    pub fn commit(&mut self) {
        self.base.copy_from(&self.working);
        debug!("terrain: committed {}x{} working grid", self.rows(), self.cols());
    }

    /// base -> working. Called when entering edit mode.
    pub fn reload(&mut self) {
        self.working.copy_from(&self.base);
        debug!("terrain: reloaded working grid from base");
    }

    /// Reinitialize both grids at the new size, keeping the common sub-rectangle.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        if rows == self.rows() && cols == self.cols() { return; }
        info!("terrain: resize {}x{} -> {}x{}", self.rows(), self.cols(), rows, cols);
        self.base = self.base.resized(rows, cols);
        self.working = self.working.resized(rows, cols);
    }

    /// Immutable copy of the working grid, taken at the start of a paint pass.
    pub fn snapshot(&self) -> HeightGrid {
        self.working.clone()
    }
}
