//! Terrain Fields - slope, aspect and moisture derived from a height snapshot
//!
//! Pure functions. Fields are rebuilt from scratch on every paint pass.

use std::collections::VecDeque;

use bevy::prelude::*;

use crate::constants::{MOISTURE_DECAY, ORIENTATION_EPSILON};
use crate::heights::HeightGrid;
use crate::projection::band_cells;

/// Per-cell filter: `(x, y, height) -> include`.
pub type CellPredicate<'a> = &'a dyn Fn(i32, i32, i32) -> bool;

// ============================================================================
// SCALAR FIELD
// ============================================================================

/// Row-major f32 values matching a height grid's dimensions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScalarField {
    rows: usize,
    cols: usize,
    values: Vec<f32>,
}

impl ScalarField {
    pub fn new(rows: usize, cols: usize, fill: f32) -> Self {
        Self { rows, cols, values: vec![fill; rows * cols] }
    }

    pub fn rows(&self) -> usize { self.rows }
    pub fn cols(&self) -> usize { self.cols }
    pub fn values(&self) -> &[f32] { &self.values }

    /// Value at (x, y), 0 outside the field.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> f32 {
        if x < 0 || y < 0 || x as usize >= self.cols || y as usize >= self.rows { return 0.0; }
        self.values[y as usize * self.cols + x as usize]
    }

    #[inline]
    fn set(&mut self, x: usize, y: usize, v: f32) {
        self.values[y * self.cols + x] = v;
    }
}

// ============================================================================
// SLOPE / ASPECT
// ============================================================================

/// Central differences with edge cells reusing the center height for a missing
/// neighbor. `slope = hypot(dzdx, dzdy)`, `aspect = atan2(dzdy, dzdx)`.
pub fn compute_slope_aspect(heights: &HeightGrid) -> (ScalarField, ScalarField) {
    let (rows, cols) = (heights.rows(), heights.cols());
    let mut slope = ScalarField::new(rows, cols, 0.0);
    let mut aspect = ScalarField::new(rows, cols, 0.0);
    let at = |x: i32, y: i32, center: i32| if heights.in_bounds(x, y) { heights.get(x, y) } else { center };

    for y in 0..rows {
        for x in 0..cols {
            let (xi, yi) = (x as i32, y as i32);
            let c = heights.get(xi, yi);
            let dzdx = (at(xi + 1, yi, c) - at(xi - 1, yi, c)) as f32 * 0.5;
            let dzdy = (at(xi, yi + 1, c) - at(xi, yi - 1, c)) as f32 * 0.5;
            slope.set(x, y, dzdx.hypot(dzdy));
            aspect.set(x, y, dzdy.atan2(dzdx));
        }
    }
    (slope, aspect)
}

/// How much a cell's face looks toward row 0 ("north" on the board), in `[-1, 1]`.
/// `aspect` points uphill, so a face whose uphill runs toward +y looks north.
#[inline]
pub fn northness(aspect: f32) -> f32 {
    aspect.sin()
}

// ============================================================================
// MOISTURE
// ============================================================================

/// Multi-source 4-connected BFS from every sub-zero cell; `exp(-λ·d)` per cell.
/// Cells no source reaches (every cell, on a dry grid) get 0.
pub fn compute_moisture_field(heights: &HeightGrid) -> ScalarField {
    let (rows, cols) = (heights.rows(), heights.cols());
    let mut dist: Vec<Option<u32>> = vec![None; rows * cols];
    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();

    for (x, y, h) in heights.iter() {
        if h < 0 {
            dist[y as usize * cols + x as usize] = Some(0);
            queue.push_back((x as usize, y as usize));
        }
    }

    while let Some((x, y)) = queue.pop_front() {
        let Some(d) = dist[y * cols + x] else { continue };
        let neighbors = [
            (x.wrapping_sub(1), y),
            (x + 1, y),
            (x, y.wrapping_sub(1)),
            (x, y + 1),
        ];
        for (nx, ny) in neighbors {
            if nx >= cols || ny >= rows { continue; }
            let slot = &mut dist[ny * cols + nx];
            if slot.is_none() {
                *slot = Some(d + 1);
                queue.push_back((nx, ny));
            }
        }
    }

    let mut moisture = ScalarField::new(rows, cols, 0.0);
    for y in 0..rows {
        for x in 0..cols {
            if let Some(d) = dist[y * cols + x] {
                moisture.set(x, y, (-MOISTURE_DECAY * d as f32).exp().clamp(0.0, 1.0));
            }
        }
    }
    moisture
}

// ============================================================================
// BAND AGGREGATES
// ============================================================================

/// Mean of `field` over band `depth`, optionally filtered. 0 when nothing qualifies.
pub fn band_average(field: &ScalarField, heights: &HeightGrid, depth: i32, predicate: Option<CellPredicate>) -> f32 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for c in band_cells(heights, depth) {
        if let Some(pred) = predicate {
            if !pred(c.x, c.y, heights.get(c.x, c.y)) { continue; }
        }
        sum += field.get(c.x, c.y);
        n += 1;
    }
    if n == 0 { 0.0 } else { sum / n as f32 }
}

/// Slope-weighted vector mean of aspect angles across a band (radians).
/// Returns 0 when the accumulated weight is negligible.
pub fn band_orientation(
    depth: i32,
    heights: &HeightGrid,
    slope: &ScalarField,
    aspect: &ScalarField,
    predicate: Option<CellPredicate>,
    slope_gain: f32,
) -> f32 {
    let mut acc = Vec2::ZERO;
    let mut total = 0.0;
    for c in band_cells(heights, depth) {
        if let Some(pred) = predicate {
            if !pred(c.x, c.y, heights.get(c.x, c.y)) { continue; }
        }
        let w = slope.get(c.x, c.y) * slope_gain.max(0.0);
        let a = aspect.get(c.x, c.y);
        acc += Vec2::new(a.cos(), a.sin()) * w;
        total += w;
    }
    if total < ORIENTATION_EPSILON || acc.length_squared() < ORIENTATION_EPSILON * ORIENTATION_EPSILON {
        return 0.0;
    }
    acc.y.atan2(acc.x)
}

// ============================================================================
// DERIVED FIELDS
// ============================================================================

/// All per-cell fields for one snapshot. Discarded after the pass that built them.
#[derive(Clone, Debug, Default)]
pub struct DerivedFields {
    pub slope: ScalarField,
    pub aspect: ScalarField,
    pub moisture: ScalarField,
}

impl DerivedFields {
    pub fn compute(heights: &HeightGrid) -> Self {
        let (slope, aspect) = compute_slope_aspect(heights);
        let moisture = compute_moisture_field(heights);
        Self { slope, aspect, moisture }
    }

    /// Slope-weighted unit aspect vector at integer cell (x, y).
    #[inline]
    fn weighted_vector(&self, x: i32, y: i32) -> Vec2 {
        let a = self.aspect.get(x, y);
        Vec2::new(a.cos(), a.sin()) * self.slope.get(x, y)
    }

    /// Local slope and aspect vector, bilinearly sampled at a fractional grid position.
    pub fn sample(&self, p: Vec2) -> (f32, Vec2) {
        let max_x = (self.slope.cols() as f32 - 1.0).max(0.0);
        let max_y = (self.slope.rows() as f32 - 1.0).max(0.0);
        let p = Vec2::new(p.x.clamp(0.0, max_x), p.y.clamp(0.0, max_y));
        let (x0, y0) = (p.x.floor() as i32, p.y.floor() as i32);
        let (tx, ty) = (p.x - x0 as f32, p.y - y0 as f32);
        let (x1, y1) = ((x0 + 1).min(max_x as i32), (y0 + 1).min(max_y as i32));

        let lerp_s = |a: f32, b: f32, t: f32| a + (b - a) * t;
        let s = lerp_s(
            lerp_s(self.slope.get(x0, y0), self.slope.get(x1, y0), tx),
            lerp_s(self.slope.get(x0, y1), self.slope.get(x1, y1), tx),
            ty,
        );
        let v = self.weighted_vector(x0, y0).lerp(self.weighted_vector(x1, y0), tx)
            .lerp(self.weighted_vector(x0, y1).lerp(self.weighted_vector(x1, y1), tx), ty);
        (s, v.normalize_or_zero())
    }

    /// Motif direction (grid space, unit length) at a fractional grid position:
    /// band orientation blended with the local aspect, weighted by local slope.
    pub fn sample_direction(&self, p: Vec2, band_angle: f32, slope_gain: f32) -> Vec2 {
        let band = Vec2::new(band_angle.cos(), band_angle.sin());
        let (s, local) = self.sample(p);
        if local == Vec2::ZERO { return band; }
        let w = (s * slope_gain.max(0.0)).clamp(0.0, 1.0);
        let dir = band * (1.0 - w) + local * w;
        let n = dir.normalize_or_zero();
        if n == Vec2::ZERO { band } else { n }
    }
}
