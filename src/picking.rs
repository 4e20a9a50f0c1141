//! Elevation-aware picking - pointer (board pixels) -> topmost grid cell
//!
//! A raised face is drawn higher on screen, so the cell under the pointer is
//! not always the one plain inverse projection lands on. Candidates around the
//! rounded position are tested against their elevation-shifted diamonds and
//! the one drawn last wins.

use bevy::prelude::*;

use crate::constants::{MAX_HEIGHT, MIN_HEIGHT};
use crate::heights::HeightGrid;
use crate::projection::IsoProjection;

/// Ring radius needed to reach any cell whose face could be shifted over the
/// pointer. Never less than 1 (the 3x3 neighborhood).
pub fn search_radius(proj: &IsoProjection) -> i32 {
    let max_shift = proj.elevation_offset(MAX_HEIGHT.max(-MIN_HEIGHT)).abs();
    1 + (max_shift / proj.half_height()).ceil() as i32
}

/// Draw order key: later bands draw over earlier ones; within a band, larger x last.
#[inline]
fn draw_key(c: IVec2) -> (i32, i32) {
    (c.x + c.y, c.x)
}

/// Topmost cell whose elevation-shifted face contains `pointer`, or `None` off-grid.
pub fn pick_topmost_cell(heights: &HeightGrid, proj: &IsoProjection, pointer: Vec2) -> Option<IVec2> {
    if heights.is_empty() || !pointer.is_finite() { return None; }
    let g = proj.screen_to_grid(pointer);
    let radius = search_radius(proj);
    // No candidate ring can reach the grid; also keeps the i32 math below in range.
    let reach = radius as f32 + 1.0;
    if !g.is_finite()
        || g.x < -reach
        || g.y < -reach
        || g.x > heights.cols() as f32 + reach
        || g.y > heights.rows() as f32 + reach
    {
        return None;
    }
    let center = IVec2::new(g.x.round() as i32, g.y.round() as i32);

    let mut best: Option<IVec2> = None;
    for ring in 0..=radius {
        for dy in -ring..=ring {
            for dx in -ring..=ring {
                if dx.abs().max(dy.abs()) != ring { continue; }
                let c = center + IVec2::new(dx, dy);
                if !heights.in_bounds(c.x, c.y) { continue; }
                let face = proj.face_center(c.x, c.y, heights.get(c.x, c.y));
                if !proj.diamond_contains(face, pointer) { continue; }
                if best.is_none_or(|b| draw_key(c) > draw_key(b)) {
                    best = Some(c);
                }
            }
        }
    }
    best
}
