//! Isometric projection - grid <-> board-local pixel space, elevation offsets
//!
//! Screen y grows downward. Cell (x, y) has its face center at
//! `origin + ((x - y) * tw/2, (x + y) * th/2)`; elevation lifts the face by
//! `height * pixels_per_level`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PIXELS_PER_LEVEL, DEFAULT_TILE_HEIGHT, DEFAULT_TILE_WIDTH, MAX_HEIGHT};
use crate::heights::HeightGrid;

/// Host-provided tile metrics. Persisted alongside the shading settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionSettings {
    pub tile_width: f32,
    pub tile_height: f32,
    pub pixels_per_level: f32,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            tile_width: DEFAULT_TILE_WIDTH,
            tile_height: DEFAULT_TILE_HEIGHT,
            pixels_per_level: DEFAULT_PIXELS_PER_LEVEL,
        }
    }
}

/// Integer pixel rectangle `[min, max)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub min: IVec2,
    pub max: IVec2,
}

impl PixelRect {
    pub fn width(&self) -> u32 { (self.max.x - self.min.x).max(0) as u32 }
    pub fn height(&self) -> u32 { (self.max.y - self.min.y).max(0) as u32 }
    pub fn is_empty(&self) -> bool { self.width() == 0 || self.height() == 0 }

    pub fn union(self, other: PixelRect) -> PixelRect {
        PixelRect { min: self.min.min(other.min), max: self.max.max(other.max) }
    }
}

#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct IsoProjection {
    pub tile_width: f32,
    pub tile_height: f32,
    pub pixels_per_level: f32,
    /// Board-local pixel position of cell (0, 0)'s unshifted face center.
    pub origin: Vec2,
}

impl Default for IsoProjection {
    fn default() -> Self {
        Self::new(ProjectionSettings::default(), Vec2::ZERO)
    }
}

impl IsoProjection {
    pub fn new(settings: ProjectionSettings, origin: Vec2) -> Self {
        Self {
            tile_width: settings.tile_width.max(1.0),
            tile_height: settings.tile_height.max(1.0),
            pixels_per_level: settings.pixels_per_level.max(0.0),
            origin,
        }
    }

    /// Origin chosen so the whole board, at any elevation, lands in positive pixel space.
    /// Only the row count matters: cell (0, rows-1) is the leftmost face.
    pub fn for_board(rows: usize, settings: ProjectionSettings) -> Self {
        let mut proj = Self::new(settings, Vec2::ZERO);
        proj.origin = Vec2::new(
            rows.max(1) as f32 * proj.half_width(),
            proj.half_height() + proj.elevation_offset(MAX_HEIGHT),
        );
        proj
    }

    pub fn settings(&self) -> ProjectionSettings {
        ProjectionSettings {
            tile_width: self.tile_width,
            tile_height: self.tile_height,
            pixels_per_level: self.pixels_per_level,
        }
    }

    #[inline] pub fn half_width(&self) -> f32 { self.tile_width * 0.5 }
    #[inline] pub fn half_height(&self) -> f32 { self.tile_height * 0.5 }

    /// Upward pixel shift for a height. Monotonic in `height`.
    #[inline]
    pub fn elevation_offset(&self, height: i32) -> f32 {
        height as f32 * self.pixels_per_level
    }

    /// Unshifted face center of a cell (fractional coordinates allowed).
    #[inline]
    pub fn cell_center(&self, gx: f32, gy: f32) -> Vec2 {
        self.origin + Vec2::new((gx - gy) * self.half_width(), (gx + gy) * self.half_height())
    }

    /// Face center after lifting by the cell's elevation.
    #[inline]
    pub fn face_center(&self, x: i32, y: i32, height: i32) -> Vec2 {
        self.cell_center(x as f32, y as f32) - Vec2::new(0.0, self.elevation_offset(height))
    }

    /// Inverse projection to fractional grid coordinates, ignoring elevation.
    /// Integer results are face centers.
    pub fn screen_to_grid(&self, p: Vec2) -> Vec2 {
        let local = p - self.origin;
        let u = local.x / self.half_width();
        let v = local.y / self.half_height();
        Vec2::new((u + v) * 0.5, (v - u) * 0.5)
    }

    /// Same as `screen_to_grid` for a face lifted by `height` levels.
    pub fn screen_to_grid_at(&self, p: Vec2, height: i32) -> Vec2 {
        self.screen_to_grid(p + Vec2::new(0.0, self.elevation_offset(height)))
    }

    /// Grid-space direction -> screen-space direction (not normalized).
    #[inline]
    pub fn grid_dir_to_screen(&self, d: Vec2) -> Vec2 {
        Vec2::new((d.x - d.y) * self.half_width(), (d.x + d.y) * self.half_height())
    }

    /// Point-in-diamond for a face centered at `center`. Edges count as inside.
    #[inline]
    pub fn diamond_contains(&self, center: Vec2, p: Vec2) -> bool {
        let d = p - center;
        d.x.abs() / self.half_width() + d.y.abs() / self.half_height() <= 1.0
    }

    /// Pixel bounds of one face at its elevation-shifted position.
    pub fn face_bounds(&self, x: i32, y: i32, height: i32) -> PixelRect {
        let c = self.face_center(x, y, height);
        PixelRect {
            min: IVec2::new((c.x - self.half_width()).floor() as i32, (c.y - self.half_height()).floor() as i32),
            max: IVec2::new((c.x + self.half_width()).ceil() as i32, (c.y + self.half_height()).ceil() as i32),
        }
    }

    /// Minimal bounding box of every face in depth band `depth`, or `None` if the
    /// band has no cells in this grid.
    pub fn band_bounds(&self, grid: &HeightGrid, depth: i32) -> Option<PixelRect> {
        band_cells(grid, depth)
            .map(|c| self.face_bounds(c.x, c.y, grid.get(c.x, c.y)))
            .reduce(PixelRect::union)
    }
}

/// Cells with `x + y == depth`, ordered by increasing x.
pub fn band_cells(grid: &HeightGrid, depth: i32) -> impl Iterator<Item = IVec2> + '_ {
    let cols = grid.cols() as i32;
    let rows = grid.rows() as i32;
    let x0 = (depth - (rows - 1)).max(0);
    let x1 = depth.min(cols - 1);
    (x0..=x1).filter(move |_| depth >= 0).map(move |x| IVec2::new(x, depth - x))
}
