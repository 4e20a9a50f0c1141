//! Brush Engine - Raise/lower footprint edits on the working height grid
//!
//! Footprints are square. Even sizes are asymmetric: a size-4 brush spans
//! `[-1, +2]` around the center on each axis.

use bevy::prelude::*;

use crate::constants::{DEFAULT_HEIGHT_STEP, MAX_BRUSH_SIZE, MIN_BRUSH_SIZE, STROKE_MIN_INTERVAL_SECS};
use crate::heights::HeightGrid;

/// Edit direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BrushTool {
    #[default]
    Raise,
    Lower,
}

impl BrushTool {
    fn sign(self) -> i32 {
        match self {
            BrushTool::Raise => 1,
            BrushTool::Lower => -1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BrushState {
    pub tool: BrushTool,
    /// Always within `[MIN_BRUSH_SIZE, MAX_BRUSH_SIZE]`.
    pub size: i32,
    pub height_step: i32,
}

impl Default for BrushState {
    fn default() -> Self {
        Self { tool: BrushTool::Raise, size: MIN_BRUSH_SIZE, height_step: DEFAULT_HEIGHT_STEP }
    }
}

/// `(negative_radius, positive_radius)` for a brush size.
/// `neg = floor((size-1)/2)`, `pos = size - neg - 1`.
#[inline]
pub fn footprint_radii(size: i32) -> (i32, i32) {
    let size = size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
    let neg = (size - 1) / 2;
    (neg, size - neg - 1)
}

/// Clamped, inclusive `(x0, x1, y0, y1)` of a footprint, or `None` if it misses the grid.
fn footprint_bounds(grid: &HeightGrid, size: i32, cx: i32, cy: i32) -> Option<(i32, i32, i32, i32)> {
    let (neg, pos) = footprint_radii(size);
    let x0 = (cx - neg).max(0);
    let y0 = (cy - neg).max(0);
    let x1 = (cx + pos).min(grid.cols() as i32 - 1);
    let y1 = (cy + pos).min(grid.rows() as i32 - 1);
    (x0 <= x1 && y0 <= y1).then_some((x0, x1, y0, y1))
}

// ============================================================================
// BRUSH ENGINE
// ============================================================================

#[derive(Resource, Clone, Debug, Default)]
pub struct BrushEngine {
    state: BrushState,
}

impl BrushEngine {
    pub fn new(state: BrushState) -> Self {
        let mut engine = Self { state };
        engine.set_brush_size(state.size);
        engine
    }

    pub fn state(&self) -> BrushState { self.state }
    pub fn tool(&self) -> BrushTool { self.state.tool }
    pub fn size(&self) -> i32 { self.state.size }

    pub fn set_tool(&mut self, tool: BrushTool) {
        self.state.tool = tool;
    }

    /// Out-of-range sizes clamp silently.
    pub fn set_brush_size(&mut self, size: i32) {
        self.state.size = size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
    }

    pub fn increase_brush(&mut self) {
        self.set_brush_size(self.state.size.saturating_add(1));
    }

    pub fn decrease_brush(&mut self) {
        self.set_brush_size(self.state.size.saturating_sub(1));
    }

    pub fn set_height_step(&mut self, step: i32) {
        self.state.height_step = step.max(0);
    }

    /// Cells the brush would touch at (x, y), in row order. Pure; used for hover preview.
    pub fn footprint_cells(&self, grid: &HeightGrid, x: i32, y: i32) -> Vec<IVec2> {
        let Some((x0, x1, y0, y1)) = footprint_bounds(grid, self.state.size, x, y) else {
            return Vec::new();
        };
        let mut cells = Vec::with_capacity(((x1 - x0 + 1) * (y1 - y0 + 1)) as usize);
        for cy in y0..=y1 {
            for cx in x0..=x1 {
                cells.push(IVec2::new(cx, cy));
            }
        }
        cells
    }

    /// Raise or lower every in-bounds footprint cell by `height_step`, clamped.
    /// Returns true if any cell changed.
    pub fn apply_at(&self, grid: &mut HeightGrid, cx: i32, cy: i32) -> bool {
        let delta = self.state.tool.sign() * self.state.height_step;
        let mut changed = 0usize;
        for cell in self.footprint_cells(grid, cx, cy) {
            let current = grid.get(cell.x, cell.y);
            if grid.set(cell.x, cell.y, current.saturating_add(delta)) {
                changed += 1;
            }
        }
        if changed > 0 {
            debug!("brush: {:?} size {} at ({}, {}) changed {} cells",
                self.state.tool, self.state.size, cx, cy, changed);
        }
        changed > 0
    }
}

// ============================================================================
// STROKE THROTTLE
// ============================================================================

/// Rate limit for strokes during one drag gesture.
#[derive(Resource, Clone, Debug)]
pub struct StrokeThrottle {
    pub min_interval: f32,
    last: Option<f32>,
}

impl Default for StrokeThrottle {
    fn default() -> Self {
        Self { min_interval: STROKE_MIN_INTERVAL_SECS, last: None }
    }
}

impl StrokeThrottle {
    /// True if a stroke at time `now` (seconds) may be applied. Records it when accepted.
    pub fn allow(&mut self, now: f32) -> bool {
        match self.last {
            Some(last) if now - last < self.min_interval && now >= last => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// End of gesture: the next stroke is accepted immediately.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
