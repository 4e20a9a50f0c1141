use bevy::prelude::*;

use crate::brush::{BrushEngine, BrushState, BrushTool, StrokeThrottle, footprint_radii};
use crate::constants::{MAX_BRUSH_SIZE, MAX_HEIGHT, MIN_BRUSH_SIZE, MIN_HEIGHT};
use crate::heights::HeightGrid;

use super::{flat, grid};

fn engine(tool: BrushTool, size: i32) -> BrushEngine {
    BrushEngine::new(BrushState { tool, size, height_step: 1 })
}

#[test]
fn raise_center_of_flat_3x3() {
    let mut g = HeightGrid::new(3, 3);
    let changed = engine(BrushTool::Raise, 1).apply_at(&mut g, 1, 1);
    assert!(changed);
    assert_eq!(g, grid(&[&[0, 0, 0], &[0, 1, 0], &[0, 0, 0]]));
}

#[test]
fn size_four_footprint_is_asymmetric() {
    let g = HeightGrid::new(10, 10);
    let cells = engine(BrushTool::Raise, 4).footprint_cells(&g, 2, 2);
    assert_eq!(cells.len(), 16);
    assert!(cells.iter().all(|c| (1..=4).contains(&c.x) && (1..=4).contains(&c.y)));
    assert_eq!(cells.first(), Some(&IVec2::new(1, 1)));
    assert_eq!(cells.last(), Some(&IVec2::new(4, 4)));
}

#[test]
fn footprint_matches_radii_for_every_size() {
    let g = HeightGrid::new(7, 9);
    let centers = [(0, 0), (4, 3), (8, 6), (-1, 2), (10, 10)];
    for size in MIN_BRUSH_SIZE..=MAX_BRUSH_SIZE {
        let (neg, pos) = footprint_radii(size);
        assert_eq!(neg + pos + 1, size);
        let brush = engine(BrushTool::Raise, size);
        for (cx, cy) in centers {
            let mut expected = Vec::new();
            for y in (cy - neg)..=(cy + pos) {
                for x in (cx - neg)..=(cx + pos) {
                    if g.in_bounds(x, y) {
                        expected.push(IVec2::new(x, y));
                    }
                }
            }
            assert_eq!(brush.footprint_cells(&g, cx, cy), expected, "size {size} at ({cx},{cy})");
        }
    }
}

#[test]
fn raise_at_max_and_lower_at_min_are_no_ops() {
    let mut high = flat(3, 3, MAX_HEIGHT);
    assert!(!engine(BrushTool::Raise, 3).apply_at(&mut high, 1, 1));
    assert_eq!(high, flat(3, 3, MAX_HEIGHT));

    let mut low = flat(3, 3, MIN_HEIGHT);
    assert!(!engine(BrushTool::Lower, 2).apply_at(&mut low, 0, 0));
    assert_eq!(low, flat(3, 3, MIN_HEIGHT));
}

#[test]
fn repeated_raises_clamp_at_max() {
    let mut g = HeightGrid::new(1, 1);
    let brush = engine(BrushTool::Raise, 1);
    for _ in 0..(MAX_HEIGHT * 3) {
        brush.apply_at(&mut g, 0, 0);
        assert!(g.get(0, 0) <= MAX_HEIGHT);
    }
    assert_eq!(g.get(0, 0), MAX_HEIGHT);
}

#[test]
fn stroke_off_grid_changes_nothing() {
    let mut g = HeightGrid::new(4, 4);
    assert!(!engine(BrushTool::Raise, 2).apply_at(&mut g, -5, -5));
    assert_eq!(g, HeightGrid::new(4, 4));
}

#[test]
fn partially_clipped_stroke_changes_only_in_bounds_cells() {
    let mut g = HeightGrid::new(3, 3);
    assert!(engine(BrushTool::Lower, 3).apply_at(&mut g, 0, 0));
    assert_eq!(g, grid(&[&[-1, -1, 0], &[-1, -1, 0], &[0, 0, 0]]));
}

#[test]
fn brush_size_clamps() {
    let mut b = engine(BrushTool::Raise, 99);
    assert_eq!(b.size(), MAX_BRUSH_SIZE);
    b.increase_brush();
    assert_eq!(b.size(), MAX_BRUSH_SIZE);
    b.set_brush_size(2);
    b.decrease_brush();
    b.decrease_brush();
    assert_eq!(b.size(), MIN_BRUSH_SIZE);
    b.set_tool(BrushTool::Lower);
    assert_eq!(b.tool(), BrushTool::Lower);
}

#[test]
fn height_step_scales_edits() {
    let mut b = engine(BrushTool::Raise, 1);
    b.set_height_step(4);
    let mut g = HeightGrid::new(1, 1);
    b.apply_at(&mut g, 0, 0);
    assert_eq!(g.get(0, 0), 4);
}

#[test]
fn throttle_limits_strokes_within_a_gesture() {
    let mut t = StrokeThrottle::default();
    assert_eq!(t.min_interval, 0.05);
    assert!(t.allow(1.0));
    assert!(!t.allow(1.01));
    assert!(!t.allow(1.049));
    assert!(t.allow(1.06));
    t.reset();
    assert!(t.allow(1.061), "a new gesture is never throttled");
}
