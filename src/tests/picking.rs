use bevy::prelude::*;

use crate::heights::HeightGrid;
use crate::picking::{pick_topmost_cell, search_radius};
use crate::projection::{IsoProjection, ProjectionSettings};

use super::{flat, grid};

fn proj_for(g: &HeightGrid) -> IsoProjection {
    IsoProjection::for_board(g.rows(), ProjectionSettings::default())
}

#[test]
fn flat_grid_matches_inverse_projection() {
    let g = flat(5, 7, 0);
    let proj = proj_for(&g);
    for y in 0..5 {
        for x in 0..7 {
            let c = proj.cell_center(x as f32, y as f32);
            for off in [Vec2::ZERO, Vec2::new(10.0, 3.0), Vec2::new(-20.0, -4.0), Vec2::new(2.0, 11.0)] {
                let p = c + off;
                let g_pos = proj.screen_to_grid(p);
                let rounded = IVec2::new(g_pos.x.round() as i32, g_pos.y.round() as i32);
                assert_eq!(pick_topmost_cell(&g, &proj, p), Some(IVec2::new(x, y)), "offset {off:?}");
                assert_eq!(rounded, IVec2::new(x, y));
            }
        }
    }
}

#[test]
fn off_grid_pointer_picks_nothing() {
    let g = flat(3, 3, 0);
    let proj = proj_for(&g);
    assert_eq!(pick_topmost_cell(&g, &proj, proj.cell_center(-2.0, 0.0)), None);
    assert_eq!(pick_topmost_cell(&g, &proj, proj.cell_center(1.0, 5.0)), None);
    assert_eq!(pick_topmost_cell(&g, &proj, Vec2::new(f32::NAN, 0.0)), None);
    assert_eq!(pick_topmost_cell(&HeightGrid::new(0, 0), &proj, Vec2::ZERO), None);
}

#[test]
fn tall_cell_wins_in_its_shifted_overlap() {
    // (1,1) at height 4 is drawn over (0,0)'s unshifted face
    let g = grid(&[&[0, 0, 0], &[0, 4, 0], &[0, 0, 0]]);
    let proj = proj_for(&g);
    let p = proj.cell_center(0.0, 0.0) + Vec2::new(3.0, 2.0);
    let naive = proj.screen_to_grid(p).round();
    assert_eq!(naive, Vec2::new(0.0, 0.0), "geometrically nearest is the flat cell");
    assert_eq!(pick_topmost_cell(&g, &proj, p), Some(IVec2::new(1, 1)));
}

#[test]
fn flat_front_cell_covers_a_sunken_back_cell() {
    // (0,0) sunk 2 levels slides 16px down, under the flat face of (1,1)
    let g = grid(&[&[-2, 0], &[0, 0]]);
    let proj = proj_for(&g);
    let c = proj.cell_center(0.0, 0.0);
    let shared = c + Vec2::new(0.0, 24.0);
    assert!(proj.diamond_contains(proj.face_center(0, 0, -2), shared));
    assert_eq!(pick_topmost_cell(&g, &proj, shared), Some(IVec2::new(1, 1)));

    let only_sunken = c + Vec2::new(0.0, 12.0);
    assert_eq!(pick_topmost_cell(&g, &proj, only_sunken), Some(IVec2::new(0, 0)));
}

#[test]
fn picking_reaches_extreme_elevations() {
    let mut g = HeightGrid::new(12, 12);
    g.set(8, 8, 10);
    let proj = proj_for(&g);
    let p = proj.face_center(8, 8, 10);
    assert_eq!(pick_topmost_cell(&g, &proj, p), Some(IVec2::new(8, 8)));

    g.set(8, 8, -1);
    let p = proj.face_center(8, 8, -1);
    assert_eq!(pick_topmost_cell(&g, &proj, p), Some(IVec2::new(8, 8)));
}

#[test]
fn search_radius_covers_the_tallest_shift() {
    let proj = IsoProjection::default();
    // 10 levels * 8px over a 16px half tile
    assert_eq!(search_radius(&proj), 6);
    let flat_proj = IsoProjection::new(ProjectionSettings { pixels_per_level: 0.0, ..Default::default() }, Vec2::ZERO);
    assert_eq!(search_radius(&flat_proj), 1);
}

#[test]
fn far_away_pointers_pick_nothing() {
    let g = grid(&[&[0, 9], &[-9, 0]]);
    let proj = proj_for(&g);
    for p in [
        Vec2::new(1e12, 1e12),
        Vec2::new(-1e12, -1e12),
        Vec2::new(1e12, -1e12),
        Vec2::new(f32::MAX, 0.0),
        Vec2::new(0.0, f32::MIN),
    ] {
        assert_eq!(pick_topmost_cell(&g, &proj, p), None, "{p:?}");
    }
}
