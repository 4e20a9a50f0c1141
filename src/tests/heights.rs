use crate::constants::{MAX_HEIGHT, MIN_HEIGHT};
use crate::heights::{HeightGrid, TerrainDataStore, clamp_height};

use super::grid;

#[test]
fn clamp_height_stays_in_range_and_is_idempotent() {
    for h in -1000..=1000 {
        let c = clamp_height(h);
        assert!((MIN_HEIGHT..=MAX_HEIGHT).contains(&c), "{h} -> {c}");
        assert_eq!(clamp_height(c), c);
    }
    assert_eq!(clamp_height(i32::MAX), MAX_HEIGHT);
    assert_eq!(clamp_height(i32::MIN), MIN_HEIGHT);
}

#[test]
fn out_of_bounds_reads_default_and_writes_are_ignored() {
    let mut g = HeightGrid::new(2, 3);
    assert_eq!(g.get(-1, 0), 0);
    assert_eq!(g.get(3, 0), 0);
    assert_eq!(g.get(0, 2), 0);
    assert!(!g.set(5, 5, 4));
    assert!(!g.set(-1, 0, 4));
    assert_eq!(g.as_slice(), &[0; 6]);
}

#[test]
fn set_clamps_and_reports_change() {
    let mut g = HeightGrid::new(1, 1);
    assert!(g.set(0, 0, 99));
    assert_eq!(g.get(0, 0), MAX_HEIGHT);
    assert!(!g.set(0, 0, MAX_HEIGHT + 1), "already at the clamp");
    assert!(g.set(0, 0, -99));
    assert_eq!(g.get(0, 0), MIN_HEIGHT);
}

#[test]
fn from_rows_pads_and_clamps() {
    let g = HeightGrid::from_rows(&[vec![1, 2, 3], vec![40]]);
    assert_eq!((g.rows(), g.cols()), (2, 3));
    assert_eq!(g.to_rows(), vec![vec![1, 2, 3], vec![MAX_HEIGHT, 0, 0]]);
    assert_eq!(g.height_range(), (0, MAX_HEIGHT));
}

#[test]
fn max_depth_spans_both_axes() {
    assert_eq!(HeightGrid::new(3, 5).max_depth(), Some(6));
    assert_eq!(HeightGrid::new(1, 1).max_depth(), Some(0));
    assert_eq!(HeightGrid::new(0, 4).max_depth(), None);
}

#[test]
fn commit_then_reload_round_trips() {
    let mut store = TerrainDataStore::new(3, 4);
    store.working_mut().set(1, 2, 5);
    store.working_mut().set(3, 0, -7);
    store.commit();
    assert_eq!(store.base(), store.working());

    store.working_mut().set(0, 0, 9);
    assert_ne!(store.base(), store.working());
    store.reload();
    assert_eq!(store.working(), store.base());
    assert_eq!(store.working().get(1, 2), 5);
    assert_eq!(store.working().get(0, 0), 0);
}

#[test]
fn resize_preserves_overlap() {
    let mut store = TerrainDataStore::new(3, 3);
    for (x, y, h) in [(0, 0, 1), (1, 0, 2), (2, 2, 3), (0, 2, -4), (2, 0, 6)] {
        store.working_mut().set(x, y, h);
    }
    store.commit();
    let before = store.working().clone();

    store.resize(2, 5);
    assert_eq!((store.rows(), store.cols()), (2, 5));
    for y in 0..2 {
        for x in 0..3 {
            assert_eq!(store.working().get(x, y), before.get(x, y), "working ({x},{y})");
            assert_eq!(store.base().get(x, y), before.get(x, y), "base ({x},{y})");
        }
    }
    assert_eq!(store.working().get(4, 1), 0, "new cells start flat");

    store.resize(4, 1);
    assert_eq!(store.working().to_rows(), vec![vec![1], vec![0], vec![0], vec![0]]);
}

#[test]
fn snapshot_is_independent_of_later_edits() {
    let mut store = TerrainDataStore::new(2, 2);
    let snap = store.snapshot();
    store.working_mut().set(0, 0, 3);
    assert_eq!(snap, grid(&[&[0, 0], &[0, 0]]));
}
