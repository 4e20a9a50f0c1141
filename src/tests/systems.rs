use bevy::ecs::message::Messages;
use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;

use crate::brush::{BrushEngine, BrushTool, StrokeThrottle};
use crate::color::BiomeColorEngine;
use crate::heights::TerrainDataStore;
use crate::messages::*;
use crate::painter::DepthBandPainter;
use crate::projection::{IsoProjection, ProjectionSettings};
use crate::render::BandLayers;
use crate::settings::RichShadingConfig;
use crate::systems::*;
use crate::{HoverState, SelectedBiome, TerrainDirty};

use super::grid;

/// World holding every terrain resource, no plugin (and no settings file) involved.
fn terrain_world(rows: usize, cols: usize) -> World {
    let mut world = World::new();
    world.insert_resource(Time::<()>::default());
    world.insert_resource(Assets::<Image>::default());
    world.insert_resource(TerrainDataStore::new(rows, cols));
    world.insert_resource(IsoProjection::for_board(rows, ProjectionSettings::default()));
    world.insert_resource(RichShadingConfig { seed: Some(9), ..Default::default() });
    world.insert_resource(SelectedBiome("grassland".into()));
    world.insert_resource(BrushEngine::default());
    world.insert_resource(StrokeThrottle::default());
    world.insert_resource(BiomeColorEngine::default());
    world.insert_resource(DepthBandPainter::default());
    world.insert_resource(BandLayers::default());
    world.insert_resource(HoverState::default());
    world.insert_resource(TerrainDirty(false));
    world.init_resource::<Messages<BrushStrokeMsg>>();
    world.init_resource::<Messages<StrokeEndMsg>>();
    world.init_resource::<Messages<EditModeMsg>>();
    world.init_resource::<Messages<ResizeBoardMsg>>();
    world.init_resource::<Messages<PointerMovedMsg>>();
    world
}

fn send<M: Message>(world: &mut World, msg: M) {
    world.resource_mut::<Messages<M>>().write(msg);
}

fn clear<M: Message>(world: &mut World) {
    world.resource_mut::<Messages<M>>().clear();
}

fn cell_pointer(world: &World, x: i32, y: i32) -> Vec2 {
    let h = world.resource::<TerrainDataStore>().working().get(x, y);
    world.resource::<IsoProjection>().face_center(x, y, h)
}

#[test]
fn stroke_raises_the_picked_cell() {
    let mut world = terrain_world(3, 3);
    let p = cell_pointer(&world, 1, 1);
    send(&mut world, BrushStrokeMsg { pointer: p, tool: None });
    world.run_system_once(brush_stroke_system).expect("system runs");

    let store = world.resource::<TerrainDataStore>();
    assert_eq!(store.working().to_rows(), vec![vec![0, 0, 0], vec![0, 1, 0], vec![0, 0, 0]]);
    assert_eq!(store.base().get(1, 1), 0, "base untouched until commit");
    assert!(world.resource::<TerrainDirty>().0);
}

#[test]
fn strokes_in_one_frame_are_throttled_until_the_gesture_ends() {
    let mut world = terrain_world(3, 3);
    let p = cell_pointer(&world, 2, 0);
    send(&mut world, BrushStrokeMsg { pointer: p, tool: Some(BrushTool::Lower) });
    send(&mut world, BrushStrokeMsg { pointer: p, tool: Some(BrushTool::Lower) });
    send(&mut world, StrokeEndMsg);
    world.run_system_once(brush_stroke_system).expect("system runs");
    assert_eq!(world.resource::<TerrainDataStore>().working().get(2, 0), -1);

    clear::<BrushStrokeMsg>(&mut world);
    clear::<StrokeEndMsg>(&mut world);
    let p = cell_pointer(&world, 2, 0);
    send(&mut world, BrushStrokeMsg { pointer: p, tool: Some(BrushTool::Lower) });
    world.run_system_once(brush_stroke_system).expect("system runs");
    assert_eq!(world.resource::<TerrainDataStore>().working().get(2, 0), -2, "reset throttle accepts the next stroke");
}

#[test]
fn edit_mode_commits_and_reloads() {
    let mut world = terrain_world(2, 2);
    world.resource_mut::<TerrainDataStore>().working_mut().set(0, 1, 3);
    send(&mut world, EditModeMsg { editing: false });
    world.run_system_once(edit_mode_system).expect("system runs");
    assert_eq!(world.resource::<TerrainDataStore>().base(), &grid(&[&[0, 0], &[3, 0]]));

    clear::<EditModeMsg>(&mut world);
    world.resource_mut::<TerrainDataStore>().working_mut().set(1, 1, -4);
    send(&mut world, EditModeMsg { editing: true });
    world.run_system_once(edit_mode_system).expect("system runs");
    assert_eq!(world.resource::<TerrainDataStore>().working(), &grid(&[&[0, 0], &[3, 0]]));
    assert!(world.resource::<TerrainDirty>().0);
}

#[test]
fn resize_rebuilds_store_and_projection() {
    let mut world = terrain_world(2, 2);
    world.resource_mut::<TerrainDataStore>().working_mut().set(1, 0, 5);
    send(&mut world, ResizeBoardMsg { rows: 4, cols: 3 });
    world.run_system_once(resize_system).expect("system runs");

    let store = world.resource::<TerrainDataStore>();
    assert_eq!((store.rows(), store.cols()), (4, 3));
    assert_eq!(store.working().get(1, 0), 5);
    let expected = IsoProjection::for_board(4, ProjectionSettings::default());
    assert_eq!(*world.resource::<IsoProjection>(), expected);
}

#[test]
fn hover_tracks_cell_and_footprint() {
    let mut world = terrain_world(4, 4);
    world.resource_mut::<BrushEngine>().set_brush_size(2);
    let p = cell_pointer(&world, 3, 3);
    send(&mut world, PointerMovedMsg { pointer: p });
    world.run_system_once(hover_system).expect("system runs");

    let hover = world.resource::<HoverState>();
    assert_eq!(hover.cell, Some(IVec2::new(3, 3)));
    assert_eq!(hover.footprint, vec![IVec2::new(3, 3)], "size 2 extends +1, clipped at the edge");
}

#[test]
fn repaint_uploads_one_image_per_band() {
    let mut world = terrain_world(3, 4);
    world.resource_mut::<TerrainDirty>().0 = true;
    world.run_system_once(repaint_system).expect("system runs");

    assert!(!world.resource::<TerrainDirty>().0);
    let layers = world.resource::<BandLayers>();
    assert_eq!(layers.len(), 6);
    let images = world.resource::<Assets<Image>>();
    for (depth, layer) in &layers.layers {
        let image = images.get(&layer.image).expect("image stored");
        assert_eq!(image.width(), layer.size.x, "band {depth}");
        assert_eq!(image.height(), layer.size.y);
    }
}

#[test]
fn repaint_reuses_handles_for_unchanged_sizes() {
    let mut world = terrain_world(2, 2);
    world.resource_mut::<TerrainDirty>().0 = true;
    world.run_system_once(repaint_system).expect("system runs");
    let before: Vec<_> = world.resource::<BandLayers>().layers.values().map(|l| l.image.id()).collect();

    world.resource_mut::<TerrainDataStore>().working_mut().set(0, 0, -3);
    world.resource_mut::<TerrainDirty>().0 = true;
    world.run_system_once(repaint_system).expect("system runs");
    let after: Vec<_> = world.resource::<BandLayers>().layers.values().map(|l| l.image.id()).collect();
    assert_eq!(before[1..], after[1..], "bands 1 and 2 keep their size and handle");
}
