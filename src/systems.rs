//! Terrain systems - message-driven editing, hover picking and repaint.
//!
//! Runs chained in `Update`: edit mode -> resize -> strokes -> hover -> repaint -> persist.

use bevy::prelude::*;

use crate::brush::{BrushEngine, StrokeThrottle};
use crate::color::BiomeColorEngine;
use crate::heights::TerrainDataStore;
use crate::messages::*;
use crate::painter::DepthBandPainter;
use crate::picking::pick_topmost_cell;
use crate::projection::IsoProjection;
use crate::render::{BandLayers, ImageBandSink};
use crate::settings::{RichShadingConfig, TerrainSettings, save_settings};
use crate::{HoverState, SelectedBiome, TerrainDirty};

/// Entering edit mode reloads the committed grid; leaving commits the edits.
pub fn edit_mode_system(
    mut events: MessageReader<EditModeMsg>,
    mut store: ResMut<TerrainDataStore>,
    mut dirty: ResMut<TerrainDirty>,
) {
    for event in events.read() {
        if event.editing {
            store.reload();
            dirty.0 = true;
        } else {
            store.commit();
        }
    }
}

pub fn resize_system(
    mut events: MessageReader<ResizeBoardMsg>,
    mut store: ResMut<TerrainDataStore>,
    mut proj: ResMut<IsoProjection>,
    mut hover: ResMut<HoverState>,
    mut dirty: ResMut<TerrainDirty>,
) {
    let Some(event) = events.read().last() else { return };
    if event.rows == store.rows() && event.cols == store.cols() { return; }
    store.resize(event.rows, event.cols);
    *proj = IsoProjection::for_board(event.rows, proj.settings());
    *hover = HoverState::default();
    dirty.0 = true;
}

/// Apply throttled brush strokes at the topmost cell under the pointer.
pub fn brush_stroke_system(
    time: Res<Time>,
    mut strokes: MessageReader<BrushStrokeMsg>,
    mut ends: MessageReader<StrokeEndMsg>,
    mut store: ResMut<TerrainDataStore>,
    brush: Res<BrushEngine>,
    mut throttle: ResMut<StrokeThrottle>,
    proj: Res<IsoProjection>,
    mut dirty: ResMut<TerrainDirty>,
) {
    let now = time.elapsed_secs();
    for stroke in strokes.read() {
        if !throttle.allow(now) { continue; }
        let Some(cell) = pick_topmost_cell(store.working(), &proj, stroke.pointer) else { continue };
        let mut state = brush.state();
        if let Some(tool) = stroke.tool {
            state.tool = tool;
        }
        if BrushEngine::new(state).apply_at(store.working_mut(), cell.x, cell.y) {
            dirty.0 = true;
        }
    }
    if ends.read().count() > 0 {
        throttle.reset();
    }
}

/// Latest pointer sample -> hovered cell + brush footprint preview.
pub fn hover_system(
    mut moves: MessageReader<PointerMovedMsg>,
    store: Res<TerrainDataStore>,
    proj: Res<IsoProjection>,
    brush: Res<BrushEngine>,
    mut hover: ResMut<HoverState>,
) {
    let Some(event) = moves.read().last() else { return };
    let cell = pick_topmost_cell(store.working(), &proj, event.pointer);
    if cell == hover.cell && !brush.is_changed() { return; }
    hover.footprint = cell.map(|c| brush.footprint_cells(store.working(), c.x, c.y)).unwrap_or_default();
    hover.cell = cell;
}

/// Full repaint from a working-grid snapshot whenever terrain, biome or shading changed.
pub fn repaint_system(
    mut dirty: ResMut<TerrainDirty>,
    store: Res<TerrainDataStore>,
    selected: Res<SelectedBiome>,
    cfg: Res<RichShadingConfig>,
    proj: Res<IsoProjection>,
    mut colors: ResMut<BiomeColorEngine>,
    mut painter: ResMut<DepthBandPainter>,
    mut images: ResMut<Assets<Image>>,
    mut layers: ResMut<BandLayers>,
) {
    if !(dirty.0 || selected.is_changed() || cfg.is_changed() || proj.is_changed()) { return; }
    dirty.0 = false;

    let snapshot = store.snapshot();
    let mut sink = ImageBandSink { images: &mut *images, layers: &mut *layers };
    let report = painter.paint_pass(&snapshot, &selected.0, &mut colors, &cfg, &proj, &mut sink);
    if !report.failed.is_empty() {
        warn!("Repaint left {} bands stale: {:?}", report.failed.len(), report.failed);
    }
}

/// Save shading, tile metrics and biome after the host changes any of them.
pub fn persist_settings_system(
    selected: Res<SelectedBiome>,
    cfg: Res<RichShadingConfig>,
    proj: Res<IsoProjection>,
) {
    let changed = |added: bool, changed: bool| changed && !added;
    if !(changed(cfg.is_added(), cfg.is_changed())
        || changed(selected.is_added(), selected.is_changed())
        || changed(proj.is_added(), proj.is_changed()))
    {
        return;
    }
    save_settings(&TerrainSettings {
        shading: cfg.clone(),
        projection: proj.settings(),
        biome: Some(selected.0.clone()),
    });
}
