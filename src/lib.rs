//! Isoterrain - isometric terrain elevation editing and painterly biome rendering.
//!
//! Core (no ECS needed): `heights`, `brush`, `fields`, `color`, `painter`, `picking`.
//! `TerrainPlugin` wires them into a Bevy app behind messages and resources.

// ============================================================================
// MODULES
// ============================================================================

pub mod brush;
pub mod color;
pub mod constants;
pub mod fields;
pub mod heights;
pub mod messages;
pub mod painter;
pub mod picking;
pub mod projection;
pub mod render;
pub mod rng;
pub mod settings;
pub mod systems;

#[cfg(test)]
mod tests;

// ============================================================================
// IMPORTS
// ============================================================================

use bevy::prelude::*;

use brush::{BrushEngine, StrokeThrottle};
use color::BiomeColorEngine;
use heights::TerrainDataStore;
use messages::*;
use painter::DepthBandPainter;
use projection::IsoProjection;
use render::BandLayers;
use settings::load_settings;
use systems::*;

pub use color::palette::GENERIC_BIOME;
pub use painter::{BandSurface, BandSurfaceSink, PaintReport, SurfaceError};
pub use picking::pick_topmost_cell;

// ============================================================================
// RESOURCES
// ============================================================================

/// Biome key used for every paint pass. Unknown keys render as `generic`.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct SelectedBiome(pub String);

impl Default for SelectedBiome {
    fn default() -> Self { Self(GENERIC_BIOME.to_string()) }
}

/// Set by anything that invalidates the painted bands; cleared by the repaint.
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct TerrainDirty(pub bool);

/// Cell under the pointer and the brush footprint around it.
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub struct HoverState {
    pub cell: Option<IVec2>,
    pub footprint: Vec<IVec2>,
}

// ============================================================================
// PLUGIN
// ============================================================================

/// System execution phases. Chained so each phase sees the previous one's writes.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerrainStep {
    Edit,   // Edit mode, resize
    Stroke, // Brush strokes
    Hover,  // Picking + footprint preview
    Paint,  // Band repaint, settings persistence
}

/// Terrain engine for one board.
pub struct TerrainPlugin {
    pub rows: usize,
    pub cols: usize,
}

impl Default for TerrainPlugin {
    fn default() -> Self { Self { rows: 16, cols: 16 } }
}

impl Plugin for TerrainPlugin {
    fn build(&self, app: &mut App) {
        let saved = load_settings();
        let biome = saved.biome.clone().map(SelectedBiome).unwrap_or_default();
        info!("Terrain plugin: {}x{} board, biome '{}'", self.rows, self.cols, biome.0);

        app.add_message::<BrushStrokeMsg>()
            .add_message::<StrokeEndMsg>()
            .add_message::<EditModeMsg>()
            .add_message::<ResizeBoardMsg>()
            .add_message::<PointerMovedMsg>()
            .init_resource::<Time>()
            .init_resource::<Assets<Image>>()
            .insert_resource(TerrainDataStore::new(self.rows, self.cols))
            .insert_resource(IsoProjection::for_board(self.rows, saved.projection))
            .insert_resource(saved.shading)
            .insert_resource(biome)
            .init_resource::<BrushEngine>()
            .init_resource::<StrokeThrottle>()
            .init_resource::<BiomeColorEngine>()
            .init_resource::<DepthBandPainter>()
            .init_resource::<BandLayers>()
            .init_resource::<HoverState>()
            .insert_resource(TerrainDirty(true))
            .configure_sets(Update, (TerrainStep::Edit, TerrainStep::Stroke, TerrainStep::Hover, TerrainStep::Paint).chain())
            .add_systems(Update, (edit_mode_system, resize_system).chain().in_set(TerrainStep::Edit))
            .add_systems(Update, brush_stroke_system.in_set(TerrainStep::Stroke))
            .add_systems(Update, hover_system.in_set(TerrainStep::Hover))
            .add_systems(Update, (repaint_system, persist_settings_system).chain().in_set(TerrainStep::Paint));
    }
}
