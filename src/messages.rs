//! ECS Messages - input layer -> terrain engine.
//!
//! Pointer positions are board-local pixels, already translated by the host.

use bevy::prelude::*;

use crate::brush::BrushTool;

// ============================================================================
// EDITING
// ============================================================================

/// Pointer down or drag sample during a brush gesture.
#[derive(Message, Clone, Debug)]
pub struct BrushStrokeMsg {
    pub pointer: Vec2,
    /// Overrides the engine's current tool for this stroke (e.g. right-drag lowers).
    pub tool: Option<BrushTool>,
}

/// Pointer up: the gesture is over and the next stroke is never throttled.
#[derive(Message, Clone, Debug)]
pub struct StrokeEndMsg;

/// Enter (reload base -> working) or leave (commit working -> base) edit mode.
#[derive(Message, Clone, Debug)]
pub struct EditModeMsg {
    pub editing: bool,
}

#[derive(Message, Clone, Debug)]
pub struct ResizeBoardMsg {
    pub rows: usize,
    pub cols: usize,
}

/// Hover sample for picking and footprint preview.
#[derive(Message, Clone, Debug)]
pub struct PointerMovedMsg {
    pub pointer: Vec2,
}
