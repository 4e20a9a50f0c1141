//! Constants - Tuning parameters for the terrain engine

// ============================================================================
// HEIGHT MODEL
// ============================================================================

/// Lowest elevation a cell can hold. Negative heights read as water/depression.
pub const MIN_HEIGHT: i32 = -10;

/// Highest elevation a cell can hold.
pub const MAX_HEIGHT: i32 = 10;

/// Height returned for any coordinate outside the grid.
pub const DEFAULT_HEIGHT: i32 = 0;

/// Number of distinct integer heights (one gradient entry each).
pub const HEIGHT_LEVELS: usize = (MAX_HEIGHT - MIN_HEIGHT + 1) as usize;

// ============================================================================
// BRUSH
// ============================================================================

pub const MIN_BRUSH_SIZE: i32 = 1;
pub const MAX_BRUSH_SIZE: i32 = 8;
pub const DEFAULT_HEIGHT_STEP: i32 = 1;

/// Minimum seconds between two accepted strokes of one drag gesture.
pub const STROKE_MIN_INTERVAL_SECS: f32 = 0.05;

// ============================================================================
// PROJECTION
// ============================================================================

pub const DEFAULT_TILE_WIDTH: f32 = 64.0;
pub const DEFAULT_TILE_HEIGHT: f32 = 32.0;

/// Screen pixels a face rises per height level.
pub const DEFAULT_PIXELS_PER_LEVEL: f32 = 8.0;

// ============================================================================
// DERIVED FIELDS
// ============================================================================

/// Decay rate of moisture per BFS step away from the nearest sub-zero cell.
pub const MOISTURE_DECAY: f32 = 0.35;

/// Total slope weight below which a band has no preferred orientation.
pub const ORIENTATION_EPSILON: f32 = 1e-4;

// ============================================================================
// COLOR
// ============================================================================

/// Heights within this distance of 0 count as shoreline.
pub const SHORE_BAND: i32 = 1;

/// Sand weight kept at h == 0 regardless of wetness or slope (scaled by sand strength).
pub const SHORE_MIN_SAND: f32 = 0.22;

/// Amplitudes of the painterly noise perturbation in LCh.
pub const NOISE_LIGHTNESS_AMP: f32 = 0.035;
pub const NOISE_CHROMA_AMP: f32 = 0.09;
pub const NOISE_HUE_AMP: f32 = 0.07;

/// Lightness pivot for the global intensity contrast.
pub const INTENSITY_PIVOT: f32 = 0.5;

/// Neutral triad used when a biome's calibration is missing or malformed.
pub const NEUTRAL_TRIAD: [u32; 3] = [0x6b6a5e, 0x8c8a78, 0xb4b19e];

/// Shared sand gradient used for shoreline blending (low, mid, high).
pub const SAND_TRIAD: [u32; 3] = [0xbfae84, 0xd9c89a, 0xe8dcb4];

// ============================================================================
// PAINTER
// ============================================================================

/// Z-order spacing between consecutive depth bands.
pub const BAND_Z_STRIDE: f32 = 1.0;

/// Offsets within one band's z slot: painted surface < tile faces < tokens/props.
pub const BAND_SURFACE_Z: f32 = 0.4;
pub const TILE_FACE_Z: f32 = 0.5;
pub const PROP_Z: f32 = 0.9;

/// Seed used when the shading config carries none.
pub const DEFAULT_SEED: u64 = 0x5eed_7e11_a1d0_0001;
