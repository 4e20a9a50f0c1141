//! Depth-Band Painter - one RGBA surface per `x + y` band, bottom-up
//!
//! A pass reads one immutable height snapshot, derives fields, colors every
//! face, layers blobs and the biome's motifs, then hands each band to a
//! `BandSurfaceSink`. Bands are independent: a failed upload is logged and
//! the pass moves on.

pub mod motifs;
pub mod raster;

use std::collections::{BTreeMap, BTreeSet};

use bevy::color::Srgba;
use bevy::prelude::*;

use crate::color::space::PackedColor;
use crate::color::{BiomeColorEngine, CellContext};
use crate::constants::{BAND_SURFACE_Z, BAND_Z_STRIDE, PROP_Z, TILE_FACE_Z};
use crate::fields::DerivedFields;
use crate::heights::HeightGrid;
use crate::projection::{IsoProjection, band_cells};
use crate::settings::RichShadingConfig;

use motifs::{BandCell, BandScene};
use raster::BandCanvas;

// ============================================================================
// Z ORDER
// ============================================================================

/// Tile faces of band `d`.
#[inline] pub fn tile_face_z(depth: i32) -> f32 { depth as f32 * BAND_Z_STRIDE + TILE_FACE_Z }
/// Painted surface of band `d`: just beneath its faces, above band `d - 1` props.
#[inline] pub fn band_surface_z(depth: i32) -> f32 { depth as f32 * BAND_Z_STRIDE + BAND_SURFACE_Z }
/// Props standing on band `d`: above the painted surface, below band `d + 1`.
#[inline] pub fn prop_z(depth: i32) -> f32 { depth as f32 * BAND_Z_STRIDE + PROP_Z }

// ============================================================================
// SINK
// ============================================================================

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SurfaceError {
    #[error("band {depth}: surface has zero extent ({width}x{height})")]
    Empty { depth: i32, width: u32, height: u32 },
    #[error("band {depth}: expected {expected} bytes of RGBA8, got {actual}")]
    SizeMismatch { depth: i32, expected: usize, actual: usize },
    #[error("band {depth}: {reason}")]
    Backend { depth: i32, reason: String },
}

/// One finished band, borrowed from the painter for the duration of an upload.
#[derive(Clone, Copy, Debug)]
pub struct BandSurface<'a> {
    pub depth: i32,
    /// Board-local pixel position of the top-left texel.
    pub origin: IVec2,
    pub width: u32,
    pub height: u32,
    pub z: f32,
    /// Row-major RGBA8, `width * height * 4` bytes.
    pub pixels: &'a [u8],
}

impl BandSurface<'_> {
    pub fn validate(&self) -> Result<(), SurfaceError> {
        if self.width == 0 || self.height == 0 {
            return Err(SurfaceError::Empty { depth: self.depth, width: self.width, height: self.height });
        }
        let expected = self.width as usize * self.height as usize * 4;
        if self.pixels.len() != expected {
            return Err(SurfaceError::SizeMismatch { depth: self.depth, expected, actual: self.pixels.len() });
        }
        Ok(())
    }
}

/// Where band surfaces go: GPU images, an offscreen compositor, a test double.
pub trait BandSurfaceSink {
    /// Create or replace the surface for `surface.depth`.
    fn upload(&mut self, surface: BandSurface<'_>) -> Result<(), SurfaceError>;
    /// Drop the surface for a band that no longer has content.
    fn destroy(&mut self, depth: i32);
}

/// A band kept in memory by `MemoryBandSink`.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredBand {
    pub origin: IVec2,
    pub width: u32,
    pub height: u32,
    pub z: f32,
    pub pixels: Vec<u8>,
}

/// Headless sink that keeps every band's pixels. Useful for snapshots and
/// offline rendering.
#[derive(Default, Debug)]
pub struct MemoryBandSink {
    pub bands: BTreeMap<i32, StoredBand>,
    pub uploads: usize,
    pub destroyed: Vec<i32>,
}

impl BandSurfaceSink for MemoryBandSink {
    fn upload(&mut self, surface: BandSurface<'_>) -> Result<(), SurfaceError> {
        surface.validate()?;
        self.bands.insert(surface.depth, StoredBand {
            origin: surface.origin,
            width: surface.width,
            height: surface.height,
            z: surface.z,
            pixels: surface.pixels.to_vec(),
        });
        self.uploads += 1;
        Ok(())
    }

    fn destroy(&mut self, depth: i32) {
        self.bands.remove(&depth);
        self.destroyed.push(depth);
    }
}

impl MemoryBandSink {
    /// Alpha-composite all bands in z order into a `width x height` RGBA8 image.
    pub fn composite(&self, width: u32, height: u32) -> Vec<u8> {
        let mut out = vec![0u8; width as usize * height as usize * 4];
        let mut order: Vec<&StoredBand> = self.bands.values().collect();
        order.sort_by(|a, b| a.z.total_cmp(&b.z));
        for band in order {
            for ly in 0..band.height as i32 {
                let y = band.origin.y + ly;
                if y < 0 || y >= height as i32 { continue; }
                for lx in 0..band.width as i32 {
                    let x = band.origin.x + lx;
                    if x < 0 || x >= width as i32 { continue; }
                    let src = (ly as usize * band.width as usize + lx as usize) * 4;
                    let a = band.pixels[src + 3] as f32 / 255.0;
                    if a == 0.0 { continue; }
                    let dst = (y as usize * width as usize + x as usize) * 4;
                    for k in 0..3 {
                        out[dst + k] = (out[dst + k] as f32 * (1.0 - a) + band.pixels[src + k] as f32 * a).round() as u8;
                    }
                    out[dst + 3] = out[dst + 3].max(band.pixels[src + 3]);
                }
            }
        }
        out
    }
}

// ============================================================================
// PAINTER
// ============================================================================

/// Outcome of one paint pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PaintReport {
    /// Bands uploaded this pass, ascending.
    pub painted: Vec<i32>,
    /// Bands whose upload failed.
    pub failed: Vec<i32>,
    /// Previously allocated bands that were destroyed.
    pub destroyed: Vec<i32>,
}

/// Remembers which band surfaces exist between passes.
#[derive(Resource, Default, Debug)]
pub struct DepthBandPainter {
    allocated: BTreeSet<i32>,
}

impl DepthBandPainter {
    pub fn allocated(&self) -> impl Iterator<Item = i32> + '_ {
        self.allocated.iter().copied()
    }

    /// Paint every band of `snapshot` in increasing depth.
    pub fn paint_pass<S: BandSurfaceSink + ?Sized>(
        &mut self,
        snapshot: &HeightGrid,
        biome_key: &str,
        colors: &mut BiomeColorEngine,
        cfg: &RichShadingConfig,
        proj: &IsoProjection,
        sink: &mut S,
    ) -> PaintReport {
        let _span = tracing::info_span!("paint_pass", rows = snapshot.rows(), cols = snapshot.cols()).entered();
        let cfg = cfg.sanitized();
        let seed = cfg.effective_seed();
        let fields = DerivedFields::compute(snapshot);
        let key = colors.resolve_key(biome_key);
        let def = colors.biome(&key);
        let (traits, snow_line) = (def.traits, def.snow_line);

        let mut report = PaintReport::default();
        let mut kept = BTreeSet::new();

        for depth in 0..=snapshot.max_depth().unwrap_or(-1) {
            let Some(rect) = proj.band_bounds(snapshot, depth) else { continue };
            if rect.is_empty() { continue; }

            let cells: Vec<BandCell> = band_cells(snapshot, depth)
                .map(|c| {
                    let h = snapshot.get(c.x, c.y);
                    let ctx = CellContext::from_fields(&fields, c.x, c.y);
                    let color = colors.color_for(&key, h, c.x, c.y, &ctx, &cfg);
                    BandCell { cell: c, height: h, center: proj.face_center(c.x, c.y, h), color: Srgba::from_packed(color.rgb) }
                })
                .collect();

            let mut canvas = BandCanvas::new(rect);
            for (i, cell) in cells.iter().enumerate() {
                canvas.stamp_face(i, cell.center, proj, cell.color);
            }
            if !canvas.has_content() { continue; }

            let scene = BandScene {
                depth,
                cells: &cells,
                heights: snapshot,
                fields: &fields,
                proj,
                cfg: &cfg,
                seed,
                traits,
                snow_line,
            };
            motifs::density_blobs(&scene, &mut canvas);
            motifs::paint_style(&scene, &mut canvas);

            let surface = BandSurface {
                depth,
                origin: canvas.origin(),
                width: canvas.width(),
                height: canvas.height(),
                z: band_surface_z(depth),
                pixels: canvas.bytes(),
            };
            match sink.upload(surface) {
                Ok(()) => {
                    kept.insert(depth);
                    report.painted.push(depth);
                }
                Err(e) => {
                    warn!("Band upload failed: {}", e);
                    report.failed.push(depth);
                    // Previous surface for this band stays in place.
                    if self.allocated.contains(&depth) {
                        kept.insert(depth);
                    }
                }
            }
        }

        for &depth in self.allocated.difference(&kept) {
            sink.destroy(depth);
            report.destroyed.push(depth);
        }
        self.allocated = kept;

        debug!(
            "Painted {} bands ({} failed, {} destroyed) for biome '{}'",
            report.painted.len(), report.failed.len(), report.destroyed.len(), key
        );
        report
    }
}
