//! Motif passes - per-biome surface detail drawn over the base faces of a band
//!
//! Each pass draws into the band canvas only. Randomness is keyed by
//! (seed, purpose, cell), so a band repaints identically from the same snapshot.
//! Cell filters look at height alone, which keeps them usable as field predicates.

use std::f32::consts::TAU;

use bevy::color::Srgba;
use bevy::prelude::*;
use rand::Rng;

use crate::color::palette::{BiomeStyle, BiomeTraits};
use crate::color::space::{Lch, PackedColor, deg};
use crate::constants::{MAX_HEIGHT, SHORE_BAND};
use crate::fields::{DerivedFields, band_orientation};
use crate::heights::HeightGrid;
use crate::projection::IsoProjection;
use crate::rng::{CellRng, Purpose, cell_rng};
use crate::settings::RichShadingConfig;

use super::raster::BandCanvas;

/// One face of the band being painted, in band order (increasing x).
#[derive(Clone, Copy, Debug)]
pub struct BandCell {
    pub cell: IVec2,
    pub height: i32,
    /// Elevation-shifted face center, board pixels.
    pub center: Vec2,
    pub color: Srgba,
}

pub type HeightFilter<'a> = &'a dyn Fn(i32) -> bool;

/// Everything a motif pass may look at for one band.
pub struct BandScene<'a> {
    pub depth: i32,
    pub cells: &'a [BandCell],
    pub heights: &'a HeightGrid,
    pub fields: &'a DerivedFields,
    pub proj: &'a IsoProjection,
    pub cfg: &'a RichShadingConfig,
    pub seed: u64,
    pub traits: BiomeTraits,
    pub snow_line: Option<i32>,
}

impl BandScene<'_> {
    fn mask(&self, keep: HeightFilter) -> Vec<bool> {
        self.cells.iter().map(|c| keep(c.height)).collect()
    }

    fn selected<'s>(&'s self, keep: HeightFilter<'s>) -> impl Iterator<Item = &'s BandCell> + 's {
        self.cells.iter().filter(move |c| keep(c.height))
    }

    fn orientation(&self, keep: HeightFilter) -> f32 {
        let predicate = |_: i32, _: i32, h: i32| keep(h);
        band_orientation(self.depth, self.heights, &self.fields.slope, &self.fields.aspect, Some(&predicate), self.cfg.slope_gain)
    }

    /// Random point inside a face, kept away from the diamond edges.
    fn point_in_face(&self, cell: &BandCell, rng: &mut CellRng, spread: f32) -> Vec2 {
        let u: f32 = rng.random_range(-0.5..0.5) * spread;
        let v: f32 = rng.random_range(-0.5..0.5) * spread;
        cell.center + self.proj.grid_dir_to_screen(Vec2::new(u, v))
    }

    fn tile_scale(&self) -> f32 {
        self.proj.tile_width / 64.0
    }
}

fn shifted(c: Srgba, dl: f32, dc: f32, dh: f32) -> Srgba {
    let mut lch = Lch::from_srgba(c);
    lch.l += dl;
    lch.c = (lch.c * (1.0 + dc)).max(0.0);
    lch.h += dh;
    lch.clamped().to_srgba()
}

fn hit(rng: &mut CellRng, p: f32) -> bool {
    rng.random::<f32>() < p
}

// ============================================================================
// SHARED
// ============================================================================

/// 1-2 irregular soft blobs per selected cell. Runs for every biome.
pub fn density_blobs(scene: &BandScene, canvas: &mut BandCanvas) {
    let scale = scene.tile_scale();
    for cell in scene.cells {
        let mut rng = cell_rng(scene.seed, Purpose::Blob, cell.cell.x, cell.cell.y);
        if !hit(&mut rng, scene.cfg.density) { continue; }
        let n = if hit(&mut rng, 0.5) { 2 } else { 1 };
        for _ in 0..n {
            let at = scene.point_in_face(cell, &mut rng, 0.7);
            let radius = rng.random_range(5.0..11.0) * scale;
            let dl = rng.random_range(-0.05..0.05);
            let dh = rng.random_range(-0.05..0.05);
            let color = shifted(cell.color, dl, 0.0, dh);
            let alpha = rng.random_range(0.3..0.55);
            let phases = [rng.random_range(0.0..TAU), rng.random_range(0.0..TAU), rng.random_range(0.0..TAU)];
            canvas.soft_blob(at, radius, color, alpha, phases);
        }
    }
}

// ============================================================================
// PRIMITIVE MOTIFS
// ============================================================================

pub struct RibbonStyle {
    pub purpose: Purpose,
    pub chance: f32,
    pub steps: usize,
    pub step_len: f32,
    pub width: f32,
    pub alpha: f32,
    pub dl: f32,
    pub tint: Option<Lch>,
}

/// Grid-space contour direction at `g`: the band/aspect blend, turned a quarter
/// turn so it runs across the slope. Rotated once, after blending.
pub fn contour_direction(fields: &DerivedFields, g: Vec2, band_angle: f32, slope_gain: f32) -> Vec2 {
    let dir = fields.sample_direction(g, band_angle, slope_gain);
    Vec2::new(-dir.y, dir.x)
}

/// Polylines that follow the terrain contours.
pub fn ribbons(scene: &BandScene, canvas: &mut BandCanvas, style: &RibbonStyle, keep: HeightFilter) {
    let band_angle = scene.orientation(keep);
    let scale = scene.tile_scale();
    canvas.set_filter(Some(scene.mask(keep)));
    for cell in scene.selected(keep) {
        let mut rng = cell_rng(scene.seed, style.purpose, cell.cell.x, cell.cell.y);
        if !hit(&mut rng, scene.cfg.density * style.chance) { continue; }
        let color = match style.tint {
            Some(t) => Lch::from_srgba(cell.color).mix(t, 0.6, 0.6).clamped().to_srgba(),
            None => shifted(cell.color, style.dl, 0.05, 0.0),
        };
        let mut p = scene.point_in_face(cell, &mut rng, 0.8);
        let flip = if hit(&mut rng, 0.5) { 1.0 } else { -1.0 };
        for _ in 0..style.steps {
            let g = scene.proj.screen_to_grid_at(p, cell.height);
            let contour = contour_direction(scene.fields, g, band_angle, scene.cfg.slope_gain) * flip;
            let screen = scene.proj.grid_dir_to_screen(contour).normalize_or_zero();
            if screen == Vec2::ZERO { break; }
            let wobble = rng.random_range(-0.25..0.25);
            let next = p + Vec2::from_angle(wobble).rotate(screen) * style.step_len * scale;
            canvas.stroke(p, next, style.width * scale.max(0.5), color, style.alpha);
            p = next;
        }
    }
    canvas.set_filter(None);
}

pub struct CrackStyle {
    pub chance: f32,
    pub segments: usize,
    pub ink: Srgba,
    pub glow: Option<Srgba>,
}

/// Branching random walks.
pub fn cracks(scene: &BandScene, canvas: &mut BandCanvas, style: &CrackStyle, keep: HeightFilter) {
    let scale = scene.tile_scale();
    canvas.set_filter(Some(scene.mask(keep)));
    for cell in scene.selected(keep) {
        let mut rng = cell_rng(scene.seed, Purpose::Crack, cell.cell.x, cell.cell.y);
        if !hit(&mut rng, scene.cfg.density * style.chance) { continue; }
        let mut walkers = vec![(scene.point_in_face(cell, &mut rng, 0.6), rng.random_range(0.0..TAU))];
        let mut drawn = 0;
        while let Some((mut p, mut angle)) = walkers.pop() {
            for _ in 0..style.segments {
                angle += rng.random_range(-0.9..0.9);
                let len = rng.random_range(2.5..5.0) * scale;
                let next = p + Vec2::from_angle(angle) * Vec2::new(len, len * 0.6);
                if let Some(glow) = style.glow {
                    canvas.stroke(p, next, 2.6 * scale.max(0.5), glow, 0.35);
                }
                canvas.stroke(p, next, 0.9, style.ink, 0.7);
                if walkers.len() < 2 && drawn < 2 && hit(&mut rng, 0.3) {
                    let side = if hit(&mut rng, 0.5) { 1.0 } else { -1.0 };
                    walkers.push((next, angle + rng.random_range(0.6..1.2) * side));
                    drawn += 1;
                }
                p = next;
            }
        }
    }
    canvas.set_filter(None);
}

pub struct StrokeStyle {
    pub purpose: Purpose,
    pub per_cell: usize,
    pub blades: usize,
    pub length: (f32, f32),
    pub fan: f32,
    pub dl: f32,
    pub tint: Option<Lch>,
}

/// Short upright strokes fanned around vertical (grass tufts, reeds).
pub fn tufts(scene: &BandScene, canvas: &mut BandCanvas, style: &StrokeStyle, keep: HeightFilter) {
    let scale = scene.tile_scale();
    canvas.set_filter(Some(scene.mask(keep)));
    for cell in scene.selected(keep) {
        let mut rng = cell_rng(scene.seed, style.purpose, cell.cell.x, cell.cell.y);
        let count = (style.per_cell as f32 * scene.cfg.density * rng.random_range(0.5..1.5)).round() as usize;
        let base_color = match style.tint {
            Some(t) => Lch::from_srgba(cell.color).mix(t, 0.5, 0.5).clamped().to_srgba(),
            None => cell.color,
        };
        for _ in 0..count {
            let root = scene.point_in_face(cell, &mut rng, 0.75);
            let color = shifted(base_color, style.dl + rng.random_range(-0.03..0.03), 0.1, 0.0);
            for _ in 0..style.blades {
                let lean = rng.random_range(-style.fan..style.fan);
                let len = rng.random_range(style.length.0..style.length.1) * scale;
                let tip = root + Vec2::new(lean.sin(), -lean.cos()) * len;
                canvas.stroke(root, tip, 1.0, color, 0.75);
            }
        }
    }
    canvas.set_filter(None);
}

/// Single bright or dark pixels.
pub fn speckle(scene: &BandScene, canvas: &mut BandCanvas, purpose: Purpose, per_cell: usize, color: Option<Srgba>, keep: HeightFilter) {
    canvas.set_filter(Some(scene.mask(keep)));
    for cell in scene.selected(keep) {
        let mut rng = cell_rng(scene.seed, purpose, cell.cell.x, cell.cell.y);
        let count = (per_cell as f32 * scene.cfg.density * rng.random_range(0.5..1.5)).round() as usize;
        for _ in 0..count {
            let at = scene.point_in_face(cell, &mut rng, 0.9);
            let c = color.unwrap_or_else(|| {
                let dl = if hit(&mut rng, 0.5) { 0.08 } else { -0.08 };
                shifted(cell.color, dl, 0.0, 0.0)
            });
            canvas.dot(at, c, rng.random_range(0.5..0.9));
        }
    }
    canvas.set_filter(None);
}

/// Layered dark blob with a lighter crown toward the top-left.
pub fn canopy(scene: &BandScene, canvas: &mut BandCanvas, keep: HeightFilter) {
    let scale = scene.tile_scale();
    canvas.set_filter(Some(scene.mask(keep)));
    for cell in scene.selected(keep) {
        let mut rng = cell_rng(scene.seed, Purpose::Canopy, cell.cell.x, cell.cell.y);
        let crowns = 1 + (3.0 * scene.cfg.density * rng.random::<f32>()) as usize;
        for _ in 0..crowns {
            let at = scene.point_in_face(cell, &mut rng, 0.6);
            let r = rng.random_range(4.0..8.0) * scale;
            let phases = [rng.random_range(0.0..TAU), rng.random_range(0.0..TAU), rng.random_range(0.0..TAU)];
            canvas.soft_blob(at, r, shifted(cell.color, -0.09, 0.15, 0.0), 0.7, phases);
            canvas.soft_blob(at + Vec2::new(-0.3, -0.35) * r, r * 0.5, shifted(cell.color, 0.06, 0.1, deg(6.0)), 0.55, phases);
        }
    }
    canvas.set_filter(None);
}

// ============================================================================
// BIOME DISPATCH
// ============================================================================

fn ripple_tint() -> Lch { Lch::new(0.72, 0.05, deg(220.0)) }

/// Run the biome's style pass over a band.
pub fn paint_style(scene: &BandScene, canvas: &mut BandCanvas) {
    let all = |_: i32| true;
    let underwater = |h: i32| h < 0;
    let dry = |h: i32| h >= 0;

    match scene.traits.style {
        BiomeStyle::Plains => {
            let style = StrokeStyle { purpose: Purpose::Tuft, per_cell: 4, blades: 3, length: (3.0, 6.0), fan: 0.45, dl: -0.06, tint: None };
            tufts(scene, canvas, &style, &all);
        }
        BiomeStyle::Arid if scene.traits.salt_flat => {
            let ink = shifted(scene.cells.first().map_or(Srgba::rgb(0.8, 0.8, 0.78), |c| c.color), -0.18, -0.5, 0.0);
            cracks(scene, canvas, &CrackStyle { chance: 0.9, segments: 4, ink, glow: None }, &all);
        }
        BiomeStyle::Arid => {
            let style = RibbonStyle { purpose: Purpose::Ribbon, chance: 0.9, steps: 6, step_len: 4.0, width: 1.6, alpha: 0.4, dl: 0.06, tint: None };
            ribbons(scene, canvas, &style, &all);
        }
        BiomeStyle::Forest => canopy(scene, canvas, &all),
        BiomeStyle::Wetland => {
            let ripple = RibbonStyle { purpose: Purpose::Ripple, chance: 0.8, steps: 3, step_len: 3.5, width: 1.0, alpha: 0.45, dl: 0.1, tint: Some(ripple_tint()) };
            ribbons(scene, canvas, &ripple, &underwater);
            let reed = StrokeStyle {
                purpose: Purpose::Reed, per_cell: 3, blades: 2, length: (5.0, 9.0), fan: 0.2, dl: -0.04,
                tint: Some(Lch::new(0.5, 0.08, deg(110.0))),
            };
            tufts(scene, canvas, &reed, &dry);
        }
        BiomeStyle::Alpine => {
            let style = RibbonStyle { purpose: Purpose::Striation, chance: 0.8, steps: 5, step_len: 4.5, width: 0.9, alpha: 0.5, dl: -0.1, tint: None };
            ribbons(scene, canvas, &style, &all);
            let line = scene.snow_line.unwrap_or(MAX_HEIGHT / 2);
            let snowy = move |h: i32| h >= line;
            speckle(scene, canvas, Purpose::Glint, 3, Some(Srgba::rgb(1.0, 1.0, 1.0)), &snowy);
        }
        BiomeStyle::Water => {
            let style = RibbonStyle { purpose: Purpose::Ripple, chance: 0.9, steps: 4, step_len: 4.0, width: 1.2, alpha: 0.4, dl: 0.12, tint: Some(ripple_tint()) };
            ribbons(scene, canvas, &style, &underwater);
            let shore = |h: i32| (0..=SHORE_BAND).contains(&h);
            speckle(scene, canvas, Purpose::Speckle, 6, Some(Srgba::from_packed(0xe8dcb4)), &shore);
        }
        BiomeStyle::Volcanic => {
            let style = CrackStyle {
                chance: 0.85, segments: 5, ink: Srgba::rgb(0.08, 0.06, 0.06),
                glow: Some(Lch::new(0.66, 0.17, deg(45.0)).to_srgba()),
            };
            cracks(scene, canvas, &style, &dry);
        }
        BiomeStyle::Arcane => {
            let style = RibbonStyle {
                purpose: Purpose::Ribbon, chance: 0.7, steps: 7, step_len: 3.5, width: 1.3, alpha: 0.5, dl: 0.1,
                tint: Some(Lch::new(0.7, 0.14, deg(300.0))),
            };
            ribbons(scene, canvas, &style, &all);
            speckle(scene, canvas, Purpose::Glint, 2, Some(Lch::new(0.9, 0.08, deg(290.0)).to_srgba()), &all);
        }
        BiomeStyle::Generic => speckle(scene, canvas, Purpose::Scatter, 5, None, &all),
    }
}
