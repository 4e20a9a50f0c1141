//! Band canvas - RGBA8 raster for one depth band, clipped to its cell faces
//!
//! Every pixel remembers which band cell's face owns it. Drawing outside all
//! faces (or on a filtered-out cell) is discarded, so strokes obey the same
//! occlusion as the tile faces.

use bevy::prelude::*;

use bevy::color::Srgba;

use crate::color::space::PackedColor;
use crate::projection::{IsoProjection, PixelRect};

pub struct BandCanvas {
    rect: PixelRect,
    pixels: Vec<[u8; 4]>,
    /// 0 = no face, otherwise band cell ordinal + 1.
    owner: Vec<u32>,
    /// Optional per-ordinal mask restricting the next draws.
    filter: Option<Vec<bool>>,
}

#[inline]
fn smoothstep(e0: f32, e1: f32, x: f32) -> f32 {
    let t = ((x - e0) / (e1 - e0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

impl BandCanvas {
    pub fn new(rect: PixelRect) -> Self {
        let n = rect.width() as usize * rect.height() as usize;
        Self { rect, pixels: vec![[0; 4]; n], owner: vec![0; n], filter: None }
    }

    pub fn origin(&self) -> IVec2 { self.rect.min }
    pub fn width(&self) -> u32 { self.rect.width() }
    pub fn height(&self) -> u32 { self.rect.height() }

    #[inline]
    fn index(&self, px: i32, py: i32) -> Option<usize> {
        let lx = px - self.rect.min.x;
        let ly = py - self.rect.min.y;
        if lx < 0 || ly < 0 || lx >= self.rect.width() as i32 || ly >= self.rect.height() as i32 {
            return None;
        }
        Some(ly as usize * self.rect.width() as usize + lx as usize)
    }

    /// Pixel at board-local coordinates, `None` outside the canvas.
    pub fn pixel(&self, px: i32, py: i32) -> Option<[u8; 4]> {
        self.index(px, py).map(|i| self.pixels[i])
    }

    /// Band cell ordinal owning a pixel.
    pub fn owner_at(&self, px: i32, py: i32) -> Option<usize> {
        self.index(px, py).and_then(|i| self.owner[i].checked_sub(1)).map(|o| o as usize)
    }

    pub fn has_content(&self) -> bool {
        self.owner.iter().any(|&o| o != 0)
    }

    /// Restrict subsequent draws to cells whose mask entry is true.
    pub fn set_filter(&mut self, mask: Option<Vec<bool>>) {
        self.filter = mask;
    }

    #[inline]
    fn writable(&self, i: usize) -> bool {
        let Some(o) = self.owner[i].checked_sub(1) else { return false };
        self.filter.as_ref().is_none_or(|m| m.get(o as usize).copied().unwrap_or(false))
    }

    /// Claim and solid-fill one face. Pixel centers inside the diamond belong to it.
    pub fn stamp_face(&mut self, ordinal: usize, center: Vec2, proj: &IsoProjection, color: Srgba) {
        let rgba = color.to_rgba8(255);
        let x0 = (center.x - proj.half_width()).floor() as i32;
        let x1 = (center.x + proj.half_width()).ceil() as i32;
        let y0 = (center.y - proj.half_height()).floor() as i32;
        let y1 = (center.y + proj.half_height()).ceil() as i32;
        for py in y0..y1 {
            for px in x0..x1 {
                let p = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
                if !proj.diamond_contains(center, p) { continue; }
                if let Some(i) = self.index(px, py) {
                    self.owner[i] = ordinal as u32 + 1;
                    self.pixels[i] = rgba;
                }
            }
        }
    }

    /// Source-over blend onto an owned pixel.
    #[inline]
    pub fn blend(&mut self, px: i32, py: i32, color: Srgba, alpha: f32) {
        if alpha <= 0.0 { return; }
        let Some(i) = self.index(px, py) else { return };
        if !self.writable(i) { return; }
        let a = alpha.min(1.0);
        let src = color.to_rgba8(255);
        let dst = &mut self.pixels[i];
        for k in 0..3 {
            dst[k] = (dst[k] as f32 * (1.0 - a) + src[k] as f32 * a).round() as u8;
        }
        dst[3] = 255;
    }

    /// Soft blob with an irregular contour: radius modulated by low harmonics.
    pub fn soft_blob(&mut self, center: Vec2, radius: f32, color: Srgba, alpha: f32, phases: [f32; 3]) {
        if radius <= 0.0 { return; }
        let reach = radius * 1.4;
        let x0 = (center.x - reach).floor() as i32;
        let x1 = (center.x + reach).ceil() as i32;
        let y0 = (center.y - reach).floor() as i32;
        let y1 = (center.y + reach).ceil() as i32;
        for py in y0..=y1 {
            for px in x0..=x1 {
                let d = Vec2::new(px as f32 + 0.5, py as f32 + 0.5) - center;
                let theta = d.y.atan2(d.x);
                let r = radius
                    * (1.0 + 0.18 * (2.0 * theta + phases[0]).sin()
                        + 0.12 * (3.0 * theta + phases[1]).sin()
                        + 0.06 * (5.0 * theta + phases[2]).sin());
                let fall = 1.0 - smoothstep(r * 0.55, r, d.length());
                if fall > 0.0 {
                    self.blend(px, py, color, alpha * fall);
                }
            }
        }
    }

    /// Anti-aliased line segment of the given width.
    pub fn stroke(&mut self, a: Vec2, b: Vec2, width: f32, color: Srgba, alpha: f32) {
        let half = (width * 0.5).max(0.35);
        let x0 = (a.x.min(b.x) - half - 1.0).floor() as i32;
        let x1 = (a.x.max(b.x) + half + 1.0).ceil() as i32;
        let y0 = (a.y.min(b.y) - half - 1.0).floor() as i32;
        let y1 = (a.y.max(b.y) + half + 1.0).ceil() as i32;
        let ab = b - a;
        let len2 = ab.length_squared();
        for py in y0..=y1 {
            for px in x0..=x1 {
                let p = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
                let t = if len2 > 0.0 { ((p - a).dot(ab) / len2).clamp(0.0, 1.0) } else { 0.0 };
                let dist = (p - (a + ab * t)).length();
                let cover = 1.0 - smoothstep(half - 0.5, half + 0.5, dist);
                if cover > 0.0 {
                    self.blend(px, py, color, alpha * cover);
                }
            }
        }
    }

    /// Single-pixel mark.
    pub fn dot(&mut self, p: Vec2, color: Srgba, alpha: f32) {
        self.blend(p.x.floor() as i32, p.y.floor() as i32, color, alpha);
    }

    /// Tightly packed RGBA8 rows, ready for a texture upload.
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}
