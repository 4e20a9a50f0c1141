//! Perceptual color space - packed 0xRRGGBB helpers and a radian LCh view of Oklab
//!
//! Conversions go through `bevy::color` (`Srgba` -> `LinearRgba` -> `Oklaba` -> `Oklcha`).
//! `Lch` keeps hue in radians and adds a mix with an independent hue rate.

use std::f32::consts::{PI, TAU};

use bevy::color::{LinearRgba, Oklaba, Oklcha, Srgba};

/// Packed `0xRRGGBB` <-> `Srgba` (alpha is always opaque).
pub trait PackedColor {
    fn from_packed(c: u32) -> Self;
    /// Clamped and rounded to `0xRRGGBB`.
    fn to_packed(self) -> u32;
    fn to_rgba8(self, alpha: u8) -> [u8; 4];
}

#[inline]
fn quantize(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl PackedColor for Srgba {
    fn from_packed(c: u32) -> Self {
        Srgba::rgb_u8((c >> 16) as u8, (c >> 8) as u8, c as u8)
    }

    fn to_packed(self) -> u32 {
        ((quantize(self.red) as u32) << 16) | ((quantize(self.green) as u32) << 8) | quantize(self.blue) as u32
    }

    fn to_rgba8(self, alpha: u8) -> [u8; 4] {
        [quantize(self.red), quantize(self.green), quantize(self.blue), alpha]
    }
}

// ============================================================================
// LCH (polar Oklab, radians)
// ============================================================================

/// Lightness `[0, 1]`, chroma `>= 0`, hue in radians `[-PI, PI]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lch {
    pub l: f32,
    pub c: f32,
    pub h: f32,
}

impl From<Oklcha> for Lch {
    fn from(o: Oklcha) -> Self {
        Self { l: o.lightness, c: o.chroma, h: wrap_hue(o.hue.to_radians()) }
    }
}

impl From<Lch> for Oklcha {
    fn from(lch: Lch) -> Self {
        Oklcha::new(lch.l, lch.c.max(0.0), lch.h.to_degrees().rem_euclid(360.0), 1.0)
    }
}

impl Lch {
    pub const fn new(l: f32, c: f32, h: f32) -> Self { Self { l, c, h } }

    pub fn from_srgba(c: Srgba) -> Self {
        Oklcha::from(Oklaba::from(LinearRgba::from(c))).into()
    }

    pub fn to_srgba(self) -> Srgba {
        Srgba::from(LinearRgba::from(Oklaba::from(Oklcha::from(self))))
    }

    pub fn from_packed(c: u32) -> Self { Self::from_srgba(Srgba::from_packed(c)) }
    pub fn to_packed(self) -> u32 { self.to_srgba().to_packed() }

    /// Interpolate along the shortest hue arc. `hue_t` lets hue move at a different
    /// rate than lightness/chroma. Near-gray endpoints borrow the other's hue.
    pub fn mix(self, target: Lch, t: f32, hue_t: f32) -> Lch {
        let t = t.clamp(0.0, 1.0);
        let hue_t = hue_t.clamp(0.0, 1.0);
        let h = if self.c < 1e-4 {
            target.h
        } else if target.c < 1e-4 {
            self.h
        } else {
            wrap_hue(self.h + hue_delta(self.h, target.h) * hue_t)
        };
        Lch {
            l: self.l + (target.l - self.l) * t,
            c: self.c + (target.c - self.c) * t,
            h,
        }
    }

    /// Clamp to a displayable-ish range before conversion.
    pub fn clamped(self) -> Lch {
        Lch { l: self.l.clamp(0.0, 1.0), c: self.c.clamp(0.0, 0.4), h: wrap_hue(self.h) }
    }
}

/// Signed shortest angular distance from `from` to `to`.
#[inline]
pub fn hue_delta(from: f32, to: f32) -> f32 {
    wrap_hue(to - from)
}

#[inline]
pub fn wrap_hue(h: f32) -> f32 {
    let mut h = h % TAU;
    if h > PI { h -= TAU; }
    if h < -PI { h += TAU; }
    h
}

/// Degrees helper for palette constants.
#[inline]
pub fn deg(d: f32) -> f32 {
    wrap_hue(d.to_radians())
}
