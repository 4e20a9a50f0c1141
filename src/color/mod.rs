//! Biome Color Engine - (biome, height, cell, fields) -> packed color
//!
//! Base colors come from memoized per-biome gradients; every adjustment after
//! that (noise, aspect shading, water, sand, snow, intensity) happens in Oklab LCh.

pub mod palette;
pub mod space;

use std::collections::HashSet;

use bevy::color::Srgba;
use bevy::prelude::*;
use noise::{Fbm, MultiFractal, NoiseFn, Value};

use crate::constants::{
    INTENSITY_PIVOT, MAX_HEIGHT, MIN_HEIGHT, NOISE_CHROMA_AMP, NOISE_HUE_AMP, NOISE_LIGHTNESS_AMP,
    SAND_TRIAD, SHORE_BAND, SHORE_MIN_SAND,
};
use crate::fields::{DerivedFields, northness};
use crate::heights::{HeightGrid, clamp_height};
use crate::rng::noise_seed;
use crate::settings::RichShadingConfig;

use palette::{
    BiomeDef, BiomeRegistry, BiomeStyle, BiomeTraits, Calibration, CalibrationError, GENERIC_BIOME, GradientCache,
    WaterFamily, normalize_key,
};
use space::{Lch, PackedColor, deg};

/// Field samples for one cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CellContext {
    pub slope: f32,
    pub aspect: f32,
    pub moisture: f32,
}

impl CellContext {
    pub fn from_fields(fields: &DerivedFields, x: i32, y: i32) -> Self {
        Self {
            slope: fields.slope.get(x, y),
            aspect: fields.aspect.get(x, y),
            moisture: fields.moisture.get(x, y),
        }
    }
}

/// Secondary-pass hints for a renderer, each in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EffectWeights {
    pub caustics: f32,
    pub fog: f32,
    pub embers: f32,
    pub crispness: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellColor {
    /// `0xRRGGBB`.
    pub rgb: u32,
    pub effects: EffectWeights,
}

const SNOW: Lch = Lch::new(0.95, 0.012, -1.9);

// ============================================================================
// ENGINE
// ============================================================================

/// Owns the biome registry, the gradient cache and the seeded noise source.
#[derive(Resource)]
pub struct BiomeColorEngine {
    registry: BiomeRegistry,
    cache: GradientCache,
    sand: Vec<Srgba>,
    noise: Option<(u32, Fbm<Value>)>,
    unknown: HashSet<String>,
}

impl Default for BiomeColorEngine {
    fn default() -> Self {
        Self::new(BiomeRegistry::default())
    }
}

impl BiomeColorEngine {
    pub fn new(registry: BiomeRegistry) -> Self {
        Self {
            registry,
            cache: GradientCache::default(),
            sand: Calibration::Triad(SAND_TRIAD).build_gradient(),
            noise: None,
            unknown: HashSet::new(),
        }
    }

    pub fn registry(&self) -> &BiomeRegistry { &self.registry }
    pub fn cache(&self) -> &GradientCache { &self.cache }

    /// Canonical key for any biome name.
    pub fn resolve_key(&self, key: &str) -> String {
        self.registry.resolve_key(key).to_string()
    }

    pub fn biome(&self, key: &str) -> &BiomeDef {
        self.registry.resolve(key)
    }

    pub fn traits(&self, key: &str) -> BiomeTraits {
        self.registry.resolve(key).traits
    }

    /// Unknown biome names seen so far (normalized), each logged once.
    pub fn unknown_keys(&self) -> &HashSet<String> { &self.unknown }

    fn note_unknown(&mut self, key: &str) {
        if self.registry.is_known(key) { return; }
        let norm = normalize_key(key);
        if !self.unknown.contains(&norm) {
            debug!("biome palette: unknown biome '{}', using {}", key, GENERIC_BIOME);
            self.unknown.insert(norm);
        }
    }

    /// Register a biome and drop any stale gradient for it.
    pub fn register(&mut self, key: &str, calibration: Calibration, snow_line: Option<i32>) -> String {
        let canonical = self.registry.register(key, calibration, snow_line);
        self.unknown.remove(&canonical);
        self.cache.invalidate(&canonical);
        canonical
    }

    /// Load JSON calibration overrides (see `palette::CalibrationEntry`).
    pub fn load_calibration_json(&mut self, json: &str) -> Result<Vec<String>, CalibrationError> {
        let keys = self.registry.load_json(json)?;
        self.unknown.retain(|k| !self.registry.is_known(k));
        for k in &keys {
            self.cache.invalidate(k);
        }
        Ok(keys)
    }

    /// Uncorrected gradient color for a biome at a height (clamped).
    pub fn base_color(&mut self, key: &str, height: i32) -> u32 {
        self.note_unknown(key);
        let def = self.registry.resolve(key);
        self.cache.lookup(def, height).to_packed()
    }

    fn noise_source(&mut self, seed: u64) -> &Fbm<Value> {
        let s = noise_seed(seed);
        if !matches!(&self.noise, Some((cached, _)) if *cached == s) {
            self.noise = None;
        }
        &self
            .noise
            .get_or_insert_with(|| (s, Fbm::<Value>::new(s).set_octaves(2).set_frequency(1.0).set_persistence(0.5)))
            .1
    }

    /// Two decorrelated low-frequency noise channels in `[-1, 1]`.
    fn painterly_noise(&mut self, x: i32, y: i32, cfg: &RichShadingConfig) -> (f32, f32) {
        let f = cfg.map_freq as f64;
        let fbm = self.noise_source(cfg.effective_seed());
        let (fx, fy) = (x as f64 * f, y as f64 * f);
        let n1 = fbm.get([fx + 0.31, fy + 0.17]);
        let n2 = fbm.get([fx + 41.7, fy - 23.9]);
        (n1.clamp(-1.0, 1.0) as f32, n2.clamp(-1.0, 1.0) as f32)
    }

    /// Final color of one cell. Deterministic for identical arguments.
    pub fn color_for(
        &mut self,
        key: &str,
        height: i32,
        x: i32,
        y: i32,
        ctx: &CellContext,
        cfg: &RichShadingConfig,
    ) -> CellColor {
        let cfg = cfg.sanitized();
        let h = clamp_height(height);
        let (n1, n2) = self.painterly_noise(x, y, &cfg);

        self.note_unknown(key);
        let def = self.registry.resolve(key);
        let traits = def.traits;
        let snow_line = def.snow_line;
        let base = self.cache.lookup(def, h);
        let mut lch = Lch::from_srgba(base);
        let mut effects = EffectWeights::default();

        // Painterly perturbation
        lch.l += n1 * NOISE_LIGHTNESS_AMP;
        lch.c = (lch.c * (1.0 + n2 * NOISE_CHROMA_AMP)).max(0.0);
        lch.h += (n1 - n2) * 0.5 * NOISE_HUE_AMP;

        // Directional shading: north faces darker and cooler, south faces lighter and warmer
        let steep = (ctx.slope * cfg.slope_gain).clamp(0.0, 1.0);
        let north = northness(ctx.aspect) * steep;
        let shade = north.signum() * north.abs().powf(0.7);
        lch.l -= 0.07 * shade;
        lch.h += cfg.aspect_hue_bias * shade;

        // Underwater
        let depth_frac = if h < 0 { (-h as f32 / -MIN_HEIGHT as f32).clamp(0.0, 1.0) } else { 0.0 };
        if h < 0 {
            let (target, hue_rate) = match traits.water {
                WaterFamily::Ocean => (Lch::new(0.44 - 0.18 * depth_frac, 0.11, deg(245.0)), 1.0),
                WaterFamily::Inland => (Lch::new(0.52 - 0.12 * depth_frac, 0.07, deg(215.0)), 0.55),
            };
            let t = 0.3 + 0.7 * depth_frac;
            lch = lch.mix(target, t, t * hue_rate);
            effects.caustics = (1.0 - depth_frac) * (0.75 + 0.25 * n1.abs());
        }

        // Shoreline sand
        if traits.shoreline && h.abs() <= SHORE_BAND {
            let sand = Lch::from_srgba(self.sand[(h - MIN_HEIGHT) as usize]);
            let proximity = 1.0 - h.abs() as f32 / (SHORE_BAND + 1) as f32;
            let flatness = 1.0 / (1.0 + ctx.slope * cfg.slope_gain * 1.5);
            let dryness = 1.0 - 0.6 * ctx.moisture.clamp(0.0, 1.0);
            let strength = cfg.shoreline_sand_strength;
            let mut w = proximity * flatness * dryness * strength;
            if h == 0 {
                w = w.max(SHORE_MIN_SAND * strength.min(1.0));
            }
            let w = w.clamp(0.0, 1.0);
            lch = lch.mix(sand, w, w);
        }

        // Snow cap
        if traits.cold {
            if let Some(line) = snow_line.filter(|line| h > *line) {
                let span = (MAX_HEIGHT - line).max(1) as f32;
                let above = ((h - line) as f32 / span).clamp(0.0, 1.0);
                let scour = 1.0 / (1.0 + ctx.slope * cfg.slope_gain * 0.8);
                let t = ((0.35 + 0.65 * above) * (1.0 + 0.35 * north) * scour).clamp(0.0, 1.0);
                lch = lch.mix(SNOW, t, t);
                effects.crispness = t;
            }
        }

        // Global intensity
        lch.l = INTENSITY_PIVOT + (lch.l - INTENSITY_PIVOT) * cfg.intensity;
        lch.c *= cfg.intensity;

        effects.fog = (ctx.moisture.clamp(0.0, 1.0) * (1.0 - h.max(0) as f32 / MAX_HEIGHT as f32) * 0.6).clamp(0.0, 1.0);
        if traits.style == BiomeStyle::Volcanic && h >= 0 {
            effects.embers = (0.3 + 0.7 * h as f32 / MAX_HEIGHT as f32).clamp(0.0, 1.0);
        }
        effects.caustics = effects.caustics.clamp(0.0, 1.0);

        CellColor { rgb: lch.clamped().to_packed(), effects }
    }

    /// Colors for every cell of a snapshot, row-major.
    pub fn grid_colors(
        &mut self,
        heights: &HeightGrid,
        fields: &DerivedFields,
        key: &str,
        cfg: &RichShadingConfig,
    ) -> Vec<CellColor> {
        heights
            .iter()
            .map(|(x, y, h)| self.color_for(key, h, x, y, &CellContext::from_fields(fields, x, y), cfg))
            .collect()
    }
}
