//! Terrain settings - rich-shading knobs and tile metrics, persisted as JSON.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::DEFAULT_SEED;
use crate::projection::ProjectionSettings;

/// Tunables for color synthesis and the painter. Passed explicitly into every call.
#[derive(Resource, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RichShadingConfig {
    /// Probability scale for blobs and motifs, `[0, 1]`.
    #[serde(default = "default_density")]
    pub density: f32,
    /// Lightness contrast / chroma scale, `[0, 2]`. 1 leaves colors unchanged.
    #[serde(default = "default_one")]
    pub intensity: f32,
    /// Noise frequency in cells^-1.
    #[serde(default = "default_map_freq")]
    pub map_freq: f32,
    /// Multiplier on shoreline sand blending, `[0, 2]`.
    #[serde(default = "default_one")]
    pub shoreline_sand_strength: f32,
    /// How strongly slope pulls motifs toward the local aspect and scours snow.
    #[serde(default = "default_one")]
    pub slope_gain: f32,
    /// Deterministic seed; `None` uses `DEFAULT_SEED`.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Hue shift (radians) toward warm on south faces, cool on north faces.
    #[serde(default = "default_aspect_hue_bias")]
    pub aspect_hue_bias: f32,
}

fn default_density() -> f32 { 0.55 }
fn default_one() -> f32 { 1.0 }
fn default_map_freq() -> f32 { 0.18 }
fn default_aspect_hue_bias() -> f32 { 0.04 }

impl Default for RichShadingConfig {
    fn default() -> Self {
        Self {
            density: default_density(),
            intensity: 1.0,
            map_freq: default_map_freq(),
            shoreline_sand_strength: 1.0,
            slope_gain: 1.0,
            seed: None,
            aspect_hue_bias: default_aspect_hue_bias(),
        }
    }
}

impl RichShadingConfig {
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }

    /// Copy with every knob clamped into its documented range. Non-finite values
    /// fall back to defaults.
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        let fix = |v: f32, fallback: f32, lo: f32, hi: f32| if v.is_finite() { v.clamp(lo, hi) } else { fallback };
        Self {
            density: fix(self.density, d.density, 0.0, 1.0),
            intensity: fix(self.intensity, d.intensity, 0.0, 2.0),
            map_freq: fix(self.map_freq, d.map_freq, 0.001, 4.0),
            shoreline_sand_strength: fix(self.shoreline_sand_strength, d.shoreline_sand_strength, 0.0, 2.0),
            slope_gain: fix(self.slope_gain, d.slope_gain, 0.0, 8.0),
            seed: self.seed,
            aspect_hue_bias: fix(self.aspect_hue_bias, d.aspect_hue_bias, -0.5, 0.5),
        }
    }
}

/// Persisted terrain settings. Saved to `Documents/Isoterrain/settings.json`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TerrainSettings {
    #[serde(default)]
    pub shading: RichShadingConfig,
    #[serde(default)]
    pub projection: ProjectionSettings,
    #[serde(default)]
    pub biome: Option<String>,
}

fn settings_path() -> Option<PathBuf> {
    let home = std::env::var("USERPROFILE")
        .or_else(|_| std::env::var("HOME"))
        .ok()?;
    let dir = PathBuf::from(home).join("Documents").join("Isoterrain");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join("settings.json"))
}

/// Parse settings, falling back to defaults on malformed JSON.
pub fn parse_settings(json: &str) -> TerrainSettings {
    match serde_json::from_str::<TerrainSettings>(json) {
        Ok(mut s) => {
            s.shading = s.shading.sanitized();
            s
        }
        Err(e) => {
            warn!("Failed to parse terrain settings: {}", e);
            TerrainSettings::default()
        }
    }
}

/// Write settings as pretty JSON. Failures are logged, never fatal.
pub fn save_settings_to(settings: &TerrainSettings, path: &Path) -> bool {
    let json = match serde_json::to_string_pretty(settings) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize terrain settings: {}", e);
            return false;
        }
    };
    match std::fs::write(path, json) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to save terrain settings to {}: {}", path.display(), e);
            false
        }
    }
}

/// Missing file -> defaults, silently. Unreadable JSON -> defaults with a warning.
pub fn load_settings_from(path: &Path) -> TerrainSettings {
    match std::fs::read_to_string(path) {
        Ok(json) => parse_settings(&json),
        Err(_) => TerrainSettings::default(),
    }
}

pub fn save_settings(settings: &TerrainSettings) {
    if let Some(path) = settings_path() {
        save_settings_to(settings, &path);
    }
}

pub fn load_settings() -> TerrainSettings {
    settings_path().map(|p| load_settings_from(&p)).unwrap_or_default()
}
