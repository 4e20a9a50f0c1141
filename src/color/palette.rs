//! Biome palette - calibration data, alias table, style classification, gradient cache
//!
//! Every biome resolves to a canonical key with a height -> color gradient built
//! once from either three triad colors or explicit height stops.

use std::collections::HashMap;

use bevy::color::{Mix, Srgba};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::color::space::PackedColor;
use crate::constants::{HEIGHT_LEVELS, MAX_HEIGHT, MIN_HEIGHT, NEUTRAL_TRIAD};
use crate::heights::clamp_height;

/// Canonical key used when nothing else matches.
pub const GENERIC_BIOME: &str = "generic";

/// Serialize a packed 0xRRGGBB color as "#rrggbb".
pub mod hex_color {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    pub fn serialize<S: Serializer>(c: &u32, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("#{:06x}", c & 0xff_ffff))
    }
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let s = String::deserialize(d)?;
        let hex = s.trim().trim_start_matches('#');
        u32::from_str_radix(hex, 16)
            .ok()
            .filter(|_| hex.len() == 6)
            .ok_or_else(|| D::Error::custom(format!("invalid color '{}'", s)))
    }
}

/// Serialize `[u32; 3]` triads as three "#rrggbb" strings.
mod hex_triad {
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error};
    pub fn serialize<S: Serializer>(t: &Option<[u32; 3]>, s: S) -> Result<S::Ok, S::Error> {
        t.map(|t| t.map(|c| format!("#{:06x}", c & 0xff_ffff))).serialize(s)
    }
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<[u32; 3]>, D::Error> {
        let Some(raw) = <Option<[String; 3]>>::deserialize(d)? else { return Ok(None) };
        let mut out = [0u32; 3];
        for (slot, s) in out.iter_mut().zip(raw.iter()) {
            let hex = s.trim().trim_start_matches('#');
            *slot = u32::from_str_radix(hex, 16)
                .ok()
                .filter(|_| hex.len() == 6)
                .ok_or_else(|| D::Error::custom(format!("invalid color '{}'", s)))?;
        }
        Ok(Some(out))
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(thiserror::Error, Debug)]
pub enum CalibrationError {
    #[error("biome '{0}' has an empty stop list")]
    EmptyStops(String),

    #[error("biome '{key}' stop {index} is not above the previous stop height")]
    NonMonotonic { key: String, index: usize },

    #[error("biome '{0}' has neither a triad nor stops")]
    Missing(String),

    #[error("calibration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// CALIBRATION
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradientStop {
    pub height: i32,
    #[serde(with = "hex_color")]
    pub color: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Calibration {
    /// Low/mid/high colors at MIN_HEIGHT, 0 and MAX_HEIGHT.
    Triad([u32; 3]),
    /// Non-uniformly spaced stops, strictly increasing in height.
    Stops(Vec<GradientStop>),
}

impl Calibration {
    pub fn neutral() -> Self {
        Calibration::Triad(NEUTRAL_TRIAD)
    }

    pub fn validate(&self, key: &str) -> Result<(), CalibrationError> {
        let Calibration::Stops(stops) = self else { return Ok(()) };
        if stops.is_empty() {
            return Err(CalibrationError::EmptyStops(key.to_string()));
        }
        if let Some(index) = stops.windows(2).position(|w| w[1].height <= w[0].height) {
            return Err(CalibrationError::NonMonotonic { key: key.to_string(), index: index + 1 });
        }
        Ok(())
    }

    /// Base color at an integer height (already clamped by the caller).
    fn sample(&self, h: i32) -> Srgba {
        match self {
            Calibration::Triad([low, mid, high]) => {
                let (low, mid, high) = (Srgba::from_packed(*low), Srgba::from_packed(*mid), Srgba::from_packed(*high));
                if h < 0 {
                    low.mix(&mid, (h - MIN_HEIGHT) as f32 / (0 - MIN_HEIGHT) as f32)
                } else {
                    mid.mix(&high, h as f32 / MAX_HEIGHT as f32)
                }
            }
            Calibration::Stops(stops) => {
                let first = stops[0];
                let last = stops[stops.len() - 1];
                if h <= first.height { return Srgba::from_packed(first.color); }
                if h >= last.height { return Srgba::from_packed(last.color); }
                let i = stops.iter().position(|s| s.height >= h).unwrap_or(stops.len() - 1);
                let (a, b) = (stops[i - 1], stops[i]);
                let t = (h - a.height) as f32 / (b.height - a.height) as f32;
                Srgba::from_packed(a.color).mix(&Srgba::from_packed(b.color), t)
            }
        }
    }

    /// One color per height in `[MIN_HEIGHT, MAX_HEIGHT]`.
    pub fn build_gradient(&self) -> Vec<Srgba> {
        (MIN_HEIGHT..=MAX_HEIGHT).map(|h| self.sample(h)).collect()
    }
}

// ============================================================================
// STYLE / TRAITS
// ============================================================================

/// Painter motif family for a biome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BiomeStyle {
    Plains,
    Arid,
    Forest,
    Wetland,
    Alpine,
    Water,
    Volcanic,
    Arcane,
    Generic,
}

/// Which water palette sub-zero cells blend toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaterFamily {
    Ocean,
    Inland,
}

/// Everything the color engine and painter need to know about a biome besides colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BiomeTraits {
    pub style: BiomeStyle,
    pub water: WaterFamily,
    pub shoreline: bool,
    pub cold: bool,
    /// Arid biomes drawn with a crack network instead of dunes.
    pub salt_flat: bool,
}

fn has_any(key: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| key.contains(n))
}

impl BiomeTraits {
    /// Pattern-match a canonical key once at registration time.
    pub fn classify(key: &str) -> Self {
        let style = if has_any(key, &["swamp", "marsh", "bog", "fen", "mangrove", "flood", "wetland"]) {
            BiomeStyle::Wetland
        } else if has_any(key, &["ocean", "sea", "coast", "beach", "reef", "lake", "river", "water"]) {
            BiomeStyle::Water
        } else if has_any(key, &["desert", "dune", "badland", "mesa", "salt", "arid", "canyon"]) {
            BiomeStyle::Arid
        } else if has_any(key, &["forest", "jungle", "taiga", "wood", "grove"]) {
            BiomeStyle::Forest
        } else if has_any(key, &["tundra", "glacier", "mountain", "alpine", "snow", "ice", "peak"]) {
            BiomeStyle::Alpine
        } else if has_any(key, &["volcan", "lava", "ash", "obsidian"]) {
            BiomeStyle::Volcanic
        } else if has_any(key, &["arcane", "fey", "magic", "crystal"]) {
            BiomeStyle::Arcane
        } else if has_any(key, &["grass", "plain", "savanna", "meadow", "steppe", "prairie"]) {
            BiomeStyle::Plains
        } else {
            BiomeStyle::Generic
        };
        Self {
            style,
            water: if has_any(key, &["ocean", "sea", "coast", "beach", "reef", "mangrove"]) {
                WaterFamily::Ocean
            } else {
                WaterFamily::Inland
            },
            shoreline: has_any(key, &["coast", "beach", "river", "mangrove", "floodplain", "reef"]),
            cold: style == BiomeStyle::Alpine || has_any(key, &["taiga", "tundra", "boreal"]),
            salt_flat: key.contains("salt"),
        }
    }
}

// ============================================================================
// BIOME DEFINITIONS
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct BiomeDef {
    pub key: String,
    pub traits: BiomeTraits,
    pub calibration: Calibration,
    /// Height above which cold biomes blend toward snow.
    pub snow_line: Option<i32>,
}

/// One entry of a JSON calibration file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CalibrationEntry {
    pub key: String,
    #[serde(default, with = "hex_triad", skip_serializing_if = "Option::is_none")]
    pub triad: Option<[u32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stops: Option<Vec<GradientStop>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snow_line: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl CalibrationEntry {
    fn calibration(&self) -> Result<Calibration, CalibrationError> {
        let cal = match (&self.stops, self.triad) {
            (Some(stops), _) => Calibration::Stops(stops.clone()),
            (None, Some(triad)) => Calibration::Triad(triad),
            (None, None) => return Err(CalibrationError::Missing(self.key.clone())),
        };
        cal.validate(&self.key)?;
        Ok(cal)
    }
}

const fn stop(height: i32, color: u32) -> GradientStop {
    GradientStop { height, color }
}

/// Built-in calibration: (key, calibration, snow line).
fn builtin_biomes() -> Vec<(&'static str, Calibration, Option<i32>)> {
    use Calibration::{Stops, Triad};
    vec![
        ("grassland", Triad([0x3f6b3a, 0x6f9a4a, 0xa8b86a]), None),
        ("plains", Triad([0x4a6e3c, 0x8aa356, 0xc2c07a]), None),
        ("savanna", Triad([0x6b6a3a, 0xb0a254, 0xd8c27c]), None),
        ("meadow", Triad([0x3c6a3e, 0x78a85a, 0xb8c884]), None),
        ("forest", Triad([0x1f3d22, 0x2f5e2f, 0x5d7f45]), None),
        ("jungle", Triad([0x14361c, 0x226b2b, 0x4f8a3a]), None),
        ("taiga", Triad([0x1e3a30, 0x33584a, 0x7c8f86]), Some(6)),
        ("desert", Stops(vec![
            stop(-10, 0x8a6a3c), stop(-2, 0xb48a52), stop(0, 0xd8b77a), stop(5, 0xe6c98f), stop(10, 0xf0dcae),
        ]), None),
        ("badlands", Triad([0x7a3f22, 0xb0603a, 0xd49a6a]), None),
        ("salt_flat", Triad([0xa9a59a, 0xdcd8cc, 0xf4f2ea]), None),
        ("swamp", Triad([0x2a3a22, 0x4a5a30, 0x6f7a46]), None),
        ("marsh", Triad([0x2f4a34, 0x58744a, 0x8c9a66]), None),
        ("mangrove", Triad([0x24402c, 0x3e6a3f, 0x6a8a55]), None),
        ("floodplain", Triad([0x3e5a34, 0x6e8a4a, 0x9fae6e]), None),
        ("tundra", Triad([0x5b6b66, 0x8f9a8c, 0xd8dedb]), Some(3)),
        ("glacier", Triad([0x9fb8c8, 0xcfe0ea, 0xf4f8fb]), Some(0)),
        ("mountain", Stops(vec![
            stop(-10, 0x3a3d3a), stop(0, 0x5f625a), stop(4, 0x807d70), stop(7, 0x9c9a92), stop(10, 0xc8c8c4),
        ]), Some(6)),
        ("alpine", Triad([0x4a5a48, 0x7a8272, 0xb8bcb4]), Some(4)),
        ("ocean", Stops(vec![
            stop(-10, 0x0b2a4a), stop(-5, 0x14406a), stop(-1, 0x2a6a92), stop(0, 0x5f9fb4), stop(3, 0xbfb48a), stop(10, 0xa9a07a),
        ]), None),
        ("coast", Triad([0x1d5a7a, 0xd2c290, 0x7a9a5a]), None),
        ("beach", Triad([0x3a7a94, 0xe0cf9c, 0xcdbb88]), None),
        ("reef", Triad([0x1a6a8a, 0x38a8b0, 0xd8cc9a]), None),
        ("lake", Triad([0x1e4a6a, 0x4f7f8a, 0x6f8a5a]), None),
        ("river", Triad([0x23506e, 0x5a8a8a, 0x6a8a50]), None),
        ("volcanic", Triad([0x2a1a18, 0x3a2a26, 0x5a4a44]), None),
        ("arcane", Triad([0x2c1f4a, 0x5a3f8a, 0x9a7ac8]), None),
        (GENERIC_BIOME, Calibration::neutral(), None),
    ]
}

/// Legacy and synonym names -> canonical keys.
const ALIASES: &[(&str, &str)] = &[
    ("grass", "grassland"), ("grasslands", "grassland"), ("prairie", "plains"), ("steppe", "plains"),
    ("woods", "forest"), ("woodland", "forest"), ("rainforest", "jungle"), ("boreal", "taiga"),
    ("dunes", "desert"), ("sand_desert", "desert"), ("mesa", "badlands"), ("saltflat", "salt_flat"),
    ("salt_flats", "salt_flat"), ("bog", "marsh"), ("fen", "marsh"), ("wetland", "swamp"),
    ("wetlands", "swamp"), ("snow", "tundra"), ("snowfield", "tundra"), ("ice", "glacier"),
    ("mountains", "mountain"), ("highlands", "alpine"), ("sea", "ocean"), ("shore", "coast"),
    ("shoreline", "coast"), ("coastal", "coast"), ("sand", "beach"), ("coral", "reef"),
    ("pond", "lake"), ("stream", "river"), ("lava", "volcanic"), ("volcano", "volcanic"),
    ("fey", "arcane"), ("feywild", "arcane"), ("magic", "arcane"), ("default", GENERIC_BIOME),
];

/// Lowercase, trimmed, with spaces and hyphens folded to underscores.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace([' ', '-'], "_")
}

// ============================================================================
// REGISTRY + GRADIENT CACHE
// ============================================================================

/// Biome definitions and alias table.
#[derive(Clone, Debug)]
pub struct BiomeRegistry {
    defs: HashMap<String, BiomeDef>,
    aliases: HashMap<String, String>,
}

impl Default for BiomeRegistry {
    fn default() -> Self {
        let mut reg = Self { defs: HashMap::new(), aliases: HashMap::new() };
        for (key, cal, snow) in builtin_biomes() {
            reg.register(key, cal, snow);
        }
        for (alias, canonical) in ALIASES {
            reg.aliases.insert((*alias).to_string(), (*canonical).to_string());
        }
        reg
    }
}

impl BiomeRegistry {
    /// Register or replace a biome. Malformed calibration degrades to the neutral triad.
    /// Returns the canonical key.
    pub fn register(&mut self, key: &str, calibration: Calibration, snow_line: Option<i32>) -> String {
        let key = normalize_key(key);
        let calibration = match calibration.validate(&key) {
            Ok(()) => calibration,
            Err(e) => {
                warn!("biome palette: {}; using neutral triad", e);
                Calibration::neutral()
            }
        };
        let traits = BiomeTraits::classify(&key);
        let snow_line = match (traits.cold, snow_line) {
            (true, None) => Some(MAX_HEIGHT / 2),
            (_, s) => s.map(clamp_height),
        };
        self.aliases.remove(&key);
        self.defs.insert(key.clone(), BiomeDef { key: key.clone(), traits, calibration, snow_line });
        key
    }

    pub fn add_alias(&mut self, alias: &str, canonical: &str) {
        let alias = normalize_key(alias);
        if self.defs.contains_key(&alias) { return; }
        self.aliases.insert(alias, normalize_key(canonical));
    }

    /// Canonical key for any name. Unknown names resolve to `GENERIC_BIOME`.
    pub fn resolve_key(&self, key: &str) -> &str {
        let norm = normalize_key(key);
        if let Some((k, _)) = self.defs.get_key_value(&norm) {
            return k.as_str();
        }
        if let Some((k, _)) = self.aliases.get(&norm).and_then(|t| self.defs.get_key_value(t)) {
            return k.as_str();
        }
        GENERIC_BIOME
    }

    /// True when the name is registered directly or through an alias.
    pub fn is_known(&self, key: &str) -> bool {
        let norm = normalize_key(key);
        self.defs.contains_key(&norm) || self.aliases.get(&norm).is_some_and(|t| self.defs.contains_key(t))
    }

    /// Definition for any name (aliases resolved, unknown names -> generic).
    pub fn resolve(&self, key: &str) -> &BiomeDef {
        let canonical = self.resolve_key(key);
        self.defs
            .get(canonical)
            .or_else(|| self.defs.get(GENERIC_BIOME))
            .unwrap_or_else(|| fallback_generic())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.defs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize { self.defs.len() }
    pub fn is_empty(&self) -> bool { self.defs.is_empty() }

    /// Parse a JSON array of `CalibrationEntry` and register every entry that validates.
    /// Invalid entries are skipped with a warning; returns the canonical keys registered.
    pub fn load_json(&mut self, json: &str) -> Result<Vec<String>, CalibrationError> {
        let entries: Vec<CalibrationEntry> = serde_json::from_str(json)?;
        let mut registered = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry.calibration() {
                Ok(cal) => {
                    let key = self.register(&entry.key, cal, entry.snow_line);
                    for alias in &entry.aliases {
                        self.add_alias(alias, &key);
                    }
                    registered.push(key);
                }
                Err(e) => warn!("biome palette: skipping entry: {}", e),
            }
        }
        info!("biome palette: loaded {} calibration entries", registered.len());
        Ok(registered)
    }
}

/// The registry always holds the generic biome; this only guards a hand-emptied registry.
fn fallback_generic() -> &'static BiomeDef {
    use std::sync::OnceLock;
    static GENERIC: OnceLock<BiomeDef> = OnceLock::new();
    GENERIC.get_or_init(|| BiomeDef {
        key: GENERIC_BIOME.to_string(),
        traits: BiomeTraits::classify(GENERIC_BIOME),
        calibration: Calibration::neutral(),
        snow_line: None,
    })
}

/// Lazily built height -> base color tables, one per canonical key.
#[derive(Clone, Debug, Default)]
pub struct GradientCache {
    tables: HashMap<String, Vec<Srgba>>,
}

impl GradientCache {
    /// Base color for a biome at a height. Heights are clamped before indexing.
    pub fn lookup(&mut self, def: &BiomeDef, height: i32) -> Srgba {
        let table = self
            .tables
            .entry(def.key.clone())
            .or_insert_with(|| def.calibration.build_gradient());
        debug_assert_eq!(table.len(), HEIGHT_LEVELS);
        table[(clamp_height(height) - MIN_HEIGHT) as usize]
    }

    pub fn contains(&self, key: &str) -> bool { self.tables.contains_key(key) }

    pub fn invalidate(&mut self, key: &str) {
        self.tables.remove(key);
    }

    pub fn len(&self) -> usize { self.tables.len() }
    pub fn is_empty(&self) -> bool { self.tables.is_empty() }
}
