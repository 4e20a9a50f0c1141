use crate::constants::{DEFAULT_PIXELS_PER_LEVEL, DEFAULT_SEED, DEFAULT_TILE_WIDTH};
use crate::settings::{RichShadingConfig, TerrainSettings, load_settings_from, parse_settings, save_settings_to};

#[test]
fn empty_json_yields_defaults() {
    let s = parse_settings("{}");
    assert_eq!(s, TerrainSettings::default());
    assert_eq!(s.shading.density, 0.55);
    assert_eq!(s.shading.effective_seed(), DEFAULT_SEED);
    assert_eq!(s.projection.tile_width, DEFAULT_TILE_WIDTH);
}

#[test]
fn partial_json_keeps_other_defaults() {
    let s = parse_settings(r#"{"shading": {"density": 0.9, "seed": 77}, "projection": {"pixels_per_level": 4.0}, "biome": "tundra"}"#);
    assert_eq!(s.shading.density, 0.9);
    assert_eq!(s.shading.seed, Some(77));
    assert_eq!(s.shading.intensity, 1.0);
    assert_eq!(s.projection.pixels_per_level, 4.0);
    assert_eq!(s.projection.tile_width, DEFAULT_TILE_WIDTH);
    assert_eq!(s.biome.as_deref(), Some("tundra"));
}

#[test]
fn malformed_json_falls_back() {
    let s = parse_settings("{\"shading\": [1, 2");
    assert_eq!(s, TerrainSettings::default());
    assert_eq!(s.projection.pixels_per_level, DEFAULT_PIXELS_PER_LEVEL);
}

#[test]
fn out_of_range_values_are_sanitized_on_load() {
    let s = parse_settings(r#"{"shading": {"density": 4.0, "intensity": -1.0, "slope_gain": 1000.0}}"#);
    assert_eq!(s.shading.density, 1.0);
    assert_eq!(s.shading.intensity, 0.0);
    assert_eq!(s.shading.slope_gain, 8.0);
}

#[test]
fn non_finite_knobs_reset_to_defaults() {
    let cfg = RichShadingConfig { map_freq: f32::NAN, intensity: f32::INFINITY, ..Default::default() };
    let clean = cfg.sanitized();
    assert_eq!(clean.map_freq, RichShadingConfig::default().map_freq);
    assert_eq!(clean.intensity, 1.0);
}

#[test]
fn settings_serialize_back_to_the_same_values() {
    let original = TerrainSettings {
        shading: RichShadingConfig { density: 0.3, seed: Some(123), aspect_hue_bias: -0.1, ..Default::default() },
        biome: Some("ocean".into()),
        ..Default::default()
    };
    let json = serde_json::to_string(&original).expect("serializable");
    assert_eq!(parse_settings(&json), original);
}

#[test]
fn settings_file_round_trip() {
    let dir = std::env::temp_dir().join(format!("isoterrain-settings-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("settings.json");

    assert_eq!(load_settings_from(&path), TerrainSettings::default(), "missing file");

    let saved = TerrainSettings { biome: Some("glacier".into()), ..Default::default() };
    assert!(save_settings_to(&saved, &path));
    assert_eq!(load_settings_from(&path), saved);

    std::fs::write(&path, "not json").expect("overwrite");
    assert_eq!(load_settings_from(&path), TerrainSettings::default());
    let _ = std::fs::remove_dir_all(&dir);
}
