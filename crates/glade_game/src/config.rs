//! Game configuration.
//!
//! Every field has a default, so the config file is optional and may name
//! only the values it wants to change.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub map_path: PathBuf,
    /// When unset the built-in catalog is used.
    pub animation_catalog_path: Option<PathBuf>,
    pub sprite_dir: PathBuf,
    pub store_path: PathBuf,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub player: PlayerConfig,
    pub collision: CollisionConfig,
    pub camera: CameraConfig,
    pub editor_enabled: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Cardinal speed in world pixels per second.
    pub speed: f32,
    /// Scale diagonal velocity back to `speed`. Off keeps the observed
    /// uncompensated diagonal.
    pub normalize_diagonal: bool,
    pub spawn_tile: (u32, u32),
    pub body_width: f32,
    pub body_height: f32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Obstacle rectangle size relative to its tile.
    pub hitbox_scale: f32,
    /// Run the per-step push-out pass after move-and-slide.
    pub manual_overlap_correction: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub intro_zoom_factor: f32,
    pub follow_zoom: f32,
    pub follow_lerp: f32,
    pub follow_delay_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_path: PathBuf::from("assets/maps/meadow.json"),
            animation_catalog_path: None,
            sprite_dir: PathBuf::from("assets/sprites"),
            store_path: PathBuf::from("saves/store.json"),
            viewport_width: 800,
            viewport_height: 600,
            player: PlayerConfig::default(),
            collision: CollisionConfig::default(),
            camera: CameraConfig::default(),
            editor_enabled: true,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 150.0,
            normalize_diagonal: false,
            spawn_tile: (4, 4),
            body_width: 14.0,
            body_height: 12.0,
        }
    }
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            hitbox_scale: 0.75,
            manual_overlap_correction: true,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            intro_zoom_factor: 0.85,
            follow_zoom: 1.2,
            follow_lerp: 0.1,
            follow_delay_ms: 2000,
        }
    }
}

/// Load the config at `path`. A missing file yields defaults; an unreadable
/// or invalid one is an error.
pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    if !path.exists() {
        log::info!(
            "Config '{}' not found, using built-in defaults",
            path.display()
        );
        return Ok(GameConfig::default());
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.viewport_width == 0 || config.viewport_height == 0 {
        return Err("Config validation failed: viewport must be non-empty".to_string());
    }
    if config.player.speed < 0.0 {
        return Err("Config validation failed: player.speed must be >= 0".to_string());
    }
    if config.player.body_width <= 0.0 || config.player.body_height <= 0.0 {
        return Err("Config validation failed: player body must be > 0".to_string());
    }
    if !(config.collision.hitbox_scale > 0.0 && config.collision.hitbox_scale <= 1.0) {
        return Err("Config validation failed: collision.hitbox_scale must be in (0, 1]".to_string());
    }
    if config.camera.intro_zoom_factor <= 0.0 || config.camera.follow_zoom <= 0.0 {
        return Err("Config validation failed: camera zoom values must be > 0".to_string());
    }
    if !(0.0..=1.0).contains(&config.camera.follow_lerp) {
        return Err("Config validation failed: camera.follow_lerp must be in [0, 1]".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "glade_config_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config_from_path(Path::new("no/such/config.json")).expect("defaults");
        assert_eq!(config.player.speed, 150.0);
        assert_eq!(config.camera.follow_delay_ms, 2000);
        assert!(!config.player.normalize_diagonal);
        assert!(config.collision.manual_overlap_correction);
    }

    #[test]
    fn shipped_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/config/game.json");
        let config = load_config_from_path(&path).expect("shipped config should load");
        assert_eq!(config.player.spawn_tile, (4, 4));
        assert_eq!(config.viewport_width, 800);
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let path = temp_file_path("partial");
        fs::write(&path, r#"{ "player": { "speed": 90.0 }, "camera": { "follow_zoom": 2.0 } }"#)
            .expect("write temp file");

        let config = load_config_from_path(&path).expect("partial config should load");
        assert_eq!(config.player.speed, 90.0);
        assert_eq!(config.player.spawn_tile, (4, 4));
        assert_eq!(config.camera.follow_zoom, 2.0);
        assert_eq!(config.camera.follow_lerp, 0.1);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn invalid_hitbox_scale_is_rejected() {
        let path = temp_file_path("hitbox");
        fs::write(&path, r#"{ "collision": { "hitbox_scale": 1.5 } }"#).expect("write temp file");

        let err = load_config_from_path(&path).expect_err("scale > 1 should fail");
        assert!(err.contains("hitbox_scale"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let path = temp_file_path("malformed");
        fs::write(&path, "{ not json").expect("write temp file");

        let err = load_config_from_path(&path).expect_err("bad json should fail");
        assert!(err.contains("Failed to parse config JSON"));

        let _ = fs::remove_file(path);
    }
}
