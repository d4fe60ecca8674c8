//! Display tuning loaded from an optional TOML file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

/// Window and projection settings for the macroquad backend.
///
/// Every field has a default, so a config file only needs to name the values
/// it overrides. A missing file means defaults.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Window width in logical pixels.
    pub window_width: i32,
    /// Window height in logical pixels.
    pub window_height: i32,
    /// Rays cast per frame; one per rendered wall column.
    pub ray_count: usize,
    /// Angular width of the visible cone in degrees.
    pub fov_degrees: f32,
    /// Whether the top-down overview is drawn.
    pub show_minimap: bool,
    /// Degrees of rotation per pixel of horizontal mouse travel.
    pub mouse_sensitivity: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 600,
            ray_count: 120,
            fov_degrees: 60.0,
            show_minimap: true,
            mouse_sensitivity: 0.2,
        }
    }
}

impl DisplayConfig {
    /// Loads a configuration from the provided TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read display config {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse display config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_projection() {
        let config = DisplayConfig::default();
        assert_eq!(config.window_width, 800);
        assert_eq!(config.window_height, 600);
        assert_eq!(config.ray_count, 120);
        assert_eq!(config.fov_degrees, 60.0);
        assert!(config.show_minimap);
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config: DisplayConfig =
            toml::from_str("ray_count = 240\nshow_minimap = false").expect("parse");
        assert_eq!(config.ray_count, 240);
        assert!(!config.show_minimap);
        assert_eq!(config.window_width, 800);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed: Result<DisplayConfig, _> = toml::from_str("raycount = 240");
        assert!(parsed.is_err());
    }
}
