//! Settings management

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use towpath_core::Theme;

use crate::ServicesError;

/// App settings, read from a JSON file when one exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub map: MapSettings,
    /// Seconds between friend-location polls.
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    pub day_style_url: String,
    pub night_style_url: String,
    /// Tile URL template for the waterway vector layer.
    pub waterway_tiles: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
        }
    }
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            day_style_url: "https://tiles.openfreemap.org/styles/bright".to_string(),
            night_style_url: "https://tiles.openfreemap.org/styles/dark".to_string(),
            waterway_tiles: "http://localhost:8000/features/mvt/canals/{z}/{x}/{y}".to_string(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            map: MapSettings::default(),
            poll_interval_secs: 30,
        }
    }
}

impl Settings {
    /// Load from `path`; a missing file means defaults, a malformed one is
    /// an error worth surfacing.
    pub fn load(path: &Path) -> Result<Self, ServicesError> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Poll period, never below one second: a zero in the settings file
    /// must not take the poll loop down with it.
    pub fn poll_period(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// Style name and URL for a theme.
    pub fn style_for(&self, theme: Theme) -> (&'static str, &str) {
        match theme {
            Theme::Day => ("day", self.map.day_style_url.as_str()),
            Theme::Night => ("night", self.map.night_style_url.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let settings: Settings =
            serde_json::from_str(r#"{"api": {"base_url": "https://api.towpath.example"}}"#).unwrap();
        assert_eq!(settings.api.base_url, "https://api.towpath.example");
        assert_eq!(settings.poll_interval_secs, 30);
        assert!(settings.map.waterway_tiles.contains("{z}/{x}/{y}"));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let settings = Settings::load(Path::new("/nonexistent/towpath-settings.json")).unwrap();
        assert_eq!(settings.api.base_url, "http://localhost:8000");
    }

    #[test]
    fn zero_poll_interval_clamps_to_a_real_period() {
        let settings: Settings = serde_json::from_str(r#"{"poll_interval_secs": 0}"#).unwrap();
        assert_eq!(settings.poll_period(), Duration::from_secs(1));
    }

    #[test]
    fn styles_follow_the_theme() {
        let settings = Settings::default();
        let (name, url) = settings.style_for(Theme::Night);
        assert_eq!(name, "night");
        assert_eq!(url, settings.map.night_style_url);
    }
}
