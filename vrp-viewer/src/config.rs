//! Viewer configuration.

use std::path::Path;

use reqwest::Url;
use serde::Deserialize;

use crate::{Coordinate, ViewerError};

/// Environment variable with the path to the configuration file.
pub const CONFIG_ENV_VAR: &str = "VRP_VIEWER_CONFIG";
/// Configuration file used when [`CONFIG_ENV_VAR`] is not set.
pub const DEFAULT_CONFIG_FILE: &str = "vrp_viewer.json";

/// Endpoints and initial map view.
///
/// Every field has a default, so a configuration file only needs the values that differ:
///
/// ```json
/// { "base_url": "http://solver.local:8080/", "z_level": 14 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Url the other paths are resolved against.
    pub base_url: String,
    /// Path of the solve endpoint.
    pub solve_path: String,
    /// Path of the road network GeoJSON document.
    pub roads_path: String,
    /// Path of the taxi ranks GeoJSON document.
    pub taxi_ranks_path: String,
    /// Initial center of the map.
    pub center: Coordinate,
    /// Initial zoom level on the web tile schema.
    pub z_level: u32,
    /// Folder for cached map tiles. Ignored in the browser.
    pub tile_cache: Option<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/".to_string(),
            solve_path: "solve-vrp".to_string(),
            roads_path: "data/roads.geojson".to_string(),
            taxi_ranks_path: "data/taxi_ranks.geojson".to_string(),
            center: Coordinate::new(38.7223, -9.1393),
            z_level: 13,
            tile_cache: Some(".tile_cache".to_string()),
        }
    }
}

impl ViewerConfig {
    /// Reads configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ViewerError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    /// Parses configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ViewerError> {
        serde_json::from_str(json).map_err(|err| ViewerError::Config(err.to_string()))
    }

    /// Reads configuration from the file named by [`CONFIG_ENV_VAR`], or from
    /// [`DEFAULT_CONFIG_FILE`] if it exists. Falls back to the defaults.
    ///
    /// A file that is named explicitly but cannot be read is an error.
    pub fn from_env() -> Result<Self, ViewerError> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::load(path);
        }

        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::load(DEFAULT_CONFIG_FILE);
        }

        Ok(Self::default())
    }

    /// Returns a copy with a different base url.
    pub fn with_base_url(self, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..self
        }
    }

    /// Solve endpoint.
    pub fn solve_url(&self) -> Result<Url, ViewerError> {
        self.resolve(&self.solve_path)
    }

    /// Road network document.
    pub fn roads_url(&self) -> Result<Url, ViewerError> {
        self.resolve(&self.roads_path)
    }

    /// Taxi ranks document.
    pub fn taxi_ranks_url(&self) -> Result<Url, ViewerError> {
        self.resolve(&self.taxi_ranks_path)
    }

    fn resolve(&self, path: &str) -> Result<Url, ViewerError> {
        Url::parse(&self.base_url)
            .and_then(|base| base.join(path))
            .map_err(|err| ViewerError::Config(format!("cannot resolve {path:?}: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use insta::assert_compact_debug_snapshot;

    use super::*;

    #[test]
    fn defaults_point_to_lisbon_and_local_solver() {
        let config = ViewerConfig::default();

        assert_eq!(config.center, Coordinate::new(38.7223, -9.1393));
        assert_eq!(config.z_level, 13);
        assert_eq!(
            config.solve_url().unwrap().as_str(),
            "http://localhost:5000/solve-vrp"
        );
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config =
            ViewerConfig::from_json(r#"{"base_url": "https://vrp.example.org/app/", "z_level": 15}"#)
                .unwrap();

        assert_eq!(config.z_level, 15);
        assert_eq!(config.roads_path, "data/roads.geojson");
        assert_eq!(
            config.roads_url().unwrap().as_str(),
            "https://vrp.example.org/app/data/roads.geojson"
        );
    }

    #[test]
    fn base_url_without_trailing_slash() {
        let config = ViewerConfig::default().with_base_url("http://127.0.0.1:8080");
        assert_eq!(
            config.solve_url().unwrap().as_str(),
            "http://127.0.0.1:8080/solve-vrp"
        );
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        let config = ViewerConfig::default().with_base_url("not a url");
        assert_compact_debug_snapshot!(
            config.solve_url(),
            @r#"Err(Config("cannot resolve \"solve-vrp\": relative URL without a base"))"#
        );
    }

    #[test]
    fn malformed_json_is_config_error() {
        assert_matches!(
            ViewerConfig::from_json(r#"{"z_level": "high"}"#),
            Err(ViewerError::Config(_))
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        assert_matches!(
            ViewerConfig::load("does/not/exist.json"),
            Err(ViewerError::Io(_))
        );
    }
}
