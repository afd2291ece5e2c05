// SPDX-License-Identifier: MIT
// Copyright (c) 2026 PlanetPOI contributors

pub mod autocomplete;
pub mod background;
pub mod geodesy;
pub mod guidance;
pub mod overlay;
pub mod release;
pub mod session;
pub mod settings;
pub mod share;
pub mod store;

use std::path::PathBuf;
use std::{env, fs};
use thiserror::Error;

use store::NodeId;

/// Name reported to the host on startup.
pub const PLUGIN_NAME: &str = "PlanetPOI";

/// File name of the POI tree inside the configuration root.
pub const POI_FILE_NAME: &str = "poi.json";

#[derive(Error, Debug)]
pub enum PoiError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No item with id {0}")]
    UnknownNode(NodeId),
    #[error("Item {0} is not a folder")]
    NotAFolder(NodeId),
    #[error("Moving item {moved} into {destination} would place it inside itself")]
    WouldCreateCycle { moved: NodeId, destination: NodeId },
    #[error("Latitude and longitude must both be given or both be empty")]
    PartialCoordinates,
    #[error("Invalid number for {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    #[error("No surface position is known")]
    NoSurfacePosition,
}

/// Returns the directory holding the POI file and settings.
///
/// `PLANET_POI_CONFIG_DIR` wins over the platform config directory so tests
/// and portable installs can redirect everything.
pub fn get_config_root() -> PathBuf {
    if let Ok(dir) = env::var("PLANET_POI_CONFIG_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }

    directories::ProjectDirs::from("org", "planet-poi", "PlanetPOI")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".planet_poi"))
}

/// Default location of the POI tree, creating the config root if needed.
pub fn default_poi_path() -> PathBuf {
    let root = get_config_root();
    if !root.exists() {
        if let Err(e) = fs::create_dir_all(&root) {
            log::warn!(
                "Could not create config directory {}: {}",
                root.display(),
                e
            );
        }
    }
    root.join(POI_FILE_NAME)
}

/// Host startup hook: returns the plugin name after making sure the
/// configuration root exists.
pub fn on_start(plugin_dir: &std::path::Path) -> &'static str {
    log::info!(
        "{} starting — plugin_dir={} config_root={}",
        PLUGIN_NAME,
        plugin_dir.display(),
        get_config_root().display()
    );
    PLUGIN_NAME
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_root_env_override() {
        let dir = tempfile::tempdir().unwrap();
        env::set_var("PLANET_POI_CONFIG_DIR", dir.path());
        assert_eq!(get_config_root(), dir.path());
        assert_eq!(default_poi_path(), dir.path().join(POI_FILE_NAME));
        assert_eq!(on_start(dir.path()), PLUGIN_NAME);
        env::remove_var("PLANET_POI_CONFIG_DIR");
    }
}
