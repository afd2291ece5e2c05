// SPDX-License-Identifier: MIT
// Copyright (c) 2026 PlanetPOI contributors

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const ALT_KEY: &str = "planetpoi_calc_with_altitude";
pub const ROWS_KEY: &str = "planetpoi_max_overlay_rows";
pub const LEFT_KEY: &str = "planetpoi_overlay_leftmargin";
pub const SHOW_GUI_INFO_KEY: &str = "planetpoi_show_gui_info";
pub const HEADING_GUIDANCE_KEY: &str = "planetpoi_heading_guidance";
pub const GUIDANCE_THRESHOLD_KEY: &str = "planetpoi_guidance_threshold";
pub const GUIDANCE_DISTANCE_KEY: &str = "planetpoi_guidance_distance";
pub const AUTO_UPDATE_KEY: &str = "PlanetPOI_AutoUpdate";

/// Host key-value configuration.
pub trait ConfigStore {
    /// Value stored under `key`, or `default` when the key was never set.
    fn get_int_or(&self, key: &str, default: i64) -> i64;
    fn set_int(&mut self, key: &str, value: i64);

    /// Missing keys read as 0.
    fn get_int(&self, key: &str) -> i64 {
        self.get_int_or(key, 0)
    }

    /// Flushes pending writes, if the store buffers them.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Typed view over the plugin's keys.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub calc_with_altitude: bool,
    pub max_overlay_rows: usize,
    pub overlay_left_margin: i32,
    pub show_gui_info: bool,
    pub heading_guidance: bool,
    /// Degrees.
    pub guidance_threshold: u32,
    /// Metres.
    pub guidance_distance: u32,
    pub auto_update: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            calc_with_altitude: false,
            max_overlay_rows: 10,
            overlay_left_margin: 500,
            show_gui_info: true,
            heading_guidance: true,
            guidance_threshold: 4,
            guidance_distance: 2000,
            auto_update: true,
        }
    }
}

impl Settings {
    /// Reads settings, writing defaults back for keys that are unset.
    ///
    /// 0 counts as unset for the numeric keys. The toggles that default
    /// to on are seeded only when their own key is missing, so a user who
    /// switched one off keeps it off.
    pub fn load_or_init(store: &mut dyn ConfigStore) -> Self {
        let defaults = Self::default();

        let mut seed = |key: &str, value: i64| -> i64 {
            let current = store.get_int(key);
            if current == 0 {
                store.set_int(key, value);
                value
            } else {
                current
            }
        };

        let max_overlay_rows = seed(ROWS_KEY, defaults.max_overlay_rows as i64);
        let overlay_left_margin = seed(LEFT_KEY, defaults.overlay_left_margin as i64);
        let guidance_threshold = seed(GUIDANCE_THRESHOLD_KEY, defaults.guidance_threshold as i64);
        let guidance_distance = seed(GUIDANCE_DISTANCE_KEY, defaults.guidance_distance as i64);

        for key in [SHOW_GUI_INFO_KEY, HEADING_GUIDANCE_KEY, AUTO_UPDATE_KEY] {
            if store.get_int_or(key, -1) == -1 {
                store.set_int(key, 1);
                log::info!("Initialized {} to on", key);
            }
        }

        Self {
            calc_with_altitude: store.get_int(ALT_KEY) != 0,
            max_overlay_rows: max_overlay_rows.max(0) as usize,
            overlay_left_margin: clamp_i32(overlay_left_margin),
            show_gui_info: store.get_int(SHOW_GUI_INFO_KEY) != 0,
            heading_guidance: store.get_int(HEADING_GUIDANCE_KEY) != 0,
            guidance_threshold: clamp_u32(guidance_threshold),
            guidance_distance: clamp_u32(guidance_distance),
            auto_update: store.get_int(AUTO_UPDATE_KEY) != 0,
        }
    }

    /// Writes every key back to the store.
    pub fn store(&self, store: &mut dyn ConfigStore) {
        store.set_int(ALT_KEY, self.calc_with_altitude as i64);
        store.set_int(ROWS_KEY, self.max_overlay_rows as i64);
        store.set_int(LEFT_KEY, self.overlay_left_margin as i64);
        store.set_int(SHOW_GUI_INFO_KEY, self.show_gui_info as i64);
        store.set_int(HEADING_GUIDANCE_KEY, self.heading_guidance as i64);
        store.set_int(GUIDANCE_THRESHOLD_KEY, self.guidance_threshold as i64);
        store.set_int(GUIDANCE_DISTANCE_KEY, self.guidance_distance as i64);
        store.set_int(AUTO_UPDATE_KEY, self.auto_update as i64);
    }
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

fn clamp_u32(v: i64) -> u32 {
    v.clamp(0, u32::MAX as i64) as u32
}

/// In-memory store, for tests and hosts without persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    values: BTreeMap<String, i64>,
}

impl ConfigStore for MemoryConfigStore {
    fn get_int_or(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), value);
    }
}

/// `settings.json` under the config root, used by the command-line front end.
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    config_path: PathBuf,
    values: BTreeMap<String, i64>,
}

impl JsonConfigStore {
    pub const FILE_NAME: &'static str = "settings.json";

    pub fn open_default() -> Result<Self> {
        Self::open(crate::get_config_root().join(Self::FILE_NAME))
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_path = path.as_ref().to_path_buf();
        let values = if config_path.exists() {
            let content =
                fs::read_to_string(&config_path).context("Failed to read settings.json")?;
            serde_json::from_str(&content).context("Failed to parse settings.json")?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            config_path,
            values,
        })
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }

        let content =
            serde_json::to_string_pretty(&self.values).context("Failed to serialize settings")?;

        fs::write(&self.config_path, content).context("Failed to write settings.json")
    }
}

impl ConfigStore for JsonConfigStore {
    fn get_int_or(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), value);
    }

    fn flush(&mut self) -> Result<()> {
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_run_writes_defaults() {
        let mut store = MemoryConfigStore::default();
        let settings = Settings::load_or_init(&mut store);
        assert_eq!(settings, Settings::default());
        assert_eq!(store.get_int(GUIDANCE_DISTANCE_KEY), 2000);
        assert_eq!(store.get_int(HEADING_GUIDANCE_KEY), 1);
    }

    #[test]
    fn test_user_choices_survive_reload() {
        let mut store = MemoryConfigStore::default();
        let mut settings = Settings::load_or_init(&mut store);
        settings.heading_guidance = false;
        settings.guidance_threshold = 7;
        settings.calc_with_altitude = true;
        settings.store(&mut store);

        let reloaded = Settings::load_or_init(&mut store);
        assert!(!reloaded.heading_guidance);
        assert!(reloaded.calc_with_altitude);
        assert_eq!(reloaded.guidance_threshold, 7);
    }

    #[test]
    fn test_toggles_kept_when_rows_stored_as_zero() {
        let mut store = MemoryConfigStore::default();
        let mut settings = Settings::load_or_init(&mut store);
        settings.heading_guidance = false;
        settings.show_gui_info = false;
        settings.auto_update = false;
        settings.max_overlay_rows = 0;
        settings.store(&mut store);

        let reloaded = Settings::load_or_init(&mut store);
        assert!(!reloaded.heading_guidance);
        assert!(!reloaded.show_gui_info);
        assert!(!reloaded.auto_update);
        assert_eq!(reloaded.max_overlay_rows, 10);
        assert_eq!(store.get_int(HEADING_GUIDANCE_KEY), 0);
    }

    #[test]
    fn test_missing_toggle_is_seeded_alone() {
        let mut store = MemoryConfigStore::default();
        store.set_int(ROWS_KEY, 5);
        store.set_int(HEADING_GUIDANCE_KEY, 0);

        let settings = Settings::load_or_init(&mut store);
        assert!(!settings.heading_guidance);
        assert!(settings.show_gui_info);
        assert!(settings.auto_update);
        assert_eq!(settings.max_overlay_rows, 5);
        assert_eq!(store.get_int_or(AUTO_UPDATE_KEY, -1), 1);
    }

    #[test]
    fn test_zero_distance_falls_back_to_default() {
        let mut store = MemoryConfigStore::default();
        Settings::load_or_init(&mut store);
        store.set_int(GUIDANCE_DISTANCE_KEY, 0);
        let settings = Settings::load_or_init(&mut store);
        assert_eq!(settings.guidance_distance, 2000);
    }

    #[test]
    fn test_json_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(JsonConfigStore::FILE_NAME);

        let mut store = JsonConfigStore::open(&path).unwrap();
        Settings::load_or_init(&mut store);
        store.set_int(LEFT_KEY, 320);
        store.flush().unwrap();

        let reopened = JsonConfigStore::open(&path).unwrap();
        assert_eq!(reopened.get_int(LEFT_KEY), 320);
        assert_eq!(reopened.get_int(ROWS_KEY), 10);
    }
}
