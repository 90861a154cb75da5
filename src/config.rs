use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::HexColor;
use crate::error::ConfigError;
use crate::preview::FillMode;
use crate::state::{INITIAL_COLOR, SOLIDS};

const APP_DIR: &str = "tee-tint";

/// Settings file. Only preferences live here; picked colors are never saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub initial_color: String,
    pub swatches: Vec<String>,
    pub fill_mode: FillMode,
    pub product_image: Option<PathBuf>,
    pub download_dir: Option<PathBuf>,
    pub autocopy: bool,
    pub show_label: bool,
    /// Seconds a Linux clipboard write keeps serving the image.
    pub clipboard_wait_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            initial_color: INITIAL_COLOR.to_string(),
            swatches: SOLIDS.iter().map(|s| s.to_string()).collect(),
            fill_mode: FillMode::default(),
            product_image: None,
            download_dir: None,
            autocopy: false,
            show_label: true,
            clipboard_wait_secs: 30,
        }
    }
}

impl AppConfig {
    /// Configured start color, or the built-in one if the setting is malformed.
    pub fn initial_color(&self) -> HexColor {
        match HexColor::parse(&self.initial_color) {
            Ok(hex) => hex,
            Err(err) => {
                tracing::warn!(
                    "config: initial color {:?} ignored: {}",
                    self.initial_color,
                    err
                );
                HexColor::from_rgb(0x33, 0x41, 0x55)
            }
        }
    }

    /// Configured swatches, skipping malformed entries.
    pub fn swatches(&self) -> Vec<HexColor> {
        self.swatches
            .iter()
            .filter_map(|s| match HexColor::parse(s) {
                Ok(hex) => Some(hex),
                Err(err) => {
                    tracing::warn!("config: swatch {:?} ignored: {}", s, err);
                    None
                }
            })
            .collect()
    }

    /// Download directory, defaulting to the working directory.
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

pub fn config_path() -> PathBuf {
    if let Ok(dir) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(dir).join(APP_DIR).join("config.json");
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join("config.json");
    }
    PathBuf::from("config.json")
}

/// Read settings from `path`. A missing file gives defaults; a broken one
/// is reported and also gives defaults.
pub fn load_config(path: &Path) -> AppConfig {
    match try_load_config(path) {
        Ok(Some(cfg)) => cfg,
        Ok(None) => {
            tracing::debug!("config: {} not found, using defaults", path.display());
            AppConfig::default()
        }
        Err(err) => {
            tracing::warn!("config: {} unreadable, using defaults: {}", path.display(), err);
            AppConfig::default()
        }
    }
}

pub fn try_load_config(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    Ok(Some(serde_json::from_str(&data)?))
}

pub fn save_config(path: &Path, cfg: &AppConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let data = serde_json::to_string_pretty(cfg)?;
    fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nope.json");
        assert!(try_load_config(&path).unwrap().is_none());
        assert_eq!(load_config(&path), AppConfig::default());
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tee-tint").join("config.json");
        let cfg = AppConfig {
            initial_color: "#800220".into(),
            fill_mode: FillMode::Background,
            download_dir: Some(PathBuf::from("/tmp/out")),
            autocopy: true,
            show_label: false,
            ..AppConfig::default()
        };
        save_config(&path, &cfg).unwrap();
        assert_eq!(load_config(&path), cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{ "fill_mode": "background" }"#).unwrap();
        let cfg = load_config(&path);
        assert_eq!(cfg.fill_mode, FillMode::Background);
        assert_eq!(cfg.initial_color, INITIAL_COLOR);
        assert!(cfg.show_label);
        assert_eq!(cfg.clipboard_wait_secs, 30);
        assert_eq!(cfg.swatches().len(), SOLIDS.len());
    }

    #[test]
    fn broken_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(try_load_config(&path).is_err());
        assert_eq!(load_config(&path), AppConfig::default());
    }

    #[test]
    fn malformed_colors_are_skipped() {
        let cfg = AppConfig {
            initial_color: "#12".into(),
            swatches: vec!["#fff".into(), "nope".into(), "#101213".into()],
            ..AppConfig::default()
        };
        assert_eq!(cfg.initial_color().as_str(), "#334155");
        let swatches: Vec<String> = cfg.swatches().iter().map(|s| s.to_string()).collect();
        assert_eq!(swatches, vec!["#fff", "#101213"]);
    }
}
