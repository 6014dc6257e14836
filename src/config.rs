use anyhow::{Context, Result};
use dirs::{config_dir, data_dir};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::modules::toastr::Level;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub enabled: bool,
    pub capture_levels: Vec<Level>,
    pub long_press_ms: u64,
    pub save_debounce_ms: u64,
    pub toast_timeout_ms: u64,
    pub max_live_toasts: usize,
    pub history_limit: Option<usize>,
    pub settings_path: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            capture_levels: Level::ALL.to_vec(),
            long_press_ms: 500,
            save_debounce_ms: 1000,
            toast_timeout_ms: 5000,
            max_live_toasts: 5,
            history_limit: None,
            settings_path: None,
            log_file: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            let toml = toml::to_string_pretty(&Config::default())?;
            if let Some(parent) = path.parent() { fs::create_dir_all(parent)?; }
            fs::write(&path, toml)?;
        }
        let content = fs::read_to_string(&path).with_context(|| format!("Reading {:?}", &path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Parsing config TOML")
    }

    pub fn long_press(&self) -> Duration { Duration::from_millis(self.long_press_ms) }
    pub fn save_debounce(&self) -> Duration { Duration::from_millis(self.save_debounce_ms) }
    pub fn toast_timeout(&self) -> Duration { Duration::from_millis(self.toast_timeout_ms) }

    pub fn settings_file(&self) -> Result<PathBuf> {
        match &self.settings_path {
            Some(p) => Ok(p.clone()),
            None => Ok(app_dir(config_dir())?.join("settings.json")),
        }
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        match &self.log_file {
            Some(p) => Ok(p.clone()),
            None => Ok(app_dir(data_dir())?.join("toasthistory.log")),
        }
    }
}

fn app_dir(base: Option<PathBuf>) -> Result<PathBuf> {
    let base = base.context("Could not determine config directory")?;
    Ok(base.join("toasthistory"))
}

fn config_path() -> Result<PathBuf> {
    Ok(app_dir(config_dir())?.join("config.toml"))
}
