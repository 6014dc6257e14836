use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::modules::toastr::Level;

/// One standing suppression rule as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HideEntry {
    pub text_content: String,
    pub level: Level,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub hide_list: Vec<HideEntry>,
}

// Levels stay plain strings on the way in so one bad entry does not sink the whole file.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawSettings {
    hide_list: Vec<RawHideEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHideEntry {
    #[serde(default)]
    text_content: String,
    level: String,
}

impl Settings {
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: RawSettings = serde_json::from_str(content).context("Parsing settings JSON")?;
        let mut settings = Settings::default();
        for entry in raw.hide_list {
            let level = match entry.level.parse::<Level>() {
                Ok(level) => level,
                Err(e) => {
                    log::warn!("dropping block-list entry '{}': {}", entry.text_content, e);
                    continue;
                }
            };
            let entry = HideEntry { text_content: entry.text_content, level };
            if !settings.hide_list.contains(&entry) {
                settings.hide_list.push(entry);
            }
        }
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads the settings file. A missing or unreadable file yields empty settings;
    /// an unreadable one is first moved to `<name>.bak` so the next save cannot destroy it.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        let loaded = fs::read_to_string(path)
            .with_context(|| format!("Reading {:?}", path))
            .and_then(|content| Self::from_json(&content));
        match loaded {
            Ok(settings) => {
                log::info!("loaded {} block-list entries from {:?}", settings.hide_list.len(), path);
                settings
            }
            Err(e) => {
                log::warn!("ignoring settings file {:?}: {:#}", path, e);
                let backup = backup_path(path);
                match fs::rename(path, &backup) {
                    Ok(()) => log::warn!("moved unreadable settings to {:?}", backup),
                    Err(e) => log::error!("could not back up {:?}: {}", path, e),
                }
                Self::default()
            }
        }
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".bak");
    path.with_file_name(name)
}

pub fn write_settings(path: &Path, settings: &Settings) -> Result<()> {
    let json = settings.to_json()?;
    if let Some(parent) = path.parent() { fs::create_dir_all(parent)?; }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("Writing {:?}", &tmp))?;
    fs::rename(&tmp, path).with_context(|| format!("Replacing {:?}", path))?;
    Ok(())
}

/// Receiver of settings snapshots. Saving is fire-and-forget.
pub trait SettingsSink {
    fn save(&self, settings: &Settings);
}

/// Debounced writer backed by a tokio task.
pub struct SettingsStore {
    path: PathBuf,
    tx: mpsc::UnboundedSender<Settings>,
}

impl SettingsStore {
    /// Must be called from within a tokio runtime.
    pub fn spawn(path: PathBuf, debounce: Duration) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(writer_loop(path.clone(), debounce, rx));
        (Self { path, tx }, handle)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsSink for SettingsStore {
    fn save(&self, settings: &Settings) {
        if self.tx.send(settings.clone()).is_err() {
            log::error!("settings writer for {:?} is gone, change not persisted", self.path);
        }
    }
}

async fn writer_loop(path: PathBuf, debounce: Duration, mut rx: mpsc::UnboundedReceiver<Settings>) {
    while let Some(mut latest) = rx.recv().await {
        let mut closed = false;
        loop {
            tokio::select! {
                next = rx.recv() => match next {
                    Some(settings) => latest = settings,
                    None => { closed = true; break; }
                },
                _ = tokio::time::sleep(debounce) => break,
            }
        }
        match write_settings(&path, &latest) {
            Ok(()) => log::debug!("saved {} block-list entries to {:?}", latest.hide_list.len(), path),
            Err(e) => log::error!("failed to save settings: {:#}", e),
        }
        if closed { break; }
    }
}
