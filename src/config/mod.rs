// SPDX-License-Identifier: MPL-2.0
//! This module handles the player's configuration, including loading and saving
//! user preferences to a `player.toml` file.
//!
//! # Examples
//!
//! ```no_run
//! use course_player::config::{self, PlayerConfig};
//!
//! let mut config = config::load().unwrap_or_default();
//! config.volume = Some(0.6);
//! config::save(&config).expect("Failed to save config");
//!
//! let settings = config.engine_settings();
//! assert!((settings.volume.value() - 0.6).abs() < f32::EPSILON);
//! ```

pub mod defaults;

pub use defaults::*;

use crate::domain::playback::{PlaybackRate, SeekStep, Volume};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "player.toml";
const APP_NAME: &str = "CoursePlayer";

/// Persisted player preferences. Every field is optional so that older
/// files keep loading after new settings are introduced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default)]
    pub volume: Option<f32>,
    #[serde(default)]
    pub playback_rate: Option<f64>,
    #[serde(default)]
    pub seek_step_secs: Option<f64>,
    #[serde(default)]
    pub autoplay: Option<bool>,
    #[serde(default)]
    pub switch_timeout_secs: Option<u64>,
    #[serde(default)]
    pub time_sync_threshold_secs: Option<f64>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume: Some(DEFAULT_VOLUME),
            playback_rate: Some(DEFAULT_PLAYBACK_RATE),
            seek_step_secs: Some(DEFAULT_SEEK_STEP_SECS),
            autoplay: Some(false),
            switch_timeout_secs: Some(DEFAULT_SWITCH_TIMEOUT_SECS),
            time_sync_threshold_secs: Some(TIME_SYNC_THRESHOLD_SECS),
        }
    }
}

/// Resolved settings the engine runs with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub volume: Volume,
    pub playback_rate: PlaybackRate,
    pub seek_step: SeekStep,
    pub autoplay: bool,
    pub switch_timeout: Duration,
    pub time_sync_threshold_secs: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        PlayerConfig::default().engine_settings()
    }
}

impl PlayerConfig {
    /// Resolves optional preferences into engine settings.
    ///
    /// Out-of-range values are clamped; a playback rate outside the preset
    /// list falls back to the default rate.
    #[must_use]
    pub fn engine_settings(&self) -> EngineSettings {
        let playback_rate = self
            .playback_rate
            .and_then(|rate| PlaybackRate::try_new(rate).ok())
            .unwrap_or_default();

        let switch_timeout_secs = self
            .switch_timeout_secs
            .unwrap_or(DEFAULT_SWITCH_TIMEOUT_SECS)
            .clamp(MIN_SWITCH_TIMEOUT_SECS, MAX_SWITCH_TIMEOUT_SECS);

        let time_sync_threshold_secs = self
            .time_sync_threshold_secs
            .filter(|t| t.is_finite() && *t > 0.0)
            .unwrap_or(TIME_SYNC_THRESHOLD_SECS);

        EngineSettings {
            volume: self.volume.map(Volume::new).unwrap_or_default(),
            playback_rate,
            seek_step: self.seek_step_secs.map(SeekStep::new).unwrap_or_default(),
            autoplay: self.autoplay.unwrap_or(false),
            switch_timeout: Duration::from_secs(switch_timeout_secs),
            time_sync_threshold_secs,
        }
    }
}

fn get_default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

pub fn load() -> Result<PlayerConfig> {
    if let Some(path) = get_default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(PlayerConfig::default())
}

pub fn save(config: &PlayerConfig) -> Result<()> {
    if let Some(path) = get_default_config_path() {
        return save_to_path(config, &path);
    }
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<PlayerConfig> {
    let content = fs::read_to_string(path)?;
    match toml::from_str(&content) {
        Ok(config) => Ok(config),
        Err(err) => {
            log::warn!("Ignoring invalid config at {}: {}", path.display(), err);
            Ok(PlayerConfig::default())
        }
    }
}

pub fn save_to_path(config: &PlayerConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}
