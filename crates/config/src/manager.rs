//! Locating, loading and saving the user's configuration

use crate::error::{ConfigError, ConfigResult};
use crate::{file, Config, PlayerConfig};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const CONFIG_FILE: &str = "config.toml";
const ENV_SEEK_TIME_SECS: &str = "STORYSTREAM_PLAYER_SEEK_TIME_SECS";
const ENV_SLEEP_TIMER_MINUTES: &str = "STORYSTREAM_PLAYER_SLEEP_TIMER_MINUTES";
const ENV_STOP_AFTER_CURRENT_CHAPTER: &str = "STORYSTREAM_PLAYER_STOP_AFTER_CURRENT_CHAPTER";

/// Handle to one `config.toml`
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Uses the platform config directory (`~/.config/storystream` on Linux)
    pub fn new() -> ConfigResult<Self> {
        let dirs = ProjectDirs::from("", "", "storystream").ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::in_dir(dirs.config_dir()))
    }

    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(CONFIG_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file; a missing file yields the defaults
    ///
    /// Out-of-range values are kept and only logged, so a hand-edited
    /// file can be fixed rather than silently overwritten.
    pub fn load(&self) -> ConfigResult<Config> {
        let config = file::read(&self.path)?.unwrap_or_default();
        if let Err(errors) = config.validate() {
            log::warn!(
                "{}: {}",
                self.path.display(),
                ConfigError::Invalid(errors)
            );
        }
        Ok(config)
    }

    /// Loads the file and applies `STORYSTREAM_PLAYER_*` overrides
    ///
    /// Falls back to the defaults when the file is unreadable or the
    /// result is out of range.
    pub fn load_or_default(&self) -> Config {
        let mut config = match self.load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{}, using defaults", e);
                return Config::default();
            }
        };

        apply_overrides(&mut config.player, |key| std::env::var(key).ok());

        match config.validate() {
            Ok(()) => config,
            Err(errors) => {
                log::warn!("{}, using defaults", ConfigError::Invalid(errors));
                Config::default()
            }
        }
    }

    /// Validates and atomically writes `config`
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        config.validate().map_err(ConfigError::Invalid)?;
        file::write(&self.path, config)?;
        log::info!("Config saved to {}", self.path.display());
        Ok(())
    }

    /// Load, modify, save; returns what was saved
    pub fn update<F>(&self, edit: F) -> ConfigResult<Config>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        edit(&mut config);
        self.save(&config)?;
        Ok(config)
    }
}

fn apply_overrides(player: &mut PlayerConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(secs) = parse_override(&lookup, ENV_SEEK_TIME_SECS) {
        player.seek_time_secs = secs;
    }
    if let Some(minutes) = parse_override(&lookup, ENV_SLEEP_TIMER_MINUTES) {
        player.sleep_timer_minutes = minutes;
    }
    if let Some(stop) = parse_override(&lookup, ENV_STOP_AFTER_CURRENT_CHAPTER) {
        player.stop_after_current_chapter = stop;
    }
}

fn parse_override<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    let parsed = raw.trim().parse().ok();
    if parsed.is_none() {
        log::warn!("Ignoring {}={:?}: not a valid value", key, raw);
    }
    parsed
}
