//! StoryStream configuration
//!
//! Preferences live in a single TOML file, `config.toml`, under the platform
//! config directory. [`ConfigManager`] reads and writes it; callers that just
//! want usable settings take [`ConfigManager::load_or_default`].
//!
//! ```rust
//! use storystream_config::ConfigManager;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let manager = ConfigManager::in_dir(dir.path());
//!
//! manager.update(|config| config.player.seek_time_secs = 30).unwrap();
//! assert_eq!(manager.load().unwrap().player.seek_time_secs, 30);
//! ```

mod error;
mod file;
mod manager;
mod player_config;
mod validation;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::ConfigManager;
pub use player_config::PlayerConfig;
pub use validation::RangeChecks;

use serde::{Deserialize, Serialize};

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Root of `config.toml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub version: u32,
    pub player: PlayerConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        self.player.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            player: PlayerConfig::default(),
        }
    }
}
