use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::choices::EloSpread;
use crate::mode::{GameMode, GameOptions};

/// Home-screen choices remembered between runs. The daily challenge has
/// fixed options so only classic and endless keep their own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub classic: GameOptions,
    pub endless: GameOptions,
    pub last_mode: GameMode,
    pub elo_spread: EloSpread,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            classic: GameOptions::default(),
            endless: GameOptions::default(),
            last_mode: GameMode::Classic,
            elo_spread: EloSpread::default(),
        }
    }
}

impl Config {
    pub fn options_for(&self, mode: GameMode) -> GameOptions {
        match mode {
            GameMode::Classic => self.classic,
            GameMode::Endless => self.endless,
            GameMode::Daily => GameOptions::daily(),
        }
    }

    /// Daily options are fixed; setting them is a no-op
    pub fn set_options(&mut self, mode: GameMode, options: GameOptions) {
        match mode {
            GameMode::Classic => self.classic = options,
            GameMode::Endless => self.endless = options,
            GameMode::Daily => {}
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice::<Config>(&bytes).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), "ignoring unreadable config: {e}");
                Config::default()
            }),
            Err(_) => Config::default(),
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::{TimeControlFilter, TimeLimit};
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        assert_eq!(cfg, store.load());
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nested").join("config.json"));
        let cfg = Config {
            classic: GameOptions {
                time_control: TimeControlFilter::Rapid,
                evaluation: false,
                time_limit: TimeLimit::Secs45,
            },
            endless: GameOptions::default(),
            last_mode: GameMode::Endless,
            elo_spread: EloSpread {
                spread: 300,
                step: 25,
            },
        };
        store.save(&cfg).unwrap();
        assert_eq!(cfg, store.load());
    }

    #[test]
    fn missing_or_corrupt_config_is_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());
        fs::write(&path, b"{ nope").unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"last_mode":"daily"}"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.last_mode, GameMode::Daily);
        assert_eq!(cfg.classic, GameOptions::default());
    }

    #[test]
    fn daily_options_are_fixed() {
        let mut cfg = Config::default();
        let custom = GameOptions {
            time_limit: TimeLimit::None,
            evaluation: false,
            ..GameOptions::default()
        };
        cfg.set_options(GameMode::Daily, custom);
        assert_eq!(cfg.options_for(GameMode::Daily), GameOptions::daily());
        cfg.set_options(GameMode::Endless, custom);
        assert_eq!(cfg.options_for(GameMode::Endless), custom);
    }
}
