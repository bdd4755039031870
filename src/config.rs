use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub news_feed: Option<PathBuf>,
    pub weather_feed: Option<PathBuf>,
    pub news_refresh_minutes: u64,
    pub timer_minutes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            news_feed: None,
            weather_feed: None,
            news_refresh_minutes: 10,
            timer_minutes: 25,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "dialdash").context("locating config directory")?;
    Ok(dirs.config_dir().join("config.yml"))
}

/// Loads `config.yml`, falling back to defaults when the file is absent
/// or unreadable.
pub fn load_config() -> Config {
    let path = match config_path() {
        Ok(path) => path,
        Err(err) => {
            warn!("no config directory: {err}");
            return Config::default();
        }
    };
    if !path.exists() {
        return Config::default();
    }
    match fs::read_to_string(&path) {
        Ok(data) => match serde_yaml::from_str(&data) {
            Ok(config) => config,
            Err(err) => {
                warn!("could not parse {}: {err}", path.display());
                Config::default()
            }
        },
        Err(err) => {
            warn!("could not read {}: {err}", path.display());
            Config::default()
        }
    }
}
