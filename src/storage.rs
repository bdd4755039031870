use crate::model::Store;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::warn;
use std::fs;
use std::path::PathBuf;

const STORE_FILE: &str = "dialdash_v1.json";

#[derive(Debug, Clone)]
pub struct StoreLocation {
    pub path: PathBuf,
}

pub fn data_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "dialdash").context("locating data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}

pub fn default_location() -> Result<StoreLocation> {
    Ok(StoreLocation {
        path: data_dir()?.join(STORE_FILE),
    })
}

/// Loads the snapshot at `location`, falling back to an empty store when
/// the file is missing, unreadable or not valid JSON. Field-level damage
/// (a list that is not an array) is absorbed during decode.
pub fn load_store(location: &StoreLocation) -> Store {
    if !location.path.exists() {
        return Store::default();
    }
    let data = match fs::read_to_string(&location.path) {
        Ok(data) => data,
        Err(err) => {
            warn!("could not read {}: {err}", location.path.display());
            return Store::default();
        }
    };
    match serde_json::from_str(&data) {
        Ok(store) => store,
        Err(err) => {
            warn!("could not parse {}: {err}", location.path.display());
            Store::default()
        }
    }
}

pub fn save_store(location: &StoreLocation, store: &Store) -> Result<()> {
    if let Some(parent) = location.path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let serialized = serde_json::to_string_pretty(store).context("serializing store")?;
    fs::write(&location.path, serialized)
        .with_context(|| format!("writing {:?}", location.path))?;
    Ok(())
}
