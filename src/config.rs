//! Runtime configuration: where the store and the risk model live.
//!
//! Read from `~/.employee_events/config.json` or an explicit path:
//!
//! ```json
//! { "databasePath": "/data/employee_events.db", "modelPath": "/data/model.json" }
//! ```
//!
//! Relative paths in a config file resolve against the file's directory.
//! `EMPLOYEE_EVENTS_DB` and `EMPLOYEE_EVENTS_MODEL` override either value.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DB_ENV: &str = "EMPLOYEE_EVENTS_DB";
pub const MODEL_ENV: &str = "EMPLOYEE_EVENTS_MODEL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Config file not found at {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("employee_events.db")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("assets").join("model.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            model_path: default_model_path(),
        }
    }
}

/// `~/.employee_events/config.json`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
    Ok(home.join(".employee_events").join("config.json"))
}

/// Load configuration, then apply environment overrides.
///
/// An explicit path must exist. Without one, a missing default file falls
/// back to [`Config::default`].
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let config = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            read_config_file(path)?
        }
        None => match default_config_path() {
            Ok(path) if path.exists() => read_config_file(&path)?,
            _ => {
                log::debug!("No config file, using defaults");
                Config::default()
            }
        },
    };
    Ok(apply_overrides(config, |key| std::env::var_os(key)))
}

/// Parse one config file, resolving relative paths against its directory.
pub fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: Config =
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    if let Some(base) = path.parent() {
        config.database_path = resolve(base, &config.database_path);
        config.model_path = resolve(base, &config.model_path);
    }
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Replace values whose override variable is set and non-empty.
pub fn apply_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<OsString>,
{
    if let Some(db) = lookup(DB_ENV).filter(|v| !v.is_empty()) {
        config.database_path = PathBuf::from(db);
    }
    if let Some(model) = lookup(MODEL_ENV).filter(|v| !v.is_empty()) {
        config.model_path = PathBuf::from(model);
    }
    config
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
