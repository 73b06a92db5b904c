//! Application configuration.
//!
//! Defaults are built in; an optional TOML file at
//! `<config dir>/linkbundle/config.toml` overrides them field by field.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_DIR_NAME: &str = "linkbundle";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Where the state file, backups and logs live (None = platform default)
    pub data_dir: Option<PathBuf>,
    /// Origin used when printing share URLs
    pub share_base_url: String,
    /// Pretty-print the state file
    pub pretty_state: bool,
    /// Default tracing filter when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            share_base_url: String::from("http://localhost:3000"),
            pretty_state: true,
            log_filter: String::from("warn"),
        }
    }
}

/// On-disk shape; every field is optional so partial files merge onto defaults
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    data_dir: Option<PathBuf>,
    share_base_url: Option<String>,
    pretty_state: Option<bool>,
    log_filter: Option<String>,
}

impl Config {
    /// Load from the default config location; a missing file means defaults
    pub fn load() -> Result<Self> {
        match default_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let toml_config: TomlConfig = toml::from_str(contents)?;
        let mut config = Config::default();

        if let Some(data_dir) = toml_config.data_dir {
            config.data_dir = Some(expand_home(data_dir));
        }
        if let Some(url) = toml_config.share_base_url {
            config.share_base_url = url;
        }
        if let Some(pretty) = toml_config.pretty_state {
            config.pretty_state = pretty;
        }
        if let Some(filter) = toml_config.log_filter {
            config.log_filter = filter;
        }

        Ok(config)
    }

    /// Effective data directory: the configured one, else the platform
    /// data dir joined with the app name
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME)))
    }

    pub fn logs_dir(&self) -> Option<PathBuf> {
        self.data_dir().map(|dir| dir.join("logs"))
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn expand_home(path: PathBuf) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or(path),
        Err(_) => path,
    }
}
