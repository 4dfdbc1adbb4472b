use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

use crate::buffer::DEFAULT_PAGE_SIZE;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Spaces inserted by the tab key.
    pub tab_width: usize,
    /// Lines moved by page up / page down.
    pub page_size: usize,
    /// Terminal rows kept out of the viewport.
    pub reserved_rows: usize,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tab_width: 4,
            page_size: DEFAULT_PAGE_SIZE,
            reserved_rows: 1,
            log_file: None,
        }
    }
}

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        ensure!(config.tab_width > 0, "tab_width must be at least 1");
        ensure!(config.page_size > 0, "page_size must be at least 1");
        Ok(config)
    }

    /// Read the config at `path`, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config {}", path.display()))
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("lined").join("config.toml");
        }
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("lined").join("config.toml");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("lined")
                .join("config.toml");
        }
    }

    PathBuf::from(".lined.toml")
}
