//! Application configuration, persisted as JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Global configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Render integers in balanced ternary by default.
    #[serde(default)]
    pub ternary: bool,
    /// Elements shown by `show` when `--head` is not given.
    #[serde(default = "default_preview_elements")]
    pub preview_elements: usize,
    /// Upper bound on `--head`.
    #[serde(default = "default_max_preview_elements")]
    pub max_preview_elements: usize,
}

fn default_preview_elements() -> usize {
    16
}
fn default_max_preview_elements() -> usize {
    256
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ternary: false,
            preview_elements: default_preview_elements(),
            max_preview_elements: default_max_preview_elements(),
        }
    }
}

impl AppConfig {
    /// Platform config directory: `~/.config/ternary-tools/`
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ternary-tools")
    }

    fn config_file() -> PathBuf {
        Self::config_dir().join("config.json")
    }

    /// Load from disk, or return defaults if the file doesn't exist.
    pub fn load_or_default() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let data = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_file())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Preview length for `show`, clamped to the configured maximum.
    pub fn preview_len(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.preview_elements)
            .min(self.max_preview_elements)
    }

    /// Apply `config set <key> <value>`.
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "ternary" => self.ternary = value.parse()?,
            "preview_elements" => self.preview_elements = value.parse()?,
            "max_preview_elements" => self.max_preview_elements = value.parse()?,
            _ => anyhow::bail!("Unknown config key: {key}"),
        }
        Ok(())
    }
}
