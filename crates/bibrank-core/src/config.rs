use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BibrankError, Result};

/// Environment variable pointing at an alternative config file.
pub const CONFIG_PATH_ENV: &str = "BIBRANK_CONFIG";

/// Root application configuration, loaded from `~/.config/bibrank/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ranking: RankingConfig,
    pub export: ExportConfig,
}

/// Layout of the journal ranking export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub delimiter: String,
    pub title_column: String,
    pub categories_column: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub file_name: String,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            delimiter: ";".to_string(),
            title_column: "Title".to_string(),
            categories_column: "Categories".to_string(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: "winners.bib".to_string(),
        }
    }
}

impl RankingConfig {
    /// The delimiter as a single byte. Must be exactly one ASCII character.
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(BibrankError::Config(format!(
                "ranking delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            ))),
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path, honouring `BIBRANK_CONFIG`.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("bibrank")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.ranking.delimiter_byte()?;
        if self.ranking.title_column.trim().is_empty()
            || self.ranking.categories_column.trim().is_empty()
        {
            return Err(BibrankError::Config(
                "ranking column names must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Flat key/value view for display.
    pub fn key_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ranking.delimiter", self.ranking.delimiter.clone()),
            ("ranking.title_column", self.ranking.title_column.clone()),
            ("ranking.categories_column", self.ranking.categories_column.clone()),
            ("export.file_name", self.export.file_name.clone()),
        ]
    }
}
