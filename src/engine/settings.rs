//! Engine settings: where the config slot lives, stage size, rng seed and an
//! optional custom word pool. Loaded from TOML at startup.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::engine::config::{ConfigStore, DEFAULT_SLOT};
use crate::engine::models::{Language, StageSize};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StageSettings {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageSettings {
    pub dir: Option<PathBuf>,
    pub slot: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct WordSettings {
    /// TOML word pool replacing the built-in lists.
    pub pool: Option<PathBuf>,
    pub language: Option<Language>,
    pub category: Option<String>,
}

/// Top-level TOML file structure.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct EngineSettings {
    pub seed: Option<u64>,
    #[serde(default)]
    pub stage: StageSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub words: WordSettings,
}

impl EngineSettings {
    /// Stage size with the 800x400 fallback for missing or non-positive values.
    pub fn stage_size(&self) -> StageSize {
        StageSize {
            width: self.stage.width.unwrap_or(0.0),
            height: self.stage.height.unwrap_or(0.0),
        }
        .or_default()
    }

    pub fn config_store(&self) -> ConfigStore {
        let dir = self.storage.dir.clone().unwrap_or_else(|| PathBuf::from(".missing-words"));
        let slot = self.storage.slot.as_deref().unwrap_or(DEFAULT_SLOT);
        ConfigStore::with_slot(dir, slot)
    }
}

/// Load settings from a TOML file at the given path.
pub fn load_settings(path: &Path) -> Result<EngineSettings, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    toml::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

/// Try to load settings from well-known paths, returning defaults if none found.
pub fn load_default_settings() -> EngineSettings {
    let candidates = ["missing_words.toml", "../missing_words.toml"];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_settings(p) {
                Ok(settings) => {
                    tracing::info!(path = %p.display(), "loaded engine settings");
                    return settings;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load engine settings");
                }
            }
        }
    }
    tracing::info!("no missing_words.toml found, using built-in defaults");
    EngineSettings::default()
}
