//! Game config validation, constraint clamping, merging and the persisted slot.

use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::models::{GameConfig, GameMode};

pub const WORD_COUNT_RANGE: RangeInclusive<u32> = 3..=8;
pub const HIDDEN_COUNT_RANGE: RangeInclusive<u32> = 1..=3;
pub const OBSERVATION_TIME_RANGE: RangeInclusive<u32> = 3..=10;

pub const DEFAULT_SLOT: &str = "missing-words-config";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// A partial config: only the fields present are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_mode: Option<GameMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation_time: Option<u32>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ConfigUpdate::default()
    }
}

fn check_range(errors: &mut Vec<String>, name: &str, value: u32, range: &RangeInclusive<u32>) {
    if !range.contains(&value) {
        errors.push(format!(
            "{} must be between {} and {}, got {}",
            name,
            range.start(),
            range.end(),
            value
        ));
    }
}

pub fn validate(config: &GameConfig) -> ConfigValidation {
    let mut errors = Vec::new();
    check_range(&mut errors, "wordCount", config.word_count, &WORD_COUNT_RANGE);
    check_range(&mut errors, "hiddenCount", config.hidden_count, &HIDDEN_COUNT_RANGE);
    check_range(&mut errors, "observationTime", config.observation_time, &OBSERVATION_TIME_RANGE);
    if config.hidden_count > config.word_count {
        errors.push(format!(
            "hiddenCount ({}) cannot exceed wordCount ({})",
            config.hidden_count, config.word_count
        ));
    }
    // gameMode is a closed enum; anything else never deserializes.
    ConfigValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}

fn clamp_to(value: u32, range: &RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}

/// Clamp every present numeric field to its nearest bound. Idempotent.
pub fn apply_constraints(update: ConfigUpdate) -> ConfigUpdate {
    let word_count = update.word_count.map(|v| clamp_to(v, &WORD_COUNT_RANGE));
    let mut hidden_count = update.hidden_count.map(|v| clamp_to(v, &HIDDEN_COUNT_RANGE));
    if let (Some(hidden), Some(words)) = (hidden_count, word_count) {
        hidden_count = Some(hidden.min(words));
    }
    ConfigUpdate {
        game_mode: update.game_mode,
        word_count,
        hidden_count,
        observation_time: update.observation_time.map(|v| clamp_to(v, &OBSERVATION_TIME_RANGE)),
    }
}

/// Constrain `updates`, apply them over `current` and re-validate.
/// Returns `current` unchanged when the merged result is invalid.
pub fn merge(current: &GameConfig, updates: ConfigUpdate) -> GameConfig {
    let constrained = apply_constraints(updates);
    let merged = GameConfig {
        game_mode: constrained.game_mode.unwrap_or(current.game_mode),
        word_count: constrained.word_count.unwrap_or(current.word_count),
        hidden_count: constrained.hidden_count.unwrap_or(current.hidden_count),
        observation_time: constrained.observation_time.unwrap_or(current.observation_time),
    };
    let validation = validate(&merged);
    if validation.is_valid {
        merged
    } else {
        tracing::warn!(errors = ?validation.errors, "rejected config update");
        *current
    }
}

/// A single named storage slot holding the serialized `GameConfig`.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
    slot: String,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_slot(dir, DEFAULT_SLOT)
    }

    pub fn with_slot(dir: impl Into<PathBuf>, slot: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            slot: slot.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        slot_path(&self.dir, &self.slot)
    }

    /// The persisted config, or defaults when the slot is missing, unreadable
    /// or holds an invalid config.
    pub fn load(&self) -> GameConfig {
        match self.read() {
            Ok(Some(config)) => {
                let validation = validate(&config);
                if validation.is_valid {
                    config
                } else {
                    tracing::warn!(
                        slot = %self.slot,
                        errors = ?validation.errors,
                        "persisted config invalid, using defaults"
                    );
                    GameConfig::default()
                }
            }
            Ok(None) => GameConfig::default(),
            Err(e) => {
                tracing::warn!(slot = %self.slot, error = %e, "failed to load config, using defaults");
                GameConfig::default()
            }
        }
    }

    fn read(&self) -> Result<Option<GameConfig>, String> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
    }

    /// Persist `config`. Returns false (and writes nothing) if it is invalid.
    pub fn save(&self, config: &GameConfig) -> bool {
        let validation = validate(config);
        if !validation.is_valid {
            tracing::warn!(errors = ?validation.errors, "refusing to save invalid config");
            return false;
        }
        match self.write(config) {
            Ok(()) => {
                tracing::debug!(slot = %self.slot, "saved config");
                true
            }
            Err(e) => {
                tracing::warn!(slot = %self.slot, error = %e, "failed to save config");
                false
            }
        }
    }

    fn write(&self, config: &GameConfig) -> Result<(), String> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| format!("Failed to create config directory: {e}"))?;
        let json = serde_json::to_string_pretty(config)
            .map_err(|e| format!("Failed to serialize config: {e}"))?;
        fs::write(self.path(), json).map_err(|e| format!("Failed to write config: {e}"))
    }
}

fn slot_path(dir: &Path, slot: &str) -> PathBuf {
    dir.join(format!("{}.json", slot))
}
