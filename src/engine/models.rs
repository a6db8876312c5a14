//! Core engine data types shared by the machine, the session and the game logic.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::words::source::FetchError;

pub type WordId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    #[default]
    Casual,
    Challenge,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    Idle,
    Observation,
    Curtain,
    Answer,
    Result,
}

impl GamePhase {
    /// The only phase reachable from `self`.
    pub fn successor(self) -> GamePhase {
        match self {
            GamePhase::Idle => GamePhase::Observation,
            GamePhase::Observation => GamePhase::Curtain,
            GamePhase::Curtain => GamePhase::Answer,
            GamePhase::Answer => GamePhase::Result,
            GamePhase::Result => GamePhase::Idle,
        }
    }

    pub fn can_transition_to(self, next: GamePhase) -> bool {
        self.successor() == next
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Chinese,
    English,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// User-tunable game parameters. Persisted as camelCase JSON.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub game_mode: GameMode,
    pub word_count: u32,
    pub hidden_count: u32,
    pub observation_time: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            game_mode: GameMode::Casual,
            word_count: 4,
            hidden_count: 1,
            observation_time: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MissingWord {
    pub id: WordId,
    pub text: String,
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WordPosition {
    pub word_id: WordId,
    pub x: f64,
    pub y: f64,
    /// Degrees.
    pub rotation: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StageSize {
    pub width: f64,
    pub height: f64,
}

impl Default for StageSize {
    fn default() -> Self {
        Self { width: 800.0, height: 400.0 }
    }
}

impl StageSize {
    /// Replace any non-positive (or non-finite) dimension with the default.
    pub fn or_default(self) -> Self {
        let d = Self::default();
        let pick = |v: f64, fallback: f64| if v.is_finite() && v > 0.0 { v } else { fallback };
        Self {
            width: pick(self.width, d.width),
            height: pick(self.height, d.height),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentRound {
    /// Words currently on stage. After hiding these are the remaining words.
    pub words: Vec<MissingWord>,
    pub hidden_words: Vec<MissingWord>,
    pub all_words: Vec<MissingWord>,
    /// Drawn but never displayed; pads challenge answer options.
    pub distractors: Vec<MissingWord>,
    pub answer_options: Vec<MissingWord>,
    pub word_positions: Vec<WordPosition>,
    pub user_answers: BTreeSet<WordId>,
    pub is_correct: Option<bool>,
}

impl CurrentRound {
    pub fn is_empty(&self) -> bool {
        self.all_words.is_empty()
    }

    pub fn hidden_ids(&self) -> BTreeSet<WordId> {
        self.hidden_words.iter().map(|w| w.id.clone()).collect()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub rounds_played: u32,
    pub rounds_correct: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub phase: GamePhase,
    /// Mode of the round in play; follows `config.game_mode` at round start.
    pub mode: GameMode,
    pub config: GameConfig,
    pub current_round: CurrentRound,
    pub observation_time_left: u32,
    pub show_result: bool,
    pub is_loading: bool,
    #[serde(default)]
    pub load_error: Option<FetchError>,
    #[serde(default)]
    pub stats: SessionStats,
}

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        Self {
            mode: config.game_mode,
            config,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use GamePhase::*;
        let all = [Idle, Observation, Curtain, Answer, Result];
        let legal = [
            (Idle, Observation),
            (Observation, Curtain),
            (Curtain, Answer),
            (Answer, Result),
            (Result, Idle),
        ];
        for from in all {
            for to in all {
                assert_eq!(
                    from.can_transition_to(to),
                    legal.contains(&(from, to)),
                    "{:?} -> {:?}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_stage_fallback() {
        let d = StageSize::default();
        assert_eq!(StageSize { width: 0.0, height: 0.0 }.or_default(), d);
        assert_eq!(
            StageSize { width: 1024.0, height: -5.0 }.or_default(),
            StageSize { width: 1024.0, height: 400.0 }
        );
        assert_eq!(StageSize { width: f64::NAN, height: 300.0 }.or_default().width, 800.0);
    }

    #[test]
    fn test_config_json_shape() {
        let json = serde_json::to_value(GameConfig::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "gameMode": "casual",
                "wordCount": 4,
                "hiddenCount": 1,
                "observationTime": 5
            })
        );
    }
}
