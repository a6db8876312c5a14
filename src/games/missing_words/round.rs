//! Round setup: how many words to draw, splitting display words from
//! distractors, and pairing display words with stage positions.

use rand::rngs::StdRng;

use crate::engine::models::{
    CurrentRound, Difficulty, GameConfig, GameMode, Language, MissingWord, StageSize, WordPosition,
};
use crate::games::missing_words::layout::generate_positions;
use crate::words::source::{FetchError, WordQuery, WordSource};

/// Challenge mode always offers exactly this many answer options.
pub const ANSWER_OPTION_COUNT: u32 = 4;

/// Which words a round draws from; the count comes from the config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordFilter {
    pub language: Option<Language>,
    pub difficulty: Option<Difficulty>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundSetup {
    pub words: Vec<MissingWord>,
    pub all_words: Vec<MissingWord>,
    pub distractors: Vec<MissingWord>,
    pub positions: Vec<WordPosition>,
}

impl RoundSetup {
    pub fn into_round(self) -> CurrentRound {
        CurrentRound {
            words: self.words,
            all_words: self.all_words,
            distractors: self.distractors,
            word_positions: self.positions,
            ..Default::default()
        }
    }
}

pub fn distractor_count(config: &GameConfig) -> usize {
    match config.game_mode {
        GameMode::Casual => 0,
        GameMode::Challenge => ANSWER_OPTION_COUNT.saturating_sub(config.hidden_count) as usize,
    }
}

pub fn draw_count(config: &GameConfig) -> usize {
    config.word_count as usize + distractor_count(config)
}

pub fn round_query(config: &GameConfig, filter: &WordFilter) -> WordQuery {
    WordQuery {
        count: draw_count(config),
        language: filter.language,
        difficulty: filter.difficulty,
        category: filter.category.clone(),
    }
}

/// Split a draw into display words and distractors and lay the display words
/// out. Fails when fewer than `word_count` words were drawn; a short
/// distractor set only means fewer answer options.
pub fn build_round(
    config: &GameConfig,
    drawn: Vec<MissingWord>,
    stage: StageSize,
    rng: &mut StdRng,
) -> Result<RoundSetup, FetchError> {
    let display_count = config.word_count as usize;
    if drawn.len() < display_count {
        return Err(FetchError::InsufficientWords {
            needed: display_count,
            available: drawn.len(),
        });
    }

    let mut all_words = drawn;
    all_words.truncate(draw_count(config));
    let words = all_words[..display_count].to_vec();
    let distractors = all_words[display_count..].to_vec();

    let positions = generate_positions(words.len(), stage, rng)
        .into_iter()
        .zip(&words)
        .map(|(pos, word)| WordPosition {
            word_id: word.id.clone(),
            ..pos
        })
        .collect();

    Ok(RoundSetup {
        words,
        all_words,
        distractors,
        positions,
    })
}

/// Draw words from `source` and build a playable round.
pub async fn initialize_round(
    config: &GameConfig,
    source: &dyn WordSource,
    filter: &WordFilter,
    stage: StageSize,
    rng: &mut StdRng,
) -> Result<RoundSetup, FetchError> {
    let query = round_query(config, filter);
    let drawn = source.get_words(&query, rng).await?;
    build_round(config, drawn, stage, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words::local::LocalWordSource;
    use rand::SeedableRng;

    fn config(game_mode: GameMode, word_count: u32, hidden_count: u32) -> GameConfig {
        GameConfig {
            game_mode,
            word_count,
            hidden_count,
            observation_time: 5,
        }
    }

    #[test]
    fn test_draw_counts() {
        assert_eq!(draw_count(&config(GameMode::Casual, 5, 2)), 5);
        assert_eq!(draw_count(&config(GameMode::Challenge, 4, 1)), 7);
        assert_eq!(draw_count(&config(GameMode::Challenge, 8, 3)), 9);
    }

    #[tokio::test]
    async fn test_challenge_round() {
        let source = LocalWordSource::builtin();
        let mut rng = StdRng::seed_from_u64(21);
        let setup = initialize_round(
            &config(GameMode::Challenge, 4, 1),
            &source,
            &WordFilter::default(),
            StageSize::default(),
            &mut rng,
        )
        .await
        .unwrap();

        assert_eq!(setup.all_words.len(), 7);
        assert_eq!(setup.words.len(), 4);
        assert_eq!(setup.distractors.len(), 3);
        assert_eq!(setup.words[..], setup.all_words[..4]);
        assert_eq!(setup.positions.len(), 4);
        for (pos, word) in setup.positions.iter().zip(&setup.words) {
            assert_eq!(pos.word_id, word.id);
        }
    }

    #[tokio::test]
    async fn test_casual_round_has_no_distractors() {
        let source = LocalWordSource::builtin();
        let mut rng = StdRng::seed_from_u64(2);
        let setup = initialize_round(
            &config(GameMode::Casual, 5, 2),
            &source,
            &WordFilter { language: Some(Language::English), ..Default::default() },
            StageSize::default(),
            &mut rng,
        )
        .await
        .unwrap();
        assert_eq!(setup.words.len(), 5);
        assert!(setup.distractors.is_empty());
        assert_eq!(setup.all_words.len(), 5);
    }

    #[test]
    fn test_short_draws() {
        let mut rng = StdRng::seed_from_u64(0);
        let words: Vec<MissingWord> = (0..5)
            .map(|i| MissingWord {
                id: i.to_string(),
                text: i.to_string(),
                language: Language::English,
                category: None,
            })
            .collect();

        let err = build_round(&config(GameMode::Casual, 6, 1), words.clone(), StageSize::default(), &mut rng)
            .unwrap_err();
        assert_eq!(err, FetchError::InsufficientWords { needed: 6, available: 5 });

        // Enough for display, only one distractor.
        let setup = build_round(&config(GameMode::Challenge, 4, 1), words, StageSize::default(), &mut rng)
            .unwrap();
        assert_eq!(setup.words.len(), 4);
        assert_eq!(setup.distractors.len(), 1);
    }
}
