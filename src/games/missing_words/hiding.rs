//! Choosing which display words disappear behind the curtain.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::engine::models::{CurrentRound, GameConfig, GameMode, MissingWord};
use crate::engine::notifier::GameNotifier;

#[derive(Debug, Clone, PartialEq)]
pub struct HiddenSelection {
    pub hidden: Vec<MissingWord>,
    /// Display words that stay on stage, in display order.
    pub remaining: Vec<MissingWord>,
    /// Challenge only: hidden words plus distractors, shuffled.
    pub answer_options: Vec<MissingWord>,
}

pub fn hide_words(
    display: &[MissingWord],
    distractors: &[MissingWord],
    config: &GameConfig,
    rng: &mut StdRng,
) -> HiddenSelection {
    let take = (config.hidden_count as usize).min(display.len());
    let hidden: Vec<MissingWord> = display.choose_multiple(rng, take).cloned().collect();
    let hidden_ids: HashSet<&str> = hidden.iter().map(|w| w.id.as_str()).collect();
    let remaining = display
        .iter()
        .filter(|w| !hidden_ids.contains(w.id.as_str()))
        .cloned()
        .collect();

    let answer_options = match config.game_mode {
        GameMode::Casual => Vec::new(),
        GameMode::Challenge => {
            let mut options: Vec<MissingWord> =
                hidden.iter().chain(distractors.iter()).cloned().collect();
            options.shuffle(rng);
            options
        }
    };

    HiddenSelection {
        hidden,
        remaining,
        answer_options,
    }
}

/// Hide words in `round` at most once. Returns false when the round already
/// has hidden words (or nothing to hide), leaving it untouched.
pub fn apply_hiding(
    round: &mut CurrentRound,
    config: &GameConfig,
    rng: &mut StdRng,
    notifier: &mut dyn GameNotifier,
) -> bool {
    if !round.hidden_words.is_empty() {
        tracing::debug!("words already hidden for this round");
        return false;
    }
    if round.words.is_empty() {
        return false;
    }
    let selection = hide_words(&round.words, &round.distractors, config, rng);
    notifier.words_hidden(&selection.hidden);
    round.words = selection.remaining;
    round.hidden_words = selection.hidden;
    round.answer_options = selection.answer_options;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::models::Language;
    use crate::engine::notifier::{Notification, RecordingNotifier};
    use rand::SeedableRng;

    fn words(prefix: &str, n: usize) -> Vec<MissingWord> {
        (0..n)
            .map(|i| MissingWord {
                id: format!("{}{}", prefix, i),
                text: format!("{}-{}", prefix, i),
                language: Language::English,
                category: None,
            })
            .collect()
    }

    fn challenge(word_count: u32, hidden_count: u32) -> GameConfig {
        GameConfig {
            game_mode: GameMode::Challenge,
            word_count,
            hidden_count,
            observation_time: 5,
        }
    }

    #[test]
    fn test_hidden_and_remaining_partition_display() {
        let display = words("w", 6);
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let sel = hide_words(&display, &[], &challenge(6, 3), &mut rng);
            assert_eq!(sel.hidden.len(), 3);
            let hidden: HashSet<_> = sel.hidden.iter().map(|w| w.id.clone()).collect();
            let remaining: HashSet<_> = sel.remaining.iter().map(|w| w.id.clone()).collect();
            assert!(hidden.is_disjoint(&remaining));
            let union: HashSet<_> = hidden.union(&remaining).cloned().collect();
            let all: HashSet<_> = display.iter().map(|w| w.id.clone()).collect();
            assert_eq!(union, all);
            // order preserved
            let positions: Vec<usize> = sel
                .remaining
                .iter()
                .map(|w| display.iter().position(|d| d.id == w.id).unwrap())
                .collect();
            assert!(positions.windows(2).all(|p| p[0] < p[1]));
        }
    }

    #[test]
    fn test_answer_options_by_mode() {
        let display = words("w", 4);
        let distractors = words("d", 3);
        let mut rng = StdRng::seed_from_u64(5);

        let sel = hide_words(&display, &distractors, &challenge(4, 1), &mut rng);
        assert_eq!(sel.answer_options.len(), 4);
        assert!(sel.answer_options.contains(&sel.hidden[0]));

        let casual = GameConfig { game_mode: GameMode::Casual, ..challenge(4, 1) };
        let sel = hide_words(&display, &distractors, &casual, &mut rng);
        assert!(sel.answer_options.is_empty());
    }

    #[test]
    fn test_apply_hiding_runs_once() {
        let mut round = CurrentRound {
            words: words("w", 5),
            distractors: words("d", 2),
            ..Default::default()
        };
        round.all_words = round.words.clone();
        let config = challenge(5, 2);
        let mut rng = StdRng::seed_from_u64(8);
        let mut notifier = RecordingNotifier::new();

        assert!(apply_hiding(&mut round, &config, &mut rng, &mut notifier));
        let after_first = round.clone();
        assert_eq!(round.hidden_words.len(), 2);
        assert_eq!(round.words.len(), 3);
        assert_eq!(round.answer_options.len(), 4);

        assert!(!apply_hiding(&mut round, &config, &mut rng, &mut notifier));
        assert_eq!(round, after_first);
        assert_eq!(
            notifier.events(),
            vec![Notification::WordsHidden(after_first.hidden_words.iter().map(|w| w.id.clone()).collect())]
        );
    }
}
