//! Headless round simulator: plays rounds against a word source with a
//! scripted player. Drives the machine directly, ticking the countdown by
//! hand instead of waiting on real time.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::engine::machine::MissingWordsGame;
use crate::engine::models::{GameMode, GamePhase};
use crate::words::source::WordSource;

/// Aggregated results from a simulation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationSummary {
    pub rounds: usize,
    pub correct: usize,
    pub revealed: usize,
    pub load_failures: usize,
}

impl SimulationSummary {
    pub fn accuracy(&self) -> f64 {
        let graded = self.rounds - self.revealed;
        self.correct as f64 / graded.max(1) as f64
    }

    pub fn summary(&self) -> String {
        format!(
            "Simulation ({} rounds): {} correct, {} revealed, {} load failures, accuracy {:.1}%",
            self.rounds,
            self.correct,
            self.revealed,
            self.load_failures,
            self.accuracy() * 100.0
        )
    }
}

/// Play one round to the result screen and back to idle. `skill` is the
/// chance the scripted player remembers each hidden word. Returns false if no
/// round could be started.
pub async fn play_round(
    game: &mut MissingWordsGame,
    source: &dyn WordSource,
    skill: f64,
    player_rng: &mut StdRng,
) -> bool {
    let Some(request) = game.request_round() else {
        return false;
    };
    let mut rng = game.fork_rng();
    let result = source.get_words(&request.query, &mut rng).await;
    if !game.apply_words(request.epoch, result) {
        return false;
    }

    match game.state().mode {
        GameMode::Challenge => {
            let epoch = game.epoch();
            while game.phase() == GamePhase::Observation {
                game.tick(epoch);
            }
        }
        GameMode::Casual => {
            game.finish_observation();
        }
    }
    game.finish_curtain();

    match game.state().mode {
        GameMode::Challenge => {
            let round = game.state().current_round.clone();
            for hidden in &round.hidden_words {
                let pick = if player_rng.gen_bool(skill.clamp(0.0, 1.0)) {
                    Some(hidden)
                } else {
                    round.answer_options.choose(player_rng)
                };
                if let Some(word) = pick {
                    if !game.state().current_round.user_answers.contains(&word.id) {
                        game.toggle_answer(&word.id);
                    }
                }
            }
            game.submit_answers();
        }
        GameMode::Casual => {
            game.reveal_answer();
        }
    }
    game.reset()
}

pub async fn simulate_rounds(
    game: &mut MissingWordsGame,
    source: &dyn WordSource,
    rounds: usize,
    skill: f64,
    seed: u64,
) -> SimulationSummary {
    let mut player_rng = StdRng::seed_from_u64(seed);
    let mut summary = SimulationSummary::default();
    for i in 0..rounds {
        let before = game.state().stats;
        if !play_round(game, source, skill, &mut player_rng).await {
            summary.load_failures += 1;
            tracing::warn!(round = i, error = ?game.state().load_error, "round did not start");
            continue;
        }
        let after = game.state().stats;
        summary.rounds += 1;
        if after.rounds_correct > before.rounds_correct {
            summary.correct += 1;
        }
        if game.state().mode == GameMode::Casual {
            summary.revealed += 1;
        }
        tracing::debug!(round = i, correct = summary.correct, "round played");
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::models::GameConfig;
    use crate::words::local::LocalWordSource;

    fn config(game_mode: GameMode) -> GameConfig {
        GameConfig {
            game_mode,
            word_count: 5,
            hidden_count: 2,
            observation_time: 3,
        }
    }

    #[tokio::test]
    async fn test_perfect_player_always_correct() {
        let source = LocalWordSource::builtin();
        let mut game = MissingWordsGame::new(config(GameMode::Challenge)).with_seed(5);
        let summary = simulate_rounds(&mut game, &source, 20, 1.0, 1).await;
        assert_eq!(summary.rounds, 20);
        assert_eq!(summary.correct, 20);
        assert_eq!(game.state().stats.rounds_played, 20);
        assert_eq!(game.phase(), GamePhase::Idle);
    }

    #[tokio::test]
    async fn test_casual_rounds_are_revealed() {
        let source = LocalWordSource::builtin();
        let mut game = MissingWordsGame::new(config(GameMode::Casual)).with_seed(5);
        let summary = simulate_rounds(&mut game, &source, 5, 0.5, 1).await;
        assert_eq!(summary.rounds, 5);
        assert_eq!(summary.revealed, 5);
        assert_eq!(summary.correct, 0);
    }

    #[tokio::test]
    async fn test_empty_source_counts_failures() {
        let source = LocalWordSource::from_words(vec![]);
        let mut game = MissingWordsGame::new(config(GameMode::Challenge)).with_seed(5);
        let summary = simulate_rounds(&mut game, &source, 3, 1.0, 1).await;
        assert_eq!(summary.rounds, 0);
        assert_eq!(summary.load_failures, 3);
        assert!(game.state().load_error.is_some());
    }
}
