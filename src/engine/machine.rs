//! The Missing Words phase state machine.
//!
//! `MissingWordsGame` is the only writer of `GameState`. Every operation reads
//! the whole previous state, builds the next one and replaces the record.
//! Illegal requests are logged and leave the state unchanged.
//!
//! Async results (word loads, countdown ticks) carry the epoch they were
//! issued for. The epoch moves forward on every round request and every
//! return to idle, so anything tagged with an older epoch is dropped.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc::UnboundedSender;

use crate::engine::config::{merge, validate, ConfigUpdate};
use crate::engine::countdown::{Countdown, TICK_PERIOD};
use crate::engine::models::*;
use crate::engine::notifier::{GameNotifier, NoopNotifier};
use crate::engine::session::SessionEvent;
use crate::games::missing_words::hiding::apply_hiding;
use crate::games::missing_words::round::{build_round, round_query, WordFilter};
use crate::words::source::{FetchError, WordQuery};

/// A word draw the caller has to perform and hand back via `apply_words`.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundRequest {
    pub epoch: u64,
    pub query: WordQuery,
}

pub struct MissingWordsGame {
    state: GameState,
    rng: StdRng,
    notifier: Box<dyn GameNotifier>,
    countdown: Countdown,
    events: Option<UnboundedSender<SessionEvent>>,
    epoch: u64,
    pending_load: Option<u64>,
    stage: StageSize,
    filter: WordFilter,
}

impl MissingWordsGame {
    pub fn new(config: GameConfig) -> Self {
        Self {
            state: GameState::new(config),
            rng: StdRng::from_entropy(),
            notifier: Box::new(NoopNotifier),
            countdown: Countdown::new(),
            events: None,
            epoch: 0,
            pending_load: None,
            stage: StageSize::default(),
            filter: WordFilter::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_notifier(mut self, notifier: Box<dyn GameNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_stage(mut self, stage: StageSize) -> Self {
        self.stage = stage.or_default();
        self
    }

    pub fn with_filter(mut self, filter: WordFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Countdown ticks go to this channel. Without one, the countdown has to
    /// be driven by calling `tick` directly.
    pub fn attach_events(&mut self, events: UnboundedSender<SessionEvent>) {
        self.events = Some(events);
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_countdown_running(&self) -> bool {
        self.countdown.is_running()
    }

    /// An independent rng for work done outside the machine (word draws).
    pub fn fork_rng(&mut self) -> StdRng {
        StdRng::seed_from_u64(self.rng.gen())
    }

    pub fn set_stage(&mut self, stage: StageSize) {
        self.stage = stage.or_default();
    }

    pub fn set_word_filter(&mut self, filter: WordFilter) {
        self.filter = filter;
    }

    /// Move along one edge of the phase graph, running the entry action of
    /// the target phase.
    pub fn transition(&mut self, to: GamePhase) -> bool {
        let from = self.state.phase;
        if !from.can_transition_to(to) {
            tracing::warn!(?from, ?to, "rejected illegal phase transition");
            return false;
        }

        let mut next = self.state.clone();
        next.phase = to;
        match to {
            GamePhase::Observation => {
                next.observation_time_left = next.config.observation_time;
                next.show_result = false;
            }
            GamePhase::Curtain => self.countdown.cancel(),
            GamePhase::Answer => {}
            GamePhase::Result => {
                next.show_result = true;
                next.stats.rounds_played += 1;
                if next.current_round.is_correct == Some(true) {
                    next.stats.rounds_correct += 1;
                }
            }
            GamePhase::Idle => {
                self.countdown.cancel();
                self.epoch += 1;
                self.pending_load = None;
                next.current_round = CurrentRound::default();
                next.observation_time_left = 0;
                next.show_result = false;
                next.is_loading = false;
            }
        }
        self.state = next;

        if to == GamePhase::Observation && self.state.mode == GameMode::Challenge {
            self.start_countdown();
        }
        tracing::debug!(?from, ?to, epoch = self.epoch, "phase transition");
        self.notifier.phase_changed(from, to);
        true
    }

    fn start_countdown(&mut self) {
        match &self.events {
            Some(events) => self.countdown.start(self.epoch, TICK_PERIOD, events.clone()),
            None => tracing::debug!("no event channel, countdown driven by caller"),
        }
    }

    /// Ask for a new round. The returned query has to be drawn by the caller
    /// and handed back to `apply_words` with the same epoch. A newer request
    /// supersedes an older pending one.
    pub fn request_round(&mut self) -> Option<RoundRequest> {
        if self.state.phase != GamePhase::Idle {
            tracing::warn!(phase = ?self.state.phase, "round requested outside idle");
            return None;
        }
        self.epoch += 1;
        self.pending_load = Some(self.epoch);

        let mut next = self.state.clone();
        next.mode = next.config.game_mode;
        next.is_loading = true;
        next.load_error = None;
        let query = round_query(&next.config, &self.filter);
        self.state = next;

        tracing::debug!(epoch = self.epoch, count = query.count, "requesting words");
        Some(RoundRequest {
            epoch: self.epoch,
            query,
        })
    }

    /// Finish a round request. Stale results are dropped. Failures are stored
    /// in `load_error` and the phase stays idle. Returns true when a round
    /// started.
    pub fn apply_words(
        &mut self,
        epoch: u64,
        result: Result<Vec<MissingWord>, FetchError>,
    ) -> bool {
        if self.pending_load != Some(epoch) || self.state.phase != GamePhase::Idle {
            tracing::debug!(epoch, current = self.epoch, "discarding stale word load");
            return false;
        }
        self.pending_load = None;

        let built = result.and_then(|drawn| {
            build_round(&self.state.config, drawn, self.stage, &mut self.rng)
        });
        let mut next = self.state.clone();
        next.is_loading = false;
        match built {
            Ok(setup) => {
                next.load_error = None;
                next.current_round = setup.into_round();
                self.state = next;
                self.transition(GamePhase::Observation)
            }
            Err(e) => {
                tracing::warn!(code = e.code(), error = %e, "round setup failed");
                next.load_error = Some(e);
                self.state = next;
                false
            }
        }
    }

    /// One countdown second. Only counts in challenge observation for the
    /// current epoch; reaching zero drops the curtain.
    pub fn tick(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch
            || self.state.phase != GamePhase::Observation
            || self.state.mode != GameMode::Challenge
        {
            tracing::debug!(epoch, current = self.epoch, phase = ?self.state.phase, "ignoring stale tick");
            return false;
        }
        let mut next = self.state.clone();
        next.observation_time_left = next.observation_time_left.saturating_sub(1);
        let left = next.observation_time_left;
        self.state = next;
        self.notifier.countdown_tick(left);

        if left == 0 {
            self.countdown.cancel();
            self.transition(GamePhase::Curtain);
        }
        true
    }

    /// The player says they are ready before (or without) the countdown.
    pub fn finish_observation(&mut self) -> bool {
        self.transition(GamePhase::Curtain)
    }

    /// Hide words for the current round. Only during the curtain; runs at most
    /// once per round.
    pub fn hide_words(&mut self) -> bool {
        if self.state.phase != GamePhase::Curtain {
            tracing::warn!(phase = ?self.state.phase, "hide requested outside curtain");
            return false;
        }
        let mut next = self.state.clone();
        let config = next.config;
        let changed = apply_hiding(
            &mut next.current_round,
            &config,
            &mut self.rng,
            self.notifier.as_mut(),
        );
        if changed {
            self.state = next;
        }
        changed
    }

    /// Curtain animation done: make sure words are hidden, then ask.
    pub fn finish_curtain(&mut self) -> bool {
        if self.state.phase != GamePhase::Curtain {
            tracing::warn!(phase = ?self.state.phase, "curtain finished outside curtain");
            return false;
        }
        self.hide_words();
        self.transition(GamePhase::Answer)
    }

    fn in_answer(&self, mode: GameMode, what: &str) -> bool {
        if self.state.phase != GamePhase::Answer || self.state.mode != mode {
            tracing::warn!(phase = ?self.state.phase, mode = ?self.state.mode, "{} not allowed now", what);
            return false;
        }
        true
    }

    /// Select or deselect an answer option. At most as many selections as
    /// hidden words.
    pub fn toggle_answer(&mut self, word_id: &str) -> bool {
        if !self.in_answer(GameMode::Challenge, "answer selection") {
            return false;
        }
        let round = &self.state.current_round;
        if !round.answer_options.iter().any(|w| w.id == word_id) {
            tracing::warn!(word_id, "not an answer option");
            return false;
        }
        let limit = round.hidden_words.len();

        let mut next = self.state.clone();
        let answers = &mut next.current_round.user_answers;
        if !answers.remove(word_id) {
            if answers.len() >= limit {
                tracing::debug!(limit, "answer limit reached");
                return false;
            }
            answers.insert(word_id.to_string());
        }
        self.state = next;
        true
    }

    /// Check the selection against the hidden words and show the result.
    pub fn submit_answers(&mut self) -> bool {
        if !self.in_answer(GameMode::Challenge, "submit") {
            return false;
        }
        let mut next = self.state.clone();
        let correct = next.current_round.user_answers == next.current_round.hidden_ids();
        next.current_round.is_correct = Some(correct);
        self.state = next;
        self.notifier.round_finished(Some(correct));
        self.transition(GamePhase::Result)
    }

    /// Casual mode: show the hidden words without grading.
    pub fn reveal_answer(&mut self) -> bool {
        if !self.in_answer(GameMode::Casual, "reveal") {
            return false;
        }
        self.notifier.round_finished(None);
        self.transition(GamePhase::Result)
    }

    /// Back to idle from the result screen, or drop a pending word load while
    /// idle.
    pub fn reset(&mut self) -> bool {
        match self.state.phase {
            GamePhase::Result => self.transition(GamePhase::Idle),
            GamePhase::Idle => {
                self.discard_pending_load();
                let mut next = self.state.clone();
                next.load_error = None;
                self.state = next;
                true
            }
            phase => {
                tracing::warn!(?phase, "reset only allowed from idle or result");
                false
            }
        }
    }

    fn discard_pending_load(&mut self) {
        if self.pending_load.take().is_some() {
            self.epoch += 1;
            tracing::debug!(epoch = self.epoch, "discarded pending word load");
        }
        if self.state.is_loading {
            let mut next = self.state.clone();
            next.is_loading = false;
            self.state = next;
        }
    }

    /// Merge a config update. Only between rounds. Returns the new config
    /// when it changed.
    /// Swap in a previously saved config before the first round. Only valid
    /// configs are taken, and only while idle.
    pub fn restore_config(&mut self, config: GameConfig) -> bool {
        if self.state.phase != GamePhase::Idle || !validate(&config).is_valid {
            return false;
        }
        if config == self.state.config {
            return true;
        }
        self.discard_pending_load();
        let mut next = self.state.clone();
        next.config = config;
        next.mode = config.game_mode;
        self.state = next;
        tracing::info!(?config, "config restored");
        true
    }

    pub fn update_config(&mut self, update: ConfigUpdate) -> Option<GameConfig> {
        if !matches!(self.state.phase, GamePhase::Idle | GamePhase::Result) {
            tracing::warn!(phase = ?self.state.phase, "config change during a round rejected");
            return None;
        }
        let merged = merge(&self.state.config, update);
        if merged == self.state.config {
            return None;
        }
        // A load in flight was sized for the old config.
        self.discard_pending_load();
        let mut next = self.state.clone();
        next.config = merged;
        if next.phase == GamePhase::Idle {
            next.mode = merged.game_mode;
        }
        self.state = next;
        tracing::info!(config = ?merged, "config updated");
        Some(merged)
    }
}
