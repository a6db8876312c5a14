//! GameNotifier — the event/audio hook the machine calls instead of reaching
//! into global state. The presentation layer plugs sound effects in here.

use std::sync::{Arc, Mutex};

use crate::engine::models::{GamePhase, MissingWord};

pub trait GameNotifier: Send {
    fn phase_changed(&mut self, _from: GamePhase, _to: GamePhase) {}

    /// Once per countdown second, after the decrement.
    fn countdown_tick(&mut self, _seconds_left: u32) {}

    fn words_hidden(&mut self, _hidden: &[MissingWord]) {}

    /// `None` in casual mode, where the answer is only revealed.
    fn round_finished(&mut self, _correct: Option<bool>) {}
}

pub struct NoopNotifier;

impl GameNotifier for NoopNotifier {}

/// Logs every notification through `tracing`.
pub struct TracingNotifier;

impl GameNotifier for TracingNotifier {
    fn phase_changed(&mut self, from: GamePhase, to: GamePhase) {
        tracing::info!(?from, ?to, "phase changed");
    }

    fn countdown_tick(&mut self, seconds_left: u32) {
        tracing::debug!(seconds_left, "countdown");
    }

    fn words_hidden(&mut self, hidden: &[MissingWord]) {
        let words: Vec<&str> = hidden.iter().map(|w| w.text.as_str()).collect();
        tracing::debug!(?words, "words hidden");
    }

    fn round_finished(&mut self, correct: Option<bool>) {
        tracing::info!(?correct, "round finished");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    PhaseChanged { from: GamePhase, to: GamePhase },
    CountdownTick(u32),
    WordsHidden(Vec<String>),
    RoundFinished(Option<bool>),
}

/// Records notifications into a shared log, for tests.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    log: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Notification> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    fn push(&self, n: Notification) {
        if let Ok(mut log) = self.log.lock() {
            log.push(n);
        }
    }
}

impl GameNotifier for RecordingNotifier {
    fn phase_changed(&mut self, from: GamePhase, to: GamePhase) {
        self.push(Notification::PhaseChanged { from, to });
    }

    fn countdown_tick(&mut self, seconds_left: u32) {
        self.push(Notification::CountdownTick(seconds_left));
    }

    fn words_hidden(&mut self, hidden: &[MissingWord]) {
        self.push(Notification::WordsHidden(hidden.iter().map(|w| w.id.clone()).collect()));
    }

    fn round_finished(&mut self, correct: Option<bool>) {
        self.push(Notification::RoundFinished(correct));
    }
}
