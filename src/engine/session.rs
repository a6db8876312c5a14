//! Async session driver.
//!
//! One task owns the `MissingWordsGame` and handles commands, countdown ticks
//! and word-load completions strictly one after another. After each one the
//! full state is published on a watch channel for the presentation layer.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::engine::config::{ConfigStore, ConfigUpdate};
use crate::engine::machine::MissingWordsGame;
use crate::engine::models::{GamePhase, GameState, MissingWord, StageSize, WordId};
use crate::games::missing_words::round::WordFilter;
use crate::words::source::{FetchError, WordSource};

/// User input, sent through a `SessionHandle`.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    StartRound,
    FinishObservation,
    FinishCurtain,
    ToggleAnswer(WordId),
    SubmitAnswers,
    RevealAnswer,
    Reset,
    UpdateConfig(ConfigUpdate),
    SetStage(StageSize),
    SetWordFilter(WordFilter),
}

/// Results of background work, tagged with the epoch they belong to.
#[derive(Debug)]
pub enum SessionEvent {
    Tick {
        epoch: u64,
    },
    WordsLoaded {
        epoch: u64,
        result: Result<Vec<MissingWord>, FetchError>,
    },
}

pub struct GameSession {
    game: MissingWordsGame,
    source: Arc<dyn WordSource>,
    store: Option<ConfigStore>,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    state_tx: watch::Sender<GameState>,
}

/// Cheap to clone. The session stops once every handle is dropped.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    state: watch::Receiver<GameState>,
}

impl GameSession {
    /// Move `game` into a new task. When a `store` is given, the saved config
    /// replaces the game's config at start and later changes are written back.
    pub fn spawn(
        mut game: MissingWordsGame,
        source: Arc<dyn WordSource>,
        store: Option<ConfigStore>,
    ) -> (SessionHandle, JoinHandle<()>) {
        if let Some(store) = &store {
            game.restore_config(store.load());
        }
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (events_tx, events) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(game.state().clone());
        game.attach_events(events_tx.clone());

        let session = GameSession {
            game,
            source,
            store,
            commands,
            events_tx,
            events,
            state_tx,
        };
        tracing::info!(source = session.source.name(), "starting game session");
        let task = tokio::spawn(session.run());
        let handle = SessionHandle {
            commands: commands_tx,
            state: state_rx,
        };
        (handle, task)
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(event) = self.events.recv() => self.handle_event(event),
            }
            self.publish();
        }
        tracing::info!(stats = ?self.game.state().stats, "game session closed");
    }

    fn handle_command(&mut self, command: SessionCommand) {
        tracing::debug!(?command, "session command");
        match command {
            SessionCommand::StartRound => self.start_round(),
            SessionCommand::FinishObservation => {
                self.game.finish_observation();
            }
            SessionCommand::FinishCurtain => {
                self.game.finish_curtain();
            }
            SessionCommand::ToggleAnswer(id) => {
                self.game.toggle_answer(&id);
            }
            SessionCommand::SubmitAnswers => {
                self.game.submit_answers();
            }
            SessionCommand::RevealAnswer => {
                self.game.reveal_answer();
            }
            SessionCommand::Reset => {
                self.game.reset();
            }
            SessionCommand::UpdateConfig(update) => {
                if let Some(config) = self.game.update_config(update) {
                    if let Some(store) = &self.store {
                        store.save(&config);
                    }
                }
            }
            SessionCommand::SetStage(stage) => self.game.set_stage(stage),
            SessionCommand::SetWordFilter(filter) => self.game.set_word_filter(filter),
        }
    }

    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Tick { epoch } => {
                self.game.tick(epoch);
            }
            SessionEvent::WordsLoaded { epoch, result } => {
                self.game.apply_words(epoch, result);
            }
        }
    }

    fn start_round(&mut self) {
        let Some(request) = self.game.request_round() else {
            return;
        };
        let source = Arc::clone(&self.source);
        let events = self.events_tx.clone();
        let mut rng = self.game.fork_rng();
        tokio::spawn(async move {
            let result = source.get_words(&request.query, &mut rng).await;
            let _ = events.send(SessionEvent::WordsLoaded {
                epoch: request.epoch,
                result,
            });
        });
    }

    fn publish(&self) {
        let current = self.game.state();
        self.state_tx.send_if_modified(|published| {
            if *published == *current {
                false
            } else {
                *published = current.clone();
                true
            }
        });
    }
}

impl SessionHandle {
    fn send(&self, command: SessionCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    pub fn start_round(&self) -> bool {
        self.send(SessionCommand::StartRound)
    }

    pub fn finish_observation(&self) -> bool {
        self.send(SessionCommand::FinishObservation)
    }

    pub fn finish_curtain(&self) -> bool {
        self.send(SessionCommand::FinishCurtain)
    }

    pub fn toggle_answer(&self, word_id: impl Into<WordId>) -> bool {
        self.send(SessionCommand::ToggleAnswer(word_id.into()))
    }

    pub fn submit_answers(&self) -> bool {
        self.send(SessionCommand::SubmitAnswers)
    }

    pub fn reveal_answer(&self) -> bool {
        self.send(SessionCommand::RevealAnswer)
    }

    pub fn reset(&self) -> bool {
        self.send(SessionCommand::Reset)
    }

    pub fn update_config(&self, update: ConfigUpdate) -> bool {
        self.send(SessionCommand::UpdateConfig(update))
    }

    pub fn set_stage(&self, stage: StageSize) -> bool {
        self.send(SessionCommand::SetStage(stage))
    }

    pub fn set_word_filter(&self, filter: WordFilter) -> bool {
        self.send(SessionCommand::SetWordFilter(filter))
    }

    /// Latest published state.
    pub fn state(&self) -> GameState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GameState> {
        self.state.clone()
    }

    /// Wait until the published state satisfies `predicate`. `None` if the
    /// session ended first.
    pub async fn wait_until(&self, predicate: impl FnMut(&GameState) -> bool) -> Option<GameState> {
        let mut rx = self.state.clone();
        let state = rx.wait_for(predicate).await.ok()?;
        Some(state.clone())
    }

    pub async fn wait_for_phase(&self, phase: GamePhase) -> Option<GameState> {
        self.wait_until(|s| s.phase == phase).await
    }
}
