//! Cancelable one-second ticker feeding the session's event channel.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::engine::session::SessionEvent;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// At most one running ticker. Dropping the countdown cancels it.
#[derive(Debug, Default)]
pub struct Countdown {
    handle: Option<JoinHandle<()>>,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any running ticker, then send `SessionEvent::Tick { epoch }`
    /// every `period`, first one after a full period.
    pub fn start(&mut self, epoch: u64, period: Duration, events: UnboundedSender<SessionEvent>) {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if events.send(SessionEvent::Tick { epoch }).is_err() {
                    break;
                }
            }
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel();
    }
}
