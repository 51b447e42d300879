//! The expiry progress timer of the tunnel detail modal
//!
//! At most one timer runs: starting aborts the previous one, cancelling is
//! idempotent, and dropping the slot aborts whatever is left.

use super::event::TuiEvent;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tunnelmgr_common::constants::PROGRESS_TICK_MS;

pub struct ProgressTimer {
    tx: UnboundedSender<TuiEvent>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressTimer {
    pub fn new(tx: UnboundedSender<TuiEvent>) -> Self {
        Self { tx, handle: None }
    }

    /// Tick for modal `generation` every second, replacing any running timer
    ///
    /// The first tick fires one period after start; the view computes the
    /// initial state itself.
    pub fn start(&mut self, generation: u64) {
        self.cancel();

        let tx = self.tx.clone();
        let period = Duration::from_millis(PROGRESS_TICK_MS);
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.send(TuiEvent::ProgressTick(generation)).is_err() {
                    break;
                }
            }
        }));
    }

    /// Stop the running timer; safe to call when none is running
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ProgressTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
