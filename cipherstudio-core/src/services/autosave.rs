//! Autosave timer - trailing debounce for project edits
//!
//! Each `schedule` cancels the pending task and spawns a new one that fires
//! once the quiescence window has passed. The owner awaits [`AutosaveTimer::due`]
//! and then runs the flush itself; the timer never touches project state.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

/// Quiescence window used when none is configured
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(1000);

pub struct AutosaveTimer {
    window: Duration,
    /// Generation of the armed task; ticks from older generations are ignored
    armed: Option<u64>,
    generation: u64,
    deadline: Option<Instant>,
    task: Option<JoinHandle<()>>,
    tick_tx: mpsc::UnboundedSender<u64>,
    tick_rx: mpsc::UnboundedReceiver<u64>,
}

impl AutosaveTimer {
    pub fn new(window: Duration) -> Self {
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        Self {
            window,
            armed: None,
            generation: 0,
            deadline: None,
            task: None,
            tick_tx,
            tick_rx,
        }
    }

    /// (Re)start the window from now, superseding any pending flush
    ///
    /// Outside a tokio runtime the flush stays armed but only fires once
    /// a runtime polls [`AutosaveTimer::due`].
    pub fn schedule(&mut self) {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;
        let deadline = Instant::now() + self.window;
        self.armed = Some(generation);
        self.deadline = Some(deadline);

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let tx = self.tick_tx.clone();
            self.task = Some(handle.spawn(async move {
                sleep_until(deadline).await;
                let _ = tx.send(generation);
            }));
        }
    }

    /// Drop the pending flush, if any
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.armed = None;
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.armed.is_some()
    }

    /// Resolve when the pending flush is due
    ///
    /// Never resolves while nothing is pending, so it can sit in a
    /// `tokio::select!` next to other event sources. Cancel-safe.
    pub async fn due(&mut self) {
        loop {
            let Some(generation) = self.armed else {
                std::future::pending::<()>().await;
                return;
            };

            if self.task.is_none() {
                // Armed without a runtime: run the sleep inline
                if let Some(deadline) = self.deadline {
                    sleep_until(deadline).await;
                }
                self.disarm();
                return;
            }

            match self.tick_rx.recv().await {
                Some(tick) if tick == generation && self.armed == Some(generation) => {
                    self.disarm();
                    return;
                }
                Some(_) => continue,
                None => std::future::pending::<()>().await,
            }
        }
    }

    fn disarm(&mut self) {
        self.armed = None;
        self.deadline = None;
        self.task = None;
    }
}

impl Drop for AutosaveTimer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
