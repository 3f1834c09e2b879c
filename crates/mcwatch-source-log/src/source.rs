//! Event source: lifecycle (Idle → Active → Stopped) and the timer-driven
//! poll loop that feeds classified events to subscribed listeners.
//!
//! The loop runs as one tokio task, so poll cycles never overlap. `stop()`
//! only prevents future cycles; a cycle already running finishes and its
//! events are still delivered. A loop started after `stop()` waits for the
//! previous loop to finish before its first cycle.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use mcwatch_core::{Channel, LogEvent, LogPatterns};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use crate::bus::{EventBus, ListenerError};
use crate::error::TailError;
use crate::reader::LogFile;
use crate::tail::LogTail;

/// Default poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    Idle,
    Active,
    Stopped,
}

enum Lifecycle {
    Idle,
    Active {
        shutdown: watch::Sender<bool>,
        handle: JoinHandle<()>,
    },
    Stopped {
        /// Previous loop, possibly still finishing its last cycle.
        draining: Option<JoinHandle<()>>,
    },
}

pub struct LogEventSource<F: LogFile + 'static> {
    file: Arc<F>,
    patterns: LogPatterns,
    poll_interval: Duration,
    bus: Arc<EventBus>,
    lifecycle: Mutex<Lifecycle>,
}

impl<F: LogFile + 'static> LogEventSource<F> {
    pub fn new(file: F, patterns: LogPatterns) -> Self {
        Self {
            file: Arc::new(file),
            patterns,
            poll_interval: DEFAULT_POLL_INTERVAL,
            bus: Arc::new(EventBus::new()),
            lifecycle: Mutex::new(Lifecycle::Idle),
        }
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Subscribe to a channel. Allowed before or after `start()`.
    pub fn on<L>(&self, channel: Channel, listener: L) -> &Self
    where
        L: Fn(&LogEvent) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.bus.on(channel, listener);
        self
    }

    pub fn status(&self) -> SourceStatus {
        match &*self.lock() {
            Lifecycle::Idle => SourceStatus::Idle,
            Lifecycle::Active { .. } => SourceStatus::Active,
            Lifecycle::Stopped { .. } => SourceStatus::Stopped,
        }
    }

    /// Seed the cursor at the current end of file and spawn the poll loop.
    ///
    /// Must be called from within a tokio runtime. Restarting after `stop()`
    /// re-seeds the cursor, so lines written while stopped are skipped.
    pub fn start(&self) -> Result<(), TailError> {
        let mut lifecycle = self.lock();
        if matches!(*lifecycle, Lifecycle::Active { .. }) {
            return Err(TailError::AlreadyActive);
        }

        let tail = LogTail::new(Arc::clone(&self.file), self.patterns.clone())?;
        let previous = match &mut *lifecycle {
            Lifecycle::Stopped { draining } => draining.take(),
            _ => None,
        };
        let (shutdown, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run_poll_loop(
            tail,
            Arc::clone(&self.bus),
            self.poll_interval,
            shutdown_rx,
            previous,
        ));

        tracing::info!(
            path = %self.file.path().display(),
            interval = ?self.poll_interval,
            "log tail started"
        );
        *lifecycle = Lifecycle::Active { shutdown, handle };
        Ok(())
    }

    /// Stop future poll cycles. Calling it when not active is a no-op.
    pub fn stop(&self) {
        let mut lifecycle = self.lock();
        let previous = std::mem::replace(&mut *lifecycle, Lifecycle::Stopped { draining: None });
        *lifecycle = match previous {
            Lifecycle::Active { shutdown, handle } => {
                let _ = shutdown.send(true);
                tracing::info!(path = %self.file.path().display(), "log tail stopped");
                Lifecycle::Stopped {
                    draining: Some(handle),
                }
            }
            other => other,
        };
    }

    /// Stop and wait for the poll loop (including an in-flight cycle) to end.
    pub async fn shutdown(&self) {
        self.stop();
        let draining = match &mut *self.lock() {
            Lifecycle::Stopped { draining } => draining.take(),
            _ => None,
        };
        if let Some(handle) = draining {
            if let Err(e) = handle.await {
                tracing::warn!("log poll loop ended abnormally: {e}");
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<F: LogFile + 'static> Drop for LogEventSource<F> {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_poll_loop<F: LogFile + 'static>(
    mut tail: LogTail<F>,
    bus: Arc<EventBus>,
    poll_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
    previous: Option<JoinHandle<()>>,
) {
    if let Some(previous) = previous {
        if let Err(e) = previous.await {
            tracing::warn!("previous log poll loop ended abnormally: {e}");
        }
    }

    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately; the first cycle runs one interval after start.
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }

        let events = tail.poll();
        if !events.is_empty() {
            tracing::debug!(count = events.len(), "emitting log events");
        }
        for event in &events {
            bus.emit(event);
        }
    }
}
