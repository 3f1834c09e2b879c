//! Channel-keyed listener registry.
//!
//! Listeners run synchronously in registration order. A listener that returns
//! an error or panics is logged and skipped; delivery to the rest continues.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, PoisonError, RwLock};

use mcwatch_core::{Channel, LogEvent};
use tracing::warn;

pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

type Listener = Arc<dyn Fn(&LogEvent) -> Result<(), ListenerError> + Send + Sync>;

#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<HashMap<Channel, Vec<Listener>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one channel.
    pub fn on<L>(&self, channel: Channel, listener: L)
    where
        L: Fn(&LogEvent) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(channel)
            .or_default()
            .push(Arc::new(listener));
    }

    pub fn listener_count(&self, channel: Channel) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&channel)
            .map_or(0, Vec::len)
    }

    /// Deliver `event` to every listener on its channel.
    ///
    /// Returns the number of listeners that completed successfully.
    pub fn emit(&self, event: &LogEvent) -> usize {
        let channel = event.channel();
        // Snapshot so listeners may register more listeners without deadlocking.
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&channel)
            .cloned()
            .unwrap_or_default();

        let mut delivered = 0;
        for listener in &listeners {
            match catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => {
                    warn!(channel = %channel, error = %e, "log event listener failed");
                }
                Err(_) => {
                    warn!(channel = %channel, "log event listener panicked");
                }
            }
        }
        delivered
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        let mut map = f.debug_map();
        for (channel, list) in listeners.iter() {
            map.entry(channel, &list.len());
        }
        map.finish()
    }
}
