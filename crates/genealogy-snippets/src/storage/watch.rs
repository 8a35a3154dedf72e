//! Change notification for slots modified outside the current view.
//!
//! A [`StoreWatcher`] polls slot fingerprints through its own store handle
//! and publishes the name of every slot whose value changed on a
//! [`ChangeFeed`]. Views hold a [`Subscription`] for as long as they are
//! open; dropping it unregisters them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace, warn};

use super::KeyValueStore;
use crate::error::Result;

/// A notice delivered to a subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// The value of this slot changed.
    Key(String),
    /// The subscriber fell behind and missed this many notices; any slot
    /// may have changed.
    Lagged(u64),
}

impl Change {
    /// Whether a subscriber interested in `key` has to react to this notice.
    #[must_use]
    pub fn affects(&self, key: &str) -> bool {
        match self {
            Self::Key(changed) => changed == key,
            Self::Lagged(_) => true,
        }
    }
}

/// Broadcast of changed slot names.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<String>,
}

impl ChangeFeed {
    /// Create a feed that buffers up to `capacity` notices per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Register a new subscriber.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Publish a changed slot name. Returns how many subscribers got it.
    pub fn notify(&self, key: &str) -> usize {
        trace!("Publishing change of slot {key:?}");
        self.tx.send(key.to_string()).unwrap_or(0)
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// One registration on a [`ChangeFeed`].
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<String>,
}

impl Subscription {
    /// Wait for the next notice. `None` once every feed handle is dropped.
    pub async fn next(&mut self) -> Option<Change> {
        match self.rx.recv().await {
            Ok(key) => Some(Change::Key(key)),
            Err(RecvError::Lagged(missed)) => Some(Change::Lagged(missed)),
            Err(RecvError::Closed) => None,
        }
    }

    /// Take a pending notice without waiting.
    pub fn try_next(&mut self) -> Option<Change> {
        match self.rx.try_recv() {
            Ok(key) => Some(Change::Key(key)),
            Err(TryRecvError::Lagged(missed)) => Some(Change::Lagged(missed)),
            Err(TryRecvError::Empty | TryRecvError::Closed) => None,
        }
    }
}

/// A cloneable stop signal for a running watcher.
#[derive(Debug, Clone, Default)]
pub struct WatchHandle {
    stop_signal: Arc<AtomicBool>,
}

impl WatchHandle {
    /// Create a new handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal the watcher to stop after its current tick.
    pub fn stop(&self) {
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Check if the stop signal has been sent.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.stop_signal.load(Ordering::SeqCst)
    }
}

/// Polls slot fingerprints and reports slots whose value changed.
#[derive(Debug)]
pub struct StoreWatcher<S> {
    store: S,
    last_seen: HashMap<String, Option<String>>,
    interval: Duration,
}

impl<S: KeyValueStore> StoreWatcher<S> {
    /// Watch `keys` in `store`, taking the current values as the baseline.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial fingerprints cannot be read.
    pub fn new(store: S, keys: &[&str], interval: Duration) -> Result<Self> {
        let mut last_seen = HashMap::with_capacity(keys.len());
        for key in keys {
            last_seen.insert((*key).to_string(), store.fingerprint(key)?);
        }
        Ok(Self {
            store,
            last_seen,
            interval,
        })
    }

    /// Compare fingerprints against the last poll and return changed keys.
    ///
    /// # Errors
    ///
    /// Returns an error if a fingerprint cannot be read.
    pub fn poll(&mut self) -> Result<Vec<String>> {
        let mut changed = Vec::new();
        for (key, last) in &mut self.last_seen {
            let current = self.store.fingerprint(key)?;
            if current != *last {
                debug!("Slot {key:?} changed outside this view");
                *last = current;
                changed.push(key.clone());
            }
        }
        changed.sort();
        Ok(changed)
    }

    /// Poll on an interval, publishing changes, until `handle` is stopped.
    ///
    /// A failed poll is logged and retried on the next tick.
    pub async fn run(mut self, feed: ChangeFeed, handle: WatchHandle) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if handle.should_stop() {
                debug!("Store watcher stopping");
                break;
            }
            match self.poll() {
                Ok(changed) => {
                    for key in changed {
                        feed.notify(&key);
                    }
                }
                Err(e) => warn!("Failed to poll store for changes: {e}"),
            }
        }
    }
}
