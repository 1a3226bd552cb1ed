//! Token-keyed listener set with per-listener tick/subtick gating

use dashmap::DashMap;
use hadron_core::TickEvent;
use hadron_ports::{Granularity, ListenerToken, TickCallback};
use std::sync::atomic::{AtomicU64, Ordering};

struct Entry {
    /// Registration order, used to keep notification rounds deterministic
    sequence: u64,
    granularity: Granularity,
    callback: TickCallback,
}

/// Identity-keyed set of tick callbacks
///
/// Every notification round works on a snapshot taken before the first
/// callback runs, so callbacks may add or remove listeners; such changes
/// apply from the next round on.
#[derive(Default)]
pub struct ListenerRegistry {
    entries: DashMap<ListenerToken, Entry>,
    next_sequence: AtomicU64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` and return a fresh token for it
    pub fn add(&self, granularity: Granularity, callback: TickCallback) -> ListenerToken {
        let token = ListenerToken::new();
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(
            token,
            Entry {
                sequence,
                granularity,
                callback,
            },
        );
        log::debug!("registered {} ({:?})", token, granularity);
        token
    }

    /// Unregister the callback behind `token`.
    ///
    /// Unknown tokens are ignored; returns whether anything was removed.
    pub fn remove(&self, token: ListenerToken) -> bool {
        match self.entries.remove(&token) {
            Some(_) => {
                log::debug!("removed {}", token);
                true
            }
            None => false,
        }
    }

    /// Invoke every listener whose granularity admits `event.current`,
    /// one at a time, awaiting each before starting the next.
    pub async fn notify_all(&self, event: TickEvent) {
        let mut round: Vec<(u64, TickCallback)> = self
            .entries
            .iter()
            .filter(|entry| entry.granularity.admits(event.current))
            .map(|entry| (entry.sequence, entry.callback.clone()))
            .collect();
        if round.is_empty() {
            return;
        }
        round.sort_unstable_by_key(|(sequence, _)| *sequence);

        log::trace!(
            "notifying {} listeners at {} ({} -> {})",
            round.len(),
            event.current,
            event.start,
            event.end
        );
        for (_, callback) in round {
            callback(event).await;
        }
    }

    pub fn contains(&self, token: ListenerToken) -> bool {
        self.entries.contains_key(&token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every listener
    pub fn clear(&self) {
        self.entries.clear();
    }
}
