//! Per-identity expiry timers.
//!
//! Each identity has at most one outstanding timer. Every scheduled timer is
//! tagged with a generation; only the timer whose generation is still
//! registered may act when it fires, so a replaced or cancelled timer that
//! has already woken up is a no-op.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;

struct Entry {
    generation: u64,
    handle: JoinHandle<()>,
}

/// The set of outstanding expiry timers, keyed by identity.
#[derive(Default)]
pub(crate) struct ExpiryTimers {
    next_generation: AtomicU64,
    entries: Mutex<HashMap<String, Entry>>,
}

impl ExpiryTimers {
    /// Reserve a generation for a timer about to be spawned.
    pub(crate) fn next_generation(&self) -> u64 {
        self.next_generation.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Register a spawned timer, aborting any timer it replaces.
    pub(crate) fn install(&self, identity: &str, generation: u64, handle: JoinHandle<()>) {
        let previous = self
            .entries()
            .insert(identity.to_string(), Entry { generation, handle });
        if let Some(previous) = previous {
            previous.handle.abort();
        }
    }

    /// Abort and forget the identity's timer. Returns whether one existed.
    pub(crate) fn cancel(&self, identity: &str) -> bool {
        match self.entries().remove(identity) {
            Some(entry) => {
                entry.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Called by a firing timer. Forgets the entry and returns `true` only if
    /// `generation` is still the registered one.
    pub(crate) fn finish(&self, identity: &str, generation: u64) -> bool {
        let mut entries = self.entries();
        match entries.get(identity) {
            Some(entry) if entry.generation == generation => {
                entries.remove(identity);
                true
            }
            _ => false,
        }
    }

    /// Number of outstanding timers.
    pub(crate) fn len(&self) -> usize {
        self.entries().len()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        // The map stays consistent even if a holder panicked.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ExpiryTimers {
    fn drop(&mut self) {
        let entries = self
            .entries
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        for (_, entry) in entries.drain() {
            entry.handle.abort();
        }
    }
}
