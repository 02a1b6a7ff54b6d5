//! Per-client request throttle.
//!
//! Each client key maps to the instant of its last accepted request. A request
//! is accepted only when the cooldown has strictly elapsed since that instant,
//! and the check and the update happen in one step on the map entry.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Minimum time a client must wait between accepted requests.
pub const COOLDOWN: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub struct RequestThrottle {
    last_seen: DashMap<String, Instant>,
    cooldown: Duration,
}

impl RequestThrottle {
    pub fn new() -> Self {
        Self::with_cooldown(COOLDOWN)
    }

    pub fn with_cooldown(cooldown: Duration) -> Self {
        Self {
            last_seen: DashMap::new(),
            cooldown,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Returns `true` when the request from `client` must be rejected.
    pub fn is_limited(&self, client: &str) -> bool {
        self.is_limited_at(client, Instant::now())
    }

    /// Merge `now` into the entry for `client`.
    ///
    /// The entry is held exclusively for the whole decision, so concurrent
    /// callers on one key are serialized: only the caller whose `now` ends up
    /// stored is accepted, everyone else sees the previous instant win.
    pub fn is_limited_at(&self, client: &str, now: Instant) -> bool {
        match self.last_seen.entry(client.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(now);
                false
            }
            Entry::Occupied(mut entry) => {
                if now.saturating_duration_since(*entry.get()) > self.cooldown {
                    entry.insert(now);
                    false
                } else {
                    true
                }
            }
        }
    }

    /// Drop every client whose window has elapsed.
    ///
    /// An elapsed entry decides exactly like a missing one, so this never
    /// changes the outcome of a later call.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let before = self.last_seen.len();
        self.last_seen
            .retain(|_, last| now.saturating_duration_since(*last) <= self.cooldown);
        before.saturating_sub(self.last_seen.len())
    }

    pub fn tracked_clients(&self) -> usize {
        self.last_seen.len()
    }
}

impl Default for RequestThrottle {
    fn default() -> Self {
        Self::new()
    }
}
