//! Read-through cache for single-book lookups.

use crate::book::Book;
use crate::error::ApiError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct CacheEntry {
    book: Book,
    last_access: Instant,
}

/// Copies of stored books keyed by id, expiring after `ttl` without access.
pub struct BookCache {
    entries: DashMap<u64, CacheEntry>,
    ttl: Duration,
}

impl BookCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Returns the cached book or falls back to `load`.
    ///
    /// The entry stays locked while `load` runs, so concurrent misses for the
    /// same id hit the repository once. A `None` from `load` is not cached.
    pub fn get_or_load<F>(&self, id: u64, load: F) -> Result<Option<Book>, ApiError>
    where
        F: FnOnce(u64) -> Result<Option<Book>, ApiError>,
    {
        self.get_or_load_at(id, Instant::now(), load)
    }

    pub fn get_or_load_at<F>(&self, id: u64, now: Instant, load: F) -> Result<Option<Book>, ApiError>
    where
        F: FnOnce(u64) -> Result<Option<Book>, ApiError>,
    {
        match self.entries.entry(id) {
            Entry::Occupied(mut entry) if !self.is_expired(entry.get(), now) => {
                let cached = entry.get_mut();
                cached.last_access = now;
                Ok(Some(cached.book.clone()))
            }
            Entry::Occupied(mut entry) => {
                let loaded = load(id)?;
                match &loaded {
                    Some(book) => {
                        entry.insert(CacheEntry {
                            book: book.clone(),
                            last_access: now,
                        });
                    }
                    None => {
                        entry.remove();
                    }
                }
                Ok(loaded)
            }
            Entry::Vacant(entry) => {
                tracing::debug!(book_id = id, "Book cache miss");
                let loaded = load(id)?;
                if let Some(book) = &loaded {
                    entry.insert(CacheEntry {
                        book: book.clone(),
                        last_access: now,
                    });
                }
                Ok(loaded)
            }
        }
    }

    pub fn put(&self, book: Book) {
        self.entries.insert(
            book.id,
            CacheEntry {
                book,
                last_access: Instant::now(),
            },
        );
    }

    pub fn evict(&self, id: u64) {
        self.entries.remove(&id);
    }

    /// Drops entries idle for longer than the TTL
    pub fn purge_expired(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !self.is_expired(entry, now));
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.last_access) > self.ttl
    }
}
