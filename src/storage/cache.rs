use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};

use tracing::debug;

use crate::errors::Result;

use super::{Collection, Row, RowStore};

struct CacheEntry {
    loaded_at: Instant,
    rows: Vec<Row>,
}

/// Read-through cache with per-collection expiry.
///
/// Reads may be stale for up to `ttl` after a write made by another session.
/// Writes through this cache always drop the collection's entry, so the
/// writer's own next read goes to the backing store.
pub struct CachedRowStore<S> {
    inner: S,
    ttl: Duration,
    entries: Mutex<HashMap<Collection, CacheEntry>>,
}

impl<S: RowStore> CachedRowStore<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn invalidate(&self, collection: Collection) {
        if let Ok(mut entries) = self.entries.lock() {
            if entries.remove(&collection).is_some() {
                debug!(collection = %collection, "cache entry invalidated");
            }
        }
    }

    pub fn invalidate_all(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    fn cached(&self, collection: Collection) -> Option<Vec<Row>> {
        let entries = self.entries.lock().ok()?;
        let entry = entries.get(&collection)?;
        if entry.loaded_at.elapsed() < self.ttl {
            Some(entry.rows.clone())
        } else {
            None
        }
    }
}

impl<S: RowStore> RowStore for CachedRowStore<S> {
    fn read_all(&self, collection: Collection) -> Result<Vec<Row>> {
        if let Some(rows) = self.cached(collection) {
            return Ok(rows);
        }
        let rows = self.inner.read_all(collection)?;
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                collection,
                CacheEntry {
                    loaded_at: Instant::now(),
                    rows: rows.clone(),
                },
            );
        }
        Ok(rows)
    }

    fn write_all(&self, collection: Collection, rows: &[Row]) -> Result<()> {
        let outcome = self.inner.write_all(collection, rows);
        self.invalidate(collection);
        outcome
    }

    fn append_rows(&self, collection: Collection, rows: &[Row]) -> Result<()> {
        let outcome = self.inner.append_rows(collection, rows);
        self.invalidate(collection);
        outcome
    }
}
