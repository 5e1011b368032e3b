use std::{
    collections::{HashMap, HashSet},
    sync::{Mutex, MutexGuard},
};

use crate::errors::{EarningsError, Result};

use super::{ordered_cells, Collection, Row, RowStore};

/// In-process row store, used by tests and as a scratch backend.
///
/// Writes to a collection can be made to fail on demand to exercise
/// partial-failure handling in callers.
#[derive(Debug, Default)]
pub struct MemoryRowStore {
    tables: Mutex<HashMap<Collection, Vec<Row>>>,
    failing: Mutex<HashSet<Collection>>,
}

impl MemoryRowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write to `collection` fail until cleared.
    pub fn fail_writes_to(&self, collection: Collection) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(collection);
        }
    }

    pub fn clear_failures(&self) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.clear();
        }
    }

    pub fn row_count(&self, collection: Collection) -> usize {
        self.tables
            .lock()
            .map(|tables| tables.get(&collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    fn tables(&self, collection: Collection) -> Result<MutexGuard<'_, HashMap<Collection, Vec<Row>>>> {
        self.tables
            .lock()
            .map_err(|_| EarningsError::unavailable(collection, "memory store lock poisoned"))
    }

    fn check_writable(&self, collection: Collection) -> Result<()> {
        let failing = self
            .failing
            .lock()
            .map_err(|_| EarningsError::unavailable(collection, "memory store lock poisoned"))?;
        if failing.contains(&collection) {
            return Err(EarningsError::unavailable(
                collection,
                "simulated write failure",
            ));
        }
        Ok(())
    }
}

impl RowStore for MemoryRowStore {
    fn read_all(&self, collection: Collection) -> Result<Vec<Row>> {
        let tables = self.tables(collection)?;
        Ok(tables.get(&collection).cloned().unwrap_or_default())
    }

    fn write_all(&self, collection: Collection, rows: &[Row]) -> Result<()> {
        self.check_writable(collection)?;
        for row in rows {
            ordered_cells(collection, row)?;
        }
        let mut tables = self.tables(collection)?;
        tables.insert(collection, rows.to_vec());
        Ok(())
    }

    fn append_rows(&self, collection: Collection, rows: &[Row]) -> Result<()> {
        self.check_writable(collection)?;
        for row in rows {
            ordered_cells(collection, row)?;
        }
        let mut tables = self.tables(collection)?;
        tables
            .entry(collection)
            .or_default()
            .extend(rows.iter().cloned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_row(id: &str) -> Row {
        [("user_id", id), ("credential_hash", "")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn append_then_overwrite() {
        let store = MemoryRowStore::new();
        store
            .append_rows(Collection::Users, &[user_row("ana"), user_row("luis")])
            .unwrap();
        assert_eq!(store.row_count(Collection::Users), 2);
        store
            .write_all(Collection::Users, &[user_row("ana")])
            .unwrap();
        assert_eq!(store.read_all(Collection::Users).unwrap().len(), 1);
    }

    #[test]
    fn simulated_failure_names_collection() {
        let store = MemoryRowStore::new();
        store.fail_writes_to(Collection::Summaries);
        let err = store
            .write_all(Collection::Summaries, &[])
            .expect_err("write must fail");
        assert_eq!(err.collection(), Some(Collection::Summaries));
        store.clear_failures();
        store.write_all(Collection::Summaries, &[]).unwrap();
    }
}
