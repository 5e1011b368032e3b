use chrono::NaiveDate;
use tracing::{debug, info};

use crate::domain::{DailySummary, DateWindow, UserId};
use crate::errors::Result;

use super::{load_records, write_records, RowStore};

/// Upsert layer over the Summaries collection, keyed by (user, date).
///
/// Each write is a read-modify-write of the whole collection and is not
/// atomic across sessions: two sessions upserting the same key race and the
/// later write wins.
pub struct SummaryStore<'a> {
    store: &'a dyn RowStore,
}

impl<'a> SummaryStore<'a> {
    pub fn new(store: &'a dyn RowStore) -> Self {
        Self { store }
    }

    /// Replaces any summary for the same user and date with `summary`.
    pub fn upsert(&self, summary: &DailySummary) -> Result<()> {
        let existing: Vec<DailySummary> = load_records(self.store)?;
        let before = existing.len();
        let mut rows: Vec<DailySummary> = existing
            .into_iter()
            .filter(|row| !row.matches(&summary.user_id, summary.date))
            .collect();
        let replaced = before - rows.len();
        rows.push(summary.clone());
        write_records(self.store, &rows)?;
        info!(
            user = %summary.user_id,
            date = %summary.date,
            replaced,
            "daily summary stored"
        );
        Ok(())
    }

    /// The user's summaries inside `window` (all when `None`), newest first.
    pub fn query(&self, user_id: &UserId, window: Option<DateWindow>) -> Result<Vec<DailySummary>> {
        let mut rows: Vec<DailySummary> = load_records::<DailySummary>(self.store)?
            .into_iter()
            .filter(|row| &row.user_id == user_id)
            .filter(|row| window.map_or(true, |w| w.contains(row.date)))
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }

    pub fn get(&self, user_id: &UserId, date: NaiveDate) -> Result<Option<DailySummary>> {
        Ok(load_records::<DailySummary>(self.store)?
            .into_iter()
            .find(|row| row.matches(user_id, date)))
    }

    /// Deletes every summary of the user, returning how many were removed.
    pub fn remove_user(&self, user_id: &UserId) -> Result<usize> {
        let existing: Vec<DailySummary> = load_records(self.store)?;
        let before = existing.len();
        let kept: Vec<DailySummary> = existing
            .into_iter()
            .filter(|row| &row.user_id != user_id)
            .collect();
        let removed = before - kept.len();
        if removed > 0 {
            write_records(self.store, &kept)?;
        }
        debug!(user = %user_id, removed, "summaries removed");
        Ok(removed)
    }
}
