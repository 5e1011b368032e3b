//! Row-oriented persistence: the adapter boundary between typed records and
//! whatever keeps the rows (memory, CSV files, a spreadsheet service).

pub mod cache;
pub mod csv_backend;
pub mod memory;
pub mod records;
pub mod summary_store;

use std::{collections::BTreeMap, fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::errors::{EarningsError, Result};

pub use cache::CachedRowStore;
pub use csv_backend::CsvRowStore;
pub use memory::MemoryRowStore;
pub use records::{append_records, load_records, write_records, RowRecord};
pub use summary_store::SummaryStore;

/// One stored row: column name to raw cell text.
pub type Row = BTreeMap<String, String>;

/// Logical collections kept by the row store, each with a fixed column set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Collection {
    Users,
    Trips,
    Expenses,
    Summaries,
    Budgets,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Users,
        Collection::Trips,
        Collection::Expenses,
        Collection::Summaries,
        Collection::Budgets,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Trips => "trips",
            Collection::Expenses => "expenses",
            Collection::Summaries => "summaries",
            Collection::Budgets => "budgets",
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Collection::Users => &["user_id", "credential_hash"],
            Collection::Trips => &[
                "id",
                "user_id",
                "date",
                "kind",
                "sequence",
                "start_time",
                "end_time",
                "base_earning",
                "airport_surcharge",
                "tip",
                "total_earning",
                "earnings_per_hour",
            ],
            Collection::Expenses => &["id", "user_id", "date", "concept", "amount"],
            Collection::Summaries => &[
                "user_id",
                "date",
                "trip_count",
                "gross_earnings",
                "total_expenses",
                "fuel_cost",
                "distance_km",
                "bonus",
                "net_balance",
            ],
            Collection::Budgets => &["user_id", "name", "monthly_amount", "due_day", "paid"],
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Abstraction over row-store backends.
///
/// Every write fully replaces (`write_all`) or extends (`append_rows`) one
/// collection. Implementations must reject rows whose columns differ from
/// [`Collection::columns`].
pub trait RowStore: Send + Sync {
    fn read_all(&self, collection: Collection) -> Result<Vec<Row>>;
    fn write_all(&self, collection: Collection, rows: &[Row]) -> Result<()>;
    fn append_rows(&self, collection: Collection, rows: &[Row]) -> Result<()>;
}

impl<T: RowStore + ?Sized> RowStore for Box<T> {
    fn read_all(&self, collection: Collection) -> Result<Vec<Row>> {
        (**self).read_all(collection)
    }

    fn write_all(&self, collection: Collection, rows: &[Row]) -> Result<()> {
        (**self).write_all(collection, rows)
    }

    fn append_rows(&self, collection: Collection, rows: &[Row]) -> Result<()> {
        (**self).append_rows(collection, rows)
    }
}

impl<T: RowStore + ?Sized> RowStore for Arc<T> {
    fn read_all(&self, collection: Collection) -> Result<Vec<Row>> {
        (**self).read_all(collection)
    }

    fn write_all(&self, collection: Collection, rows: &[Row]) -> Result<()> {
        (**self).write_all(collection, rows)
    }

    fn append_rows(&self, collection: Collection, rows: &[Row]) -> Result<()> {
        (**self).append_rows(collection, rows)
    }
}

/// Returns the row's cells in column order, rejecting missing or unknown columns.
/// Checks that `row` carries exactly the collection's columns.
pub(crate) fn ensure_columns(collection: Collection, row: &Row) -> Result<()> {
    let columns = collection.columns();
    if let Some(unknown) = row.keys().find(|key| !columns.contains(&key.as_str())) {
        return Err(EarningsError::malformed(
            collection,
            format!("unexpected column `{unknown}`"),
        ));
    }
    match columns.iter().find(|column| !row.contains_key(**column)) {
        Some(missing) => Err(EarningsError::malformed(
            collection,
            format!("missing column `{missing}`"),
        )),
        None => Ok(()),
    }
}

pub(crate) fn ordered_cells(collection: Collection, row: &Row) -> Result<Vec<String>> {
    ensure_columns(collection, row)?;
    Ok(collection
        .columns()
        .iter()
        .map(|column| row.get(*column).cloned().unwrap_or_default())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn ordered_cells_follow_column_order() {
        let cells = ordered_cells(
            Collection::Users,
            &row(&[("credential_hash", "abc"), ("user_id", "ana")]),
        )
        .unwrap();
        assert_eq!(cells, vec!["ana".to_string(), "abc".to_string()]);
    }

    #[test]
    fn ordered_cells_reject_unknown_and_missing_columns() {
        let err = ordered_cells(
            Collection::Users,
            &row(&[("user_id", "ana"), ("credential_hash", ""), ("pin", "1234")]),
        )
        .expect_err("unknown column");
        assert!(err.to_string().contains("pin"));

        let err = ordered_cells(Collection::Users, &row(&[("user_id", "ana")]))
            .expect_err("missing column");
        assert_eq!(err.collection(), Some(Collection::Users));
    }

    #[test]
    fn ensure_columns_accepts_any_key_order() {
        let ok = row(&[("credential_hash", ""), ("user_id", "ana")]);
        assert!(ensure_columns(Collection::Users, &ok).is_ok());
        let err = ensure_columns(Collection::Users, &row(&[("credential_hash", "")]))
            .expect_err("missing user id");
        assert!(err.to_string().contains("user_id"));
    }
}
