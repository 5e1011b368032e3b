//! Typed conversions between domain records and raw rows.
//!
//! Parsing happens here, at the adapter edge: a row with the wrong columns,
//! unparsable cells or inconsistent derived values is rejected with
//! [`EarningsError::MalformedRow`] instead of leaking into business logic.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::domain::{
    round_currency, BudgetCategory, DailySummary, ExpenseRecord, TripKind, TripRecord,
    UserAccount, UserId,
};
use crate::errors::{EarningsError, Result};

use super::{ensure_columns, Collection, Row, RowStore};

const TIME_FORMAT: &str = "%H:%M";
const CURRENCY_TOLERANCE: f64 = 0.005;

/// A domain record persisted as one row of a fixed collection.
pub trait RowRecord: Sized {
    const COLLECTION: Collection;

    fn to_row(&self) -> Row;
    fn from_row(row: &Row) -> Result<Self>;
}

/// Reads and parses every row of `R`'s collection.
pub fn load_records<R: RowRecord>(store: &dyn RowStore) -> Result<Vec<R>> {
    store
        .read_all(R::COLLECTION)?
        .iter()
        .map(R::from_row)
        .collect()
}

pub fn append_records<R: RowRecord>(store: &dyn RowStore, records: &[R]) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    let rows: Vec<Row> = records.iter().map(RowRecord::to_row).collect();
    store.append_rows(R::COLLECTION, &rows)
}

/// Replaces the whole collection with `records`.
pub fn write_records<R: RowRecord>(store: &dyn RowStore, records: &[R]) -> Result<()> {
    let rows: Vec<Row> = records.iter().map(RowRecord::to_row).collect();
    store.write_all(R::COLLECTION, &rows)
}

struct Cells<'a> {
    collection: Collection,
    row: &'a Row,
}

impl<'a> Cells<'a> {
    fn new(collection: Collection, row: &'a Row) -> Result<Self> {
        ensure_columns(collection, row)?;
        Ok(Self { collection, row })
    }

    fn text(&self, column: &str) -> Result<&'a str> {
        self.row
            .get(column)
            .map(String::as_str)
            .ok_or_else(|| EarningsError::malformed(self.collection, format!("missing `{column}`")))
    }

    fn parse<T: FromStr>(&self, column: &str) -> Result<T> {
        let raw = self.text(column)?;
        raw.trim().parse::<T>().map_err(|_| {
            EarningsError::malformed(
                self.collection,
                format!("cannot parse `{column}` from `{raw}`"),
            )
        })
    }

    fn amount(&self, column: &str) -> Result<f64> {
        let value: f64 = self.parse(column)?;
        if !value.is_finite() {
            return Err(EarningsError::malformed(
                self.collection,
                format!("`{column}` is not a finite number"),
            ));
        }
        Ok(value)
    }

    fn user_id(&self) -> Result<UserId> {
        UserId::new(self.text("user_id")?)
            .map_err(|_| EarningsError::malformed(self.collection, "blank `user_id`"))
    }

    fn date(&self) -> Result<NaiveDate> {
        self.parse("date")
    }

    fn time(&self, column: &str) -> Result<NaiveTime> {
        let raw = self.text(column)?;
        NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT).map_err(|_| {
            EarningsError::malformed(self.collection, format!("bad time `{raw}` in `{column}`"))
        })
    }

    fn id(&self) -> Result<Uuid> {
        self.parse("id")
    }
}

fn row_of(pairs: Vec<(&str, String)>) -> Row {
    pairs
        .into_iter()
        .map(|(column, value)| (column.to_string(), value))
        .collect()
}

fn money(value: f64) -> String {
    format!("{:.2}", value)
}

impl RowRecord for TripRecord {
    const COLLECTION: Collection = Collection::Trips;

    fn to_row(&self) -> Row {
        row_of(vec![
            ("id", self.id.to_string()),
            ("user_id", self.user_id.to_string()),
            ("date", self.date.to_string()),
            ("kind", self.kind.to_string()),
            ("sequence", self.sequence.to_string()),
            ("start_time", self.start_time.format(TIME_FORMAT).to_string()),
            ("end_time", self.end_time.format(TIME_FORMAT).to_string()),
            ("base_earning", money(self.base_earning)),
            ("airport_surcharge", money(self.airport_surcharge)),
            ("tip", money(self.tip)),
            ("total_earning", money(self.total_earning)),
            ("earnings_per_hour", money(self.earnings_per_hour)),
        ])
    }

    fn from_row(row: &Row) -> Result<Self> {
        let cells = Cells::new(Self::COLLECTION, row)?;
        let kind = TripKind::from_str(cells.text("kind")?)
            .map_err(|err| EarningsError::malformed(Self::COLLECTION, err.to_string()))?;
        let start_time = cells.time("start_time")?;
        let end_time = cells.time("end_time")?;
        let record = TripRecord {
            id: cells.id()?,
            user_id: cells.user_id()?,
            date: cells.date()?,
            kind,
            sequence: cells.parse("sequence")?,
            start_time,
            end_time,
            base_earning: cells.amount("base_earning")?,
            airport_surcharge: cells.amount("airport_surcharge")?,
            tip: cells.amount("tip")?,
            total_earning: cells.amount("total_earning")?,
            duration_minutes: crate::core::services::trip_service::duration_minutes(
                start_time, end_time,
            ),
            earnings_per_hour: cells.amount("earnings_per_hour")?,
        };
        if (record.reconstructed_total() - record.total_earning).abs() > CURRENCY_TOLERANCE {
            return Err(EarningsError::malformed(
                Self::COLLECTION,
                format!(
                    "trip {} total {} does not match its components",
                    record.id, record.total_earning
                ),
            ));
        }
        if record.kind == TripKind::Extra && record.airport_surcharge != 0.0 {
            return Err(EarningsError::malformed(
                Self::COLLECTION,
                format!("extra trip {} carries an airport surcharge", record.id),
            ));
        }
        Ok(record)
    }
}

impl RowRecord for ExpenseRecord {
    const COLLECTION: Collection = Collection::Expenses;

    fn to_row(&self) -> Row {
        row_of(vec![
            ("id", self.id.to_string()),
            ("user_id", self.user_id.to_string()),
            ("date", self.date.to_string()),
            ("concept", self.concept.clone()),
            ("amount", money(self.amount)),
        ])
    }

    fn from_row(row: &Row) -> Result<Self> {
        let cells = Cells::new(Self::COLLECTION, row)?;
        Ok(ExpenseRecord {
            id: cells.id()?,
            user_id: cells.user_id()?,
            date: cells.date()?,
            concept: cells.text("concept")?.to_string(),
            amount: cells.amount("amount")?,
        })
    }
}

impl RowRecord for DailySummary {
    const COLLECTION: Collection = Collection::Summaries;

    fn to_row(&self) -> Row {
        row_of(vec![
            ("user_id", self.user_id.to_string()),
            ("date", self.date.to_string()),
            ("trip_count", self.trip_count.to_string()),
            ("gross_earnings", money(self.gross_earnings)),
            ("total_expenses", money(self.total_expenses)),
            ("fuel_cost", money(self.fuel_cost)),
            ("distance_km", self.distance_km.to_string()),
            ("bonus", money(self.bonus)),
            ("net_balance", money(self.net_balance)),
        ])
    }

    fn from_row(row: &Row) -> Result<Self> {
        let cells = Cells::new(Self::COLLECTION, row)?;
        let summary = DailySummary {
            user_id: cells.user_id()?,
            date: cells.date()?,
            trip_count: cells.parse("trip_count")?,
            gross_earnings: cells.amount("gross_earnings")?,
            total_expenses: cells.amount("total_expenses")?,
            fuel_cost: cells.amount("fuel_cost")?,
            distance_km: cells.amount("distance_km")?,
            bonus: cells.amount("bonus")?,
            net_balance: cells.amount("net_balance")?,
        };
        let expected = round_currency(
            summary.gross_earnings + summary.bonus - summary.total_expenses - summary.fuel_cost,
        );
        if (expected - summary.net_balance).abs() > CURRENCY_TOLERANCE {
            return Err(EarningsError::malformed(
                Self::COLLECTION,
                format!(
                    "summary {} {} net balance {} does not match its components",
                    summary.user_id, summary.date, summary.net_balance
                ),
            ));
        }
        Ok(summary)
    }
}

impl RowRecord for BudgetCategory {
    const COLLECTION: Collection = Collection::Budgets;

    fn to_row(&self) -> Row {
        row_of(vec![
            ("user_id", self.user_id.to_string()),
            ("name", self.name.clone()),
            ("monthly_amount", money(self.monthly_amount)),
            ("due_day", self.due_day.to_string()),
            ("paid", self.paid.to_string()),
        ])
    }

    fn from_row(row: &Row) -> Result<Self> {
        let cells = Cells::new(Self::COLLECTION, row)?;
        let due_day: u32 = cells.parse("due_day")?;
        if !(1..=31).contains(&due_day) {
            return Err(EarningsError::malformed(
                Self::COLLECTION,
                format!("due day {due_day} outside 1..=31"),
            ));
        }
        Ok(BudgetCategory {
            user_id: cells.user_id()?,
            name: cells.text("name")?.to_string(),
            monthly_amount: cells.amount("monthly_amount")?,
            due_day,
            paid: cells.parse("paid")?,
        })
    }
}

impl RowRecord for UserAccount {
    const COLLECTION: Collection = Collection::Users;

    fn to_row(&self) -> Row {
        row_of(vec![
            ("user_id", self.user_id.to_string()),
            (
                "credential_hash",
                self.credential_hash.clone().unwrap_or_default(),
            ),
        ])
    }

    fn from_row(row: &Row) -> Result<Self> {
        let cells = Cells::new(Self::COLLECTION, row)?;
        let hash = cells.text("credential_hash")?.trim();
        Ok(UserAccount {
            user_id: cells.user_id()?,
            credential_hash: (!hash.is_empty()).then(|| hash.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryRowStore;

    fn sample_trip() -> TripRecord {
        TripRecord {
            id: Uuid::new_v4(),
            user_id: UserId::new("ana").unwrap(),
            date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            kind: TripKind::Normal,
            sequence: 1,
            start_time: NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(1, 0, 0).unwrap(),
            base_earning: 12.0,
            airport_surcharge: 6.5,
            tip: 1.5,
            total_earning: 20.0,
            duration_minutes: 120,
            earnings_per_hour: 10.0,
        }
    }

    #[test]
    fn trip_rows_survive_the_store() {
        let store = MemoryRowStore::new();
        let trip = sample_trip();
        append_records(&store, &[trip.clone()]).unwrap();
        let loaded: Vec<TripRecord> = load_records(&store).unwrap();
        assert_eq!(loaded, vec![trip]);
    }

    #[test]
    fn tampered_total_is_rejected() {
        let mut row = sample_trip().to_row();
        row.insert("total_earning".into(), "99.00".into());
        let err = TripRecord::from_row(&row).expect_err("inconsistent total");
        assert!(matches!(err, EarningsError::MalformedRow { .. }));
    }

    #[test]
    fn unknown_kind_and_bad_time_are_rejected() {
        let mut row = sample_trip().to_row();
        row.insert("kind".into(), "airport".into());
        assert!(TripRecord::from_row(&row).is_err());

        let mut row = sample_trip().to_row();
        row.insert("start_time".into(), "25:00".into());
        assert!(TripRecord::from_row(&row).is_err());
    }

    #[test]
    fn federated_user_has_no_hash() {
        let account = UserAccount {
            user_id: UserId::new("ana@example.com").unwrap(),
            credential_hash: None,
        };
        let parsed = UserAccount::from_row(&account.to_row()).unwrap();
        assert!(parsed.is_federated());
    }

    #[test]
    fn budget_due_day_is_range_checked() {
        let category = BudgetCategory::new(UserId::new("ana").unwrap(), "Rent", 800.0, 5);
        let mut row = category.to_row();
        row.insert("due_day".into(), "40".into());
        assert!(BudgetCategory::from_row(&row).is_err());
    }
}
