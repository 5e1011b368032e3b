use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::core::services::aggregator::unique_by_id;
use crate::core::services::{BonusSchedule, DailyAggregator, DayTotalsInput, TripPolicy};
use crate::core::session::DaySession;
use crate::domain::{DailySummary, DateWindow, ExpenseRecord, TripRecord, UserId};
use crate::errors::Result;
use crate::storage::{append_records, load_records, write_records, RowStore, SummaryStore};

/// Pricing and bonus rules applied while recording and closing days.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EarningsPolicy {
    pub trip: TripPolicy,
    pub bonus: BonusSchedule,
}

/// Trips and expenses already stored for one day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayRecords {
    pub trips: Vec<TripRecord>,
    pub expenses: Vec<ExpenseRecord>,
}

/// Row counts removed by [`EarningsManager::wipe_user`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WipeReport {
    pub trips: usize,
    pub expenses: usize,
    pub summaries: usize,
}

/// Facade that coordinates day sessions, aggregation and persistence.
pub struct EarningsManager {
    store: Box<dyn RowStore>,
    policy: EarningsPolicy,
}

impl EarningsManager {
    pub fn new(store: Box<dyn RowStore>, policy: EarningsPolicy) -> Self {
        Self { store, policy }
    }

    pub fn store(&self) -> &dyn RowStore {
        self.store.as_ref()
    }

    pub fn policy(&self) -> &EarningsPolicy {
        &self.policy
    }

    /// Starts a session whose sequence numbers follow the day's stored trips.
    pub fn open_day(&self, user_id: &UserId, date: NaiveDate) -> Result<DaySession> {
        let stored = self.day_records(user_id, date)?;
        Ok(DaySession::resume(user_id.clone(), date, &stored.trips))
    }

    /// Aggregates stored and pending records, then persists trips, expenses
    /// and finally the summary.
    ///
    /// Nothing is written when aggregation fails. Records already stored are
    /// skipped, so a close that failed midway can be retried with the same
    /// session.
    pub fn close_day(
        &self,
        session: &DaySession,
        fuel_cost: f64,
        distance_km: f64,
    ) -> Result<DailySummary> {
        let user_id = session.user_id();
        let date = session.date();
        let stored = self.day_records(user_id, date)?;

        let stored_trip_ids: HashSet<_> = stored.trips.iter().map(|trip| trip.id).collect();
        let stored_expense_ids: HashSet<_> =
            stored.expenses.iter().map(|expense| expense.id).collect();
        let new_trips: Vec<TripRecord> = unique_by_id(session.pending_trips(), |trip| trip.id)
            .into_iter()
            .filter(|trip| !stored_trip_ids.contains(&trip.id))
            .collect();
        let new_expenses: Vec<ExpenseRecord> =
            unique_by_id(session.pending_expenses(), |expense| expense.id)
                .into_iter()
                .filter(|expense| !stored_expense_ids.contains(&expense.id))
                .collect();

        let all_trips: Vec<TripRecord> = stored.trips.iter().chain(&new_trips).cloned().collect();
        let all_expenses: Vec<ExpenseRecord> = stored
            .expenses
            .iter()
            .chain(&new_expenses)
            .cloned()
            .collect();
        let summary = DailyAggregator::aggregate(
            DayTotalsInput {
                user_id,
                date,
                trips: &all_trips,
                expenses: &all_expenses,
                fuel_cost,
                distance_km,
            },
            &self.policy.bonus,
        )?;

        if let Err(err) = self.persist(&new_trips, &new_expenses, &summary) {
            warn!(
                user = %user_id,
                date = %date,
                collection = ?err.collection(),
                error = %err,
                "close day interrupted"
            );
            return Err(err);
        }

        info!(
            user = %user_id,
            date = %date,
            new_trips = new_trips.len(),
            new_expenses = new_expenses.len(),
            net_balance = summary.net_balance,
            "day closed"
        );
        Ok(summary)
    }

    pub fn day_records(&self, user_id: &UserId, date: NaiveDate) -> Result<DayRecords> {
        let trips = load_records::<TripRecord>(self.store())?
            .into_iter()
            .filter(|trip| &trip.user_id == user_id && trip.date == date)
            .collect();
        let expenses = load_records::<ExpenseRecord>(self.store())?
            .into_iter()
            .filter(|expense| &expense.user_id == user_id && expense.date == date)
            .collect();
        Ok(DayRecords { trips, expenses })
    }

    pub fn summaries(
        &self,
        user_id: &UserId,
        window: Option<DateWindow>,
    ) -> Result<Vec<DailySummary>> {
        SummaryStore::new(self.store()).query(user_id, window)
    }

    pub fn summary(&self, user_id: &UserId, date: NaiveDate) -> Result<Option<DailySummary>> {
        SummaryStore::new(self.store()).get(user_id, date)
    }

    /// Removes the user's trips, expenses and summaries.
    pub fn wipe_user(&self, user_id: &UserId) -> Result<WipeReport> {
        let trips: Vec<TripRecord> = load_records(self.store())?;
        let (removed_trips, kept_trips): (Vec<_>, Vec<_>) = trips
            .into_iter()
            .partition(|trip| &trip.user_id == user_id);
        if !removed_trips.is_empty() {
            write_records(self.store(), &kept_trips)?;
        }

        let expenses: Vec<ExpenseRecord> = load_records(self.store())?;
        let (removed_expenses, kept_expenses): (Vec<_>, Vec<_>) = expenses
            .into_iter()
            .partition(|expense| &expense.user_id == user_id);
        if !removed_expenses.is_empty() {
            write_records(self.store(), &kept_expenses)?;
        }

        let summaries = SummaryStore::new(self.store()).remove_user(user_id)?;
        let report = WipeReport {
            trips: removed_trips.len(),
            expenses: removed_expenses.len(),
            summaries,
        };
        info!(
            user = %user_id,
            trips = report.trips,
            expenses = report.expenses,
            summaries = report.summaries,
            "user data wiped"
        );
        Ok(report)
    }

    fn persist(
        &self,
        trips: &[TripRecord],
        expenses: &[ExpenseRecord],
        summary: &DailySummary,
    ) -> Result<()> {
        append_records(self.store(), trips)?;
        append_records(self.store(), expenses)?;
        SummaryStore::new(self.store()).upsert(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::session::{ExpenseDraft, TripDraft};
    use crate::domain::TripKind;
    use crate::errors::EarningsError;
    use crate::storage::{Collection, MemoryRowStore};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    fn ana() -> UserId {
        UserId::new("ana").unwrap()
    }

    fn manager() -> (EarningsManager, Arc<MemoryRowStore>) {
        let backing = Arc::new(MemoryRowStore::new());
        let manager = EarningsManager::new(Box::new(backing.clone()), EarningsPolicy::default());
        (manager, backing)
    }

    fn trip(base: f64) -> TripDraft {
        TripDraft {
            kind: TripKind::Normal,
            start_time: "10:00".into(),
            end_time: "10:30".into(),
            base_earning: base,
            airport: false,
            tip: 0.0,
        }
    }

    #[test]
    fn close_day_persists_everything() {
        let (manager, backing) = manager();
        let mut session = manager.open_day(&ana(), monday()).unwrap();
        for _ in 0..13 {
            session.add_trip(trip(20.0), &manager.policy().trip).unwrap();
        }
        session
            .add_expense(ExpenseDraft {
                concept: "peaje".into(),
                amount: 5.5,
            })
            .unwrap();

        let summary = manager.close_day(&session, 10.0, 50.0).unwrap();
        assert_eq!(summary.bonus, 16.0);
        assert_eq!(summary.net_balance, 260.5);
        assert_eq!(backing.row_count(Collection::Trips), 13);
        assert_eq!(backing.row_count(Collection::Expenses), 1);
        assert_eq!(manager.summary(&ana(), monday()).unwrap(), Some(summary));
    }

    #[test]
    fn closing_twice_does_not_duplicate_rows() {
        let (manager, backing) = manager();
        let mut session = manager.open_day(&ana(), monday()).unwrap();
        session.add_trip(trip(15.0), &manager.policy().trip).unwrap();
        let first = manager.close_day(&session, 2.0, 10.0).unwrap();
        let second = manager.close_day(&session, 2.0, 10.0).unwrap();
        assert_eq!(first, second);
        assert_eq!(backing.row_count(Collection::Trips), 1);
        assert_eq!(backing.row_count(Collection::Summaries), 1);

        let mut later = manager.open_day(&ana(), monday()).unwrap();
        let added = later.add_trip(trip(5.0), &manager.policy().trip).unwrap();
        assert_eq!(added.sequence, 2);
        let updated = manager.close_day(&later, 2.0, 12.0).unwrap();
        assert_eq!(updated.trip_count, 2);
        assert_eq!(updated.gross_earnings, 20.0);
        assert_eq!(backing.row_count(Collection::Summaries), 1);
    }

    #[test]
    fn missing_distance_writes_nothing() {
        let (manager, backing) = manager();
        let mut session = manager.open_day(&ana(), monday()).unwrap();
        session.add_trip(trip(15.0), &manager.policy().trip).unwrap();
        let err = manager.close_day(&session, 2.0, 0.0).expect_err("no distance");
        assert!(matches!(err, EarningsError::IncompleteInput(_)));
        for collection in Collection::ALL {
            assert_eq!(backing.row_count(collection), 0, "{collection}");
        }
    }

    #[test]
    fn store_failure_names_the_collection_and_retry_succeeds() {
        let (manager, backing) = manager();
        let mut session = manager.open_day(&ana(), monday()).unwrap();
        session.add_trip(trip(15.0), &manager.policy().trip).unwrap();
        session
            .add_expense(ExpenseDraft {
                concept: "parking".into(),
                amount: 3.0,
            })
            .unwrap();

        backing.fail_writes_to(Collection::Expenses);
        let err = manager.close_day(&session, 1.0, 8.0).expect_err("expenses down");
        assert_eq!(err.collection(), Some(Collection::Expenses));
        assert_eq!(backing.row_count(Collection::Trips), 1);
        assert_eq!(backing.row_count(Collection::Summaries), 0);

        backing.clear_failures();
        let summary = manager.close_day(&session, 1.0, 8.0).unwrap();
        assert_eq!(summary.total_expenses, 3.0);
        assert_eq!(backing.row_count(Collection::Trips), 1);
        assert_eq!(backing.row_count(Collection::Expenses), 1);
    }

    #[test]
    fn wipe_only_touches_the_given_user() {
        let (manager, backing) = manager();
        let luis = UserId::new("luis").unwrap();
        for user in [ana(), luis.clone()] {
            let mut session = manager.open_day(&user, monday()).unwrap();
            session.add_trip(trip(10.0), &manager.policy().trip).unwrap();
            manager.close_day(&session, 0.0, 5.0).unwrap();
        }

        let report = manager.wipe_user(&ana()).unwrap();
        assert_eq!(
            report,
            WipeReport {
                trips: 1,
                expenses: 0,
                summaries: 1
            }
        );
        assert_eq!(backing.row_count(Collection::Trips), 1);
        assert!(manager.summaries(&ana(), None).unwrap().is_empty());
        assert_eq!(manager.summaries(&luis, None).unwrap().len(), 1);
    }
}
