//! Turns one day's trips and expenses into a [`DailySummary`].

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use crate::core::services::bonus::{BonusCalculator, BonusSchedule};
use crate::domain::common::ensure_non_negative;
use crate::domain::{round_currency, DailySummary, ExpenseRecord, TripRecord, UserId};
use crate::errors::{EarningsError, Result};

/// Everything recorded for one user and day, plus the closing figures.
#[derive(Debug, Clone, Copy)]
pub struct DayTotalsInput<'a> {
    pub user_id: &'a UserId,
    pub date: NaiveDate,
    pub trips: &'a [TripRecord],
    pub expenses: &'a [ExpenseRecord],
    pub fuel_cost: f64,
    pub distance_km: f64,
}

pub struct DailyAggregator;

impl DailyAggregator {
    /// Computes trip count, gross, expenses, bonus and net balance for the day.
    ///
    /// A summary cannot be finalized without a positive distance.
    pub fn aggregate(input: DayTotalsInput<'_>, schedule: &BonusSchedule) -> Result<DailySummary> {
        if !input.distance_km.is_finite() || input.distance_km <= 0.0 {
            return Err(EarningsError::IncompleteInput(format!(
                "distance driven must be greater than zero to close {}",
                input.date
            )));
        }
        let fuel_cost = round_currency(ensure_non_negative("fuel cost", input.fuel_cost)?);

        let trips = unique_by_id(input.trips, |trip| trip.id);
        let expenses = unique_by_id(input.expenses, |expense| expense.id);
        for trip in &trips {
            ensure_same_day(input.user_id, input.date, &trip.user_id, trip.date, "trip", trip.id)?;
        }
        for expense in &expenses {
            ensure_same_day(
                input.user_id,
                input.date,
                &expense.user_id,
                expense.date,
                "expense",
                expense.id,
            )?;
        }

        let trip_count = trips.len() as u32;
        let gross_earnings = round_currency(trips.iter().map(|trip| trip.total_earning).sum());
        let total_expenses =
            round_currency(expenses.iter().map(|expense| expense.amount).sum());
        let table = schedule.table_for(input.date)?;
        let bonus = BonusCalculator::bonus(table, i64::from(trip_count));
        let net_balance = round_currency(gross_earnings + bonus - total_expenses - fuel_cost);

        debug!(
            user = %input.user_id,
            date = %input.date,
            trip_count,
            schedule = %schedule.schedule_for(input.date),
            bonus,
            "aggregated day"
        );

        Ok(DailySummary {
            user_id: input.user_id.clone(),
            date: input.date,
            trip_count,
            gross_earnings,
            total_expenses,
            fuel_cost,
            distance_km: input.distance_km,
            bonus,
            net_balance,
        })
    }
}

/// Keeps the first record for each id, preserving order.
pub fn unique_by_id<T: Clone>(records: &[T], id: impl Fn(&T) -> Uuid) -> Vec<T> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|record| seen.insert(id(record)))
        .cloned()
        .collect()
}

fn ensure_same_day(
    user_id: &UserId,
    date: NaiveDate,
    record_user: &UserId,
    record_date: NaiveDate,
    label: &str,
    id: Uuid,
) -> Result<()> {
    if record_user != user_id || record_date != date {
        return Err(EarningsError::validation(format!(
            "{label} {id} belongs to {record_user} on {record_date}, not {user_id} on {date}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::bonus::ScheduleMode;
    use crate::core::services::trip_service::{TripPolicy, TripService};
    use crate::domain::{TripInput, TripKind};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    fn ana() -> UserId {
        UserId::new("ana").unwrap()
    }

    fn trip(total: f64) -> TripRecord {
        TripService::validate(
            TripInput {
                user_id: ana(),
                date: monday(),
                kind: TripKind::Normal,
                sequence: 1,
                start_time: "09:00".into(),
                end_time: "09:40".into(),
                base_earning: total,
                airport: false,
                tip: 0.0,
            },
            &TripPolicy::default(),
        )
        .unwrap()
    }

    fn expense(amount: f64) -> ExpenseRecord {
        ExpenseRecord {
            id: Uuid::new_v4(),
            user_id: ana(),
            date: monday(),
            concept: "peaje".into(),
            amount,
        }
    }

    fn input<'a>(
        user: &'a UserId,
        trips: &'a [TripRecord],
        expenses: &'a [ExpenseRecord],
        fuel: f64,
        km: f64,
    ) -> DayTotalsInput<'a> {
        DayTotalsInput {
            user_id: user,
            date: monday(),
            trips,
            expenses,
            fuel_cost: fuel,
            distance_km: km,
        }
    }

    #[test]
    fn thirteen_trips_earn_the_first_tier() {
        let user = ana();
        let trips: Vec<_> = (0..13).map(|_| trip(20.0)).collect();
        let summary = DailyAggregator::aggregate(
            input(&user, &trips, &[], 10.0, 50.0),
            &BonusSchedule::standard(ScheduleMode::Weekday),
        )
        .unwrap();
        assert_eq!(summary.trip_count, 13);
        assert_eq!(summary.gross_earnings, 260.0);
        assert_eq!(summary.bonus, 16.0);
        assert_eq!(summary.net_balance, 266.0);
    }

    #[test]
    fn expenses_and_fuel_reduce_the_balance() {
        let user = ana();
        let trips = vec![trip(12.35), trip(7.8)];
        let expenses = vec![expense(5.5), expense(1.25)];
        let summary = DailyAggregator::aggregate(
            input(&user, &trips, &expenses, 3.1, 22.4),
            &BonusSchedule::default(),
        )
        .unwrap();
        assert_eq!(summary.gross_earnings, 20.15);
        assert_eq!(summary.total_expenses, 6.75);
        assert_eq!(summary.bonus, 0.0);
        assert_eq!(summary.net_balance, 10.3);
    }

    #[test]
    fn zero_distance_blocks_the_summary() {
        let user = ana();
        let trips = vec![trip(20.0)];
        for km in [0.0, -4.0, f64::NAN] {
            let err = DailyAggregator::aggregate(
                input(&user, &trips, &[], 0.0, km),
                &BonusSchedule::default(),
            )
            .expect_err("distance required");
            assert!(matches!(err, EarningsError::IncompleteInput(_)), "{km}");
        }
    }

    #[test]
    fn duplicate_records_count_once() {
        let user = ana();
        let one = trip(20.0);
        let trips = vec![one.clone(), one];
        let summary =
            DailyAggregator::aggregate(input(&user, &trips, &[], 0.0, 5.0), &BonusSchedule::default())
                .unwrap();
        assert_eq!(summary.trip_count, 1);
        assert_eq!(summary.gross_earnings, 20.0);
    }

    #[test]
    fn records_from_other_days_are_rejected() {
        let user = ana();
        let mut stray = trip(20.0);
        stray.date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        let trips = vec![stray];
        let err =
            DailyAggregator::aggregate(input(&user, &trips, &[], 0.0, 5.0), &BonusSchedule::default())
                .expect_err("mismatched date");
        assert!(matches!(err, EarningsError::Validation(_)));
    }

    #[test]
    fn negative_fuel_is_invalid() {
        let user = ana();
        let err =
            DailyAggregator::aggregate(input(&user, &[], &[], -1.0, 5.0), &BonusSchedule::default())
                .expect_err("negative fuel");
        assert!(matches!(err, EarningsError::Validation(_)));
    }
}
