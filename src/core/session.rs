//! Pending, not-yet-persisted records for one driver and one day.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::core::services::{ExpenseService, TripPolicy, TripService};
use crate::domain::{ExpenseInput, ExpenseRecord, TripInput, TripKind, TripRecord, UserId};
use crate::errors::Result;

/// Trip fields as typed by the driver; owner, date and sequence come from the session.
#[derive(Debug, Clone, PartialEq)]
pub struct TripDraft {
    pub kind: TripKind,
    pub start_time: String,
    pub end_time: String,
    pub base_earning: f64,
    pub airport: bool,
    pub tip: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub concept: String,
    pub amount: f64,
}

/// Accumulates validated trips and expenses until the day is closed.
#[derive(Debug, Clone)]
pub struct DaySession {
    user_id: UserId,
    date: NaiveDate,
    trips: Vec<TripRecord>,
    expenses: Vec<ExpenseRecord>,
    last_sequence: HashMap<TripKind, u32>,
}

impl DaySession {
    pub fn new(user_id: UserId, date: NaiveDate) -> Self {
        Self {
            user_id,
            date,
            trips: Vec::new(),
            expenses: Vec::new(),
            last_sequence: HashMap::new(),
        }
    }

    /// A session whose sequence numbers continue after the trips already stored.
    pub fn resume(user_id: UserId, date: NaiveDate, persisted: &[TripRecord]) -> Self {
        let mut session = Self::new(user_id, date);
        for trip in persisted
            .iter()
            .filter(|trip| trip.user_id == session.user_id && trip.date == date)
        {
            let last = session.last_sequence.entry(trip.kind).or_insert(0);
            *last = (*last).max(trip.sequence);
        }
        session
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn add_trip(&mut self, draft: TripDraft, policy: &TripPolicy) -> Result<&TripRecord> {
        let sequence = self.last_sequence.get(&draft.kind).copied().unwrap_or(0) + 1;
        let record = TripService::validate(
            TripInput {
                user_id: self.user_id.clone(),
                date: self.date,
                kind: draft.kind,
                sequence,
                start_time: draft.start_time,
                end_time: draft.end_time,
                base_earning: draft.base_earning,
                airport: draft.airport,
                tip: draft.tip,
            },
            policy,
        )?;
        self.last_sequence.insert(record.kind, sequence);
        debug!(
            user = %self.user_id,
            date = %self.date,
            kind = %record.kind,
            sequence,
            total = record.total_earning,
            "trip added"
        );
        self.trips.push(record);
        Ok(&self.trips[self.trips.len() - 1])
    }

    pub fn add_expense(&mut self, draft: ExpenseDraft) -> Result<&ExpenseRecord> {
        let record = ExpenseService::validate(ExpenseInput {
            user_id: self.user_id.clone(),
            date: self.date,
            concept: draft.concept,
            amount: draft.amount,
        })?;
        debug!(user = %self.user_id, date = %self.date, amount = record.amount, "expense added");
        self.expenses.push(record);
        Ok(&self.expenses[self.expenses.len() - 1])
    }

    pub fn pending_trips(&self) -> &[TripRecord] {
        &self.trips
    }

    pub fn pending_expenses(&self) -> &[ExpenseRecord] {
        &self.expenses
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty() && self.expenses.is_empty()
    }
}
