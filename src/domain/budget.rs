use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::common::UserId;

/// A recurring monthly bill the driver wants reminders for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCategory {
    pub user_id: UserId,
    pub name: String,
    pub monthly_amount: f64,
    pub due_day: u32,
    pub paid: bool,
}

impl BudgetCategory {
    pub fn new(user_id: UserId, name: impl Into<String>, monthly_amount: f64, due_day: u32) -> Self {
        Self {
            user_id,
            name: name.into(),
            monthly_amount,
            due_day,
            paid: false,
        }
    }

    pub fn same_name(&self, other: &str) -> bool {
        self.name.trim().to_lowercase() == other.trim().to_lowercase()
    }

    /// First occurrence of the due day on or after `today`.
    ///
    /// Due days past the end of a short month fall on the month's last day.
    pub fn next_due_date(&self, today: NaiveDate) -> NaiveDate {
        let this_month = due_in_month(today.year(), today.month(), self.due_day);
        if this_month >= today {
            return this_month;
        }
        let (year, month) = if today.month() == 12 {
            (today.year() + 1, 1)
        } else {
            (today.year(), today.month() + 1)
        };
        due_in_month(year, month, self.due_day)
    }

    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.next_due_date(today) - today).num_days()
    }
}

fn due_in_month(year: i32, month: u32, due_day: u32) -> NaiveDate {
    let last = last_day_of_month(year, month);
    let day = due_day.clamp(1, last.day());
    last.with_day(day).unwrap_or(last)
}

fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .map(|first| first - Duration::days(1))
        .unwrap_or(NaiveDate::MAX)
}
