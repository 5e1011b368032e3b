use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::UserId;

/// Closed-day financial snapshot; at most one per user and date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub trip_count: u32,
    pub gross_earnings: f64,
    pub total_expenses: f64,
    pub fuel_cost: f64,
    pub distance_km: f64,
    pub bonus: f64,
    pub net_balance: f64,
}

impl DailySummary {
    pub fn matches(&self, user_id: &UserId, date: NaiveDate) -> bool {
        &self.user_id == user_id && self.date == date
    }
}
