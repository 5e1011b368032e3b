use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::UserId;

/// Raw expense fields as entered.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseInput {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub concept: String,
    pub amount: f64,
}

/// An incidental cost (tolls, parking, car wash) logged against a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub concept: String,
    pub amount: f64,
}
