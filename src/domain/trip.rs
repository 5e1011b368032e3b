use std::{fmt, str::FromStr};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{round_currency, UserId};
use crate::errors::EarningsError;

/// Whether a trip came from the regular queue or was logged as an extra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripKind {
    Normal,
    Extra,
}

impl TripKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripKind::Normal => "normal",
            TripKind::Extra => "extra",
        }
    }
}

impl fmt::Display for TripKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripKind {
    type Err = EarningsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(TripKind::Normal),
            "extra" => Ok(TripKind::Extra),
            other => Err(EarningsError::validation(format!(
                "unknown trip kind `{other}`"
            ))),
        }
    }
}

/// Raw trip fields as entered, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct TripInput {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub kind: TripKind,
    pub sequence: u32,
    pub start_time: String,
    pub end_time: String,
    pub base_earning: f64,
    pub airport: bool,
    pub tip: f64,
}

/// A validated trip with its derived earning fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub kind: TripKind,
    pub sequence: u32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub base_earning: f64,
    pub airport_surcharge: f64,
    pub tip: f64,
    pub total_earning: f64,
    pub duration_minutes: i64,
    pub earnings_per_hour: f64,
}

impl TripRecord {
    pub fn duration_hours(&self) -> f64 {
        self.duration_minutes as f64 / 60.0
    }

    /// Recomputes the total from its components, rounded like the stored value.
    pub fn reconstructed_total(&self) -> f64 {
        round_currency(self.base_earning + self.airport_surcharge + self.tip)
    }
}
