//! Tiered daily bonus tables and the pure calculator that applies them.

use std::{collections::BTreeMap, fmt};

use chrono::{Datelike, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::domain::round_currency;
use crate::errors::{EarningsError, Result};

/// One step of a bonus table: reaching `threshold` trips adds `increment`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BonusTier {
    pub threshold: u32,
    pub increment: f64,
}

/// Tiers ordered by strictly increasing threshold, each needing at least one trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusTable {
    tiers: Vec<BonusTier>,
}

impl BonusTable {
    pub fn new(tiers: Vec<BonusTier>) -> Result<Self> {
        if tiers.iter().any(|tier| tier.threshold == 0) {
            return Err(EarningsError::validation(
                "bonus thresholds must be at least one trip",
            ));
        }
        for pair in tiers.windows(2) {
            if pair[1].threshold <= pair[0].threshold {
                return Err(EarningsError::validation(format!(
                    "bonus thresholds must strictly increase ({} then {})",
                    pair[0].threshold, pair[1].threshold
                )));
            }
        }
        if let Some(tier) = tiers
            .iter()
            .find(|tier| !tier.increment.is_finite() || tier.increment < 0.0)
        {
            return Err(EarningsError::validation(format!(
                "bonus increment for {} trips must be a non-negative amount",
                tier.threshold
            )));
        }
        Ok(Self { tiers })
    }

    pub fn from_pairs(pairs: &[(u32, f64)]) -> Result<Self> {
        Self::new(
            pairs
                .iter()
                .map(|&(threshold, increment)| BonusTier {
                    threshold,
                    increment,
                })
                .collect(),
        )
    }

    pub fn tiers(&self) -> &[BonusTier] {
        &self.tiers
    }

    fn fixed(pairs: &[(u32, f64)]) -> Self {
        Self {
            tiers: pairs
                .iter()
                .map(|&(threshold, increment)| BonusTier {
                    threshold,
                    increment,
                })
                .collect(),
        }
    }
}

/// Weekday buckets that share a bonus table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeekdayGroup {
    MonThu,
    FriSat,
    Sun,
}

impl WeekdayGroup {
    pub fn of(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon | Weekday::Tue | Weekday::Wed | Weekday::Thu => WeekdayGroup::MonThu,
            Weekday::Fri | Weekday::Sat => WeekdayGroup::FriSat,
            Weekday::Sun => WeekdayGroup::Sun,
        }
    }
}

/// Explicit key selecting one bonus table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScheduleId {
    Flat,
    Weekday(WeekdayGroup),
}

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScheduleId::Flat => "flat",
            ScheduleId::Weekday(WeekdayGroup::MonThu) => "mon-thu",
            ScheduleId::Weekday(WeekdayGroup::FriSat) => "fri-sat",
            ScheduleId::Weekday(WeekdayGroup::Sun) => "sun",
        };
        f.write_str(label)
    }
}

/// How a date is mapped to its [`ScheduleId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleMode {
    Flat,
    #[default]
    Weekday,
}

static STANDARD_TABLES: Lazy<BTreeMap<ScheduleId, BonusTable>> = Lazy::new(|| {
    let mon_thu = BonusTable::fixed(&[(13, 16.0), (17, 9.0), (21, 12.0), (25, 16.0)]);
    let fri_sat = BonusTable::fixed(&[(13, 15.0), (17, 10.0), (21, 13.0), (25, 15.0)]);
    let sun = BonusTable::fixed(&[(12, 14.0), (16, 10.0), (19, 11.0), (23, 14.0)]);
    BTreeMap::from([
        (ScheduleId::Flat, mon_thu.clone()),
        (ScheduleId::Weekday(WeekdayGroup::MonThu), mon_thu),
        (ScheduleId::Weekday(WeekdayGroup::FriSat), fri_sat),
        (ScheduleId::Weekday(WeekdayGroup::Sun), sun),
    ])
});

/// Set of bonus tables keyed by schedule id plus the rule choosing one per date.
#[derive(Debug, Clone, PartialEq)]
pub struct BonusSchedule {
    mode: ScheduleMode,
    tables: BTreeMap<ScheduleId, BonusTable>,
}

impl BonusSchedule {
    /// An empty schedule; register tables with [`BonusSchedule::with_table`].
    pub fn new(mode: ScheduleMode) -> Self {
        Self {
            mode,
            tables: BTreeMap::new(),
        }
    }

    /// The canonical driver tables (flat and per weekday group).
    pub fn standard(mode: ScheduleMode) -> Self {
        Self {
            mode,
            tables: STANDARD_TABLES.clone(),
        }
    }

    pub fn with_table(mut self, id: ScheduleId, table: BonusTable) -> Self {
        self.tables.insert(id, table);
        self
    }

    pub fn mode(&self) -> ScheduleMode {
        self.mode
    }

    pub fn schedule_for(&self, date: NaiveDate) -> ScheduleId {
        match self.mode {
            ScheduleMode::Flat => ScheduleId::Flat,
            ScheduleMode::Weekday => ScheduleId::Weekday(WeekdayGroup::of(date.weekday())),
        }
    }

    pub fn table(&self, id: ScheduleId) -> Result<&BonusTable> {
        self.tables
            .get(&id)
            .ok_or_else(|| EarningsError::Config(format!("no bonus table registered for `{id}`")))
    }

    pub fn table_for(&self, date: NaiveDate) -> Result<&BonusTable> {
        self.table(self.schedule_for(date))
    }
}

impl Default for BonusSchedule {
    fn default() -> Self {
        Self::standard(ScheduleMode::default())
    }
}

pub struct BonusCalculator;

impl BonusCalculator {
    /// Sum of every increment whose threshold is reached; negative counts earn nothing.
    pub fn bonus(table: &BonusTable, trip_count: i64) -> f64 {
        if trip_count <= 0 {
            return 0.0;
        }
        let total: f64 = table
            .tiers()
            .iter()
            .take_while(|tier| i64::from(tier.threshold) <= trip_count)
            .map(|tier| tier.increment)
            .sum();
        round_currency(total)
    }
}
