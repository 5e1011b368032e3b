//! Renderable views of stored days: CSV sheets, JSON snapshots, chart series.

use chrono::Timelike;
use serde::Serialize;

use crate::domain::{round_currency, DailySummary, ExpenseRecord, TripRecord};
use crate::errors::{EarningsError, Result};
use crate::storage::{ordered_cells, Collection, RowRecord};

/// Trips as CSV text using the stored column layout.
pub fn trips_csv(trips: &[TripRecord]) -> Result<String> {
    records_csv(trips)
}

pub fn expenses_csv(expenses: &[ExpenseRecord]) -> Result<String> {
    records_csv(expenses)
}

pub fn summary_json(summary: &DailySummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

fn records_csv<R: RowRecord>(records: &[R]) -> Result<String> {
    let collection = R::COLLECTION;
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(collection.columns())
        .map_err(|err| export_error(collection, err))?;
    for record in records {
        let cells = ordered_cells(collection, &record.to_row())?;
        writer
            .write_record(&cells)
            .map_err(|err| export_error(collection, err))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| export_error(collection, err))?;
    String::from_utf8(bytes).map_err(|err| export_error(collection, err))
}

fn export_error(collection: Collection, err: impl std::fmt::Display) -> EarningsError {
    EarningsError::Config(format!("cannot export {collection}: {err}"))
}

/// One labelled bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub label: &'static str,
    pub value: f64,
}

/// Bar series summarizing a closed day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceChart {
    pub bars: Vec<ChartBar>,
    /// Start hour with the most trips; the earliest-seen hour wins ties.
    pub peak_hour: Option<u32>,
}

impl BalanceChart {
    pub fn from_day(trips: &[TripRecord], summary: &DailySummary) -> Self {
        let mut hours: Vec<(u32, u32)> = Vec::new();
        for trip in trips {
            let hour = trip.start_time.hour();
            match hours.iter_mut().find(|(seen, _)| *seen == hour) {
                Some((_, count)) => *count += 1,
                None => hours.push((hour, 1)),
            }
        }
        let peak = hours.iter().fold(None, |best: Option<(u32, u32)>, &(hour, count)| {
            match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((hour, count)),
            }
        });

        let bars = vec![
            ChartBar {
                label: "balance",
                value: summary.net_balance,
            },
            ChartBar {
                label: "gross",
                value: round_currency(summary.gross_earnings + summary.bonus),
            },
            ChartBar {
                label: "costs",
                value: round_currency(summary.total_expenses + summary.fuel_cost),
            },
            ChartBar {
                label: "trips",
                value: f64::from(summary.trip_count),
            },
            ChartBar {
                label: "peak_hour_trips",
                value: f64::from(peak.map_or(0, |(_, count)| count)),
            },
        ];
        Self {
            bars,
            peak_hour: peak.map(|(hour, _)| hour),
        }
    }

    pub fn value(&self, label: &str) -> Option<f64> {
        self.bars
            .iter()
            .find(|bar| bar.label == label)
            .map(|bar| bar.value)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::core::services::{TripPolicy, TripService};
    use crate::domain::{TripInput, TripKind, UserId};

    fn trip(start: &str) -> TripRecord {
        TripService::validate(
            TripInput {
                user_id: UserId::new("ana").unwrap(),
                date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
                kind: TripKind::Normal,
                sequence: 1,
                start_time: start.into(),
                end_time: "23:59".into(),
                base_earning: 10.0,
                airport: false,
                tip: 0.5,
            },
            &TripPolicy::default(),
        )
        .unwrap()
    }

    fn summary() -> DailySummary {
        DailySummary {
            user_id: UserId::new("ana").unwrap(),
            date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            trip_count: 4,
            gross_earnings: 42.0,
            total_expenses: 5.5,
            fuel_cost: 10.0,
            distance_km: 31.5,
            bonus: 0.0,
            net_balance: 26.5,
        }
    }

    #[test]
    fn trips_csv_has_header_and_rows() {
        let text = trips_csv(&[trip("08:15")]).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some(Collection::Trips.columns().join(",").as_str())
        );
        let row = lines.next().unwrap();
        assert!(row.contains(",normal,1,08:15,23:59,10.00,0.00,0.50,10.50,"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn summary_json_is_pretty() {
        let json = summary_json(&summary()).unwrap();
        assert!(json.contains("\"net_balance\": 26.5"));
        assert!(json.contains("\"date\": \"2025-03-03\""));
    }

    #[test]
    fn chart_reports_peak_hour() {
        let trips = vec![trip("08:15"), trip("09:05"), trip("09:40"), trip("08:50")];
        let chart = BalanceChart::from_day(&trips, &summary());
        assert_eq!(chart.peak_hour, Some(8));
        assert_eq!(chart.value("peak_hour_trips"), Some(2.0));
        assert_eq!(chart.value("costs"), Some(15.5));
        assert_eq!(chart.value("trips"), Some(4.0));
    }

    #[test]
    fn chart_of_empty_day_has_no_peak() {
        let chart = BalanceChart::from_day(&[], &summary());
        assert_eq!(chart.peak_hour, None);
        assert_eq!(chart.value("peak_hour_trips"), Some(0.0));
    }
}
