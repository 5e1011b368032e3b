//! Validation and derived-field computation for single trips.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::ensure_non_negative;
use crate::domain::{round_currency, TripInput, TripKind, TripRecord};
use crate::errors::{EarningsError, Result};

/// Flat add-on for a normal trip that ends at the airport.
pub const DEFAULT_AIRPORT_SURCHARGE: f64 = 6.50;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Pricing knobs applied while validating trips.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TripPolicy {
    pub airport_surcharge: f64,
}

impl Default for TripPolicy {
    fn default() -> Self {
        Self {
            airport_surcharge: DEFAULT_AIRPORT_SURCHARGE,
        }
    }
}

/// Stateless trip validator.
pub struct TripService;

impl TripService {
    /// Validates raw trip input and computes surcharge, total, duration and hourly rate.
    pub fn validate(input: TripInput, policy: &TripPolicy) -> Result<TripRecord> {
        let start_time = parse_clock_time(&input.start_time)?;
        let end_time = parse_clock_time(&input.end_time)?;
        let base_earning =
            round_currency(ensure_non_negative("base earning", input.base_earning)?);
        let tip = round_currency(ensure_non_negative("tip", input.tip)?);
        let surcharge_rate =
            round_currency(ensure_non_negative("airport surcharge", policy.airport_surcharge)?);

        let airport_surcharge = match input.kind {
            TripKind::Normal if input.airport => surcharge_rate,
            _ => 0.0,
        };
        let total_earning = round_currency(base_earning + airport_surcharge + tip);
        let duration_minutes = duration_minutes(start_time, end_time);
        let earnings_per_hour = hourly_rate(total_earning, duration_minutes);

        Ok(TripRecord {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            date: input.date,
            kind: input.kind,
            sequence: input.sequence,
            start_time,
            end_time,
            base_earning,
            airport_surcharge,
            tip,
            total_earning,
            duration_minutes,
            earnings_per_hour,
        })
    }
}

/// Parses a strict 24-hour `HH:MM` clock time.
pub fn parse_clock_time(raw: &str) -> Result<NaiveTime> {
    let invalid = || EarningsError::validation(format!("`{raw}` is not a 24-hour HH:MM time"));
    let bytes = raw.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return Err(invalid());
    }
    let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(invalid());
    }
    let hour = u32::from((bytes[0] - b'0') * 10 + (bytes[1] - b'0'));
    let minute = u32::from((bytes[3] - b'0') * 10 + (bytes[4] - b'0'));
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Minutes between two clock times; an end before the start crosses midnight.
pub fn duration_minutes(start: NaiveTime, end: NaiveTime) -> i64 {
    let minutes = (end - start).num_minutes();
    if minutes < 0 {
        minutes + MINUTES_PER_DAY
    } else {
        minutes
    }
}

fn hourly_rate(total: f64, minutes: i64) -> f64 {
    if minutes <= 0 {
        return 0.0;
    }
    round_currency(total / (minutes as f64 / 60.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use chrono::NaiveDate;

    fn input(start: &str, end: &str) -> TripInput {
        TripInput {
            user_id: UserId::new("ana").unwrap(),
            date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            kind: TripKind::Normal,
            sequence: 1,
            start_time: start.into(),
            end_time: end.into(),
            base_earning: 15.0,
            airport: false,
            tip: 0.0,
        }
    }

    #[test]
    fn cross_midnight_trip_lasts_two_hours() {
        let trip = TripService::validate(input("23:00", "01:00"), &TripPolicy::default()).unwrap();
        assert_eq!(trip.duration_minutes, 120);
        assert_eq!(trip.duration_hours(), 2.0);
        assert_eq!(trip.earnings_per_hour, 7.5);
    }

    #[test]
    fn zero_length_trip_has_no_hourly_rate() {
        let trip = TripService::validate(input("10:15", "10:15"), &TripPolicy::default()).unwrap();
        assert_eq!(trip.duration_minutes, 0);
        assert_eq!(trip.earnings_per_hour, 0.0);
    }

    #[test]
    fn airport_surcharge_applies_to_normal_trips_only() {
        let mut normal = input("08:00", "08:30");
        normal.airport = true;
        normal.tip = 2.25;
        let trip = TripService::validate(normal.clone(), &TripPolicy::default()).unwrap();
        assert_eq!(trip.airport_surcharge, 6.5);
        assert_eq!(trip.total_earning, 23.75);
        assert_eq!(trip.earnings_per_hour, 47.5);

        let mut extra = normal;
        extra.kind = TripKind::Extra;
        let trip = TripService::validate(extra, &TripPolicy::default()).unwrap();
        assert_eq!(trip.airport_surcharge, 0.0);
        assert_eq!(trip.total_earning, 17.25);
    }

    #[test]
    fn configured_surcharge_is_used() {
        let mut airport = input("08:00", "09:00");
        airport.airport = true;
        let policy = TripPolicy {
            airport_surcharge: 8.0,
        };
        let trip = TripService::validate(airport, &policy).unwrap();
        assert_eq!(trip.total_earning, 23.0);
    }

    #[test]
    fn malformed_times_are_rejected() {
        for bad in ["24:00", "7:30", "07:60", "0730", "07:3a", "", " 07:30"] {
            let err = TripService::validate(input(bad, "08:00"), &TripPolicy::default())
                .expect_err("bad start time");
            assert!(matches!(err, EarningsError::Validation(_)), "{bad}: {err:?}");
        }
        assert!(parse_clock_time("00:00").is_ok());
        assert!(parse_clock_time("23:59").is_ok());
    }

    #[test]
    fn negative_money_is_rejected() {
        let mut negative_tip = input("08:00", "09:00");
        negative_tip.tip = -1.0;
        assert!(TripService::validate(negative_tip, &TripPolicy::default()).is_err());

        let mut negative_base = input("08:00", "09:00");
        negative_base.base_earning = -0.01;
        assert!(TripService::validate(negative_base, &TripPolicy::default()).is_err());

        let mut nan = input("08:00", "09:00");
        nan.base_earning = f64::NAN;
        assert!(TripService::validate(nan, &TripPolicy::default()).is_err());
    }

    #[test]
    fn components_are_stored_at_cent_precision() {
        let mut raw = input("08:00", "08:30");
        raw.base_earning = 1.005;
        raw.tip = 1.005;
        let trip = TripService::validate(raw, &TripPolicy::default()).unwrap();
        assert_eq!(trip.base_earning, round_currency(1.005));
        assert_eq!(trip.tip, round_currency(1.005));
        assert_eq!(trip.total_earning, trip.reconstructed_total());
    }

    #[test]
    fn total_reconstructs_from_components() {
        let amounts = [0.0, 0.01, 3.333, 9.995, 12.5, 1234.567];
        for base in amounts {
            for tip in amounts {
                for airport in [false, true] {
                    let mut raw = input("06:00", "07:45");
                    raw.base_earning = base;
                    raw.tip = tip;
                    raw.airport = airport;
                    let trip = TripService::validate(raw, &TripPolicy::default()).unwrap();
                    assert!((trip.reconstructed_total() - trip.total_earning).abs() < 1e-9);
                }
            }
        }
    }
}
