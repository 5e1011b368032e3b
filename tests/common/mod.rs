#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex, time::Duration};

use chrono::NaiveDate;
use earnings_core::{
    core::{EarningsManager, EarningsPolicy, TripDraft},
    domain::{TripKind, UserId},
    storage::{CachedRowStore, CsvRowStore},
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// Manager over a cached CSV store in a fresh directory; returns the data dir too.
pub fn csv_manager(policy: EarningsPolicy) -> (EarningsManager, PathBuf) {
    let data_dir = temp_dir().join("data");
    let csv = CsvRowStore::new(&data_dir).expect("create csv store");
    let store = CachedRowStore::new(csv, Duration::from_secs(30));
    (EarningsManager::new(Box::new(store), policy), data_dir)
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn monday() -> NaiveDate {
    date(2025, 3, 3)
}

pub fn user(name: &str) -> UserId {
    UserId::new(name).expect("valid user id")
}

pub fn trip(start: &str, end: &str, base: f64) -> TripDraft {
    TripDraft {
        kind: TripKind::Normal,
        start_time: start.into(),
        end_time: end.into(),
        base_earning: base,
        airport: false,
        tip: 0.0,
    }
}
