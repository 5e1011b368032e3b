mod common;

use common::{date, user};
use earnings_core::{
    core::services::{AlertKind, BudgetService},
    domain::BudgetCategory,
    errors::EarningsError,
    storage::MemoryRowStore,
};

#[test]
fn alerts_follow_payment_state() {
    let store = MemoryRowStore::new();
    let ana = user("ana");
    BudgetService::add(&store, BudgetCategory::new(ana.clone(), "Rent", 900.0, 10)).unwrap();
    BudgetService::add(&store, BudgetCategory::new(ana.clone(), "Phone", 45.0, 7)).unwrap();

    let alerts = BudgetService::alerts(&store, &ana, date(2025, 3, 7), 3).unwrap();
    let kinds: Vec<(String, AlertKind)> = alerts
        .into_iter()
        .map(|alert| (alert.category, alert.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("Rent".to_string(), AlertKind::Upcoming),
            ("Phone".to_string(), AlertKind::DueToday),
        ]
    );

    BudgetService::mark_paid(&store, &ana, "phone").unwrap();
    let after = BudgetService::alerts(&store, &ana, date(2025, 3, 7), 3).unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].category, "Rent");
}

#[test]
fn short_month_due_day_falls_on_last_day() {
    let store = MemoryRowStore::new();
    let ana = user("ana");
    BudgetService::add(&store, BudgetCategory::new(ana.clone(), "Insurance", 120.0, 31)).unwrap();
    let alerts = BudgetService::alerts(&store, &ana, date(2025, 2, 28), 3).unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::DueToday);
}

#[test]
fn categories_are_scoped_per_user() {
    let store = MemoryRowStore::new();
    let ana = user("ana");
    let luis = user("luis");
    BudgetService::add(&store, BudgetCategory::new(ana.clone(), "Rent", 900.0, 10)).unwrap();
    BudgetService::add(&store, BudgetCategory::new(luis.clone(), "Rent", 700.0, 10)).unwrap();

    assert!(BudgetService::alerts(&store, &luis, date(2025, 3, 1), 3)
        .unwrap()
        .is_empty());
    BudgetService::remove(&store, &ana, "rent").unwrap();
    assert!(BudgetService::list(&store, &ana).unwrap().is_empty());
    assert_eq!(BudgetService::list(&store, &luis).unwrap().len(), 1);
    assert!(matches!(
        BudgetService::mark_paid(&store, &ana, "Rent"),
        Err(EarningsError::NotFound(_))
    ));
}
