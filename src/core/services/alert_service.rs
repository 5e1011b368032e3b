use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{BudgetCategory, UserId};

/// Days before the due date that trigger an [`AlertKind::Upcoming`] signal.
pub const DEFAULT_ALERT_LEAD_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Upcoming,
    DueToday,
}

/// Reminder that an unpaid category falls due soon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAlert {
    pub category: String,
    pub amount: f64,
    pub kind: AlertKind,
}

pub struct BudgetAlertEvaluator;

impl BudgetAlertEvaluator {
    pub fn evaluate(
        user_id: &UserId,
        categories: &[BudgetCategory],
        today: NaiveDate,
    ) -> Vec<BudgetAlert> {
        Self::evaluate_with_lead(user_id, categories, today, DEFAULT_ALERT_LEAD_DAYS)
    }

    /// Signals unpaid categories due exactly `lead_days` from now or today.
    /// Overdue categories produce nothing.
    pub fn evaluate_with_lead(
        user_id: &UserId,
        categories: &[BudgetCategory],
        today: NaiveDate,
        lead_days: i64,
    ) -> Vec<BudgetAlert> {
        categories
            .iter()
            .filter(|category| &category.user_id == user_id && !category.paid)
            .filter_map(|category| {
                let kind = match category.days_remaining(today) {
                    0 => AlertKind::DueToday,
                    days if days == lead_days => AlertKind::Upcoming,
                    _ => return None,
                };
                Some(BudgetAlert {
                    category: category.name.clone(),
                    amount: category.monthly_amount,
                    kind,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    fn ana() -> UserId {
        UserId::new("ana").unwrap()
    }

    #[test]
    fn unpaid_category_three_days_out_is_upcoming() {
        let rent = BudgetCategory::new(ana(), "Rent", 800.0, 6);
        let alerts = BudgetAlertEvaluator::evaluate(&ana(), &[rent], today());
        assert_eq!(
            alerts,
            vec![BudgetAlert {
                category: "Rent".into(),
                amount: 800.0,
                kind: AlertKind::Upcoming,
            }]
        );
    }

    #[test]
    fn paid_category_due_today_is_silent() {
        let mut phone = BudgetCategory::new(ana(), "Phone", 45.0, 3);
        phone.paid = true;
        assert!(BudgetAlertEvaluator::evaluate(&ana(), &[phone.clone()], today()).is_empty());

        phone.paid = false;
        let alerts = BudgetAlertEvaluator::evaluate(&ana(), &[phone], today());
        assert_eq!(alerts[0].kind, AlertKind::DueToday);
    }

    #[test]
    fn other_distances_and_users_are_ignored() {
        let luis = UserId::new("luis").unwrap();
        let categories = vec![
            BudgetCategory::new(ana(), "Insurance", 120.0, 5),
            BudgetCategory::new(ana(), "Loan", 300.0, 2),
            BudgetCategory::new(luis, "Rent", 700.0, 6),
        ];
        assert!(BudgetAlertEvaluator::evaluate(&ana(), &categories, today()).is_empty());
    }

    #[test]
    fn lead_days_are_adjustable() {
        let rent = BudgetCategory::new(ana(), "Rent", 800.0, 10);
        let alerts = BudgetAlertEvaluator::evaluate_with_lead(&ana(), &[rent], today(), 7);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Upcoming);
    }
}
