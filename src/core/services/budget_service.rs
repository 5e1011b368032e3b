use chrono::NaiveDate;
use tracing::info;

use crate::domain::{round_currency, BudgetCategory, UserId};
use crate::errors::{EarningsError, Result};
use crate::storage::{append_records, load_records, write_records, RowStore};

use super::alert_service::{BudgetAlert, BudgetAlertEvaluator};

/// Monthly budget categories kept in the Budgets collection.
pub struct BudgetService;

impl BudgetService {
    pub fn add(store: &dyn RowStore, category: BudgetCategory) -> Result<BudgetCategory> {
        let name = category.name.trim();
        if name.is_empty() {
            return Err(EarningsError::validation("category name must not be blank"));
        }
        let monthly_amount = round_currency(category.monthly_amount);
        if !monthly_amount.is_finite() || monthly_amount <= 0.0 {
            return Err(EarningsError::validation(format!(
                "monthly amount must be greater than zero (got {})",
                category.monthly_amount
            )));
        }
        if !(1..=31).contains(&category.due_day) {
            return Err(EarningsError::validation(format!(
                "due day must be between 1 and 31 (got {})",
                category.due_day
            )));
        }
        if Self::list(store, &category.user_id)?
            .iter()
            .any(|existing| existing.same_name(name))
        {
            return Err(EarningsError::validation(format!(
                "category `{name}` already exists"
            )));
        }

        let category = BudgetCategory {
            name: name.to_string(),
            monthly_amount,
            ..category
        };
        append_records(store, std::slice::from_ref(&category))?;
        info!(user = %category.user_id, category = %category.name, "budget category added");
        Ok(category)
    }

    pub fn mark_paid(store: &dyn RowStore, user_id: &UserId, name: &str) -> Result<BudgetCategory> {
        let mut all: Vec<BudgetCategory> = load_records(store)?;
        let category = all
            .iter_mut()
            .find(|category| &category.user_id == user_id && category.same_name(name))
            .ok_or_else(|| not_found(name))?;
        category.paid = true;
        let updated = category.clone();
        write_records(store, &all)?;
        info!(user = %user_id, category = %updated.name, "budget category paid");
        Ok(updated)
    }

    pub fn remove(store: &dyn RowStore, user_id: &UserId, name: &str) -> Result<()> {
        let all: Vec<BudgetCategory> = load_records(store)?;
        let before = all.len();
        let kept: Vec<BudgetCategory> = all
            .into_iter()
            .filter(|category| !(&category.user_id == user_id && category.same_name(name)))
            .collect();
        if kept.len() == before {
            return Err(not_found(name));
        }
        write_records(store, &kept)?;
        info!(user = %user_id, category = %name.trim(), "budget category removed");
        Ok(())
    }

    pub fn list(store: &dyn RowStore, user_id: &UserId) -> Result<Vec<BudgetCategory>> {
        Ok(load_records::<BudgetCategory>(store)?
            .into_iter()
            .filter(|category| &category.user_id == user_id)
            .collect())
    }

    pub fn alerts(
        store: &dyn RowStore,
        user_id: &UserId,
        today: NaiveDate,
        lead_days: i64,
    ) -> Result<Vec<BudgetAlert>> {
        let categories = Self::list(store, user_id)?;
        Ok(BudgetAlertEvaluator::evaluate_with_lead(
            user_id,
            &categories,
            today,
            lead_days,
        ))
    }
}

fn not_found(name: &str) -> EarningsError {
    EarningsError::NotFound(format!("budget category `{}`", name.trim()))
}
