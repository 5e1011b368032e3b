use uuid::Uuid;

use crate::domain::{round_currency, ExpenseInput, ExpenseRecord};
use crate::errors::{EarningsError, Result};

/// Stateless expense validator.
pub struct ExpenseService;

impl ExpenseService {
    /// Rejects blank concepts and non-positive amounts.
    pub fn validate(input: ExpenseInput) -> Result<ExpenseRecord> {
        let concept = input.concept.trim();
        if concept.is_empty() {
            return Err(EarningsError::validation("expense concept must not be blank"));
        }
        let amount = round_currency(input.amount);
        if !amount.is_finite() || amount <= 0.0 {
            return Err(EarningsError::validation(format!(
                "expense amount must be greater than zero (got {})",
                input.amount
            )));
        }
        Ok(ExpenseRecord {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            date: input.date,
            concept: concept.to_string(),
            amount,
        })
    }
}
