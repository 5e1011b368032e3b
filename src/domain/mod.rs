pub mod account;
pub mod budget;
pub mod common;
pub mod expense;
pub mod summary;
pub mod trip;

pub use account::UserAccount;
pub use budget::BudgetCategory;
pub use common::{round_currency, DateWindow, UserId};
pub use expense::{ExpenseInput, ExpenseRecord};
pub use summary::DailySummary;
pub use trip::{TripInput, TripKind, TripRecord};
