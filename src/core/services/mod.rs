pub mod aggregator;
pub mod alert_service;
pub mod bonus;
pub mod budget_service;
pub mod expense_service;
pub mod trip_service;

pub use aggregator::{DailyAggregator, DayTotalsInput};
pub use alert_service::{AlertKind, BudgetAlert, BudgetAlertEvaluator, DEFAULT_ALERT_LEAD_DAYS};
pub use bonus::{
    BonusCalculator, BonusSchedule, BonusTable, BonusTier, ScheduleId, ScheduleMode, WeekdayGroup,
};
pub use budget_service::BudgetService;
pub use expense_service::ExpenseService;
pub use trip_service::{TripPolicy, TripService, DEFAULT_AIRPORT_SURCHARGE};
