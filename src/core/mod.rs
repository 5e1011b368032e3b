pub mod earnings_manager;
pub mod services;
pub mod session;
pub mod time;

pub use earnings_manager::{DayRecords, EarningsManager, EarningsPolicy, WipeReport};
pub use session::{DaySession, ExpenseDraft, TripDraft};
pub use time::{Clock, FixedClock, SystemClock};
