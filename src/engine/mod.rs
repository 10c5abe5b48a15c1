//! Pure attendance rules: time arithmetic, classification and derived views.

pub mod calendar;
pub mod classify;
pub mod summary;
pub mod time;

pub use calendar::calendar_grid;
pub use classify::{Assessment, assess, assess_checked_in, classify};
pub use summary::{day_stats, monthly_summary};
pub use time::{early_leave_minutes, late_minutes, working_hours};
