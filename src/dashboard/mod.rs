//! The dashboard page and its monthly summary calculations.

mod aggregation;
mod handlers;

pub use aggregation::{AlertLevel, BudgetAlertEntry, MonthlySummary};
pub use handlers::{get_dashboard_page, get_dashboard_summary_endpoint};
