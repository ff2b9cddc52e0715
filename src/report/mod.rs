//! Financial report snapshots and the reports page.

mod db;
mod endpoints;
mod page;

pub use db::{
    FinancialReport, NewReport, ReportType, create_report, create_report_table, get_reports,
};
pub use endpoints::generate_report_endpoint;
pub use page::get_reports_page;
