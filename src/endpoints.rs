//! The application's URIs.
//!
//! For endpoints that take a parameter, e.g. '/api/categories/{category_id}/delete',
//! use [format_endpoint].

/// The landing page, which redirects logged in users to the dashboard.
pub const ROOT: &str = "/";
/// The route for the log-in page and log-in form submissions.
pub const LOG_IN_VIEW: &str = "/login";
/// The route for the registration page and registration form submissions.
pub const REGISTER_VIEW: &str = "/register";
/// The route for requesting a password reset (demo mode, no email is sent).
pub const FORGOT_PASSWORD_VIEW: &str = "/forgot-password";
/// The route for logging out the current user.
pub const LOG_OUT: &str = "/logout";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page listing a user's transactions with filters.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page listing a user's categories and budget totals.
pub const CATEGORIES_VIEW: &str = "/categories";
/// The page showing year-to-date summaries and generated reports.
pub const REPORTS_VIEW: &str = "/reports";
/// The page for viewing and updating profile settings.
pub const PROFILE_VIEW: &str = "/profile";
/// The route for downloading a user's transactions as CSV.
pub const DOWNLOAD_CSV: &str = "/download-csv";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to create a transaction.
pub const CREATE_TRANSACTION_API: &str = "/api/transactions/create";
/// The route to update a transaction.
pub const UPDATE_TRANSACTION_API: &str = "/api/transactions/{transaction_id}/update";
/// The route to delete a transaction.
pub const DELETE_TRANSACTION_API: &str = "/api/transactions/{transaction_id}/delete";
/// The route to fetch the ten most recent transactions as JSON.
pub const RECENT_TRANSACTIONS_API: &str = "/api/transactions/recent";
/// The route to create a category.
pub const CREATE_CATEGORY_API: &str = "/api/categories/create";
/// The route to update a category.
pub const UPDATE_CATEGORY_API: &str = "/api/categories/{category_id}/update";
/// The route to delete a category.
pub const DELETE_CATEGORY_API: &str = "/api/categories/{category_id}/delete";
/// The route to configure the budget alert for a category.
pub const CATEGORY_ALERT_API: &str = "/api/categories/{category_id}/alert";
/// The route for the current month's summary figures as JSON.
pub const DASHBOARD_SUMMARY_API: &str = "/api/dashboard/summary";
/// The route to generate and store a financial report.
pub const GENERATE_REPORT_API: &str = "/api/reports/generate";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
