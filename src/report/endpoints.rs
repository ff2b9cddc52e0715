//! The JSON API route for generating report snapshots.

use axum::{extract::State, response::Response};
use axum_extra::extract::Form;
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::{Date, Month};

use crate::{
    AppState, Error, api,
    dashboard::MonthlySummary,
    report::{NewReport, ReportType, create_report},
    timezone::today_in,
    transaction::{TransactionType, category_breakdown, monthly_total},
    user::UserId,
};

/// The raw report generation form data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateReportForm {
    /// One of "summary", "detailed" or "category". Defaults to "summary".
    pub report_type: Option<String>,
    /// The month to cover in "YYYY-MM" format. Defaults to the current month.
    pub month: Option<String>,
}

/// Handler for generating a report.
///
/// Computes the month's figures, stores them as an immutable snapshot and
/// responds with `{"success": true, "report_id": ...}`.
pub async fn generate_report_endpoint(
    State(state): State<AppState>,
    axum::Extension(user_id): axum::Extension<UserId>,
    Form(form): Form<GenerateReportForm>,
) -> Response {
    let result = build_and_create(user_id, form, &state);

    match result {
        Ok(report_id) => {
            api::success_with_id("Report generated successfully", "report_id", report_id)
        }
        Err(error) => error.into_api_response(),
    }
}

fn build_and_create(user_id: UserId, form: GenerateReportForm, state: &AppState) -> Result<i64, Error> {
    let report_type = match form.report_type.as_deref() {
        Some(raw) => ReportType::parse(raw)?,
        None => ReportType::default(),
    };
    let month = match form.month.as_deref() {
        Some(raw) if !raw.trim().is_empty() => parse_month(raw)?,
        _ => today_in(&state.local_timezone)
            .replace_day(1)
            .unwrap_or_else(|_| today_in(&state.local_timezone)),
    };

    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let year = month.year();
    let month_number = u8::from(month.month());

    let income = monthly_total(user_id, year, month_number, TransactionType::Income, &connection)?;
    let expenses =
        monthly_total(user_id, year, month_number, TransactionType::Expense, &connection)?;
    let summary = MonthlySummary::new(income, expenses);

    let breakdown: Vec<_> = category_breakdown(user_id, year, month_number, &connection)?
        .into_iter()
        .map(|(name, total)| json!({ "category": name, "total": total }))
        .collect();

    let totals = json!({
        "income": summary.income,
        "expenses": summary.expenses,
        "balance": summary.balance,
        "savings_rate": summary.savings_rate,
    });

    let data = match report_type {
        ReportType::Summary => totals,
        ReportType::Category => json!({ "breakdown": breakdown }),
        ReportType::Detailed => {
            let mut detailed = totals;
            detailed["breakdown"] = json!(breakdown);
            detailed
        }
    };

    let report = create_report(
        NewReport {
            user_id,
            report_type,
            month,
            data,
            file_path: None,
        },
        &connection,
    )?;

    Ok(report.id)
}

fn parse_month(raw: &str) -> Result<Date, Error> {
    let invalid = || Error::Validation("Invalid month format".to_owned());

    let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u8 = month.parse().map_err(|_| invalid())?;
    let month = Month::try_from(month).map_err(|_| invalid())?;

    Date::from_calendar_date(year, month, 1).map_err(|_| invalid())
}
