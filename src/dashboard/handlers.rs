//! Dashboard HTTP handlers and view rendering.

use std::collections::HashMap;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};
use serde_json::json;

use crate::{
    AppState, Error,
    budget_alert::get_active_thresholds,
    category::get_categories,
    dashboard::aggregation::{
        AlertLevel, BudgetAlertEntry, MonthlySummary, build_alerts, month_label, trend_months,
    },
    endpoints,
    html::{
        CARD_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_currency,
    },
    internal_server_error::get_internal_server_error_response,
    navigation::NavBar,
    profile::get_or_create_profile,
    timezone::today_in,
    transaction::{
        Transaction, TransactionType, category_breakdown, get_recent_transactions, monthly_total,
        spent_by_category,
    },
    user::UserId,
};

const RECENT_TRANSACTION_COUNT: u32 = 10;

/// Everything needed to render the dashboard page.
struct DashboardData {
    summary: MonthlySummary,
    breakdown: Vec<(String, f64)>,
    trend: Vec<(&'static str, f64)>,
    alerts: Vec<BudgetAlertEntry>,
    recent_transactions: Vec<Transaction>,
    category_names: HashMap<i64, String>,
}

/// Display a page with an overview of the user's month.
pub async fn get_dashboard_page(
    State(state): State<AppState>,
    axum::Extension(user_id): axum::Extension<UserId>,
) -> Response {
    match build_dashboard_data(user_id, &state) {
        Ok(data) => Html(dashboard_view(&data).into_string()).into_response(),
        Err(error) => {
            tracing::error!("could not build dashboard data: {error}");
            get_internal_server_error_response()
        }
    }
}

/// API endpoint returning the current month's summary figures as JSON.
pub async fn get_dashboard_summary_endpoint(
    State(state): State<AppState>,
    axum::Extension(user_id): axum::Extension<UserId>,
) -> Response {
    let summary = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(_) => return Error::DatabaseLock.into_api_response(),
        };

        match current_month_summary(user_id, &state.local_timezone, &connection) {
            Ok(summary) => summary,
            Err(error) => return error.into_api_response(),
        }
    };

    (
        StatusCode::OK,
        Json(json!({
            "income": summary.income,
            "expenses": summary.expenses,
            "balance": summary.balance,
            "savings_rate": summary.savings_rate,
        })),
    )
        .into_response()
}

fn current_month_summary(
    user_id: UserId,
    local_timezone: &str,
    connection: &rusqlite::Connection,
) -> Result<MonthlySummary, Error> {
    let today = today_in(local_timezone);
    let year = today.year();
    let month = u8::from(today.month());

    let income = monthly_total(user_id, year, month, TransactionType::Income, connection)?;
    let expenses = monthly_total(user_id, year, month, TransactionType::Expense, connection)?;

    Ok(MonthlySummary::new(income, expenses))
}

fn build_dashboard_data(user_id: UserId, state: &AppState) -> Result<DashboardData, Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let today = today_in(&state.local_timezone);
    let year = today.year();
    let month = u8::from(today.month());

    let summary = current_month_summary(user_id, &state.local_timezone, &connection)?;
    let breakdown = category_breakdown(user_id, year, month, &connection)?;

    let trend = trend_months(today)
        .into_iter()
        .map(|trend_month| {
            monthly_total(
                user_id,
                trend_month.year(),
                u8::from(trend_month.month()),
                TransactionType::Expense,
                &connection,
            )
            .map(|total| (month_label(trend_month), total))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let profile = get_or_create_profile(user_id, &connection)?;
    let categories = get_categories(user_id, &connection)?;

    let alerts = if profile.enable_notifications {
        let spent: HashMap<_, _> = spent_by_category(user_id, year, month, &connection)?
            .into_iter()
            .collect();
        let thresholds = get_active_thresholds(user_id, &connection)?;

        build_alerts(&categories, &spent, &thresholds)
    } else {
        Vec::new()
    };

    let category_names = categories
        .into_iter()
        .map(|category| (category.id, category.name))
        .collect();

    let recent_transactions =
        get_recent_transactions(user_id, RECENT_TRANSACTION_COUNT, &connection)?;

    Ok(DashboardData {
        summary,
        breakdown,
        trend,
        alerts,
        recent_transactions,
        category_names,
    })
}

fn dashboard_view(data: &DashboardData) -> Markup {
    let content = html! {
        (NavBar::new(endpoints::DASHBOARD_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl space-y-6"
            {
                h1 class="text-2xl font-bold" { "Dashboard" }

                (summary_cards(&data.summary))

                @if !data.alerts.is_empty() {
                    (alerts_view(&data.alerts))
                }

                div class="grid gap-6 lg:grid-cols-2"
                {
                    (breakdown_view(&data.breakdown))
                    (trend_view(&data.trend))
                }

                (recent_transactions_view(&data.recent_transactions, &data.category_names))
            }
        }
    };

    base("Dashboard", &content)
}

fn summary_cards(summary: &MonthlySummary) -> Markup {
    html! {
        div class="grid gap-4 sm:grid-cols-2 lg:grid-cols-4"
        {
            (summary_card("Income", format_currency(summary.income)))
            (summary_card("Expenses", format_currency(summary.expenses)))
            (summary_card("Balance", format_currency(summary.balance)))
            (summary_card("Savings Rate", format!("{}%", summary.savings_rate)))
        }
    }
}

fn summary_card(title: &str, value: String) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            p class="text-sm text-gray-500 dark:text-gray-400" { (title) }
            p class="text-xl font-semibold" { (value) }
        }
    }
}

fn alerts_view(alerts: &[BudgetAlertEntry]) -> Markup {
    html! {
        div class="space-y-2"
        {
            h2 class="text-lg font-semibold" { "Budget Alerts" }

            @for alert in alerts {
                @let style = match alert.level {
                    AlertLevel::Warning => "p-3 rounded bg-yellow-100 text-yellow-800
                        dark:bg-yellow-900 dark:text-yellow-200",
                    AlertLevel::Danger => "p-3 rounded bg-red-100 text-red-800
                        dark:bg-red-900 dark:text-red-200",
                };

                div class=(style)
                {
                    (alert.icon) " " (alert.category_name) ": spent "
                    (format_currency(alert.spent)) " of "
                    (format_currency(alert.budget)) " (" (alert.percentage) "%)"
                }
            }
        }
    }
}

fn breakdown_view(breakdown: &[(String, f64)]) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            h2 class="text-lg font-semibold mb-2" { "Spending by Category" }

            @if breakdown.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "No expenses this month." }
            } @else {
                table class="w-full text-sm text-left"
                {
                    tbody
                    {
                        @for (name, total) in breakdown {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (name) }
                                td class=(TABLE_CELL_STYLE) { (format_currency(*total)) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn trend_view(trend: &[(&'static str, f64)]) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            h2 class="text-lg font-semibold mb-2" { "6-Month Spending Trend" }

            table class="w-full text-sm text-left"
            {
                tbody
                {
                    @for (label, total) in trend {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (label) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(*total)) }
                        }
                    }
                }
            }
        }
    }
}

fn recent_transactions_view(
    transactions: &[Transaction],
    category_names: &HashMap<i64, String>,
) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            h2 class="text-lg font-semibold mb-2" { "Recent Transactions" }

            @if transactions.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "No transactions yet." }
            } @else {
                table class="w-full text-sm text-left"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th class=(TABLE_CELL_STYLE) { "Date" }
                            th class=(TABLE_CELL_STYLE) { "Description" }
                            th class=(TABLE_CELL_STYLE) { "Category" }
                            th class=(TABLE_CELL_STYLE) { "Amount" }
                        }
                    }

                    tbody
                    {
                        @for transaction in transactions {
                            @let category = transaction
                                .category_id
                                .and_then(|id| category_names.get(&id).map(String::as_str))
                                .unwrap_or("");

                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (transaction.date) }
                                td class=(TABLE_CELL_STYLE) { (transaction.description) }
                                td class=(TABLE_CELL_STYLE) { (category) }
                                td class=(TABLE_CELL_STYLE) { (format_currency(transaction.amount)) }
                            }
                        }
                    }
                }
            }
        }
    }
}
