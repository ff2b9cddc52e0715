//! The reports page: year-to-date figures and previously generated reports.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_currency,
    },
    internal_server_error::get_internal_server_error_response,
    navigation::NavBar,
    report::{FinancialReport, ReportType, get_reports},
    timezone::today_in,
    transaction::{top_expense_categories, ytd_totals},
    user::UserId,
};

const TOP_CATEGORY_COUNT: u32 = 5;

struct ReportsPageData {
    year: i32,
    ytd_income: f64,
    ytd_expenses: f64,
    top_categories: Vec<(String, f64)>,
    reports: Vec<FinancialReport>,
}

/// Handler for the reports page.
pub async fn get_reports_page(
    State(state): State<AppState>,
    axum::Extension(user_id): axum::Extension<UserId>,
) -> Response {
    match build_page_data(user_id, &state) {
        Ok(data) => Html(reports_page(&data).into_string()).into_response(),
        Err(error) => {
            tracing::error!("could not build reports page: {error}");
            get_internal_server_error_response()
        }
    }
}

fn build_page_data(user_id: UserId, state: &AppState) -> Result<ReportsPageData, Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let year = today_in(&state.local_timezone).year();
    let (ytd_income, ytd_expenses) = ytd_totals(user_id, year, &connection)?;
    let top_categories = top_expense_categories(user_id, year, TOP_CATEGORY_COUNT, &connection)?;
    let reports = get_reports(user_id, &connection)?;

    Ok(ReportsPageData {
        year,
        ytd_income,
        ytd_expenses,
        top_categories,
        reports,
    })
}

fn reports_page(data: &ReportsPageData) -> Markup {
    let content = html! {
        (NavBar::new(endpoints::REPORTS_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-lg space-y-6"
            {
                h1 class="text-2xl font-bold" { "Reports" }

                div class="grid gap-4 sm:grid-cols-3"
                {
                    div class=(CARD_STYLE)
                    {
                        p class="text-sm text-gray-500 dark:text-gray-400"
                        {
                            (data.year) " Income"
                        }
                        p class="text-xl font-semibold" { (format_currency(data.ytd_income)) }
                    }

                    div class=(CARD_STYLE)
                    {
                        p class="text-sm text-gray-500 dark:text-gray-400"
                        {
                            (data.year) " Expenses"
                        }
                        p class="text-xl font-semibold" { (format_currency(data.ytd_expenses)) }
                    }

                    div class=(CARD_STYLE)
                    {
                        p class="text-sm text-gray-500 dark:text-gray-400" { "Net" }
                        p class="text-xl font-semibold"
                        {
                            (format_currency(data.ytd_income - data.ytd_expenses))
                        }
                    }
                }

                (top_categories_view(&data.top_categories))

                (generate_form())

                (reports_list(&data.reports))
            }
        }
    };

    base("Reports", &content)
}

fn top_categories_view(top_categories: &[(String, f64)]) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            h2 class="text-lg font-semibold mb-2" { "Top Expense Categories" }

            @if top_categories.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "No expenses this year." }
            } @else {
                table class="w-full text-sm text-left"
                {
                    tbody
                    {
                        @for (name, total) in top_categories {
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

fn generate_form() -> Markup {
    let report_types = [ReportType::Summary, ReportType::Detailed, ReportType::Category];

    html! {
        form method="post" action=(endpoints::GENERATE_REPORT_API) class=(CARD_STYLE)
        {
            h2 class="text-lg font-semibold mb-2" { "Generate Report" }

            div class="flex items-end gap-4"
            {
                div
                {
                    label for="report_type" class=(FORM_LABEL_STYLE) { "Type" }

                    select name="report_type" id="report_type" class=(FORM_SELECT_STYLE)
                    {
                        @for report_type in report_types {
                            option value=(report_type.as_str()) { (report_type) }
                        }
                    }
                }

                div
                {
                    label for="month" class=(FORM_LABEL_STYLE) { "Month" }

                    input type="month" name="month" id="month" class=(FORM_SELECT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Generate" }
            }
        }
    }
}

fn reports_list(reports: &[FinancialReport]) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            h2 class="text-lg font-semibold mb-2" { "Generated Reports" }

            @if reports.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "No reports generated yet." }
            } @else {
                table class="w-full text-sm text-left"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th class=(TABLE_CELL_STYLE) { "Type" }
                            th class=(TABLE_CELL_STYLE) { "Month" }
                            th class=(TABLE_CELL_STYLE) { "Generated" }
                        }
                    }

                    tbody
                    {
                        @for report in reports {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (report.report_type) }
                                td class=(TABLE_CELL_STYLE) { (report.month) }
                                td class=(TABLE_CELL_STYLE) { (report.generated_at.date()) }
                            }
                        }
                    }
                }
            }
        }
    }
}
