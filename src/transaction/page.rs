//! The transactions page: a filterable listing with a running total.

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;
use time::{Date, macros::format_description};

use crate::{
    AppState, Error,
    category::{Category, get_categories},
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE,
        FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency, link,
    },
    internal_server_error::get_internal_server_error_response,
    navigation::NavBar,
    transaction::{
        Transaction, TransactionFilter, TransactionType, get_transactions,
    },
    user::UserId,
};

/// The filter query parameters accepted by the transactions page.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TransactionFilterQuery {
    /// "income" or "expense".
    #[serde(rename = "type")]
    transaction_type: Option<String>,
    /// A category ID.
    category: Option<String>,
    /// Earliest date to include, "YYYY-MM-DD".
    date_from: Option<String>,
    /// Latest date to include, "YYYY-MM-DD".
    date_to: Option<String>,
}

impl TransactionFilterQuery {
    /// Convert the raw query parameters into a filter, dropping values that
    /// do not parse.
    fn to_filter(&self) -> TransactionFilter {
        let parse_date = |raw: &str| {
            Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
        };

        TransactionFilter {
            transaction_type: self
                .transaction_type
                .as_deref()
                .and_then(|raw| TransactionType::parse(raw).ok()),
            category_id: self.category.as_deref().and_then(|raw| raw.trim().parse().ok()),
            date_from: self.date_from.as_deref().and_then(parse_date),
            date_to: self.date_to.as_deref().and_then(parse_date),
        }
    }
}

/// Handler for the transactions page.
pub async fn get_transactions_page(
    State(state): State<AppState>,
    axum::Extension(user_id): axum::Extension<UserId>,
    Query(query): Query<TransactionFilterQuery>,
) -> Response {
    let filter = query.to_filter();

    let (transactions, categories) = {
        let Ok(connection) = state.db_connection.lock() else {
            return get_internal_server_error_response();
        };

        let result: Result<_, Error> = get_transactions(user_id, &filter, &connection)
            .and_then(|transactions| {
                get_categories(user_id, &connection)
                    .map(|categories| (transactions, categories))
            });

        match result {
            Ok(data) => data,
            Err(error) => {
                tracing::error!("could not load transactions: {error}");
                return get_internal_server_error_response();
            }
        }
    };

    Html(transactions_page(&transactions, &categories, &query).into_string()).into_response()
}

/// The net total of the listed transactions: income counts positive, expenses
/// negative.
fn filtered_total(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .map(|transaction| match transaction.transaction_type {
            TransactionType::Income => transaction.amount,
            TransactionType::Expense => -transaction.amount,
        })
        .sum()
}

fn transactions_page(
    transactions: &[Transaction],
    categories: &[Category],
    query: &TransactionFilterQuery,
) -> Markup {
    let category_names: HashMap<i64, &str> = categories
        .iter()
        .map(|category| (category.id, category.name.as_str()))
        .collect();

    let content = html! {
        (NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-lg space-y-6"
            {
                div class="flex items-center justify-between"
                {
                    h1 class="text-2xl font-bold" { "Transactions" }

                    (link(endpoints::DOWNLOAD_CSV, "Download CSV"))
                }

                (add_transaction_form(categories))

                (filter_form(categories, query))

                div class=(CARD_STYLE)
                {
                    p class="mb-2"
                    {
                        "Total: "
                        span class="font-semibold" { (format_currency(filtered_total(transactions))) }
                    }

                    @if transactions.is_empty() {
                        p class="text-gray-500 dark:text-gray-400" { "No matching transactions." }
                    } @else {
                        (transactions_table(transactions, &category_names))
                    }
                }
            }
        }
    };

    base("Transactions", &content)
}

fn add_transaction_form(categories: &[Category]) -> Markup {
    html! {
        form method="post" action=(endpoints::CREATE_TRANSACTION_API) class=(CARD_STYLE)
        {
            h2 class="text-lg font-semibold mb-2" { "Add Transaction" }

            div class="grid gap-4 sm:grid-cols-2 lg:grid-cols-3"
            {
                div
                {
                    label for="transaction-type" class=(FORM_LABEL_STYLE) { "Type" }

                    select
                        name="transaction-type"
                        id="transaction-type"
                        class=(FORM_SELECT_STYLE)
                        required
                    {
                        option value="expense" { "Expense" }
                        option value="income" { "Income" }
                    }
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                    input
                        type="number"
                        name="amount"
                        id="amount"
                        step="0.01"
                        min="0.01"
                        class=(FORM_TEXT_INPUT_STYLE)
                        required;
                }

                div
                {
                    label for="new-category" class=(FORM_LABEL_STYLE) { "Category" }

                    select name="category" id="new-category" class=(FORM_SELECT_STYLE)
                    {
                        option value="" { "None" }

                        @for category in categories {
                            option value=(category.id) { (category.icon) " " (category.name) }
                        }
                    }
                }

                div
                {
                    label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                    input
                        type="text"
                        name="description"
                        id="description"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        type="date"
                        name="date"
                        id="date"
                        class=(FORM_TEXT_INPUT_STYLE)
                        required;
                }

                div
                {
                    label for="payment_method" class=(FORM_LABEL_STYLE) { "Payment Method" }

                    select name="payment_method" id="payment_method" class=(FORM_SELECT_STYLE)
                    {
                        option value="cash" { "Cash" }
                        option value="card" { "Credit/Debit Card" }
                        option value="bank" { "Bank Transfer" }
                        option value="mobile" { "Mobile Payment" }
                        option value="other" { "Other" }
                    }
                }
            }

            div class="mt-4 max-w-xs"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add" }
            }
        }
    }
}

fn filter_form(categories: &[Category], query: &TransactionFilterQuery) -> Markup {
    let selected_type = query.transaction_type.as_deref().unwrap_or("");
    let selected_category = query.category.as_deref().unwrap_or("");

    html! {
        form method="get" action=(endpoints::TRANSACTIONS_VIEW) class=(CARD_STYLE)
        {
            div class="grid gap-4 sm:grid-cols-2 lg:grid-cols-5"
            {
                div
                {
                    label for="type" class=(FORM_LABEL_STYLE) { "Type" }

                    select name="type" id="type" class=(FORM_SELECT_STYLE)
                    {
                        option value="" { "All" }
                        option value="income" selected[selected_type == "income"] { "Income" }
                        option value="expense" selected[selected_type == "expense"] { "Expense" }
                    }
                }

                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                    select name="category" id="category" class=(FORM_SELECT_STYLE)
                    {
                        option value="" { "All" }

                        @for category in categories {
                            option
                                value=(category.id)
                                selected[selected_category == category.id.to_string()]
                            {
                                (category.icon) " " (category.name)
                            }
                        }
                    }
                }

                div
                {
                    label for="date_from" class=(FORM_LABEL_STYLE) { "From" }

                    input
                        type="date"
                        name="date_from"
                        id="date_from"
                        class=(FORM_TEXT_INPUT_STYLE)
                        value=(query.date_from.as_deref().unwrap_or(""));
                }

                div
                {
                    label for="date_to" class=(FORM_LABEL_STYLE) { "To" }

                    input
                        type="date"
                        name="date_to"
                        id="date_to"
                        class=(FORM_TEXT_INPUT_STYLE)
                        value=(query.date_to.as_deref().unwrap_or(""));
                }

                div class="flex items-end"
                {
                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filter" }
                }
            }
        }
    }
}

fn transactions_table(
    transactions: &[Transaction],
    category_names: &HashMap<i64, &str>,
) -> Markup {
    html! {
        table class="w-full text-sm text-left"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th class=(TABLE_CELL_STYLE) { "Date" }
                    th class=(TABLE_CELL_STYLE) { "Type" }
                    th class=(TABLE_CELL_STYLE) { "Category" }
                    th class=(TABLE_CELL_STYLE) { "Description" }
                    th class=(TABLE_CELL_STYLE) { "Amount" }
                    th class=(TABLE_CELL_STYLE) { "Payment Method" }
                    th class=(TABLE_CELL_STYLE) { "" }
                }
            }

            tbody
            {
                @for transaction in transactions {
                    @let category = transaction
                        .category_id
                        .and_then(|id| category_names.get(&id).copied())
                        .unwrap_or("");

                    tr class=(TABLE_ROW_STYLE)
                    {
                        td class=(TABLE_CELL_STYLE) { (transaction.date) }
                        td class=(TABLE_CELL_STYLE) { (transaction.transaction_type) }
                        td class=(TABLE_CELL_STYLE) { (category) }
                        td class=(TABLE_CELL_STYLE) { (transaction.description) }
                        td class=(TABLE_CELL_STYLE) { (format_currency(transaction.amount)) }
                        td class=(TABLE_CELL_STYLE) { (transaction.payment_method) }
                        td class=(TABLE_CELL_STYLE)
                        {
                            form
                                method="post"
                                action=(endpoints::format_endpoint(
                                    endpoints::DELETE_TRANSACTION_API,
                                    transaction.id,
                                ))
                            {
                                button type="submit" class=(BUTTON_DELETE_STYLE) { "Delete" }
                            }
                        }
                    }
                }
            }
        }
    }
}
