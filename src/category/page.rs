//! The categories page: expense and income categories with budget totals.

use std::collections::HashMap;

use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    AppState, Error,
    category::{Category, CategoryId, CategoryType, get_categories},
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE,
        FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    internal_server_error::get_internal_server_error_response,
    navigation::NavBar,
    timezone::today_in,
    transaction::spent_by_category,
    user::UserId,
};

/// Handler for the categories page.
pub async fn get_categories_page(
    State(state): State<AppState>,
    axum::Extension(user_id): axum::Extension<UserId>,
) -> Response {
    let (categories, spent) = {
        let Ok(connection) = state.db_connection.lock() else {
            return get_internal_server_error_response();
        };

        let today = today_in(&state.local_timezone);

        let result: Result<_, Error> = get_categories(user_id, &connection).and_then(|categories| {
            spent_by_category(user_id, today.year(), u8::from(today.month()), &connection)
                .map(|spent| (categories, spent.into_iter().collect::<HashMap<_, _>>()))
        });

        match result {
            Ok(data) => data,
            Err(error) => {
                tracing::error!("could not load categories: {error}");
                return get_internal_server_error_response();
            }
        }
    };

    Html(categories_page(&categories, &spent).into_string()).into_response()
}

fn categories_page(categories: &[Category], spent: &HashMap<CategoryId, f64>) -> Markup {
    let expense_categories: Vec<_> = categories
        .iter()
        .filter(|category| category.category_type == CategoryType::Expense)
        .collect();
    let income_categories: Vec<_> = categories
        .iter()
        .filter(|category| category.category_type == CategoryType::Income)
        .collect();

    let content = html! {
        (NavBar::new(endpoints::CATEGORIES_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-lg space-y-6"
            {
                h1 class="text-2xl font-bold" { "Categories" }

                (add_category_form())

                (expense_section(&expense_categories, spent))
                (income_section(&income_categories))
            }
        }
    };

    base("Categories", &content)
}

fn add_category_form() -> Markup {
    html! {
        form method="post" action=(endpoints::CREATE_CATEGORY_API) class=(CARD_STYLE)
        {
            h2 class="text-lg font-semibold mb-2" { "Add Category" }

            div class="grid gap-4 sm:grid-cols-2 lg:grid-cols-4"
            {
                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                    input type="text" name="name" id="name" class=(FORM_TEXT_INPUT_STYLE) required;
                }

                div
                {
                    label for="category-type" class=(FORM_LABEL_STYLE) { "Type" }

                    select name="category-type" id="category-type" class=(FORM_SELECT_STYLE)
                    {
                        option value="expense" { "Expense" }
                        option value="income" { "Income" }
                    }
                }

                div
                {
                    label for="icon" class=(FORM_LABEL_STYLE) { "Icon" }

                    input type="text" name="icon" id="icon" class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="monthly_budget" class=(FORM_LABEL_STYLE) { "Monthly Budget" }

                    input
                        type="number"
                        name="monthly_budget"
                        id="monthly_budget"
                        step="0.01"
                        min="0"
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div class="mt-4 max-w-xs"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add" }
            }
        }
    }
}

fn expense_section(categories: &[&Category], spent: &HashMap<CategoryId, f64>) -> Markup {
    let total_budget: f64 = categories.iter().map(|category| category.monthly_budget).sum();
    let total_spent: f64 = categories
        .iter()
        .filter_map(|category| spent.get(&category.id))
        .sum();

    html! {
        div class=(CARD_STYLE)
        {
            h2 class="text-lg font-semibold mb-2" { "Expense Categories" }

            table class="w-full text-sm text-left"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th class=(TABLE_CELL_STYLE) { "Category" }
                        th class=(TABLE_CELL_STYLE) { "Budget" }
                        th class=(TABLE_CELL_STYLE) { "Spent" }
                        th class=(TABLE_CELL_STYLE) { "Remaining" }
                        th class=(TABLE_CELL_STYLE) { "Alert %" }
                        th class=(TABLE_CELL_STYLE) { "" }
                    }
                }

                tbody
                {
                    @for category in categories {
                        @let category_spent = spent.get(&category.id).copied().unwrap_or(0.0);

                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (category.icon) " " (category.name) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(category.monthly_budget)) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(category_spent)) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                (format_currency(category.monthly_budget - category_spent))
                            }
                            td class=(TABLE_CELL_STYLE)
                            {
                                form
                                    method="post"
                                    action=(endpoints::format_endpoint(
                                        endpoints::CATEGORY_ALERT_API,
                                        category.id,
                                    ))
                                    class="flex gap-2"
                                {
                                    input
                                        type="number"
                                        name="threshold"
                                        min="1"
                                        max="100"
                                        class=(FORM_TEXT_INPUT_STYLE)
                                        style="width: 5rem;";
                                    input type="hidden" name="is_active" value="on";
                                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Set" }
                                }
                            }
                            td class=(TABLE_CELL_STYLE)
                            {
                                @if !category.is_default {
                                    form
                                        method="post"
                                        action=(endpoints::format_endpoint(
                                            endpoints::DELETE_CATEGORY_API,
                                            category.id,
                                        ))
                                    {
                                        button type="submit" class=(BUTTON_DELETE_STYLE)
                                        {
                                            "Delete"
                                        }
                                    }
                                }
                            }
                        }
                    }

                    tr class="font-semibold"
                    {
                        td class=(TABLE_CELL_STYLE) { "Total" }
                        td class=(TABLE_CELL_STYLE) { (format_currency(total_budget)) }
                        td class=(TABLE_CELL_STYLE) { (format_currency(total_spent)) }
                        td class=(TABLE_CELL_STYLE)
                        {
                            (format_currency(total_budget - total_spent))
                        }
                        td class=(TABLE_CELL_STYLE) {}
                        td class=(TABLE_CELL_STYLE) {}
                    }
                }
            }
        }
    }
}

fn income_section(categories: &[&Category]) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            h2 class="text-lg font-semibold mb-2" { "Income Categories" }

            ul class="space-y-1"
            {
                @for category in categories {
                    li class="flex items-center gap-4"
                    {
                        span { (category.icon) " " (category.name) }

                        @if !category.is_default {
                            form
                                method="post"
                                action=(endpoints::format_endpoint(
                                    endpoints::DELETE_CATEGORY_API,
                                    category.id,
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

#[cfg(test)]
mod categories_page_tests {
    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;

    use crate::{
        AppState,
        category::{CategoryType, NewCategory, create_category},
        test_utils::{assert_valid_html, parse_html_document, response_status},
        user::{UserId, create_user},
    };

    use super::get_categories_page;

    fn get_test_state() -> (AppState, UserId) {
        let connection = Connection::open_in_memory().unwrap();
        let state = AppState::new(connection, "42", "Etc/UTC").unwrap();

        let user_id = {
            let connection = state.db_connection.lock().unwrap();
            create_user(
                "alice",
                "alice@test.com",
                crate::PasswordHash::new_unchecked("hunter2"),
                &connection,
            )
            .unwrap()
            .id
        };

        (state, user_id)
    }

    #[tokio::test]
    async fn page_lists_categories_with_budgets() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_category(
                NewCategory::build(user_id, "Food", CategoryType::Expense, Some("🍔"), 300.0)
                    .unwrap(),
                &connection,
            )
            .unwrap();
            create_category(
                NewCategory::build(user_id, "Salary", CategoryType::Income, Some("💼"), 0.0)
                    .unwrap(),
                &connection,
            )
            .unwrap();
        }

        let response = get_categories_page(State(state), Extension(user_id)).await;

        assert_eq!(response_status(&response), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let text = html.html();
        assert!(text.contains("Food"));
        assert!(text.contains("$300.00"));
        assert!(text.contains("Salary"));
    }
}
