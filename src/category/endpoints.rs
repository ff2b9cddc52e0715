//! The JSON API routes for creating, updating and deleting categories.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use axum_extra::extract::Form;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, api,
    category::{
        CategoryChanges, CategoryId, CategoryType, NewCategory, create_category, delete_category,
        update_category,
    },
    user::UserId,
};

/// The raw category form data. Field names match the in-page forms, so the
/// type comes in as "category-type". Fields are optional so the same struct
/// serves both create (all required) and update (partial).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryForm {
    /// The display name.
    pub name: Option<String>,
    /// "income" or "expense".
    #[serde(rename = "category-type")]
    pub category_type: Option<String>,
    /// An emoji shown next to the name.
    pub icon: Option<String>,
    /// The monthly budget as entered, parsed server side.
    pub monthly_budget: Option<String>,
}

fn parse_budget(raw: &str) -> Result<f64, Error> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Validation("Invalid monthly budget".to_owned()))
}

/// Handler for creating a new category from a form submission.
///
/// Responds with `{"success": true, "category_id": ...}` or the standard
/// error envelope (400 on validation errors and duplicates).
pub async fn create_category_endpoint(
    State(state): State<AppState>,
    axum::Extension(user_id): axum::Extension<UserId>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let result = build_and_create(user_id, form, &state);

    match result {
        Ok(category_id) => {
            api::success_with_id("Category added successfully", "category_id", category_id)
        }
        Err(error) => error.into_api_response(),
    }
}

fn build_and_create(
    user_id: UserId,
    form: CategoryForm,
    state: &AppState,
) -> Result<CategoryId, Error> {
    let name = form
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::Validation("Missing required fields".to_owned()))?;
    let category_type = form
        .category_type
        .as_deref()
        .ok_or_else(|| Error::Validation("Missing required fields".to_owned()))
        .and_then(CategoryType::parse)?;
    let monthly_budget = match form.monthly_budget.as_deref() {
        Some(raw) if !raw.trim().is_empty() => parse_budget(raw)?,
        _ => 0.0,
    };

    let new_category = NewCategory::build(
        user_id,
        name,
        category_type,
        form.icon.as_deref(),
        monthly_budget,
    )?;

    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;
    let category = create_category(new_category, &connection)?;

    Ok(category.id)
}

/// Handler for partially updating a category. Fields absent from the form are
/// left unchanged. The budget is zeroed when the effective type is not
/// expense.
pub async fn update_category_endpoint(
    State(state): State<AppState>,
    axum::Extension(user_id): axum::Extension<UserId>,
    Path(category_id): Path<CategoryId>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let result = build_and_update(category_id, user_id, form, &state);

    match result {
        Ok(()) => api::success("Category updated successfully"),
        Err(Error::NotFound) => api::error(StatusCode::NOT_FOUND, "Category not found"),
        Err(error) => error.into_api_response(),
    }
}

fn build_and_update(
    category_id: CategoryId,
    user_id: UserId,
    form: CategoryForm,
    state: &AppState,
) -> Result<(), Error> {
    let category_type = match form.category_type.as_deref() {
        Some(raw) => Some(CategoryType::parse(raw)?),
        None => None,
    };
    let monthly_budget = match form.monthly_budget.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Some(parse_budget(raw)?),
        _ => None,
    };

    let changes = CategoryChanges {
        name: form.name,
        category_type,
        icon: form.icon,
        monthly_budget,
    };

    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;
    update_category(category_id, user_id, changes, &connection)?;

    Ok(())
}

/// Handler for deleting a category. Default categories are refused and
/// referencing transactions keep existing without a category.
pub async fn delete_category_endpoint(
    State(state): State<AppState>,
    axum::Extension(user_id): axum::Extension<UserId>,
    Path(category_id): Path<CategoryId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(_) => return Error::DatabaseLock.into_api_response(),
    };

    match delete_category(category_id, user_id, &connection) {
        Ok(()) => api::success("Category deleted successfully"),
        Err(Error::NotFound) => api::error(StatusCode::NOT_FOUND, "Category not found"),
        Err(error) => error.into_api_response(),
    }
}
