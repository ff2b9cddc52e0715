//! The JSON API routes for creating, updating, deleting and listing
//! transactions.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::{Date, macros::format_description};

use crate::{
    AppState, Error, api,
    category::get_categories,
    transaction::{
        NewTransaction, PaymentMethod, Transaction, TransactionChanges, TransactionId,
        TransactionType, create_transaction, delete_transaction, get_recent_transactions,
        update_transaction,
    },
    user::UserId,
};

/// The raw transaction form data. Field names match the in-page forms, so the
/// type comes in as "transaction-type". Fields are optional so the same
/// struct serves both create and partial update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionForm {
    /// "income" or "expense".
    #[serde(rename = "transaction-type")]
    pub transaction_type: Option<String>,
    /// The amount as entered, parsed server side.
    pub amount: Option<String>,
    /// The category ID as entered. An empty string means no category.
    pub category: Option<String>,
    /// A free-text description.
    pub description: Option<String>,
    /// The date in "YYYY-MM-DD" format.
    pub date: Option<String>,
    /// One of "cash", "card", "bank", "mobile" or "other".
    pub payment_method: Option<String>,
}

fn parse_amount(raw: &str) -> Result<f64, Error> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Validation("Invalid amount".to_owned()))
}

fn parse_date(raw: &str) -> Result<Date, Error> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| Error::Validation("Invalid date format".to_owned()))
}

fn parse_category(raw: &str) -> Result<Option<i64>, Error> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Ok(None);
    }

    trimmed
        .parse()
        .map(Some)
        .map_err(|_| Error::InvalidCategory)
}

/// Handler for creating a new transaction from a form submission.
///
/// Responds with `{"success": true, "transaction_id": ...}` or the standard
/// error envelope (400 on validation errors and unknown categories).
pub async fn create_transaction_endpoint(
    State(state): State<AppState>,
    axum::Extension(user_id): axum::Extension<UserId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let result = build_and_create(user_id, form, &state);

    match result {
        Ok(transaction_id) => api::success_with_id(
            "Transaction added successfully",
            "transaction_id",
            transaction_id,
        ),
        Err(error) => error.into_api_response(),
    }
}

fn build_and_create(
    user_id: UserId,
    form: TransactionForm,
    state: &AppState,
) -> Result<TransactionId, Error> {
    let missing_fields = || Error::Validation("Missing required fields".to_owned());

    let transaction_type = form
        .transaction_type
        .as_deref()
        .ok_or_else(missing_fields)
        .and_then(TransactionType::parse)?;
    let amount = form
        .amount
        .as_deref()
        .ok_or_else(missing_fields)
        .and_then(parse_amount)?;
    let date = form
        .date
        .as_deref()
        .ok_or_else(missing_fields)
        .and_then(parse_date)?;
    let category_id = match form.category.as_deref() {
        Some(raw) => parse_category(raw)?,
        None => None,
    };
    let payment_method = match form.payment_method.as_deref() {
        Some(raw) => PaymentMethod::parse(raw)?,
        None => PaymentMethod::default(),
    };

    let new_transaction = NewTransaction::build(
        user_id,
        transaction_type,
        amount,
        category_id,
        form.description.as_deref().unwrap_or(""),
        date,
        payment_method,
    )?;

    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;
    let transaction = create_transaction(new_transaction, &connection)?;

    Ok(transaction.id)
}

/// Handler for partially updating a transaction. Fields absent from the form
/// are left unchanged, and a category that is not one of the user's own is
/// ignored.
pub async fn update_transaction_endpoint(
    State(state): State<AppState>,
    axum::Extension(user_id): axum::Extension<UserId>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let result = build_and_update(transaction_id, user_id, form, &state);

    match result {
        Ok(()) => api::success("Transaction updated successfully"),
        Err(Error::NotFound) => api::error(StatusCode::NOT_FOUND, "Transaction not found"),
        Err(error) => error.into_api_response(),
    }
}

fn build_and_update(
    transaction_id: TransactionId,
    user_id: UserId,
    form: TransactionForm,
    state: &AppState,
) -> Result<(), Error> {
    let transaction_type = match form.transaction_type.as_deref() {
        Some(raw) => Some(TransactionType::parse(raw)?),
        None => None,
    };
    let amount = match form.amount.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Some(parse_amount(raw)?),
        _ => None,
    };
    let date = match form.date.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Some(parse_date(raw)?),
        _ => None,
    };
    let category_id = match form.category.as_deref() {
        Some(raw) => parse_category(raw).unwrap_or(None),
        None => None,
    };
    let payment_method = match form.payment_method.as_deref() {
        Some(raw) => Some(PaymentMethod::parse(raw)?),
        None => None,
    };

    let changes = TransactionChanges {
        transaction_type,
        amount,
        category_id,
        description: form.description,
        date,
        payment_method,
    };

    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;
    update_transaction(transaction_id, user_id, changes, &connection)?;

    Ok(())
}

/// Handler for deleting a transaction.
pub async fn delete_transaction_endpoint(
    State(state): State<AppState>,
    axum::Extension(user_id): axum::Extension<UserId>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(_) => return Error::DatabaseLock.into_api_response(),
    };

    match delete_transaction(transaction_id, user_id, &connection) {
        Ok(()) => api::success("Transaction deleted successfully"),
        Err(Error::NotFound) => api::error(StatusCode::NOT_FOUND, "Transaction not found"),
        Err(error) => error.into_api_response(),
    }
}

const RECENT_TRANSACTION_LIMIT: u32 = 10;

/// Handler for the recent transactions feed used by the dashboard.
///
/// Responds with `{"success": true, "transactions": [...]}` where each entry
/// carries the fields needed to render a list row.
pub async fn get_recent_transactions_endpoint(
    State(state): State<AppState>,
    axum::Extension(user_id): axum::Extension<UserId>,
) -> Response {
    let result = recent_transactions_json(user_id, &state);

    match result {
        Ok(transactions) => {
            (
                StatusCode::OK,
                Json(json!({ "success": true, "transactions": transactions })),
            )
                .into_response()
        }
        Err(error) => error.into_api_response(),
    }
}

fn recent_transactions_json(
    user_id: UserId,
    state: &AppState,
) -> Result<Vec<serde_json::Value>, Error> {
    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    let category_names: HashMap<i64, String> = get_categories(user_id, &connection)?
        .into_iter()
        .map(|category| (category.id, category.name))
        .collect();

    let transactions = get_recent_transactions(user_id, RECENT_TRANSACTION_LIMIT, &connection)?;

    Ok(transactions
        .iter()
        .map(|transaction| transaction_json(transaction, &category_names))
        .collect())
}

fn transaction_json(
    transaction: &Transaction,
    category_names: &HashMap<i64, String>,
) -> serde_json::Value {
    let category = transaction
        .category_id
        .and_then(|category_id| category_names.get(&category_id).cloned());

    json!({
        "id": transaction.id,
        "type": transaction.transaction_type.as_str(),
        "amount": transaction.amount,
        "category": category,
        "description": transaction.description,
        "date": transaction.date.to_string(),
        "payment_method": transaction.payment_method.to_string(),
    })
}
