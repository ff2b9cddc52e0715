//! CSV export of a user's transactions.

use std::collections::HashMap;

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::get_categories,
    internal_server_error::get_internal_server_error_response,
    transaction::{TransactionFilter, get_transactions},
    user::UserId,
};

const CSV_HEADER: [&str; 6] = [
    "Date",
    "Type",
    "Category",
    "Description",
    "Amount",
    "Payment Method",
];

/// Write the user's transactions as CSV, newest first.
///
/// Amounts are written with the shortest representation that round-trips the
/// stored value exactly. Transactions without a category get an empty
/// category field.
///
/// # Errors
///
/// Returns [Error::SqlError] if a query fails, or [Error::Validation] if the
/// CSV could not be written.
pub fn export_transactions_csv(user_id: UserId, connection: &Connection) -> Result<String, Error> {
    let category_names: HashMap<i64, String> = get_categories(user_id, connection)?
        .into_iter()
        .map(|category| (category.id, category.name))
        .collect();

    let transactions = get_transactions(user_id, &TransactionFilter::default(), connection)?;

    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(CSV_HEADER)
        .map_err(|error| Error::Validation(error.to_string()))?;

    for transaction in transactions {
        let category = transaction
            .category_id
            .and_then(|category_id| category_names.get(&category_id).map(String::as_str))
            .unwrap_or("");

        writer
            .write_record([
                transaction.date.to_string().as_str(),
                transaction.transaction_type.to_string().as_str(),
                category,
                transaction.description.as_str(),
                transaction.amount.to_string().as_str(),
                transaction.payment_method.to_string().as_str(),
            ])
            .map_err(|error| Error::Validation(error.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::Validation(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::Validation(error.to_string()))
}

/// Handler for downloading the user's transactions as a CSV attachment.
pub async fn download_csv_endpoint(
    State(state): State<AppState>,
    axum::Extension(user_id): axum::Extension<UserId>,
) -> Response {
    let csv_text = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(_) => return get_internal_server_error_response(),
        };

        match export_transactions_csv(user_id, &connection) {
            Ok(csv_text) => csv_text,
            Err(error) => {
                tracing::error!("could not export transactions: {error}");
                return get_internal_server_error_response();
            }
        }
    };

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        csv_text,
    )
        .into_response()
}
