//! Defines the app level error type and its conversions to HTML pages and
//! JSON API error payloads.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{api, internal_server_error::get_internal_server_error_response, not_found};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of username and password.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Either the user ID or expiry cookie is missing from the cookie jar in
    /// the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing the date in the cookie or creating the new
    /// expiry date time.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format expiry cookie date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A required field is missing or a supplied value could not be parsed.
    /// The message is safe to show to the client.
    #[error("{0}")]
    Validation(String),

    /// The category ID on a transaction does not resolve to a category owned
    /// by the requesting user.
    ///
    /// The server does not reveal whether the category exists for another
    /// user, so a foreign category produces the same error as a missing one.
    #[error("Invalid category")]
    InvalidCategory,

    /// A category with the same (user, name, type) already exists.
    #[error("Category already exists")]
    DuplicateCategory,

    /// The chosen username is already registered.
    #[error("Username already taken")]
    DuplicateUsername,

    /// Tried to delete a category that was seeded at registration.
    #[error("Cannot delete default categories")]
    DefaultCategoryDelete,

    /// The requested resource was not found, or is owned by another user.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An error occurred while getting the local offset from a canonical
    /// timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// An error occurred while serializing a struct as JSON.
    #[error("could not serialize as JSON: {0}")]
    JsonSerialization(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLock,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("category.") =>
            {
                Error::DuplicateCategory
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.username") =>
            {
                Error::DuplicateUsername
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// Whether the error indicates a fault in the server rather than in the
    /// request. Internal errors are surfaced to clients as a generic message
    /// with HTTP 500; the details only go to the server log.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Error::HashingError(_)
                | Error::InvalidTimezone(_)
                | Error::JsonSerialization(_)
                | Error::DatabaseLock
                | Error::SqlError(_)
                | Error::InvalidDateFormat(_, _)
        )
    }

    /// Convert the error into a JSON API response with the envelope
    /// `{"success": false, "errors": <message>}`.
    ///
    /// Validation and business-rule errors map to 400, missing records to
    /// 404, and internal errors to 500 with a generic message.
    pub fn into_api_response(self) -> Response {
        if self.is_internal() {
            tracing::error!("An unexpected error occurred: {}", self);
            return api::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred",
            );
        }

        match self {
            Error::NotFound => api::error(StatusCode::NOT_FOUND, "Record not found"),
            error => api::error(StatusCode::BAD_REQUEST, &error.to_string()),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => not_found::get_404_not_found_response(),
            // Any errors that are not handled above are not intended to be
            // shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                get_internal_server_error_response()
            }
        }
    }
}
