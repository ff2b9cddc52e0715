//! The page to display for an internal server error.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

pub fn get_internal_server_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(
            error_view(
                "Internal Server Error",
                "500",
                "Sorry, something went wrong.",
                "Try again later or check the server logs",
            )
            .into_string(),
        ),
    )
        .into_response()
}

#[cfg(test)]
mod internal_server_error_tests {
    use axum::http::StatusCode;

    use crate::test_utils::response_status;

    use super::get_internal_server_error_response;

    #[test]
    fn returns_500_status() {
        let response = get_internal_server_error_response();

        assert_eq!(response_status(&response), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
