//! The demo-mode password reset request page.
//!
//! No email is ever sent. The request always redirects to the log-in page
//! with a confirmation notice so the form does not reveal which usernames
//! exist.

use axum::response::{Html, IntoResponse, Redirect, Response};
use maud::html;
use serde::{Deserialize, Serialize};

use crate::{
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, base, link, log_in_register, text_input},
};

/// The raw data entered in the reset request form.
#[derive(Clone, Serialize, Deserialize)]
pub struct ForgotPasswordData {
    /// The username to send the reset link for.
    pub username: String,
}

/// Display the password reset request page.
pub async fn get_forgot_password_page() -> Response {
    let form = html! {
        form method="post" action=(endpoints::FORGOT_PASSWORD_VIEW) class="space-y-4 md:space-y-6"
        {
            (text_input("username", "Username", "text", "", None))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Send reset link" }

            p class="text-sm"
            {
                (link(endpoints::LOG_IN_VIEW, "Back to log in"))
            }
        }
    };

    Html(
        base("Forgot Password", &log_in_register("Reset your password", &form)).into_string(),
    )
    .into_response()
}

/// Handler for reset requests. Redirects to the log-in page with the
/// confirmation notice.
pub async fn post_forgot_password(
    axum::Form(_form): axum::Form<ForgotPasswordData>,
) -> Response {
    Redirect::to(&format!("{}?reset=sent", endpoints::LOG_IN_VIEW)).into_response()
}

#[cfg(test)]
mod forgot_password_tests {
    use axum::{Form, http::StatusCode};
    use scraper::Selector;

    use crate::{
        endpoints,
        test_utils::{assert_valid_html, parse_html_document, response_status},
    };

    use super::{ForgotPasswordData, get_forgot_password_page, post_forgot_password};

    #[tokio::test]
    async fn page_displays_form() {
        let response = get_forgot_password_page().await;

        assert_eq!(response_status(&response), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let username_input = Selector::parse("input[name=username]").unwrap();
        assert_eq!(html.select(&username_input).count(), 1);
    }

    #[tokio::test]
    async fn post_redirects_to_log_in_with_notice() {
        let form = ForgotPasswordData {
            username: "alice".to_owned(),
        };

        let response = post_forgot_password(Form(form)).await;

        assert_eq!(response_status(&response), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            &format!("{}?reset=sent", endpoints::LOG_IN_VIEW)
        );
    }
}
