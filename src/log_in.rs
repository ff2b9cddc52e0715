//! The log-in page and log-in form handling. The auth module handles the
//! lower level cookie logic.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{invalidate_auth_cookie, set_auth_cookie},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, base, link, log_in_register, password_input, text_input},
    internal_server_error::get_internal_server_error_response,
    user::get_user_by_username,
};

/// The error shown when the username or password does not match.
pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect username or password.";

/// How long the auth cookie should last if the user selects "remember me" at
/// log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The raw data entered by the user in the log-in form.
///
/// The username and password are stored as plain strings. There is no need
/// for validation here since they will be compared against the values in the
/// database, which have been verified.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Username entered during log-in.
    pub username: String,
    /// Password entered during log-in.
    pub password: String,
    /// Whether to extend the initial auth cookie duration.
    ///
    /// This value comes from a checkbox, so the `Some` variant should be
    /// interpreted as `true` regardless of the string value.
    pub remember_me: Option<String>,
}

/// Query parameters for the log-in page.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LogInPageQuery {
    /// Set after a password reset request to show a confirmation notice.
    pub reset: Option<String>,
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<LogInPageQuery>) -> Response {
    let notice = query
        .reset
        .is_some()
        .then_some("If an account with that username exists, a reset link has been sent.");

    Html(log_in_page("", None, notice).into_string()).into_response()
}

/// Handler for log-in requests via the POST method.
///
/// On success the auth cookie is set and the client is redirected to the
/// dashboard page. Otherwise the form is re-rendered with an error message.
pub async fn post_log_in(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    axum::Form(log_in_data): axum::Form<LogInData>,
) -> Response {
    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(_) => return get_internal_server_error_response(),
        };

        match get_user_by_username(&log_in_data.username, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => {
                return log_in_error_response(&log_in_data.username);
            }
            Err(error) => {
                tracing::error!("unhandled error while verifying credentials: {error}");
                return get_internal_server_error_response();
            }
        }
    };

    let is_password_valid = match user.password_hash.verify(&log_in_data.password) {
        Ok(is_password_valid) => is_password_valid,
        Err(error) => {
            tracing::error!("unhandled error while verifying credentials: {error}");
            return get_internal_server_error_response();
        }
    };

    if !is_password_valid {
        return log_in_error_response(&log_in_data.username);
    }

    let cookie_duration = if log_in_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    match set_auth_cookie(jar.clone(), user.id, cookie_duration) {
        Ok(updated_jar) => {
            (updated_jar, Redirect::to(endpoints::DASHBOARD_VIEW)).into_response()
        }
        Err(error) => {
            tracing::error!("error setting auth cookie: {error}");
            (
                invalidate_auth_cookie(jar),
                get_internal_server_error_response(),
            )
                .into_response()
        }
    }
}

fn log_in_error_response(username: &str) -> Response {
    (
        StatusCode::OK,
        Html(log_in_page(username, Some(INVALID_CREDENTIALS_ERROR_MSG), None).into_string()),
    )
        .into_response()
}

fn log_in_page(username: &str, error_message: Option<&str>, notice: Option<&str>) -> Markup {
    let form = html! {
        form method="post" action=(endpoints::LOG_IN_VIEW) class="space-y-4 md:space-y-6"
        {
            @if let Some(notice) = notice
            {
                p class="text-green-600 dark:text-green-400 text-base" { (notice) }
            }

            (text_input("username", "Username", "text", username, None))
            (password_input(error_message))

            div class="flex items-center gap-2"
            {
                input type="checkbox" name="remember_me" id="remember_me";
                label for="remember_me" class="text-sm" { "Remember me" }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Log in" }

            p class="text-sm"
            {
                (link(endpoints::FORGOT_PASSWORD_VIEW, "Forgot password?"))
            }

            p class="text-sm"
            {
                "Don't have an account? "
                (link(endpoints::REGISTER_VIEW, "Register"))
            }
        }
    };

    base("Log In", &log_in_register("Sign in to your account", &form))
}
