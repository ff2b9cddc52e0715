//! The registration page and account creation handling.
//!
//! Registering creates the user, their profile and their default categories
//! in one SQL transaction, then logs the new user in.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};
use rusqlite::{Transaction as SqlTransaction, TransactionBehavior};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::set_auth_cookie,
    category::insert_default_categories,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, base, link, log_in_register, text_input},
    internal_server_error::get_internal_server_error_response,
    password::{PasswordHash, ValidatedPassword},
    profile::create_profile,
    user::{UserId, create_user},
};

/// The raw data entered in the registration form.
#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterForm {
    /// The unique name to log in with.
    pub username: String,
    /// The user's email address.
    pub email: String,
    /// The password to use.
    pub password: String,
    /// The password, repeated.
    pub confirm_password: String,
}

/// The per-field error messages shown on the registration form.
#[derive(Debug, Default, Clone, PartialEq)]
struct RegisterErrors {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    confirm_password: Option<String>,
}

impl RegisterErrors {
    fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    Html(register_page("", "", &RegisterErrors::default()).into_string()).into_response()
}

/// Handler for registration requests via the POST method.
///
/// On success the new user is logged in and redirected to the dashboard.
/// Otherwise the form is re-rendered with the validation errors.
pub async fn post_register(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    axum::Form(form): axum::Form<RegisterForm>,
) -> Response {
    let username = form.username.trim().to_owned();
    let email = form.email.trim().to_owned();

    let mut errors = RegisterErrors::default();

    if username.is_empty() {
        errors.username = Some("Username is required.".to_owned());
    }

    if email.is_empty() || !email.contains('@') {
        errors.email = Some("Enter a valid email address.".to_owned());
    }

    if form.password != form.confirm_password {
        errors.confirm_password = Some("Passwords do not match.".to_owned());
    }

    let validated_password = match ValidatedPassword::new(&form.password) {
        Ok(validated_password) => Some(validated_password),
        Err(Error::TooWeak(feedback)) => {
            errors.password = Some(feedback);
            None
        }
        Err(error) => {
            tracing::error!("unhandled error while validating password: {error}");
            return get_internal_server_error_response();
        }
    };

    if !errors.is_empty() {
        return register_error_response(&username, &email, &errors);
    }

    // Checked above, only None when errors is non-empty.
    let Some(validated_password) = validated_password else {
        return get_internal_server_error_response();
    };

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(password_hash) => password_hash,
        Err(error) => {
            tracing::error!("could not hash password: {error}");
            return get_internal_server_error_response();
        }
    };

    let user_id = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(_) => return get_internal_server_error_response(),
        };

        match create_account(&username, &email, password_hash, &connection) {
            Ok(user_id) => user_id,
            Err(Error::DuplicateUsername) => {
                errors.username = Some(Error::DuplicateUsername.to_string());
                return register_error_response(&username, &email, &errors);
            }
            Err(error) => {
                tracing::error!("could not create account: {error}");
                return get_internal_server_error_response();
            }
        }
    };

    match set_auth_cookie(jar, user_id, state.cookie_duration) {
        Ok(updated_jar) => {
            (updated_jar, Redirect::to(endpoints::DASHBOARD_VIEW)).into_response()
        }
        Err(error) => {
            tracing::error!("error setting auth cookie: {error}");
            get_internal_server_error_response()
        }
    }
}

/// Create the user, their profile and their default categories in one SQL
/// transaction so a failed registration leaves nothing behind.
fn create_account(
    username: &str,
    email: &str,
    password_hash: PasswordHash,
    connection: &rusqlite::Connection,
) -> Result<UserId, Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let user = create_user(username, email, password_hash, &transaction)?;
    create_profile(user.id, &transaction)?;
    insert_default_categories(user.id, &transaction)?;

    transaction.commit()?;

    Ok(user.id)
}

fn register_error_response(username: &str, email: &str, errors: &RegisterErrors) -> Response {
    (
        StatusCode::OK,
        Html(register_page(username, email, errors).into_string()),
    )
        .into_response()
}

fn register_page(username: &str, email: &str, errors: &RegisterErrors) -> Markup {
    let form = html! {
        form method="post" action=(endpoints::REGISTER_VIEW) class="space-y-4 md:space-y-6"
        {
            (text_input("username", "Username", "text", username, errors.username.as_deref()))
            (text_input("email", "Email", "email", email, errors.email.as_deref()))
            (password_field("password", "Password", errors.password.as_deref()))
            (password_field(
                "confirm_password",
                "Confirm Password",
                errors.confirm_password.as_deref(),
            ))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Register" }

            p class="text-sm"
            {
                "Already have an account? "
                (link(endpoints::LOG_IN_VIEW, "Log in"))
            }
        }
    };

    base("Register", &log_in_register("Create an account", &form))
}

fn password_field(name: &str, label: &str, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for=(name) class="block mb-2 text-sm font-medium text-gray-900 dark:text-white"
            {
                (label)
            }

            input
                type="password"
                name=(name)
                id=(name)
                placeholder="••••••••"
                class="block w-full p-2.5 rounded text-sm text-gray-900 dark:text-white
                    bg-gray-50 dark:bg-gray-700 border border-gray-300 dark:border-gray-600"
                required;

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

#[cfg(test)]
mod register_tests {
    use axum::{
        Form,
        extract::State,
        http::{StatusCode, header::SET_COOKIE},
    };
    use axum_extra::extract::PrivateCookieJar;
    use rusqlite::Connection;

    use crate::{
        AppState,
        category::{CategoryType, DEFAULT_CATEGORY_COUNT, get_categories},
        endpoints,
        profile::{Currency, get_or_create_profile},
        test_utils::{parse_html_document, response_status},
        user::get_user_by_username,
    };

    use super::{RegisterForm, post_register};

    const STRONG_PASSWORD: &str = "correcthorsebatterystaple";

    fn get_test_state() -> AppState {
        let connection = Connection::open_in_memory().unwrap();
        AppState::new(connection, "42", "Etc/UTC").unwrap()
    }

    fn valid_form() -> RegisterForm {
        RegisterForm {
            username: "alice".to_owned(),
            email: "alice@test.com".to_owned(),
            password: STRONG_PASSWORD.to_owned(),
            confirm_password: STRONG_PASSWORD.to_owned(),
        }
    }

    #[tokio::test]
    async fn register_creates_user_profile_and_default_categories() {
        let state = get_test_state();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response = post_register(State(state.clone()), jar, Form(valid_form())).await;

        assert_eq!(response_status(&response), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            endpoints::DASHBOARD_VIEW
        );
        assert!(response.headers().get(SET_COOKIE).is_some());

        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_username("alice", &connection).unwrap();

        let categories = get_categories(user.id, &connection).unwrap();
        assert_eq!(categories.len(), DEFAULT_CATEGORY_COUNT);
        assert_eq!(
            categories
                .iter()
                .filter(|category| category.category_type == CategoryType::Expense)
                .count(),
            6
        );
        assert!(categories.iter().all(|category| category.is_default));

        let profile = get_or_create_profile(user.id, &connection).unwrap();
        assert_eq!(profile.currency, Currency::Usd);
    }

    #[tokio::test]
    async fn register_rejects_mismatched_passwords() {
        let state = get_test_state();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        let form = RegisterForm {
            confirm_password: "somethingelse".to_owned(),
            ..valid_form()
        };

        let response = post_register(State(state.clone()), jar, Form(form)).await;

        assert_eq!(response_status(&response), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert!(html.html().contains("Passwords do not match."));

        let connection = state.db_connection.lock().unwrap();
        assert!(get_user_by_username("alice", &connection).is_err());
    }

    #[tokio::test]
    async fn register_rejects_weak_password() {
        let state = get_test_state();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        let form = RegisterForm {
            password: "hunter2".to_owned(),
            confirm_password: "hunter2".to_owned(),
            ..valid_form()
        };

        let response = post_register(State(state.clone()), jar, Form(form)).await;

        assert_eq!(response_status(&response), StatusCode::OK);

        let connection = state.db_connection.lock().unwrap();
        assert!(get_user_by_username("alice", &connection).is_err());
    }

    #[tokio::test]
    async fn register_rejects_duplicate_username() {
        let state = get_test_state();

        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        post_register(State(state.clone()), jar, Form(valid_form())).await;

        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        let form = RegisterForm {
            email: "other@test.com".to_owned(),
            ..valid_form()
        };
        let response = post_register(State(state.clone()), jar, Form(form)).await;

        assert_eq!(response_status(&response), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert!(html.html().contains("Username already taken"));
    }

    #[tokio::test]
    async fn register_requires_valid_email() {
        let state = get_test_state();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        let form = RegisterForm {
            email: "not-an-email".to_owned(),
            ..valid_form()
        };

        let response = post_register(State(state.clone()), jar, Form(form)).await;

        assert_eq!(response_status(&response), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert!(html.html().contains("Enter a valid email address."));
    }
}
