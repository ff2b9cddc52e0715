//! Application router configuration with protected and unprotected route
//! definitions.
//!
//! Page routes are guarded by [auth_guard], which redirects to the log-in
//! page, while the JSON API routes are guarded by [auth_guard_api], which
//! responds with a 401 error envelope.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{auth_guard, auth_guard_api},
    budget_alert::set_category_alert_endpoint,
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_page,
        update_category_endpoint,
    },
    csv_export::download_csv_endpoint,
    dashboard::{get_dashboard_page, get_dashboard_summary_endpoint},
    endpoints,
    forgot_password::{get_forgot_password_page, post_forgot_password},
    log_in::{get_log_in_page, post_log_in},
    log_out::post_log_out,
    logging::logging_middleware,
    not_found::get_404_not_found,
    profile::{get_profile_page, update_profile_endpoint},
    register_user::{get_register_page, post_register},
    report::{generate_report_endpoint, get_reports_page},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint,
        get_recent_transactions_endpoint, get_transactions_page, update_transaction_endpoint,
    },
    welcome::get_welcome_page,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_welcome_page))
        .route(
            endpoints::LOG_IN_VIEW,
            get(get_log_in_page).post(post_log_in),
        )
        .route(
            endpoints::REGISTER_VIEW,
            get(get_register_page).post(post_register),
        )
        .route(
            endpoints::FORGOT_PASSWORD_VIEW,
            get(get_forgot_password_page).post(post_forgot_password),
        )
        .route(endpoints::LOG_OUT, post(post_log_out));

    let protected_pages = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(endpoints::CATEGORIES_VIEW, get(get_categories_page))
        .route(endpoints::REPORTS_VIEW, get(get_reports_page))
        .route(
            endpoints::PROFILE_VIEW,
            get(get_profile_page).post(update_profile_endpoint),
        )
        .route(endpoints::DOWNLOAD_CSV, get(download_csv_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    let protected_api = Router::new()
        .route(
            endpoints::CREATE_TRANSACTION_API,
            post(create_transaction_endpoint),
        )
        .route(
            endpoints::UPDATE_TRANSACTION_API,
            post(update_transaction_endpoint),
        )
        .route(
            endpoints::DELETE_TRANSACTION_API,
            post(delete_transaction_endpoint),
        )
        .route(
            endpoints::RECENT_TRANSACTIONS_API,
            get(get_recent_transactions_endpoint),
        )
        .route(
            endpoints::CREATE_CATEGORY_API,
            post(create_category_endpoint),
        )
        .route(
            endpoints::UPDATE_CATEGORY_API,
            post(update_category_endpoint),
        )
        .route(
            endpoints::DELETE_CATEGORY_API,
            post(delete_category_endpoint),
        )
        .route(
            endpoints::CATEGORY_ALERT_API,
            post(set_category_alert_endpoint),
        )
        .route(
            endpoints::DASHBOARD_SUMMARY_API,
            get(get_dashboard_summary_endpoint),
        )
        .route(endpoints::GENERATE_REPORT_API, post(generate_report_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard_api));

    protected_pages
        .merge(protected_api)
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

#[cfg(test)]
mod routing_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, endpoints, register_user::RegisterForm};

    use super::build_router;

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        let state = AppState::new(connection, "42", "Etc/UTC").unwrap();

        TestServer::new(build_router(state))
    }

    fn register_form() -> RegisterForm {
        RegisterForm {
            username: "alice".to_owned(),
            email: "alice@test.com".to_owned(),
            password: "correcthorsebatterystaple".to_owned(),
            confirm_password: "correcthorsebatterystaple".to_owned(),
        }
    }

    #[tokio::test]
    async fn protected_page_redirects_to_log_in_without_cookie() {
        let server = get_test_server();

        let response = server.get(endpoints::DASHBOARD_VIEW).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::LOG_IN_VIEW);
    }

    #[tokio::test]
    async fn protected_api_route_returns_401_json_without_cookie() {
        let server = get_test_server();

        let response = server.get(endpoints::DASHBOARD_SUMMARY_API).await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"], "Authentication required");
    }

    #[tokio::test]
    async fn registering_grants_access_to_protected_pages() {
        let server = get_test_server();

        let response = server
            .post(endpoints::REGISTER_VIEW)
            .form(&register_form())
            .await;
        response.assert_status_see_other();
        let jar = response.cookies();

        server
            .get(endpoints::DASHBOARD_VIEW)
            .add_cookies(jar.clone())
            .await
            .assert_status_ok();

        server
            .get(endpoints::DASHBOARD_SUMMARY_API)
            .add_cookies(jar)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let server = get_test_server();

        let response = server.get("/no-such-page").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn landing_page_is_public() {
        let server = get_test_server();

        server.get(endpoints::ROOT).await.assert_status_ok();
    }
}
