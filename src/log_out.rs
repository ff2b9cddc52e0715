//! The log-out route.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;

use crate::{auth::invalidate_auth_cookie, endpoints};

/// Handler for log-out requests. Invalidates the auth cookie and redirects to
/// the landing page.
pub async fn post_log_out(jar: PrivateCookieJar) -> Response {
    (invalidate_auth_cookie(jar), Redirect::to(endpoints::ROOT)).into_response()
}

#[cfg(test)]
mod log_out_tests {
    use axum::http::{StatusCode, header::SET_COOKIE};
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use time::OffsetDateTime;

    use crate::{endpoints, test_utils::response_status};

    use super::post_log_out;

    #[tokio::test]
    async fn log_out_expires_cookies_and_redirects() {
        let jar = PrivateCookieJar::new(Key::generate());

        let response = post_log_out(jar).await;

        assert_eq!(response_status(&response), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), endpoints::ROOT);

        for header in response.headers().get_all(SET_COOKIE) {
            let cookie =
                axum_extra::extract::cookie::Cookie::parse(header.to_str().unwrap().to_owned())
                    .unwrap();
            assert!(cookie.expires_datetime().unwrap() < OffsetDateTime::now_utc());
        }
    }
}
