//! Cookie based authentication for page and API routes.
//!
//! Sessions are a pair of encrypted private cookies holding the user ID and
//! an expiry date-time. The middleware in this module validates the cookies,
//! injects the [crate::UserId] as a request extension and extends the session
//! on each authenticated request.

mod cookie;
mod middleware;

pub(crate) use cookie::{
    COOKIE_EXPIRY, COOKIE_USER_ID, DEFAULT_COOKIE_DURATION, get_user_id_from_auth_cookie,
    invalidate_auth_cookie, set_auth_cookie,
};
pub use middleware::{AuthState, auth_guard, auth_guard_api};
