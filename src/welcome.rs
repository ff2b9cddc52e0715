//! The landing page shown to logged-out visitors.

use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};

use crate::{
    auth::get_user_id_from_auth_cookie,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, base, link},
};

/// Display the landing page, or redirect straight to the dashboard when the
/// visitor already has a valid auth cookie.
pub async fn get_welcome_page(jar: PrivateCookieJar) -> Response {
    if get_user_id_from_auth_cookie(&jar).is_ok() {
        return Redirect::to(endpoints::DASHBOARD_VIEW).into_response();
    }

    Html(welcome_page().into_string()).into_response()
}

fn welcome_page() -> Markup {
    let content = html! {
        div class="flex flex-col items-center justify-center px-6 py-16 mx-auto text-center
            text-gray-900 dark:text-white"
        {
            h1 class="text-4xl font-bold mb-4" { "Moneta" }

            p class="text-lg mb-8 max-w-md"
            {
                "Track your income and expenses, set monthly budgets and see
                where your money goes."
            }

            div class="w-full max-w-xs space-y-4"
            {
                a
                    href=(endpoints::REGISTER_VIEW)
                    class=(BUTTON_PRIMARY_STYLE)
                    style="display: block; text-align: center;"
                {
                    "Get started"
                }

                p
                {
                    "Already have an account? "
                    (link(endpoints::LOG_IN_VIEW, "Log in"))
                }
            }
        }
    };

    base("Welcome", &content)
}
