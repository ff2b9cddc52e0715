//! The user profile page and its settings.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};
use rusqlite::{Connection, Row, types::Type};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE,
        FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base,
    },
    internal_server_error::get_internal_server_error_response,
    navigation::NavBar,
    timezone::get_local_offset,
    user::UserId,
};

/// The currency used to display amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    /// Ethiopian birr.
    Birr,
    /// United States dollar.
    #[default]
    Usd,
    /// Euro.
    Eur,
    /// Pound sterling.
    Gbp,
}

impl Currency {
    /// The string stored in the database for this currency.
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Birr => "birr",
            Currency::Usd => "usd",
            Currency::Eur => "eur",
            Currency::Gbp => "gbp",
        }
    }

    /// Parse a currency from its database/form representation.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] for unknown values.
    pub fn parse(value: &str) -> Result<Self, Error> {
        match value {
            "birr" => Ok(Currency::Birr),
            "usd" => Ok(Currency::Usd),
            "eur" => Ok(Currency::Eur),
            "gbp" => Ok(Currency::Gbp),
            other => Err(Error::Validation(format!("Invalid currency '{other}'"))),
        }
    }

    /// The label shown in the currency dropdown.
    pub fn label(&self) -> &'static str {
        match self {
            Currency::Birr => "Ethiopian Birr (ETB)",
            Currency::Usd => "US Dollar ($)",
            Currency::Eur => "Euro (€)",
            Currency::Gbp => "British Pound (£)",
        }
    }
}

/// The per-user display and notification settings.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    /// The user the profile belongs to.
    pub user_id: UserId,
    /// The currency used to display amounts.
    pub currency: Currency,
    /// A canonical timezone name such as "Pacific/Auckland".
    pub timezone: String,
    /// Whether budget alerts should be shown.
    pub enable_notifications: bool,
    /// Whether the dark color scheme is preferred.
    pub dark_mode: bool,
}

impl UserProfile {
    /// The default profile for a newly registered user.
    pub fn default_for(user_id: UserId) -> Self {
        Self {
            user_id,
            currency: Currency::default(),
            timezone: "Etc/UTC".to_owned(),
            enable_notifications: true,
            dark_mode: false,
        }
    }
}

/// Create the profile table in the database.
///
/// # Errors
///
/// Returns an error if there was a problem executing the SQL query.
pub fn create_profile_table(connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS profile (
            user_id INTEGER PRIMARY KEY,
            currency TEXT NOT NULL DEFAULT 'usd',
            timezone TEXT NOT NULL DEFAULT 'Etc/UTC',
            enable_notifications INTEGER NOT NULL DEFAULT 1,
            dark_mode INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Insert a default profile for `user_id`.
///
/// # Errors
///
/// Returns [Error::SqlError] if the query fails. This could be because a
/// profile already exists for the user.
pub fn create_profile(user_id: UserId, connection: &Connection) -> Result<UserProfile, Error> {
    let profile = UserProfile::default_for(user_id);

    connection.execute(
        "INSERT INTO profile (user_id, currency, timezone, enable_notifications, dark_mode)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            profile.user_id.as_i64(),
            profile.currency.as_str(),
            &profile.timezone,
            profile.enable_notifications,
            profile.dark_mode,
        ),
    )?;

    Ok(profile)
}

/// Retrieve the profile for `user_id`, inserting the default profile when
/// none exists. Accounts created before the profile table was added get a
/// row on first access.
///
/// # Errors
///
/// Returns [Error::SqlError] if a query fails.
pub fn get_or_create_profile(
    user_id: UserId,
    connection: &Connection,
) -> Result<UserProfile, Error> {
    let result = connection.query_row(
        "SELECT user_id, currency, timezone, enable_notifications, dark_mode
        FROM profile
        WHERE user_id = ?1",
        (user_id.as_i64(),),
        map_row,
    );

    match result {
        Ok(profile) => Ok(profile),
        Err(rusqlite::Error::QueryReturnedNoRows) => create_profile(user_id, connection),
        Err(error) => Err(error.into()),
    }
}

/// Store `profile` for its user, replacing the existing settings.
///
/// # Errors
///
/// Returns [Error::InvalidTimezone] if the timezone is not a canonical
/// timezone name, or [Error::SqlError] if the query fails.
pub fn update_profile(profile: &UserProfile, connection: &Connection) -> Result<(), Error> {
    if get_local_offset(&profile.timezone).is_none() {
        return Err(Error::InvalidTimezone(profile.timezone.clone()));
    }

    connection.execute(
        "UPDATE profile
        SET currency = ?1, timezone = ?2, enable_notifications = ?3, dark_mode = ?4
        WHERE user_id = ?5",
        (
            profile.currency.as_str(),
            &profile.timezone,
            profile.enable_notifications,
            profile.dark_mode,
            profile.user_id.as_i64(),
        ),
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<UserProfile, rusqlite::Error> {
    let raw_currency: String = row.get("currency")?;
    let currency = Currency::parse(&raw_currency).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            Type::Text,
            format!("unknown currency '{raw_currency}'").into(),
        )
    })?;

    Ok(UserProfile {
        user_id: UserId::new(row.get("user_id")?),
        currency,
        timezone: row.get("timezone")?,
        enable_notifications: row.get("enable_notifications")?,
        dark_mode: row.get("dark_mode")?,
    })
}

/// The raw profile form data. Checkboxes are absent when unchecked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileForm {
    /// One of "birr", "usd", "eur" or "gbp".
    pub currency: String,
    /// A canonical timezone name.
    pub timezone: String,
    /// Present when the notifications checkbox is ticked.
    pub enable_notifications: Option<String>,
    /// Present when the dark mode checkbox is ticked.
    pub dark_mode: Option<String>,
}

/// Handler for the profile page.
pub async fn get_profile_page(
    State(state): State<AppState>,
    axum::Extension(user_id): axum::Extension<UserId>,
) -> Response {
    let profile = {
        let Ok(connection) = state.db_connection.lock() else {
            return get_internal_server_error_response();
        };

        match get_or_create_profile(user_id, &connection) {
            Ok(profile) => profile,
            Err(error) => {
                tracing::error!("could not load profile: {error}");
                return get_internal_server_error_response();
            }
        }
    };

    Html(profile_page(&profile, None).into_string()).into_response()
}

/// Handler for the profile settings form.
///
/// Saves the new settings and redirects back to the profile page, or renders
/// the page with an inline error when the timezone is not recognized.
pub async fn update_profile_endpoint(
    State(state): State<AppState>,
    axum::Extension(user_id): axum::Extension<UserId>,
    Form(form): Form<ProfileForm>,
) -> Response {
    let currency = match Currency::parse(&form.currency) {
        Ok(currency) => currency,
        Err(error) => return error.into_api_response(),
    };

    let profile = UserProfile {
        user_id,
        currency,
        timezone: form.timezone.trim().to_owned(),
        enable_notifications: form.enable_notifications.is_some(),
        dark_mode: form.dark_mode.is_some(),
    };

    let Ok(connection) = state.db_connection.lock() else {
        return get_internal_server_error_response();
    };

    match update_profile(&profile, &connection) {
        Ok(()) => Redirect::to(endpoints::PROFILE_VIEW).into_response(),
        Err(Error::InvalidTimezone(_)) => Html(
            profile_page(&profile, Some("Unknown timezone, use a name like Pacific/Auckland"))
                .into_string(),
        )
        .into_response(),
        Err(error) => {
            tracing::error!("could not update profile: {error}");
            get_internal_server_error_response()
        }
    }
}

fn profile_page(profile: &UserProfile, timezone_error: Option<&str>) -> Markup {
    let currencies = [Currency::Birr, Currency::Usd, Currency::Eur, Currency::Gbp];

    let content = html! {
        (NavBar::new(endpoints::PROFILE_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-md"
            {
                h1 class="text-2xl font-bold mb-4" { "Profile" }

                form method="post" action=(endpoints::PROFILE_VIEW) class=(CARD_STYLE)
                {
                    div class="space-y-4"
                    {
                        div
                        {
                            label for="currency" class=(FORM_LABEL_STYLE) { "Currency" }

                            select name="currency" id="currency" class=(FORM_SELECT_STYLE)
                            {
                                @for currency in currencies {
                                    option
                                        value=(currency.as_str())
                                        selected[currency == profile.currency]
                                    {
                                        (currency.label())
                                    }
                                }
                            }
                        }

                        div
                        {
                            label for="timezone" class=(FORM_LABEL_STYLE) { "Timezone" }

                            input
                                type="text"
                                name="timezone"
                                id="timezone"
                                class=(FORM_TEXT_INPUT_STYLE)
                                value=(profile.timezone);

                            @if let Some(error_message) = timezone_error
                            {
                                p class="text-red-500 text-base" { (error_message) }
                            }
                        }

                        div class="flex items-center gap-2"
                        {
                            input
                                type="checkbox"
                                name="enable_notifications"
                                id="enable_notifications"
                                checked[profile.enable_notifications];

                            label for="enable_notifications" class=(FORM_LABEL_STYLE)
                            {
                                "Show budget alerts"
                            }
                        }

                        div class="flex items-center gap-2"
                        {
                            input
                                type="checkbox"
                                name="dark_mode"
                                id="dark_mode"
                                checked[profile.dark_mode];

                            label for="dark_mode" class=(FORM_LABEL_STYLE) { "Dark mode" }
                        }

                        button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save" }
                    }
                }
            }
        }
    };

    base("Profile", &content)
}


#[cfg(test)]
mod profile_page_tests {
    use scraper::Selector;

    use crate::{
        test_utils::assert_valid_html,
        user::UserId,
    };

    use super::{Currency, UserProfile, profile_page};

    #[test]
    fn page_preselects_profile_settings() {
        let profile = UserProfile {
            user_id: UserId::new(1),
            currency: Currency::Gbp,
            timezone: "Europe/London".to_owned(),
            enable_notifications: true,
            dark_mode: false,
        };

        let html = scraper::Html::parse_document(&profile_page(&profile, None).into_string());
        assert_valid_html(&html);

        let selected = Selector::parse("option[selected]").unwrap();
        let selected_values: Vec<_> = html
            .select(&selected)
            .map(|option| option.attr("value").unwrap())
            .collect();
        assert_eq!(selected_values, vec!["gbp"]);

        let timezone_input = Selector::parse("input[name=timezone]").unwrap();
        let timezone = html.select(&timezone_input).next().unwrap();
        assert_eq!(timezone.attr("value"), Some("Europe/London"));
    }

    #[test]
    fn page_shows_timezone_error() {
        let profile = UserProfile::default_for(UserId::new(1));

        let markup = profile_page(&profile, Some("Unknown timezone")).into_string();

        assert!(markup.contains("Unknown timezone"));
    }
}
