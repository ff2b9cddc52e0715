//! Per-category budget alert configuration.
//!
//! These rows only configure thresholds. The alerts shown on the dashboard
//! are computed from current spending at read time and never persisted.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use axum_extra::extract::Form;
use rusqlite::{Connection, Row, types::Type};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Error, api,
    category::{CategoryId, get_category},
    user::UserId,
};

/// The severity of a budget alert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertType {
    /// Spending is approaching the budget.
    #[default]
    Warning,
    /// Spending has reached or passed the budget.
    Danger,
}

impl AlertType {
    /// The string stored in the database for this alert type.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Warning => "warning",
            AlertType::Danger => "danger",
        }
    }

    /// Parse an alert type from its database/form representation.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] for unknown values.
    pub fn parse(value: &str) -> Result<Self, Error> {
        match value {
            "warning" => Ok(AlertType::Warning),
            "danger" => Ok(AlertType::Danger),
            other => Err(Error::Validation(format!("Invalid alert type '{other}'"))),
        }
    }
}

/// The alert threshold configuration for one of a user's categories.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetAlert {
    /// The configuration row's ID in the application database.
    pub id: i64,
    /// The user the configuration belongs to.
    pub user_id: UserId,
    /// The category the threshold applies to.
    pub category_id: CategoryId,
    /// The percentage of the budget at which to start alerting.
    pub threshold: f64,
    /// The configured severity.
    pub alert_type: AlertType,
    /// Whether the threshold is in effect.
    pub is_active: bool,
    /// When the configuration was first created.
    pub created_at: OffsetDateTime,
}

/// The default alert threshold for categories without a configuration row.
pub const DEFAULT_ALERT_THRESHOLD: f64 = 80.0;

/// Create the budget alert table in the database.
///
/// # Errors
///
/// Returns an error if there was a problem executing the SQL query.
pub fn create_budget_alert_table(connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget_alert (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            threshold REAL NOT NULL DEFAULT 80,
            alert_type TEXT NOT NULL DEFAULT 'warning',
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            UNIQUE(user_id, category_id),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Create or replace the alert configuration for `(user_id, category_id)`.
///
/// # Errors
///
/// Returns [Error::Validation] if the threshold is not between 1 and 100, or
/// [Error::SqlError] if the query fails.
pub fn upsert_budget_alert(
    user_id: UserId,
    category_id: CategoryId,
    threshold: f64,
    alert_type: AlertType,
    is_active: bool,
    connection: &Connection,
) -> Result<BudgetAlert, Error> {
    if !threshold.is_finite() || !(1.0..=100.0).contains(&threshold) {
        return Err(Error::Validation(
            "Threshold must be between 1 and 100".to_owned(),
        ));
    }

    let created_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO budget_alert (user_id, category_id, threshold, alert_type, is_active, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(user_id, category_id)
        DO UPDATE SET threshold = ?3, alert_type = ?4, is_active = ?5",
        (
            user_id.as_i64(),
            category_id,
            threshold,
            alert_type.as_str(),
            is_active,
            created_at,
        ),
    )?;

    connection
        .query_row(
            "SELECT id, user_id, category_id, threshold, alert_type, is_active, created_at
            FROM budget_alert
            WHERE user_id = ?1 AND category_id = ?2",
            (user_id.as_i64(), category_id),
            map_row,
        )
        .map_err(|error| error.into())
}

/// The active alert thresholds of `user_id`, keyed by category.
///
/// # Errors
///
/// Returns [Error::SqlError] if the query fails.
pub fn get_active_thresholds(
    user_id: UserId,
    connection: &Connection,
) -> Result<HashMap<CategoryId, f64>, Error> {
    connection
        .prepare(
            "SELECT category_id, threshold FROM budget_alert
            WHERE user_id = ?1 AND is_active = 1",
        )?
        .query_map((user_id.as_i64(),), |row| {
            Ok((row.get("category_id")?, row.get("threshold")?))
        })?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

fn map_row(row: &Row) -> Result<BudgetAlert, rusqlite::Error> {
    let raw_alert_type: String = row.get("alert_type")?;
    let alert_type = AlertType::parse(&raw_alert_type).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            Type::Text,
            format!("unknown alert type '{raw_alert_type}'").into(),
        )
    })?;

    Ok(BudgetAlert {
        id: row.get("id")?,
        user_id: UserId::new(row.get("user_id")?),
        category_id: row.get("category_id")?,
        threshold: row.get("threshold")?,
        alert_type,
        is_active: row.get("is_active")?,
        created_at: row.get("created_at")?,
    })
}

/// The raw alert configuration form data. The checkbox is absent when
/// unchecked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetAlertForm {
    /// The threshold percentage as entered, parsed server side.
    pub threshold: Option<String>,
    /// "warning" or "danger".
    pub alert_type: Option<String>,
    /// Present when the active checkbox is ticked.
    pub is_active: Option<String>,
}

/// Handler for configuring the budget alert of a category.
///
/// Creates the configuration row on first use and replaces it afterwards.
pub async fn set_category_alert_endpoint(
    State(state): State<AppState>,
    axum::Extension(user_id): axum::Extension<UserId>,
    Path(category_id): Path<CategoryId>,
    Form(form): Form<BudgetAlertForm>,
) -> Response {
    let result = build_and_upsert(category_id, user_id, form, &state);

    match result {
        Ok(()) => api::success("Alert settings saved"),
        Err(Error::NotFound) => api::error(StatusCode::NOT_FOUND, "Category not found"),
        Err(error) => error.into_api_response(),
    }
}

fn build_and_upsert(
    category_id: CategoryId,
    user_id: UserId,
    form: BudgetAlertForm,
    state: &AppState,
) -> Result<(), Error> {
    let threshold = match form.threshold.as_deref() {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| Error::Validation("Invalid threshold".to_owned()))?,
        _ => DEFAULT_ALERT_THRESHOLD,
    };
    let alert_type = match form.alert_type.as_deref() {
        Some(raw) => AlertType::parse(raw)?,
        None => AlertType::default(),
    };

    let connection = state.db_connection.lock().map_err(|_| Error::DatabaseLock)?;

    // Confirms the category exists and belongs to the user.
    get_category(category_id, user_id, &connection)?;

    upsert_budget_alert(
        user_id,
        category_id,
        threshold,
        alert_type,
        form.is_active.is_some(),
        &connection,
    )?;

    Ok(())
}

#[cfg(test)]
mod budget_alert_tests {
    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use rusqlite::Connection;

    use crate::{
        AppState, Error,
        category::{CategoryType, NewCategory, create_category},
        db::initialize,
        test_utils::{parse_json_body, response_status},
        user::{UserId, create_user},
    };

    use super::{
        AlertType, BudgetAlertForm, get_active_thresholds, set_category_alert_endpoint,
        upsert_budget_alert,
    };

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    #[test]
    fn upsert_replaces_existing_configuration() {
        let connection = get_test_db_connection();
        let user_id = UserId::new(1);

        let first =
            upsert_budget_alert(user_id, 7, 80.0, AlertType::Warning, true, &connection).unwrap();
        let second =
            upsert_budget_alert(user_id, 7, 50.0, AlertType::Danger, false, &connection).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.threshold, 50.0);
        assert_eq!(second.alert_type, AlertType::Danger);
        assert!(!second.is_active);
    }

    #[test]
    fn upsert_rejects_out_of_range_threshold() {
        let connection = get_test_db_connection();

        let result =
            upsert_budget_alert(UserId::new(1), 7, 150.0, AlertType::Warning, true, &connection);

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn active_thresholds_skip_inactive_rows() {
        let connection = get_test_db_connection();
        let user_id = UserId::new(1);

        upsert_budget_alert(user_id, 1, 60.0, AlertType::Warning, true, &connection).unwrap();
        upsert_budget_alert(user_id, 2, 90.0, AlertType::Warning, false, &connection).unwrap();

        let thresholds = get_active_thresholds(user_id, &connection).unwrap();

        assert_eq!(thresholds.len(), 1);
        assert_eq!(thresholds.get(&1), Some(&60.0));
    }

    fn get_test_state() -> (AppState, UserId) {
        let connection = Connection::open_in_memory().unwrap();
        let state = AppState::new(connection, "42", "Etc/UTC").unwrap();

        let user_id = {
            let connection = state.db_connection.lock().unwrap();
            create_user(
                "alice",
                "alice@test.com",
                crate::PasswordHash::new_unchecked("hunter2"),
                &connection,
            )
            .unwrap()
            .id
        };

        (state, user_id)
    }

    #[tokio::test]
    async fn endpoint_rejects_unknown_category() {
        let (state, user_id) = get_test_state();
        let form = BudgetAlertForm {
            threshold: Some("75".to_owned()),
            alert_type: None,
            is_active: Some("on".to_owned()),
        };

        let response =
            set_category_alert_endpoint(State(state), Extension(user_id), Path(999), Form(form))
                .await;

        assert_eq!(response_status(&response), StatusCode::NOT_FOUND);
        let body = parse_json_body(response).await;
        assert_eq!(body["errors"], "Category not found");
    }

    #[tokio::test]
    async fn endpoint_saves_configuration() {
        let (state, user_id) = get_test_state();
        let category_id = {
            let connection = state.db_connection.lock().unwrap();
            create_category(
                NewCategory::build(user_id, "Food", CategoryType::Expense, None, 100.0).unwrap(),
                &connection,
            )
            .unwrap()
            .id
        };

        let form = BudgetAlertForm {
            threshold: Some("75".to_owned()),
            alert_type: Some("danger".to_owned()),
            is_active: Some("on".to_owned()),
        };
        let response = set_category_alert_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(category_id),
            Form(form),
        )
        .await;

        assert_eq!(response_status(&response), StatusCode::OK);
        let body = parse_json_body(response).await;
        assert_eq!(body["message"], "Alert settings saved");

        let connection = state.db_connection.lock().unwrap();
        let thresholds = get_active_thresholds(user_id, &connection).unwrap();
        assert_eq!(thresholds.get(&category_id), Some(&75.0));
    }
}
