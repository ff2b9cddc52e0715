//! The report domain types and database queries.

use std::fmt::Display;

use rusqlite::{Connection, Row, types::Type};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, user::UserId};

/// What a generated report covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportType {
    /// Monthly totals only.
    #[default]
    Summary,
    /// Monthly totals plus the category breakdown.
    Detailed,
    /// The category breakdown only.
    Category,
}

impl ReportType {
    /// The string stored in the database for this report type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Summary => "summary",
            ReportType::Detailed => "detailed",
            ReportType::Category => "category",
        }
    }

    /// Parse a report type from its database/form representation.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] for unknown values.
    pub fn parse(value: &str) -> Result<Self, Error> {
        match value {
            "summary" => Ok(ReportType::Summary),
            "detailed" => Ok(ReportType::Detailed),
            "category" => Ok(ReportType::Category),
            other => Err(Error::Validation(format!("Invalid report type '{other}'"))),
        }
    }
}

impl Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportType::Summary => write!(f, "Summary"),
            ReportType::Detailed => write!(f, "Detailed"),
            ReportType::Category => write!(f, "Category"),
        }
    }
}

/// An immutable snapshot of a month's figures generated by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialReport {
    /// The report's ID in the application database.
    pub id: i64,
    /// The user that generated the report.
    pub user_id: UserId,
    /// What the report covers.
    pub report_type: ReportType,
    /// The first day of the month the report covers.
    pub month: Date,
    /// The computed figures, stored as JSON.
    pub data: serde_json::Value,
    /// An optional path to an exported file.
    pub file_path: Option<String>,
    /// When the report was generated.
    pub generated_at: OffsetDateTime,
}

/// The data needed to store a new report.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    /// The user that generated the report.
    pub user_id: UserId,
    /// What the report covers.
    pub report_type: ReportType,
    /// The first day of the month the report covers.
    pub month: Date,
    /// The computed figures.
    pub data: serde_json::Value,
    /// An optional path to an exported file.
    pub file_path: Option<String>,
}

/// Create the report table in the database.
///
/// # Errors
///
/// Returns an error if there was a problem executing the SQL query.
pub fn create_report_table(connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS report (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            type TEXT NOT NULL,
            month TEXT NOT NULL,
            data TEXT NOT NULL,
            file_path TEXT,
            generated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Store a new report in the database.
///
/// # Errors
///
/// Returns [Error::JsonSerialization] if the report data cannot be encoded,
/// or [Error::SqlError] if the query fails.
pub fn create_report(
    new_report: NewReport,
    connection: &Connection,
) -> Result<FinancialReport, Error> {
    let data_json = serde_json::to_string(&new_report.data)
        .map_err(|error| Error::JsonSerialization(error.to_string()))?;
    let generated_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO report (user_id, type, month, data, file_path, generated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            new_report.user_id.as_i64(),
            new_report.report_type.as_str(),
            new_report.month,
            &data_json,
            &new_report.file_path,
            generated_at,
        ),
    )?;

    Ok(FinancialReport {
        id: connection.last_insert_rowid(),
        user_id: new_report.user_id,
        report_type: new_report.report_type,
        month: new_report.month,
        data: new_report.data,
        file_path: new_report.file_path,
        generated_at,
    })
}

/// Retrieve the reports of `user_id`, most recently generated first.
///
/// # Errors
///
/// Returns [Error::SqlError] if the query fails.
pub fn get_reports(user_id: UserId, connection: &Connection) -> Result<Vec<FinancialReport>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, type, month, data, file_path, generated_at
            FROM report
            WHERE user_id = ?1
            ORDER BY generated_at DESC",
        )?
        .query_map((user_id.as_i64(),), map_row)?
        .map(|maybe_report| maybe_report.map_err(|error| error.into()))
        .collect()
}

fn map_row(row: &Row) -> Result<FinancialReport, rusqlite::Error> {
    let raw_type: String = row.get("type")?;
    let report_type = ReportType::parse(&raw_type).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            format!("unknown report type '{raw_type}'").into(),
        )
    })?;

    let raw_data: String = row.get("data")?;
    let data = serde_json::from_str(&raw_data).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(error))
    })?;

    Ok(FinancialReport {
        id: row.get("id")?,
        user_id: UserId::new(row.get("user_id")?),
        report_type,
        month: row.get("month")?,
        data,
        file_path: row.get("file_path")?,
        generated_at: row.get("generated_at")?,
    })
}

#[cfg(test)]
mod report_db_tests {
    use rusqlite::Connection;
    use serde_json::json;
    use time::macros::date;

    use crate::{db::initialize, user::UserId};

    use super::{NewReport, ReportType, create_report, get_reports};

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    #[test]
    fn create_and_list_reports() {
        let connection = get_test_db_connection();
        let user_id = UserId::new(1);

        let report = create_report(
            NewReport {
                user_id,
                report_type: ReportType::Summary,
                month: date!(2026 - 08 - 01),
                data: json!({ "income": 1000.0, "expenses": 250.0 }),
                file_path: None,
            },
            &connection,
        )
        .unwrap();

        let reports = get_reports(user_id, &connection).unwrap();

        assert_eq!(reports, vec![report]);
        assert_eq!(reports[0].data["income"], 1000.0);
    }

    #[test]
    fn reports_are_scoped_to_user() {
        let connection = get_test_db_connection();

        create_report(
            NewReport {
                user_id: UserId::new(1),
                report_type: ReportType::Summary,
                month: date!(2026 - 08 - 01),
                data: json!({}),
                file_path: None,
            },
            &connection,
        )
        .unwrap();

        let reports = get_reports(UserId::new(2), &connection).unwrap();

        assert!(reports.is_empty());
    }
}
