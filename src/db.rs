//! Database initialization for the application.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, budget_alert::create_budget_alert_table, category::create_category_table,
    profile::create_profile_table, report::create_report_table,
    transaction::create_transaction_table, user::create_user_table,
};

/// Create the application's tables in `connection`.
///
/// The tables are created in a single exclusive transaction so that a partial
/// schema is never left behind.
///
/// Initialization is idempotent, so it is safe to call on a database file
/// from a previous run.
///
/// # Errors
///
/// Returns an error if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_profile_table(&transaction)?;
    create_budget_alert_table(&transaction)?;
    create_report_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn creates_all_tables() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        let mut statement = connection
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        let table_names: Vec<String> = statement
            .query_map((), |row| row.get(0))
            .unwrap()
            .map(|name| name.unwrap())
            .collect();

        for table in [
            "budget_alert",
            "category",
            "profile",
            "report",
            "transaction",
            "user",
        ] {
            assert!(
                table_names.iter().any(|name| name == table),
                "missing table {table}, got {table_names:?}"
            );
        }
    }

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        assert!(initialize(&connection).is_ok());
    }
}
