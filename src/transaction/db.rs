//! Database queries and aggregations for transactions.

use rusqlite::{Connection, Row, types::Type};
use time::OffsetDateTime;

use crate::{
    Error,
    category::CategoryId,
    user::UserId,
};

use super::domain::{
    NewTransaction, PaymentMethod, Transaction, TransactionChanges, TransactionFilter,
    TransactionId, TransactionType,
};

/// Create the transaction table in the database.
///
/// # Errors
///
/// Returns an error if there was a problem executing the SQL query.
pub fn create_transaction_table(connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            type TEXT NOT NULL,
            amount REAL NOT NULL,
            category_id INTEGER,
            description TEXT NOT NULL,
            date TEXT NOT NULL,
            payment_method TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id)
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date)",
        (),
    )?;

    Ok(())
}

/// Check that `category_id` refers to a category owned by `user_id`.
fn category_belongs_to_user(
    category_id: CategoryId,
    user_id: UserId,
    connection: &Connection,
) -> Result<bool, Error> {
    let count: i64 = connection.query_row(
        "SELECT COUNT(id) FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
        |row| row.get(0),
    )?;

    Ok(count > 0)
}

/// Create a new transaction in the database.
///
/// # Errors
///
/// Returns [Error::InvalidCategory] if the transaction names a category that
/// does not exist or belongs to another user, or [Error::SqlError] if the
/// query fails.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if let Some(category_id) = new_transaction.category_id {
        if !category_belongs_to_user(category_id, new_transaction.user_id, connection)? {
            return Err(Error::InvalidCategory);
        }
    }

    let created_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO \"transaction\" (user_id, type, amount, category_id, description, date, payment_method, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        (
            new_transaction.user_id.as_i64(),
            new_transaction.transaction_type.as_str(),
            new_transaction.amount,
            new_transaction.category_id,
            &new_transaction.description,
            new_transaction.date,
            new_transaction.payment_method.as_str(),
            created_at,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Transaction {
        id,
        user_id: new_transaction.user_id,
        transaction_type: new_transaction.transaction_type,
        amount: new_transaction.amount,
        category_id: new_transaction.category_id,
        description: new_transaction.description,
        date: new_transaction.date,
        payment_method: new_transaction.payment_method,
        created_at,
    })
}

/// Retrieve a transaction by its ID.
///
/// Transactions owned by other users are reported as missing.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no matching transaction, or
/// [Error::SqlError] if the query fails.
pub fn get_transaction(
    transaction_id: TransactionId,
    user_id: UserId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .query_row(
            "SELECT id, user_id, type, amount, category_id, description, date, payment_method, created_at
            FROM \"transaction\"
            WHERE id = ?1 AND user_id = ?2",
            (transaction_id, user_id.as_i64()),
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve the transactions of `user_id` that match `filter`, newest first.
///
/// # Errors
///
/// Returns [Error::SqlError] if the query fails.
pub fn get_transactions(
    user_id: UserId,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut query = String::from(
        "SELECT id, user_id, type, amount, category_id, description, date, payment_method, created_at
        FROM \"transaction\"
        WHERE user_id = :user_id",
    );

    if filter.transaction_type.is_some() {
        query.push_str(" AND type = :type");
    }

    if filter.category_id.is_some() {
        query.push_str(" AND category_id = :category_id");
    }

    if filter.date_from.is_some() {
        query.push_str(" AND date >= :date_from");
    }

    if filter.date_to.is_some() {
        query.push_str(" AND date <= :date_to");
    }

    query.push_str(" ORDER BY date DESC, created_at DESC");

    let mut statement = connection.prepare(&query)?;

    let user_id = user_id.as_i64();
    let mut params: Vec<(&str, &dyn rusqlite::ToSql)> = vec![(":user_id", &user_id)];

    let type_string = filter.transaction_type.map(|t| t.as_str());
    if let Some(ref type_string) = type_string {
        params.push((":type", type_string));
    }

    if let Some(ref category_id) = filter.category_id {
        params.push((":category_id", category_id));
    }

    if let Some(ref date_from) = filter.date_from {
        params.push((":date_from", date_from));
    }

    if let Some(ref date_to) = filter.date_to {
        params.push((":date_to", date_to));
    }

    let transactions = statement
        .query_map(params.as_slice(), map_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect();

    transactions
}

/// Retrieve the most recent transactions of `user_id`, newest first.
///
/// # Errors
///
/// Returns [Error::SqlError] if the query fails.
pub fn get_recent_transactions(
    user_id: UserId,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, type, amount, category_id, description, date, payment_method, created_at
            FROM \"transaction\"
            WHERE user_id = ?1
            ORDER BY date DESC, created_at DESC
            LIMIT ?2",
        )?
        .query_map((user_id.as_i64(), limit), map_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Apply `changes` to a transaction.
///
/// A category in `changes` that does not resolve to one of the user's own
/// categories is ignored and the stored category kept.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no matching transaction,
/// [Error::Validation] if the new amount is not greater than zero, or
/// [Error::SqlError] if a query fails.
pub fn update_transaction(
    transaction_id: TransactionId,
    user_id: UserId,
    changes: TransactionChanges,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let existing = get_transaction(transaction_id, user_id, connection)?;

    if let Some(amount) = changes.amount {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::Validation(
                "Amount must be greater than zero".to_owned(),
            ));
        }
    }

    let category_id = match changes.category_id {
        Some(category_id) if category_belongs_to_user(category_id, user_id, connection)? => {
            Some(category_id)
        }
        _ => existing.category_id,
    };

    let transaction_type = changes.transaction_type.unwrap_or(existing.transaction_type);
    let amount = changes.amount.unwrap_or(existing.amount);
    let description = changes.description.unwrap_or(existing.description);
    let date = changes.date.unwrap_or(existing.date);
    let payment_method = changes.payment_method.unwrap_or(existing.payment_method);

    connection.execute(
        "UPDATE \"transaction\"
        SET type = ?1, amount = ?2, category_id = ?3, description = ?4, date = ?5, payment_method = ?6
        WHERE id = ?7 AND user_id = ?8",
        (
            transaction_type.as_str(),
            amount,
            category_id,
            &description,
            date,
            payment_method.as_str(),
            transaction_id,
            user_id.as_i64(),
        ),
    )?;

    Ok(Transaction {
        id: transaction_id,
        user_id,
        transaction_type,
        amount,
        category_id,
        description,
        date,
        payment_method,
        created_at: existing.created_at,
    })
}

/// Delete a transaction from the database.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no matching transaction, or
/// [Error::SqlError] if the query fails.
pub fn delete_transaction(
    transaction_id: TransactionId,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (transaction_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        Err(Error::NotFound)
    } else {
        Ok(())
    }
}

/// Sum the transactions of `transaction_type` for `user_id` in a calendar
/// month. Returns zero when there are none.
///
/// # Errors
///
/// Returns [Error::SqlError] if the query fails.
pub fn monthly_total(
    user_id: UserId,
    year: i32,
    month: u8,
    transaction_type: TransactionType,
    connection: &Connection,
) -> Result<f64, Error> {
    let month_prefix = format!("{year:04}-{month:02}");

    let total: Option<f64> = connection.query_row(
        "SELECT SUM(amount) FROM \"transaction\"
        WHERE user_id = ?1 AND type = ?2 AND strftime('%Y-%m', date) = ?3",
        (user_id.as_i64(), transaction_type.as_str(), month_prefix),
        |row| row.get(0),
    )?;

    Ok(total.unwrap_or(0.0))
}

/// Sum the expenses of `user_id` in a calendar month, grouped by category
/// name and ordered by total descending. Expenses without a category are
/// grouped under "Uncategorized".
///
/// # Errors
///
/// Returns [Error::SqlError] if the query fails.
pub fn category_breakdown(
    user_id: UserId,
    year: i32,
    month: u8,
    connection: &Connection,
) -> Result<Vec<(String, f64)>, Error> {
    let month_prefix = format!("{year:04}-{month:02}");

    connection
        .prepare(
            "SELECT COALESCE(category.name, 'Uncategorized') AS name, SUM(\"transaction\".amount) AS total
            FROM \"transaction\"
            LEFT JOIN category ON category.id = \"transaction\".category_id
            WHERE \"transaction\".user_id = ?1
                AND \"transaction\".type = 'expense'
                AND strftime('%Y-%m', \"transaction\".date) = ?2
            GROUP BY name
            ORDER BY total DESC",
        )?
        .query_map((user_id.as_i64(), month_prefix), |row| {
            Ok((row.get("name")?, row.get("total")?))
        })?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// Sum the expenses of `user_id` in a calendar month, grouped by category ID.
/// Uncategorized expenses are excluded.
///
/// # Errors
///
/// Returns [Error::SqlError] if the query fails.
pub fn spent_by_category(
    user_id: UserId,
    year: i32,
    month: u8,
    connection: &Connection,
) -> Result<Vec<(CategoryId, f64)>, Error> {
    let month_prefix = format!("{year:04}-{month:02}");

    connection
        .prepare(
            "SELECT category_id, SUM(amount) AS total
            FROM \"transaction\"
            WHERE user_id = ?1
                AND type = 'expense'
                AND category_id IS NOT NULL
                AND strftime('%Y-%m', date) = ?2
            GROUP BY category_id",
        )?
        .query_map((user_id.as_i64(), month_prefix), |row| {
            Ok((row.get("category_id")?, row.get("total")?))
        })?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// Sum the income and expenses of `user_id` for a calendar year.
///
/// Returns `(income, expenses)`.
///
/// # Errors
///
/// Returns [Error::SqlError] if the query fails.
pub fn ytd_totals(user_id: UserId, year: i32, connection: &Connection) -> Result<(f64, f64), Error> {
    let year_string = format!("{year:04}");

    connection
        .query_row(
            "SELECT
                COALESCE(SUM(CASE WHEN type = 'income' THEN amount END), 0.0),
                COALESCE(SUM(CASE WHEN type = 'expense' THEN amount END), 0.0)
            FROM \"transaction\"
            WHERE user_id = ?1 AND strftime('%Y', date) = ?2",
            (user_id.as_i64(), year_string),
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .map_err(|error| error.into())
}

/// The highest-spend expense categories of `user_id` for a calendar year,
/// ordered by total descending. Uncategorized expenses are grouped under
/// "Uncategorized".
///
/// # Errors
///
/// Returns [Error::SqlError] if the query fails.
pub fn top_expense_categories(
    user_id: UserId,
    year: i32,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<(String, f64)>, Error> {
    let year_string = format!("{year:04}");

    connection
        .prepare(
            "SELECT COALESCE(category.name, 'Uncategorized') AS name, SUM(\"transaction\".amount) AS total
            FROM \"transaction\"
            LEFT JOIN category ON category.id = \"transaction\".category_id
            WHERE \"transaction\".user_id = ?1
                AND \"transaction\".type = 'expense'
                AND strftime('%Y', \"transaction\".date) = ?2
            GROUP BY name
            ORDER BY total DESC
            LIMIT ?3",
        )?
        .query_map((user_id.as_i64(), year_string, limit), |row| {
            Ok((row.get("name")?, row.get("total")?))
        })?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

fn map_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_type: String = row.get("type")?;
    let transaction_type = TransactionType::parse(&raw_type).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            format!("unknown transaction type '{raw_type}'").into(),
        )
    })?;

    let raw_payment_method: String = row.get("payment_method")?;
    let payment_method = PaymentMethod::parse(&raw_payment_method).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            7,
            Type::Text,
            format!("unknown payment method '{raw_payment_method}'").into(),
        )
    })?;

    Ok(Transaction {
        id: row.get("id")?,
        user_id: UserId::new(row.get("user_id")?),
        transaction_type,
        amount: row.get("amount")?,
        category_id: row.get("category_id")?,
        description: row.get("description")?,
        date: row.get("date")?,
        payment_method,
        created_at: row.get("created_at")?,
    })
}
