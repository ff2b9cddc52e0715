//! Database operations for categories.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    category::{Category, CategoryChanges, CategoryId, CategoryType, NewCategory},
    user::UserId,
};

/// Initialize the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            type TEXT NOT NULL,
            icon TEXT NOT NULL,
            monthly_budget REAL NOT NULL DEFAULT 0,
            is_default INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            UNIQUE(user_id, name, type),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user ON category(user_id);",
    )?;

    Ok(())
}

/// Create a category and return it with its generated ID.
///
/// # Errors
///
/// Returns [Error::DuplicateCategory] if the user already has a category with
/// the same name and type.
pub fn create_category(new_category: NewCategory, connection: &Connection) -> Result<Category, Error> {
    let created_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO category (user_id, name, type, icon, monthly_budget, is_default, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            new_category.user_id.as_i64(),
            &new_category.name,
            new_category.category_type.as_str(),
            &new_category.icon,
            new_category.monthly_budget,
            new_category.is_default,
            created_at,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        user_id: new_category.user_id,
        name: new_category.name,
        category_type: new_category.category_type,
        icon: new_category.icon,
        monthly_budget: new_category.monthly_budget,
        is_default: new_category.is_default,
        created_at,
    })
}

/// Retrieve a single category owned by `user_id`.
///
/// A category owned by another user produces [Error::NotFound], the same as a
/// missing one.
pub fn get_category(
    category_id: CategoryId,
    user_id: UserId,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, type, icon, monthly_budget, is_default, created_at
                FROM category WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &category_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of a user's categories, expense categories first, each group
/// ordered by name.
pub fn get_categories(user_id: UserId, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, type, icon, monthly_budget, is_default, created_at
                FROM category WHERE user_id = :user_id ORDER BY type ASC, name ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Apply a partial update to a category owned by `user_id` and return the
/// updated row.
///
/// The effective type (the new type when supplied, the stored type otherwise)
/// decides whether the budget is kept: non-expense categories always end up
/// with a zero budget.
///
/// # Errors
///
/// Returns [Error::NotFound] if the category does not exist or belongs to
/// another user, [Error::Validation] if a new budget is negative, and
/// [Error::DuplicateCategory] if the new name and type collide with an
/// existing category.
pub fn update_category(
    category_id: CategoryId,
    user_id: UserId,
    changes: CategoryChanges,
    connection: &Connection,
) -> Result<Category, Error> {
    let existing = get_category(category_id, user_id, connection)?;

    let name = match changes.name {
        Some(name) if !name.trim().is_empty() => name.trim().to_owned(),
        _ => existing.name,
    };
    let category_type = changes.category_type.unwrap_or(existing.category_type);
    let icon = changes.icon.unwrap_or(existing.icon);
    let monthly_budget = match changes.monthly_budget {
        Some(budget) if !budget.is_finite() || budget < 0.0 => {
            return Err(Error::Validation(
                "Monthly budget must be zero or greater".to_owned(),
            ));
        }
        Some(budget) => budget,
        None => existing.monthly_budget,
    };
    let monthly_budget = match category_type {
        CategoryType::Expense => monthly_budget,
        CategoryType::Income => 0.0,
    };

    connection.execute(
        "UPDATE category SET name = ?1, type = ?2, icon = ?3, monthly_budget = ?4
            WHERE id = ?5 AND user_id = ?6",
        (
            &name,
            category_type.as_str(),
            &icon,
            monthly_budget,
            category_id,
            user_id.as_i64(),
        ),
    )?;

    Ok(Category {
        id: category_id,
        user_id,
        name,
        category_type,
        icon,
        monthly_budget,
        is_default: existing.is_default,
        created_at: existing.created_at,
    })
}

/// Delete a category owned by `user_id`.
///
/// Transactions referencing the category keep existing with their category
/// cleared; they are never deleted.
///
/// # Errors
///
/// Returns [Error::DefaultCategoryDelete] for categories seeded at
/// registration and [Error::NotFound] if the category does not exist or
/// belongs to another user.
pub fn delete_category(
    category_id: CategoryId,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let category = get_category(category_id, user_id, connection)?;

    if category.is_default {
        return Err(Error::DefaultCategoryDelete);
    }

    connection.execute(
        "UPDATE \"transaction\" SET category_id = NULL WHERE category_id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;
    connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_type: String = row.get(3)?;
    let category_type = CategoryType::parse(&raw_type).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("invalid category type '{raw_type}'").into(),
        )
    })?;

    Ok(Category {
        id: row.get(0)?,
        user_id: UserId::new(row.get(1)?),
        name: row.get(2)?,
        category_type,
        icon: row.get(4)?,
        monthly_budget: row.get(5)?,
        is_default: row.get(6)?,
        created_at: row.get(7)?,
    })
}

#[cfg(test)]
mod category_query_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        category::{
            CategoryChanges, CategoryType, NewCategory, create_category, delete_category,
            get_categories, get_category, update_category,
        },
        db::initialize,
        user::{UserId, create_user},
    };

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    fn insert_test_user(connection: &Connection) -> UserId {
        create_user(
            "alice",
            "alice@test.com",
            crate::PasswordHash::new_unchecked("hunter2"),
            connection,
        )
        .expect("Could not create test user")
        .id
    }

    fn new_expense_category(user_id: UserId, name: &str, budget: f64) -> NewCategory {
        NewCategory::build(user_id, name, CategoryType::Expense, None, budget)
            .expect("Could not build test category")
    }

    #[test]
    fn create_category_succeeds() {
        let connection = get_test_db_connection();
        let user_id = insert_test_user(&connection);

        let category = create_category(new_expense_category(user_id, "Groceries", 100.0), &connection)
            .expect("Could not create category");

        assert!(category.id > 0);
        assert_eq!(category.name, "Groceries");
        assert_eq!(category.monthly_budget, 100.0);
        assert!(!category.is_default);
    }

    #[test]
    fn duplicate_name_and_type_is_rejected() {
        let connection = get_test_db_connection();
        let user_id = insert_test_user(&connection);
        create_category(new_expense_category(user_id, "Groceries", 0.0), &connection).unwrap();

        let duplicate =
            create_category(new_expense_category(user_id, "Groceries", 0.0), &connection);

        assert_eq!(duplicate, Err(Error::DuplicateCategory));
    }

    #[test]
    fn same_name_under_other_type_succeeds() {
        let connection = get_test_db_connection();
        let user_id = insert_test_user(&connection);
        create_category(new_expense_category(user_id, "Other", 0.0), &connection).unwrap();

        let income = create_category(
            NewCategory::build(user_id, "Other", CategoryType::Income, None, 0.0).unwrap(),
            &connection,
        );

        assert!(income.is_ok());
    }

    #[test]
    fn same_name_under_other_user_succeeds() {
        let connection = get_test_db_connection();
        let user_id = insert_test_user(&connection);
        let other_user = create_user(
            "bob",
            "bob@test.com",
            crate::PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap()
        .id;
        create_category(new_expense_category(user_id, "Groceries", 0.0), &connection).unwrap();

        let result =
            create_category(new_expense_category(other_user, "Groceries", 0.0), &connection);

        assert!(result.is_ok());
    }

    #[test]
    fn get_category_hides_foreign_rows() {
        let connection = get_test_db_connection();
        let user_id = insert_test_user(&connection);
        let other_user = create_user(
            "bob",
            "bob@test.com",
            crate::PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap()
        .id;
        let category =
            create_category(new_expense_category(user_id, "Groceries", 0.0), &connection).unwrap();

        let result = get_category(category.id, other_user, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn update_category_zeroes_budget_when_switched_to_income() {
        let connection = get_test_db_connection();
        let user_id = insert_test_user(&connection);
        let category =
            create_category(new_expense_category(user_id, "Side gig", 150.0), &connection)
                .unwrap();

        let updated = update_category(
            category.id,
            user_id,
            CategoryChanges {
                category_type: Some(CategoryType::Income),
                ..Default::default()
            },
            &connection,
        )
        .expect("Could not update category");

        assert_eq!(updated.category_type, CategoryType::Income);
        assert_eq!(updated.monthly_budget, 0.0);
    }

    #[test]
    fn update_category_keeps_unspecified_fields() {
        let connection = get_test_db_connection();
        let user_id = insert_test_user(&connection);
        let category =
            create_category(new_expense_category(user_id, "Groceries", 150.0), &connection)
                .unwrap();

        let updated = update_category(
            category.id,
            user_id,
            CategoryChanges {
                monthly_budget: Some(200.0),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();

        assert_eq!(updated.name, "Groceries");
        assert_eq!(updated.monthly_budget, 200.0);
        assert_eq!(updated.category_type, CategoryType::Expense);
    }

    #[test]
    fn delete_default_category_is_rejected() {
        let connection = get_test_db_connection();
        let user_id = insert_test_user(&connection);
        let mut new_category = new_expense_category(user_id, "Food", 0.0);
        new_category.is_default = true;
        let category = create_category(new_category, &connection).unwrap();

        let result = delete_category(category.id, user_id, &connection);

        assert_eq!(result, Err(Error::DefaultCategoryDelete));
        assert!(get_category(category.id, user_id, &connection).is_ok());
    }

    #[test]
    fn delete_category_succeeds() {
        let connection = get_test_db_connection();
        let user_id = insert_test_user(&connection);
        let category =
            create_category(new_expense_category(user_id, "Groceries", 0.0), &connection).unwrap();

        delete_category(category.id, user_id, &connection).expect("Could not delete category");

        assert_eq!(
            get_category(category.id, user_id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn categories_are_listed_expenses_first() {
        let connection = get_test_db_connection();
        let user_id = insert_test_user(&connection);
        create_category(
            NewCategory::build(user_id, "Salary", CategoryType::Income, None, 0.0).unwrap(),
            &connection,
        )
        .unwrap();
        create_category(new_expense_category(user_id, "Bills", 0.0), &connection).unwrap();

        let categories = get_categories(user_id, &connection).unwrap();

        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].category_type, CategoryType::Expense);
        assert_eq!(categories[1].category_type, CategoryType::Income);
    }
}
