//! The categories seeded for every new user at registration.

use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{Error, category::CategoryType, user::UserId};

/// The categories every new account starts with: name, icon and type.
const DEFAULT_CATEGORIES: [(&str, &str, CategoryType); 10] = [
    ("Food", "🍔", CategoryType::Expense),
    ("Transport", "🚗", CategoryType::Expense),
    ("Shopping", "🛍️", CategoryType::Expense),
    ("Bills", "📄", CategoryType::Expense),
    ("Entertainment", "🎬", CategoryType::Expense),
    ("Other", "📦", CategoryType::Expense),
    ("Salary", "💼", CategoryType::Income),
    ("Freelance", "💻", CategoryType::Income),
    ("Gifts", "🎁", CategoryType::Income),
    ("Other Income", "💰", CategoryType::Income),
];

/// The number of categories seeded at registration.
pub const DEFAULT_CATEGORY_COUNT: usize = DEFAULT_CATEGORIES.len();

/// Insert the default categories for a new user.
///
/// Intended to be called inside the registration SQL transaction so that the
/// user, profile and defaults are created atomically.
pub fn insert_default_categories(user_id: UserId, connection: &Connection) -> Result<(), Error> {
    let created_at = OffsetDateTime::now_utc();
    let mut statement = connection.prepare(
        "INSERT INTO category (user_id, name, type, icon, monthly_budget, is_default, created_at)
            VALUES (?1, ?2, ?3, ?4, 0, 1, ?5)",
    )?;

    for (name, icon, category_type) in DEFAULT_CATEGORIES {
        statement.execute((
            user_id.as_i64(),
            name,
            category_type.as_str(),
            icon,
            created_at,
        ))?;
    }

    Ok(())
}

#[cfg(test)]
mod default_category_tests {
    use rusqlite::Connection;

    use crate::{
        PasswordHash,
        category::{CategoryType, get_categories},
        db::initialize,
        user::create_user,
    };

    use super::{DEFAULT_CATEGORY_COUNT, insert_default_categories};

    #[test]
    fn seeds_six_expense_and_four_income_categories() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            "alice",
            "alice@test.com",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        insert_default_categories(user.id, &connection)
            .expect("Could not insert default categories");

        let categories = get_categories(user.id, &connection).unwrap();
        assert_eq!(categories.len(), DEFAULT_CATEGORY_COUNT);

        let expense_count = categories
            .iter()
            .filter(|category| category.category_type == CategoryType::Expense)
            .count();
        let income_count = categories.len() - expense_count;
        assert_eq!(expense_count, 6);
        assert_eq!(income_count, 4);

        assert!(categories.iter().all(|category| category.is_default));
        assert!(categories.iter().all(|category| category.monthly_budget == 0.0));
    }
}
