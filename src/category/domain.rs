//! The category domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, user::UserId};

/// Alias for the integer IDs used by the category table.
pub type CategoryId = i64;

/// Whether a category groups income or expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryType {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

impl CategoryType {
    /// The string stored in the database for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Income => "income",
            CategoryType::Expense => "expense",
        }
    }

    /// Parse a type from its database/form representation.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if `value` is not "income" or "expense".
    pub fn parse(value: &str) -> Result<Self, Error> {
        match value {
            "income" => Ok(CategoryType::Income),
            "expense" => Ok(CategoryType::Expense),
            other => Err(Error::Validation(format!("Invalid category type '{other}'"))),
        }
    }
}

impl Display for CategoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryType::Income => write!(f, "Income"),
            CategoryType::Expense => write!(f, "Expense"),
        }
    }
}

/// The icon given to categories created without one.
pub const DEFAULT_ICON: &str = "📦";

/// A category owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// The category's ID in the application database.
    pub id: CategoryId,
    /// The user that owns the category.
    pub user_id: UserId,
    /// The display name, unique per (user, type).
    pub name: String,
    /// Whether this category groups income or expenses.
    pub category_type: CategoryType,
    /// An emoji shown next to the name.
    pub icon: String,
    /// The monthly budget. Always zero for income categories.
    pub monthly_budget: f64,
    /// Whether the category was seeded at registration. Default categories
    /// cannot be deleted.
    pub is_default: bool,
    /// When the category was created.
    pub created_at: OffsetDateTime,
}

/// The validated data needed to create a category.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    /// The user that will own the category.
    pub user_id: UserId,
    /// The display name.
    pub name: String,
    /// Whether this category groups income or expenses.
    pub category_type: CategoryType,
    /// An emoji shown next to the name.
    pub icon: String,
    /// The monthly budget. Forced to zero for income categories.
    pub monthly_budget: f64,
    /// Whether this is a seeded default category.
    pub is_default: bool,
}

impl NewCategory {
    /// Validate and build a new category for `user_id`.
    ///
    /// The budget is forced to zero for income categories and the icon falls
    /// back to [DEFAULT_ICON] when empty.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if `name` is empty or `monthly_budget` is
    /// negative or not finite.
    pub fn build(
        user_id: UserId,
        name: &str,
        category_type: CategoryType,
        icon: Option<&str>,
        monthly_budget: f64,
    ) -> Result<Self, Error> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("Missing required fields".to_owned()));
        }

        if !monthly_budget.is_finite() || monthly_budget < 0.0 {
            return Err(Error::Validation(
                "Monthly budget must be zero or greater".to_owned(),
            ));
        }

        let monthly_budget = match category_type {
            CategoryType::Expense => monthly_budget,
            CategoryType::Income => 0.0,
        };

        let icon = match icon {
            Some(icon) if !icon.trim().is_empty() => icon.trim().to_owned(),
            _ => DEFAULT_ICON.to_owned(),
        };

        Ok(Self {
            user_id,
            name: name.to_owned(),
            category_type,
            icon,
            monthly_budget,
            is_default: false,
        })
    }
}

/// A partial update for a category. `None` fields are left unchanged.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CategoryChanges {
    /// A new display name.
    pub name: Option<String>,
    /// A new category type.
    pub category_type: Option<CategoryType>,
    /// A new icon.
    pub icon: Option<String>,
    /// A new monthly budget.
    pub monthly_budget: Option<f64>,
}

#[cfg(test)]
mod new_category_tests {
    use crate::{Error, user::UserId};

    use super::{CategoryType, DEFAULT_ICON, NewCategory};

    #[test]
    fn build_fails_on_empty_name() {
        let result = NewCategory::build(UserId::new(1), "  ", CategoryType::Expense, None, 0.0);

        assert_eq!(
            result,
            Err(Error::Validation("Missing required fields".to_owned()))
        );
    }

    #[test]
    fn build_fails_on_negative_budget() {
        let result = NewCategory::build(UserId::new(1), "Food", CategoryType::Expense, None, -1.0);

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn build_zeroes_budget_for_income() {
        let category =
            NewCategory::build(UserId::new(1), "Salary", CategoryType::Income, None, 500.0)
                .unwrap();

        assert_eq!(category.monthly_budget, 0.0);
    }

    #[test]
    fn build_defaults_icon_when_missing() {
        let category =
            NewCategory::build(UserId::new(1), "Food", CategoryType::Expense, Some("  "), 100.0)
                .unwrap();

        assert_eq!(category.icon, DEFAULT_ICON);
    }
}
