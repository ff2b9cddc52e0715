//! The transaction domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, category::CategoryId, user::UserId};

/// Alias for the integer IDs used by the transaction table.
pub type TransactionId = i64;

/// Whether a transaction records money coming in or going out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

impl TransactionType {
    /// The string stored in the database for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// Parse a type from its database/form representation.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if `value` is not "income" or "expense".
    pub fn parse(value: &str) -> Result<Self, Error> {
        match value {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::Validation(format!(
                "Invalid transaction type '{other}'"
            ))),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Income => write!(f, "Income"),
            TransactionType::Expense => write!(f, "Expense"),
        }
    }
}

/// How a transaction was paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Physical cash.
    #[default]
    Cash,
    /// Credit or debit card.
    Card,
    /// Bank transfer.
    Bank,
    /// Mobile payment.
    Mobile,
    /// Anything else.
    Other,
}

impl PaymentMethod {
    /// The string stored in the database for this payment method.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Bank => "bank",
            PaymentMethod::Mobile => "mobile",
            PaymentMethod::Other => "other",
        }
    }

    /// Parse a payment method from its database/form representation.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] for unknown values.
    pub fn parse(value: &str) -> Result<Self, Error> {
        match value {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "bank" => Ok(PaymentMethod::Bank),
            "mobile" => Ok(PaymentMethod::Mobile),
            "other" => Ok(PaymentMethod::Other),
            other => Err(Error::Validation(format!(
                "Invalid payment method '{other}'"
            ))),
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Credit/Debit Card",
            PaymentMethod::Bank => "Bank Transfer",
            PaymentMethod::Mobile => "Mobile Payment",
            PaymentMethod::Other => "Other",
        };

        write!(f, "{label}")
    }
}

/// An income or expense record owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The transaction's ID in the application database.
    pub id: TransactionId,
    /// The user that owns the transaction.
    pub user_id: UserId,
    /// Whether this is income or an expense.
    pub transaction_type: TransactionType,
    /// The amount of money. Always greater than zero.
    pub amount: f64,
    /// The category the transaction belongs to, if any. Cleared when the
    /// category is deleted.
    pub category_id: Option<CategoryId>,
    /// A free-text description.
    pub description: String,
    /// The day the transaction happened.
    pub date: Date,
    /// How the transaction was paid.
    pub payment_method: PaymentMethod,
    /// When the record was created.
    pub created_at: OffsetDateTime,
}

/// The validated data needed to create a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The user that will own the transaction.
    pub user_id: UserId,
    /// Whether this is income or an expense.
    pub transaction_type: TransactionType,
    /// The amount of money.
    pub amount: f64,
    /// The category the transaction belongs to, if any. Must be owned by
    /// `user_id` when set.
    pub category_id: Option<CategoryId>,
    /// A free-text description.
    pub description: String,
    /// The day the transaction happened.
    pub date: Date,
    /// How the transaction was paid.
    pub payment_method: PaymentMethod,
}

impl NewTransaction {
    /// Validate and build a new transaction for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if `amount` is not greater than zero or
    /// not finite.
    pub fn build(
        user_id: UserId,
        transaction_type: TransactionType,
        amount: f64,
        category_id: Option<CategoryId>,
        description: &str,
        date: Date,
        payment_method: PaymentMethod,
    ) -> Result<Self, Error> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::Validation(
                "Amount must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            user_id,
            transaction_type,
            amount,
            category_id,
            description: description.trim().to_owned(),
            date,
            payment_method,
        })
    }
}

/// A partial update for a transaction. `None` fields are left unchanged.
///
/// A `category_id` that does not resolve to a category owned by the user is
/// silently ignored rather than rejected.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionChanges {
    /// A new transaction type.
    pub transaction_type: Option<TransactionType>,
    /// A new amount. Must be greater than zero.
    pub amount: Option<f64>,
    /// A new category.
    pub category_id: Option<CategoryId>,
    /// A new description.
    pub description: Option<String>,
    /// A new date.
    pub date: Option<Date>,
    /// A new payment method.
    pub payment_method: Option<PaymentMethod>,
}

/// Filters for the transactions listing. `None` fields match everything.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionFilter {
    /// Only transactions of this type.
    pub transaction_type: Option<TransactionType>,
    /// Only transactions in this category.
    pub category_id: Option<CategoryId>,
    /// Only transactions on or after this date.
    pub date_from: Option<Date>,
    /// Only transactions on or before this date.
    pub date_to: Option<Date>,
}

#[cfg(test)]
mod new_transaction_tests {
    use time::macros::date;

    use crate::{Error, user::UserId};

    use super::{NewTransaction, PaymentMethod, TransactionType};

    #[test]
    fn build_fails_on_zero_amount() {
        let result = NewTransaction::build(
            UserId::new(1),
            TransactionType::Expense,
            0.0,
            None,
            "coffee",
            date!(2026 - 08 - 01),
            PaymentMethod::Cash,
        );

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn build_fails_on_negative_amount() {
        let result = NewTransaction::build(
            UserId::new(1),
            TransactionType::Expense,
            -4.5,
            None,
            "coffee",
            date!(2026 - 08 - 01),
            PaymentMethod::Cash,
        );

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn build_succeeds_on_positive_amount() {
        let result = NewTransaction::build(
            UserId::new(1),
            TransactionType::Expense,
            4.5,
            None,
            "  coffee  ",
            date!(2026 - 08 - 01),
            PaymentMethod::Card,
        );

        let transaction = result.unwrap();
        assert_eq!(transaction.description, "coffee");
    }

    #[test]
    fn payment_method_labels() {
        assert_eq!(PaymentMethod::Card.to_string(), "Credit/Debit Card");
        assert_eq!(PaymentMethod::Bank.to_string(), "Bank Transfer");
        assert_eq!(PaymentMethod::Mobile.to_string(), "Mobile Payment");
    }
}
