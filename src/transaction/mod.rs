//! Transactions are the income and expense records at the heart of the app.

mod db;
mod domain;
mod endpoints;
mod page;

pub use db::{
    category_breakdown, create_transaction, create_transaction_table, delete_transaction,
    get_recent_transactions, get_transaction, get_transactions, monthly_total, spent_by_category,
    top_expense_categories, update_transaction, ytd_totals,
};
pub use domain::{
    NewTransaction, PaymentMethod, Transaction, TransactionChanges, TransactionFilter,
    TransactionId, TransactionType,
};
pub use endpoints::{
    TransactionForm, create_transaction_endpoint, delete_transaction_endpoint,
    get_recent_transactions_endpoint, update_transaction_endpoint,
};
pub use page::get_transactions_page;
