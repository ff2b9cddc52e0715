//! Categories group transactions and carry an optional monthly budget.

mod db;
mod defaults;
mod domain;
mod endpoints;
mod page;

pub use db::{
    create_category, create_category_table, delete_category, get_categories, get_category,
    update_category,
};
pub use defaults::{DEFAULT_CATEGORY_COUNT, insert_default_categories};
pub use domain::{Category, CategoryChanges, CategoryId, CategoryType, NewCategory};
pub use endpoints::{create_category_endpoint, delete_category_endpoint, update_category_endpoint};
pub use page::get_categories_page;
