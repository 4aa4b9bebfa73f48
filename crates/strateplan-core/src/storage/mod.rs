//! Persistence layer
//!
//! SQLite-based storage for:
//! - Strategic plans and their issues
//! - KPIs and initiatives under each issue
//! - Schema versioning

mod database;
#[cfg(test)]
mod database_tests;
mod store;

pub use database::Database;
pub use store::{Column, Filter, Order, Record, Store, Table};

pub(crate) use store::{conversion_error, date, date_column, real, text, timestamp_column};
