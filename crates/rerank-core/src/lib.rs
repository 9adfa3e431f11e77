pub mod config;
pub mod context;
pub mod error;
pub mod fields;
pub mod jira;
pub mod query;
pub mod reorder;
pub mod retry;
pub mod tracker;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{RerankError, Result};
