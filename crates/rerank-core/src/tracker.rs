//! The seam between the reorder logic and the external ticket tracker.
//!
//! Everything the tool knows about tickets comes through [`Tracker`]; the
//! Jira REST client is one implementation, [`crate::retry::RetryingTracker`]
//! wraps any implementation with the retry policy.

use crate::error::Result;
use crate::types::Ticket;
use serde::Deserialize;
use serde_json::Value;

/// One entry of the tracker's field catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldInfo {
    pub id: String,
    pub name: String,
}

/// How many results a search should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLimit {
    /// Every match, across as many pages as the tracker needs.
    All,
    /// At most this many matches, from the first page.
    First(u32),
}

pub trait Tracker {
    /// All fields known to the tracker, used for name-to-id resolution.
    fn fields(&self) -> Result<Vec<FieldInfo>>;

    /// Run a query, returning tickets in the order the query asks for.
    fn search(&self, jql: &str, limit: SearchLimit, fields: &[String]) -> Result<Vec<Ticket>>;

    fn ticket(&self, key: &str, fields: &[String]) -> Result<Ticket>;

    /// Set fields on a ticket. `fields` is an object of field id to value.
    fn update_ticket(&self, key: &str, fields: &Value) -> Result<()>;

    /// Place `key` immediately above `before` in the rank ordering.
    fn rank_before(&self, key: &str, before: &str, rank_field: &str) -> Result<()>;
}

impl<T: Tracker + ?Sized> Tracker for &T {
    fn fields(&self) -> Result<Vec<FieldInfo>> {
        (**self).fields()
    }

    fn search(&self, jql: &str, limit: SearchLimit, fields: &[String]) -> Result<Vec<Ticket>> {
        (**self).search(jql, limit, fields)
    }

    fn ticket(&self, key: &str, fields: &[String]) -> Result<Ticket> {
        (**self).ticket(key, fields)
    }

    fn update_ticket(&self, key: &str, fields: &Value) -> Result<()> {
        (**self).update_ticket(key, fields)
    }

    fn rank_before(&self, key: &str, before: &str, rank_field: &str) -> Result<()> {
        (**self).rank_before(key, before, rank_field)
    }
}
