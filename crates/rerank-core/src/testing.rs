//! In-memory tracker for unit tests.
//!
//! Tickets live in a single backlog ordered top-ranked first. Rank tokens are
//! derived from backlog position, so `rank_before` calls show up in later
//! searches exactly as they would against a real tracker.

use crate::error::{RerankError, Result};
use crate::tracker::{FieldInfo, SearchLimit, Tracker};
use crate::types::Ticket;
use serde_json::Value;
use std::cell::{Cell, RefCell};

pub(crate) const RANK_FIELD: &str = "customfield_12311940";
pub(crate) const PARENT_LINK_FIELD: &str = "customfield_12313140";

type Filter = Box<dyn Fn(&Ticket) -> bool>;

pub(crate) fn server_error() -> RerankError {
    RerankError::Http {
        status: 503,
        url: "fake://tracker".to_string(),
        body: "Service Unavailable".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Fields,
    Search(String),
    Ticket(String),
    Update(String),
    Rank(String, String),
}

pub(crate) struct FakeTracker {
    backlog: RefCell<Vec<Ticket>>,
    queries: RefCell<Vec<(String, Filter)>>,
    fields: Vec<FieldInfo>,
    failures: Cell<u32>,
    calls: RefCell<Vec<Call>>,
}

impl FakeTracker {
    pub(crate) fn new() -> Self {
        Self {
            backlog: RefCell::new(Vec::new()),
            queries: RefCell::new(Vec::new()),
            fields: vec![
                FieldInfo {
                    id: "summary".to_string(),
                    name: "Summary".to_string(),
                },
                FieldInfo {
                    id: RANK_FIELD.to_string(),
                    name: "Rank".to_string(),
                },
                FieldInfo {
                    id: PARENT_LINK_FIELD.to_string(),
                    name: "Parent Link".to_string(),
                },
            ],
            failures: Cell::new(0),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn with_fields(mut self, fields: Vec<FieldInfo>) -> Self {
        self.fields = fields;
        self
    }

    /// Append a ticket to the bottom of the backlog.
    pub(crate) fn add_ticket(&self, ticket: Ticket) {
        self.backlog.borrow_mut().push(ticket);
    }

    /// Answer `jql` with every backlog ticket matching `filter`.
    pub(crate) fn on_query(&self, jql: impl Into<String>, filter: impl Fn(&Ticket) -> bool + 'static) {
        self.queries.borrow_mut().push((jql.into(), Box::new(filter)));
    }

    /// Make the next `n` calls fail with a 503.
    pub(crate) fn fail_next(&self, n: u32) {
        self.failures.set(n);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(crate) fn searches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Search(jql) => Some(jql),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn rank_calls(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Rank(key, before) => Some((key, before)),
                _ => None,
            })
            .collect()
    }

    /// Backlog keys, top-ranked first.
    pub(crate) fn order(&self) -> Vec<String> {
        self.backlog.borrow().iter().map(|t| t.key.clone()).collect()
    }

    pub(crate) fn stored(&self, key: &str) -> Option<Ticket> {
        self.backlog.borrow().iter().find(|t| t.key == key).cloned()
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.borrow_mut().push(call);
        let remaining = self.failures.get();
        if remaining > 0 {
            self.failures.set(remaining - 1);
            return Err(server_error());
        }
        Ok(())
    }

    fn ranked(&self, index: usize, ticket: &Ticket) -> Ticket {
        ticket
            .clone()
            .with_field(RANK_FIELD, Value::String(format!("0|i{index:05}:")))
    }

    fn not_found(key: &str) -> RerankError {
        RerankError::Http {
            status: 404,
            url: format!("fake://tracker/issue/{key}"),
            body: "Issue Does Not Exist".to_string(),
        }
    }
}

impl Tracker for FakeTracker {
    fn fields(&self) -> Result<Vec<FieldInfo>> {
        self.record(Call::Fields)?;
        Ok(self.fields.clone())
    }

    fn search(&self, jql: &str, limit: SearchLimit, _fields: &[String]) -> Result<Vec<Ticket>> {
        self.record(Call::Search(jql.to_string()))?;
        let queries = self.queries.borrow();
        let Some((_, filter)) = queries.iter().find(|(q, _)| q == jql) else {
            return Ok(Vec::new());
        };
        let backlog = self.backlog.borrow();
        let mut hits: Vec<Ticket> = backlog
            .iter()
            .enumerate()
            .filter(|(_, t)| filter(t))
            .map(|(i, t)| self.ranked(i, t))
            .collect();
        if jql.ends_with("DESC") {
            hits.reverse();
        }
        if let SearchLimit::First(n) = limit {
            hits.truncate(n as usize);
        }
        Ok(hits)
    }

    fn ticket(&self, key: &str, _fields: &[String]) -> Result<Ticket> {
        self.record(Call::Ticket(key.to_string()))?;
        let backlog = self.backlog.borrow();
        backlog
            .iter()
            .enumerate()
            .find(|(_, t)| t.key == key)
            .map(|(i, t)| self.ranked(i, t))
            .ok_or_else(|| Self::not_found(key))
    }

    fn update_ticket(&self, key: &str, fields: &Value) -> Result<()> {
        self.record(Call::Update(key.to_string()))?;
        let mut backlog = self.backlog.borrow_mut();
        let ticket = backlog
            .iter_mut()
            .find(|t| t.key == key)
            .ok_or_else(|| Self::not_found(key))?;
        if let Some(obj) = fields.as_object() {
            for (id, value) in obj {
                ticket.fields.insert(id.clone(), value.clone());
            }
        }
        Ok(())
    }

    fn rank_before(&self, key: &str, before: &str, _rank_field: &str) -> Result<()> {
        self.record(Call::Rank(key.to_string(), before.to_string()))?;
        if key == before {
            return Err(RerankError::Http {
                status: 400,
                url: "fake://tracker/rank".to_string(),
                body: "cannot rank an issue relative to itself".to_string(),
            });
        }
        let mut backlog = self.backlog.borrow_mut();
        let from = backlog
            .iter()
            .position(|t| t.key == key)
            .ok_or_else(|| Self::not_found(key))?;
        let moved = backlog.remove(from);
        let to = backlog
            .iter()
            .position(|t| t.key == before)
            .ok_or_else(|| Self::not_found(before))?;
        backlog.insert(to, moved);
        Ok(())
    }
}
