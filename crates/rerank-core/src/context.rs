//! Related-ticket context, kept beside the tickets rather than inside them.
//!
//! Tickets returned by the tracker are left exactly as the tracker sent them.
//! Anything derived from them (resolved parent, tickets they block) lives in a
//! [`ContextTable`] keyed by ticket key, so refetching or updating a ticket
//! never loses it.

use crate::error::Result;
use crate::fields::FieldIds;
use crate::tracker::Tracker;
use crate::types::Ticket;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketContext {
    pub parent: Option<Ticket>,
    pub blocks: Vec<Ticket>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextTable {
    entries: BTreeMap<String, TicketContext>,
}

impl ContextTable {
    pub fn get(&self, key: &str) -> Option<&TicketContext> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, context: TicketContext) {
        self.entries.insert(key.into(), context);
    }
}

fn related_fields() -> Vec<String> {
    vec!["summary".to_string(), "priority".to_string()]
}

/// Look up each ticket's parent and the tickets it blocks.
///
/// Each related ticket is fetched once per call, however many tickets
/// reference it.
pub fn build_context(
    tracker: &impl Tracker,
    tickets: &[Ticket],
    field_ids: &FieldIds,
) -> Result<ContextTable> {
    let fields = related_fields();
    let mut fetched: HashMap<String, Ticket> = HashMap::new();
    let mut fetch = |key: &str| -> Result<Ticket> {
        if let Some(t) = fetched.get(key) {
            return Ok(t.clone());
        }
        let t = tracker.ticket(key, &fields)?;
        fetched.insert(key.to_string(), t.clone());
        Ok(t)
    };

    let mut table = ContextTable::default();
    for ticket in tickets {
        let parent = match field_ids
            .parent_link
            .as_deref()
            .and_then(|id| ticket.field_str(id))
        {
            Some(parent_key) => Some(fetch(parent_key)?),
            None => None,
        };
        let blocks = ticket
            .outward_blocks()
            .into_iter()
            .map(&mut fetch)
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            key = %ticket.key,
            parent = ?parent.as_ref().map(|p| &p.key),
            blocks = blocks.len(),
            "built ticket context"
        );
        table.insert(ticket.key.clone(), TicketContext { parent, blocks });
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
