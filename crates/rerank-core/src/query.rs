//! Queries against the tracker: a parent's children and per-tier anchors.

use crate::error::{RerankError, Result};
use crate::fields::FieldIds;
use crate::reorder::TierAnchors;
use crate::tracker::{SearchLimit, Tracker};
use crate::types::{validate_key, validate_project, Priority, Ticket};

/// Result of a search, kept with the query that produced it for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct Search {
    pub query: String,
    pub tickets: Vec<Ticket>,
}

impl Search {
    pub fn keys(&self) -> Vec<&str> {
        self.tickets.iter().map(|t| t.key.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// JQL
// ---------------------------------------------------------------------------

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

pub fn children_query(parent: &str, project: &str, issue_type: &str) -> String {
    format!(
        "\"Parent Link\"={parent} AND project={project} AND type={} ORDER BY Rank DESC",
        quote(issue_type)
    )
}

/// Highest-ranked ticket at or below `tier`, optionally skipping a parent's children.
pub fn tier_query(
    tier: Priority,
    project: &str,
    issue_type: &str,
    exclude_children_of: Option<&str>,
) -> String {
    let mut jql = format!(
        "priority<={tier} AND project={project} AND type={}",
        quote(issue_type)
    );
    if let Some(parent) = exclude_children_of {
        jql.push_str(&format!(
            " AND (\"Parent Link\" is EMPTY OR \"Parent Link\"!={parent})"
        ));
    }
    jql.push_str(" ORDER BY Rank ASC");
    jql
}

// ---------------------------------------------------------------------------
// Searches
// ---------------------------------------------------------------------------

/// Every child of `parent` in `project` of `issue_type`, lowest-ranked first.
///
/// No children at all is an error: it means the parent or project is wrong.
pub fn find_children(
    tracker: &impl Tracker,
    parent: &str,
    project: &str,
    issue_type: &str,
    field_ids: &FieldIds,
) -> Result<Search> {
    validate_key(parent)?;
    validate_project(project)?;

    let query = children_query(parent, project, issue_type);
    tracing::info!(%query, "searching for children");
    let tickets = tracker.search(&query, SearchLimit::All, &field_ids.search_fields())?;
    if tickets.is_empty() {
        return Err(RerankError::NoResults {
            issue_type: issue_type.to_string(),
            query,
        });
    }
    tracing::info!(count = tickets.len(), "found children");
    Ok(Search { query, tickets })
}

/// The current top ticket for each tier, to serve as reorder anchors.
///
/// Stops at the first tier with nothing to anchor on.
pub fn find_top_ticket_per_tier(
    tracker: &impl Tracker,
    tiers: &[Priority],
    project: &str,
    issue_type: &str,
    exclude_children_of: Option<&str>,
    field_ids: &FieldIds,
) -> Result<TierAnchors> {
    validate_project(project)?;
    if let Some(parent) = exclude_children_of {
        validate_key(parent)?;
    }

    let fields = vec!["priority".to_string(), field_ids.rank.clone()];
    let mut anchors = TierAnchors::new();
    for &tier in tiers {
        let query = tier_query(tier, project, issue_type, exclude_children_of);
        let top = tracker
            .search(&query, SearchLimit::First(1), &fields)?
            .into_iter()
            .next()
            .ok_or_else(|| RerankError::NoResults {
                issue_type: issue_type.to_string(),
                query: query.clone(),
            })?;
        tracing::debug!(%tier, anchor = %top.key, "tier anchor");
        anchors.set_from_ticket(tier, &top, &field_ids.rank);
    }
    Ok(anchors)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
