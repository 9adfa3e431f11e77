//! Tier-aware rank reordering.
//!
//! Children are walked in the order the children query returns them
//! (lowest-ranked first). Each one is placed directly above the current
//! anchor of its tier and then becomes that tier's anchor, so later children
//! of the same tier stack above earlier ones and the siblings keep their
//! relative order.

use crate::error::{RerankError, Result};
use crate::fields::FieldIds;
use crate::tracker::Tracker;
use crate::types::{Priority, Ticket};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// RunMode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Apply,
    /// Do all bookkeeping and logging, but never call the rank endpoint.
    DryRun,
}

impl RunMode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            RunMode::DryRun
        } else {
            RunMode::Apply
        }
    }
}

// ---------------------------------------------------------------------------
// TierAnchors
// ---------------------------------------------------------------------------

/// The ticket currently at the top of a tier, and the rank slot it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub key: String,
    pub rank: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierAnchors {
    anchors: BTreeMap<Priority, Anchor>,
}

impl TierAnchors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, tier: Priority, key: impl Into<String>, rank: Option<String>) {
        self.anchors.insert(
            tier,
            Anchor {
                key: key.into(),
                rank,
            },
        );
    }

    pub fn set_from_ticket(&mut self, tier: Priority, ticket: &Ticket, rank_field: &str) {
        self.set(tier, ticket.key.clone(), ticket.field_str(rank_field).map(str::to_string));
    }

    pub fn get(&self, tier: Priority) -> Option<&Anchor> {
        self.anchors.get(&tier)
    }

}

// ---------------------------------------------------------------------------
// RankStep
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved,
    AlreadyAbove,
}

/// What happened to one child during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankStep {
    pub key: String,
    pub tier: Priority,
    pub anchor: String,
    pub outcome: StepOutcome,
}

impl fmt::Display for RankStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            StepOutcome::Moved => write!(f, "{}({}) moved above {}", self.key, self.tier, self.anchor),
            StepOutcome::AlreadyAbove => {
                write!(f, "{}({}) already above {}", self.key, self.tier, self.anchor)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// reorder
// ---------------------------------------------------------------------------

/// Whether `ticket` holding rank token `rank` already sits above `anchor`.
///
/// Rank tokens sort lexicographically, smallest first, but only within one
/// bucket (`0|`, `1|`, `2|`). A missing token on either side, or tokens from
/// different buckets while the tracker rebalances, means we cannot tell, so
/// the ticket is moved.
fn already_above(key: &str, rank: Option<&str>, anchor: &Anchor) -> bool {
    if key == anchor.key {
        return true;
    }
    match (rank, anchor.rank.as_deref()) {
        (Some(mine), Some(theirs)) => rank_bucket(mine) == rank_bucket(theirs) && mine < theirs,
        _ => false,
    }
}

fn rank_bucket(token: &str) -> Option<&str> {
    token.split_once('|').map(|(bucket, _)| bucket)
}

/// Walks children one at a time, keeping the tier anchors current.
pub struct Reorderer<'a, T: Tracker> {
    tracker: &'a T,
    anchors: &'a mut TierAnchors,
    field_ids: &'a FieldIds,
    mode: RunMode,
}

impl<'a, T: Tracker> Reorderer<'a, T> {
    pub fn new(
        tracker: &'a T,
        anchors: &'a mut TierAnchors,
        field_ids: &'a FieldIds,
        mode: RunMode,
    ) -> Self {
        Self {
            tracker,
            anchors,
            field_ids,
            mode,
        }
    }

    /// Place `child` directly above the top ticket of its tier.
    pub fn step(&mut self, child: &Ticket) -> Result<RankStep> {
        let tier = child.tier()?;
        let anchor = self
            .anchors
            .get(tier)
            .cloned()
            .ok_or_else(|| RerankError::MissingAnchor(tier.to_string()))?;
        let rank = child.field_str(&self.field_ids.rank);

        let outcome = if already_above(&child.key, rank, &anchor) {
            let slot = rank.map(str::to_string).or_else(|| anchor.rank.clone());
            self.anchors.set(tier, child.key.clone(), slot);
            StepOutcome::AlreadyAbove
        } else {
            // The child now holds the slot just above the old anchor; no
            // tier-or-lower ticket sits between them, so the slot's token stays.
            self.anchors.set(tier, child.key.clone(), anchor.rank.clone());
            if self.mode == RunMode::Apply {
                self.tracker
                    .rank_before(&child.key, &anchor.key, &self.field_ids.rank)?;
            }
            StepOutcome::Moved
        };

        let step = RankStep {
            key: child.key.clone(),
            tier,
            anchor: anchor.key,
            outcome,
        };
        tracing::info!(step = %step, dry_run = self.mode == RunMode::DryRun, "rank step");
        Ok(step)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
