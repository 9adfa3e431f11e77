use crate::error::{RerankError, Result};
use crate::tracker::{FieldInfo, Tracker};
use crate::types::Ticket;

pub const RANK_FIELD_NAME: &str = "Rank";
pub const PARENT_LINK_FIELD_NAME: &str = "Parent Link";

/// Field names that can carry a ticket's parent, in preference order.
pub const PARENT_LINK_CANDIDATES: &[&str] = &["Epic Link", "Feature Link", "Parent Link"];

/// Tracker-specific ids of the fields the reorder run reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIds {
    pub rank: String,
    pub parent_link: Option<String>,
    /// Ids of every field that may carry the parent, in preference order.
    pub parent_link_candidates: Vec<String>,
}

impl FieldIds {
    /// Resolve field ids from the tracker's catalogue.
    ///
    /// The parent-link field is the first candidate set on any of `sample`;
    /// with no sample (or no candidate set) it falls back to "Parent Link".
    pub fn resolve(tracker: &impl Tracker, sample: &[Ticket]) -> Result<Self> {
        let catalogue = tracker.fields()?;
        Self::from_catalogue(&catalogue, sample)
    }

    pub fn from_catalogue(catalogue: &[FieldInfo], sample: &[Ticket]) -> Result<Self> {
        let rank = catalogue
            .iter()
            .find(|f| f.name == RANK_FIELD_NAME)
            .map(|f| f.id.clone())
            .ok_or_else(|| RerankError::FieldNotFound(RANK_FIELD_NAME.to_string()))?;

        let parent_link_candidates: Vec<String> = PARENT_LINK_CANDIDATES
            .iter()
            .flat_map(|name| catalogue.iter().filter(move |f| f.name == *name))
            .map(|f| f.id.clone())
            .collect();

        let parent_link = catalogue
            .iter()
            .find(|f| f.name == PARENT_LINK_FIELD_NAME)
            .map(|f| f.id.clone());

        let ids = Self {
            rank,
            parent_link,
            parent_link_candidates,
        }
        .with_sample(sample);
        tracing::debug!(rank = %ids.rank, parent_link = ?ids.parent_link, "resolved field ids");
        Ok(ids)
    }

    /// Pick the parent-link field actually in use on `sample`, keeping the
    /// current choice when no candidate is set on any of them.
    pub fn with_sample(mut self, sample: &[Ticket]) -> Self {
        let in_use = sample.iter().find_map(|t| {
            self.parent_link_candidates
                .iter()
                .find(|id| t.has_field(id))
                .cloned()
        });
        if in_use.is_some() {
            self.parent_link = in_use;
        }
        self
    }

    /// Fields a search must return for the reorder run.
    ///
    /// Every parent-link candidate is requested, so a later
    /// [`FieldIds::with_sample`] can see which one the tickets use.
    pub fn search_fields(&self) -> Vec<String> {
        let mut fields = vec!["priority".to_string(), self.rank.clone()];
        for id in self.parent_link.iter().chain(&self.parent_link_candidates) {
            if !fields.contains(id) {
                fields.push(id.clone());
            }
        }
        fields.push("issuelinks".to_string());
        fields
    }
}

/// Numeric part of a custom field id (`customfield_12311940` gives 12311940).
pub fn custom_field_number(id: &str) -> Option<u64> {
    id.strip_prefix("customfield_")?.parse().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
