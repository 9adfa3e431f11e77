use crate::error::{RerankError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Priority tiers as the tracker names them, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Undefined,
    Minor,
    Normal,
    Major,
    Critical,
    Blocker,
}

impl Priority {
    pub fn all() -> &'static [Priority] {
        &[
            Priority::Undefined,
            Priority::Minor,
            Priority::Normal,
            Priority::Major,
            Priority::Critical,
            Priority::Blocker,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Undefined => "Undefined",
            Priority::Minor => "Minor",
            Priority::Normal => "Normal",
            Priority::Major => "Major",
            Priority::Critical => "Critical",
            Priority::Blocker => "Blocker",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = RerankError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Priority::all()
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| RerankError::InvalidPriority(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Ticket
// ---------------------------------------------------------------------------

/// A ticket as returned by the tracker: its key plus the raw field map.
///
/// Field ids are tracker-specific (`customfield_12311940` and friends), so
/// lookups that depend on them take the resolved id as an argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub key: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Ticket {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, id: impl Into<String>, value: Value) -> Self {
        self.fields.insert(id.into(), value);
        self
    }

    pub fn with_priority(self, priority: &str) -> Self {
        self.with_field("priority", serde_json::json!({ "name": priority }))
    }

    pub fn priority_name(&self) -> Option<&str> {
        self.fields.get("priority")?.get("name")?.as_str()
    }

    pub fn tier(&self) -> Result<Priority> {
        let name = self
            .priority_name()
            .ok_or_else(|| RerankError::MissingPriority(self.key.clone()))?;
        name.parse().map_err(|_| RerankError::UnknownPriority {
            key: self.key.clone(),
            priority: name.to_string(),
        })
    }

    /// String value of a field, or the `key`/`value` of an object-valued one.
    pub fn field_str(&self, id: &str) -> Option<&str> {
        match self.fields.get(id)? {
            Value::String(s) => Some(s),
            Value::Object(obj) => obj
                .get("key")
                .or_else(|| obj.get("value"))
                .and_then(Value::as_str),
            _ => None,
        }
    }

    pub fn has_field(&self, id: &str) -> bool {
        self.fields.get(id).is_some_and(|v| !v.is_null())
    }

    /// Keys of tickets this one blocks (outward "Blocks" links).
    pub fn outward_blocks(&self) -> Vec<&str> {
        let Some(links) = self.fields.get("issuelinks").and_then(Value::as_array) else {
            return Vec::new();
        };
        links
            .iter()
            .filter(|link| {
                link.get("type")
                    .and_then(|t| t.get("name"))
                    .and_then(Value::as_str)
                    == Some("Blocks")
            })
            .filter_map(|link| link.get("outwardIssue")?.get("key")?.as_str())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Key / project validation
// ---------------------------------------------------------------------------

static KEY_RE: OnceLock<Regex> = OnceLock::new();
static PROJECT_RE: OnceLock<Regex> = OnceLock::new();

fn key_re() -> &'static Regex {
    KEY_RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*-[0-9]+$").unwrap())
}

fn project_re() -> &'static Regex {
    PROJECT_RE.get_or_init(|| Regex::new(r"^(?:[A-Za-z][A-Za-z0-9_]*|[0-9]+)$").unwrap())
}

pub fn validate_key(key: &str) -> Result<()> {
    if !key_re().is_match(key) {
        return Err(RerankError::InvalidKey(key.to_string()));
    }
    Ok(())
}

pub fn validate_project(project: &str) -> Result<()> {
    if !project_re().is_match(project) {
        return Err(RerankError::InvalidProject(project.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
