use thiserror::Error;

#[derive(Debug, Error)]
pub enum RerankError {
    #[error("No {issue_type} found via query: {query}")]
    NoResults { issue_type: String, query: String },

    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("invalid ticket key '{0}': expected PROJECT-123")]
    InvalidKey(String),

    #[error("invalid project id '{0}': expected a project key or numeric id")]
    InvalidProject(String),

    #[error("invalid priority '{0}': expected one of Undefined, Minor, Normal, Major, Critical, Blocker")]
    InvalidPriority(String),

    #[error("unknown priority '{priority}' on {key}")]
    UnknownPriority { key: String, priority: String },

    #[error("ticket {0} has no priority")]
    MissingPriority(String),

    #[error("no anchor ticket for tier {0}")]
    MissingAnchor(String),

    #[error("tracker returned HTTP {status} for {url}: {body}")]
    Http {
        status: u16,
        url: String,
        body: String,
    },

    #[error("tracker request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected tracker response for {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{operation} failed after {attempts} attempts")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        #[source]
        source: Box<RerankError>,
    },

    #[error("invalid config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl RerankError {
    /// Whether another attempt could succeed without anything changing on our side.
    pub fn is_transient(&self) -> bool {
        match self {
            RerankError::Http { status, .. } => *status == 429 || *status >= 500,
            RerankError::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, RerankError>;
