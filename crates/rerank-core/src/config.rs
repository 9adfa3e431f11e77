use crate::error::{RerankError, Result};
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// RetryConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    crate::retry::DEFAULT_MAX_ATTEMPTS
}

fn default_delay_ms() -> u64 {
    crate::retry::DEFAULT_DELAY.as_millis() as u64
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.delay_ms))
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Issue types processed, in order.
    #[serde(default = "default_issue_types")]
    pub issue_types: Vec<String>,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Leave the parent's own children out of the tier anchor queries.
    #[serde(default = "default_exclude_children")]
    pub exclude_children_from_anchors: bool,
}

fn default_issue_types() -> Vec<String> {
    vec!["Feature".to_string()]
}

fn default_timeout_secs() -> u64 {
    crate::jira::DEFAULT_TIMEOUT.as_secs()
}

fn default_exclude_children() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            issue_types: default_issue_types(),
            retry: RetryConfig::default(),
            timeout_secs: default_timeout_secs(),
            exclude_children_from_anchors: default_exclude_children(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&data)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.issue_types.is_empty() {
            return Err(RerankError::Config("issue_types must not be empty".to_string()));
        }
        if let Some(blank) = self.issue_types.iter().find(|t| t.trim().is_empty()) {
            return Err(RerankError::Config(format!("blank issue type '{blank}'")));
        }
        if self.retry.max_attempts == 0 {
            return Err(RerankError::Config(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(RerankError::Config("timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
