//! Bounded retries around tracker calls.
//!
//! Each call's result is classified into an [`Attempt`]. Transient failures
//! are retried up to [`RetryPolicy::max_attempts`] times; permanent failures
//! return straight away. When every attempt fails transiently the caller gets
//! [`RerankError::RetriesExhausted`] wrapping the last failure.

use crate::error::{RerankError, Result};
use crate::tracker::{FieldInfo, SearchLimit, Tracker};
use crate::types::Ticket;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_DELAY: Duration = Duration::from_millis(250);

// ---------------------------------------------------------------------------
// Attempt
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum Attempt<T> {
    Success(T),
    Transient(RerankError),
    Permanent(RerankError),
}

impl<T> From<Result<T>> for Attempt<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Attempt::Success(value),
            Err(e) if e.is_transient() => Attempt::Transient(e),
            Err(e) => Attempt::Permanent(e),
        }
    }
}

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Same attempt budget, no sleeping between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    pub fn run<T>(&self, operation: &str, mut call: impl FnMut() -> Result<T>) -> Result<T> {
        let mut attempt = 1;
        loop {
            match Attempt::from(call()) {
                Attempt::Success(value) => return Ok(value),
                Attempt::Permanent(e) => return Err(e),
                Attempt::Transient(e) if attempt >= self.max_attempts => {
                    tracing::error!(operation, attempts = attempt, error = %e, "giving up");
                    return Err(RerankError::RetriesExhausted {
                        operation: operation.to_string(),
                        attempts: attempt,
                        source: Box::new(e),
                    });
                }
                Attempt::Transient(e) => {
                    tracing::warn!(
                        operation,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "transient tracker failure, retrying"
                    );
                    if !self.delay.is_zero() {
                        std::thread::sleep(self.delay);
                    }
                    attempt += 1;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// RetryingTracker
// ---------------------------------------------------------------------------

/// A [`Tracker`] that runs every call of the wrapped tracker under a policy.
#[derive(Debug, Clone)]
pub struct RetryingTracker<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: Tracker> RetryingTracker<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<T: Tracker> Tracker for RetryingTracker<T> {
    fn fields(&self) -> Result<Vec<FieldInfo>> {
        self.policy.run("list fields", || self.inner.fields())
    }

    fn search(&self, jql: &str, limit: SearchLimit, fields: &[String]) -> Result<Vec<Ticket>> {
        self.policy
            .run("search", || self.inner.search(jql, limit, fields))
    }

    fn ticket(&self, key: &str, fields: &[String]) -> Result<Ticket> {
        self.policy
            .run(&format!("fetch {key}"), || self.inner.ticket(key, fields))
    }

    fn update_ticket(&self, key: &str, fields: &Value) -> Result<()> {
        self.policy
            .run(&format!("update {key}"), || self.inner.update_ticket(key, fields))
    }

    fn rank_before(&self, key: &str, before: &str, rank_field: &str) -> Result<()> {
        self.policy.run(&format!("rank {key} before {before}"), || {
            self.inner.rank_before(key, before, rank_field)
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
