//! Lookup client
//!
//! The per-identifier lookup is an external collaborator. Workers call it
//! outside any critical section, so implementations must not touch pool
//! state. A failed lookup makes the worker skip that identifier.

use core::fmt;
use std::time::Duration;

use crate::Identifier;

/// Per-identifier lookup returning a textual payload
pub trait LookupClient: Send + Sync {
    fn lookup(&self, id: Identifier) -> Result<String, LookupError>;
}

impl<F> LookupClient for F
where
    F: Fn(Identifier) -> Result<String, LookupError> + Send + Sync,
{
    fn lookup(&self, id: Identifier) -> Result<String, LookupError> {
        self(id)
    }
}

/// Lookup failure; the identifier is skipped, never retried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupError {
    pub id: Identifier,
    pub reason: String,
}

impl LookupError {
    pub fn new(id: Identifier, reason: impl Into<String>) -> Self {
        Self { id, reason: reason.into() }
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lookup of ID {} failed: {}", self.id, self.reason)
    }
}

impl std::error::Error for LookupError {}

/// Fixed mock returning a canned JSON payload
#[derive(Debug, Clone, Default)]
pub struct MockLookup {
    /// Simulated latency per call
    delay: Duration,
}

impl MockLookup {
    /// Value reported for every identifier
    pub const VALUE: f64 = 987.65;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    /// Payload the mock returns for `id`
    pub fn payload(id: Identifier) -> String {
        format!("{{\"id\":{},\"status\":\"ok\",\"value\":{:.2}}}", id, Self::VALUE)
    }
}

impl LookupClient for MockLookup {
    fn lookup(&self, id: Identifier) -> Result<String, LookupError> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        Ok(Self::payload(id))
    }
}
