//! Orchestrator configuration.

use std::time::Duration;

/// Deadlines applied to outbound collaborator calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Upper bound on a single catalog lookup.
    pub catalog_timeout: Duration,

    /// Upper bound on a single payment call.
    pub payment_timeout: Duration,
}

impl OrchestratorConfig {
    pub fn new(catalog_timeout: Duration, payment_timeout: Duration) -> Self {
        Self {
            catalog_timeout,
            payment_timeout,
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            catalog_timeout: Duration::from_secs(5),
            payment_timeout: Duration::from_secs(10),
        }
    }
}
