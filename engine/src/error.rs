// ═══════════════════════════════════════════════════════════════════════
// Error taxonomy for round setup and progression
// ═══════════════════════════════════════════════════════════════════════

use thiserror::Error;

/// Errors surfaced by the round orchestrator.
///
/// Retryable conditions inside the path generator (cycles, length
/// violations) never appear here; they are contained by the retry loop
/// and only become a `Config` error once the retry budget is spent.
#[derive(Debug, Error)]
pub enum RoundError {
    /// Fatal misconfiguration. Aborts round setup before any state is
    /// committed.
    #[error("configuration error in {component}: {reason}")]
    Config {
        component: &'static str,
        reason: String,
    },

    /// A caller broke a lifecycle or threading contract.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Setup was cancelled before any state was committed.
    #[error("round setup cancelled")]
    Cancelled,
}

impl RoundError {
    pub fn config(component: &'static str, reason: impl Into<String>) -> Self {
        RoundError::Config { component, reason: reason.into() }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        RoundError::InvalidState(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, RoundError>;
