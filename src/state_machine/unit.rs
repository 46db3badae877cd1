use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::State;
use crate::chain::{ChainError, Confirmation, Payload};

/// Classifies a failed attempt. All kinds are retried the same way; the
/// distinction is kept for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The node refused the transaction (bad nonce, insufficient funds).
    Submission(String),
    /// No receipt arrived within the client's wait window.
    Timeout(String),
    /// Node, transport or execution failure.
    Chain(String),
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Submission(msg) => write!(f, "Submission failure: {msg}"),
            FailureKind::Timeout(msg) => write!(f, "Confirmation timeout: {msg}"),
            FailureKind::Chain(msg) => write!(f, "Chain failure: {msg}"),
        }
    }
}

impl From<&ChainError> for FailureKind {
    fn from(err: &ChainError) -> Self {
        match err {
            ChainError::Submission(_) => FailureKind::Submission(err.to_string()),
            ChainError::ConfirmationTimeout { .. } => FailureKind::Timeout(err.to_string()),
            ChainError::Reverted(_)
            | ChainError::MissingContractAddress(_)
            | ChainError::Rpc(_)
            | ChainError::Http(_) => FailureKind::Chain(err.to_string()),
        }
    }
}

/// The result of one step (submission or confirmation) of a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    Success,
    Failure(FailureKind),
}

/// The result of one full attempt at a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome<T = Confirmation> {
    Confirmed(T),
    Failed { reason: FailureKind },
}

/// Tracks the lifecycle status of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitStatus {
    Pending,
    InProgress,
    Completed,
    Abandoned,
}

/// Retry behavior for failed attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries allowed before a unit is abandoned. `None` retries forever.
    pub max_retries: Option<u32>,
    /// Fixed pause in milliseconds before retrying.
    pub cooldown_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: None,
            cooldown_ms: 5000,
        }
    }
}

impl RetryPolicy {
    /// Whether the `retry`-th retry (1-based) may run.
    pub fn allows(&self, retry: u32) -> bool {
        self.max_retries.is_none_or(|max| retry <= max)
    }
}

/// One on-chain action the driver must see confirmed.
#[derive(Debug, Clone)]
pub struct WorkUnit {
    pub index: u32,
    pub payload: Payload,
    pub status: UnitStatus,
    pub state: State,
    pub state_history: Vec<State>,
    pub retry_count: u32,
    pub retry_policy: RetryPolicy,
    pub created_at: DateTime<Utc>,
}

impl WorkUnit {
    pub fn new(index: u32, payload: Payload, retry_policy: RetryPolicy) -> Self {
        Self {
            index,
            payload,
            status: UnitStatus::Pending,
            state: State::Pending,
            state_history: Vec::new(),
            retry_count: 0,
            retry_policy,
            created_at: Utc::now(),
        }
    }

    /// The 1-based number of the attempt currently in flight.
    pub fn attempt(&self) -> u32 {
        self.retry_count + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Bytes, TxHash};

    fn deploy() -> Payload {
        Payload::Deploy {
            bytecode: Bytes::new(),
        }
    }

    #[test]
    fn unit_creation_defaults() {
        let unit = WorkUnit::new(3, deploy(), RetryPolicy::default());
        assert_eq!(unit.index, 3);
        assert_eq!(unit.status, UnitStatus::Pending);
        assert_eq!(unit.state, State::Pending);
        assert_eq!(unit.retry_count, 0);
        assert_eq!(unit.attempt(), 1);
        assert!(unit.state_history.is_empty());
    }

    #[test]
    fn default_policy_retries_forever() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.cooldown_ms, 5000);
        assert!(policy.allows(1));
        assert!(policy.allows(u32::MAX));
    }

    #[test]
    fn capped_policy_stops_after_max() {
        let policy = RetryPolicy {
            max_retries: Some(2),
            cooldown_ms: 0,
        };
        assert!(policy.allows(1));
        assert!(policy.allows(2));
        assert!(!policy.allows(3));
    }

    #[test]
    fn chain_errors_are_classified() {
        let rejected = ChainError::Submission("nonce too low".into());
        assert!(matches!(FailureKind::from(&rejected), FailureKind::Submission(_)));

        let slow = ChainError::ConfirmationTimeout {
            tx_hash: TxHash::ZERO,
            waited_ms: 10,
        };
        assert!(matches!(FailureKind::from(&slow), FailureKind::Timeout(_)));

        let reverted = ChainError::Reverted(TxHash::ZERO);
        assert!(matches!(FailureKind::from(&reverted), FailureKind::Chain(_)));
    }

    #[test]
    fn failure_kind_display() {
        let kind = FailureKind::from(&ChainError::Rpc("connection reset".into()));
        assert_eq!(kind.to_string(), "Chain failure: RPC error: connection reset");
    }
}
