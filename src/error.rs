use std::path::PathBuf;

use thiserror::Error;

use crate::chain::{ChainError, UnitKind};
use crate::state_machine::FailureKind;

#[derive(Debug, Error)]
pub enum FarmError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Cannot load key from {}: {reason}", path.display())]
    KeySource { path: PathBuf, reason: String },

    #[error("Gave up on {kind} {index} after {attempts} attempts: {reason}")]
    RetriesExhausted {
        kind: UnitKind,
        index: u32,
        attempts: u32,
        reason: FailureKind,
    },

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl FarmError {
    /// Configuration and key problems abort before any transaction is sent.
    pub fn is_fatal_config(&self) -> bool {
        matches!(
            self,
            FarmError::Config(_)
                | FarmError::KeySource { .. }
                | FarmError::Io(_)
                | FarmError::Toml(_)
        )
    }

    /// Process exit code for this error: 2 for configuration, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.is_fatal_config() { 2 } else { 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_source_display() {
        let err = FarmError::KeySource {
            path: PathBuf::from("privatekey.txt"),
            reason: "No such file or directory".into(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot load key from privatekey.txt: No such file or directory"
        );
    }

    #[test]
    fn config_errors_exit_with_two() {
        assert_eq!(FarmError::Config("bad".into()).exit_code(), 2);
        let key = FarmError::KeySource {
            path: PathBuf::from("k"),
            reason: "empty".into(),
        };
        assert!(key.is_fatal_config());
        assert_eq!(key.exit_code(), 2);
    }

    #[test]
    fn run_errors_exit_with_one() {
        let err = FarmError::RetriesExhausted {
            kind: UnitKind::Transfer,
            index: 4,
            attempts: 3,
            reason: FailureKind::Chain("boom".into()),
        };
        assert!(!err.is_fatal_config());
        assert_eq!(err.exit_code(), 1);
        assert_eq!(
            err.to_string(),
            "Gave up on transfer 4 after 3 attempts: Chain failure: boom"
        );
    }
}
