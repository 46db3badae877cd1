use alloy::primitives::U256;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chain::Confirmation;

/// Progress and resource accounting for one invocation.
#[derive(Debug, Clone)]
pub struct RunState {
    pub run_id: String,
    pub planned: u32,
    pub completed: u32,
    pub failed_attempts: u32,
    pub total_gas_used: u128,
    pub initial_balance: Option<U256>,
    pub latest_balance: Option<U256>,
    pub started_at: DateTime<Utc>,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

impl RunState {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            planned: 0,
            completed: 0,
            failed_attempts: 0,
            total_gas_used: 0,
            initial_balance: None,
            latest_balance: None,
            started_at: Utc::now(),
        }
    }

    pub fn plan(&mut self, units: u32) {
        self.planned += units;
    }

    /// Records a confirmed unit. Never called more often than units were planned.
    pub fn record_confirmed(&mut self, confirmation: &Confirmation) {
        debug_assert!(self.completed < self.planned, "completed more units than planned");
        self.completed += 1;
        self.total_gas_used += u128::from(confirmation.gas_used);
    }

    pub fn record_failure(&mut self) {
        self.failed_attempts += 1;
    }

    pub fn record_balance(&mut self, balance: U256) {
        if self.initial_balance.is_none() {
            self.initial_balance = Some(balance);
        }
        self.latest_balance = Some(balance);
    }
}

/// Structured summary produced when a run finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub planned: u32,
    pub completed: u32,
    pub failed_attempts: u32,
    pub total_gas_used: u128,
    pub initial_balance: Option<U256>,
    pub final_balance: Option<U256>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl RunReport {
    pub fn from_state(state: &RunState) -> Self {
        let now = Utc::now();
        Self {
            run_id: state.run_id.clone(),
            planned: state.planned,
            completed: state.completed,
            failed_attempts: state.failed_attempts,
            total_gas_used: state.total_gas_used,
            initial_balance: state.initial_balance,
            final_balance: state.latest_balance,
            started_at: state.started_at,
            completed_at: now,
            duration_ms: (now - state.started_at).num_milliseconds(),
        }
    }

    /// Balance spent between the first and last observation, when both are known.
    pub fn balance_spent(&self) -> Option<U256> {
        match (self.initial_balance, self.final_balance) {
            (Some(initial), Some(last)) => Some(initial.saturating_sub(last)),
            _ => None,
        }
    }
}
