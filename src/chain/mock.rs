//! Scripted in-memory chain used by driver and campaign tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use alloy::primitives::{Address, TxHash, U256};
use chrono::DateTime;

use super::client::ChainClient;
use super::error::ChainError;
use super::types::{Confirmation, Payload, PendingHandle, UnitKind};

pub const GAS_PER_TX: u64 = 21_000;
pub const STARTING_BALANCE: u64 = 10_000_000;

/// A chain that succeeds unless a scripted failure is queued.
///
/// Failures are consumed in order: `submit_failures` by `submit` calls and
/// `confirm_failures` by `await_confirmation` calls. `None` in the queue
/// means that call succeeds.
#[derive(Default)]
pub struct MockChain {
    pub submit_failures: RefCell<VecDeque<Option<ChainError>>>,
    pub confirm_failures: RefCell<VecDeque<Option<ChainError>>>,
    pub submitted: RefCell<Vec<Payload>>,
    pub balance_fails: Cell<bool>,
    addressless: RefCell<Vec<usize>>,
    confirm_calls: Cell<usize>,
    confirmed: Cell<u64>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the `attempt`-th call to `await_confirmation` (1-based).
    pub fn fail_confirmation_at(self, attempt: usize) -> Self {
        {
            let mut queue = self.confirm_failures.borrow_mut();
            queue.extend(std::iter::repeat_with(|| None).take(attempt - 1));
            queue.push_back(Some(ChainError::Rpc("receipt lookup failed".into())));
        }
        self
    }

    /// The `call`-th `await_confirmation` (1-based) succeeds but reports no
    /// contract address, even for a deployment.
    pub fn drop_address_at(self, call: usize) -> Self {
        self.addressless.borrow_mut().push(call);
        self
    }

    pub fn fail_submissions(self, count: usize) -> Self {
        self.submit_failures.borrow_mut().extend(
            std::iter::repeat_with(|| Some(ChainError::Submission("nonce too low".into())))
                .take(count),
        );
        self
    }

    pub fn submit_count(&self) -> usize {
        self.submitted.borrow().len()
    }
}

impl ChainClient for MockChain {
    async fn submit(&self, payload: &Payload) -> Result<PendingHandle, ChainError> {
        self.submitted.borrow_mut().push(payload.clone());
        if let Some(Some(err)) = self.submit_failures.borrow_mut().pop_front() {
            return Err(err);
        }
        let n = self.submitted.borrow().len();
        Ok(PendingHandle {
            tx_hash: TxHash::with_last_byte(n as u8),
            kind: payload.kind(),
        })
    }

    async fn await_confirmation(&self, handle: PendingHandle) -> Result<Confirmation, ChainError> {
        let call = self.confirm_calls.get() + 1;
        self.confirm_calls.set(call);
        if let Some(Some(err)) = self.confirm_failures.borrow_mut().pop_front() {
            return Err(err);
        }
        let block = self.confirmed.get() + 1;
        self.confirmed.set(block);

        let address = match handle.kind {
            UnitKind::Transfer => None,
            _ if self.addressless.borrow().contains(&call) => None,
            _ => Some(Address::from_word(handle.tx_hash)),
        };
        Ok(Confirmation {
            address,
            tx_hash: handle.tx_hash,
            block_number: block,
            gas_used: GAS_PER_TX,
            timestamp: DateTime::from_timestamp(1_700_000_000 + block as i64, 0).unwrap(),
        })
    }

    async fn balance(&self) -> Result<U256, ChainError> {
        if self.balance_fails.get() {
            return Err(ChainError::Rpc("balance unavailable".into()));
        }
        Ok(U256::from(STARTING_BALANCE - self.confirmed.get() * GAS_PER_TX))
    }
}
