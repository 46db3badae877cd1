use std::time::Duration;

use chrono::Utc;
use tokio::time::sleep;

use crate::chain::{ChainClient, ChainError, Confirmation, Payload, UnitKind};
use crate::delay::DelayPolicy;
use crate::error::FarmError;
use crate::events::{DriverEvent, EventSink, WaitReason};
use crate::state_machine::{
    FailureKind, RetryPolicy, RunReport, RunState, StateMachine, StepOutcome, TransactionOutcome,
    Transition, WorkUnit,
};

/// Drives work units to confirmation one at a time.
///
/// There is never more than one transaction in flight. A failed attempt is
/// reported, followed by the cooldown, and the same unit is tried again; the
/// sequence only advances once the current unit is confirmed.
pub struct TransactionDriver<C, S> {
    client: C,
    sink: S,
    retry_policy: RetryPolicy,
    state: RunState,
}

impl<C: ChainClient, S: EventSink> TransactionDriver<C, S> {
    pub fn new(client: C, sink: S, retry_policy: RetryPolicy) -> Self {
        Self {
            client,
            sink,
            retry_policy,
            state: RunState::new(),
        }
    }

    #[cfg(test)]
    pub fn client(&self) -> &C {
        &self.client
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Create a unit that follows this driver's retry policy.
    pub fn unit(&self, index: u32, payload: Payload) -> WorkUnit {
        WorkUnit::new(index, payload, self.retry_policy.clone())
    }

    /// Record the starting balance. A failed lookup leaves it unknown.
    pub async fn begin(&mut self) {
        self.refresh_balance().await;
    }

    /// Add `total` units of `kind` to the plan and tell subscribers.
    pub fn announce(&mut self, kind: UnitKind, total: u32) {
        self.state.plan(total);
        self.sink.emit(&DriverEvent::Started { kind, total });
    }

    /// Confirm `total` units built by `factory`, in order.
    ///
    /// `factory` receives the 1-based index. Between confirmed units the
    /// driver sleeps for a sample of `pacing`; there is no pause after the
    /// last one.
    pub async fn run_sequence<F>(
        &mut self,
        kind: UnitKind,
        total: u32,
        pacing: &DelayPolicy,
        mut factory: F,
    ) -> Result<Vec<Confirmation>, FarmError>
    where
        F: FnMut(u32) -> Payload,
    {
        self.announce(kind, total);

        let mut confirmations = Vec::with_capacity(total as usize);
        for index in 1..=total {
            let mut unit = self.unit(index, factory(index));
            let confirmation = self.drive_unit(&mut unit, total).await?;
            confirmations.push(confirmation);

            if index < total {
                self.pause(WaitReason::Pacing, pacing).await;
            }
        }

        Ok(confirmations)
    }

    /// Retry `unit` until it is confirmed or its retry policy gives up.
    pub async fn drive_unit(
        &mut self,
        unit: &mut WorkUnit,
        total: u32,
    ) -> Result<Confirmation, FarmError> {
        self.drive_unit_with(unit, total, |confirmation| Ok(confirmation.clone())).await
    }

    /// Like [`drive_unit`](Self::drive_unit), but a confirmation only counts
    /// once `accept` extracts a value from it. A rejected confirmation is a
    /// failed attempt and goes through the same cooldown and retry.
    pub async fn drive_unit_with<T, F>(
        &mut self,
        unit: &mut WorkUnit,
        total: u32,
        accept: F,
    ) -> Result<T, FarmError>
    where
        F: Fn(&Confirmation) -> Result<T, ChainError>,
    {
        let kind = unit.payload.kind();
        let cooldown = DelayPolicy::fixed(unit.retry_policy.cooldown_ms);

        loop {
            let attempt = unit.attempt();
            self.sink.emit(&DriverEvent::Attempt {
                kind,
                index: unit.index,
                total,
                attempt,
                label: unit.payload.label(),
            });

            match self.attempt(unit, &accept).await {
                TransactionOutcome::Confirmed((confirmation, value)) => {
                    self.state.record_confirmed(&confirmation);
                    tracing::debug!(
                        %kind,
                        index = unit.index,
                        attempt,
                        status = ?unit.status,
                        transitions = unit.state_history.len(),
                        elapsed_ms = (Utc::now() - unit.created_at).num_milliseconds(),
                        tx_hash = %confirmation.tx_hash,
                        block = confirmation.block_number,
                        gas_used = confirmation.gas_used,
                        "unit confirmed"
                    );
                    self.sink.emit(&DriverEvent::Confirmed {
                        kind,
                        index: unit.index,
                        total,
                        recipient: unit.payload.recipient(),
                        confirmation,
                    });
                    self.refresh_balance().await;
                    return Ok(value);
                }
                TransactionOutcome::Failed { reason } => {
                    self.state.record_failure();
                    tracing::warn!(%kind, index = unit.index, attempt, %reason, "attempt failed");
                    self.sink.emit(&DriverEvent::Failed {
                        kind,
                        index: unit.index,
                        total,
                        attempt,
                        reason: reason.clone(),
                    });

                    match StateMachine::next(unit, StepOutcome::Failure(reason)) {
                        Transition::Retry { reason, .. } => {
                            tracing::debug!(index = unit.index, %reason, "retrying after cooldown");
                            self.pause(WaitReason::Cooldown, &cooldown).await;
                        }
                        Transition::Complete(StepOutcome::Failure(reason)) => {
                            return Err(FarmError::RetriesExhausted {
                                kind,
                                index: unit.index,
                                attempts: attempt,
                                reason,
                            });
                        }
                        Transition::Next(_) | Transition::Complete(StepOutcome::Success) => {
                            unreachable!("a failed attempt cannot advance a unit")
                        }
                    }
                }
            }
        }
    }

    // One submit + confirm round trip. A receipt `accept` rejects leaves the
    // unit in SUBMITTED so the failure retries it like any other.
    async fn attempt<T, F>(
        &mut self,
        unit: &mut WorkUnit,
        accept: &F,
    ) -> TransactionOutcome<(Confirmation, T)>
    where
        F: Fn(&Confirmation) -> Result<T, ChainError>,
    {
        let handle = match self.client.submit(&unit.payload).await {
            Ok(handle) => handle,
            Err(err) => {
                return TransactionOutcome::Failed {
                    reason: FailureKind::from(&err),
                };
            }
        };
        StateMachine::next(unit, StepOutcome::Success);
        self.sink.emit(&DriverEvent::Submitted {
            index: unit.index,
            tx_hash: handle.tx_hash,
        });

        let accepted = self
            .client
            .await_confirmation(handle)
            .await
            .and_then(|confirmation| accept(&confirmation).map(|value| (confirmation, value)));
        match accepted {
            Ok(confirmed) => {
                StateMachine::next(unit, StepOutcome::Success);
                TransactionOutcome::Confirmed(confirmed)
            }
            Err(err) => TransactionOutcome::Failed {
                reason: FailureKind::from(&err),
            },
        }
    }

    /// Sleep for one sample of `policy`.
    pub async fn pause(&mut self, reason: WaitReason, policy: &DelayPolicy) {
        let delay_ms = policy.sample();
        self.sink.emit(&DriverEvent::Waiting { reason, delay_ms });
        if delay_ms > 0 {
            sleep(Duration::from_millis(delay_ms)).await;
        }
    }

    pub fn emit(&mut self, event: DriverEvent) {
        self.sink.emit(&event);
    }

    // Balance lookups never fail a unit: the transaction is already confirmed.
    async fn refresh_balance(&mut self) {
        match self.client.balance().await {
            Ok(balance) => {
                self.state.record_balance(balance);
                self.sink.emit(&DriverEvent::Balance { balance });
            }
            Err(err) => tracing::warn!(error = %err, "could not read balance"),
        }
    }

    /// Emit the final totals and produce the run report.
    pub fn finish(&mut self) -> RunReport {
        let report = RunReport::from_state(&self.state);
        self.sink.emit(&DriverEvent::Finished {
            total_gas_used: report.total_gas_used,
            initial_balance: report.initial_balance,
            final_balance: report.final_balance,
        });
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::mock::{GAS_PER_TX, MockChain, STARTING_BALANCE};
    use alloy::primitives::{Bytes, U256};

    fn no_cooldown(max_retries: Option<u32>) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            cooldown_ms: 0,
        }
    }

    fn driver(chain: MockChain) -> TransactionDriver<MockChain, Vec<DriverEvent>> {
        TransactionDriver::new(chain, Vec::new(), no_cooldown(None))
    }

    fn deploy(_: u32) -> Payload {
        Payload::Deploy {
            bytecode: Bytes::new(),
        }
    }

    /// ("C", index) for confirmations and ("F", index) for failures, in order.
    fn outcomes(events: &[DriverEvent]) -> Vec<(&'static str, u32)> {
        events
            .iter()
            .filter_map(|e| match e {
                DriverEvent::Confirmed { index, .. } => Some(("C", *index)),
                DriverEvent::Failed { index, .. } => Some(("F", *index)),
                _ => None,
            })
            .collect()
    }

    fn waits(events: &[DriverEvent], wanted: WaitReason) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, DriverEvent::Waiting { reason, .. } if *reason == wanted))
            .count()
    }

    #[tokio::test]
    async fn succeeding_chain_confirms_every_ordinal_in_order() {
        for n in 1..=6u32 {
            let mut driver = driver(MockChain::new());
            let confirmations = driver
                .run_sequence(UnitKind::ContractDeploy, n, &DelayPolicy::fixed(0), deploy)
                .await
                .unwrap();

            assert_eq!(confirmations.len(), n as usize);
            let expected: Vec<_> = (1..=n).map(|i| ("C", i)).collect();
            assert_eq!(outcomes(driver.sink()), expected);
            assert_eq!(driver.state().completed, n);
            assert_eq!(driver.state().planned, n);
        }
    }

    #[tokio::test]
    async fn single_confirmation_failure_retries_same_ordinal() {
        let mut driver = driver(MockChain::new().fail_confirmation_at(3));
        let confirmations = driver
            .run_sequence(UnitKind::ContractDeploy, 5, &DelayPolicy::fixed(0), deploy)
            .await
            .unwrap();

        assert_eq!(confirmations.len(), 5);
        assert_eq!(
            outcomes(driver.sink()),
            vec![("C", 1), ("C", 2), ("F", 3), ("C", 3), ("C", 4), ("C", 5)]
        );
        assert_eq!(driver.client().submit_count(), 6);
        assert_eq!(driver.state().failed_attempts, 1);
    }

    #[tokio::test]
    async fn failed_event_carries_attempt_and_reason() {
        let mut driver = driver(MockChain::new().fail_submissions(2));
        driver
            .run_sequence(UnitKind::ContractDeploy, 1, &DelayPolicy::fixed(0), deploy)
            .await
            .unwrap();

        let failures: Vec<_> = driver
            .sink()
            .iter()
            .filter_map(|e| match e {
                DriverEvent::Failed { attempt, reason, .. } => Some((*attempt, reason.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].0, 1);
        assert_eq!(failures[1].0, 2);
        assert!(matches!(failures[0].1, FailureKind::Submission(_)));
        assert_eq!(waits(driver.sink(), WaitReason::Cooldown), 2);
    }

    #[tokio::test]
    async fn pacing_happens_between_units_only() {
        let mut driver = driver(MockChain::new());
        driver
            .run_sequence(UnitKind::Transfer, 4, &DelayPolicy::fixed(0), deploy)
            .await
            .unwrap();

        assert_eq!(waits(driver.sink(), WaitReason::Pacing), 3);
        assert_eq!(waits(driver.sink(), WaitReason::Cooldown), 0);
        assert!(matches!(
            driver.sink().last(),
            Some(DriverEvent::Balance { .. })
        ));
    }

    #[tokio::test]
    async fn factory_receives_each_ordinal_once() {
        let mut driver = driver(MockChain::new().fail_confirmation_at(2));
        let mut seen = Vec::new();
        driver
            .run_sequence(UnitKind::ContractDeploy, 3, &DelayPolicy::fixed(0), |i| {
                seen.push(i);
                deploy(i)
            })
            .await
            .unwrap();

        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn capped_retries_give_up() {
        let chain = MockChain::new().fail_submissions(10);
        let mut driver = TransactionDriver::new(chain, Vec::new(), no_cooldown(Some(2)));
        let err = driver
            .run_sequence(UnitKind::ContractDeploy, 2, &DelayPolicy::fixed(0), deploy)
            .await
            .unwrap_err();

        match err {
            FarmError::RetriesExhausted { index, attempts, .. } => {
                assert_eq!(index, 1);
                assert_eq!(attempts, 3);
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
        assert_eq!(driver.client().submit_count(), 3);
        assert_eq!(driver.state().completed, 0);
    }

    #[tokio::test]
    async fn report_tracks_gas_and_balances() {
        let mut driver = driver(MockChain::new());
        driver.begin().await;
        driver
            .run_sequence(UnitKind::ContractDeploy, 3, &DelayPolicy::fixed(0), deploy)
            .await
            .unwrap();
        let report = driver.finish();

        assert_eq!(report.total_gas_used, u128::from(3 * GAS_PER_TX));
        assert_eq!(report.initial_balance, Some(U256::from(STARTING_BALANCE)));
        assert_eq!(
            report.final_balance,
            Some(U256::from(STARTING_BALANCE - 3 * GAS_PER_TX))
        );
        assert_eq!(report.balance_spent(), Some(U256::from(3 * GAS_PER_TX)));

        let balances = driver
            .sink()
            .iter()
            .filter(|e| matches!(e, DriverEvent::Balance { .. }))
            .count();
        assert_eq!(balances, 4);
        let expected_gas = u128::from(3 * GAS_PER_TX);
        assert!(matches!(
            driver.sink().last(),
            Some(DriverEvent::Finished { total_gas_used, .. }) if *total_gas_used == expected_gas
        ));
    }

    #[tokio::test]
    async fn balance_failure_does_not_resubmit() {
        let chain = MockChain::new();
        chain.balance_fails.set(true);
        let mut driver = driver(chain);
        driver.begin().await;
        driver
            .run_sequence(UnitKind::ContractDeploy, 2, &DelayPolicy::fixed(0), deploy)
            .await
            .unwrap();

        assert_eq!(driver.client().submit_count(), 2);
        assert!(outcomes(driver.sink()).iter().all(|(tag, _)| *tag == "C"));
        assert_eq!(driver.finish().initial_balance, None);
    }

    #[tokio::test]
    async fn submitted_precedes_confirmed() {
        let mut driver = driver(MockChain::new());
        driver
            .run_sequence(UnitKind::ContractDeploy, 1, &DelayPolicy::fixed(0), deploy)
            .await
            .unwrap();

        let events = driver.sink();
        assert!(matches!(events[0], DriverEvent::Started { total: 1, .. }));
        assert!(matches!(events[1], DriverEvent::Attempt { index: 1, attempt: 1, .. }));
        assert!(matches!(events[2], DriverEvent::Submitted { index: 1, .. }));
        assert!(matches!(events[3], DriverEvent::Confirmed { index: 1, .. }));
    }
}
