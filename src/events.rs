//! Lifecycle events emitted by the transaction driver.
//!
//! Presentation is kept out of the driver: anything that wants to show or
//! record progress implements [`EventSink`] and receives every event in
//! order.

use alloy::primitives::{Address, TxHash, U256};
use crate::chain::{Confirmation, UnitKind};
use crate::state_machine::FailureKind;

/// Why the driver is pausing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitReason {
    /// Randomized pause between confirmed units.
    Pacing,
    /// Fixed pause after a failed attempt.
    Cooldown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverEvent {
    Started {
        kind: UnitKind,
        total: u32,
    },
    Attempt {
        kind: UnitKind,
        index: u32,
        total: u32,
        attempt: u32,
        label: String,
    },
    Submitted {
        index: u32,
        tx_hash: TxHash,
    },
    Confirmed {
        kind: UnitKind,
        index: u32,
        total: u32,
        /// Set for transfers.
        recipient: Option<Address>,
        confirmation: Confirmation,
    },
    Balance {
        balance: U256,
    },
    Failed {
        kind: UnitKind,
        index: u32,
        total: u32,
        attempt: u32,
        reason: FailureKind,
    },
    Waiting {
        reason: WaitReason,
        delay_ms: u64,
    },
    TokenDeployed {
        address: Address,
        symbol: String,
        decimals: u8,
        amount_per_recipient: U256,
        recipients: u32,
    },
    Finished {
        total_gas_used: u128,
        initial_balance: Option<U256>,
        final_balance: Option<U256>,
    },
}

/// Subscriber to the driver's event stream.
pub trait EventSink {
    fn emit(&mut self, event: &DriverEvent);
}

/// Collects events in memory.
impl EventSink for Vec<DriverEvent> {
    fn emit(&mut self, event: &DriverEvent) {
        self.push(event.clone());
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: &DriverEvent) {
        (**self).emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit_started<S: EventSink>(mut sink: S) {
        sink.emit(&DriverEvent::Started {
            kind: UnitKind::Transfer,
            total: 2,
        });
    }

    #[test]
    fn vec_sink_records_in_order() {
        let mut events: Vec<DriverEvent> = Vec::new();
        emit_started(&mut events);
        events.emit(&DriverEvent::Waiting {
            reason: WaitReason::Pacing,
            delay_ms: 1000,
        });

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], DriverEvent::Started { total: 2, .. }));
        assert!(matches!(
            events[1],
            DriverEvent::Waiting {
                reason: WaitReason::Pacing,
                ..
            }
        ));
    }
}
