use std::fmt;

use serde::{Deserialize, Serialize};

use super::unit::{FailureKind, StepOutcome, UnitStatus, WorkUnit};

/// The states of a work unit.
///
/// Each unit flows through: PENDING → SUBMITTED → CONFIRMED, and falls back
/// to PENDING whenever an attempt fails and a retry is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    Pending,
    Submitted,
    Confirmed,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Pending => write!(f, "PENDING"),
            State::Submitted => write!(f, "SUBMITTED"),
            State::Confirmed => write!(f, "CONFIRMED"),
        }
    }
}

/// The result of evaluating a state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Advance to the next state.
    Next(State),
    /// Go back to `Pending` and try again after the cooldown.
    Retry { from: State, reason: FailureKind },
    /// The unit is done: confirmed, or abandoned once retries ran out.
    Complete(StepOutcome),
}

/// Drives a `WorkUnit` through the state machine.
pub struct StateMachine;

impl StateMachine {
    /// Compute and apply the next transition for `unit` given the outcome of
    /// the step it just ran.
    ///
    /// - `Pending` + success (node accepted the transaction) → `Submitted`.
    /// - `Submitted` + success (receipt observed) → `Confirmed`.
    /// - Any failure retries from `Pending` while the policy allows it,
    ///   otherwise completes with the failure.
    /// - `Confirmed` is terminal.
    pub fn next(unit: &mut WorkUnit, outcome: StepOutcome) -> Transition {
        let transition = match unit.state {
            State::Pending => match &outcome {
                StepOutcome::Success => Transition::Next(State::Submitted),
                StepOutcome::Failure(kind) => Self::handle_failure(unit, kind.clone()),
            },
            State::Submitted => match &outcome {
                StepOutcome::Success => Transition::Next(State::Confirmed),
                StepOutcome::Failure(kind) => Self::handle_failure(unit, kind.clone()),
            },
            State::Confirmed => Transition::Complete(StepOutcome::Success),
        };

        match &transition {
            Transition::Next(next_state) => {
                unit.state_history.push(unit.state);
                unit.state = *next_state;
                unit.status = match next_state {
                    State::Confirmed => UnitStatus::Completed,
                    _ => UnitStatus::InProgress,
                };
            }
            Transition::Retry { from, .. } => {
                // retry_count was already incremented in handle_failure.
                unit.state_history.push(*from);
                unit.state = State::Pending;
                unit.status = UnitStatus::Pending;
            }
            Transition::Complete(outcome) => {
                if unit.state != State::Confirmed {
                    unit.state_history.push(unit.state);
                }
                unit.status = match outcome {
                    StepOutcome::Success => UnitStatus::Completed,
                    StepOutcome::Failure(_) => UnitStatus::Abandoned,
                };
            }
        }

        transition
    }

    fn handle_failure(unit: &mut WorkUnit, kind: FailureKind) -> Transition {
        unit.retry_count += 1;
        if unit.retry_policy.allows(unit.retry_count) {
            Transition::Retry {
                from: unit.state,
                reason: kind,
            }
        } else {
            Transition::Complete(StepOutcome::Failure(kind))
        }
    }
}
