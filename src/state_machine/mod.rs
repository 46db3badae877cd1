mod run;
mod state;
mod unit;

pub use run::{RunReport, RunState};
pub use state::{StateMachine, Transition};
pub use unit::{FailureKind, RetryPolicy, StepOutcome, TransactionOutcome, WorkUnit};
