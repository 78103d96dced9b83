use std::time::Duration;

use rand::Rng;

use crate::db::enums::{CustomCommandStatus, ProcedureExecutionStatus};

/// A terminal execution outcome together with how long the (simulated)
/// agent took to produce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedExecution {
    pub delay: Duration,
    pub status: ProcedureExecutionStatus,
}

/// The execution backend behind procedure runs and custom commands. The
/// production implementation simulates agents; tests plug in a
/// deterministic one. Nothing else in the codebase decides outcomes.
pub trait ExecutionRunner: Send + Sync {
    /// Picks the terminal status of a freshly created execution and the
    /// delay before it lands.
    fn resolve_execution(&self) -> ResolvedExecution;

    /// Picks the terminal status of a dispatched custom command when its
    /// history is fetched.
    fn settle_command(&self) -> CustomCommandStatus;
}

const MIN_DELAY_MS: u64 = 1_500;
const MAX_DELAY_MS: u64 = 4_000;
const SUCCESS_RATE: f64 = 0.7;

/// Coin-flip agent: 70% success after 1.5-4 s.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedRunner;

impl ExecutionRunner for SimulatedRunner {
    fn resolve_execution(&self) -> ResolvedExecution {
        let mut rng = rand::rng();
        let status = if rng.random_bool(SUCCESS_RATE) {
            ProcedureExecutionStatus::Success
        } else {
            ProcedureExecutionStatus::Failed
        };
        ResolvedExecution {
            delay: Duration::from_millis(rng.random_range(MIN_DELAY_MS..=MAX_DELAY_MS)),
            status,
        }
    }

    fn settle_command(&self) -> CustomCommandStatus {
        if rand::rng().random_bool(SUCCESS_RATE) {
            CustomCommandStatus::Success
        } else {
            CustomCommandStatus::Failed
        }
    }
}

/// Deterministic runner for tests: fixed outcome, fixed (short) delay.
#[derive(Debug, Clone, Copy)]
pub struct FixedRunner {
    pub delay: Duration,
    pub execution_status: ProcedureExecutionStatus,
    pub command_status: CustomCommandStatus,
}

impl FixedRunner {
    pub fn succeeding() -> Self {
        Self {
            delay: Duration::from_millis(10),
            execution_status: ProcedureExecutionStatus::Success,
            command_status: CustomCommandStatus::Success,
        }
    }

    pub fn failing() -> Self {
        Self {
            delay: Duration::from_millis(10),
            execution_status: ProcedureExecutionStatus::Failed,
            command_status: CustomCommandStatus::Failed,
        }
    }
}

impl ExecutionRunner for FixedRunner {
    fn resolve_execution(&self) -> ResolvedExecution {
        ResolvedExecution {
            delay: self.delay,
            status: self.execution_status,
        }
    }

    fn settle_command(&self) -> CustomCommandStatus {
        self.command_status
    }
}
