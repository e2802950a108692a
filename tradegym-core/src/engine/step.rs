//! Lifecycle states and step result types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::components::Observation;
use crate::domain::{Action, Position};

/// Why an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerminationReason {
    BalanceDepleted,
    DataExhausted,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BalanceDepleted => f.write_str("BALANCE_DEPLETED"),
            Self::DataExhausted => f.write_str("DATA_EXHAUSTED"),
        }
    }
}

/// Lifecycle of an environment instance.
///
/// ```md
/// Current State   | Call    | Next State  | Notes
/// ----------------|---------|-------------|---------------------------------
/// AwaitingReset   | reset() | Running     |
/// Running         | step()  | Running     | balance > 0 and data remains
/// Running         | step()  | Terminated  | balance <= 0 or last bar reached
/// Terminated      | reset() | Running     | new episode
/// AwaitingReset / Terminated | step() | (unchanged) | contract violation
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvStatus {
    AwaitingReset,
    Running,
    Terminated(TerminationReason),
}

impl EnvStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, Self::Terminated(_))
    }
}

/// Diagnostics returned with every reset and step. Informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    pub account_balance: f64,
    /// `balance / initial_balance - 1`.
    pub total_returns: f64,
    pub total_rewards: f64,
    pub position: Position,
    pub action: Action,
    pub entry_price: Option<f64>,
    pub step: usize,
    pub termination_reason: Option<TerminationReason>,
}

impl StepInfo {
    pub fn position_name(&self) -> &'static str {
        self.position.name()
    }

    pub fn action_name(&self) -> &'static str {
        self.action.name()
    }
}

/// Result of a single environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f64,
    pub terminated: bool,
    /// Always false: episodes end only by termination.
    pub truncated: bool,
    pub info: StepInfo,
}
