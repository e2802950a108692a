//! Reward policies over the trailing balance history.
//!
//! Policies are selected by name at construction. Each one is a pure function
//! of the balance history and only ever looks at the last `window` entries.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const SIMPLE_PROFIT: &str = "simple-profit";
pub const LOG_PROFIT: &str = "log-profit";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum RewardPolicy {
    /// `balance[-1] / balance[-min(len, window)] - 1`
    SimpleProfit { window: usize },
    /// `ln(balance[-1] / balance[-min(len, window)])`
    LogProfit { window: usize },
}

impl RewardPolicy {
    /// Build a policy from its configured name.
    pub fn from_name(name: &str, window: usize) -> Result<Self, ConfigError> {
        if window == 0 {
            return Err(ConfigError::InvalidRewardWindow(window));
        }
        match name {
            SIMPLE_PROFIT => Ok(Self::SimpleProfit { window }),
            LOG_PROFIT => Ok(Self::LogProfit { window }),
            other => Err(ConfigError::UnknownRewardMethod(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SimpleProfit { .. } => SIMPLE_PROFIT,
            Self::LogProfit { .. } => LOG_PROFIT,
        }
    }

    /// Number of trailing balances the policy reads.
    pub fn window(&self) -> usize {
        match *self {
            Self::SimpleProfit { window } | Self::LogProfit { window } => window,
        }
    }

    /// Reward for the latest entry of `balances`. An empty history yields 0.
    pub fn calculate_reward(&self, balances: &[f64]) -> f64 {
        match balances.split_last() {
            Some((&current, prior)) => self.reward_for_step(prior, current),
            None => 0.0,
        }
    }

    /// Reward for appending `current` to `prior` without copying the history.
    ///
    /// Reads only the base balance, so the cost is independent of the window.
    pub fn reward_for_step(&self, prior: &[f64], current: f64) -> f64 {
        let total = prior.len() + 1;
        let lookback = total.min(self.window());
        let base = prior.get(total - lookback).copied().unwrap_or(current);
        match self {
            Self::SimpleProfit { .. } => current / base - 1.0,
            Self::LogProfit { .. } => (current / base).ln(),
        }
    }
}
