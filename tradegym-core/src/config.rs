//! Serializable environment configuration.
//!
//! Every field has a default so a TOML file only needs to name what it
//! changes. Validation runs once, when the environment is built.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::components::{PriceSamplingPolicy, RewardPolicy};
use crate::error::ConfigError;

pub const DEFAULT_COMMISSION: f64 = 0.001;
pub const DEFAULT_NORMALIZATION: f64 = 999_999.0;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvConfig {
    /// CSV file to load when no pre-loaded series is supplied.
    pub data_path: Option<PathBuf>,

    pub initial_account_balance: f64,

    /// Number of past bars in each observation besides the current one.
    pub window_size: usize,

    /// Fraction of balance charged when a position is opened or closed.
    pub trade_commission: f64,

    pub reward_window: usize,

    pub reward_method: String,

    /// Replace the reward with `unavailable_action_penalization_reward` when
    /// the agent re-enters the position it already holds.
    pub penalize_redundant_action: bool,

    pub unavailable_action_penalization_reward: f64,

    /// Static divisor for prices, volume and balance in observations.
    pub normalization_factor: f64,

    /// Add a volume column when the data has one.
    pub include_volume: bool,

    pub price_sampling: PriceSamplingPolicy,

    /// Master seed for price sampling when `reset` is called without a seed.
    pub seed: u64,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            initial_account_balance: 10_000.0,
            window_size: 50,
            trade_commission: DEFAULT_COMMISSION,
            reward_window: 24,
            reward_method: "simple-profit".into(),
            penalize_redundant_action: true,
            unavailable_action_penalization_reward: -1.0,
            normalization_factor: DEFAULT_NORMALIZATION,
            include_volume: true,
            price_sampling: PriceSamplingPolicy::Midpoint,
            seed: DEFAULT_SEED,
        }
    }
}

impl EnvConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Check scalar ranges and resolve the reward policy. Data-dependent checks
    /// (enough bars for the window) happen when the series is attached.
    pub fn validate(&self) -> Result<RewardPolicy, ConfigError> {
        if !(self.initial_account_balance > 0.0 && self.initial_account_balance.is_finite()) {
            return Err(ConfigError::NonPositiveBalance(self.initial_account_balance));
        }
        if !(0.0..1.0).contains(&self.trade_commission) {
            return Err(ConfigError::CommissionOutOfRange(self.trade_commission));
        }
        if !(self.normalization_factor > 0.0 && self.normalization_factor.is_finite()) {
            return Err(ConfigError::NonPositiveNormalization(self.normalization_factor));
        }
        RewardPolicy::from_name(&self.reward_method, self.reward_window)
    }

    /// Minimum number of bars: the initial window plus at least one step.
    pub fn required_bars(&self) -> usize {
        self.window_size + 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = EnvConfig::default();
        let policy = cfg.validate().unwrap();
        assert_eq!(policy, RewardPolicy::SimpleProfit { window: 24 });
        assert_eq!(cfg.trade_commission, 0.001);
        assert_eq!(cfg.required_bars(), 52);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg = EnvConfig::from_toml_str(
            r#"
            data_path = "data/eurusd_1h.csv"
            window_size = 10
            reward_window = 5
            price_sampling = "close"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.window_size, 10);
        assert_eq!(cfg.reward_window, 5);
        assert_eq!(cfg.price_sampling, PriceSamplingPolicy::Close);
        assert_eq!(cfg.initial_account_balance, 10_000.0);
        assert_eq!(cfg.data_path.as_deref(), Some(Path::new("data/eurusd_1h.csv")));
    }

    #[test]
    fn unknown_key_is_a_parse_error() {
        let err = EnvConfig::from_toml_str("windw_size = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_non_positive_balance() {
        let cfg = EnvConfig {
            initial_account_balance: 0.0,
            ..EnvConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::NonPositiveBalance(_))));
    }

    #[test]
    fn rejects_commission_out_of_range() {
        for c in [-0.1, 1.0, 1.5] {
            let cfg = EnvConfig {
                trade_commission: c,
                ..EnvConfig::default()
            };
            assert!(matches!(cfg.validate(), Err(ConfigError::CommissionOutOfRange(_))));
        }
    }

    #[test]
    fn rejects_bad_normalization() {
        let cfg = EnvConfig {
            normalization_factor: 0.0,
            ..EnvConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NonPositiveNormalization(_))
        ));
    }

    #[test]
    fn rejects_unknown_reward_method() {
        let cfg = EnvConfig {
            reward_method: "sortino".into(),
            ..EnvConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::UnknownRewardMethod(_))));
    }

    #[test]
    fn rejects_zero_reward_window() {
        let cfg = EnvConfig {
            reward_window: 0,
            ..EnvConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidRewardWindow(0))));
    }
}
