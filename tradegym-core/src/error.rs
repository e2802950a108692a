//! Error taxonomy for environment construction and use.
//!
//! - [`ConfigError`]: rejected at construction, never at step time.
//! - [`ContractViolation`]: caller bug (stepping outside an episode, bad
//!   action index). Not retried.
//!
//! Running out of market data is not an error; it surfaces as
//! `TerminationReason::DataExhausted` on the final step.

use thiserror::Error;

use crate::data::DataError;
use crate::engine::TerminationReason;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("initial_account_balance must be > 0 (got {0})")]
    NonPositiveBalance(f64),

    #[error("trade_commission must be in [0, 1) (got {0})")]
    CommissionOutOfRange(f64),

    #[error("reward_window must be >= 1 (got {0})")]
    InvalidRewardWindow(usize),

    #[error("unknown reward method: {0}")]
    UnknownRewardMethod(String),

    #[error("normalization_factor must be > 0 (got {0})")]
    NonPositiveNormalization(f64),

    #[error("window_size {window_size} needs at least {required} bars, data has {available}")]
    InsufficientData {
        window_size: usize,
        required: usize,
        available: usize,
    },

    #[error("no data_path configured and no series supplied")]
    MissingDataSource,

    #[error("unknown render mode: {0}")]
    UnknownRenderMode(String),

    #[error("invalid config file: {0}")]
    Parse(String),

    #[error(transparent)]
    Data(#[from] DataError),
}

#[derive(Debug, Error, PartialEq)]
pub enum ContractViolation {
    #[error("step() called before reset()")]
    StepBeforeReset,

    #[error("step() called after the episode terminated ({0}); call reset() first")]
    StepAfterTermination(TerminationReason),

    #[error("action index {0} is outside the discrete action space {{0, 1, 2}}")]
    InvalidAction(usize),
}

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("contract violation: {0}")]
    Contract(#[from] ContractViolation),
}
