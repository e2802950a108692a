//! Environment orchestration: the reset/step contract consumed by RL loops.
//!
//! The environment owns the account, the trading history and the observation
//! window; the components it drives are pure functions over what it hands
//! them.

pub mod env;
pub mod render;
pub mod step;

pub use env::TradingEnvironment;
pub use render::{render_history, RenderMode};
pub use step::{EnvStatus, StepInfo, StepResult, TerminationReason};
