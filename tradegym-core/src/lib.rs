//! TradeGym Core: a single-asset forex trading environment for RL agents.
//!
//! This crate contains the whole simulator:
//! - Domain types (bars, positions, actions, account, trading history)
//! - Market data loading and validation
//! - Position state machine with commission accounting
//! - Named reward policies over the balance history
//! - Rolling observation window of market and agent features
//! - The reset/step environment contract, plus rendering
//! - Seed hierarchy, reference agents and parallel rollouts

pub mod agent;
pub mod components;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod rng;
pub mod rollout;

pub use config::EnvConfig;
pub use engine::TradingEnvironment;
pub use error::{ConfigError, ContractViolation, EnvError};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the series and environment types can move across
    /// rollout worker threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::MarketBar>();
        require_sync::<domain::MarketBar>();
        require_send::<domain::TradeRecord>();
        require_sync::<domain::TradeRecord>();
        require_send::<domain::TradingHistoryLog>();
        require_sync::<domain::TradingHistoryLog>();
        require_send::<domain::AccountState>();
        require_sync::<domain::AccountState>();

        // Data
        require_send::<data::MarketDataSeries>();
        require_sync::<data::MarketDataSeries>();

        // Components
        require_send::<components::PositionStateMachine>();
        require_sync::<components::PositionStateMachine>();
        require_send::<components::RewardPolicy>();
        require_sync::<components::RewardPolicy>();
        require_send::<components::ObservationBuilder>();
        require_sync::<components::ObservationBuilder>();
        require_send::<components::PriceSampler>();
        require_sync::<components::PriceSampler>();

        // Engine
        require_send::<engine::TradingEnvironment>();
        require_sync::<engine::TradingEnvironment>();
        require_send::<engine::StepResult>();
        require_sync::<engine::StepResult>();
        require_send::<config::EnvConfig>();
        require_sync::<config::EnvConfig>();

        // RNG
        require_send::<rng::SeedHierarchy>();
        require_sync::<rng::SeedHierarchy>();
    }

    /// Policies see observations and diagnostics only, never the environment.
    #[test]
    fn policy_trait_has_no_environment_parameter() {
        fn _check_trait_object_builds(
            policy: &mut dyn agent::Policy,
            observation: &components::Observation,
            info: &engine::StepInfo,
        ) -> domain::Action {
            policy.act(observation, info)
        }
    }
}
