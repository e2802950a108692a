//! Environment components composed by the orchestrator.
//!
//! - Transition: position/action state machine and balance accounting
//! - Reward: named policies over the balance history
//! - Observation: rolling window of market and agent features
//! - Pricing: seedable trade-price sampling inside a bar

pub mod observation;
pub mod pricing;
pub mod reward;
pub mod transition;

pub use observation::{
    ActionSpace, AgentState, Observation, ObservationBuilder, ObservationSpace, AGENT_FEATURES,
};
pub use pricing::{PriceSampler, PriceSamplingPolicy};
pub use reward::RewardPolicy;
pub use transition::{PositionStateMachine, PriorState, Transition};
