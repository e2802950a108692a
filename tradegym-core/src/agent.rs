//! Reference policies and a single-episode driver.
//!
//! Training algorithms live outside this crate. These policies exist to
//! exercise the environment: a uniform random agent (the usual smoke-test
//! baseline) and a scripted agent that replays a fixed action sequence.

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::Observation;
use crate::domain::Action;
use crate::engine::{StepInfo, TerminationReason, TradingEnvironment};
use crate::error::EnvError;

/// Anything that picks an action from the latest observation.
pub trait Policy {
    fn act(&mut self, observation: &Observation, info: &StepInfo) -> Action;
}

/// Samples BUY/SELL/HOLD uniformly.
#[derive(Debug, Clone)]
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }
}

impl Policy for RandomAgent {
    fn act(&mut self, _observation: &Observation, _info: &StepInfo) -> Action {
        Action::ALL[self.rng.gen_range(0..Action::COUNT)]
    }
}

/// Replays a fixed action list, then holds.
#[derive(Debug, Clone)]
pub struct ScriptedAgent {
    actions: Vec<Action>,
    cursor: usize,
}

impl ScriptedAgent {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions, cursor: 0 }
    }
}

impl Policy for ScriptedAgent {
    fn act(&mut self, _observation: &Observation, _info: &StepInfo) -> Action {
        let action = self.actions.get(self.cursor).copied().unwrap_or(Action::Hold);
        self.cursor += 1;
        action
    }
}

/// Outcome of one episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub seed: Option<u64>,
    pub steps: usize,
    pub final_balance: f64,
    pub total_returns: f64,
    pub total_rewards: f64,
    /// Number of steps on which the position changed.
    pub position_changes: usize,
    /// `None` when the episode was cut short by `max_steps`.
    pub termination_reason: Option<TerminationReason>,
}

/// Reset `env` and drive it with `policy` until termination or `max_steps`.
pub fn run_episode<P: Policy + ?Sized>(
    env: &mut TradingEnvironment,
    policy: &mut P,
    seed: Option<u64>,
    max_steps: Option<usize>,
) -> Result<EpisodeSummary, EnvError> {
    let (mut observation, mut info) = env.reset(seed);
    let limit = max_steps.unwrap_or(usize::MAX);
    let mut steps = 0;

    while steps < limit {
        let action = policy.act(&observation, &info);
        let result = env.step(action)?;
        steps += 1;
        observation = result.observation;
        info = result.info;
        if result.terminated {
            break;
        }
    }

    let position_changes = env
        .history()
        .records()
        .windows(2)
        .filter(|w| w[0].position != w[1].position)
        .count();

    Ok(EpisodeSummary {
        seed,
        steps,
        final_balance: info.account_balance,
        total_returns: info.total_returns,
        total_rewards: info.total_rewards,
        position_changes,
        termination_reason: info.termination_reason,
    })
}
