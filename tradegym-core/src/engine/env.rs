//! Trading environment: the reset/step state machine.
//!
//! Each `step` runs, in order:
//!
//! 1. Validate the action (typed, or decoded from a discrete index)
//! 2. Apply the position state machine at the sampled price of the current bar
//! 3. Compute the reward over the balance history plus the new balance
//! 4. Append the record to the trading history
//! 5. Roll the observation window
//! 6. Advance the step index
//! 7. Evaluate termination (balance depletion first, then data exhaustion)

use std::sync::Arc;

use tracing::{debug, info};

use crate::components::{
    ActionSpace, AgentState, Observation, ObservationBuilder, ObservationSpace,
    PositionStateMachine, PriceSampler, PriorState, RewardPolicy,
};
use crate::config::EnvConfig;
use crate::data::{load_csv, MarketDataSeries};
use crate::domain::{AccountState, Action, Position, TradeRecord, TradingHistoryLog};
use crate::error::{ConfigError, ContractViolation, EnvError};
use crate::rng::{SeedHierarchy, PRICE_STREAM};

use super::render::{render_history, RenderMode};
use super::step::{EnvStatus, StepInfo, StepResult, TerminationReason};

pub struct TradingEnvironment {
    config: EnvConfig,
    series: Arc<MarketDataSeries>,
    state_machine: PositionStateMachine,
    reward_policy: RewardPolicy,
    observations: ObservationBuilder,
    observation_space: ObservationSpace,
    sampler: PriceSampler,
    seeds: SeedHierarchy,
    /// Episodes started since the last explicit seed.
    episode: u64,
    status: EnvStatus,
    account: AccountState,
    history: TradingHistoryLog,
    current_step: usize,
    total_rewards: f64,
}

impl TradingEnvironment {
    /// Build an environment over a pre-loaded series.
    ///
    /// The series may be shared read-only between any number of environments.
    pub fn new(config: EnvConfig, series: Arc<MarketDataSeries>) -> Result<Self, ConfigError> {
        let reward_policy = config.validate()?;

        let required = config.required_bars();
        if series.len() < required {
            return Err(ConfigError::InsufficientData {
                window_size: config.window_size,
                required,
                available: series.len(),
            });
        }

        let include_volume = config.include_volume && series.has_volume();
        let observations = ObservationBuilder::new(
            config.window_size,
            include_volume,
            config.normalization_factor,
        );
        let observation_space = observations.observation_space(&series);
        let seeds = SeedHierarchy::new(config.seed);
        let sampler = PriceSampler::new(config.price_sampling, seeds.rng_for(PRICE_STREAM, 0));
        let account = AccountState::new(config.initial_account_balance);
        let history = TradingHistoryLog::new(initial_record(&config, &series));

        Ok(Self {
            state_machine: PositionStateMachine::new(config.trade_commission),
            reward_policy,
            observations,
            observation_space,
            sampler,
            seeds,
            episode: 0,
            status: EnvStatus::AwaitingReset,
            account,
            history,
            current_step: config.window_size,
            total_rewards: 0.0,
            series,
            config,
        })
    }

    /// Build an environment, loading the CSV named by `config.data_path`.
    pub fn from_config(config: EnvConfig) -> Result<Self, ConfigError> {
        let path = config
            .data_path
            .clone()
            .ok_or(ConfigError::MissingDataSource)?;
        let series = load_csv(&path)?;
        Self::new(config, Arc::new(series))
    }

    /// Start a new episode.
    ///
    /// An explicit `seed` replaces the master seed and restarts the episode
    /// counter, so two fresh environments reset with the same seed replay
    /// identically. Without a seed each reset draws the next episode's
    /// sub-seed from the current master seed.
    pub fn reset(&mut self, seed: Option<u64>) -> (Observation, StepInfo) {
        if let Some(seed) = seed {
            self.seeds = SeedHierarchy::new(seed);
            self.episode = 0;
        }
        self.sampler
            .reseed(self.seeds.rng_for(PRICE_STREAM, self.episode));
        self.episode += 1;

        self.account = AccountState::new(self.config.initial_account_balance);
        self.current_step = self.config.window_size;
        self.total_rewards = 0.0;
        self.history = TradingHistoryLog::new(initial_record(&self.config, &self.series));
        self.observations.reset(AgentState {
            position: Position::Flat,
            action: Action::Hold,
            balance: self.account.balance,
        });
        self.status = EnvStatus::Running;

        info!(
            seed = self.seeds.master_seed(),
            episode = self.episode,
            start_step = self.current_step,
            bars = self.series.len(),
            "episode reset"
        );

        let observation = self.observations.build(&self.series, self.current_step);
        (observation, self.info(None))
    }

    /// Advance one bar with `action`.
    pub fn step(&mut self, action: Action) -> Result<StepResult, EnvError> {
        match self.status {
            EnvStatus::Running => {}
            EnvStatus::AwaitingReset => return Err(ContractViolation::StepBeforeReset.into()),
            EnvStatus::Terminated(reason) => {
                return Err(ContractViolation::StepAfterTermination(reason).into())
            }
        }

        let price = self.sampler.sample(self.series.bar(self.current_step));
        let last = self.history.last();
        let prior = PriorState {
            balance: last.balance,
            position: last.position,
            entry_price: self.account.entry_price,
            reference_price: (!self.history.is_pre_trade()).then_some(last.price),
        };
        let transition = self.state_machine.apply(&prior, price, action);

        let reward = if self.config.penalize_redundant_action
            && transition.was_redundant_entry(prior.position)
        {
            self.config.unavailable_action_penalization_reward
        } else {
            self.reward_policy
                .reward_for_step(self.history.balances(), transition.balance)
        };
        self.total_rewards += reward;

        self.account.balance = transition.balance;
        self.account.entry_price = transition.entry_price;
        self.account.accumulated_returns =
            transition.balance / self.config.initial_account_balance - 1.0;

        self.history.append(TradeRecord {
            balance: transition.balance,
            position: transition.position,
            action: transition.action,
            price: transition.trade_price,
            step_index: self.current_step,
            cumulative_reward: self.total_rewards,
        });

        self.observations.push(AgentState {
            position: transition.position,
            action: transition.action,
            balance: transition.balance,
        });
        let observation = self.observations.build(&self.series, self.current_step);

        self.current_step += 1;

        let termination = if self.account.is_depleted() {
            Some(TerminationReason::BalanceDepleted)
        } else if self.current_step >= self.series.last_index() {
            Some(TerminationReason::DataExhausted)
        } else {
            None
        };

        debug!(
            step = self.current_step,
            action = %transition.action,
            position = %transition.position,
            price = transition.trade_price,
            balance = transition.balance,
            reward,
            "step"
        );

        if let Some(reason) = termination {
            self.status = EnvStatus::Terminated(reason);
            info!(
                %reason,
                step = self.current_step,
                balance = self.account.balance,
                total_rewards = self.total_rewards,
                total_returns = self.account.accumulated_returns,
                "episode terminated"
            );
        }

        Ok(StepResult {
            observation,
            reward,
            terminated: termination.is_some(),
            truncated: false,
            info: self.info(termination),
        })
    }

    /// Step with a discrete action index (0 = BUY, 1 = SELL, 2 = HOLD).
    pub fn step_index(&mut self, index: usize) -> Result<StepResult, EnvError> {
        let action = Action::from_index(index).ok_or(ContractViolation::InvalidAction(index))?;
        self.step(action)
    }

    /// Render the trading history. `mode` is `console` or `human` (alias `chart`).
    pub fn render(&self, mode: &str) -> Result<String, ConfigError> {
        let mode = RenderMode::from_name(mode)?;
        Ok(render_history(&self.history, mode))
    }

    fn info(&self, termination_reason: Option<TerminationReason>) -> StepInfo {
        let last = self.history.last();
        StepInfo {
            account_balance: self.account.balance,
            total_returns: self.account.accumulated_returns,
            total_rewards: self.total_rewards,
            position: last.position,
            action: last.action,
            entry_price: self.account.entry_price,
            step: self.current_step,
            termination_reason,
        }
    }

    pub fn status(&self) -> EnvStatus {
        self.status
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn series(&self) -> &Arc<MarketDataSeries> {
        &self.series
    }

    pub fn history(&self) -> &TradingHistoryLog {
        &self.history
    }

    pub fn account(&self) -> &AccountState {
        &self.account
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_rewards(&self) -> f64 {
        self.total_rewards
    }

    pub fn reward_policy(&self) -> RewardPolicy {
        self.reward_policy
    }

    pub fn observation_space(&self) -> &ObservationSpace {
        &self.observation_space
    }

    pub fn action_space(&self) -> ActionSpace {
        ActionSpace::default()
    }

    /// Steps available in one episode if the balance never depletes.
    pub fn max_episode_steps(&self) -> usize {
        self.series.last_index() - self.config.window_size
    }
}

/// Pre-trade snapshot: flat, holding, priced at the close of the start bar.
fn initial_record(config: &EnvConfig, series: &MarketDataSeries) -> TradeRecord {
    TradeRecord {
        balance: config.initial_account_balance,
        position: Position::Flat,
        action: Action::Hold,
        price: series.bar(config.window_size).close,
        step_index: config.window_size,
        cumulative_reward: 0.0,
    }
}
