//! Windowed observations: market features plus rolled agent state.
//!
//! An observation is a `(window_size + 1) x (market_features + 3)` matrix in
//! row-major order. Row `i` holds bar `step - window_size + i`, so the last
//! row is always the current bar paired with the state that resulted from the
//! action just applied. Prices, volume and balance are divided by a fixed
//! normalization factor (a static scale, not min-max).

use std::collections::VecDeque;

use serde::Serialize;

use crate::data::MarketDataSeries;
use crate::domain::{Action, Position};

/// Columns appended after the market features: position, action, balance.
pub const AGENT_FEATURES: usize = 3;

/// Agent-side features for one timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentState {
    pub position: Position,
    pub action: Action,
    pub balance: f64,
}

impl AgentState {
    fn encode(&self, scale: f64) -> [f64; AGENT_FEATURES] {
        [self.position.code(), self.action.code(), self.balance / scale]
    }
}

/// Dense row-major observation matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Observation {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn row(&self, index: usize) -> &[f64] {
        &self.data[index * self.cols..(index + 1) * self.cols]
    }

    /// The trailing position/action/balance columns of row `index`.
    pub fn agent_row(&self, index: usize) -> &[f64] {
        let row = self.row(index);
        &row[self.cols - AGENT_FEATURES..]
    }

    /// The leading market columns of row `index`.
    pub fn market_row(&self, index: usize) -> &[f64] {
        let row = self.row(index);
        &row[..self.cols - AGENT_FEATURES]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }
}

/// Per-column bounds of the observation matrix. Metadata for consumers only;
/// nothing clamps values into these ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSpace {
    pub rows: usize,
    pub cols: usize,
    pub low: Vec<f64>,
    pub high: Vec<f64>,
}

impl ObservationSpace {
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn contains(&self, obs: &Observation) -> bool {
        if obs.shape() != self.shape() {
            return false;
        }
        (0..obs.rows()).all(|r| {
            obs.row(r)
                .iter()
                .zip(self.low.iter().zip(&self.high))
                .all(|(v, (lo, hi))| *v >= *lo && *v <= *hi)
        })
    }
}

/// Discrete action space of size [`Action::COUNT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSpace {
    pub n: usize,
}

impl Default for ActionSpace {
    fn default() -> Self {
        Self { n: Action::COUNT }
    }
}

/// Builds observations and owns the rolling agent-state window.
#[derive(Debug, Clone)]
pub struct ObservationBuilder {
    window_size: usize,
    include_volume: bool,
    normalization_factor: f64,
    agent_rows: VecDeque<[f64; AGENT_FEATURES]>,
}

impl ObservationBuilder {
    pub fn new(window_size: usize, include_volume: bool, normalization_factor: f64) -> Self {
        Self {
            window_size,
            include_volume,
            normalization_factor,
            agent_rows: VecDeque::with_capacity(window_size + 1),
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Fill the window with `window_size + 1` copies of the initial state.
    pub fn reset(&mut self, initial: AgentState) {
        let encoded = initial.encode(self.normalization_factor);
        self.agent_rows.clear();
        self.agent_rows
            .extend(std::iter::repeat(encoded).take(self.window_size + 1));
    }

    /// Evict the oldest agent row and append `state`.
    pub fn push(&mut self, state: AgentState) {
        self.agent_rows.pop_front();
        self.agent_rows
            .push_back(state.encode(self.normalization_factor));
    }

    pub fn agent_rows(&self) -> impl Iterator<Item = &[f64; AGENT_FEATURES]> {
        self.agent_rows.iter()
    }

    /// Assemble the observation ending at bar `step`.
    ///
    /// `step` must be at least `window_size` and within the series.
    pub fn build(&self, series: &MarketDataSeries, step: usize) -> Observation {
        debug_assert!(step >= self.window_size && step < series.len());
        debug_assert_eq!(self.agent_rows.len(), self.window_size + 1);

        let rows = self.window_size + 1;
        let cols = series.feature_count(self.include_volume) + AGENT_FEATURES;
        let first = step - self.window_size;

        let mut data = Vec::with_capacity(rows * cols);
        for (offset, agent) in self.agent_rows.iter().enumerate() {
            series.push_features(first + offset, self.include_volume, self.normalization_factor, &mut data);
            data.extend_from_slice(agent);
        }

        Observation { rows, cols, data }
    }

    pub fn observation_space(&self, series: &MarketDataSeries) -> ObservationSpace {
        let market = series.feature_count(self.include_volume);
        let mut low = vec![f64::NEG_INFINITY; market];
        let mut high = vec![f64::INFINITY; market];
        let (max_position, max_action) = (Position::Flat.code(), Action::Hold.code());
        low.extend_from_slice(&[0.0, 0.0, f64::NEG_INFINITY]);
        high.extend_from_slice(&[max_position, max_action, f64::INFINITY]);
        ObservationSpace {
            rows: self.window_size + 1,
            cols: market + AGENT_FEATURES,
            low,
            high,
        }
    }
}
