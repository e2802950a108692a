//! Position and action enumerations with their observation encodings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Directional exposure of the agent.
///
/// The discriminants are the values written into the observation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Position {
    Long = 0,
    Short = 1,
    Flat = 2,
}

impl Position {
    pub const ALL: [Position; 3] = [Position::Long, Position::Short, Position::Flat];

    pub fn name(self) -> &'static str {
        match self {
            Position::Long => "LONG",
            Position::Short => "SHORT",
            Position::Flat => "FLAT",
        }
    }

    pub fn code(self) -> f64 {
        self as u8 as f64
    }

    pub fn is_flat(self) -> bool {
        self == Position::Flat
    }

    /// The action that would re-enter this position, if any.
    pub fn entry_action(self) -> Option<Action> {
        match self {
            Position::Long => Some(Action::Buy),
            Position::Short => Some(Action::Sell),
            Position::Flat => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Discrete action requested by the agent for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Buy = 0,
    Sell = 1,
    Hold = 2,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Buy, Action::Sell, Action::Hold];

    /// Size of the discrete action space.
    pub const COUNT: usize = 3;

    pub fn name(self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Hold => "HOLD",
        }
    }

    pub fn code(self) -> f64 {
        self as u8 as f64
    }

    /// Decode a discrete action index. Returns `None` outside `0..3`.
    pub fn from_index(index: usize) -> Option<Action> {
        Action::ALL.get(index).copied()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
