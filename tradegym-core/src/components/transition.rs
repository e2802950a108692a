//! Position/action state machine with commission-aware balance accounting.
//!
//! Transition table, with `pct = (price - reference) / reference` and `c` the
//! commission rate:
//!
//! | State | Action | Balance factor          | New state |
//! |-------|--------|-------------------------|-----------|
//! | FLAT  | BUY    | (1 - c)                 | LONG      |
//! | FLAT  | SELL   | (1 - c)                 | SHORT     |
//! | FLAT  | HOLD   | 1                       | FLAT      |
//! | LONG  | BUY    | 1 (redundant)           | LONG      |
//! | LONG  | SELL   | (1 + pct) * (1 - c)     | FLAT      |
//! | LONG  | HOLD   | (1 + pct)               | LONG      |
//! | SHORT | BUY    | (1 - pct) * (1 - c)     | FLAT      |
//! | SHORT | SELL   | 1 (redundant)           | SHORT     |
//! | SHORT | HOLD   | (1 - pct)               | SHORT     |
//!
//! Commission is charged only when a position is opened or closed. HOLD marks
//! an open position to market without any charge.

use crate::domain::{Action, Position};

/// Inputs the state machine reads from the previous history record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorState {
    pub balance: f64,
    pub position: Position,
    pub entry_price: Option<f64>,
    /// Trade price recorded on the previous step. `None` on the first step of
    /// an episode, when the table is skipped entirely.
    pub reference_price: Option<f64>,
}

/// Outcome of applying one action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub balance: f64,
    /// The requested action, recorded even when it had no effect.
    pub action: Action,
    pub position: Position,
    pub trade_price: f64,
    pub entry_price: Option<f64>,
}

impl Transition {
    /// True when the requested action re-entered the position already held.
    pub fn was_redundant_entry(&self, prior: Position) -> bool {
        prior.entry_action() == Some(self.action)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionStateMachine {
    commission: f64,
}

impl PositionStateMachine {
    pub fn new(commission: f64) -> Self {
        Self { commission }
    }

    pub fn commission(&self) -> f64 {
        self.commission
    }

    /// Apply `action` at `price`. Total over the 3x3 state/action space.
    pub fn apply(&self, prior: &PriorState, price: f64, action: Action) -> Transition {
        let unchanged = Transition {
            balance: prior.balance,
            action,
            position: prior.position,
            trade_price: price,
            entry_price: prior.entry_price,
        };

        let Some(reference) = prior.reference_price else {
            return unchanged;
        };

        let keep = 1.0 - self.commission;
        let pct = (price - reference) / reference;
        let balance = prior.balance;

        match (prior.position, action) {
            (Position::Flat, Action::Buy) => Transition {
                balance: balance * keep,
                position: Position::Long,
                entry_price: Some(price),
                ..unchanged
            },
            (Position::Flat, Action::Sell) => Transition {
                balance: balance * keep,
                position: Position::Short,
                entry_price: Some(price),
                ..unchanged
            },
            (Position::Flat, Action::Hold) => unchanged,

            (Position::Long, Action::Buy) => unchanged,
            (Position::Long, Action::Sell) => Transition {
                balance: balance * ((1.0 + pct) * keep),
                position: Position::Flat,
                entry_price: None,
                ..unchanged
            },
            (Position::Long, Action::Hold) => Transition {
                balance: balance * (1.0 + pct),
                ..unchanged
            },

            (Position::Short, Action::Buy) => Transition {
                balance: balance * ((1.0 - pct) * keep),
                position: Position::Flat,
                entry_price: None,
                ..unchanged
            },
            (Position::Short, Action::Sell) => unchanged,
            (Position::Short, Action::Hold) => Transition {
                balance: balance * (1.0 - pct),
                ..unchanged
            },
        }
    }
}
