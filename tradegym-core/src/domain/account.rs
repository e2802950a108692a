use serde::{Deserialize, Serialize};

/// Account state owned by the environment for the duration of an episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountState {
    pub balance: f64,
    /// Trade price at which the open position was entered. `None` while flat.
    pub entry_price: Option<f64>,
    /// Return since the start of the episode: `balance / initial - 1`.
    pub accumulated_returns: f64,
}

impl AccountState {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            balance: initial_balance,
            entry_price: None,
            accumulated_returns: 0.0,
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.balance <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_account() {
        let account = AccountState::new(10_000.0);
        assert_eq!(account.balance, 10_000.0);
        assert_eq!(account.entry_price, None);
        assert_eq!(account.accumulated_returns, 0.0);
        assert!(!account.is_depleted());
    }

    #[test]
    fn zero_balance_is_depleted() {
        let mut account = AccountState::new(1.0);
        account.balance = 0.0;
        assert!(account.is_depleted());
    }
}
