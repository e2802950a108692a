//! Append-only trading history for one episode.

use serde::{Deserialize, Serialize};

use super::position::{Action, Position};

/// One row of the trading history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub balance: f64,
    pub position: Position,
    pub action: Action,
    pub price: f64,
    pub step_index: usize,
    pub cumulative_reward: f64,
}

/// Append-only log of [`TradeRecord`]s.
///
/// Index 0 is the pre-trade snapshot written at reset. Balances are kept in a
/// parallel column so reward policies can borrow them as a contiguous slice.
#[derive(Debug, Clone)]
pub struct TradingHistoryLog {
    records: Vec<TradeRecord>,
    balances: Vec<f64>,
}

impl TradingHistoryLog {
    /// Start a log with the initial snapshot.
    pub fn new(initial: TradeRecord) -> Self {
        let balances = vec![initial.balance];
        Self {
            records: vec![initial],
            balances,
        }
    }

    pub fn append(&mut self, record: TradeRecord) {
        self.balances.push(record.balance);
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Never true: a log always holds its initial snapshot.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    pub fn balances(&self) -> &[f64] {
        &self.balances
    }

    pub fn initial(&self) -> &TradeRecord {
        &self.records[0]
    }

    pub fn last(&self) -> &TradeRecord {
        // Constructed non-empty and only ever appended to.
        &self.records[self.records.len() - 1]
    }

    /// True while only the reset snapshot exists.
    pub fn is_pre_trade(&self) -> bool {
        self.records.len() == 1
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(balance: f64, step_index: usize) -> TradeRecord {
        TradeRecord {
            balance,
            position: Position::Flat,
            action: Action::Hold,
            price: 100.0,
            step_index,
            cumulative_reward: 0.0,
        }
    }

    #[test]
    fn starts_with_snapshot() {
        let log = TradingHistoryLog::new(record(10_000.0, 5));
        assert_eq!(log.len(), 1);
        assert!(log.is_pre_trade());
        assert!(!log.is_empty());
        assert_eq!(log.initial().step_index, 5);
        assert_eq!(log.balances(), &[10_000.0]);
    }

    #[test]
    fn append_keeps_columns_aligned() {
        let mut log = TradingHistoryLog::new(record(10_000.0, 0));
        log.append(record(10_100.0, 1));
        log.append(record(10_200.0, 2));

        assert_eq!(log.len(), 3);
        assert_eq!(log.balances(), &[10_000.0, 10_100.0, 10_200.0]);
        assert_eq!(log.last().step_index, 2);
        assert!(!log.is_pre_trade());
    }

    #[test]
    fn json_export_lists_every_record() {
        let mut log = TradingHistoryLog::new(record(1.0, 0));
        log.append(record(2.0, 1));
        let json = log.to_json().unwrap();
        let parsed: Vec<TradeRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].balance, 2.0);
    }
}
