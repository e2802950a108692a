//! Domain types for TradeGym

pub mod account;
pub mod bar;
pub mod history;
pub mod position;

pub use account::AccountState;
pub use bar::MarketBar;
pub use history::{TradeRecord, TradingHistoryLog};
pub use position::{Action, Position};
