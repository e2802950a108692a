//! One row of the price table the environment trades against.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// OHLC bar for a single timestep, with optional volume.
///
/// Forex tick-volume is frequently missing from extracted tables, so volume is
/// optional per bar. The timestamp is optional as well: tables delivered
/// without a time column are ordered by row position alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketBar {
    pub timestamp: Option<NaiveDateTime>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

impl MarketBar {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp: None,
            open,
            high,
            low,
            close,
            volume: None,
        }
    }

    /// Flat bar where every price equals `price`.
    pub fn flat(price: f64) -> Self {
        Self::new(price, price, price, price)
    }

    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Returns true if any price field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite())
    }

    /// All prices finite and strictly positive. Required for pct-change math.
    pub fn has_tradeable_prices(&self) -> bool {
        !self.is_void()
            && self.open > 0.0
            && self.high > 0.0
            && self.low > 0.0
            && self.close > 0.0
    }

    /// Basic OHLC sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        if !self.has_tradeable_prices() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }

    /// Midpoint between open and close.
    pub fn open_close_mid(&self) -> f64 {
        (self.open + self.close) / 2.0
    }
}
