//! Immutable chronological market table.

use thiserror::Error;
use tracing::warn;

use crate::domain::MarketBar;

/// Number of price columns (open, high, low, close) in every observation row.
pub const PRICE_FEATURES: usize = 4;

/// Structured error types for data loading and validation.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("cannot read data source '{path}': {reason}")]
    Unreadable { path: String, reason: String },

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("row {row}: unparseable timestamp '{value}'")]
    BadTimestamp { row: usize, value: String },

    #[error("row {row}: timestamp is not strictly after the previous row")]
    NonIncreasingTimestamp { row: usize },

    #[error("row {row}: timestamps must be present on every row or on none")]
    MixedTimestamps { row: usize },

    #[error("row {row}: prices must be finite and positive")]
    UntradeablePrice { row: usize },

    #[error("data source contains no rows")]
    Empty,
}

/// Read-only, validated sequence of [`MarketBar`]s.
///
/// Construction enforces strictly increasing timestamps (when present) and
/// tradeable prices. Gaps in the bar interval are not detected: the data
/// provider is responsible for delivering an aligned table.
#[derive(Debug, Clone)]
pub struct MarketDataSeries {
    bars: Vec<MarketBar>,
    has_volume: bool,
    insane_bars: usize,
}

impl MarketDataSeries {
    pub fn from_bars(bars: Vec<MarketBar>) -> Result<Self, DataError> {
        if bars.is_empty() {
            return Err(DataError::Empty);
        }

        let timestamped = bars[0].timestamp.is_some();
        let mut insane_bars = 0;

        for (row, bar) in bars.iter().enumerate() {
            if !bar.has_tradeable_prices() {
                return Err(DataError::UntradeablePrice { row });
            }
            if !bar.is_sane() {
                insane_bars += 1;
            }
            if bar.timestamp.is_some() != timestamped {
                return Err(DataError::MixedTimestamps { row });
            }
            if row > 0 {
                if let (Some(prev), Some(curr)) = (bars[row - 1].timestamp, bar.timestamp) {
                    if curr <= prev {
                        return Err(DataError::NonIncreasingTimestamp { row });
                    }
                }
            }
        }

        if insane_bars > 0 {
            warn!(
                insane_bars,
                total = bars.len(),
                "bars with inconsistent OHLC ranges (high < low or close outside range)"
            );
        }

        let has_volume = bars.iter().all(|b| b.volume.is_some());

        Ok(Self {
            bars,
            has_volume,
            insane_bars,
        })
    }

    /// Build a series of flat bars from a price path. Mostly useful in tests.
    pub fn from_prices(prices: &[f64]) -> Result<Self, DataError> {
        Self::from_bars(prices.iter().map(|&p| MarketBar::flat(p)).collect())
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[MarketBar] {
        &self.bars
    }

    pub fn bar(&self, index: usize) -> &MarketBar {
        &self.bars[index]
    }

    /// True when every bar carries a volume value.
    pub fn has_volume(&self) -> bool {
        self.has_volume
    }

    /// Count of bars accepted despite inconsistent OHLC ranges.
    pub fn insane_bars(&self) -> usize {
        self.insane_bars
    }

    pub fn last_index(&self) -> usize {
        self.bars.len() - 1
    }

    /// Number of market columns per observation row.
    pub fn feature_count(&self, include_volume: bool) -> usize {
        PRICE_FEATURES + usize::from(include_volume && self.has_volume)
    }

    /// Append the scaled market features of bar `index` to `out`.
    ///
    /// Column order is open, high, low, close, then volume when requested and
    /// available.
    pub fn push_features(&self, index: usize, include_volume: bool, scale: f64, out: &mut Vec<f64>) {
        let bar = &self.bars[index];
        out.push(bar.open / scale);
        out.push(bar.high / scale);
        out.push(bar.low / scale);
        out.push(bar.close / scale);
        if include_volume && self.has_volume {
            out.push(bar.volume.unwrap_or(0.0) / scale);
        }
    }
}
