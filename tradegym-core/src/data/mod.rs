//! Market data ingestion and the read-only series the environment trades on.

pub mod loader;
pub mod series;

pub use loader::{load_csv, read_csv};
pub use series::{DataError, MarketDataSeries, PRICE_FEATURES};
