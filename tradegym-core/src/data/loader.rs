//! CSV ingestion for cleaned OHLC tables.
//!
//! Expected layout: a header row naming at least `open`, `high`, `low`,
//! `close`. Optional columns:
//! - `volume`
//! - `timestamp` / `datetime` / `date` with an ISO-style value, or
//! - `date` + `hour` in the split `YYYY.MM.DD` / `HH:MM` form produced by the
//!   histdata forex extraction.
//!
//! Extra columns (e.g. a pandas index) are ignored.

use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::info;

use super::series::{DataError, MarketDataSeries};
use crate::domain::MarketBar;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y.%m.%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y.%m.%d"];

/// Where a row's timestamp comes from.
#[derive(Debug, Clone, Copy)]
enum TimeColumns {
    None,
    Single(usize),
    DateHour { date: usize, hour: usize },
}

#[derive(Debug)]
struct ColumnMap {
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
    time: TimeColumns,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self, DataError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require =
            |name: &str| find(name).ok_or_else(|| DataError::MissingColumn(name.to_string()));

        let time = match (find("timestamp").or_else(|| find("datetime")), find("date"), find("hour")) {
            (Some(col), _, _) => TimeColumns::Single(col),
            (None, Some(date), Some(hour)) => TimeColumns::DateHour { date, hour },
            (None, Some(date), None) => TimeColumns::Single(date),
            (None, None, _) => TimeColumns::None,
        };

        Ok(Self {
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            volume: find("volume"),
            time,
        })
    }
}

/// Load and validate a CSV file into a [`MarketDataSeries`].
pub fn load_csv(path: &Path) -> Result<MarketDataSeries, DataError> {
    let file = std::fs::File::open(path).map_err(|e| DataError::Unreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let series = read_csv(file).map_err(|e| match e {
        DataError::Unreadable { reason, .. } => DataError::Unreadable {
            path: path.display().to_string(),
            reason,
        },
        other => other,
    })?;
    info!(
        path = %path.display(),
        bars = series.len(),
        volume = series.has_volume(),
        "loaded market data"
    );
    Ok(series)
}

/// Parse CSV from any reader. Row numbers in errors are 0-based data rows.
pub fn read_csv<R: Read>(reader: R) -> Result<MarketDataSeries, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| unreadable(e.to_string()))?
        .clone();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut bars = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| DataError::MalformedRow {
            row,
            reason: e.to_string(),
        })?;
        bars.push(parse_bar(&record, &columns, row)?);
    }

    MarketDataSeries::from_bars(bars)
}

fn unreadable(reason: String) -> DataError {
    DataError::Unreadable {
        path: "<reader>".into(),
        reason,
    }
}

fn parse_bar(record: &StringRecord, columns: &ColumnMap, row: usize) -> Result<MarketBar, DataError> {
    let mut bar = MarketBar::new(
        parse_f64(record, columns.open, "open", row)?,
        parse_f64(record, columns.high, "high", row)?,
        parse_f64(record, columns.low, "low", row)?,
        parse_f64(record, columns.close, "close", row)?,
    );

    if let Some(col) = columns.volume {
        let raw = field(record, col, "volume", row)?;
        if !raw.is_empty() {
            bar.volume = Some(parse_f64(record, col, "volume", row)?);
        }
    }

    bar.timestamp = match columns.time {
        TimeColumns::None => None,
        TimeColumns::Single(col) => Some(parse_timestamp(field(record, col, "timestamp", row)?, row)?),
        TimeColumns::DateHour { date, hour } => {
            let joined = format!(
                "{} {}",
                field(record, date, "date", row)?,
                field(record, hour, "hour", row)?
            );
            Some(parse_timestamp(&joined, row)?)
        }
    };

    Ok(bar)
}

fn field<'r>(record: &'r StringRecord, col: usize, name: &str, row: usize) -> Result<&'r str, DataError> {
    record.get(col).ok_or_else(|| DataError::MalformedRow {
        row,
        reason: format!("missing value for '{name}'"),
    })
}

fn parse_f64(record: &StringRecord, col: usize, name: &str, row: usize) -> Result<f64, DataError> {
    let raw = field(record, col, name, row)?;
    raw.parse::<f64>().map_err(|_| DataError::MalformedRow {
        row,
        reason: format!("'{name}' is not a number: '{raw}'"),
    })
}

fn parse_timestamp(value: &str, row: usize) -> Result<NaiveDateTime, DataError> {
    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(ts);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            if let Some(ts) = date.and_hms_opt(0, 0, 0) {
                return Ok(ts);
            }
        }
    }
    Err(DataError::BadTimestamp {
        row,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_minimal_ohlc_table() {
        let csv = "open,high,close,low\n1.10,1.12,1.11,1.09\n1.11,1.13,1.12,1.10\n";
        let series = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(series.len(), 2);
        assert!(!series.has_volume());
        let bar = series.bar(0);
        assert_eq!(bar.close, 1.11);
        assert_eq!(bar.low, 1.09);
        assert_eq!(bar.timestamp, None);
    }

    #[test]
    fn reads_histdata_date_and_hour_columns() {
        let csv = "date,hour,open,high,low,close,volume\n\
                   2020.01.02,00:00,1.1,1.2,1.0,1.15,0\n\
                   2020.01.02,12:00,1.15,1.2,1.1,1.18,0\n";
        let series = read_csv(csv.as_bytes()).unwrap();
        assert!(series.has_volume());
        let ts = series.bar(1).timestamp.unwrap();
        assert_eq!(ts.to_string(), "2020-01-02 12:00:00");
    }

    #[test]
    fn reads_iso_timestamp_column_and_ignores_index() {
        let csv = ",timestamp,open,high,low,close\n\
                   0,2021-06-01 10:00:00,1.0,1.0,1.0,1.0\n\
                   1,2021-06-01 11:00:00,1.0,1.0,1.0,1.0\n";
        let series = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(series.len(), 2);
        assert!(series.bar(0).timestamp.is_some());
    }

    #[test]
    fn missing_close_column_is_reported() {
        let csv = "open,high,low\n1,1,1\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(ref c) if c == "close"));
    }

    #[test]
    fn non_numeric_price_is_reported_with_row() {
        let csv = "open,high,low,close\n1,1,1,1\n1,abc,1,1\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::MalformedRow { row: 1, .. }));
    }

    #[test]
    fn bad_timestamp_is_reported() {
        let csv = "timestamp,open,high,low,close\nyesterday,1,1,1,1\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::BadTimestamp { row: 0, .. }));
    }

    #[test]
    fn unsorted_rows_are_rejected() {
        let csv = "timestamp,open,high,low,close\n\
                   2021-06-01,1,1,1,1\n\
                   2021-05-31,1,1,1,1\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::NonIncreasingTimestamp { row: 1 }));
    }

    #[test]
    fn missing_file_is_unreadable() {
        let err = load_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DataError::Unreadable { .. }));
    }
}
