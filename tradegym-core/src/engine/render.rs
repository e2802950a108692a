//! Presentation of the trading history. Not part of the step contract.

use std::fmt::Write as _;

use crate::domain::{Action, TradingHistoryLog};
use crate::error::ConfigError;

const CHART_WIDTH: usize = 72;
const CHART_HEIGHT: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Text summary of the latest record.
    Console,
    /// ASCII charts of balance and price history with trade markers.
    Chart,
}

impl RenderMode {
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name {
            "console" => Ok(Self::Console),
            "human" | "chart" => Ok(Self::Chart),
            other => Err(ConfigError::UnknownRenderMode(other.to_string())),
        }
    }
}

pub fn render_history(history: &TradingHistoryLog, mode: RenderMode) -> String {
    match mode {
        RenderMode::Console => render_console(history),
        RenderMode::Chart => render_chart(history),
    }
}

fn total_returns(history: &TradingHistoryLog) -> f64 {
    history.last().balance / history.initial().balance - 1.0
}

fn render_console(history: &TradingHistoryLog) -> String {
    let last = history.last();
    let rule = "-".repeat(52);
    let mut out = String::new();
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "ACCOUNT BALANCE: {}", last.balance);
    let _ = writeln!(out, "TOTAL RETURNS: {}", total_returns(history));
    let _ = writeln!(out, "TOTAL REWARDS: {}", last.cumulative_reward);
    let _ = writeln!(out, "AGENT POSITION: {}", last.position);
    let _ = writeln!(out, "AGENT ACTION: {}", last.action);
    let _ = writeln!(out, "STEP: {}", last.step_index);
    let _ = writeln!(out, "{rule}");
    out
}

fn render_chart(history: &TradingHistoryLog) -> String {
    let pct = (total_returns(history) * 10_000.0).round() / 100.0;
    let records = history.records();

    let balances: Vec<f64> = records.iter().map(|r| r.balance).collect();
    let prices: Vec<f64> = records.iter().map(|r| r.price).collect();
    let markers: Vec<Option<char>> = records
        .iter()
        .map(|r| match r.action {
            Action::Buy => Some('^'),
            Action::Sell => Some('v'),
            Action::Hold => None,
        })
        .collect();

    let mut out = String::new();
    let _ = writeln!(out, "ACCOUNT BALANCE HISTORY | RETURNS {pct}%");
    plot(&mut out, &balances, &[]);
    let _ = writeln!(out);
    let _ = writeln!(out, "AGENT TRADING HISTORY | RETURNS {pct}%   (^ BUY, v SELL)");
    plot(&mut out, &prices, &markers);
    out
}

/// Draw `values` as a point plot, downsampling to the chart width.
fn plot(out: &mut String, values: &[f64], markers: &[Option<char>]) {
    if values.is_empty() {
        return;
    }
    let width = values.len().min(CHART_WIDTH);
    let index_for = |col: usize| {
        if width <= 1 {
            0
        } else {
            col * (values.len() - 1) / (width - 1)
        }
    };

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    let mut grid = vec![vec![' '; width]; CHART_HEIGHT];
    for col in 0..width {
        let i = index_for(col);
        let level = if span > 0.0 {
            (((values[i] - min) / span) * (CHART_HEIGHT - 1) as f64).round() as usize
        } else {
            CHART_HEIGHT / 2
        };
        let row = CHART_HEIGHT - 1 - level.min(CHART_HEIGHT - 1);
        grid[row][col] = markers.get(i).copied().flatten().unwrap_or('*');
    }

    for (r, line) in grid.iter().enumerate() {
        let label = if r == 0 {
            format!("{max:>12.4}")
        } else if r == CHART_HEIGHT - 1 {
            format!("{min:>12.4}")
        } else {
            " ".repeat(12)
        };
        let body: String = line.iter().collect();
        let _ = writeln!(out, "{label} |{}", body.trim_end());
    }
}
