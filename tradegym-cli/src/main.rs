//! TradeGym CLI: drive the trading environment from the command line.
//!
//! Commands:
//! - `run` - play episodes with a reference policy, optionally rendering and
//!   saving the trading history
//! - `rollout` - random-agent episodes for many seeds in parallel
//! - `inspect` - summarize a market data file

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tradegym_core::agent::{run_episode, Policy, RandomAgent, ScriptedAgent};
use tradegym_core::data::load_csv;
use tradegym_core::rng::{SeedHierarchy, AGENT_STREAM};
use tradegym_core::rollout::run_parallel;
use tradegym_core::{EnvConfig, TradingEnvironment};

#[derive(Parser)]
#[command(name = "tradegym", about = "TradeGym CLI: single-asset forex trading environment")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyKind {
    /// Uniform BUY/SELL/HOLD.
    Random,
    /// Never trade.
    Hold,
}

#[derive(Subcommand)]
enum Commands {
    /// Play episodes and print one JSON summary line per episode.
    Run {
        /// Path to a TOML environment config. Defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// CSV market data. Overrides `data_path` from the config.
        #[arg(long)]
        data: Option<PathBuf>,

        #[arg(long, default_value_t = 1)]
        episodes: usize,

        /// Seed for the first episode. Later episodes continue the sequence.
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, value_enum, default_value_t = PolicyKind::Random)]
        policy: PolicyKind,

        /// Stop an episode after this many steps.
        #[arg(long)]
        max_steps: Option<usize>,

        /// Render after each episode: `console` or `human`.
        #[arg(long)]
        render: Option<String>,

        /// Write the last episode's trading history as JSON.
        #[arg(long)]
        history_out: Option<PathBuf>,
    },
    /// Run one random-agent episode per seed in parallel and print JSON.
    Rollout {
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        data: Option<PathBuf>,

        /// Number of seeds.
        #[arg(long, default_value_t = 8)]
        seeds: u64,

        /// First seed; seeds are consecutive from here.
        #[arg(long, default_value_t = 0)]
        seed_start: u64,

        #[arg(long)]
        max_steps: Option<usize>,
    },
    /// Load a CSV and print a summary of its bars.
    Inspect {
        data: PathBuf,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            data,
            episodes,
            seed,
            policy,
            max_steps,
            render,
            history_out,
        } => run_cmd(
            config,
            data,
            episodes,
            seed,
            policy,
            max_steps,
            render,
            history_out,
        ),
        Commands::Rollout {
            config,
            data,
            seeds,
            seed_start,
            max_steps,
        } => rollout_cmd(config, data, seeds, seed_start, max_steps),
        Commands::Inspect { data } => inspect_cmd(&data),
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,tradegym_core=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>, data: Option<PathBuf>) -> Result<EnvConfig> {
    let mut config = match path {
        Some(path) => EnvConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EnvConfig::default(),
    };
    if data.is_some() {
        config.data_path = data;
    }
    if config.data_path.is_none() {
        bail!("no market data: pass --data or set data_path in the config");
    }
    Ok(config)
}

#[allow(clippy::too_many_arguments)]
fn run_cmd(
    config_path: Option<PathBuf>,
    data: Option<PathBuf>,
    episodes: usize,
    seed: Option<u64>,
    policy_kind: PolicyKind,
    max_steps: Option<usize>,
    render: Option<String>,
    history_out: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path.as_deref(), data)?;
    let agent_seeds = SeedHierarchy::new(seed.unwrap_or(config.seed));
    let mut env = TradingEnvironment::from_config(config)?;

    for episode in 0..episodes {
        let mut policy: Box<dyn Policy> = match policy_kind {
            PolicyKind::Random => Box::new(RandomAgent::new(
                agent_seeds.rng_for(AGENT_STREAM, episode as u64),
            )),
            PolicyKind::Hold => Box::new(ScriptedAgent::new(Vec::new())),
        };
        let episode_seed = if episode == 0 { seed } else { None };
        let summary = run_episode(&mut env, policy.as_mut(), episode_seed, max_steps)?;
        println!("{}", serde_json::to_string(&summary)?);

        if let Some(mode) = render.as_deref() {
            eprint!("{}", env.render(mode)?);
        }
    }

    if let Some(path) = history_out {
        std::fs::write(&path, env.history().to_json()?)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), records = env.history().len(), "history written");
    }

    Ok(())
}

fn rollout_cmd(
    config_path: Option<PathBuf>,
    data: Option<PathBuf>,
    seeds: u64,
    seed_start: u64,
    max_steps: Option<usize>,
) -> Result<()> {
    let config = load_config(config_path.as_deref(), data)?;
    let path = config
        .data_path
        .clone()
        .context("no market data path")?;
    let series = Arc::new(load_csv(&path)?);
    let seeds = seed_range(seed_start, seeds)?;

    let summaries = run_parallel(&config, &series, &seeds, max_steps)?;
    println!("{}", serde_json::to_string_pretty(&summaries)?);

    let mean = summaries.iter().map(|s| s.total_returns).sum::<f64>() / summaries.len().max(1) as f64;
    info!(episodes = summaries.len(), mean_returns = mean, "rollout complete");
    Ok(())
}

/// `count` consecutive seeds starting at `start`.
fn seed_range(start: u64, count: u64) -> Result<Vec<u64>> {
    let Some(end) = start.checked_add(count) else {
        bail!("--seed-start {start} plus --seeds {count} overflows u64");
    };
    Ok((start..end).collect())
}

fn inspect_cmd(path: &Path) -> Result<()> {
    let series = load_csv(path)?;
    let bars = series.bars();
    let closes = bars.iter().map(|b| b.close);
    let min = closes.clone().fold(f64::INFINITY, f64::min);
    let max = closes.fold(f64::NEG_INFINITY, f64::max);

    println!("File:         {}", path.display());
    println!("Bars:         {}", series.len());
    if let (Some(first), Some(last)) = (
        bars.first().and_then(|b| b.timestamp),
        bars.last().and_then(|b| b.timestamp),
    ) {
        println!("Range:        {first} .. {last}");
    } else {
        println!("Range:        (no timestamps)");
    }
    println!("Volume:       {}", if series.has_volume() { "yes" } else { "no" });
    println!("Close range:  {min:.5} .. {max:.5}");
    println!("Insane bars:  {}", series.insane_bars());
    println!("Max window:   {}", series.len().saturating_sub(2));
    Ok(())
}
