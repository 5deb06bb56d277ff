use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::EngineConfig;
use crate::error::TrustlineError;
use crate::evaluator::{read_json, EvaluationInput, Evaluator};

#[derive(Parser)]
#[command(name = "trustline")]
#[command(author = "Trustline Team")]
#[command(version = "0.1.0")]
#[command(about = "Market snapshot and trust-market overlay engine", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config directory (default.toml, <TRUSTLINE_ENV>.toml)
    #[arg(short, long, global = true, default_value = "config", env = "TRUSTLINE_CONFIG_DIR")]
    pub config: PathBuf,

    /// Abort on invariant violations
    #[arg(long, global = true)]
    pub strict: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate one contest and print the decision
    Evaluate {
        /// JSON file holding one evaluation input
        #[arg(short, long)]
        input: PathBuf,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Evaluate an array of contests in parallel
    Batch {
        /// JSON file holding an array of evaluation inputs
        #[arg(short, long)]
        input: PathBuf,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Load and validate configuration
    CheckConfig,
}

/// Load configuration, apply CLI overrides and validate
pub fn load_config(dir: &Path, strict: bool) -> anyhow::Result<EngineConfig> {
    let mut config = EngineConfig::load_from(dir)
        .map_err(TrustlineError::from)
        .with_context(|| format!("loading configuration from {}", dir.display()))?;
    if strict {
        config.strict_mode = true;
    }
    config
        .validate()
        .map_err(|errors| TrustlineError::InvalidConfig(errors.join("; ")))?;
    Ok(config)
}

pub fn read_input<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    read_json(path).with_context(|| format!("reading {}", path.display()))
}

pub fn print_json<T: Serialize>(item: &T, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(item)?
    } else {
        serde_json::to_string(item)?
    };
    println!("{json}");
    Ok(())
}

pub fn run_evaluate(config: EngineConfig, input: &Path, pretty: bool) -> anyhow::Result<()> {
    let input: EvaluationInput = read_input(input)?;
    let decision = Evaluator::new(config)?
        .evaluate(&input)
        .with_context(|| format!("evaluating contest {}", input.contest.id))?;
    print_json(&decision, pretty)
}

/// Prints every outcome; fails if any contest failed
pub fn run_batch(config: EngineConfig, input: &Path, pretty: bool) -> anyhow::Result<()> {
    let inputs: Vec<EvaluationInput> = read_input(input)?;
    let outcomes = Evaluator::new(config)?.evaluate_batch(&inputs);
    print_json(&outcomes, pretty)?;

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} contests failed", outcomes.len());
    }
    Ok(())
}

pub fn run_check_config(config: &EngineConfig) -> anyhow::Result<()> {
    println!("configuration OK");
    print_json(config, true)
}
