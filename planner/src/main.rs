//! Planner - command-line front end for the Waypoint planner
//!
//! 1. Reads a planning request from a JSON file
//! 2. Takes candidate actions from `--action` flags or the file's `actions` field
//! 3. Ranks action sequences with tree search
//! 4. Prints the plan as JSON on stdout
//!
//! Planning failures still print a (fallback) plan and exit 0.

use anyhow::{Context, Result};
use clap::Parser;
use planner::{Planner, PlanningRequest, StaticActionGenerator};
use serde::Deserialize;
use tracing::info;

mod config;

use crate::config::Config;

/// A planning request file. `actions` stands in for a live action generator.
#[derive(Debug, Deserialize)]
struct RequestFile {
    #[serde(flatten)]
    request: PlanningRequest,
    #[serde(default)]
    actions: Vec<String>,
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr so stdout carries only the plan
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse and validate configuration
    let config = Config::parse();
    config.validate()?;

    init_tracing(&config.log_level)?;
    info!(log_level = %config.log_level, "Tracing initialized");

    let content = tokio::fs::read_to_string(&config.request)
        .await
        .with_context(|| format!("failed to read {}", config.request.display()))?;
    let file: RequestFile = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", config.request.display()))?;

    let actions = if config.actions.is_empty() {
        file.actions
    } else {
        config.actions.clone()
    };
    info!(
        actions = actions.len(),
        num_cycles = config.num_cycles,
        "Starting planner"
    );

    let planner = Planner::new(
        StaticActionGenerator::new(actions),
        config.planner_settings(),
    );
    let response = planner.plan(file.request).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
