//! Configuration for the planner CLI
//!
//! Configuration is loaded from config.toml with environment variable overrides.
//! CLI arguments take highest priority, followed by env vars, then config.toml.

use anyhow::{anyhow, Result};
use clap::Parser;
use engine_config::{load_config, CentralConfig};
use once_cell::sync::Lazy;
use planner::PlannerSettings;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

fn default_num_cycles() -> u32 {
    CENTRAL_CONFIG.search.num_cycles
}

fn default_exploration_constant() -> f64 {
    CENTRAL_CONFIG.search.exploration_constant
}

fn default_max_paths() -> usize {
    CENTRAL_CONFIG.search.max_paths
}

fn default_max_rollout_depth() -> u32 {
    CENTRAL_CONFIG.search.max_rollout_depth
}

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

#[derive(Parser, Debug, Clone)]
#[command(name = "planner")]
#[command(about = "Waypoint planner - rank what to do next")]
#[command(
    long_about = "Reads a planning request (JSON), ranks sequences of candidate actions
with Monte Carlo Tree Search and prints the plan as JSON.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Path to the planning request JSON file
    #[arg(long)]
    pub request: PathBuf,

    /// Candidate action (repeatable). Overrides the request file's `actions`
    #[arg(long = "action")]
    pub actions: Vec<String>,

    /// Exploration cycles per search
    #[arg(long, default_value_t = default_num_cycles())]
    pub num_cycles: u32,

    /// UCB exploration constant
    #[arg(long, default_value_t = default_exploration_constant())]
    pub exploration_constant: f64,

    /// Number of ranked paths to return
    #[arg(long, default_value_t = default_max_paths())]
    pub max_paths: usize,

    /// Longest rollout before a cycle is abandoned
    #[arg(long, default_value_t = default_max_rollout_depth())]
    pub max_rollout_depth: u32,

    /// RNG seed for reproducible plans (defaults to the config value, else entropy)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !self.exploration_constant.is_finite() || self.exploration_constant < 0.0 {
            return Err(anyhow!(
                "exploration_constant must be a non-negative number, got {}",
                self.exploration_constant
            ));
        }

        if self.max_paths == 0 {
            return Err(anyhow!("max_paths must be greater than 0"));
        }

        if self.max_rollout_depth == 0 {
            return Err(anyhow!("max_rollout_depth must be greater than 0"));
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        Ok(())
    }

    /// Planner settings from the central config with CLI overrides applied.
    pub fn planner_settings(&self) -> PlannerSettings {
        self.settings_from(&CENTRAL_CONFIG)
    }

    fn settings_from(&self, central: &CentralConfig) -> PlannerSettings {
        let mut settings = PlannerSettings::from_central(central);
        settings.search.num_cycles = self.num_cycles;
        settings.search.exploration_constant = self.exploration_constant;
        settings.search.max_paths = self.max_paths;
        settings.search.max_rollout_depth = self.max_rollout_depth;
        if self.seed.is_some() {
            settings.search.seed = self.seed;
        }
        settings
    }
}
