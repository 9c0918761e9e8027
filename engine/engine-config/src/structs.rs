//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_num_cycles() -> u32 {
    defaults::num_cycles()
}
fn d_exploration_constant() -> f64 {
    defaults::exploration_constant()
}
fn d_max_paths() -> usize {
    defaults::max_paths()
}
fn d_max_rollout_depth() -> u32 {
    defaults::max_rollout_depth()
}
fn d_max_action_len() -> usize {
    defaults::max_action_len()
}
fn d_insight_threshold() -> f64 {
    defaults::insight_confidence_threshold()
}
fn d_fallback_message() -> String {
    defaults::fallback_message().into()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level().into(),
        }
    }
}

/// Tree search configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    #[serde(default = "d_num_cycles")]
    pub num_cycles: u32,
    #[serde(default = "d_exploration_constant")]
    pub exploration_constant: f64,
    #[serde(default = "d_max_paths")]
    pub max_paths: usize,
    /// Rollouts longer than this abandon their cycle
    #[serde(default = "d_max_rollout_depth")]
    pub max_rollout_depth: u32,
    /// Fixed RNG seed. None = seed from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            num_cycles: defaults::num_cycles(),
            exploration_constant: defaults::exploration_constant(),
            max_paths: defaults::max_paths(),
            max_rollout_depth: defaults::max_rollout_depth(),
            seed: None,
        }
    }
}

/// Planner front door configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PlannerConfig {
    #[serde(default = "d_max_action_len")]
    pub max_action_len: usize,
    /// Insights must score strictly above this to reach the action generator
    #[serde(default = "d_insight_threshold")]
    pub insight_confidence_threshold: f64,
    #[serde(default = "d_fallback_message")]
    pub fallback_message: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_action_len: defaults::max_action_len(),
            insight_confidence_threshold: defaults::insight_confidence_threshold(),
            fallback_message: defaults::fallback_message().into(),
        }
    }
}
