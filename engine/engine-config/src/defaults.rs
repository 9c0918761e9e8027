//! Default configuration values loaded from config.defaults.toml.
//!
//! The defaults file is embedded at compile time so every binary ships
//! with the same values.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    search: SearchDefaults,
    planner: PlannerDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct SearchDefaults {
    num_cycles: u32,
    exploration_constant: f64,
    max_paths: usize,
    max_rollout_depth: u32,
}

#[derive(Debug, Deserialize)]
struct PlannerDefaults {
    max_action_len: usize,
    insight_confidence_threshold: f64,
    fallback_message: String,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// Search
pub fn num_cycles() -> u32 {
    DEFAULTS.search.num_cycles
}
pub fn exploration_constant() -> f64 {
    DEFAULTS.search.exploration_constant
}
pub fn max_paths() -> usize {
    DEFAULTS.search.max_paths
}
pub fn max_rollout_depth() -> u32 {
    DEFAULTS.search.max_rollout_depth
}

// Planner
pub fn max_action_len() -> usize {
    DEFAULTS.planner.max_action_len
}
pub fn insight_confidence_threshold() -> f64 {
    DEFAULTS.planner.insight_confidence_threshold
}
pub fn fallback_message() -> &'static str {
    &DEFAULTS.planner.fallback_message
}
