//! Configuration loading logic.
//!
//! Resolves which config.toml to read, parses it, and layers
//! `WAYPOINT_<SECTION>_<KEY>` environment overrides on top.

use crate::CentralConfig;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "WAYPOINT_CONFIG";

/// Locations searched for config.toml, relative to the working directory.
///
/// The parent entry covers running the CLI from inside `planner/`.
pub const CONFIG_SEARCH_PATHS: &[&str] = &["config.toml", "../config.toml"];

/// Pick the config file to read.
///
/// An explicit path wins when it exists; otherwise the first existing entry
/// of [`CONFIG_SEARCH_PATHS`] is used. `None` means built-in defaults only.
pub fn locate_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        warn!(path = %path.display(), "{CONFIG_PATH_ENV} not found, searching defaults");
    }

    CONFIG_SEARCH_PATHS
        .iter()
        .map(|path| PathBuf::from(*path))
        .find(|path| path.exists())
}

/// Load the central configuration.
///
/// Reads the file chosen by [`locate_config`] (honouring `WAYPOINT_CONFIG`),
/// then applies environment overrides.
pub fn load_config() -> CentralConfig {
    let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);

    match locate_config(explicit.as_deref()) {
        Some(path) => {
            info!(path = %path.display(), "Loading config");
            load_from_path(&path)
        }
        None => {
            debug!("No config.toml found, using built-in defaults");
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Load configuration from a specific path.
///
/// An unreadable or malformed file falls back to the built-in defaults.
pub fn load_from_path(path: &Path) -> CentralConfig {
    let parsed: Result<CentralConfig, String> = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|content| toml::from_str(&content).map_err(|e| e.to_string()));

    let config = parsed.unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "Unusable config file, using defaults");
        CentralConfig::default()
    });
    apply_env_overrides(config)
}

fn override_string(target: &mut String, key: &str) {
    if let Ok(value) = std::env::var(key) {
        *target = value;
    }
}

fn override_parsed<T: FromStr>(target: &mut T, key: &str) {
    if let Some(value) = parsed_var(key) {
        *target = value;
    }
}

fn override_optional<T: FromStr>(target: &mut Option<T>, key: &str) {
    if let Some(value) = parsed_var(key) {
        *target = Some(value);
    }
}

fn parsed_var<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    let parsed = raw.trim().parse().ok();
    if parsed.is_none() {
        warn!(key, value = %raw, "Ignoring unparseable override");
    }
    parsed
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: WAYPOINT_<SECTION>_<KEY>.
/// Values that fail to parse are ignored.
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    override_string(&mut config.common.log_level, "WAYPOINT_COMMON_LOG_LEVEL");

    let search = &mut config.search;
    override_parsed(&mut search.num_cycles, "WAYPOINT_SEARCH_NUM_CYCLES");
    override_parsed(&mut search.exploration_constant, "WAYPOINT_SEARCH_EXPLORATION_CONSTANT");
    override_parsed(&mut search.max_paths, "WAYPOINT_SEARCH_MAX_PATHS");
    override_parsed(&mut search.max_rollout_depth, "WAYPOINT_SEARCH_MAX_ROLLOUT_DEPTH");
    override_optional(&mut search.seed, "WAYPOINT_SEARCH_SEED");

    let planner = &mut config.planner;
    override_parsed(&mut planner.max_action_len, "WAYPOINT_PLANNER_MAX_ACTION_LEN");
    override_parsed(
        &mut planner.insight_confidence_threshold,
        "WAYPOINT_PLANNER_INSIGHT_CONFIDENCE_THRESHOLD",
    );
    override_string(&mut planner.fallback_message, "WAYPOINT_PLANNER_FALLBACK_MESSAGE");

    config
}
