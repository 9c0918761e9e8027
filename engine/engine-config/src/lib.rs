//! Centralized configuration loading from config.toml.
//!
//! This crate provides configuration structs and loading logic shared
//! across all Rust components (search engine, planner CLI).
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`WAYPOINT_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! WAYPOINT_<SECTION>_<KEY>=value
//!
//! Examples:
//!     WAYPOINT_COMMON_LOG_LEVEL=debug
//!     WAYPOINT_SEARCH_NUM_CYCLES=500
//!     WAYPOINT_SEARCH_SEED=42
//!     WAYPOINT_PLANNER_MAX_ACTION_LEN=64
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{
    apply_env_overrides, load_config, load_from_path, locate_config, CONFIG_PATH_ENV,
    CONFIG_SEARCH_PATHS,
};
pub use structs::*;
