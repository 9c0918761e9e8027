//! Core types for the Waypoint decision planner
//!
//! This crate provides the two leaf components the search engine plans over:
//! - `DecisionState`: the user's situation, preference weights and per-action
//!   classification
//! - `Environment`: the transition/reward model that simulates taking an
//!   action from a given point on a path
//!
//! Everything here is synchronous and fully resolved; collaborator calls that
//! produce the description, embedding and action list happen upstream.

pub mod environment;
pub mod state;

// Re-export main types for convenience
pub use environment::{Constraints, Environment, EnvironmentError, ImpactFactors, PathState, StepResult};
pub use state::{
    ActionMetadata, DecisionState, StateDraft, StateError, DEFAULT_ATTRIBUTE_WEIGHT, IMPORTANCE,
    RECOGNIZED_ATTRIBUTES, RISK, TIME_CONSTRAINT,
};
