//! Transition and reward model over a classified decision state.
//!
//! An `Environment` answers "what happens if the user takes this action next":
//! it appends the action to the path history, scores it against the impact
//! factors, and reports whether the action budget is spent. Every tree node
//! owns its own fork, so speculative branches never share a history buffer.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::state::{ActionMetadata, DecisionState, StateError, IMPORTANCE, RISK, TIME_CONSTRAINT};

/// Opaque caller-supplied constraints. Carried with every fork but not read by
/// the transition logic.
pub type Constraints = serde_json::Map<String, serde_json::Value>;

/// Runtime errors from stepping an environment.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvironmentError {
    #[error("Invalid action: '{0}' is not in the action set")]
    InvalidAction(String),

    #[error("Environment is terminal after {0} actions")]
    Terminal(usize),

    #[error("No actions available")]
    NoActions,
}

/// Weights copied from the state's attributes when the environment is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImpactFactors {
    pub risk: f64,
    pub time_constraint: f64,
    pub importance: f64,
}

impl ImpactFactors {
    pub fn from_state(state: &DecisionState) -> Result<Self, StateError> {
        Ok(Self {
            risk: state.require_attribute(RISK)?,
            time_constraint: state.require_attribute(TIME_CONSTRAINT)?,
            importance: state.require_attribute(IMPORTANCE)?,
        })
    }

    /// Reward for taking an action with the given classification.
    ///
    /// Importance is always credited. A high-risk action costs `1 - risk`, so
    /// risk-averse users pay more for it; a long-term action costs the full
    /// time-constraint weight. This is a scoring policy, not a model of the
    /// world, and all actions under one state share the same flags.
    pub fn reward(&self, metadata: ActionMetadata) -> f64 {
        let mut reward = 0.0;
        if metadata.is_high_risk {
            reward -= 1.0 - self.risk;
        }
        if metadata.is_long_term {
            reward -= self.time_constraint;
        }
        reward + self.importance
    }
}

/// The world as of some point along a path: the shared decision plus the
/// actions taken so far.
#[derive(Debug, Clone, PartialEq)]
pub struct PathState {
    decision: Arc<DecisionState>,
    history: Vec<String>,
}

impl PathState {
    pub fn decision(&self) -> &DecisionState {
        &self.decision
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }
}

/// Result of a step operation
#[derive(Debug, Clone)]
pub struct StepResult {
    /// State after the action
    pub state: PathState,
    /// Reward received for the action
    pub reward: f64,
    /// Whether the resulting state has used up the action budget
    pub is_terminal: bool,
}

#[derive(Debug, Clone)]
pub struct Environment {
    state: PathState,
    possible_actions: Vec<String>,
    constraints: Constraints,
    impact_factors: ImpactFactors,
}

impl Environment {
    /// Build the root environment for a classified decision state.
    ///
    /// The action set is the key set of `action_metadata`; an unclassified
    /// state yields an empty action set and an immediately terminal
    /// environment.
    pub fn new(state: DecisionState, constraints: Constraints) -> Result<Self, StateError> {
        let impact_factors = ImpactFactors::from_state(&state)?;
        let possible_actions = state.action_metadata().keys().cloned().collect();

        Ok(Self {
            state: PathState {
                decision: Arc::new(state),
                history: Vec::new(),
            },
            possible_actions,
            constraints,
            impact_factors,
        })
    }

    /// Compute the outcome of `action` without mutating `self`.
    pub fn step(&self, action: &str) -> Result<StepResult, EnvironmentError> {
        if !self.possible_actions.iter().any(|a| a == action) {
            return Err(EnvironmentError::InvalidAction(action.to_string()));
        }
        let metadata = self
            .state
            .decision
            .metadata_for(action)
            .ok_or_else(|| EnvironmentError::InvalidAction(action.to_string()))?;

        if self.is_terminal() {
            return Err(EnvironmentError::Terminal(self.state.history.len()));
        }

        let mut history = Vec::with_capacity(self.state.history.len() + 1);
        history.extend(self.state.history.iter().cloned());
        history.push(action.to_string());
        let is_terminal = history.len() >= self.possible_actions.len();

        Ok(StepResult {
            state: PathState {
                decision: Arc::clone(&self.state.decision),
                history,
            },
            reward: self.impact_factors.reward(metadata),
            is_terminal,
        })
    }

    /// Fork this environment and advance the fork by one action.
    ///
    /// Returns the new environment and the step reward. `self` is untouched.
    pub fn advance(&self, action: &str) -> Result<(Self, f64), EnvironmentError> {
        let StepResult { state, reward, .. } = self.step(action)?;
        let mut next = self.fork();
        next.state = state;
        Ok((next, reward))
    }

    /// True once the path has taken as many actions as the action set holds.
    pub fn is_terminal(&self) -> bool {
        self.state.history.len() >= self.possible_actions.len()
    }

    /// Independent deep copy. The history buffer is always reallocated; the
    /// decision snapshot is read-only and shared.
    pub fn fork(&self) -> Self {
        Self {
            state: PathState {
                decision: Arc::clone(&self.state.decision),
                history: self.state.history.clone(),
            },
            possible_actions: self.possible_actions.clone(),
            constraints: self.constraints.clone(),
            impact_factors: self.impact_factors,
        }
    }

    /// Uniformly sample an action. Only rollouts use this.
    pub fn random_action<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&str, EnvironmentError> {
        self.possible_actions
            .choose(rng)
            .map(String::as_str)
            .ok_or(EnvironmentError::NoActions)
    }

    pub fn state(&self) -> &PathState {
        &self.state
    }

    pub fn decision(&self) -> &DecisionState {
        self.state.decision()
    }

    pub fn history(&self) -> &[String] {
        self.state.history()
    }

    pub fn possible_actions(&self) -> &[String] {
        &self.possible_actions
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn impact_factors(&self) -> ImpactFactors {
        self.impact_factors
    }
}
