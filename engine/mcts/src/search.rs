//! MCTS search implementation.
//!
//! Implements the core MCTS loop, one exploration cycle at a time:
//! 1. Selection: Traverse the tree by score to find a leaf
//! 2. Expansion: Expand a leaf that has been visited before
//! 3. Simulation: Random rollout to the end of the action budget
//! 4. Backpropagation: Update statistics from the simulated node to the root
//!
//! A cycle that fails is skipped and counted; the remaining budget still runs.

use decision_core::{Environment, EnvironmentError};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::config::MctsConfig;
use crate::node::NodeId;
use crate::scoring::ScoreContext;
use crate::tree::{MctsTree, RankedPath, TreeStats};

/// Errors that can occur inside an exploration cycle.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Environment error: {0}")]
    Environment(#[from] EnvironmentError),

    #[error("Rollout exceeded {0} steps without reaching a terminal state")]
    RolloutTooDeep(u32),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Where the engine is within an exploration cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchPhase {
    Idle,
    Selecting,
    Expanding,
    Simulating,
    Backpropagating,
    Done,
}

/// Summary of a completed search run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    /// Cycles that ran through backpropagation
    pub cycles_completed: u32,
    /// Cycles abandoned after an error
    pub cycles_skipped: u32,
    pub stats: TreeStats,
}

/// MCTS search state.
pub struct MctsSearch {
    tree: MctsTree,
    config: MctsConfig,
    rng: ChaCha20Rng,
    phase: SearchPhase,
    cycles_completed: u32,
    cycles_skipped: u32,
}

impl std::fmt::Debug for MctsSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MctsSearch")
            .field("nodes", &self.tree.len())
            .field("phase", &self.phase)
            .field("cycles_completed", &self.cycles_completed)
            .field("cycles_skipped", &self.cycles_skipped)
            .finish()
    }
}

impl MctsSearch {
    /// Create a new search with a fresh root over `environment`.
    ///
    /// The RNG is seeded from `config.seed`, or from entropy when unset.
    pub fn new(environment: Environment, config: MctsConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        };
        Self::with_rng(environment, config, rng)
    }

    /// Create a new search driven by an explicit RNG.
    pub fn with_rng(environment: Environment, config: MctsConfig, rng: ChaCha20Rng) -> Self {
        Self {
            tree: MctsTree::new(environment),
            config,
            rng,
            phase: SearchPhase::Idle,
            cycles_completed: 0,
            cycles_skipped: 0,
        }
    }

    /// Run the configured number of exploration cycles.
    pub fn run(&mut self) -> SearchReport {
        self.run_cycles(self.config.num_cycles)
    }

    /// Run `cycles` exploration cycles, skipping any that fail.
    ///
    /// Leaves the engine in [`SearchPhase::Done`]. Counts accumulate across
    /// calls.
    pub fn run_cycles(&mut self, cycles: u32) -> SearchReport {
        for cycle in 0..cycles {
            match self.explore() {
                Ok(()) => self.cycles_completed += 1,
                Err(e) => {
                    self.phase = SearchPhase::Idle;
                    self.cycles_skipped += 1;
                    warn!(cycle, error = %e, "Exploration cycle skipped");
                }
            }
        }
        self.phase = SearchPhase::Done;

        let report = self.report();
        debug!(
            completed = report.cycles_completed,
            skipped = report.cycles_skipped,
            nodes = report.stats.total_nodes,
            max_depth = report.stats.max_depth,
            "MCTS search finished"
        );
        report
    }

    /// Run a single exploration cycle (select -> expand -> simulate -> backpropagate).
    pub fn explore(&mut self) -> Result<(), SearchError> {
        // Selection: traverse to a leaf of the explored tree
        self.phase = SearchPhase::Selecting;
        let leaf = self.select();

        // A leaf seen for the first time is simulated as is. Otherwise expand
        // it and simulate one of the new children, or the leaf itself when it
        // is terminal.
        let target = if self.tree.get(leaf).visits == 0 {
            leaf
        } else {
            self.phase = SearchPhase::Expanding;
            let created = self.tree.expand(leaf)?;
            match created.choose(&mut self.rng) {
                Some(&child) => child,
                None if self.tree.get(leaf).terminal => leaf,
                None => {
                    return Err(SearchError::InvalidState(format!(
                        "non-terminal leaf {} expanded to no children",
                        leaf.0
                    )))
                }
            }
        };

        self.phase = SearchPhase::Simulating;
        let reward = self.rollout(target)?;

        self.phase = SearchPhase::Backpropagating;
        self.tree.backpropagate(target, reward);
        self.phase = SearchPhase::Idle;

        trace!(
            leaf = leaf.0,
            target = target.0,
            reward,
            "MCTS cycle complete"
        );

        Ok(())
    }

    /// Select a leaf by repeatedly moving to the highest-scoring child.
    fn select(&mut self) -> NodeId {
        let ctx = ScoreContext::from_config(&self.config);
        let mut current = self.tree.root();

        while let Some(child) = self.tree.select_child(current, &ctx, &mut self.rng) {
            current = child;
        }

        current
    }

    /// Play random actions from a fork of the node's environment until the
    /// action budget is spent, returning the summed reward.
    fn rollout(&mut self, node_id: NodeId) -> Result<f64, SearchError> {
        let node = self.tree.get(node_id);
        if node.terminal {
            return Ok(0.0);
        }

        let mut environment = node.environment.fork();
        let budget = rollout_budget(&environment, self.config.max_rollout_depth);
        let mut total = 0.0;
        let mut depth = 0;

        while !environment.is_terminal() {
            if depth >= budget {
                return Err(SearchError::RolloutTooDeep(depth));
            }
            let action = environment.random_action(&mut self.rng)?.to_string();
            let (next, reward) = environment.advance(&action)?;
            environment = next;
            total += reward;
            depth += 1;
        }

        Ok(total)
    }

    /// Ranked action paths, best first, capped at `config.max_paths`.
    /// Empty when the root was never expanded.
    pub fn best_paths(&self) -> Vec<RankedPath> {
        self.tree.best_paths(self.config.max_paths)
    }

    pub fn report(&self) -> SearchReport {
        SearchReport {
            cycles_completed: self.cycles_completed,
            cycles_skipped: self.cycles_skipped,
            stats: self.tree.stats(),
        }
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Get the search tree (for inspection/debugging).
    pub fn tree(&self) -> &MctsTree {
        &self.tree
    }
}

/// Step budget for a rollout from `environment`: the configured cap, raised
/// to the number of actions still available. A progressing environment
/// therefore always finishes; only one that stops advancing trips the cap.
fn rollout_budget(environment: &Environment, max_rollout_depth: u32) -> u32 {
    let remaining = environment
        .possible_actions()
        .len()
        .saturating_sub(environment.history().len());
    max_rollout_depth.max(u32::try_from(remaining).unwrap_or(u32::MAX))
}

/// Convenience function to run a single search and extract its paths.
pub fn run_mcts(environment: Environment, config: MctsConfig) -> (Vec<RankedPath>, SearchReport) {
    let mut search = MctsSearch::new(environment, config);
    let report = search.run();
    (search.best_paths(), report)
}
