//! MCTS configuration parameters.

use std::collections::BTreeMap;

use engine_config::SearchConfig;

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Number of exploration cycles (select, expand, simulate, backpropagate)
    /// to run per search.
    pub num_cycles: u32,

    /// Exploration constant for the UCB formula.
    /// Higher values encourage exploration, lower values favor exploitation.
    /// Defaults to 1.41, sqrt(2) rounded.
    pub exploration_constant: f64,

    /// Per-attribute weights for the preference bonus. Keys that are not
    /// attributes of the decision state are ignored.
    pub preference_weights: BTreeMap<String, f64>,

    /// Embedding of the goal the user is steering toward. When present along
    /// with the state embedding, adds a similarity bonus to every score.
    pub goal_embedding: Option<Vec<f64>>,

    /// Maximum number of ranked paths to extract after search.
    pub max_paths: usize,

    /// Minimum step budget for a rollout. The budget is raised to the number
    /// of remaining actions, so only an environment that stops progressing
    /// exceeds it; that cycle is then skipped.
    pub max_rollout_depth: u32,

    /// Seed for the search RNG. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_cycles: 100,
            exploration_constant: 1.41,
            preference_weights: BTreeMap::new(),
            goal_embedding: None,
            max_paths: 3,
            max_rollout_depth: 256,
            seed: None,
        }
    }
}

impl MctsConfig {
    /// Create a fast, deterministic config for testing.
    pub fn for_testing() -> Self {
        Self {
            num_cycles: 50,
            seed: Some(42),
            ..Self::default()
        }
    }

    /// Build from the central `[search]` section. Context bonuses are per
    /// request and start empty.
    pub fn from_central(search: &SearchConfig) -> Self {
        Self {
            num_cycles: search.num_cycles,
            exploration_constant: search.exploration_constant,
            max_paths: search.max_paths,
            max_rollout_depth: search.max_rollout_depth,
            seed: search.seed,
            ..Self::default()
        }
    }

    /// Builder pattern: set number of exploration cycles.
    pub fn with_cycles(mut self, n: u32) -> Self {
        self.num_cycles = n;
        self
    }

    /// Builder pattern: set the UCB exploration constant.
    pub fn with_exploration_constant(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    /// Builder pattern: set preference weights.
    pub fn with_preference_weights<I, K>(mut self, weights: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        self.preference_weights = weights.into_iter().map(|(k, w)| (k.into(), w)).collect();
        self
    }

    /// Builder pattern: set the goal embedding.
    pub fn with_goal_embedding(mut self, embedding: Vec<f64>) -> Self {
        self.goal_embedding = Some(embedding);
        self
    }

    /// Builder pattern: set how many ranked paths to extract.
    pub fn with_max_paths(mut self, n: usize) -> Self {
        self.max_paths = n;
        self
    }

    /// Builder pattern: set the rollout depth cap.
    pub fn with_max_rollout_depth(mut self, depth: u32) -> Self {
        self.max_rollout_depth = depth;
        self
    }

    /// Builder pattern: seed the search RNG.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
