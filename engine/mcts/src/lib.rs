//! Monte Carlo Tree Search over sequences of candidate actions.
//!
//! The search explores orderings of the actions a user could take next and
//! ranks the most promising paths. It works on any
//! [`decision_core::Environment`].
//!
//! # Overview
//!
//! Each exploration cycle consists of four phases:
//!
//! 1. **Selection**: Descend from the root, always taking the child with the
//!    highest score (UCB1 plus the context bonuses), until reaching a leaf
//! 2. **Expansion**: A leaf that has already been visited gets one child per
//!    action still available in its environment
//! 3. **Simulation**: Play random actions from a fork of the chosen node's
//!    environment until the action budget is used up, summing rewards
//! 4. **Backpropagation**: Update visit counts and accumulated reward from
//!    the simulated node up to the root
//!
//! # Usage
//!
//! ```rust,ignore
//! use decision_core::{Constraints, DecisionState, Environment};
//! use mcts::{run_mcts, MctsConfig};
//!
//! let state = DecisionState::new(
//!     "win the largest hackathon in the US",
//!     [("risk", 0.8), ("time-constraint", 0.3), ("importance", 0.6)],
//!     vec![0.1, 0.3, 0.5],
//! )?
//! .with_actions(&["ship_fast", "research_more"])?;
//! let env = Environment::new(state, Constraints::new())?;
//!
//! let (paths, report) = run_mcts(env, MctsConfig::default().with_seed(42));
//! for ranked in paths {
//!     println!("{:?} (visits: {})", ranked.path, ranked.visits);
//! }
//! println!("completed {} cycles", report.cycles_completed);
//! ```
//!
//! # Configuration
//!
//! The [`MctsConfig`] struct controls search behavior:
//!
//! - `num_cycles`: Exploration cycles per search (default: 100)
//! - `exploration_constant`: UCB1 exploration weight (default: 1.41)
//! - `goal_embedding` / `preference_weights`: Optional context bonuses
//! - `max_paths`: Ranked paths to extract (default: 3)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                       MctsSearch                        │
//! ├─────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐  ┌──────────────┐  ┌────────────────┐  │
//! │  │  MctsTree   │  │ Environment  │  │  ScoreContext  │  │
//! │  │  (arena)    │  │ (per node)   │  │ (UCB + bonus)  │  │
//! │  └──────┬──────┘  └──────┬───────┘  └───────┬────────┘  │
//! │         │                │                  │           │
//! │         ▼                ▼                  ▼           │
//! │  ┌───────────────────────────────────────────────────┐  │
//! │  │      select → expand → simulate → backpropagate   │  │
//! │  └───────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod node;
pub mod scoring;
pub mod search;
pub mod tree;

// Re-export main types
pub use config::MctsConfig;
pub use node::{MctsNode, NodeId};
pub use scoring::{cosine_similarity, preference_bonus, ScoreContext, EMBEDDING_BONUS_WEIGHT};
pub use search::{run_mcts, MctsSearch, SearchError, SearchPhase, SearchReport};
pub use tree::{MctsTree, RankedPath, TreeStats};
