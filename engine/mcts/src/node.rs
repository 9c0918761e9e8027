//! MCTS tree node representation.
//!
//! Each node represents the world reached by taking an action from the parent.
//! Nodes own their environment fork and store the visit statistics used for
//! UCB selection and path ranking.

use decision_core::Environment;

use crate::scoring::{preference_bonus, ScoreContext};

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the MCTS tree.
#[derive(Debug, Clone)]
pub struct MctsNode {
    /// Parent node index (None for root)
    pub parent: Option<NodeId>,

    /// Action that led to this node from parent (None for root)
    pub action: Option<String>,

    /// Environment fork as of this node
    pub environment: Environment,

    /// Number of simulation passes that touched this node
    pub visits: u32,

    /// Accumulated reward. Ancestors accumulate the simulated descendant's
    /// running total, not the single rollout reward (see `MctsTree::backpropagate`).
    pub wins: f64,

    /// Whether the environment has used up its action budget
    pub terminal: bool,

    /// Children: Vec of (action, NodeId) pairs in creation order.
    /// Empty until node is expanded.
    pub children: Vec<(String, NodeId)>,
}

impl MctsNode {
    /// Create a new root node.
    pub fn new_root(environment: Environment) -> Self {
        let terminal = environment.is_terminal();
        Self {
            parent: None,
            action: None,
            environment,
            visits: 0,
            wins: 0.0,
            terminal,
            children: Vec::new(),
        }
    }

    /// Create a new child node.
    pub fn new_child(parent: NodeId, action: String, environment: Environment, terminal: bool) -> Self {
        Self {
            parent: Some(parent),
            action: Some(action),
            environment,
            visits: 0,
            wins: 0.0,
            terminal,
            children: Vec::new(),
        }
    }

    /// Mean reward `wins / visits`. Returns 0.0 if never visited.
    #[inline]
    pub fn mean_value(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.wins / f64::from(self.visits)
        }
    }

    /// Selection score.
    ///
    /// Unvisited nodes score `+inf` so they are always tried first. Otherwise
    /// the score is UCB1 plus the context bonuses:
    ///
    /// ```text
    /// wins/N + c * sqrt(ln(N_parent) / N)
    ///        + 0.5 * cos(state_embedding, goal_embedding)   (when both exist)
    ///        + sum(attributes[k] * preference_weights[k])
    /// ```
    ///
    /// The exploitation term is [`mean_value`](Self::mean_value): `wins` is the
    /// accumulated reward total, so it is divided by `N` exactly once. Reading
    /// a per-node "value" as already averaged and dividing it again would
    /// under-weight well-visited nodes.
    ///
    /// `parent_visits` is `None` for the root, which then has no exploration term.
    pub fn score(&self, parent_visits: Option<u32>, ctx: &ScoreContext<'_>) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }

        let visits = f64::from(self.visits);
        let exploitation = self.mean_value();
        let exploration = parent_visits.map_or(0.0, |n| {
            ctx.exploration_constant * (f64::from(n).ln() / visits).sqrt()
        });

        let decision = self.environment.decision();
        let embedding_bonus = ctx.embedding_bonus(decision.embedding());
        let preference = preference_bonus(decision.attributes(), ctx.preference_weights);

        exploitation + exploration + embedding_bonus + preference
    }

    /// Child reached by `action`, if it has been created.
    pub fn child(&self, action: &str) -> Option<NodeId> {
        self.children
            .iter()
            .find(|(a, _)| a == action)
            .map(|(_, id)| *id)
    }

    /// Check if this node has been expanded (has children).
    #[inline]
    pub fn is_expanded(&self) -> bool {
        !self.children.is_empty()
    }

    /// Get the most visited child. Ties go to the earliest-created child.
    /// Returns None if there are no children.
    pub fn best_child_by_visits<'a>(&self, arena: &'a [MctsNode]) -> Option<(NodeId, &'a MctsNode)> {
        self.children
            .iter()
            .map(|(_, id)| (*id, &arena[id.index()]))
            .fold(None, |best, (id, node)| match best {
                Some((_, b)) if b.visits >= node.visits => best,
                _ => Some((id, node)),
            })
    }
}
