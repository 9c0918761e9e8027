//! MCTS tree structure with arena allocation.
//!
//! The tree uses arena allocation for node storage. Nodes are stored in a
//! contiguous Vec and referenced by NodeId indices, so parent links are plain
//! indices and backpropagation is an index walk.

use decision_core::{Environment, EnvironmentError};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::node::{MctsNode, NodeId};
use crate::scoring::ScoreContext;

/// MCTS tree with arena-based node storage.
#[derive(Debug)]
pub struct MctsTree {
    /// Arena storing all nodes
    nodes: Vec<MctsNode>,

    /// Root node index (always 0 after initialization)
    root: NodeId,
}

/// One recommended action sequence with the statistics it was ranked by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPath {
    /// Actions from the root, in order
    pub path: Vec<String>,
    /// Visits of the path's first node
    pub visits: u32,
    /// Accumulated wins of the path's first node
    pub aggregated_wins: f64,
    /// `aggregated_wins / visits` of the path's first node
    pub mean_value: f64,
    /// Whether the walk ended on a terminal node
    pub terminal: bool,
}

impl MctsTree {
    /// Create a new tree rooted at the given environment.
    pub fn new(environment: Environment) -> Self {
        Self {
            nodes: vec![MctsNode::new_root(environment)],
            root: NodeId(0),
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.index()]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode {
        &mut self.nodes[id.index()]
    }

    /// Allocate a new node and return its ID.
    pub fn allocate(&mut self, node: MctsNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (should never be true after construction).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the arena slice for read access.
    #[inline]
    pub fn arena(&self) -> &[MctsNode] {
        &self.nodes
    }

    /// Add a child to a parent node.
    /// Returns the new child's NodeId.
    pub fn add_child(
        &mut self,
        parent_id: NodeId,
        action: String,
        environment: Environment,
        terminal: bool,
    ) -> NodeId {
        let child = MctsNode::new_child(parent_id, action.clone(), environment, terminal);
        let child_id = self.allocate(child);

        // Add to parent's children
        self.get_mut(parent_id).children.push((action, child_id));

        child_id
    }

    /// Expand a node with one child per action that has no child yet.
    ///
    /// Every child wraps a fresh fork of the parent environment advanced by
    /// its action. Terminal nodes are never expanded, and re-expanding an
    /// expanded node creates nothing. Returns the newly created children.
    pub fn expand(&mut self, node_id: NodeId) -> Result<Vec<NodeId>, EnvironmentError> {
        let node = self.get(node_id);
        if node.terminal {
            return Ok(Vec::new());
        }

        // Step every missing action before touching the arena so a failed
        // step leaves the node as it was.
        let pending = node
            .environment
            .possible_actions()
            .iter()
            .filter(|action| node.child(action).is_none())
            .map(|action| -> Result<(String, Environment), EnvironmentError> {
                let (environment, _) = node.environment.advance(action)?;
                Ok((action.clone(), environment))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pending
            .into_iter()
            .map(|(action, environment)| {
                let terminal = environment.is_terminal();
                self.add_child(node_id, action, environment, terminal)
            })
            .collect())
    }

    /// Select the best-scoring child of a node.
    ///
    /// Children tied at the maximum score are chosen between uniformly at
    /// random. NaN scores never win. Returns None if the node has no children.
    pub fn select_child<R: Rng + ?Sized>(
        &self,
        node_id: NodeId,
        ctx: &ScoreContext<'_>,
        rng: &mut R,
    ) -> Option<NodeId> {
        let node = self.get(node_id);
        let parent_visits = Some(node.visits);

        let scored: Vec<(NodeId, f64)> = node
            .children
            .iter()
            .map(|(_, id)| {
                let score = self.get(*id).score(parent_visits, ctx);
                (*id, if score.is_nan() { f64::NEG_INFINITY } else { score })
            })
            .collect();

        let best = scored
            .iter()
            .map(|(_, score)| *score)
            .fold(f64::NEG_INFINITY, f64::max);

        let tied: Vec<NodeId> = scored
            .into_iter()
            .filter(|(_, score)| *score == best)
            .map(|(id, _)| id)
            .collect();

        tied.choose(rng).copied()
    }

    /// Backpropagate a rollout reward from the simulated node to the root.
    ///
    /// The simulated node adds the reward to its wins. Every ancestor then
    /// adds the simulated node's *total* wins after that update, not the
    /// single reward, so ancestor wins grow faster than a mean-reward backup
    /// would. Rankings depend on this rule; keep it as is.
    pub fn backpropagate(&mut self, node_id: NodeId, reward: f64) {
        let simulated = self.get_mut(node_id);
        simulated.wins += reward;
        simulated.visits += 1;

        let total_wins = simulated.wins;
        let mut current = simulated.parent;

        while let Some(id) = current {
            let node = self.get_mut(id);
            node.visits += 1;
            node.wins += total_wins;
            current = node.parent;
        }
    }

    /// Extract up to `max_paths` ranked action paths.
    ///
    /// Root children are ranked by visit count (ties keep creation order).
    /// From each, the path follows the most-visited child until a leaf or
    /// terminal node. The first path is therefore the greedy highest-visit
    /// walk from the root. A root without children yields no paths.
    pub fn best_paths(&self, max_paths: usize) -> Vec<RankedPath> {
        let mut heads: Vec<NodeId> = self
            .get(self.root)
            .children
            .iter()
            .map(|(_, id)| *id)
            .collect();

        // Stable sort keeps creation order among equal visit counts
        heads.sort_by(|a, b| self.get(*b).visits.cmp(&self.get(*a).visits));

        heads
            .into_iter()
            .take(max_paths)
            .map(|head| self.walk_from(head))
            .collect()
    }

    fn walk_from(&self, head_id: NodeId) -> RankedPath {
        let head = self.get(head_id);
        let mut path: Vec<String> = head.action.iter().cloned().collect();
        let mut current = head;

        while !current.terminal {
            match current.best_child_by_visits(&self.nodes) {
                Some((_, child)) => {
                    path.extend(child.action.iter().cloned());
                    current = child;
                }
                None => break,
            }
        }

        RankedPath {
            path,
            visits: head.visits,
            aggregated_wins: head.wins,
            mean_value: head.mean_value(),
            terminal: current.terminal,
        }
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visits,
            root_value: root.mean_value(),
            max_depth: self.compute_max_depth(self.root, 0),
        }
    }

    fn compute_max_depth(&self, node_id: NodeId, current_depth: u32) -> u32 {
        let node = self.get(node_id);
        if node.children.is_empty() {
            return current_depth;
        }

        node.children
            .iter()
            .map(|(_, id)| self.compute_max_depth(*id, current_depth + 1))
            .max()
            .unwrap_or(current_depth)
    }
}

/// Statistics about an MCTS tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub root_value: f64,
    pub max_depth: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MctsConfig;
    use decision_core::{Constraints, DecisionState};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn environment(actions: &[&str]) -> Environment {
        let state = DecisionState::new(
            "win the hackathon",
            [("risk", 0.8), ("time-constraint", 0.3), ("importance", 0.6)],
            vec![],
        )
        .unwrap()
        .with_actions(actions)
        .unwrap();
        Environment::new(state, Constraints::new()).unwrap()
    }

    #[test]
    fn test_new_tree() {
        let tree = MctsTree::new(environment(&["ship_fast", "research_more"]));

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), NodeId(0));

        let root = tree.get(tree.root());
        assert!(root.parent.is_none());
        assert!(!root.terminal);
    }

    #[test]
    fn test_expand_creates_one_child_per_action() {
        let mut tree = MctsTree::new(environment(&["ship_fast", "research_more"]));
        let created = tree.expand(tree.root()).unwrap();

        assert_eq!(created.len(), 2);
        assert_eq!(tree.len(), 3);

        let root = tree.get(tree.root());
        for (action, id) in &root.children {
            let child = tree.get(*id);
            assert_eq!(child.parent, Some(tree.root()));
            assert_eq!(child.action.as_deref(), Some(action.as_str()));
            // Child environment is the parent's advanced by exactly its action
            assert_eq!(child.environment.history(), &[action.clone()]);
            assert!(!child.terminal);
        }
        // Parent environment untouched
        assert!(root.environment.history().is_empty());
    }

    #[test]
    fn test_expand_is_idempotent() {
        let mut tree = MctsTree::new(environment(&["ship_fast", "research_more"]));
        tree.expand(tree.root()).unwrap();

        let created = tree.expand(tree.root()).unwrap();
        assert!(created.is_empty());
        assert_eq!(tree.get(tree.root()).children.len(), 2);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_expand_terminal_is_noop() {
        let mut tree = MctsTree::new(environment(&["only"]));
        let created = tree.expand(tree.root()).unwrap();
        assert_eq!(created.len(), 1);

        let child = created[0];
        assert!(tree.get(child).terminal);

        assert!(tree.expand(child).unwrap().is_empty());
        assert!(tree.get(child).children.is_empty());
    }

    #[test]
    fn test_children_do_not_share_history() {
        let mut tree = MctsTree::new(environment(&["ship_fast", "research_more"]));
        let created = tree.expand(tree.root()).unwrap();

        let a = tree.get(created[0]).environment.history().as_ptr();
        let b = tree.get(created[1]).environment.history().as_ptr();
        assert_ne!(a, b);
    }

    #[test]
    fn test_backpropagate_cumulative_rule() {
        let mut tree = MctsTree::new(environment(&["a", "b", "c"]));
        let child = tree.expand(tree.root()).unwrap()[0];
        let grandchild = tree.expand(child).unwrap()[0];

        tree.backpropagate(grandchild, 1.0);
        assert_eq!(tree.get(grandchild).visits, 1);
        assert_eq!(tree.get(child).visits, 1);
        assert_eq!(tree.get(tree.root()).visits, 1);
        assert!((tree.get(tree.root()).wins - 1.0).abs() < 1e-12);

        // Second pass: grandchild total is now 3.0 and every ancestor adds
        // that running total, not the 2.0 reward.
        tree.backpropagate(grandchild, 2.0);
        assert!((tree.get(grandchild).wins - 3.0).abs() < 1e-12);
        assert!((tree.get(child).wins - 4.0).abs() < 1e-12);
        assert!((tree.get(tree.root()).wins - 4.0).abs() < 1e-12);
        assert_eq!(tree.get(tree.root()).visits, 2);

        // An incremental backup would have given the root 3.0
        assert!((tree.get(tree.root()).wins - 3.0).abs() > 0.5);
    }

    #[test]
    fn test_select_child_prefers_unvisited() {
        let mut tree = MctsTree::new(environment(&["a", "b"]));
        let created = tree.expand(tree.root()).unwrap();
        tree.backpropagate(created[0], 1.0);

        let config = MctsConfig::default();
        let ctx = ScoreContext::from_config(&config);
        let mut rng = ChaCha20Rng::seed_from_u64(1);

        for _ in 0..16 {
            assert_eq!(tree.select_child(tree.root(), &ctx, &mut rng), Some(created[1]));
        }
    }

    #[test]
    fn test_select_child_breaks_ties_randomly() {
        let mut tree = MctsTree::new(environment(&["a", "b", "c"]));
        tree.expand(tree.root()).unwrap();

        let config = MctsConfig::default();
        let ctx = ScoreContext::from_config(&config);
        let mut rng = ChaCha20Rng::seed_from_u64(3);

        // All children unvisited: every one of them must come up
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..64 {
            seen.insert(tree.select_child(tree.root(), &ctx, &mut rng).unwrap());
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_select_child_without_children() {
        let tree = MctsTree::new(environment(&["a"]));
        let config = MctsConfig::default();
        let ctx = ScoreContext::from_config(&config);
        let mut rng = ChaCha20Rng::seed_from_u64(0);

        assert_eq!(tree.select_child(tree.root(), &ctx, &mut rng), None);
    }

    #[test]
    fn test_best_paths_empty_root() {
        let tree = MctsTree::new(environment(&["a", "b"]));
        assert!(tree.best_paths(3).is_empty());
    }

    #[test]
    fn test_best_paths_follow_visits() {
        let mut tree = MctsTree::new(environment(&["a", "b"]));
        let children = tree.expand(tree.root()).unwrap();
        let (a, b) = (children[0], children[1]);
        let grandchildren = tree.expand(b).unwrap();

        tree.get_mut(a).visits = 2;
        tree.get_mut(b).visits = 5;
        tree.get_mut(b).wins = 1.5;
        tree.get_mut(grandchildren[0]).visits = 1;
        tree.get_mut(grandchildren[1]).visits = 4;

        let paths = tree.best_paths(3);
        assert_eq!(paths.len(), 2);

        assert_eq!(paths[0].path, vec!["b".to_string(), "b".to_string()]);
        assert_eq!(paths[0].visits, 5);
        assert!((paths[0].aggregated_wins - 1.5).abs() < 1e-12);
        assert!((paths[0].mean_value - 0.3).abs() < 1e-12);
        assert!(paths[0].terminal);

        assert_eq!(paths[1].path, vec!["a".to_string()]);
        assert!(!paths[1].terminal);

        assert_eq!(tree.best_paths(1).len(), 1);
    }

    #[test]
    fn test_tree_stats() {
        let mut tree = MctsTree::new(environment(&["a", "b"]));
        let children = tree.expand(tree.root()).unwrap();
        tree.expand(children[0]).unwrap();
        tree.backpropagate(children[0], 0.5);

        let stats = tree.stats();
        assert_eq!(stats.total_nodes, 5);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.root_visits, 1);
        assert!((stats.root_value - 0.5).abs() < 1e-12);
    }
}
