//! Context-aware bonuses layered on top of UCB1.
//!
//! Plain UCB1 knows nothing about the decision. Two optional terms bias it
//! toward branches that fit the user: semantic similarity between the state
//! and a goal embedding, and a weighted sum over the preference attributes.

use std::collections::BTreeMap;

use crate::config::MctsConfig;

/// Scale applied to the cosine similarity between state and goal embeddings.
pub const EMBEDDING_BONUS_WEIGHT: f64 = 0.5;

/// Cosine similarity of two vectors.
///
/// Returns `None` when either vector is empty, the lengths differ, or either
/// has zero norm.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0, 0.0, 0.0), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some(dot / denom)
}

/// `sum(attributes[k] * weights[k])` over keys present in both maps.
pub fn preference_bonus(attributes: &BTreeMap<String, f64>, weights: &BTreeMap<String, f64>) -> f64 {
    weights
        .iter()
        .filter_map(|(key, weight)| attributes.get(key).map(|value| value * weight))
        .sum()
}

/// Search-wide inputs to node scoring. Borrowed from the config for the
/// duration of one selection pass.
#[derive(Debug, Clone, Copy)]
pub struct ScoreContext<'a> {
    pub exploration_constant: f64,
    pub goal_embedding: Option<&'a [f64]>,
    pub preference_weights: &'a BTreeMap<String, f64>,
}

impl<'a> ScoreContext<'a> {
    pub fn from_config(config: &'a MctsConfig) -> Self {
        Self {
            exploration_constant: config.exploration_constant,
            goal_embedding: config.goal_embedding.as_deref(),
            preference_weights: &config.preference_weights,
        }
    }

    /// Embedding bonus for a state, or 0.0 when no similarity is available.
    pub fn embedding_bonus(&self, state_embedding: &[f64]) -> f64 {
        self.goal_embedding
            .and_then(|goal| cosine_similarity(state_embedding, goal))
            .map_or(0.0, |similarity| similarity * EMBEDDING_BONUS_WEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]).unwrap() - 1.0).abs() < 1e-12);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap().abs() < 1e-12);
        assert!((cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_similarity_unavailable() {
        assert!(cosine_similarity(&[], &[]).is_none());
        assert!(cosine_similarity(&[1.0], &[1.0, 2.0]).is_none());
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]).is_none());
    }

    #[test]
    fn test_preference_bonus_ignores_unknown_keys() {
        let attributes: BTreeMap<String, f64> =
            [("risk".to_string(), 0.8), ("importance".to_string(), 0.6)].into();
        let weights: BTreeMap<String, f64> =
            [("risk".to_string(), 0.5), ("novelty".to_string(), 10.0)].into();

        assert!((preference_bonus(&attributes, &weights) - 0.4).abs() < 1e-12);
        assert_eq!(preference_bonus(&attributes, &BTreeMap::new()), 0.0);
    }

    #[test]
    fn test_embedding_bonus() {
        let config = MctsConfig::default().with_goal_embedding(vec![1.0, 1.0]);
        let ctx = ScoreContext::from_config(&config);

        assert!((ctx.embedding_bonus(&[2.0, 2.0]) - 0.5).abs() < 1e-12);
        assert_eq!(ctx.embedding_bonus(&[]), 0.0);

        let no_goal = MctsConfig::default();
        assert_eq!(ScoreContext::from_config(&no_goal).embedding_bonus(&[1.0, 1.0]), 0.0);
    }
}
