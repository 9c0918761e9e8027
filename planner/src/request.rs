//! Inbound planning request and the retrieval context that travels with it.

use std::collections::BTreeMap;

use decision_core::{Constraints, StateDraft};
use serde::{Deserialize, Serialize};

/// A document or past plan retrieved from the vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalHit {
    pub id: String,
    /// Similarity score from the store
    pub score: f64,
    pub text: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    Behavior,
    Preference,
    Goal,
    Pattern,
}

/// Something the memory layer has learned about the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryInsight {
    pub category: InsightCategory,
    pub description: String,
    pub confidence: f64,
}

/// Everything the planner receives for one request.
///
/// Only `state` reaches the search engine. `contexts` and `insights` are
/// handed to the action generator; `constraints` ride along with the
/// environment. `state` is validated by the planner, not on parse, so an
/// out-of-range attribute still gets a fallback answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningRequest {
    pub state: StateDraft,
    #[serde(default)]
    pub contexts: Vec<RetrievalHit>,
    #[serde(default)]
    pub insights: Vec<MemoryInsight>,
    #[serde(default)]
    pub constraints: Constraints,
    /// Per-attribute preference weights for the selection bonus
    #[serde(default)]
    pub preference_weights: BTreeMap<String, f64>,
    /// Embedding of the user's goal for the similarity bonus
    #[serde(default)]
    pub goal_embedding: Option<Vec<f64>>,
}

impl PlanningRequest {
    pub fn new(state: impl Into<StateDraft>) -> Self {
        Self {
            state: state.into(),
            contexts: Vec::new(),
            insights: Vec::new(),
            constraints: Constraints::new(),
            preference_weights: BTreeMap::new(),
            goal_embedding: None,
        }
    }

    /// Insights confident enough to forward, in request order.
    pub fn confident_insights(&self, threshold: f64) -> Vec<MemoryInsight> {
        self.insights
            .iter()
            .filter(|insight| insight.confidence > threshold)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decision_core::DecisionState;

    fn insight(confidence: f64) -> MemoryInsight {
        MemoryInsight {
            category: InsightCategory::Pattern,
            description: format!("seen at {confidence}"),
            confidence,
        }
    }

    #[test]
    fn test_confident_insights_threshold_is_strict() {
        let state = DecisionState::new("d", Vec::<(String, f64)>::new(), vec![]).unwrap();
        let mut request = PlanningRequest::new(state);
        request.insights = vec![insight(0.9), insight(0.7), insight(0.2), insight(0.71)];

        let kept = request.confident_insights(0.7);
        let confidences: Vec<f64> = kept.iter().map(|i| i.confidence).collect();
        assert_eq!(confidences, vec![0.9, 0.71]);
    }

    #[test]
    fn test_deserialize_minimal_request() {
        let json = r#"{"state": {"description": "pick a college", "attributes": {"risk": 0.2}}}"#;
        let request: PlanningRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.state.description, "pick a college");
        let state = request.state.build().unwrap();
        assert_eq!(state.attribute("risk"), Some(0.2));
        assert_eq!(state.attribute("importance"), Some(0.5));
        assert!(request.contexts.is_empty());
        assert!(request.insights.is_empty());
        assert!(request.goal_embedding.is_none());
    }

    #[test]
    fn test_deserialize_full_request() {
        let json = r#"{
            "state": {"description": "d", "embedding": [0.1, 0.2]},
            "contexts": [{"id": "doc-1", "score": 0.83, "text": "past plan"}],
            "insights": [{"category": "goal", "description": "wants to ship", "confidence": 0.9}],
            "constraints": {"budget": 500},
            "preference_weights": {"importance": 1.0}
        }"#;
        let request: PlanningRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.contexts[0].id, "doc-1");
        assert!(request.contexts[0].metadata.is_empty());
        assert_eq!(request.insights[0].category, InsightCategory::Goal);
        assert_eq!(request.constraints["budget"], 500);
        assert_eq!(request.preference_weights.get("importance"), Some(&1.0));
    }

    #[test]
    fn test_out_of_range_attribute_parses_but_fails_validation() {
        let json = r#"{"state": {"description": "d", "attributes": {"risk": 1.5}}}"#;
        let request: PlanningRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.state.attributes.get("risk"), Some(&1.5));
        assert!(request.state.build().is_err());
    }
}
