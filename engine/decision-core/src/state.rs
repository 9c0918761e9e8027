//! Decision state: the snapshot of the situation a planning request reasons about.
//!
//! A `DecisionState` is built once per request from the user's description and
//! preference sliders, classified against the candidate actions, and then only
//! read for the rest of the pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Attribute key for the user's risk tolerance.
pub const RISK: &str = "risk";
/// Attribute key for how time-constrained the user is.
pub const TIME_CONSTRAINT: &str = "time-constraint";
/// Attribute key for how much the decision matters.
pub const IMPORTANCE: &str = "importance";

/// Keys every decision state carries after construction.
pub const RECOGNIZED_ATTRIBUTES: [&str; 3] = [RISK, TIME_CONSTRAINT, IMPORTANCE];

/// Weight used for a recognized attribute the caller did not set.
pub const DEFAULT_ATTRIBUTE_WEIGHT: f64 = 0.5;

/// Attribute weight above which actions are flagged high-risk / long-term.
const CLASSIFICATION_THRESHOLD: f64 = 0.5;

/// Errors raised while building or classifying a decision state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StateError {
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Per-action classification derived from the state's attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMetadata {
    pub is_high_risk: bool,
    pub is_long_term: bool,
}

/// Snapshot of the decision being planned over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StateDraft")]
pub struct DecisionState {
    description: String,
    attributes: BTreeMap<String, f64>,
    embedding: Vec<f64>,
    action_metadata: BTreeMap<String, ActionMetadata>,
}

/// Unvalidated decision state as it arrives from the translation step.
///
/// Attributes may be partial or out of range; [`StateDraft::build`] merges
/// defaults and validates. Callers that must turn bad input into a
/// user-facing answer deserialize this instead of [`DecisionState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDraft {
    pub description: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, f64>,
    #[serde(default)]
    pub embedding: Vec<f64>,
    #[serde(default)]
    pub action_metadata: BTreeMap<String, ActionMetadata>,
}

impl StateDraft {
    /// Validate into a [`DecisionState`], keeping any action metadata.
    pub fn build(self) -> Result<DecisionState, StateError> {
        let mut state = DecisionState::new(self.description, self.attributes, self.embedding)?;
        state.action_metadata = self.action_metadata;
        Ok(state)
    }

    /// Validate into an unclassified [`DecisionState`], dropping any action
    /// metadata the draft carried.
    pub fn build_unclassified(&self) -> Result<DecisionState, StateError> {
        DecisionState::new(
            self.description.clone(),
            self.attributes.clone(),
            self.embedding.clone(),
        )
    }
}

impl From<DecisionState> for StateDraft {
    fn from(state: DecisionState) -> Self {
        Self {
            description: state.description,
            attributes: state.attributes,
            embedding: state.embedding,
            action_metadata: state.action_metadata,
        }
    }
}

impl TryFrom<StateDraft> for DecisionState {
    type Error = StateError;

    fn try_from(draft: StateDraft) -> Result<Self, Self::Error> {
        draft.build()
    }
}

impl DecisionState {
    /// Build a state, merging caller attributes over the defaults.
    ///
    /// Recognized keys missing from `attributes` get
    /// [`DEFAULT_ATTRIBUTE_WEIGHT`]; caller values win key by key and unknown
    /// keys are kept. Every weight must be a finite number in `[0, 1]`.
    pub fn new<I, K>(
        description: impl Into<String>,
        attributes: I,
        embedding: Vec<f64>,
    ) -> Result<Self, StateError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut merged: BTreeMap<String, f64> = RECOGNIZED_ATTRIBUTES
            .iter()
            .map(|key| ((*key).to_string(), DEFAULT_ATTRIBUTE_WEIGHT))
            .collect();

        for (key, weight) in attributes {
            let key = key.into();
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(StateError::Configuration(format!(
                    "attribute '{key}' must be a weight in [0, 1], got {weight}"
                )));
            }
            merged.insert(key, weight);
        }

        Ok(Self {
            description: description.into(),
            attributes: merged,
            embedding,
            action_metadata: BTreeMap::new(),
        })
    }

    /// Classify `actions` and return the state, for builder-style construction.
    pub fn with_actions<S: AsRef<str>>(mut self, actions: &[S]) -> Result<Self, StateError> {
        self.classify(actions)?;
        Ok(self)
    }

    /// Populate `action_metadata` for each action.
    ///
    /// Classification reads only the attributes: an action is high-risk iff
    /// `risk > 0.5` and long-term iff `time-constraint > 0.5`, so every action
    /// of one state carries the same flags and repeated calls are no-ops.
    pub fn classify<S: AsRef<str>>(&mut self, actions: &[S]) -> Result<(), StateError> {
        let metadata = ActionMetadata {
            is_high_risk: self.require_attribute(RISK)? > CLASSIFICATION_THRESHOLD,
            is_long_term: self.require_attribute(TIME_CONSTRAINT)? > CLASSIFICATION_THRESHOLD,
        };

        for action in actions {
            self.action_metadata
                .insert(action.as_ref().to_string(), metadata);
        }

        Ok(())
    }

    /// Look up a recognized attribute, failing if it is absent.
    pub fn require_attribute(&self, key: &str) -> Result<f64, StateError> {
        self.attributes.get(key).copied().ok_or_else(|| {
            StateError::Configuration(format!("decision state is missing attribute '{key}'"))
        })
    }

    pub fn attribute(&self, key: &str) -> Option<f64> {
        self.attributes.get(key).copied()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn attributes(&self) -> &BTreeMap<String, f64> {
        &self.attributes
    }

    /// Semantic embedding of the description. Empty when the translation step
    /// could not produce one.
    pub fn embedding(&self) -> &[f64] {
        &self.embedding
    }

    pub fn action_metadata(&self) -> &BTreeMap<String, ActionMetadata> {
        &self.action_metadata
    }

    pub fn metadata_for(&self, action: &str) -> Option<ActionMetadata> {
        self.action_metadata.get(action).copied()
    }

    /// Whether `classify` has produced metadata for at least one action.
    pub fn is_classified(&self) -> bool {
        !self.action_metadata.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_defaults_fill_missing_attributes() {
        let state = DecisionState::new("pick a project", Vec::<(String, f64)>::new(), vec![]).unwrap();

        assert_eq!(state.attributes().len(), 3);
        for key in RECOGNIZED_ATTRIBUTES {
            assert!((state.attribute(key).unwrap() - DEFAULT_ATTRIBUTE_WEIGHT).abs() < 1e-12);
        }
    }

    #[test]
    fn test_caller_values_override_per_key() {
        let state =
            DecisionState::new("d", attrs(&[("risk", 0.9), ("focus", 0.2)]), vec![]).unwrap();

        assert!((state.attribute(RISK).unwrap() - 0.9).abs() < 1e-12);
        assert!((state.attribute(TIME_CONSTRAINT).unwrap() - 0.5).abs() < 1e-12);
        assert!((state.attribute(IMPORTANCE).unwrap() - 0.5).abs() < 1e-12);
        // Unknown keys are retained
        assert!((state.attribute("focus").unwrap() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_recognized_keys_stay_in_unit_range() {
        for (risk, time, importance) in [(0.0, 1.0, 0.3), (1.0, 0.0, 0.0), (0.25, 0.75, 1.0)] {
            let state = DecisionState::new(
                "d",
                attrs(&[
                    (RISK, risk),
                    (TIME_CONSTRAINT, time),
                    (IMPORTANCE, importance),
                ]),
                vec![],
            )
            .unwrap();

            let keys: Vec<_> = state.attributes().keys().map(String::as_str).collect();
            assert_eq!(keys, vec![IMPORTANCE, RISK, TIME_CONSTRAINT]);
            assert!(state
                .attributes()
                .values()
                .all(|w| (0.0..=1.0).contains(w)));
        }
    }

    #[test]
    fn test_out_of_range_weight_rejected() {
        let err = DecisionState::new("d", attrs(&[("risk", 1.5)]), vec![]).unwrap_err();
        assert!(matches!(err, StateError::Configuration(_)));

        let err = DecisionState::new("d", attrs(&[("importance", f64::NAN)]), vec![]).unwrap_err();
        assert!(matches!(err, StateError::Configuration(_)));
    }

    #[test]
    fn test_classify_flags_follow_attributes() {
        let mut state = DecisionState::new(
            "win the hackathon",
            attrs(&[(RISK, 0.8), (TIME_CONSTRAINT, 0.3), (IMPORTANCE, 0.6)]),
            vec![],
        )
        .unwrap();
        state.classify(&["ship_fast", "research_more"]).unwrap();

        for action in ["ship_fast", "research_more"] {
            let meta = state.metadata_for(action).unwrap();
            assert!(meta.is_high_risk);
            assert!(!meta.is_long_term);
        }
    }

    #[test]
    fn test_threshold_is_strict() {
        let state = DecisionState::new("d", Vec::<(String, f64)>::new(), vec![])
            .unwrap()
            .with_actions(&["wait"])
            .unwrap();

        // 0.5 is not above the threshold
        assert_eq!(state.metadata_for("wait"), Some(ActionMetadata::default()));
    }

    #[test]
    fn test_classify_is_idempotent() {
        let mut state =
            DecisionState::new("d", attrs(&[(TIME_CONSTRAINT, 0.9)]), vec![]).unwrap();
        state.classify(&["a", "b"]).unwrap();
        let first = state.action_metadata().clone();

        state.classify(&["a", "b"]).unwrap();
        assert_eq!(state.action_metadata(), &first);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_classify_missing_attribute_is_configuration_error() {
        let mut state = DecisionState::new("d", Vec::<(String, f64)>::new(), vec![]).unwrap();
        state.attributes.remove(RISK);

        let err = state.classify(&["a"]).unwrap_err();
        assert!(matches!(err, StateError::Configuration(_)));
        assert!(!state.is_classified());
    }

    #[test]
    fn test_deserialize_merges_defaults() {
        let json = r#"{
            "description": "should I change teams?",
            "attributes": {"risk": 0.2},
            "embedding": [0.1, 0.2]
        }"#;
        let state: DecisionState = serde_json::from_str(json).unwrap();

        assert_eq!(state.description(), "should I change teams?");
        assert!((state.attribute(RISK).unwrap() - 0.2).abs() < 1e-12);
        assert!((state.attribute(IMPORTANCE).unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(state.embedding(), &[0.1, 0.2]);
        assert!(!state.is_classified());
    }

    #[test]
    fn test_deserialize_rejects_bad_weight() {
        let json = r#"{"description": "d", "attributes": {"risk": -0.1}}"#;
        assert!(serde_json::from_str::<DecisionState>(json).is_err());
    }

    #[test]
    fn test_draft_accepts_bad_weight_until_built() {
        let json = r#"{"description": "d", "attributes": {"risk": 1.5}}"#;
        let draft: StateDraft = serde_json::from_str(json).unwrap();

        assert_eq!(draft.attributes.get(RISK), Some(&1.5));
        assert!(matches!(draft.clone().build(), Err(StateError::Configuration(_))));
        assert!(draft.build_unclassified().is_err());
    }

    #[test]
    fn test_draft_from_state_keeps_metadata() {
        let state = DecisionState::new("d", [(RISK, 0.4)], vec![0.5])
            .unwrap()
            .with_actions(&["ship fast"])
            .unwrap();
        let draft = StateDraft::from(state.clone());

        assert_eq!(draft.clone().build().unwrap(), state);
        assert!(!draft.build_unclassified().unwrap().is_classified());
    }
}
