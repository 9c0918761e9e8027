//! Candidate action generation.
//!
//! In production the generator prompts a language model with the decision,
//! the retrieved contexts and the confident insights. The planner only sees
//! the trait.

use async_trait::async_trait;
use decision_core::DecisionState;

use crate::plan::PlanError;
use crate::request::{MemoryInsight, RetrievalHit};

/// Source of candidate next actions for a decision.
#[async_trait]
pub trait ActionGenerator: Send + Sync {
    /// Propose candidate actions. Output may be raw model text; the planner
    /// sanitises it. Failures should be reported as [`PlanError::Upstream`].
    async fn generate_actions(
        &self,
        state: &DecisionState,
        contexts: &[RetrievalHit],
        insights: &[MemoryInsight],
    ) -> Result<Vec<String>, PlanError>;
}

/// Generator that always proposes the same actions.
#[derive(Debug, Clone, Default)]
pub struct StaticActionGenerator {
    actions: Vec<String>,
}

impl StaticActionGenerator {
    pub fn new<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl ActionGenerator for StaticActionGenerator {
    async fn generate_actions(
        &self,
        _state: &DecisionState,
        _contexts: &[RetrievalHit],
        _insights: &[MemoryInsight],
    ) -> Result<Vec<String>, PlanError> {
        Ok(self.actions.clone())
    }
}
