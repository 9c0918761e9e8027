//! The planning front door.
//!
//! Turns a [`PlanningRequest`] into a ranked plan: generate candidate actions,
//! sanitise them, classify the decision state against them, run the tree
//! search and package the best paths. Every failure ends in a plan the user
//! can read, never an error.

use decision_core::{Environment, StateError};
use engine_config::CentralConfig;
use mcts::{MctsConfig, MctsSearch, RankedPath, SearchReport};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::generator::ActionGenerator;
use crate::request::PlanningRequest;
use crate::sanitize::sanitize_actions;

/// Errors that end a planning request early.
#[derive(Debug, Error)]
pub enum PlanError {
    /// An upstream collaborator (language model, retrieval, memory) failed.
    #[error("Upstream failure: {0}")]
    Upstream(String),

    #[error(transparent)]
    Configuration(#[from] StateError),
}

/// Where the paths in a [`PlanResponse`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    /// Ranked by tree search
    Search,
    /// Search produced no paths; the actions in generation order
    Unranked,
    /// No usable actions were generated
    Empty,
    /// Planning failed; a single placeholder path
    Fallback,
}

/// Result of a planning request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResponse {
    pub source: PlanSource,
    pub paths: Vec<RankedPath>,
    pub cycles_completed: u32,
    pub cycles_skipped: u32,
    /// User-facing explanation, set on fallback plans
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PlanResponse {
    fn from_search(paths: Vec<RankedPath>, report: &SearchReport) -> Self {
        Self {
            source: PlanSource::Search,
            paths,
            cycles_completed: report.cycles_completed,
            cycles_skipped: report.cycles_skipped,
            message: None,
        }
    }

    /// One single-step path per action, with no statistics.
    fn unranked(actions: &[String], report: &SearchReport) -> Self {
        Self {
            source: PlanSource::Unranked,
            paths: actions.iter().map(|action| placeholder_path(action)).collect(),
            cycles_completed: report.cycles_completed,
            cycles_skipped: report.cycles_skipped,
            message: None,
        }
    }

    pub fn empty() -> Self {
        Self {
            source: PlanSource::Empty,
            paths: Vec::new(),
            cycles_completed: 0,
            cycles_skipped: 0,
            message: None,
        }
    }

    /// The placeholder plan: a single path whose only step is `message`.
    pub fn fallback(message: &str) -> Self {
        Self {
            source: PlanSource::Fallback,
            paths: vec![placeholder_path(message)],
            cycles_completed: 0,
            cycles_skipped: 0,
            message: Some(message.to_string()),
        }
    }

    /// First step of every path, best first.
    pub fn next_steps(&self) -> Vec<&str> {
        self.paths
            .iter()
            .filter_map(|ranked| ranked.path.first().map(String::as_str))
            .collect()
    }
}

fn placeholder_path(step: &str) -> RankedPath {
    RankedPath {
        path: vec![step.to_string()],
        visits: 0,
        aggregated_wins: 0.0,
        mean_value: 0.0,
        terminal: false,
    }
}

/// Knobs for the planner, resolved from the central config.
#[derive(Debug, Clone)]
pub struct PlannerSettings {
    pub search: MctsConfig,
    pub max_action_len: usize,
    /// Insights at or below this confidence are not forwarded
    pub insight_confidence_threshold: f64,
    pub fallback_message: String,
}

impl PlannerSettings {
    pub fn from_central(config: &CentralConfig) -> Self {
        Self {
            search: MctsConfig::from_central(&config.search),
            max_action_len: config.planner.max_action_len,
            insight_confidence_threshold: config.planner.insight_confidence_threshold,
            fallback_message: config.planner.fallback_message.clone(),
        }
    }

    pub fn with_search(mut self, search: MctsConfig) -> Self {
        self.search = search;
        self
    }
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self::from_central(&CentralConfig::default())
    }
}

/// Plans next steps using an [`ActionGenerator`] and tree search.
pub struct Planner<G> {
    generator: G,
    settings: PlannerSettings,
}

impl<G: ActionGenerator> Planner<G> {
    pub fn new(generator: G, settings: PlannerSettings) -> Self {
        Self {
            generator,
            settings,
        }
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    /// Plan the next steps for `request`.
    ///
    /// Never fails: upstream and configuration errors produce
    /// [`PlanResponse::fallback`] with the configured message.
    pub async fn plan(&self, request: PlanningRequest) -> PlanResponse {
        info!(
            description = request.state.description.as_str(),
            contexts = request.contexts.len(),
            insights = request.insights.len(),
            "Planning request received"
        );

        match self.try_plan(request).await {
            Ok(response) => {
                info!(
                    source = ?response.source,
                    paths = response.paths.len(),
                    cycles_completed = response.cycles_completed,
                    cycles_skipped = response.cycles_skipped,
                    "Plan ready"
                );
                response
            }
            Err(e) => {
                warn!(error = %e, "Planning failed, returning fallback plan");
                PlanResponse::fallback(&self.settings.fallback_message)
            }
        }
    }

    async fn try_plan(&self, request: PlanningRequest) -> Result<PlanResponse, PlanError> {
        let insights = request.confident_insights(self.settings.insight_confidence_threshold);
        debug!(
            forwarded = insights.len(),
            dropped = request.insights.len() - insights.len(),
            "Filtered memory insights"
        );

        // Any action metadata on the inbound state is replaced below
        let state = request.state.build_unclassified()?;

        let raw = self
            .generator
            .generate_actions(&state, &request.contexts, &insights)
            .await?;
        let actions = sanitize_actions(&raw, self.settings.max_action_len);
        debug!(raw = raw.len(), kept = actions.len(), "Sanitised actions");

        if actions.is_empty() {
            return Ok(PlanResponse::empty());
        }

        let state = state.with_actions(&actions)?;
        let environment = Environment::new(state, request.constraints)?;

        let mut config = self
            .settings
            .search
            .clone()
            .with_preference_weights(request.preference_weights);
        config.goal_embedding = request.goal_embedding;

        let mut search = MctsSearch::new(environment, config);
        let report = search.run();
        let paths = search.best_paths();

        if paths.is_empty() {
            debug!("Search produced no paths, returning actions unranked");
            return Ok(PlanResponse::unranked(&actions, &report));
        }

        Ok(PlanResponse::from_search(paths, &report))
    }
}
