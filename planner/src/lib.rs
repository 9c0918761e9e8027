//! Waypoint planner - "what should I do next?"
//!
//! Accepts a planning request (decision state, retrieved contexts, memory
//! insights), asks an [`ActionGenerator`] for candidate next actions and
//! ranks sequences of them with Monte Carlo Tree Search.
//!
//! ```rust,ignore
//! use planner::{Planner, PlannerSettings, PlanningRequest, StaticActionGenerator};
//!
//! let planner = Planner::new(
//!     StaticActionGenerator::new(["ship fast", "research more"]),
//!     PlannerSettings::default(),
//! );
//! let response = planner.plan(request).await;
//! println!("{:?}", response.next_steps());
//! ```

pub mod generator;
pub mod plan;
pub mod request;
pub mod sanitize;

pub use generator::{ActionGenerator, StaticActionGenerator};
pub use plan::{PlanError, PlanResponse, PlanSource, Planner, PlannerSettings};
pub use request::{InsightCategory, MemoryInsight, PlanningRequest, RetrievalHit};
pub use sanitize::{sanitize_action, sanitize_actions};
