//! Mission scenarios: immutable templates, the built-in catalog and the one-shot event
//! engine that turns threshold crossings into alarms and mission outcomes.

mod catalog;
mod event_engine;
#[allow(clippy::module_inception)]
mod scenario;
mod scenario_event;


pub use catalog::{ImportOutcome, ScenarioCatalog};
pub use event_engine::{EventEffect, EventEngine};
pub use scenario::{InitialState, Scenario, ScenarioError};
pub use scenario_event::{Comparator, EventKind, ScenarioEvent, Trigger};
