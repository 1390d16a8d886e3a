#![allow(dead_code, clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod advisory;
mod config;
mod dsky;
mod flight_control;
mod logger;
mod mission_control;
mod scenario;

use crate::advisory::{Advisor, HttpAdvisor, OfflineAdvisor};
use crate::config::Config;
use crate::mission_control::{GuidanceComputer, Supervisor};
use crate::scenario::{Scenario, ScenarioCatalog};
use chrono::Utc;
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = Config::from_env().unwrap_or_else(|e| {
        warn!("{e}, using defaults");
        Config::default()
    });

    let (catalog, selected) = init_catalog(&config);
    let advisor = init_advisor(&config);

    let mut kernel = GuidanceComputer::new();
    let scenario = selected
        .as_deref()
        .and_then(|id| {
            catalog.get(id).map_err(|e| warn!("{e}, falling back to the first scenario")).ok()
        })
        .or_else(|| catalog.first());
    let Some(scenario) = scenario else { fatal!("Scenario catalog is empty") };
    info!("Loading scenario {} ({} in catalog)", scenario.id(), catalog.len());
    kernel.load_scenario(scenario, Utc::now());

    Supervisor::new(kernel, catalog, advisor, &config).run().await;
    info!("Simulator stopped");
}

/// Builds the catalog and returns the id selected for start-up.
fn init_catalog(config: &Config) -> (ScenarioCatalog, Option<String>) {
    let mut catalog = ScenarioCatalog::builtin();
    let mut selected = config.scenario_id.clone();
    if let Some(path) = &config.scenario_file {
        match Scenario::from_file(path) {
            Ok(scenario) => {
                info!("Imported scenario {} from {}", scenario.id(), path.display());
                selected = Some(scenario.id().to_string());
                catalog.import(scenario);
            }
            Err(e) => error!("Import of {} refused: {e}", path.display()),
        }
    }
    (catalog, selected)
}

fn init_advisor(config: &Config) -> Arc<dyn Advisor> {
    let Some(url) = config.advisory_url.as_deref() else {
        info!("No advisory service configured, running offline");
        return Arc::new(OfflineAdvisor);
    };
    match HttpAdvisor::new(url) {
        Ok(advisor) => {
            info!("Advisory service at {}", advisor.url());
            Arc::new(advisor)
        }
        Err(e) => {
            warn!("Advisory client unavailable ({e}), running offline");
            Arc::new(OfflineAdvisor)
        }
    }
}
