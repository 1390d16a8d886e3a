use super::scenario::{InitialState, Scenario, ScenarioError};
use super::scenario_event::{Comparator, EventKind, ScenarioEvent, Trigger};
use crate::dsky::Code;
use crate::error;

/// Whether an import added a new scenario or replaced one with the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Added,
    Replaced,
}

/// The scenarios selectable at run time: built-ins followed by imports, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ScenarioCatalog {
    scenarios: Vec<Scenario>,
}

impl ScenarioCatalog {
    /// Catalog holding the built-in missions.
    pub fn builtin() -> Self {
        let scenarios = [apollo11_landing(), manual_descent(), lunar_orbit()]
            .into_iter()
            .filter_map(|res| res.map_err(|e| error!("Built-in scenario rejected: {e}")).ok())
            .collect();
        Self { scenarios }
    }

    /// Adds `scenario`, replacing an existing one with the same id in place.
    pub fn import(&mut self, scenario: Scenario) -> ImportOutcome {
        if let Some(slot) = self.scenarios.iter_mut().find(|s| s.id() == scenario.id()) {
            *slot = scenario;
            ImportOutcome::Replaced
        } else {
            self.scenarios.push(scenario);
            ImportOutcome::Added
        }
    }

    pub fn get(&self, id: &str) -> Result<&Scenario, ScenarioError> {
        self.scenarios
            .iter()
            .find(|s| s.id() == id)
            .ok_or_else(|| ScenarioError::UnknownScenario { id: id.to_string() })
    }

    pub fn first(&self) -> Option<&Scenario> { self.scenarios.first() }
    pub fn list(&self) -> &[Scenario] { &self.scenarios }
    pub fn len(&self) -> usize { self.scenarios.len() }
    pub fn is_empty(&self) -> bool { self.scenarios.is_empty() }
}

fn initial(prog: u8, verb: u8, noun: u8, altitude: f64, velocity: f64, fuel: f64) -> InitialState {
    InitialState {
        program: Code::new(prog),
        verb: Code::new(verb),
        noun: Code::new(noun),
        altitude,
        velocity,
        fuel,
        mission_time: None,
    }
}

fn apollo11_landing() -> Result<Scenario, ScenarioError> {
    Scenario::new(
        "apollo11_landing",
        "Apollo 11: The Eagle Landing",
        Some("Historical simulation of the Apollo 11 landing. Watch out for 1202 alarms."),
        initial(63, 6, 62, 40_000.0, -500.0, 100.0),
        vec![
            ScenarioEvent::alarm(Trigger::Altitude, Comparator::Less, 33_000.0, "1202"),
            ScenarioEvent::outcome(
                Trigger::Altitude,
                Comparator::LessOrEqual,
                0.0,
                EventKind::Success,
                "THE EAGLE HAS LANDED",
            ),
        ],
    )
}

fn manual_descent() -> Result<Scenario, ScenarioError> {
    Scenario::new(
        "manual_descent",
        "P66 Manual Descent",
        Some("Take control in the final phase. Don't run out of fuel."),
        initial(66, 16, 62, 3_000.0, -20.0, 40.0),
        vec![
            ScenarioEvent::outcome(Trigger::Fuel, Comparator::LessOrEqual, 0.0, EventKind::Fail, "FUEL EXHAUSTED. ABORT."),
            ScenarioEvent::outcome(
                Trigger::Altitude,
                Comparator::LessOrEqual,
                0.0,
                EventKind::Success,
                "TOUCHDOWN CONFIRMED",
            ),
        ],
    )
}

fn lunar_orbit() -> Result<Scenario, ScenarioError> {
    Scenario::new(
        "orbit",
        "Lunar Orbit (Idle)",
        Some("Safe orbit. System check."),
        initial(0, 0, 0, 110_000.0, 1_600.0, 100.0),
        Vec::new(),
    )
}
