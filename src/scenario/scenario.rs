use super::scenario_event::{EventKind, ScenarioEvent};
use crate::dsky::{Code, CommandState};
use crate::flight_control::FlightState;
use std::path::Path;
use strum_macros::Display;

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ScenarioError {
    #[strum(to_string = "scenario is not valid JSON: {reason}")]
    Parse { reason: String },
    #[strum(to_string = "scenario is missing required field `{field}`")]
    MissingField { field: &'static str },
    #[strum(to_string = "scenario field `{field}` is invalid: {reason}")]
    InvalidField { field: String, reason: String },
    #[strum(to_string = "no scenario with id `{id}`")]
    UnknownScenario { id: String },
    #[strum(to_string = "cannot read scenario file: {reason}")]
    Io { reason: String },
}

impl std::error::Error for ScenarioError {}

impl From<serde_json::Error> for ScenarioError {
    fn from(value: serde_json::Error) -> Self { ScenarioError::Parse { reason: value.to_string() } }
}

/// Starting conditions a scenario imposes on a fresh mission.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialState {
    #[serde(default, rename = "prog", skip_serializing_if = "Option::is_none")]
    pub program: Option<Code>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verb: Option<Code>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noun: Option<Code>,
    pub altitude: f64,
    pub velocity: f64,
    pub fuel: f64,
    /// Seconds already on the mission clock at load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission_time: Option<u64>,
}

impl InitialState {
    pub fn flight_state(&self) -> FlightState { FlightState::parked(self.altitude, self.velocity, self.fuel) }

    pub fn command_state(&self) -> CommandState {
        CommandState::new(
            self.program.unwrap_or(Code::ZERO),
            self.verb.unwrap_or(Code::ZERO),
            self.noun.unwrap_or(Code::ZERO),
        )
    }
}

/// Scenario as it arrives from a file, before validation.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScenarioDefinition {
    id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    initial_state: Option<InitialState>,
    #[serde(default)]
    events: Option<Vec<ScenarioEvent>>,
}

/// Immutable mission template. Loading it never mutates it; the event engine works on
/// its own copies of [`Scenario::events`].
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    id: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    initial_state: InitialState,
    events: Vec<ScenarioEvent>,
}

impl Scenario {
    /// Longest description excerpt echoed to the mission log on load.
    pub const DESCRIPTION_EXCERPT: usize = 30;

    /// Builds and validates a scenario.
    pub fn new(
        id: &str,
        name: &str,
        description: Option<&str>,
        initial_state: InitialState,
        events: Vec<ScenarioEvent>,
    ) -> Result<Self, ScenarioError> {
        let scenario = Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            initial_state,
            events,
        };
        scenario.validate()?;
        Ok(scenario)
    }

    /// Parses and validates a scenario definition in JSON.
    ///
    /// # Arguments
    /// * `json` – The scenario document.
    ///
    /// # Returns
    /// The validated [`Scenario`], or the first problem found.
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let def: ScenarioDefinition = serde_json::from_str(json)?;
        Self::try_from(def)
    }

    /// Reads and validates a scenario file.
    pub fn from_file(path: &Path) -> Result<Self, ScenarioError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ScenarioError::Io { reason: format!("{}: {e}", path.display()) })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ScenarioError> { Ok(serde_json::to_string_pretty(self)?) }

    pub fn id(&self) -> &str { &self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn initial_state(&self) -> &InitialState { &self.initial_state }
    pub fn events(&self) -> &[ScenarioEvent] { &self.events }

    /// First characters of the description followed by `...`, as echoed on load.
    pub fn description_excerpt(&self) -> Option<String> {
        self.description
            .as_deref()
            .map(|d| format!("{}...", d.chars().take(Self::DESCRIPTION_EXCERPT).collect::<String>()))
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        if self.id.trim().is_empty() {
            return Err(ScenarioError::MissingField { field: "id" });
        }
        if self.name.trim().is_empty() {
            return Err(ScenarioError::MissingField { field: "name" });
        }
        let init = &self.initial_state;
        for (field, value) in [("altitude", init.altitude), ("velocity", init.velocity), ("fuel", init.fuel)] {
            if !value.is_finite() {
                return Err(invalid(format!("initialState.{field}"), "must be a finite number"));
            }
        }
        if init.altitude < 0.0 {
            return Err(invalid("initialState.altitude".into(), "must not be negative"));
        }
        if !(0.0..=100.0).contains(&init.fuel) {
            return Err(invalid("initialState.fuel".into(), "must be between 0 and 100"));
        }
        for (i, ev) in self.events.iter().enumerate() {
            if !ev.threshold.is_finite() {
                return Err(invalid(format!("events[{i}].val"), "must be a finite number"));
            }
            let has_code = ev.code.as_deref().is_some_and(|c| !c.trim().is_empty());
            if ev.kind == EventKind::Alarm && !has_code {
                return Err(invalid(format!("events[{i}].code"), "is required for ALARM events"));
            }
        }
        Ok(())
    }
}

fn invalid(field: String, reason: &str) -> ScenarioError {
    ScenarioError::InvalidField { field, reason: reason.to_string() }
}

impl TryFrom<ScenarioDefinition> for Scenario {
    type Error = ScenarioError;

    fn try_from(def: ScenarioDefinition) -> Result<Self, Self::Error> {
        let id = def.id.ok_or(ScenarioError::MissingField { field: "id" })?;
        let name = def.name.ok_or(ScenarioError::MissingField { field: "name" })?;
        let initial_state = def.initial_state.ok_or(ScenarioError::MissingField { field: "initialState" })?;
        Scenario::new(&id, &name, def.description.as_deref(), initial_state, def.events.unwrap_or_default())
    }
}
