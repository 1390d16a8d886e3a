use crate::flight_control::FlightState;
use strum_macros::Display;

/// Flight quantity a scenario event watches.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Trigger {
    Altitude,
    Velocity,
    Fuel,
}

impl Trigger {
    pub fn read(self, flight: &FlightState) -> f64 {
        match self {
            Trigger::Altitude => flight.altitude,
            Trigger::Velocity => flight.velocity,
            Trigger::Fuel => flight.fuel,
        }
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Comparator {
    #[serde(rename = "<")]
    #[strum(to_string = "<")]
    Less,
    #[serde(rename = "<=")]
    #[strum(to_string = "<=")]
    LessOrEqual,
    #[serde(rename = ">")]
    #[strum(to_string = ">")]
    Greater,
    #[serde(rename = ">=")]
    #[strum(to_string = ">=")]
    GreaterOrEqual,
}

impl Comparator {
    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Comparator::Less => value < threshold,
            Comparator::LessOrEqual => value <= threshold,
            Comparator::Greater => value > threshold,
            Comparator::GreaterOrEqual => value >= threshold,
        }
    }
}

/// What happens when an event fires.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum EventKind {
    Alarm,
    Success,
    Fail,
}

/// A one-shot threshold rule of a scenario template.
///
/// Field names on the wire follow the scenario file format (`op`, `val`, `type`, `msg`).
/// A `handled` flag in imported files is accepted and ignored; firing state only exists on
/// the runtime copy held by [`super::EventEngine`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScenarioEvent {
    pub trigger: Trigger,
    #[serde(rename = "op")]
    pub comparator: Comparator,
    #[serde(rename = "val")]
    pub threshold: f64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, rename = "msg", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ScenarioEvent {
    pub fn alarm(trigger: Trigger, comparator: Comparator, threshold: f64, code: &str) -> Self {
        Self { trigger, comparator, threshold, kind: EventKind::Alarm, code: Some(code.to_string()), message: None }
    }

    pub fn outcome(trigger: Trigger, comparator: Comparator, threshold: f64, kind: EventKind, message: &str) -> Self {
        Self { trigger, comparator, threshold, kind, code: None, message: Some(message.to_string()) }
    }

    pub fn is_satisfied(&self, flight: &FlightState) -> bool {
        self.comparator.holds(self.trigger.read(flight), self.threshold)
    }
}
