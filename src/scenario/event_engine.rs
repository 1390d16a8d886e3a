use super::scenario_event::{EventKind, ScenarioEvent};
use crate::event;
use crate::flight_control::FlightState;

/// Runtime copy of a scenario event with its firing latch.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmedEvent {
    event: ScenarioEvent,
    fired: bool,
}

impl ArmedEvent {
    pub fn has_fired(&self) -> bool { self.fired }
}

/// Effect of a fired event, applied by the kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventEffect {
    Alarm { code: String, message: Option<String> },
    Success { message: Option<String> },
    Fail { message: Option<String> },
}

impl EventEffect {
    /// Whether this effect ends the mission.
    pub fn is_terminal(&self) -> bool { !matches!(self, EventEffect::Alarm { .. }) }
}

/// Evaluates the loaded scenario's events against each fresh flight state.
///
/// Every event fires at most once per load. Events are checked in declaration order
/// and evaluation stops at the first success or failure of a tick.
#[derive(Debug, Clone, Default)]
pub struct EventEngine {
    events: Vec<ArmedEvent>,
}

impl EventEngine {
    /// Clones the template events into fresh, unfired runtime copies.
    pub fn arm(template: &[ScenarioEvent]) -> Self {
        Self { events: template.iter().cloned().map(|event| ArmedEvent { event, fired: false }).collect() }
    }

    pub fn events(&self) -> &[ArmedEvent] { &self.events }

    pub fn unfired_count(&self) -> usize { self.events.iter().filter(|e| !e.fired).count() }

    /// Checks all unfired events against `flight` and latches those that hold.
    ///
    /// # Arguments
    /// * `flight` – State right after this tick's integration step.
    ///
    /// # Returns
    /// The effects to apply, in declaration order.
    pub fn evaluate(&mut self, flight: &FlightState) -> Vec<EventEffect> {
        let mut effects = Vec::new();
        for armed in self.events.iter_mut().filter(|e| !e.fired) {
            if !armed.event.is_satisfied(flight) {
                continue;
            }
            armed.fired = true;
            let ev = &armed.event;
            event!("Scenario event {} {} {} fired ({})", ev.trigger, ev.comparator, ev.threshold, ev.kind);
            let effect = match ev.kind {
                EventKind::Alarm => EventEffect::Alarm {
                    code: ev.code.clone().unwrap_or_default(),
                    message: ev.message.clone(),
                },
                EventKind::Success => EventEffect::Success { message: ev.message.clone() },
                EventKind::Fail => EventEffect::Fail { message: ev.message.clone() },
            };
            let terminal = effect.is_terminal();
            effects.push(effect);
            if terminal {
                break;
            }
        }
        effects
    }
}
