use strum_macros::Display;

/// Physical state of the descent vehicle along a single vertical axis.
///
/// Owned by [`super::FlightComputer`]; everyone else only receives copies.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct FlightState {
    /// Height above the surface in meters, never negative.
    pub altitude: f64,
    /// Vertical velocity in m/s, negative while descending.
    pub velocity: f64,
    /// Remaining propellant in percent.
    pub fuel: f64,
    /// Commanded throttle in percent.
    pub thrust: f64,
    /// Whether the integrator is running.
    pub active: bool,
}

impl FlightState {
    pub const IDLE: FlightState = FlightState {
        altitude: 15000.0,
        velocity: -100.0,
        fuel: 100.0,
        thrust: 0.0,
        active: false,
    };

    /// A parked vehicle at the given position, engine off and integrator stopped.
    pub fn parked(altitude: f64, velocity: f64, fuel: f64) -> Self {
        Self { altitude: altitude.max(0.0), velocity, fuel: fuel.clamp(0.0, 100.0), thrust: 0.0, active: false }
    }
}

impl Default for FlightState {
    fn default() -> Self { Self::IDLE }
}

/// How a ground contact ended the descent.
#[derive(Debug, Display, Clone, Copy, PartialEq)]
pub enum GroundOutcome {
    Touchdown { impact_velocity: f64 },
    Crash { impact_velocity: f64 },
}
