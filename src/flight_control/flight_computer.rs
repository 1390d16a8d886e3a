use super::flight_state::{FlightState, GroundOutcome};
use crate::event;

/// Result of a single integration step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// Whether the integrator actually ran (the engine was active).
    pub integrated: bool,
    /// Whether this step crossed or touched the surface.
    pub ground_contact: bool,
}

/// The [`FlightComputer`] owns the vehicle state and advances it with a simple
/// force balance between engine thrust and lunar gravity.
///
/// Commands only ever request ignition, idle or throttle changes; altitude, velocity and
/// fuel are written exclusively by [`FlightComputer::step`].
#[derive(Debug, Clone)]
pub struct FlightComputer {
    /// The current physical state.
    state: FlightState,
}

impl FlightComputer {
    /// Lunar surface gravity in m/s².
    pub const GRAVITY: f64 = 1.62;
    /// Engine force at full throttle.
    pub const ENGINE_POWER: f64 = 45000.0;
    /// Vehicle mass, kept constant.
    pub const VEHICLE_MASS: f64 = 15000.0;
    /// Fuel percentage burnt per second at full throttle.
    pub const FUEL_BURN: f64 = 0.5;
    /// Impact speeds at or below this are a touchdown, above it a crash.
    pub const SOFT_LANDING_VEL: f64 = 5.0;
    /// Throttle change applied by a single throttle shortcut.
    pub const THRUST_STEP: f64 = 5.0;

    pub fn new(state: FlightState) -> Self { Self { state } }

    pub fn state(&self) -> FlightState { self.state }
    pub fn is_active(&self) -> bool { self.state.active }

    /// Replaces the whole state, used only when a scenario is loaded.
    pub fn reset(&mut self, state: FlightState) { self.state = state; }

    /// Starts the integrator with the given initial throttle.
    pub fn ignite(&mut self, thrust: f64) {
        self.state.active = true;
        self.state.thrust = if self.state.fuel > 0.0 { thrust.clamp(0.0, 100.0) } else { 0.0 };
        event!("Ignition at {:.0}% thrust", self.state.thrust);
    }

    /// Stops the integrator and cuts the engine.
    pub fn idle(&mut self) {
        self.state.active = false;
        self.state.thrust = 0.0;
    }

    /// Ends the mission without touching the throttle setting.
    pub fn halt(&mut self) { self.state.active = false; }

    /// Moves the throttle by `delta` percent, clamped to `[0, 100]`.
    /// An empty tank keeps the engine at zero.
    pub fn adjust_thrust(&mut self, delta: f64) {
        if self.state.fuel <= 0.0 {
            self.state.thrust = 0.0;
            return;
        }
        self.state.thrust = (self.state.thrust + delta).clamp(0.0, 100.0);
    }

    /// Advances the vehicle by `dt` seconds.
    ///
    /// Nothing moves while the integrator is stopped. A step that crosses the surface
    /// leaves the altitude below zero so scenario events still see the true value; the
    /// caller then either applies [`FlightComputer::resolve_ground_contact`] or, when an
    /// event already ended the mission, [`FlightComputer::settle_on_ground`].
    ///
    /// # Arguments
    /// * `dt` – Elapsed time in seconds, already clamped by the caller.
    ///
    /// # Returns
    /// A [`StepReport`] describing what happened.
    pub fn step(&mut self, dt: f64) -> StepReport {
        if !self.state.active || dt <= 0.0 {
            return StepReport { integrated: false, ground_contact: false };
        }
        let s = &mut self.state;
        let throttle = if s.fuel > 0.0 { s.thrust / 100.0 } else { 0.0 };
        let thrust_accel = throttle * Self::ENGINE_POWER / Self::VEHICLE_MASS;

        s.velocity += (thrust_accel - Self::GRAVITY) * dt;
        s.altitude += s.velocity * dt;
        s.fuel = (s.fuel - Self::FUEL_BURN * throttle * dt).max(0.0);
        if s.fuel <= 0.0 {
            s.fuel = 0.0;
            s.thrust = 0.0;
        }

        StepReport { integrated: true, ground_contact: s.altitude <= 0.0 }
    }

    /// Clamps an altitude left below the surface by the last step.
    pub fn settle_on_ground(&mut self) { self.state.altitude = self.state.altitude.max(0.0); }

    /// Applies the default ground rule after a surface crossing: stops the integrator and
    /// classifies the impact speed.
    pub fn resolve_ground_contact(&mut self) -> GroundOutcome {
        self.state.altitude = 0.0;
        self.state.active = false;
        let impact_velocity = self.state.velocity;
        if impact_velocity.abs() > Self::SOFT_LANDING_VEL {
            GroundOutcome::Crash { impact_velocity }
        } else {
            GroundOutcome::Touchdown { impact_velocity }
        }
    }
}

impl Default for FlightComputer {
    fn default() -> Self { Self::new(FlightState::default()) }
}
