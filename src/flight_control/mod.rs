//! Single-axis flight dynamics of the descent vehicle.

mod flight_computer;
mod flight_state;


pub use flight_computer::FlightComputer;
pub use flight_state::{FlightState, GroundOutcome};
