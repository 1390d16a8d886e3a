use super::code::{Code, Register};
use crate::flight_control::FlightState;

/// Where a register takes its value from while a monitor verb is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterSource {
    /// Signed vertical velocity in m/s.
    Velocity,
    /// Altitude in tens of meters.
    Altitude,
    /// Fuel percentage.
    Fuel,
    /// Elapsed mission seconds, wrapped to five digits.
    MissionTime,
    /// A constant readout.
    Fixed(u32),
}

/// Register layout of one monitored noun.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NounLayout {
    pub noun: u8,
    pub registers: [RegisterSource; 3],
}

static NOUN_LAYOUTS: [NounLayout; 6] = [
    NounLayout {
        noun: 36,
        registers: [RegisterSource::MissionTime, RegisterSource::Velocity, RegisterSource::Altitude],
    },
    NounLayout {
        noun: 43,
        registers: [RegisterSource::Fixed(0), RegisterSource::Fixed(0), RegisterSource::Altitude],
    },
    NounLayout {
        noun: 50,
        registers: [RegisterSource::Fixed(100), RegisterSource::Fixed(10), RegisterSource::Fuel],
    },
    NounLayout {
        noun: 60,
        registers: [RegisterSource::Fixed(0), RegisterSource::Velocity, RegisterSource::Altitude],
    },
    // R2 carries fuel instead of delta-H for descent monitoring
    NounLayout {
        noun: 62,
        registers: [RegisterSource::Velocity, RegisterSource::Fuel, RegisterSource::Altitude],
    },
    NounLayout {
        noun: 68,
        registers: [RegisterSource::Altitude, RegisterSource::Fixed(0), RegisterSource::Velocity],
    },
];

impl NounLayout {
    const TIME_WRAP: u64 = 100_000;

    /// Looks up the layout for `noun`; nouns without one keep their registers.
    pub fn lookup(noun: Code) -> Option<&'static NounLayout> {
        NOUN_LAYOUTS.iter().find(|l| l.noun == noun.value())
    }

    /// Renders all three registers for the given state.
    pub fn render(&self, flight: &FlightState, elapsed_secs: u64) -> [Register; 3] {
        self.registers.map(|src| Self::render_one(src, flight, elapsed_secs))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn render_one(src: RegisterSource, flight: &FlightState, elapsed_secs: u64) -> Register {
        match src {
            RegisterSource::Velocity => Register::from_signed(flight.velocity),
            RegisterSource::Altitude => Register::from_unsigned(flight.altitude / 10.0),
            RegisterSource::Fuel => Register::from_unsigned(flight.fuel),
            RegisterSource::MissionTime => Register::positive((elapsed_secs % Self::TIME_WRAP) as u32),
            RegisterSource::Fixed(value) => Register::positive(value),
        }
    }
}
