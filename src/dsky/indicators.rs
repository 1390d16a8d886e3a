use super::{code::Code, program::Program};
use crate::flight_control::FlightState;
use std::collections::HashMap;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Status lamps on the DSKY panel, in panel order.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IndicatorName {
    UplinkActy,
    NoAtt,
    Stby,
    KeyRel,
    OprErr,
    Temp,
    GimbalLock,
    Prog,
    Restart,
    Tracker,
    Alt,
    Vel,
    CompActy,
}

/// Lamp states keyed by [`IndicatorName`]. Every name is always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorSet {
    lamps: HashMap<IndicatorName, bool>,
}

impl IndicatorSet {
    /// Fuel percentage below which a running engine lights VEL.
    pub const LOW_FUEL: f64 = 10.0;

    /// Power-on state: only STBY is lit.
    pub fn initial() -> Self {
        let lamps = IndicatorName::iter().map(|n| (n, n == IndicatorName::Stby)).collect();
        Self { lamps }
    }

    /// Every lamp lit, as during a lamp test.
    pub fn all_on() -> Self {
        Self { lamps: IndicatorName::iter().map(|n| (n, true)).collect() }
    }

    pub fn get(&self, name: IndicatorName) -> bool { self.lamps.get(&name).copied().unwrap_or(false) }

    pub fn set(&mut self, name: IndicatorName, lit: bool) { self.lamps.insert(name, lit); }

    /// Lit lamps in panel order.
    pub fn lit(&self) -> impl Iterator<Item = IndicatorName> + '_ {
        IndicatorName::iter().filter(|n| self.get(*n))
    }

    /// Overlays the lamps that follow from the program and flight state onto `self`.
    ///
    /// Landing programs light ALT and VEL; a running engine on low fuel lights VEL
    /// regardless of program. Lamps not named here keep whatever the interpreter set.
    ///
    /// # Arguments
    /// * `program` – The current program code.
    /// * `flight` – The freshly integrated flight state.
    ///
    /// # Returns
    /// The derived indicator set; `self` is left untouched.
    #[must_use]
    pub fn derive(&self, program: Code, flight: &FlightState) -> IndicatorSet {
        let landing = Program::is_landing(program);
        let mut next = self.clone();
        next.set(IndicatorName::Alt, landing);
        next.set(IndicatorName::Vel, landing || (flight.active && flight.fuel < Self::LOW_FUEL));
        next
    }
}

impl Default for IndicatorSet {
    fn default() -> Self { Self::initial() }
}
