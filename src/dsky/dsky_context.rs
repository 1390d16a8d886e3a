use super::{directive::Directive, indicators::{IndicatorName, IndicatorSet}};
use crate::flight_control::FlightComputer;
use crate::mission_control::{MissionLog, Role};
use std::time::Duration;

/// Mutable borrows of everything a key press or scenario event may touch besides the
/// interpreter's own [`super::CommandState`].
pub struct DskyContext<'a> {
    pub flight: &'a mut FlightComputer,
    pub indicators: &'a mut IndicatorSet,
    pub log: &'a mut MissionLog,
    pub directives: &'a mut Vec<Directive>,
    /// Elapsed mission seconds for time registers.
    pub elapsed_secs: u64,
}

impl DskyContext<'_> {
    /// How long UPLINK ACTY stays lit after a ground message.
    pub const UPLINK_FLASH: Duration = Duration::from_millis(400);

    /// Lights `indicator` now and schedules it off.
    pub fn flash(&mut self, indicator: IndicatorName, duration: Duration) {
        self.indicators.set(indicator, true);
        self.directives.push(Directive::Flash { indicator, duration });
    }

    /// Appends a ground message, flashing UPLINK ACTY.
    pub fn ground(&mut self, message: impl Into<String>) {
        self.log.push(Role::Ground, message);
        self.flash(IndicatorName::UplinkActy, Self::UPLINK_FLASH);
    }

    pub fn operator(&mut self, message: impl Into<String>) { self.log.push(Role::Operator, message); }
}
