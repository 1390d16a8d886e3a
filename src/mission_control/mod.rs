//! Mission control: the simulation kernel that ties the DSKY, flight model and scenario
//! events together, the mission clock and log, and the async host loop around them.

mod guidance_computer;
mod mission_clock;
mod mission_log;
mod supervisor;

#[cfg(test)]
mod tests;

pub use guidance_computer::GuidanceComputer;
pub use mission_clock::MissionClock;
pub use mission_log::{MissionLog, Role};
pub use supervisor::Supervisor;
