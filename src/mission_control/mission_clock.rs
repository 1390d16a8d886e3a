use chrono::{DateTime, Utc};
use std::fmt;

/// Ground elapsed time (GET) since the current scenario was loaded.
///
/// Purely for display: the flight model never reads it, and it keeps counting whether or
/// not the engine is running.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissionClock {
    started_at: Option<DateTime<Utc>>,
    offset_secs: u64,
    elapsed_secs: u64,
}

impl MissionClock {
    /// (Re)starts the clock at `now`, with `offset_secs` already elapsed.
    pub fn start(&mut self, now: DateTime<Utc>, offset_secs: u64) {
        self.started_at = Some(now);
        self.offset_secs = offset_secs;
        self.elapsed_secs = offset_secs;
    }

    pub fn is_running(&self) -> bool { self.started_at.is_some() }

    /// Updates the elapsed seconds from wall time. Clock steps backwards are ignored.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        let Some(start) = self.started_at else { return };
        let since = u64::try_from((now - start).num_seconds()).unwrap_or(0);
        self.elapsed_secs = self.elapsed_secs.max(self.offset_secs.saturating_add(since));
    }

    pub fn elapsed_secs(&self) -> u64 { self.elapsed_secs }
}

impl fmt::Display for MissionClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.elapsed_secs;
        write!(f, "{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
    }
}
