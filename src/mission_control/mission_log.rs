use chrono::{NaiveTime, Utc};
use std::fmt;
use strum_macros::Display;

/// Who a mission-log line is attributed to.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Operator,
    Ground,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LogEntry {
    pub role: Role,
    pub message: String,
    pub timestamp: NaiveTime,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:<8} {}", self.timestamp.format("%H:%M:%S"), self.role, self.message)
    }
}

/// Append-only, ordered record of operator and ground traffic.
#[derive(Debug, Clone, Default)]
pub struct MissionLog {
    entries: Vec<LogEntry>,
}

impl MissionLog {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, role: Role, message: impl Into<String>) {
        self.entries.push(LogEntry { role, message: message.into(), timestamp: Utc::now().time() });
    }

    pub fn entries(&self) -> &[LogEntry] { &self.entries }

    /// Entries appended at or after position `start`.
    pub fn since(&self, start: usize) -> &[LogEntry] { self.entries.get(start..).unwrap_or(&[]) }

    pub fn last(&self) -> Option<&LogEntry> { self.entries.last() }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn messages(&self) -> impl DoubleEndedIterator<Item = &str> { self.entries.iter().map(|e| e.message.as_str()) }
}
