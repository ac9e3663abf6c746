//! Simulation event log
//!
//! A bounded ring buffer of categorized messages. The category vocabulary is
//! fixed because downstream consumers filter on it.
//!
//! Every entry is also forwarded to the `log` facade so the same events show
//! up in diagnostic output when a logger is installed.

use serde::Serialize;
use std::collections::VecDeque;

/// Maximum number of entries kept in the log
pub const LOG_BUFFER_SIZE: usize = 1000;

/// Number of entries included in a snapshot
pub const SNAPSHOT_LOG_LEN: usize = 50;

/// Log entry categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// General lifecycle messages
    Info,
    /// Admission, selection, preemption
    Scheduler,
    /// Hits, faults, evictions
    Memory,
    /// Process or simulation completion
    Success,
    /// Clock ticks
    Time,
    /// Rejected requests
    Error,
}

impl std::fmt::Display for LogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogKind::Info => write!(f, "INFO"),
            LogKind::Scheduler => write!(f, "SCHED"),
            LogKind::Memory => write!(f, "MEMORY"),
            LogKind::Success => write!(f, "SUCCESS"),
            LogKind::Time => write!(f, "TIME"),
            LogKind::Error => write!(f, "ERROR"),
        }
    }
}

/// A single log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// Simulation time the entry was written at
    pub time: u64,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: LogKind,
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[t={:>4}] {:<7} {}", self.time, self.kind, self.message)
    }
}

/// Bounded event log
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_capacity(LOG_BUFFER_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, dropping the oldest once full
    pub fn record(&mut self, time: u64, kind: LogKind, message: impl Into<String>) {
        let entry = LogEntry {
            time,
            message: message.into(),
            kind,
        };
        match kind {
            LogKind::Error => log::warn!("{}", entry),
            LogKind::Success | LogKind::Info => log::info!("{}", entry),
            LogKind::Scheduler | LogKind::Memory => log::debug!("{}", entry),
            LogKind::Time => log::trace!("{}", entry),
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// The `n` most recent entries, oldest first
    pub fn recent(&self, n: usize) -> Vec<LogEntry> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Entries of one category
    pub fn by_kind(&self, kind: LogKind) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_recent() {
        let mut log = EventLog::new();
        log.record(0, LogKind::Info, "one");
        log.record(1, LogKind::Memory, "two");
        log.record(2, LogKind::Time, "three");

        let recent = log.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].message, "two");
        assert_eq!(recent[1].message, "three");
        assert_eq!(log.recent(10).len(), 3);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut log = EventLog::with_capacity(3);
        for i in 0..5 {
            log.record(i, LogKind::Time, format!("tick {}", i));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.iter().next().unwrap().message, "tick 2");
    }

    #[test]
    fn test_default_capacity() {
        let mut log = EventLog::new();
        for i in 0..(LOG_BUFFER_SIZE as u64 + 10) {
            log.record(i, LogKind::Info, "x");
        }
        assert_eq!(log.len(), LOG_BUFFER_SIZE);
        assert_eq!(log.iter().next().unwrap().time, 10);
    }

    #[test]
    fn test_filter_by_kind() {
        let mut log = EventLog::new();
        log.record(0, LogKind::Error, "bad");
        log.record(0, LogKind::Info, "fine");
        assert_eq!(log.by_kind(LogKind::Error).count(), 1);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let entry = LogEntry {
            time: 3,
            message: "P1 selected".into(),
            kind: LogKind::Scheduler,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"time":3,"message":"P1 selected","type":"scheduler"}"#);
    }
}
