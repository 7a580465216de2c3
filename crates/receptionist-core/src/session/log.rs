use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Lines kept in the operator's diagnostic panel.
pub const LOG_CAPACITY: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogLine {
    /// Monotonic across the lifetime of the log, survives eviction.
    pub seq: u64,
    pub at: DateTime<Utc>,
    pub level: LogLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub text: String,
}

impl LogLine {
    /// `HH:MM:SS` in 24-hour time.
    pub fn clock(&self) -> String {
        self.at.format("%H:%M:%S").to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticLog {
    lines: VecDeque<LogLine>,
    capacity: usize,
    next_seq: u64,
}

impl DiagnosticLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
            next_seq: 0,
        }
    }

    pub fn push(&mut self, at: DateTime<Utc>, level: LogLevel, tag: Option<&str>, text: impl Into<String>) {
        if self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(LogLine {
            seq: self.next_seq,
            at,
            level,
            tag: tag.map(str::to_string),
            text: text.into(),
        });
        self.next_seq += 1;
    }

    /// Lines with `seq >= since`, oldest first.
    pub fn since(&self, since: u64) -> Vec<LogLine> {
        self.lines.iter().filter(|l| l.seq >= since).cloned().collect()
    }

    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn lines(&self) -> &VecDeque<LogLine> {
        &self.lines
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.text.contains(needle))
    }

    pub fn count_matching(&self, needle: &str) -> usize {
        self.lines.iter().filter(|l| l.text.contains(needle)).count()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new(LOG_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_with_stable_sequence() {
        let mut log = DiagnosticLog::new(3);
        let now = Utc::now();
        for i in 0..5 {
            log.push(now, LogLevel::Info, None, format!("line {}", i));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.next_seq(), 5);
        let tail = log.since(3);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].text, "line 3");
        // evicted lines are simply gone
        assert_eq!(log.since(0).len(), 3);
    }
}
