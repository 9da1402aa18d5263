use chrono::NaiveDateTime;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The line written on each invocation. It is the whole file content; prior
/// content is replaced, not appended to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    timestamp: String,
}

impl LogEntry {
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn content(&self) -> String {
        format!("Contribution log: {}\n", self.timestamp)
    }

    pub fn update_message(&self) -> String {
        format!("chore: daily contribution {}", self.timestamp)
    }

    pub fn create_message(&self) -> String {
        format!("chore: initial contribution {}", self.timestamp)
    }
}
