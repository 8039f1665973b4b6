//! Per-command usage history
//!
//! Operator-facing bookkeeping that complements the health counters:
//! which commands ran, who invoked the admin ones, and a rolling window
//! of the most recent errors.

use std::collections::{HashMap, VecDeque};
use std::time::SystemTime;

/// Maximum retained error entries; older ones are evicted
pub const MAX_ERROR_HISTORY: usize = 100;

#[derive(Debug, Clone)]
pub struct UsageEntry {
    pub user: String,
    pub at: SystemTime,
}

#[derive(Debug, Clone)]
pub struct ErrorEntry {
    pub command: String,
    pub message: String,
    pub at: SystemTime,
}

/// In-memory usage history, reset on restart like everything else
#[derive(Debug, Default)]
pub struct UsageLog {
    command_usage: HashMap<String, Vec<UsageEntry>>,
    admin_usage: HashMap<String, Vec<UsageEntry>>,
    last_errors: VecDeque<ErrorEntry>,
}

impl UsageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_command(&mut self, command: &str, user: &str, now: SystemTime) {
        self.command_usage
            .entry(command.to_string())
            .or_default()
            .push(UsageEntry {
                user: user.to_string(),
                at: now,
            });
    }

    pub fn log_admin_action(&mut self, command: &str, user: &str, now: SystemTime) {
        self.admin_usage
            .entry(command.to_string())
            .or_default()
            .push(UsageEntry {
                user: user.to_string(),
                at: now,
            });
    }

    pub fn log_error(&mut self, command: &str, message: &str, now: SystemTime) {
        if self.last_errors.len() == MAX_ERROR_HISTORY {
            self.last_errors.pop_front();
        }
        self.last_errors.push_back(ErrorEntry {
            command: command.to_string(),
            message: message.to_string(),
            at: now,
        });
    }

    pub fn command_invocations(&self, command: &str) -> usize {
        self.command_usage.get(command).map_or(0, Vec::len)
    }

    pub fn admin_invocations(&self, command: &str) -> usize {
        self.admin_usage.get(command).map_or(0, Vec::len)
    }

    pub fn recent_errors(&self) -> impl Iterator<Item = &ErrorEntry> {
        self.last_errors.iter()
    }
}
