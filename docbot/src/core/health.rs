//! Health counters, snapshots, and alert thresholds
//!
//! [`HealthStats`] accumulates command and error counters since process
//! start. [`HealthStats::snapshot`] derives a point-in-time view from the
//! counters plus a live [`BotStatus`]; nothing here is persisted. All
//! derived state is recomputed on demand, so two snapshots with no
//! intervening mutation are identical apart from the live reads.

use std::fmt;
use std::time::{Duration, SystemTime};

/// Live bot state, read from the chat client at snapshot time
#[derive(Debug, Clone, Copy)]
pub struct BotStatus {
    /// Number of guilds the bot is currently a member of
    pub guild_count: u64,
    /// Current gateway latency
    pub latency: Duration,
}

/// Most recent error, overwritten on each occurrence
#[derive(Debug, Clone, PartialEq)]
pub struct LastError {
    pub message: String,
    pub at: SystemTime,
}

/// Monotonic counters owned by the health monitor
#[derive(Debug)]
pub struct HealthStats {
    start_time: SystemTime,
    command_count: u64,
    error_count: u64,
    last_error: Option<LastError>,
}

impl HealthStats {
    pub fn new(now: SystemTime) -> Self {
        Self {
            start_time: now,
            command_count: 0,
            error_count: 0,
            last_error: None,
        }
    }

    /// Count one executed command. O(1), never fails.
    pub fn record_command(&mut self) {
        self.command_count += 1;
    }

    /// Count one error and remember it as the most recent one.
    pub fn record_error(&mut self, message: impl Into<String>, now: SystemTime) {
        self.error_count += 1;
        self.last_error = Some(LastError {
            message: message.into(),
            at: now,
        });
    }

    pub fn command_count(&self) -> u64 {
        self.command_count
    }

    pub fn error_count(&self) -> u64 {
        self.error_count
    }

    pub fn last_error(&self) -> Option<&LastError> {
        self.last_error.as_ref()
    }

    pub fn start_time(&self) -> SystemTime {
        self.start_time
    }

    /// Compute a snapshot from the counters and the live bot state
    ///
    /// Per-hour rates divide by elapsed hours floored at 1.0, so a very
    /// young process reports its raw counts instead of a blown-up rate.
    pub fn snapshot(&self, status: &BotStatus, now: SystemTime) -> HealthSnapshot {
        let uptime = now.duration_since(self.start_time).unwrap_or_default();
        let hours = (uptime.as_secs_f64() / 3600.0).max(1.0);

        HealthSnapshot {
            uptime,
            guild_count: status.guild_count,
            latency: status.latency,
            command_count: self.command_count,
            error_count: self.error_count,
            commands_per_hour: self.command_count as f64 / hours,
            errors_per_hour: self.error_count as f64 / hours,
            last_error: self.last_error.clone(),
        }
    }
}

/// Point-in-time view of the bot's health, derived and never stored
#[derive(Debug, Clone)]
pub struct HealthSnapshot {
    pub uptime: Duration,
    pub guild_count: u64,
    pub latency: Duration,
    pub command_count: u64,
    pub error_count: u64,
    pub commands_per_hour: f64,
    pub errors_per_hour: f64,
    pub last_error: Option<LastError>,
}

impl HealthSnapshot {
    /// Uptime as "3h 25m 10s"
    pub fn format_uptime(&self) -> String {
        let total = self.uptime.as_secs();
        let (hours, remainder) = (total / 3600, total % 3600);
        let (minutes, seconds) = (remainder / 60, remainder % 60);
        format!("{hours}h {minutes}m {seconds}s")
    }
}

/// Per-metric alert limits
///
/// Configuration, not derived state. A snapshot is compared against these
/// by [`AlertThresholds::violations`].
#[derive(Debug, Clone)]
pub struct AlertThresholds {
    /// Maximum tolerated error rate per hour
    pub max_errors_per_hour: f64,
    /// Maximum tolerated command rate per hour
    pub max_commands_per_hour: f64,
    /// Maximum tolerated gateway latency
    pub max_latency: Duration,
    /// Maximum tolerated guild count change, in percent of the previous count
    pub max_guild_change_percent: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            max_errors_per_hour: 50.0,
            max_commands_per_hour: 1000.0,
            max_latency: Duration::from_millis(500),
            max_guild_change_percent: 10.0,
        }
    }
}

impl AlertThresholds {
    /// Compare a snapshot against the thresholds
    ///
    /// Returns every violated metric, not just the first.
    /// `previous_guild_count` is the baseline for the percent-change
    /// metric; a baseline of zero disables that check.
    pub fn violations(
        &self,
        snapshot: &HealthSnapshot,
        previous_guild_count: u64,
    ) -> Vec<ThresholdViolation> {
        let mut violations = Vec::new();

        if snapshot.errors_per_hour > self.max_errors_per_hour {
            violations.push(ThresholdViolation::ErrorRate {
                observed: snapshot.errors_per_hour,
                limit: self.max_errors_per_hour,
            });
        }
        if snapshot.commands_per_hour > self.max_commands_per_hour {
            violations.push(ThresholdViolation::CommandRate {
                observed: snapshot.commands_per_hour,
                limit: self.max_commands_per_hour,
            });
        }
        if snapshot.latency > self.max_latency {
            violations.push(ThresholdViolation::Latency {
                observed: snapshot.latency,
                limit: self.max_latency,
            });
        }
        if previous_guild_count > 0 {
            let delta = snapshot.guild_count.abs_diff(previous_guild_count) as f64;
            let percent = delta / previous_guild_count as f64 * 100.0;
            if percent > self.max_guild_change_percent {
                violations.push(ThresholdViolation::GuildChange {
                    percent,
                    limit: self.max_guild_change_percent,
                });
            }
        }

        violations
    }
}

/// One derived metric exceeding its configured limit
#[derive(Debug, Clone, PartialEq)]
pub enum ThresholdViolation {
    ErrorRate { observed: f64, limit: f64 },
    CommandRate { observed: f64, limit: f64 },
    Latency { observed: Duration, limit: Duration },
    GuildChange { percent: f64, limit: f64 },
}

impl fmt::Display for ThresholdViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdViolation::ErrorRate { observed, limit } => {
                write!(f, "error rate {observed:.1}/h exceeds limit {limit:.1}/h")
            }
            ThresholdViolation::CommandRate { observed, limit } => {
                write!(f, "command rate {observed:.1}/h exceeds limit {limit:.1}/h")
            }
            ThresholdViolation::Latency { observed, limit } => {
                write!(
                    f,
                    "latency {}ms exceeds limit {}ms",
                    observed.as_millis(),
                    limit.as_millis()
                )
            }
            ThresholdViolation::GuildChange { percent, limit } => {
                write!(f, "guild count changed {percent:.1}%, limit {limit:.1}%")
            }
        }
    }
}
