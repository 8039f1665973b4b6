//! Health monitoring and autonomous reporting
//!
//! [`HealthMonitor`] wraps the core health counters behind a shared
//! handle. Command dispatch feeds it outcomes; three background timers
//! emit visibility without being driven by user requests:
//!
//! - a periodic check that logs a snapshot (default every 5 minutes)
//! - a daily report delivered to the operator channel at a fixed UTC time
//! - an hourly threshold check that alerts on violated metrics
//!
//! A failed cycle is logged and never terminates a timer's schedule.
//! Delivery is best-effort: a skipped report is retried naturally on the
//! next scheduled firing, never within the same cycle.

use crate::gateway::{ChannelId, ChatGateway, Message};
use docbot::{AlertThresholds, HealthSnapshot, HealthStats};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

/// Time of day (UTC) for the daily report, parsed from "HH:MM"
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportTime {
    pub hour: u8,
    pub minute: u8,
}

impl ReportTime {
    /// Time remaining until the next occurrence of this time of day
    pub fn until_next(&self, now: SystemTime) -> Duration {
        let now_secs = now.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
        let midnight = now_secs - now_secs % 86_400;
        let target = midnight + u64::from(self.hour) * 3_600 + u64::from(self.minute) * 60;
        let next = if target > now_secs {
            target
        } else {
            target + 86_400
        };
        Duration::from_secs(next - now_secs)
    }
}

impl FromStr for ReportTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hour, minute) = s
            .split_once(':')
            .ok_or_else(|| format!("invalid report time {s:?}, expected HH:MM"))?;
        let hour: u8 = hour
            .parse()
            .map_err(|_| format!("invalid hour in report time {s:?}"))?;
        let minute: u8 = minute
            .parse()
            .map_err(|_| format!("invalid minute in report time {s:?}"))?;
        if hour > 23 || minute > 59 {
            return Err(format!("report time {s:?} out of range"));
        }
        Ok(Self { hour, minute })
    }
}

/// Monitor configuration, assembled from the CLI/env surface
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Channel for daily reports and alerts; `None` disables delivery
    pub report_channel: Option<ChannelId>,
    pub thresholds: AlertThresholds,
    /// Interval between periodic log-only checks
    pub periodic_interval: Duration,
    /// Interval between threshold checks
    pub threshold_interval: Duration,
    /// UTC time of day for the daily report
    pub daily_report_time: ReportTime,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            report_channel: None,
            thresholds: AlertThresholds::default(),
            periodic_interval: Duration::from_secs(5 * 60),
            threshold_interval: Duration::from_secs(60 * 60),
            daily_report_time: ReportTime { hour: 9, minute: 0 },
        }
    }
}

struct Inner {
    stats: Mutex<HealthStats>,
    // Guild count seen by the previous threshold check, 0 until the first run
    guild_baseline: Mutex<u64>,
    gateway: Arc<dyn ChatGateway>,
    config: MonitorConfig,
}

/// Shared handle to the bot's health state
///
/// Cheap to clone; all clones observe the same counters.
#[derive(Clone)]
pub struct HealthMonitor {
    inner: Arc<Inner>,
}

impl HealthMonitor {
    /// Create a monitor with no timers running
    ///
    /// Call [`start`](Self::start) exactly once to spawn the background
    /// timers; tests drive the cycle bodies directly instead.
    pub fn new(gateway: Arc<dyn ChatGateway>, config: MonitorConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                stats: Mutex::new(HealthStats::new(SystemTime::now())),
                guild_baseline: Mutex::new(0),
                gateway,
                config,
            }),
        }
    }

    /// Spawn the three background timers
    ///
    /// Consumes the unstarted monitor, so the timers cannot be started
    /// twice. They run for the lifetime of the process.
    pub fn start(self) -> HealthMonitor {
        let monitor = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(monitor.inner.config.periodic_interval);
            ticker.tick().await; // the first tick completes immediately
            loop {
                ticker.tick().await;
                monitor.run_periodic_check().await;
            }
        });

        let monitor = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(monitor.inner.config.threshold_interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                monitor.run_threshold_check().await;
            }
        });

        let monitor = self.clone();
        tokio::spawn(async move {
            loop {
                let wait = monitor
                    .inner
                    .config
                    .daily_report_time
                    .until_next(SystemTime::now());
                tokio::time::sleep(wait).await;
                monitor.run_daily_report().await;
            }
        });

        self
    }

    /// Count one executed command
    pub async fn record_command(&self) {
        self.inner.stats.lock().await.record_command();
    }

    /// Count one error and remember it as the most recent one
    pub async fn record_error(&self, message: &str) {
        self.inner
            .stats
            .lock()
            .await
            .record_error(message, SystemTime::now());
    }

    /// Snapshot the counters plus the live bot state
    pub async fn snapshot(&self) -> HealthSnapshot {
        let status = self.inner.gateway.status();
        self.inner
            .stats
            .lock()
            .await
            .snapshot(&status, SystemTime::now())
    }

    /// One iteration of the periodic check: log a snapshot, nothing more
    pub async fn run_periodic_check(&self) {
        let snapshot = self.snapshot().await;
        tracing::info!(
            uptime = %snapshot.format_uptime(),
            guilds = snapshot.guild_count,
            commands = snapshot.command_count,
            errors = snapshot.error_count,
            commands_per_hour = snapshot.commands_per_hour,
            errors_per_hour = snapshot.errors_per_hour,
            latency_ms = snapshot.latency.as_millis() as u64,
            "health check"
        );
    }

    /// One iteration of the daily report: snapshot, format, deliver
    pub async fn run_daily_report(&self) {
        let snapshot = self.snapshot().await;
        let report = format_daily_report(&snapshot);
        self.deliver(report, "daily health report").await;
    }

    /// One iteration of the threshold check: alert on violated metrics
    ///
    /// Also advances the guild-count baseline used by the percent-change
    /// metric.
    pub async fn run_threshold_check(&self) {
        let snapshot = self.snapshot().await;

        let baseline = {
            let mut guard = self.inner.guild_baseline.lock().await;
            std::mem::replace(&mut *guard, snapshot.guild_count)
        };

        let violations = self.inner.config.thresholds.violations(&snapshot, baseline);
        if violations.is_empty() {
            return;
        }

        tracing::warn!(count = violations.len(), "alert thresholds violated");
        let mut alert = Message::new(
            "Health Alert",
            "The following metrics exceeded their configured limits:",
        );
        for violation in &violations {
            alert.body.push_str("\n- ");
            alert.body.push_str(&violation.to_string());
        }
        self.deliver(alert, "health alert").await;
    }

    /// Deliver a report to the configured channel, logging every failure
    /// mode instead of propagating it
    async fn deliver(&self, message: Message, what: &str) {
        let Some(channel_id) = self.inner.config.report_channel else {
            tracing::warn!("no report channel configured, skipping {what}");
            return;
        };

        let channel = match self.inner.gateway.fetch_channel(channel_id).await {
            Ok(Some(channel)) => channel,
            Ok(None) => {
                tracing::error!(channel_id, "report channel not found, skipping {what}");
                return;
            }
            Err(error) => {
                tracing::error!(%error, channel_id, "failed to fetch report channel, skipping {what}");
                return;
            }
        };

        if let Err(error) = self.inner.gateway.post_message(&channel, &message).await {
            tracing::error!(%error, channel_id, "failed to deliver {what}");
        }
    }
}

fn format_daily_report(snapshot: &HealthSnapshot) -> Message {
    let last_error = snapshot
        .last_error
        .as_ref()
        .map_or_else(|| "none".to_string(), |e| e.message.clone());

    Message::new("Daily Health Report", "Bot status over the last day:")
        .with_field("Uptime", snapshot.format_uptime())
        .with_field("Guilds", snapshot.guild_count.to_string())
        .with_field("Commands Executed", snapshot.command_count.to_string())
        .with_field("Errors", snapshot.error_count.to_string())
        .with_field(
            "Commands/hour",
            format!("{:.1}", snapshot.commands_per_hour),
        )
        .with_field("Errors/hour", format!("{:.1}", snapshot.errors_per_hour))
        .with_field(
            "Latency",
            format!("{}ms", snapshot.latency.as_millis()),
        )
        .with_field("Last Error", last_error)
}
