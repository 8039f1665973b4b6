//! Service configuration and CLI argument parsing
//!
//! All settings come from command-line arguments with environment
//! variable fallback (DOCBOT_ prefix). Precedence:
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables
//! 3. Default values (lowest priority)
//!
//! ```bash
//! # Via CLI
//! docbot --report-channel 123456789 --log-level debug
//!
//! # Via environment variables
//! export DOCBOT_REPORT_CHANNEL=123456789
//! export DOCBOT_LOG_LEVEL=debug
//! docbot
//! ```

use crate::monitor::{MonitorConfig, ReportTime};
use anyhow::{Result, anyhow};
use clap::Parser;
use docbot::AlertThresholds;
use std::path::PathBuf;
use std::time::Duration;

/// Assembled service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the static documentation file
    pub docs_path: PathBuf,
    /// How long the parsed documentation stays fresh
    pub docs_ttl: Duration,
    /// Rate limiter overrides
    pub rate_limit: RateLimitConfig,
    /// Health monitor settings
    pub monitor: MonitorConfig,
    /// Logging level (error, warn, info, debug, trace)
    pub log_level: String,
}

/// Rate limiter settings
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Global ceiling, permits per one-second window
    pub global_limit: u32,
    /// Hard cap on invalid responses per window
    pub invalid_limit: u64,
    /// Rolling window for the invalid-response counter
    pub invalid_window: Duration,
}

/// Command-line arguments for the bot
///
/// All arguments can also be set via environment variables with the
/// DOCBOT_ prefix. CLI arguments take precedence.
#[derive(Parser, Debug)]
#[command(
    name = "docbot",
    about = "Documentation chat bot with rate limiting and health reporting",
    long_about = "A chat-platform command bot that answers fixed documentation queries and periodically reports its own health.\n\nEnvironment variables with DOCBOT_ prefix are supported. CLI arguments take precedence over environment variables."
)]
pub struct Args {
    // Documentation content
    #[arg(
        long,
        value_name = "PATH",
        help = "Path to the documentation content file",
        default_value = "docs.json",
        env = "DOCBOT_DOCS_PATH"
    )]
    pub docs_path: PathBuf,
    #[arg(
        long,
        value_name = "SECS",
        help = "Documentation cache TTL in seconds",
        default_value_t = 300,
        env = "DOCBOT_DOCS_TTL"
    )]
    pub docs_ttl: u64,

    // Health reporting
    #[arg(
        long,
        value_name = "ID",
        help = "Channel for daily health reports and alerts",
        env = "DOCBOT_REPORT_CHANNEL"
    )]
    pub report_channel: Option<u64>,
    #[arg(
        long,
        value_name = "HH:MM",
        help = "UTC time of day for the daily health report",
        default_value = "09:00",
        env = "DOCBOT_DAILY_REPORT_TIME"
    )]
    pub daily_report_time: ReportTime,
    #[arg(
        long,
        value_name = "MINS",
        help = "Minutes between periodic health checks",
        default_value_t = 5,
        env = "DOCBOT_PERIODIC_CHECK_MINUTES"
    )]
    pub periodic_check_minutes: u64,
    #[arg(
        long,
        value_name = "MINS",
        help = "Minutes between alert threshold checks",
        default_value_t = 60,
        env = "DOCBOT_THRESHOLD_CHECK_MINUTES"
    )]
    pub threshold_check_minutes: u64,

    // Alert thresholds
    #[arg(
        long,
        value_name = "N",
        help = "Alert when the hourly error rate exceeds this",
        default_value_t = 50.0,
        env = "DOCBOT_MAX_ERRORS_PER_HOUR"
    )]
    pub max_errors_per_hour: f64,
    #[arg(
        long,
        value_name = "N",
        help = "Alert when the hourly command rate exceeds this",
        default_value_t = 1000.0,
        env = "DOCBOT_MAX_COMMANDS_PER_HOUR"
    )]
    pub max_commands_per_hour: f64,
    #[arg(
        long,
        value_name = "MS",
        help = "Alert when gateway latency exceeds this",
        default_value_t = 500,
        env = "DOCBOT_MAX_LATENCY_MS"
    )]
    pub max_latency_ms: u64,
    #[arg(
        long,
        value_name = "PCT",
        help = "Alert when the guild count changes by more than this percent",
        default_value_t = 10.0,
        env = "DOCBOT_MAX_GUILD_CHANGE_PERCENT"
    )]
    pub max_guild_change_percent: f64,

    // Rate limiting
    #[arg(
        long,
        value_name = "N",
        help = "Global request ceiling per second",
        default_value_t = 50,
        env = "DOCBOT_GLOBAL_RATE_LIMIT"
    )]
    pub global_rate_limit: u32,
    #[arg(
        long,
        value_name = "N",
        help = "Invalid responses tolerated per window before pausing traffic",
        default_value_t = 10_000,
        env = "DOCBOT_INVALID_REQUEST_LIMIT"
    )]
    pub invalid_request_limit: u64,
    #[arg(
        long,
        value_name = "SECS",
        help = "Rolling window for the invalid-response counter",
        default_value_t = 600,
        env = "DOCBOT_INVALID_REQUEST_WINDOW"
    )]
    pub invalid_request_window: u64,

    // General options
    #[arg(
        long,
        value_name = "LEVEL",
        help = "Log level: error, warn, info, debug, trace",
        default_value = "info",
        env = "DOCBOT_LOG_LEVEL"
    )]
    pub log_level: String,
}

impl Config {
    /// Build configuration from environment variables and CLI arguments
    ///
    /// Clap resolves the precedence (CLI over env over defaults); this
    /// method assembles and validates the result.
    pub fn from_env_and_args() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    fn from_args(args: Args) -> Result<Self> {
        let config = Config {
            docs_path: args.docs_path,
            docs_ttl: Duration::from_secs(args.docs_ttl),
            rate_limit: RateLimitConfig {
                global_limit: args.global_rate_limit,
                invalid_limit: args.invalid_request_limit,
                invalid_window: Duration::from_secs(args.invalid_request_window),
            },
            monitor: MonitorConfig {
                report_channel: args.report_channel,
                thresholds: AlertThresholds {
                    max_errors_per_hour: args.max_errors_per_hour,
                    max_commands_per_hour: args.max_commands_per_hour,
                    max_latency: Duration::from_millis(args.max_latency_ms),
                    max_guild_change_percent: args.max_guild_change_percent,
                },
                periodic_interval: Duration::from_secs(args.periodic_check_minutes * 60),
                threshold_interval: Duration::from_secs(args.threshold_check_minutes * 60),
                daily_report_time: args.daily_report_time,
            },
            log_level: args.log_level,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        const LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];
        if !LEVELS.contains(&self.log_level.as_str()) {
            return Err(anyhow!(
                "invalid log level {:?}, expected one of: {}",
                self.log_level,
                LEVELS.join(", ")
            ));
        }
        if self.monitor.periodic_interval.is_zero() || self.monitor.threshold_interval.is_zero() {
            return Err(anyhow!("check intervals must be at least one minute"));
        }
        if self.rate_limit.global_limit == 0 {
            return Err(anyhow!("global rate limit must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Config> {
        let args = Args::try_parse_from(std::iter::once("docbot").chain(argv.iter().copied()))?;
        Config::from_args(args)
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.rate_limit.global_limit, 50);
        assert_eq!(config.rate_limit.invalid_limit, 10_000);
        assert_eq!(config.rate_limit.invalid_window, Duration::from_secs(600));
        assert_eq!(config.monitor.periodic_interval, Duration::from_secs(300));
        assert_eq!(config.monitor.threshold_interval, Duration::from_secs(3_600));
        assert_eq!(config.monitor.report_channel, None);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_overrides() {
        let config = parse(&[
            "--report-channel",
            "42",
            "--daily-report-time",
            "06:30",
            "--max-errors-per-hour",
            "10",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(config.monitor.report_channel, Some(42));
        assert_eq!(config.monitor.daily_report_time.hour, 6);
        assert_eq!(config.monitor.thresholds.max_errors_per_hour, 10.0);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        assert!(parse(&["--log-level", "verbose"]).is_err());
    }

    #[test]
    fn test_invalid_report_time_rejected() {
        assert!(parse(&["--daily-report-time", "25:00"]).is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(parse(&["--periodic-check-minutes", "0"]).is_err());
    }
}
