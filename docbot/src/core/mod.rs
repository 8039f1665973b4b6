//! Core components of the docbot library
//!
//! This module contains the fundamental building blocks:
//! - [`rate_limit`]: bucketed rate limiting with a global ceiling and
//!   invalid-response tracking
//! - [`health`]: health counters, snapshots, and alert thresholds

pub mod health;
pub mod rate_limit;

pub use health::{
    AlertThresholds, BotStatus, HealthSnapshot, HealthStats, LastError, ThresholdViolation,
};
pub use rate_limit::{RateBucket, RateLimitAdvisory, RateLimitManager};
