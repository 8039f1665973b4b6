//! # Docbot
//!
//! Rate limiting and health tracking primitives for a chat-platform
//! documentation bot.
//!
//! ## Overview
//!
//! Every command the bot handles passes through two cross-cutting
//! concerns, and this crate implements both:
//!
//! - **Rate limiting**: a per-bucket budget fed by provider advisories,
//!   a local global ceiling, and a rolling invalid-response counter that
//!   guards against provider-side bans
//! - **Health tracking**: command/error counters with derived per-hour
//!   rates, point-in-time snapshots, and configurable alert thresholds
//!
//! The crate is deliberately free of I/O and async machinery: every
//! operation takes the current time as a parameter and mutates only
//! in-memory state. The runtime crate supplies timers, delivery, and
//! locking.
//!
//! ## Quick Start
//!
//! ```
//! use docbot::{RateLimitManager, RateLimitAdvisory};
//! use std::time::SystemTime;
//!
//! let mut limiter = RateLimitManager::new();
//! let now = SystemTime::now();
//!
//! // Record provider-advertised limits for the "docs" bucket
//! let advisory = RateLimitAdvisory {
//!     bucket: Some("docs".into()),
//!     limit: Some("5".into()),
//!     remaining: Some("5".into()),
//!     reset_after: Some("60.0".into()),
//! };
//! limiter.update_from_advisory(&advisory, now);
//!
//! // Permit checks consume from the bucket and the global budget
//! match limiter.check_and_consume("docs", now) {
//!     None => println!("proceed"),
//!     Some(wait) => println!("rate limited, retry in {}s", wait.as_secs()),
//! }
//! ```
//!
//! Health tracking follows the same injected-time pattern:
//!
//! ```
//! use docbot::{BotStatus, HealthStats};
//! use std::time::{Duration, SystemTime};
//!
//! let now = SystemTime::now();
//! let mut stats = HealthStats::new(now);
//! stats.record_command();
//!
//! let status = BotStatus { guild_count: 3, latency: Duration::from_millis(40) };
//! let snapshot = stats.snapshot(&status, now);
//! assert_eq!(snapshot.command_count, 1);
//! ```
//!
//! ## Thread Safety
//!
//! The managers are not thread-safe on their own. For concurrent access,
//! wrap each one in a mutex; all mutations are short read-modify-write
//! sequences with no suspension points.

pub mod core;

pub use core::{
    AlertThresholds, BotStatus, HealthSnapshot, HealthStats, LastError, RateBucket,
    RateLimitAdvisory, RateLimitManager, ThresholdViolation,
};
