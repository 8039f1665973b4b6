//! Fixed-window rate limit manager
//!
//! This module provides the main [`RateLimitManager`] struct which gates
//! every outbound action against the provider's advertised per-bucket
//! limits and a local global ceiling.

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default global ceiling: 50 requests per one-second window.
pub const DEFAULT_GLOBAL_LIMIT: u32 = 50;

/// Width of the global window.
pub const GLOBAL_WINDOW: Duration = Duration::from_secs(1);

/// Default hard cap on invalid (403/404-class) responses per window.
pub const DEFAULT_INVALID_LIMIT: u64 = 10_000;

/// Default rolling window for the invalid-response counter.
pub const DEFAULT_INVALID_WINDOW: Duration = Duration::from_secs(600);

/// One named permit pool with its own window
///
/// Buckets are created from provider advisories and refilled lazily: the
/// window is checked on access, never by a timer.
#[derive(Debug, Clone)]
pub struct RateBucket {
    /// Maximum permits per window
    pub limit: u32,
    /// Permits left in the current window
    pub remaining: u32,
    /// Absolute time the current window closes
    pub reset_at: SystemTime,
    /// Duration between resets
    pub window: Duration,
}

/// Raw, externally supplied rate limit state for one bucket
///
/// Fields arrive as unparsed header values. Any field that is missing or
/// fails to parse causes the whole advisory to be ignored: this is an
/// advisory channel, not authoritative input, and garbled data must never
/// affect the caller.
#[derive(Debug, Clone, Default)]
pub struct RateLimitAdvisory {
    /// Bucket key the advisory applies to
    pub bucket: Option<String>,
    /// Maximum permits per window (integer)
    pub limit: Option<String>,
    /// Permits left in the current window (integer)
    pub remaining: Option<String>,
    /// Seconds until the window closes (float)
    pub reset_after: Option<String>,
}

impl RateLimitAdvisory {
    /// Extract an advisory from response headers
    ///
    /// Header names are matched case-insensitively. Absent headers simply
    /// leave the corresponding field empty.
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut advisory = Self::default();
        for (name, value) in headers {
            match name.to_ascii_lowercase().as_str() {
                "x-ratelimit-bucket" => advisory.bucket = Some(value.to_string()),
                "x-ratelimit-limit" => advisory.limit = Some(value.to_string()),
                "x-ratelimit-remaining" => advisory.remaining = Some(value.to_string()),
                "x-ratelimit-reset-after" => advisory.reset_after = Some(value.to_string()),
                _ => {}
            }
        }
        advisory
    }
}

/// Tracks a global request budget and per-bucket budgets, plus a rolling
/// count of invalid responses
///
/// All operations take the current time explicitly, so callers (and tests)
/// control the clock. Windows refill lazily on access; nothing here
/// performs I/O or spawns timers.
///
/// # Example
///
/// ```
/// use docbot::RateLimitManager;
/// use std::time::SystemTime;
///
/// let mut limiter = RateLimitManager::new();
/// let now = SystemTime::now();
///
/// // No advisory seen yet: only the global ceiling applies
/// assert!(limiter.check_and_consume("docs", now).is_none());
/// ```
#[derive(Debug)]
pub struct RateLimitManager {
    global_limit: u32,
    global_remaining: u32,
    global_reset: SystemTime,
    buckets: HashMap<String, RateBucket>,
    invalid_count: u64,
    invalid_limit: u64,
    invalid_window: Duration,
    invalid_reset: SystemTime,
}

impl RateLimitManager {
    /// Create a manager with the default limits (50 req/s global,
    /// 10,000 invalid responses per 600 s)
    pub fn new() -> Self {
        Self::with_limits(
            DEFAULT_GLOBAL_LIMIT,
            DEFAULT_INVALID_LIMIT,
            DEFAULT_INVALID_WINDOW,
        )
    }

    /// Create a manager with custom limits
    pub fn with_limits(global_limit: u32, invalid_limit: u64, invalid_window: Duration) -> Self {
        // Windows start already-elapsed so the first access refills them.
        Self {
            global_limit,
            global_remaining: global_limit,
            global_reset: UNIX_EPOCH,
            buckets: HashMap::new(),
            invalid_count: 0,
            invalid_limit,
            invalid_window,
            invalid_reset: UNIX_EPOCH,
        }
    }

    /// Record or overwrite bucket state from a provider advisory
    ///
    /// A malformed advisory (missing bucket key, non-numeric or
    /// non-positive limit or reset, non-numeric remaining) is dropped
    /// silently: no bucket is created or updated.
    pub fn update_from_advisory(&mut self, advisory: &RateLimitAdvisory, now: SystemTime) {
        let Some(bucket) = advisory.bucket.as_deref().filter(|b| !b.is_empty()) else {
            return;
        };
        let Some(limit) = advisory
            .limit
            .as_deref()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|l| *l > 0)
        else {
            return;
        };
        let Some(remaining) = advisory
            .remaining
            .as_deref()
            .and_then(|v| v.trim().parse::<u32>().ok())
        else {
            return;
        };
        let Some(reset_after) = advisory
            .reset_after
            .as_deref()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|s| s.is_finite() && *s > 0.0)
        else {
            return;
        };

        let window = Duration::from_secs_f64(reset_after);
        self.buckets.insert(
            bucket.to_string(),
            RateBucket {
                limit,
                // Clamp so a stale advisory can never leave remaining > limit
                remaining: remaining.min(limit),
                reset_at: now + window,
                window,
            },
        );
    }

    /// Check whether an action in `bucket_key` may proceed now
    ///
    /// Returns `None` if the action may proceed (one permit consumed), or
    /// `Some(wait)` with the time until the exhausted window resets. The
    /// wait is advisory: callers reject or defer the action, they do not
    /// block for it.
    ///
    /// Buckets with no recorded advisory are unconstrained at the bucket
    /// level; only the global ceiling applies to them.
    pub fn check_and_consume(&mut self, bucket_key: &str, now: SystemTime) -> Option<Duration> {
        if now >= self.global_reset {
            self.global_remaining = self.global_limit;
            self.global_reset = now + GLOBAL_WINDOW;
        }
        if self.global_remaining == 0 {
            return Some(self.global_reset.duration_since(now).unwrap_or_default());
        }

        if let Some(bucket) = self.buckets.get_mut(bucket_key) {
            if now >= bucket.reset_at {
                bucket.remaining = bucket.limit;
                bucket.reset_at = now + bucket.window;
            }
            if bucket.remaining == 0 {
                // The global permit is deliberately not consumed on this
                // path: the request never goes out.
                return Some(bucket.reset_at.duration_since(now).unwrap_or_default());
            }
            bucket.remaining -= 1;
        }

        self.global_remaining -= 1;
        None
    }

    /// Count one invalid (rejected / not-found) response
    ///
    /// Returns `true` once the rolling count reaches the hard cap, which
    /// signals that the caller should pause all outbound traffic. The
    /// counter keeps counting past the cap and only resets when its
    /// window elapses.
    pub fn record_invalid(&mut self, now: SystemTime) -> bool {
        if now >= self.invalid_reset {
            self.invalid_count = 0;
            self.invalid_reset = now + self.invalid_window;
        }
        self.invalid_count += 1;
        self.invalid_count >= self.invalid_limit
    }

    /// Current state of a bucket, if an advisory has been seen for it
    pub fn bucket(&self, key: &str) -> Option<&RateBucket> {
        self.buckets.get(key)
    }

    /// Permits left in the current global window
    pub fn global_remaining(&self) -> u32 {
        self.global_remaining
    }

    /// Invalid responses counted in the current window
    pub fn invalid_count(&self) -> u64 {
        self.invalid_count
    }
}

impl Default for RateLimitManager {
    fn default() -> Self {
        Self::new()
    }
}
