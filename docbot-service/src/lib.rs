//! # Docbot Service
//!
//! The runtime for a chat-platform documentation bot. The bot answers a
//! fixed set of documentation commands from a static JSON file and
//! autonomously reports on its own health.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐      ┌────────────────┐
//! │  Invocation  │─────▶│   Dispatcher   │──▶ command handlers
//! └──────────────┘      │                │        (docs)
//!                       │ RateLimit gate │
//!                       │ Health counters│
//!                       └───────┬────────┘
//!                               │ outcomes
//!                       ┌───────▼────────┐
//!                       │ HealthMonitor  │──▶ periodic log
//!                       │  (3 timers)    │──▶ daily report  ─┐
//!                       └────────────────┘──▶ threshold alerts│
//!                                              ▼              │
//!                                        report channel ◀─────┘
//! ```
//!
//! Every invocation passes the rate-limit gate before its command body
//! runs, and reports its outcome to the health counters afterwards. The
//! three monitor timers run independently for the lifetime of the
//! process; a failed cycle is logged and never stops the schedule.
//!
//! The chat platform itself is abstracted behind the [`gateway`] traits.
//! The bundled [`console`] front end implements them for local runs:
//!
//! ```bash
//! docbot --report-channel 123456789 --log-level debug
//! ```

pub mod commands;
pub mod config;
pub mod console;
pub mod dispatch;
pub mod docs;
pub mod gateway;
pub mod monitor;
pub mod usage;
