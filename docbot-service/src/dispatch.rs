//! Command dispatch
//!
//! Every invocation flows through the same pipeline: rate-limit check,
//! then the command body, then the health-counter update for the
//! outcome. The two managers are shared behind async mutexes; no lock is
//! held across a network await.

use crate::commands::{self, CommandKind};
use crate::docs::DocCache;
use crate::gateway::{ChatGateway, GatewayError, Invocation, Message, Responder};
use crate::monitor::HealthMonitor;
use crate::usage::UsageLog;
use anyhow::{Result, anyhow};
use docbot::RateLimitManager;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;

pub struct Dispatcher {
    rate_limiter: Mutex<RateLimitManager>,
    docs: Mutex<DocCache>,
    usage: Mutex<UsageLog>,
    monitor: HealthMonitor,
    gateway: Arc<dyn ChatGateway>,
}

impl Dispatcher {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        docs: DocCache,
        monitor: HealthMonitor,
        rate_limiter: RateLimitManager,
    ) -> Self {
        Self {
            rate_limiter: Mutex::new(rate_limiter),
            docs: Mutex::new(docs),
            usage: Mutex::new(UsageLog::new()),
            monitor,
            gateway,
        }
    }

    /// Handle one inbound invocation end to end
    ///
    /// A rate-limited invocation gets an ephemeral wait notice and the
    /// command body never runs. Command failures are reported to the
    /// health monitor and answered with a generic error reply; only a
    /// failure to send even that is propagated to the caller's logs.
    pub async fn dispatch(&self, invocation: &Invocation, responder: &dyn Responder) -> Result<()> {
        let wait = self
            .rate_limiter
            .lock()
            .await
            .check_and_consume(&invocation.command, SystemTime::now());

        if let Some(wait) = wait {
            tracing::debug!(
                command = %invocation.command,
                wait_secs = wait.as_secs_f64(),
                "invocation rate limited"
            );
            responder.reply(&rate_limited_reply(wait)).await?;
            return Ok(());
        }

        match self.run_command(invocation, responder).await {
            Ok(()) => {
                self.monitor.record_command().await;
                let mut usage = self.usage.lock().await;
                let now = SystemTime::now();
                usage.log_command(&invocation.command, &invocation.user, now);
                if commands::is_admin_command(&invocation.command) {
                    usage.log_admin_action(&invocation.command, &invocation.user, now);
                }
            }
            Err(error) => {
                tracing::error!(command = %invocation.command, %error, "command failed");
                self.monitor.record_error(&error.to_string()).await;
                self.usage.lock().await.log_error(
                    &invocation.command,
                    &error.to_string(),
                    SystemTime::now(),
                );
                self.handle_command_error(responder, &error).await;
            }
        }

        Ok(())
    }

    async fn run_command(&self, invocation: &Invocation, responder: &dyn Responder) -> Result<()> {
        let Some(kind) = commands::lookup(&invocation.command) else {
            responder
                .reply(&Message::ephemeral(
                    "Unknown Command",
                    format!("No command named `{}`.", invocation.command),
                ))
                .await?;
            return Ok(());
        };

        if commands::is_admin_command(&invocation.command) && !invocation.is_admin {
            responder
                .reply(&Message::ephemeral(
                    "Permission Denied",
                    "Only administrators can use this command.",
                ))
                .await?;
            return Ok(());
        }

        match kind {
            CommandKind::Page(key) => {
                let message = {
                    let mut docs = self.docs.lock().await;
                    commands::render_page(docs.library(), key)
                        .ok_or_else(|| anyhow!("documentation page {key:?} is missing"))?
                };
                responder.reply(&message).await?;
            }
            CommandKind::Category { key, title, body } => {
                let message = {
                    let mut docs = self.docs.lock().await;
                    commands::render_category(docs.library(), key, title, body)
                        .ok_or_else(|| anyhow!("documentation category {key:?} is missing"))?
                };
                responder.reply(&message).await?;
            }
            CommandKind::Sync => {
                // Command registration can outlive the platform's reply
                // timeout, so acknowledge first and follow up after.
                responder.defer().await?;
                let synced = self.gateway.sync_commands().await?;
                responder
                    .follow_up(&Message::new(
                        "Commands Synced",
                        format!("Successfully synced {synced} commands."),
                    ))
                    .await?;
            }
            CommandKind::ReloadDocs => {
                self.docs.lock().await.refresh()?;
                responder
                    .reply(&Message::new(
                        "Docs Reloaded",
                        "Successfully reloaded the documentation file.",
                    ))
                    .await?;
            }
        }

        Ok(())
    }

    /// Best-effort error reply plus invalid-request accounting
    async fn handle_command_error(&self, responder: &dyn Responder, error: &anyhow::Error) {
        if let Some(gateway_error) = error.downcast_ref::<GatewayError>() {
            if gateway_error.is_invalid_request()
                && self
                    .rate_limiter
                    .lock()
                    .await
                    .record_invalid(SystemTime::now())
            {
                tracing::warn!("invalid request cap reached, outbound traffic should pause");
            }
        }

        let notice = Message::ephemeral(
            "Command Failed",
            "An error occurred processing your command.",
        );
        let sent = if responder.is_deferred() {
            responder.follow_up(&notice).await
        } else {
            responder.reply(&notice).await
        };
        if let Err(error) = sent {
            tracing::error!(%error, "could not respond to invocation");
        }
    }

    /// Shared usage history (operator introspection and tests)
    pub fn usage(&self) -> &Mutex<UsageLog> {
        &self.usage
    }

    /// Shared rate limiter (advisory updates from the platform client)
    pub fn rate_limiter(&self) -> &Mutex<RateLimitManager> {
        &self.rate_limiter
    }
}

fn rate_limited_reply(wait: Duration) -> Message {
    Message::ephemeral(
        "Rate Limited",
        format!(
            "Please wait {:.1} seconds before using this command again.",
            wait.as_secs_f64()
        ),
    )
}
