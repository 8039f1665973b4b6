use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use docbot::RateLimitManager;
use docbot_service::config::Config;
use docbot_service::console::{self, ConsoleGateway};
use docbot_service::dispatch::Dispatcher;
use docbot_service::docs::DocCache;
use docbot_service::monitor::HealthMonitor;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse configuration from environment variables and CLI arguments
    let config = Config::from_env_and_args()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("docbot={}", config.log_level).parse()?)
                .add_directive(format!("docbot_service={}", config.log_level).parse()?),
        )
        .init();

    let docs = DocCache::load(&config.docs_path, config.docs_ttl)?;
    tracing::info!(path = %config.docs_path.display(), "documentation loaded");

    let gateway = Arc::new(ConsoleGateway);

    let rate_limiter = RateLimitManager::with_limits(
        config.rate_limit.global_limit,
        config.rate_limit.invalid_limit,
        config.rate_limit.invalid_window,
    );

    // start() consumes the unstarted monitor: the timers are spawned
    // exactly once, here.
    let monitor = HealthMonitor::new(gateway.clone(), config.monitor.clone()).start();

    let dispatcher = Dispatcher::new(gateway, docs, monitor, rate_limiter);

    tracing::info!(
        report_channel = ?config.monitor.report_channel,
        periodic_secs = config.monitor.periodic_interval.as_secs(),
        threshold_secs = config.monitor.threshold_interval.as_secs(),
        "docbot started"
    );
    if config.monitor.report_channel.is_none() {
        tracing::warn!("no report channel configured, health reports will be log-only");
    }

    console::run(&dispatcher).await?;

    // Give any in-flight monitor delivery a moment before exiting
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}
