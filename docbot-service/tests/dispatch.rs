//! End-to-end dispatch pipeline against mock collaborators

mod common;

use common::{MockGateway, MockResponder, sample_doc_cache};
use docbot::RateLimitManager;
use docbot_service::dispatch::Dispatcher;
use docbot_service::gateway::{Invocation, Responder};
use docbot_service::monitor::{HealthMonitor, MonitorConfig};
use std::sync::Arc;
use std::time::Duration;

fn invocation(command: &str, is_admin: bool) -> Invocation {
    Invocation {
        command: command.to_string(),
        user: "tester".to_string(),
        is_admin,
    }
}

fn dispatcher_with(gateway: Arc<MockGateway>, rate_limiter: RateLimitManager) -> Dispatcher {
    let monitor = HealthMonitor::new(gateway.clone(), MonitorConfig::default());
    Dispatcher::new(gateway, sample_doc_cache(), monitor, rate_limiter)
}

fn dispatcher(gateway: Arc<MockGateway>) -> Dispatcher {
    dispatcher_with(gateway, RateLimitManager::new())
}

#[tokio::test]
async fn page_command_replies_with_documentation() {
    let gateway = Arc::new(MockGateway::new());
    let dispatcher = dispatcher(gateway);
    let responder = MockResponder::new();

    dispatcher
        .dispatch(&invocation("home", false), &responder)
        .await
        .unwrap();

    let replies = responder.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].title, "Home");
    assert_eq!(replies[0].body, "Main resources and information");
    assert!(replies[0].fields.iter().any(|f| f.name == "Docs"));
    assert!(!replies[0].ephemeral);
}

#[tokio::test]
async fn category_command_replies_with_links() {
    let gateway = Arc::new(MockGateway::new());
    let dispatcher = dispatcher(gateway);
    let responder = MockResponder::new();

    dispatcher
        .dispatch(&invocation("docs", false), &responder)
        .await
        .unwrap();

    let replies = responder.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].title, "Documentation");
    assert!(replies[0].fields.iter().any(|f| f.name == "API Reference"));
}

#[tokio::test]
async fn successful_command_updates_health_and_usage() {
    let gateway = Arc::new(MockGateway::new());
    let monitor = HealthMonitor::new(gateway.clone(), MonitorConfig::default());
    let dispatcher = Dispatcher::new(
        gateway,
        sample_doc_cache(),
        monitor.clone(),
        RateLimitManager::new(),
    );
    let responder = MockResponder::new();

    dispatcher
        .dispatch(&invocation("home", false), &responder)
        .await
        .unwrap();

    let snapshot = monitor.snapshot().await;
    assert_eq!(snapshot.command_count, 1);
    assert_eq!(snapshot.error_count, 0);
    assert_eq!(dispatcher.usage().lock().await.command_invocations("home"), 1);
}

#[tokio::test]
async fn rate_limited_invocation_gets_wait_notice_and_never_runs() {
    let gateway = Arc::new(MockGateway::new());
    let monitor = HealthMonitor::new(gateway.clone(), MonitorConfig::default());
    // Global ceiling of one permit per second
    let dispatcher = Dispatcher::new(
        gateway,
        sample_doc_cache(),
        monitor.clone(),
        RateLimitManager::with_limits(1, 10_000, Duration::from_secs(600)),
    );

    let first = MockResponder::new();
    dispatcher
        .dispatch(&invocation("home", false), &first)
        .await
        .unwrap();
    assert_eq!(first.replies()[0].title, "Home");

    let second = MockResponder::new();
    dispatcher
        .dispatch(&invocation("home", false), &second)
        .await
        .unwrap();

    let replies = second.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].title, "Rate Limited");
    assert!(replies[0].ephemeral);
    assert!(replies[0].body.contains("Please wait"));

    // The rejected invocation ran no command body
    let snapshot = monitor.snapshot().await;
    assert_eq!(snapshot.command_count, 1);
    assert_eq!(dispatcher.usage().lock().await.command_invocations("home"), 1);
}

#[tokio::test]
async fn unknown_command_gets_ephemeral_notice() {
    let gateway = Arc::new(MockGateway::new());
    let dispatcher = dispatcher(gateway);
    let responder = MockResponder::new();

    dispatcher
        .dispatch(&invocation("bogus", false), &responder)
        .await
        .unwrap();

    let replies = responder.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].title, "Unknown Command");
    assert!(replies[0].ephemeral);
}

#[tokio::test]
async fn admin_command_is_gated() {
    let gateway = Arc::new(MockGateway::new());
    let dispatcher = dispatcher(gateway);
    let responder = MockResponder::new();

    dispatcher
        .dispatch(&invocation("sync", false), &responder)
        .await
        .unwrap();

    let replies = responder.replies();
    assert_eq!(replies[0].title, "Permission Denied");
    assert!(replies[0].ephemeral);
}

#[tokio::test]
async fn sync_uses_two_phase_reply() {
    let gateway = Arc::new(MockGateway::new());
    let dispatcher = dispatcher(gateway);
    let responder = MockResponder::new();

    dispatcher
        .dispatch(&invocation("sync", true), &responder)
        .await
        .unwrap();

    assert!(responder.is_deferred());
    assert!(responder.replies().is_empty());
    let follow_ups = responder.follow_ups();
    assert_eq!(follow_ups.len(), 1);
    assert_eq!(follow_ups[0].title, "Commands Synced");
    assert!(follow_ups[0].body.contains("10"));

    // Admin actions are tracked separately as well
    let usage = dispatcher.usage().lock().await;
    assert_eq!(usage.admin_invocations("sync"), 1);
    assert_eq!(usage.command_invocations("sync"), 1);
}

#[tokio::test]
async fn missing_page_is_reported_as_command_failure() {
    let gateway = Arc::new(MockGateway::new());
    let monitor = HealthMonitor::new(gateway.clone(), MonitorConfig::default());
    let dispatcher = Dispatcher::new(
        gateway,
        sample_doc_cache(),
        monitor.clone(),
        RateLimitManager::new(),
    );
    let responder = MockResponder::new();

    // "framework" resolves as a command but the sample library has no
    // such page
    dispatcher
        .dispatch(&invocation("framework", false), &responder)
        .await
        .unwrap();

    let replies = responder.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].title, "Command Failed");
    assert!(replies[0].ephemeral);

    let snapshot = monitor.snapshot().await;
    assert_eq!(snapshot.command_count, 0);
    assert_eq!(snapshot.error_count, 1);
    assert!(snapshot.last_error.unwrap().message.contains("framework"));
    assert_eq!(dispatcher.usage().lock().await.recent_errors().count(), 1);
}

#[tokio::test]
async fn not_found_failure_feeds_invalid_request_counter() {
    let mut gateway = MockGateway::new();
    gateway.fail_sync_with_not_found = true;
    let gateway = Arc::new(gateway);
    let dispatcher = dispatcher(gateway);
    let responder = MockResponder::new();

    dispatcher
        .dispatch(&invocation("sync", true), &responder)
        .await
        .unwrap();

    // Error notice goes through follow_up because the reply was deferred
    assert!(responder.is_deferred());
    let follow_ups = responder.follow_ups();
    assert_eq!(follow_ups.len(), 1);
    assert_eq!(follow_ups[0].title, "Command Failed");

    assert_eq!(dispatcher.rate_limiter().lock().await.invalid_count(), 1);
}

#[tokio::test]
async fn reload_docs_rereads_the_file() {
    let gateway = Arc::new(MockGateway::new());
    let dispatcher = dispatcher(gateway);
    let responder = MockResponder::new();

    dispatcher
        .dispatch(&invocation("reload_docs", true), &responder)
        .await
        .unwrap();

    let replies = responder.replies();
    assert_eq!(replies[0].title, "Docs Reloaded");
}

#[tokio::test]
async fn advisory_constrains_a_command_bucket() {
    let gateway = Arc::new(MockGateway::new());
    let dispatcher = dispatcher(gateway);

    {
        let mut limiter = dispatcher.rate_limiter().lock().await;
        let advisory = docbot::RateLimitAdvisory {
            bucket: Some("home".into()),
            limit: Some("1".into()),
            remaining: Some("1".into()),
            reset_after: Some("60.0".into()),
        };
        limiter.update_from_advisory(&advisory, std::time::SystemTime::now());
    }

    let first = MockResponder::new();
    dispatcher
        .dispatch(&invocation("home", false), &first)
        .await
        .unwrap();
    assert_eq!(first.replies()[0].title, "Home");

    let second = MockResponder::new();
    dispatcher
        .dispatch(&invocation("home", false), &second)
        .await
        .unwrap();
    assert_eq!(second.replies()[0].title, "Rate Limited");

    // A different bucket is unaffected
    let third = MockResponder::new();
    dispatcher
        .dispatch(&invocation("docs", false), &third)
        .await
        .unwrap();
    assert_eq!(third.replies()[0].title, "Documentation");
}
