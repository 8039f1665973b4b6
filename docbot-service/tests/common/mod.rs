//! Shared mocks for the integration tests

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use docbot::BotStatus;
use docbot_service::docs::DocCache;
use docbot_service::gateway::{
    Channel, ChannelId, ChatGateway, GatewayError, Message, Responder,
};
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

pub const SAMPLE_DOCS: &str = r#"{
    "docs": {
        "home": {
            "title": "Home",
            "content": "Main resources and information",
            "links": {"Docs": "https://docs.example.com"}
        }
    },
    "categories": {
        "main": {
            "links": {"API Reference": "https://docs.example.com/api"}
        }
    }
}"#;

static FILE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Write the sample documentation to a unique temp file and load it
pub fn sample_doc_cache() -> DocCache {
    let path: PathBuf = std::env::temp_dir().join(format!(
        "docbot-it-{}-{}.json",
        std::process::id(),
        FILE_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::write(&path, SAMPLE_DOCS).unwrap();
    DocCache::load(path, Duration::from_secs(300)).unwrap()
}

/// Recording gateway with scriptable failure modes
pub struct MockGateway {
    pub status: BotStatus,
    /// Channel returned by fetch_channel; None simulates "not found"
    pub channel_exists: bool,
    pub fail_fetch: bool,
    pub fail_post: bool,
    pub fail_sync_with_not_found: bool,
    pub fetch_calls: AtomicUsize,
    pub posted: Mutex<Vec<(ChannelId, Message)>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            status: BotStatus {
                guild_count: 2,
                latency: Duration::from_millis(40),
            },
            channel_exists: true,
            fail_fetch: false,
            fail_post: false,
            fail_sync_with_not_found: false,
            fetch_calls: AtomicUsize::new(0),
            posted: Mutex::new(Vec::new()),
        }
    }

    pub fn posted_messages(&self) -> Vec<(ChannelId, Message)> {
        self.posted.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ChatGateway for MockGateway {
    async fn fetch_channel(&self, id: ChannelId) -> Result<Option<Channel>> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_fetch {
            return Err(GatewayError::Transport("connection reset".into()).into());
        }
        if !self.channel_exists {
            return Ok(None);
        }
        Ok(Some(Channel {
            id,
            name: "ops".to_string(),
        }))
    }

    async fn post_message(&self, channel: &Channel, message: &Message) -> Result<()> {
        if self.fail_post {
            return Err(GatewayError::Forbidden.into());
        }
        self.posted
            .lock()
            .unwrap()
            .push((channel.id, message.clone()));
        Ok(())
    }

    async fn sync_commands(&self) -> Result<usize> {
        if self.fail_sync_with_not_found {
            return Err(GatewayError::NotFound.into());
        }
        Ok(10)
    }

    fn status(&self) -> BotStatus {
        self.status
    }
}

/// Recording responder enforcing the single-first-reply contract
#[derive(Default)]
pub struct MockResponder {
    pub replies: Mutex<Vec<Message>>,
    pub follow_ups: Mutex<Vec<Message>>,
    pub deferred: AtomicBool,
}

impl MockResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replies(&self) -> Vec<Message> {
        self.replies.lock().unwrap().clone()
    }

    pub fn follow_ups(&self) -> Vec<Message> {
        self.follow_ups.lock().unwrap().clone()
    }
}

#[async_trait]
impl Responder for MockResponder {
    async fn reply(&self, message: &Message) -> Result<()> {
        let mut replies = self.replies.lock().unwrap();
        if !replies.is_empty() || self.deferred.load(Ordering::Relaxed) {
            return Err(GatewayError::AlreadyReplied.into());
        }
        replies.push(message.clone());
        Ok(())
    }

    async fn defer(&self) -> Result<()> {
        self.deferred.store(true, Ordering::Relaxed);
        Ok(())
    }

    async fn follow_up(&self, message: &Message) -> Result<()> {
        self.follow_ups.lock().unwrap().push(message.clone());
        Ok(())
    }

    fn is_deferred(&self) -> bool {
        self.deferred.load(Ordering::Relaxed)
    }
}
