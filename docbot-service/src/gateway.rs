//! Consumed chat-platform contracts
//!
//! The bot core never talks to the chat platform directly; it goes
//! through these traits. A production build wires them to a real client,
//! the bundled console front end implements them for local runs, and the
//! integration tests implement them with recording mocks.

use anyhow::Result;
use async_trait::async_trait;
use docbot::BotStatus;
use std::error::Error;
use std::fmt;

/// Opaque channel identifier, as assigned by the chat platform
pub type ChannelId = u64;

/// A resolved, postable channel
#[derive(Debug, Clone)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
}

/// One name/value pair inside a rendered message
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: String,
}

/// Renderable response content
///
/// Kept deliberately platform-neutral: a title, a body, optional fields,
/// and an ephemeral flag (visible only to the invoking user).
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub title: String,
    pub body: String,
    pub fields: Vec<Field>,
    pub ephemeral: bool,
}

impl Message {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            fields: Vec::new(),
            ephemeral: false,
        }
    }

    pub fn ephemeral(title: impl Into<String>, body: impl Into<String>) -> Self {
        let mut message = Self::new(title, body);
        message.ephemeral = true;
        message
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
        });
        self
    }
}

/// Failures surfaced by the chat platform client
///
/// The `NotFound`/`Forbidden` classes feed the invalid-request counter:
/// providers ban clients that produce too many of them.
#[derive(Debug)]
pub enum GatewayError {
    /// The target (channel, interaction) does not exist
    NotFound,
    /// The bot lacks permission for the target
    Forbidden,
    /// A first reply was already sent for this interaction
    AlreadyReplied,
    /// Network or platform failure
    Transport(String),
}

impl GatewayError {
    /// Whether this failure counts toward the invalid-request cap
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, GatewayError::NotFound | GatewayError::Forbidden)
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::NotFound => write!(f, "target not found"),
            GatewayError::Forbidden => write!(f, "missing permissions"),
            GatewayError::AlreadyReplied => write!(f, "a reply was already sent"),
            GatewayError::Transport(msg) => write!(f, "transport error: {msg}"),
        }
    }
}

impl Error for GatewayError {}

/// One inbound command invocation
#[derive(Debug, Clone)]
pub struct Invocation {
    pub command: String,
    pub user: String,
    pub is_admin: bool,
}

/// Reply surface for a single invocation
///
/// `reply` fails if a first response was already sent. Long-running
/// commands use the two-phase `defer` + `follow_up` pair to avoid the
/// platform-side invocation timeout.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn reply(&self, message: &Message) -> Result<()>;
    async fn defer(&self) -> Result<()>;
    async fn follow_up(&self, message: &Message) -> Result<()>;
    /// Whether `defer` has been called for this invocation
    fn is_deferred(&self) -> bool;
}

/// Bot-wide chat platform capabilities
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Resolve a configured channel ID to a postable target
    async fn fetch_channel(&self, id: ChannelId) -> Result<Option<Channel>>;
    /// Post a message to a resolved channel
    async fn post_message(&self, channel: &Channel, message: &Message) -> Result<()>;
    /// Re-register the command set with the platform, returning how many
    /// commands were synced
    async fn sync_commands(&self) -> Result<usize>;
    /// Live bot state (guild count, gateway latency)
    fn status(&self) -> BotStatus;
}
