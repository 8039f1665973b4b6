//! Console front end
//!
//! Implements the chat-platform contracts over stdin/stdout so the bot
//! can be exercised locally without a platform connection: type a
//! command name (with or without a leading `/`) and the reply is printed
//! to the terminal. `quit` exits.

use crate::dispatch::Dispatcher;
use crate::gateway::{Channel, ChannelId, ChatGateway, Invocation, Message, Responder};
use anyhow::Result;
use async_trait::async_trait;
use docbot::BotStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

pub struct ConsoleGateway;

#[async_trait]
impl ChatGateway for ConsoleGateway {
    async fn fetch_channel(&self, id: ChannelId) -> Result<Option<Channel>> {
        Ok(Some(Channel {
            id,
            name: "console".to_string(),
        }))
    }

    async fn post_message(&self, channel: &Channel, message: &Message) -> Result<()> {
        println!("[#{}]", channel.name);
        print_message(message);
        Ok(())
    }

    async fn sync_commands(&self) -> Result<usize> {
        Ok(crate::commands::COMMAND_NAMES.len())
    }

    fn status(&self) -> BotStatus {
        BotStatus {
            guild_count: 1,
            latency: Duration::ZERO,
        }
    }
}

struct ConsoleResponder {
    deferred: AtomicBool,
}

#[async_trait]
impl Responder for ConsoleResponder {
    async fn reply(&self, message: &Message) -> Result<()> {
        print_message(message);
        Ok(())
    }

    async fn defer(&self) -> Result<()> {
        self.deferred.store(true, Ordering::Relaxed);
        println!("(thinking...)");
        Ok(())
    }

    async fn follow_up(&self, message: &Message) -> Result<()> {
        print_message(message);
        Ok(())
    }

    fn is_deferred(&self) -> bool {
        self.deferred.load(Ordering::Relaxed)
    }
}

fn print_message(message: &Message) {
    println!("== {} ==", message.title);
    println!("{}", message.body);
    for field in &message.fields {
        println!("  {}: {}", field.name, field.value);
    }
}

/// Read command names from stdin and dispatch them until EOF or `quit`
pub async fn run(dispatcher: &Dispatcher) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let name = line.trim().trim_start_matches('/');
        if name.is_empty() {
            continue;
        }
        if name == "quit" {
            break;
        }

        let invocation = Invocation {
            command: name.to_string(),
            user: "console".to_string(),
            is_admin: true,
        };
        let responder = ConsoleResponder {
            deferred: AtomicBool::new(false),
        };
        dispatcher.dispatch(&invocation, &responder).await?;
    }

    Ok(())
}
