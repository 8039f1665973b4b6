//! Command table and response formatting
//!
//! Every documentation command is straight-line formatting of static
//! content into a [`Message`]; the interesting machinery (rate limiting,
//! health counters) lives in the dispatch layer. Two admin commands
//! (`sync`, `reload_docs`) have side effects and are handled specially
//! by the dispatcher.

use crate::docs::DocLibrary;
use crate::gateway::Message;

/// What a command name resolves to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandKind {
    /// Format one documentation page
    Page(&'static str),
    /// Format one link category
    Category {
        key: &'static str,
        title: &'static str,
        body: &'static str,
    },
    /// Re-register the command set with the platform (admin)
    Sync,
    /// Re-read the documentation file (admin)
    ReloadDocs,
}

/// Resolve a command name to its handler kind
pub fn lookup(name: &str) -> Option<CommandKind> {
    match name {
        "home" => Some(CommandKind::Page("home")),
        "framework" => Some(CommandKind::Page("framework")),
        "news" => Some(CommandKind::Page("news")),
        "privacy" => Some(CommandKind::Page("privacy")),
        "diy" => Some(CommandKind::Page("diy")),
        "docs" => Some(CommandKind::Category {
            key: "main",
            title: "Documentation",
            body: "Documentation and resource links:",
        }),
        "updates" => Some(CommandKind::Category {
            key: "blog",
            title: "Updates",
            body: "All blog posts and updates:",
        }),
        "terms" => Some(CommandKind::Category {
            key: "legal",
            title: "Terms of Service",
            body: "Terms of service and legal links:",
        }),
        "sync" => Some(CommandKind::Sync),
        "reload_docs" => Some(CommandKind::ReloadDocs),
        _ => None,
    }
}

/// Whether a command requires administrator rights
pub fn is_admin_command(name: &str) -> bool {
    matches!(name, "sync" | "reload_docs")
}

/// All registered command names
pub const COMMAND_NAMES: &[&str] = &[
    "home",
    "docs",
    "framework",
    "news",
    "updates",
    "privacy",
    "terms",
    "diy",
    "sync",
    "reload_docs",
];

/// Format a documentation page as a reply, links as fields
pub fn render_page(library: &DocLibrary, key: &str) -> Option<Message> {
    let page = library.page(key)?;
    let mut message = Message::new(&page.title, &page.content);
    for (name, url) in &page.links {
        message = message.with_field(name, url);
    }
    Some(message)
}

/// Format a link category as a reply
pub fn render_category(
    library: &DocLibrary,
    key: &str,
    title: &str,
    body: &str,
) -> Option<Message> {
    let category = library.category(key)?;
    let mut message = Message::new(title, body);
    for (name, url) in &category.links {
        message = message.with_field(name, url);
    }
    Some(message)
}
