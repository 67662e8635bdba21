//! View: pure projection of conversation state into render items.
//!
//! DESIGN
//! ======
//! Nothing here holds state. [`project`] turns one conversation plus the
//! in-flight flag into an ordered list of [`ViewItem`]s: day dividers,
//! messages, and a trailing "Thinking…" indicator. [`sidebar`] lists
//! conversations newest first. Same inputs always produce the same items.

pub mod labels;
pub mod markdown;

use time::UtcOffset;

use crate::conversation::{Conversation, ConversationList, Message, Role};

pub const ASSISTANT_AVATAR: &str = "GB";
pub const THINKING_TEXT: &str = "Thinking…";
pub const UNTITLED: &str = "Untitled";

/// Viewer-dependent inputs to the projection.
#[derive(Debug, Clone)]
pub struct ViewContext {
    pub now_ms: i64,
    pub offset: UtcOffset,
    pub display_name: Option<String>,
}

impl ViewContext {
    /// Context for the local machine at the current instant.
    #[must_use]
    pub fn local(display_name: Option<String>) -> Self {
        Self { now_ms: crate::conversation::now_ms(), offset: labels::local_offset(), display_name }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// User text, shown with whitespace preserved.
    Preformatted(String),
    /// Rendered assistant markdown.
    Html(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub key: String,
    pub role: Role,
    pub align: Align,
    pub avatar: String,
    pub body: MessageBody,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewItem {
    Divider { key: String, label: String },
    Message(MessageView),
    Thinking { avatar: &'static str, text: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarItem {
    pub id: String,
    pub title: String,
    pub active: bool,
    pub updated_at: i64,
}

// =============================================================================
// PROJECTION
// =============================================================================

/// Render items for one conversation, in message order.
#[must_use]
pub fn project(conversation: &Conversation, in_flight: bool, ctx: &ViewContext) -> Vec<ViewItem> {
    let user_avatar = labels::avatar_label(&labels::initials_from(ctx.display_name.as_deref()));
    let mut items = Vec::with_capacity(conversation.messages.len() + 2);
    let mut last_day = String::new();

    for message in &conversation.messages {
        let label = labels::day_label(message.created_at, ctx.now_ms, ctx.offset);
        if label != last_day {
            items.push(ViewItem::Divider { key: format!("div-{label}-{}", message.created_at), label: label.clone() });
            last_day = label;
        }
        items.push(ViewItem::Message(message_view(message, &user_avatar, ctx.offset)));
    }

    if in_flight {
        items.push(ViewItem::Thinking { avatar: ASSISTANT_AVATAR, text: THINKING_TEXT });
    }
    items
}

fn message_view(message: &Message, user_avatar: &str, offset: UtcOffset) -> MessageView {
    let (align, avatar, body) = match message.role {
        Role::User => (Align::End, user_avatar.to_owned(), MessageBody::Preformatted(message.content.clone())),
        Role::Assistant => (
            Align::Start,
            ASSISTANT_AVATAR.to_owned(),
            MessageBody::Html(markdown::render_markdown_html(&message.content)),
        ),
    };
    MessageView {
        key: message.id.clone(),
        role: message.role,
        align,
        avatar,
        body,
        time: labels::time_label(message.created_at, offset),
    }
}

/// Sidebar entries, newest first.
#[must_use]
pub fn sidebar(list: &ConversationList) -> Vec<SidebarItem> {
    let active_id = list.active().id.as_str();
    list.sorted()
        .into_iter()
        .map(|c| SidebarItem {
            id: c.id.clone(),
            title: display_title(&c.title),
            active: c.id == active_id,
            updated_at: c.updated_at,
        })
        .collect()
}

fn display_title(title: &str) -> String {
    let title = title.trim();
    if title.is_empty() { UNTITLED.to_owned() } else { title.to_owned() }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
