//! Core update types: user, chat, payload variants, and parsing helpers.

use serde::{Deserialize, Serialize};

/// User identity as carried on an inbound update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub language_code: Option<String>,
    pub is_premium: bool,
}

/// Chat identity and kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRef {
    pub id: i64,
    pub kind: ChatKind,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatKind::Private => "private",
            ChatKind::Group => "group",
            ChatKind::Supergroup => "supergroup",
            ChatKind::Channel => "channel",
        }
    }
}

/// Payload of an inbound update. Only fields the bot reads are carried;
/// everything else collapses to `Unsupported`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UpdatePayload {
    Text { text: String },
    Photo { caption: Option<String> },
    Document,
    Voice,
    Video,
    Sticker,
    Callback { data: Option<String> },
    InlineQuery { query: String },
    MemberJoined,
    MemberLeft,
    Edited { text: Option<String> },
    Unsupported,
}

/// One inbound event from the transport. Passed by reference through the
/// pipeline and never mutated by middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub user: Option<UserRef>,
    pub chat: Option<ChatRef>,
    pub payload: UpdatePayload,
}

/// Log previews are cut at this many characters.
const PREVIEW_LIMIT: usize = 200;

impl Update {
    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn chat_id(&self) -> Option<i64> {
        self.chat.as_ref().map(|c| c.id)
    }

    /// Text of a plain text payload; `None` for every other payload.
    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            UpdatePayload::Text { text } => Some(text),
            _ => None,
        }
    }

    pub fn is_command(&self) -> bool {
        self.text().is_some_and(|t| t.starts_with('/'))
    }

    /// Command name without the leading `/` and without a `@botname` suffix.
    pub fn command(&self) -> Option<&str> {
        let rest = self.text()?.strip_prefix('/')?;
        let name = rest.split_whitespace().next()?;
        let name = name.split('@').next().unwrap_or(name);
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Argument text after the command name, trimmed; `None` when absent.
    pub fn command_args(&self) -> Option<&str> {
        let text = self.text()?;
        if !text.starts_with('/') {
            return None;
        }
        let args = text.split_once(char::is_whitespace)?.1.trim();
        if args.is_empty() {
            None
        } else {
            Some(args)
        }
    }

    /// Short classification used in log lines (`command`, `text_message`,
    /// `photo`, `callback_query`, ...).
    pub fn kind_name(&self) -> &'static str {
        match &self.payload {
            UpdatePayload::Text { .. } if self.is_command() => "command",
            UpdatePayload::Text { .. } => "text_message",
            UpdatePayload::Photo { .. } => "photo",
            UpdatePayload::Document => "document",
            UpdatePayload::Voice => "voice",
            UpdatePayload::Video => "video",
            UpdatePayload::Sticker => "sticker",
            UpdatePayload::Callback { .. } => "callback_query",
            UpdatePayload::InlineQuery { .. } => "inline_query",
            UpdatePayload::MemberJoined => "new_member",
            UpdatePayload::MemberLeft => "left_member",
            UpdatePayload::Edited { .. } => "edited_message",
            UpdatePayload::Unsupported => "unknown",
        }
    }

    /// Loggable content, truncated to 200 characters.
    pub fn content_preview(&self) -> String {
        let content = match &self.payload {
            UpdatePayload::Text { text } => text.as_str(),
            UpdatePayload::Photo { caption } => caption.as_deref().unwrap_or(""),
            UpdatePayload::Callback { data } => data.as_deref().unwrap_or(""),
            UpdatePayload::InlineQuery { query } => query.as_str(),
            UpdatePayload::Edited { text } => text.as_deref().unwrap_or(""),
            _ => "",
        };
        if content.chars().count() > PREVIEW_LIMIT {
            let truncated: String = content.chars().take(PREVIEW_LIMIT).collect();
            format!("{}...", truncated)
        } else {
            content.to_string()
        }
    }
}

/// Converts a transport-specific update type to core [`Update`].
pub trait ToCoreUpdate: Send + Sync {
    fn to_core(&self) -> Update;
}
