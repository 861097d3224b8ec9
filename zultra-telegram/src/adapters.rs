//! Adapters from Telegram (teloxide) types to core types.
//! Depends only on teloxide and zultra_core type definitions.

use teloxide::types::{MaybeInaccessibleMessage, UpdateKind};
use tracing::debug;
use zultra_core::{ChatKind, ChatRef, ToCoreUpdate, Update, UpdatePayload, UserRef};

/// Wraps a teloxide Update for conversion to core [`Update`].
pub struct TelegramUpdateWrapper<'a>(pub &'a teloxide::types::Update);

impl<'a> ToCoreUpdate for TelegramUpdateWrapper<'a> {
    fn to_core(&self) -> Update {
        let update_id = i64::from(self.0.id.0);
        let (user, chat, payload) = match &self.0.kind {
            UpdateKind::Message(msg) => (
                msg.from.as_ref().map(map_user),
                Some(map_chat(&msg.chat)),
                classify_message(msg),
            ),
            UpdateKind::EditedMessage(msg) => (
                msg.from.as_ref().map(map_user),
                Some(map_chat(&msg.chat)),
                UpdatePayload::Edited {
                    text: msg.text().map(str::to_owned),
                },
            ),
            UpdateKind::CallbackQuery(cb) => (
                Some(map_user(&cb.from)),
                cb.message.as_ref().map(|m| map_chat(callback_chat(m))),
                UpdatePayload::Callback {
                    data: cb.data.clone(),
                },
            ),
            UpdateKind::InlineQuery(query) => (
                Some(map_user(&query.from)),
                None,
                UpdatePayload::InlineQuery {
                    query: query.query.clone(),
                },
            ),
            other => {
                debug!(update_id, kind = ?other, "Unsupported update kind");
                (None, None, UpdatePayload::Unsupported)
            }
        };
        Update {
            update_id,
            user,
            chat,
            payload,
        }
    }
}

fn map_user(user: &teloxide::types::User) -> UserRef {
    UserRef {
        id: user.id.0 as i64,
        username: user.username.clone(),
        first_name: Some(user.first_name.clone()),
        last_name: user.last_name.clone(),
        language_code: user.language_code.clone(),
        is_premium: user.is_premium,
    }
}

fn map_chat(chat: &teloxide::types::Chat) -> ChatRef {
    let kind = if chat.is_private() {
        ChatKind::Private
    } else if chat.is_group() {
        ChatKind::Group
    } else if chat.is_supergroup() {
        ChatKind::Supergroup
    } else {
        ChatKind::Channel
    };
    ChatRef {
        id: chat.id.0,
        kind,
        title: chat.title().map(str::to_owned),
    }
}

fn callback_chat(message: &MaybeInaccessibleMessage) -> &teloxide::types::Chat {
    match message {
        MaybeInaccessibleMessage::Regular(msg) => &msg.chat,
        MaybeInaccessibleMessage::Inaccessible(msg) => &msg.chat,
    }
}

/// Maps a message to the payload variant the pipeline inspects. Text wins;
/// media kinds the bot only logs collapse to their bare variants.
fn classify_message(msg: &teloxide::types::Message) -> UpdatePayload {
    if let Some(text) = msg.text() {
        UpdatePayload::Text {
            text: text.to_owned(),
        }
    } else if msg.photo().is_some() {
        UpdatePayload::Photo {
            caption: msg.caption().map(str::to_owned),
        }
    } else if msg.document().is_some() {
        UpdatePayload::Document
    } else if msg.voice().is_some() {
        UpdatePayload::Voice
    } else if msg.video().is_some() {
        UpdatePayload::Video
    } else if msg.sticker().is_some() {
        UpdatePayload::Sticker
    } else if msg.new_chat_members().is_some() {
        UpdatePayload::MemberJoined
    } else if msg.left_chat_member().is_some() {
        UpdatePayload::MemberLeft
    } else {
        UpdatePayload::Unsupported
    }
}
