//! Shared fixtures for stage tests: a recording bot double and update
//! builders.

use std::sync::Mutex;

use async_trait::async_trait;
use zultra_core::{Bot, BotError, ChatKind, ChatRef, Result, Update, UpdatePayload, UserRef};

/// Bot double that records outgoing messages instead of sending them.
pub struct RecordingBot {
    sent: Mutex<Vec<(i64, String)>>,
    fail: bool,
}

impl RecordingBot {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// A bot whose sends always fail, for veto-stands-on-error tests.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .expect("sent lock poisoned")
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        if self.fail {
            return Err(BotError::Transport("send failed".to_string()));
        }
        self.sent
            .lock()
            .expect("sent lock poisoned")
            .push((chat_id, text.to_string()));
        Ok(())
    }
}

fn test_user(user_id: i64) -> UserRef {
    UserRef {
        id: user_id,
        username: Some("testuser".to_string()),
        first_name: Some("Test".to_string()),
        last_name: None,
        language_code: Some("en".to_string()),
        is_premium: false,
    }
}

/// Builds a private-chat text update with chat_id equal to user_id.
pub fn text_update(user_id: i64, text: &str) -> Update {
    Update {
        update_id: 1,
        user: Some(test_user(user_id)),
        chat: Some(ChatRef {
            id: user_id,
            kind: ChatKind::Private,
            title: None,
        }),
        payload: UpdatePayload::Text {
            text: text.to_string(),
        },
    }
}

/// Builds a text update sent in a supergroup.
pub fn group_text_update(user_id: i64, chat_id: i64, text: &str) -> Update {
    Update {
        update_id: 2,
        user: Some(test_user(user_id)),
        chat: Some(ChatRef {
            id: chat_id,
            kind: ChatKind::Supergroup,
            title: Some("Test Group".to_string()),
        }),
        payload: UpdatePayload::Text {
            text: text.to_string(),
        },
    }
}

/// Builds a sticker update (no text payload) from the given user.
pub fn sticker_update(user_id: i64) -> Update {
    Update {
        update_id: 3,
        user: Some(test_user(user_id)),
        chat: Some(ChatRef {
            id: user_id,
            kind: ChatKind::Private,
            title: None,
        }),
        payload: UpdatePayload::Sticker,
    }
}

/// Builds an update with no originating user, e.g. a channel post.
pub fn anonymous_update() -> Update {
    Update {
        update_id: 4,
        user: None,
        chat: None,
        payload: UpdatePayload::Unsupported,
    }
}
