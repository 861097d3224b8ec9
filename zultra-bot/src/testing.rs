//! Test doubles and update fixtures shared by the unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use zultra_core::{
    Bot, BotError, ChatKind, ChatRef, Result, Update, UpdatePayload, UserRef,
};

/// In-memory [`Bot`] capturing every outbound message.
pub struct RecordingBot {
    sent: Mutex<Vec<(i64, String)>>,
    fail: bool,
}

impl RecordingBot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    /// A bot whose sends always fail.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, text)| text).collect()
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
            .unwrap_or_else(|e| e.into_inner())
            .push((chat_id, text.to_string()));
        Ok(())
    }
}

pub fn test_user(id: i64) -> UserRef {
    UserRef {
        id,
        username: Some("testuser".to_string()),
        first_name: Some("Test".to_string()),
        last_name: None,
        language_code: Some("en".to_string()),
        is_premium: false,
    }
}

/// Text (or command) update in a private chat whose id equals the user id.
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

/// Text update in a supergroup.
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

