//! Shared test doubles.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::{
    domain::{ChatId, ChatKind, Message, Update, UpdateId, UserId},
    ports::Messenger,
    Result,
};

/// Messenger double that records every outbound message.
pub struct RecordingMessenger {
    sent: Mutex<Vec<(ChatId, String)>>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, t)| t.clone())
            .collect()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.texts().iter().filter(|t| t.contains(needle)).count()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.count(needle) > 0
    }

    /// Poll until some outbound message contains `needle`.
    pub async fn wait_for(&self, needle: &str) {
        self.wait_for_count(needle, 1).await;
    }

    /// Poll until at least `n` outbound messages contain `needle`.
    pub async fn wait_for_count(&self, needle: &str, n: usize) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            if self.count(needle) >= n {
                return;
            }
            if tokio::time::Instant::now() > deadline {
                panic!(
                    "timed out waiting for {n} message(s) containing {needle:?}; got: {:#?}",
                    self.texts()
                );
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, chat: ChatId, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push((chat, text.to_string()));
        Ok(())
    }
}

pub fn group_update(id: i64, chat: i64, sender: i64, handle: &str, text: &str) -> Update {
    Update {
        id: UpdateId(id),
        message: Some(Message {
            chat: ChatId(chat),
            chat_kind: ChatKind::Group,
            sender: UserId(sender),
            sender_handle: handle.to_string(),
            text: text.to_string(),
        }),
    }
}

pub fn group_message(chat: i64, sender: i64, handle: &str, text: &str) -> Message {
    Message {
        chat: ChatId(chat),
        chat_kind: ChatKind::Group,
        sender: UserId(sender),
        sender_handle: handle.to_string(),
        text: text.to_string(),
    }
}
