//! Telegram adapter.
//!
//! Implements the `chgk-core` `UpdateSource` and `Messenger` ports over the
//! raw Bot API. The poller owns the update cursor, so this crate stays a
//! thin request/response client and never drives its own dispatch loop.

use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use chgk_core::{
    domain::{ChatId, ChatKind, Message, Update, UpdateId, UserId},
    ports::{Messenger, UpdateSource},
    Result,
};

pub mod client;
pub mod dto;

pub use client::TgClient;

fn chat_kind(raw: &str) -> ChatKind {
    match raw {
        "private" => ChatKind::Private,
        "group" => ChatKind::Group,
        "supergroup" => ChatKind::Supergroup,
        "channel" => ChatKind::Channel,
        _ => ChatKind::Unknown,
    }
}

/// Map one wire update into the domain shape. The id always survives so the
/// cursor can advance; the message only when it is a usable text message.
fn map_update(raw: dto::UpdateObj) -> Update {
    let message = raw.message.and_then(|m| {
        let sender = m.sender?;
        let text = m.text?;
        let handle = sender.username.or(sender.first_name)?;
        Some(Message {
            chat: ChatId(m.chat.id),
            chat_kind: chat_kind(&m.chat.kind),
            sender: UserId(sender.id),
            sender_handle: handle,
            text,
        })
    });

    Update {
        id: UpdateId(raw.update_id),
        message,
    }
}

/// `UpdateSource` over `getUpdates`.
pub struct TelegramUpdateSource {
    client: TgClient,
}

impl TelegramUpdateSource {
    pub fn new(client: TgClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UpdateSource for TelegramUpdateSource {
    async fn fetch(&self, cursor: i64, timeout: Duration) -> Result<Vec<Update>> {
        let batch = self.client.get_updates(cursor, timeout).await?;
        trace!(cursor, count = batch.len(), "fetched updates");
        Ok(batch.into_iter().map(map_update).collect())
    }
}

/// `Messenger` over `sendMessage`.
pub struct TelegramMessenger {
    client: TgClient,
}

impl TelegramMessenger {
    pub fn new(client: TgClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send(&self, chat: ChatId, text: &str) -> Result<()> {
        self.client.send_message(chat.0, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_message(kind: &str, username: Option<&str>, text: Option<&str>) -> dto::UpdateObj {
        dto::UpdateObj {
            update_id: 1,
            message: Some(dto::MessageObj {
                sender: Some(dto::UserObj {
                    id: 7,
                    username: username.map(str::to_string),
                    first_name: Some("Alice".to_string()),
                }),
                chat: dto::ChatObj {
                    id: -100,
                    kind: kind.to_string(),
                },
                text: text.map(str::to_string),
            }),
        }
    }

    #[test]
    fn maps_a_group_text_message() {
        let update = map_update(raw_message("supergroup", Some("alice"), Some("/start")));
        let msg = update.message.unwrap();
        assert_eq!(msg.chat, ChatId(-100));
        assert_eq!(msg.chat_kind, ChatKind::Supergroup);
        assert_eq!(msg.sender, UserId(7));
        assert_eq!(msg.sender_handle, "alice");
        assert_eq!(msg.text, "/start");
    }

    #[test]
    fn falls_back_to_first_name_without_a_username() {
        let update = map_update(raw_message("group", None, Some("hi")));
        assert_eq!(update.message.unwrap().sender_handle, "Alice");
    }

    #[test]
    fn keeps_the_id_when_the_message_is_unusable() {
        // No text (e.g. a photo): the update still advances the cursor.
        let update = map_update(raw_message("group", Some("alice"), None));
        assert_eq!(update.id, UpdateId(1));
        assert!(update.message.is_none());

        let bare = map_update(dto::UpdateObj {
            update_id: 9,
            message: None,
        });
        assert_eq!(bare.id, UpdateId(9));
        assert!(bare.message.is_none());
    }

    #[test]
    fn unknown_chat_kinds_are_not_groups() {
        assert_eq!(chat_kind("private"), ChatKind::Private);
        assert_eq!(chat_kind("group"), ChatKind::Group);
        assert_eq!(chat_kind("sender"), ChatKind::Unknown);
        assert!(!chat_kind("sender").is_group());
    }
}
