//! Wire types for the Bot API methods we call.
//!
//! Unknown fields are ignored everywhere; the core treats an update as an
//! opaque record and only the pieces below matter.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GetUpdatesResponse {
    pub ok: bool,
    #[serde(default)]
    pub result: Vec<UpdateObj>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateObj {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<MessageObj>,
}

#[derive(Debug, Deserialize)]
pub struct MessageObj {
    #[serde(rename = "from")]
    pub sender: Option<UserObj>,
    pub chat: ChatObj,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserObj {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatObj {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageResponse {
    pub ok: bool,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_get_updates_payload() {
        let raw = r#"{
            "ok": true,
            "result": [
                {
                    "update_id": 42,
                    "message": {
                        "message_id": 7,
                        "from": {"id": 1, "is_bot": false, "first_name": "Alice", "username": "alice"},
                        "chat": {"id": -100, "title": "quiz", "type": "supergroup"},
                        "date": 1700000000,
                        "text": "/join"
                    }
                },
                {"update_id": 43, "my_chat_member": {"date": 1700000001}}
            ]
        }"#;

        let parsed: GetUpdatesResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.ok);
        assert_eq!(parsed.result.len(), 2);

        let first = &parsed.result[0];
        assert_eq!(first.update_id, 42);
        let msg = first.message.as_ref().unwrap();
        assert_eq!(msg.chat.id, -100);
        assert_eq!(msg.chat.kind, "supergroup");
        assert_eq!(msg.sender.as_ref().unwrap().username.as_deref(), Some("alice"));
        assert_eq!(msg.text.as_deref(), Some("/join"));

        // Non-message updates still carry their id for the cursor.
        assert_eq!(parsed.result[1].update_id, 43);
        assert!(parsed.result[1].message.is_none());
    }

    #[test]
    fn parses_an_error_response() {
        let raw = r#"{"ok": false, "description": "Unauthorized"}"#;
        let parsed: SendMessageResponse = serde_json::from_str(raw).unwrap();
        assert!(!parsed.ok);
        assert_eq!(parsed.description.as_deref(), Some("Unauthorized"));
    }
}
