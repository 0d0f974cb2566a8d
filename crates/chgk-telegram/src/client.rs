//! Minimal Bot API HTTP client: `getUpdates` long poll + `sendMessage`.

use std::time::Duration;

use serde_json::json;

use chgk_core::{Error, Result};

use crate::dto::{GetUpdatesResponse, SendMessageResponse, UpdateObj};

/// Extra slack on top of the long-poll timeout before the HTTP request
/// itself is considered dead.
const HTTP_SLACK: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct TgClient {
    http: reqwest::Client,
    base: String,
}

impl TgClient {
    pub fn new(token: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("http client: {e}")))?;
        Ok(Self {
            http,
            base: format!("https://api.telegram.org/bot{token}"),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{method}", self.base)
    }

    pub async fn get_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<UpdateObj>> {
        let timeout_secs = timeout.as_secs();
        let resp = self
            .http
            .get(self.url("getUpdates"))
            .query(&[("offset", offset.to_string()), ("timeout", timeout_secs.to_string())])
            .timeout(timeout + HTTP_SLACK)
            .send()
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?;

        let body: GetUpdatesResponse = resp
            .json()
            .await
            .map_err(|e| Error::Fetch(format!("bad getUpdates payload: {e}")))?;

        if !body.ok {
            return Err(Error::Fetch(
                body.description.unwrap_or_else(|| "getUpdates returned ok=false".to_string()),
            ));
        }
        Ok(body.result)
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let resp = self
            .http
            .post(self.url("sendMessage"))
            .json(&json!({ "chat_id": chat_id, "text": text }))
            .timeout(HTTP_SLACK)
            .send()
            .await
            .map_err(|e| Error::Send(e.to_string()))?;

        let body: SendMessageResponse = resp
            .json()
            .await
            .map_err(|e| Error::Send(format!("bad sendMessage payload: {e}")))?;

        if !body.ok {
            return Err(Error::Send(
                body.description.unwrap_or_else(|| "sendMessage returned ok=false".to_string()),
            ));
        }
        Ok(())
    }
}
