//! Telegram transport — long-polls the Bot API and renders replies.
//!
//! Native Bot API client over reqwest: `getUpdates` long-polling feeds a
//! stream of [`Update`]s; outgoing [`Reply`]s are rendered to
//! `sendMessage` calls with reply keyboards built from the router's
//! [`Keyboard`] descriptors.

use futures::Stream;
use secrecy::{ExposeSecret, SecretString};

use crate::bot::{BTN_REGISTER, BTN_USERS, BTN_WEATHER, IncomingEvent, Keyboard, Reply};
use crate::error::ChannelError;
use crate::listing::{MESSAGE_LIMIT, split_text};
use crate::profile::UserId;
use crate::registration::ChoiceSet;

/// Buttons per row in choice keyboards.
const KEYBOARD_ROW_WIDTH: usize = 6;

/// One inbound update: the routed event plus the chat to answer in.
#[derive(Debug, Clone)]
pub struct Update {
    pub chat_id: i64,
    pub event: IncomingEvent,
}

/// Telegram channel — connects to the Bot API via long-polling.
pub struct TelegramChannel {
    token: SecretString,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(token: SecretString) -> Self {
        Self {
            token,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "https://api.telegram.org/bot{}/{method}",
            self.token.expose_secret()
        )
    }

    /// Verify the token against `getMe`.
    pub async fn health_check(&self) -> Result<(), ChannelError> {
        let resp = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| ChannelError::HealthCheckFailed(e.to_string()))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ChannelError::HealthCheckFailed(format!(
                "getMe returned {}",
                resp.status()
            )))
        }
    }

    /// Start the long-polling loop, returning a stream of updates.
    pub fn updates(&self) -> impl Stream<Item = Update> + use<> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let url = self.api_url("getUpdates");
        let client = self.client.clone();

        tokio::spawn(async move {
            let mut offset: i64 = 0;

            tracing::info!("Telegram channel listening for messages...");

            loop {
                let body = serde_json::json!({
                    "offset": offset,
                    "timeout": 30,
                    "allowed_updates": ["message"]
                });

                let resp = match client.post(&url).json(&body).send().await {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!("Telegram poll error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                let data: serde_json::Value = match resp.json().await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("Telegram parse error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                if let Some(results) = data.get("result").and_then(serde_json::Value::as_array) {
                    for raw in results {
                        if let Some(uid) = raw.get("update_id").and_then(serde_json::Value::as_i64)
                        {
                            offset = uid + 1;
                        }

                        let Some(update) = parse_update(raw) else {
                            continue;
                        };

                        if tx.send(update).is_err() {
                            tracing::info!("Telegram listener channel closed");
                            return;
                        }
                    }
                }
            }
        });

        futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|update| (update, rx))
        })
    }

    /// Send one reply, splitting text over the message-size limit. The
    /// keyboard goes on the last chunk so it is visible after the text.
    pub async fn send_reply(&self, chat_id: i64, reply: &Reply) -> Result<(), ChannelError> {
        let chunks = split_text(&reply.text, MESSAGE_LIMIT);
        let markup = keyboard_markup(&reply.keyboard);

        let last = chunks.len().saturating_sub(1);
        for (i, chunk) in chunks.iter().enumerate() {
            let mut body = serde_json::json!({
                "chat_id": chat_id,
                "text": chunk,
            });
            if i == last {
                if let Some(ref markup) = markup {
                    body["reply_markup"] = markup.clone();
                }
            }
            self.send_chunk(chat_id, &body).await?;
        }
        Ok(())
    }

    async fn send_chunk(
        &self,
        chat_id: i64,
        body: &serde_json::Value,
    ) -> Result<(), ChannelError> {
        let resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                chat_id: chat_id.to_string(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err = resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                chat_id: chat_id.to_string(),
                reason: format!("sendMessage returned {status}: {err}"),
            });
        }
        Ok(())
    }
}

/// Extract a routable update from one raw `getUpdates` entry.
///
/// Non-message updates and messages without text are skipped. In private
/// chats the chat id equals the user id, but they are carried separately.
fn parse_update(raw: &serde_json::Value) -> Option<Update> {
    let message = raw.get("message")?;
    let text = message.get("text").and_then(serde_json::Value::as_str)?;
    let from = message.get("from")?;
    let user_id = from.get("id").and_then(serde_json::Value::as_i64)?;
    let chat_id = message
        .get("chat")
        .and_then(|c| c.get("id"))
        .and_then(serde_json::Value::as_i64)?;

    let display_name = from
        .get("username")
        .and_then(|u| u.as_str())
        .or_else(|| from.get("first_name").and_then(|n| n.as_str()))
        .map(String::from);

    Some(Update {
        chat_id,
        event: IncomingEvent {
            identity: UserId(user_id),
            display_name,
            text: text.to_string(),
        },
    })
}

/// Render a [`Keyboard`] to the Bot API `reply_markup` value.
fn keyboard_markup(keyboard: &Keyboard) -> Option<serde_json::Value> {
    match keyboard {
        Keyboard::None => None,
        Keyboard::Remove => Some(serde_json::json!({ "remove_keyboard": true })),
        Keyboard::MainMenu { is_admin } => {
            let mut rows = vec![vec![BTN_WEATHER], vec![BTN_REGISTER]];
            if *is_admin {
                rows.push(vec![BTN_USERS]);
            }
            Some(serde_json::json!({
                "keyboard": button_rows(rows.into_iter().flatten().map(String::from), 1),
                "resize_keyboard": true,
            }))
        }
        Keyboard::Choices(choices) => Some(serde_json::json!({
            "keyboard": button_rows(choices.options().into_iter(), KEYBOARD_ROW_WIDTH),
            "resize_keyboard": true,
            "one_time_keyboard": true,
        })),
    }
}

/// Lay out button labels in rows of at most `width`.
fn button_rows(labels: impl Iterator<Item = String>, width: usize) -> serde_json::Value {
    let mut rows: Vec<Vec<serde_json::Value>> = Vec::new();
    let mut row = Vec::new();
    for label in labels {
        row.push(serde_json::json!({ "text": label }));
        if row.len() == width {
            rows.push(std::mem::take(&mut row));
        }
    }
    if !row.is_empty() {
        rows.push(row);
    }
    serde_json::json!(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> TelegramChannel {
        TelegramChannel::new(SecretString::from("123:ABC"))
    }

    #[test]
    fn api_url_embeds_token() {
        assert_eq!(
            channel().api_url("getMe"),
            "https://api.telegram.org/bot123:ABC/getMe"
        );
    }

    #[test]
    fn parse_update_extracts_fields() {
        let raw = serde_json::json!({
            "update_id": 10,
            "message": {
                "text": "Register",
                "from": { "id": 42, "username": "alice", "first_name": "Alice" },
                "chat": { "id": 42 }
            }
        });
        let update = parse_update(&raw).unwrap();
        assert_eq!(update.chat_id, 42);
        assert_eq!(update.event.identity, UserId(42));
        assert_eq!(update.event.display_name.as_deref(), Some("alice"));
        assert_eq!(update.event.text, "Register");
    }

    #[test]
    fn parse_update_falls_back_to_first_name() {
        let raw = serde_json::json!({
            "message": {
                "text": "hi",
                "from": { "id": 1, "first_name": "Bob" },
                "chat": { "id": 1 }
            }
        });
        let update = parse_update(&raw).unwrap();
        assert_eq!(update.event.display_name.as_deref(), Some("Bob"));
    }

    #[test]
    fn parse_update_skips_non_text() {
        let raw = serde_json::json!({
            "message": {
                "from": { "id": 1 },
                "chat": { "id": 1 },
                "photo": []
            }
        });
        assert!(parse_update(&raw).is_none());
    }

    #[test]
    fn hour_keyboard_has_rows_of_six() {
        let markup = keyboard_markup(&Keyboard::Choices(ChoiceSet::HourOptions)).unwrap();
        let rows = markup["keyboard"].as_array().unwrap();
        assert_eq!(rows.len(), 4);
        for row in rows {
            assert_eq!(row.as_array().unwrap().len(), 6);
        }
        assert_eq!(rows[0][0]["text"], "0");
        assert_eq!(rows[3][5]["text"], "23");
        assert_eq!(markup["one_time_keyboard"], true);
    }

    #[test]
    fn minute_keyboard_has_twelve_buttons() {
        let markup = keyboard_markup(&Keyboard::Choices(ChoiceSet::MinuteOptions)).unwrap();
        let rows = markup["keyboard"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][5]["text"], "55");
    }

    #[test]
    fn gender_keyboard_is_single_row() {
        let markup = keyboard_markup(&Keyboard::Choices(ChoiceSet::GenderOptions)).unwrap();
        let rows = markup["keyboard"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0]["text"], "Male");
        assert_eq!(rows[0][1]["text"], "Female");
    }

    #[test]
    fn main_menu_admin_button_only_for_admin() {
        let markup = keyboard_markup(&Keyboard::MainMenu { is_admin: false }).unwrap();
        assert_eq!(markup["keyboard"].as_array().unwrap().len(), 2);

        let markup = keyboard_markup(&Keyboard::MainMenu { is_admin: true }).unwrap();
        let rows = markup["keyboard"].as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2][0]["text"], "Users");
    }

    #[test]
    fn remove_and_none_markup() {
        assert_eq!(
            keyboard_markup(&Keyboard::Remove),
            Some(serde_json::json!({ "remove_keyboard": true }))
        );
        assert_eq!(keyboard_markup(&Keyboard::None), None);
    }
}
