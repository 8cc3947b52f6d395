//! Telegram Bot API transport

use super::{Notifier, NotifyError};

const API_BASE: &str = "https://api.telegram.org";

const HTTP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Delivers notifications through a Telegram bot chat
pub struct TelegramNotifier {
    client: reqwest::blocking::Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    /// Build a notifier with its own HTTP client
    pub fn new(
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, bot_token, chat_id))
    }

    pub fn with_client(
        client: reqwest::blocking::Client,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        }
    }
}

impl Notifier for TelegramNotifier {
    fn notify(&self, text: &str) -> Result<(), NotifyError> {
        let url = format!("{API_BASE}/bot{}/sendMessage", self.bot_token);
        let payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });

        let body: serde_json::Value = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .and_then(|response| response.json())
            .map_err(|e| NotifyError::Http { source: e })?;

        // Bot API reports failures in-band: {"ok": false, "description": ...}
        if body["ok"].as_bool().unwrap_or(false) {
            Ok(())
        } else {
            Err(NotifyError::Rejected {
                description: body["description"]
                    .as_str()
                    .unwrap_or("no description")
                    .to_string(),
            })
        }
    }
}
