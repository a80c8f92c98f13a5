use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use monitor::{AlertEvent, AlertSink, DeliveryError};

use crate::telegram::errors::TelegramError;
use crate::telegram::format;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    /// Shown in every alert.
    pub pool_label: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl TelegramConfig {
    pub fn new(
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
        pool_label: impl Into<String>,
    ) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            pool_label: pool_label.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    fn validate(&self) -> Result<(), TelegramError> {
        if self.bot_token.trim().is_empty() {
            return Err(TelegramError::NotConfigured("bot token is empty"));
        }
        if self.chat_id.trim().is_empty() {
            return Err(TelegramError::NotConfigured("chat id is empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends alerts to a Telegram chat through the Bot API `sendMessage` call.
/// One attempt per message; no retries.
#[derive(Clone)]
pub struct TelegramSink {
    http: Client,
    config: TelegramConfig,
}

impl TelegramSink {
    pub fn new(config: TelegramConfig) -> Result<Self, TelegramError> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }

    #[instrument(skip(self, text), fields(chat_id = %self.config.chat_id), level = "debug")]
    pub async fn send_message(&self, text: &str) -> Result<(), TelegramError> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token
        );

        let body = SendMessage {
            chat_id: &self.config.chat_id,
            text,
            parse_mode: "Markdown",
        };

        let resp = self.http.post(&url).json(&body).send().await?;
        let status = resp.status();
        let parsed: Option<ApiResponse> = resp.json().await.ok();

        match parsed {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => {
                debug!("telegram message sent");
                Ok(())
            }
            other => Err(TelegramError::Api {
                status: status.as_u16(),
                description: other
                    .and_then(|r| r.description)
                    .unwrap_or_else(|| "unexpected response".to_string()),
            }),
        }
    }

    fn timeout_error(&self) -> DeliveryError {
        DeliveryError::Timeout(self.config.timeout.as_millis() as u64)
    }

    fn map_error(&self, err: TelegramError) -> DeliveryError {
        if matches!(&err, TelegramError::Http(e) if e.is_timeout()) {
            return self.timeout_error();
        }
        err.into()
    }
}

#[async_trait]
impl AlertSink for TelegramSink {
    async fn deliver(&self, event: &AlertEvent) -> Result<(), DeliveryError> {
        let text = format::alert_message(event, &self.config.pool_label);
        self.send_message(&text)
            .await
            .map_err(|e| self.map_error(e))
    }

    async fn deliver_diagnostic(&self, message: &str) -> Result<(), DeliveryError> {
        let text = format::diagnostic_message(message);
        self.send_message(&text)
            .await
            .map_err(|e| self.map_error(e))
    }

    fn name(&self) -> &str {
        "telegram"
    }
}
