use super::{ChatMessage, MessagingProvider, ProviderError, ProviderResponse};
use crate::config::TwilioConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

pub struct TwilioProvider {
    config: TwilioConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct TwilioMessageRequest<'a> {
    #[serde(rename = "From")]
    from: &'a str,
    #[serde(rename = "To")]
    to: &'a str,
    #[serde(rename = "Body")]
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct TwilioMessageResponse {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorResponse {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

impl TwilioProvider {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.account_sid
        )
    }
}

#[async_trait]
impl MessagingProvider for TwilioProvider {
    async fn send(&self, message: &ChatMessage) -> Result<ProviderResponse, ProviderError> {
        if !self.config.enabled {
            return Err(ProviderError::NotEnabled(
                "Twilio provider is not enabled".to_string(),
            ));
        }

        let request = TwilioMessageRequest {
            from: &message.from,
            to: &message.to,
            body: &message.body,
        };

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(
                &self.config.account_sid,
                Some(self.config.auth_token.expose_secret()),
            )
            .form(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Connection(format!("Twilio request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<TwilioErrorResponse>().await {
                Ok(err) => match err.code {
                    Some(code) => format!("{} (code {})", err.message, code),
                    None => err.message,
                },
                Err(_) => status.to_string(),
            };

            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    ProviderError::Authentication(detail)
                }
                StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(detail),
                _ => ProviderError::SendFailed(format!("Twilio returned {}: {}", status, detail)),
            });
        }

        let twilio_response: TwilioMessageResponse = response.json().await.map_err(|e| {
            ProviderError::SendFailed(format!("Failed to parse Twilio response: {}", e))
        })?;

        tracing::info!(
            to = %message.to,
            sid = %twilio_response.sid,
            "Message accepted by Twilio"
        );

        Ok(ProviderResponse {
            provider_id: Some(twilio_response.sid),
        })
    }
}

/// Mock provider used when Twilio is disabled, and in tests.
pub struct MockMessagingProvider {
    succeed: bool,
    send_count: AtomicU64,
    sent: Mutex<Vec<ChatMessage>>,
}

impl MockMessagingProvider {
    /// A provider that accepts (`succeed = true`) or rejects every message.
    pub fn new(succeed: bool) -> Self {
        Self {
            succeed,
            send_count: AtomicU64::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    /// Messages accepted so far, oldest first.
    pub fn sent_messages(&self) -> Vec<ChatMessage> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MessagingProvider for MockMessagingProvider {
    async fn send(&self, message: &ChatMessage) -> Result<ProviderResponse, ProviderError> {
        if !self.succeed {
            return Err(ProviderError::SendFailed(
                "[MOCK] provider configured to fail".to_string(),
            ));
        }

        let count = self.send_count.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message.clone());
        }

        tracing::info!(
            to = %message.to,
            body_length = %message.body.len(),
            "[MOCK] Message would be sent"
        );

        Ok(ProviderResponse {
            provider_id: Some(format!("mock-msg-{}", count)),
        })
    }
}
