pub mod twilio;

use async_trait::async_trait;
use thiserror::Error;

pub use twilio::{MockMessagingProvider, TwilioProvider};

/// Every way a delivery attempt can fail.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider not enabled: {0}")]
    NotEnabled(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Send error: {0}")]
    SendFailed(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Authentication error: {0}")]
    Authentication(String),
}

#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub provider_id: Option<String>,
}

/// A fully addressed chat message (`whatsapp:+1...` style addresses).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub from: String,
    pub to: String,
    pub body: String,
}

#[async_trait]
pub trait MessagingProvider: Send + Sync {
    async fn send(&self, message: &ChatMessage) -> Result<ProviderResponse, ProviderError>;
}
