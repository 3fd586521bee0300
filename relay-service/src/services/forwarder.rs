//! Delivery of one-time security codes through the messaging provider.

use crate::models::{ChatChannel, SecurityCode};
use crate::services::providers::{ChatMessage, MessagingProvider};
use std::sync::Arc;
use tracing::instrument;

#[derive(Clone)]
pub struct CodeForwarder {
    provider: Arc<dyn MessagingProvider>,
    channel: ChatChannel,
    sender: String,
}

impl CodeForwarder {
    /// `sender` is the bare number messages are sent from.
    pub fn new(provider: Arc<dyn MessagingProvider>, sender: impl Into<String>) -> Self {
        Self {
            provider,
            channel: ChatChannel::default(),
            sender: sender.into(),
        }
    }

    pub fn message_for(&self, code: &SecurityCode) -> ChatMessage {
        ChatMessage {
            from: self.channel.address(&self.sender),
            to: self.channel.address(&code.phone_number),
            body: code.message_body(),
        }
    }

    /// Deliver `code`. Returns whether the provider accepted the message;
    /// provider failures are logged and never propagated.
    #[instrument(skip(self, code), fields(channel = %self.channel))]
    pub async fn forward(&self, code: &SecurityCode) -> bool {
        let message = self.message_for(code);

        match self.provider.send(&message).await {
            Ok(response) => {
                tracing::info!(
                    provider_id = response.provider_id.as_deref().unwrap_or("unknown"),
                    "Security code sent"
                );
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to send security code");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::MockMessagingProvider;

    fn code() -> SecurityCode {
        SecurityCode {
            phone_number: "+15551234567".to_string(),
            code: "424242".to_string(),
        }
    }

    #[test]
    fn builds_whatsapp_message() {
        let forwarder = CodeForwarder::new(Arc::new(MockMessagingProvider::new(true)), "+14155238886");

        assert_eq!(
            forwarder.message_for(&code()),
            ChatMessage {
                from: "whatsapp:+14155238886".to_string(),
                to: "whatsapp:+15551234567".to_string(),
                body: "Your security code is: 424242".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn reports_success() {
        let provider = Arc::new(MockMessagingProvider::new(true));
        let forwarder = CodeForwarder::new(provider.clone(), "+14155238886");

        assert!(forwarder.forward(&code()).await);
        assert_eq!(provider.send_count(), 1);
        assert_eq!(provider.sent_messages()[0].to, "whatsapp:+15551234567");
    }

    #[tokio::test]
    async fn swallows_provider_failure() {
        let provider = Arc::new(MockMessagingProvider::new(false));
        let forwarder = CodeForwarder::new(provider.clone(), "+14155238886");

        assert!(!forwarder.forward(&code()).await);
        assert_eq!(provider.send_count(), 0);
    }
}
