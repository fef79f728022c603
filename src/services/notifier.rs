// src/services/notifier.rs

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::{
    common::error::AppError,
    models::messaging::{MessageChannel, OutboundMessage},
};

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<(), AppError>;
}

// Apenas registra no log (SMS/WhatsApp e e-mail sem provedor configurado).
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn send(&self, message: &OutboundMessage) -> Result<(), AppError> {
        tracing::info!(
            channel = ?message.channel,
            to = %message.to,
            "📨 Mensagem (sem provedor): {}",
            message.subject.as_deref().unwrap_or("-")
        );
        Ok(())
    }
}

// ---
// Resend (e-mail via HTTP)
// ---

pub struct ResendNotifier {
    client: reqwest::Client,
    api_key: String,
    from: String,
}

impl ResendNotifier {
    const ENDPOINT: &'static str = "https://api.resend.com/emails";

    pub fn new(api_key: String, from: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, api_key, from })
    }
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn send(&self, message: &OutboundMessage) -> Result<(), AppError> {
        let response = self
            .client
            .post(Self::ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": [message.to],
                "subject": message.subject.as_deref().unwrap_or(""),
                "text": message.body,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::MessagingProvider(format!("Resend HTTP {}", response.status())));
        }
        Ok(())
    }
}

// Escolhe o provedor pelo canal da mensagem.
pub struct ChannelNotifier {
    email: Option<ResendNotifier>,
    fallback: LoggingNotifier,
}

impl ChannelNotifier {
    pub fn new(email: Option<ResendNotifier>) -> Self {
        Self { email, fallback: LoggingNotifier }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn send(&self, message: &OutboundMessage) -> Result<(), AppError> {
        match (&message.channel, &self.email) {
            (MessageChannel::Email, Some(resend)) => resend.send(message).await,
            _ => self.fallback.send(message).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_channels_fall_back_to_logging() {
        let notifier = ChannelNotifier::new(None);
        let message = OutboundMessage {
            channel: MessageChannel::Whatsapp,
            to: "+919812345678".into(),
            subject: None,
            body: "Olá".into(),
        };
        assert!(notifier.send(&message).await.is_ok());

        let email = OutboundMessage { channel: MessageChannel::Email, to: "a@b.in".into(), ..message };
        assert!(notifier.send(&email).await.is_ok());
    }
}
