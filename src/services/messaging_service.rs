// src/services/messaging_service.rs

use std::{collections::HashMap, sync::Arc};

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::MessagingRepository,
    models::{
        guest::Guest,
        messaging::{render, MessageChannel, MessageTemplate, OutboundMessage},
    },
    services::notifier::Notifier,
};

/// Código do template enviado automaticamente após uma reserva.
pub const BOOKING_CONFIRMED_TEMPLATE: &str = "BOOKING_CONFIRMED";

#[derive(Clone)]
pub struct MessagingService {
    messaging_repo: MessagingRepository,
    notifier: Arc<dyn Notifier>,
    pool: PgPool,
}

impl MessagingService {
    pub fn new(messaging_repo: MessagingRepository, notifier: Arc<dyn Notifier>, pool: PgPool) -> Self {
        Self { messaging_repo, notifier, pool }
    }

    // --- TEMPLATES ---

    pub async fn list_templates(&self, hotel_id: Uuid) -> Result<Vec<MessageTemplate>, AppError> {
        self.messaging_repo.list_templates(hotel_id).await
    }

    pub async fn create_template(
        &self,
        hotel_id: Uuid,
        code: &str,
        channel: MessageChannel,
        subject: Option<&str>,
        body: &str,
    ) -> Result<MessageTemplate, AppError> {
        let code = code.trim().to_uppercase();
        self.messaging_repo
            .create_template(&self.pool, hotel_id, &code, channel, subject, body)
            .await
    }

    // --- ENVIO ---

    /// Renderiza o template e despacha em segundo plano. Falhas do provedor só vão para o log.
    pub async fn send(
        &self,
        hotel_id: Uuid,
        template_code: &str,
        to: &str,
        vars: &HashMap<String, String>,
    ) -> Result<OutboundMessage, AppError> {
        let template = self
            .messaging_repo
            .find_by_code(hotel_id, &template_code.trim().to_uppercase())
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("template".into()))?;

        let message = build_message(&template, to, vars);
        self.dispatch(message.clone());
        Ok(message)
    }

    /// Avisa o hóspede pelo canal do template. Sem template ou sem endereço, não faz nada.
    pub async fn notify_guest(
        &self,
        hotel_id: Uuid,
        template_code: &str,
        guest: &Guest,
        vars: &HashMap<String, String>,
    ) -> Result<Option<OutboundMessage>, AppError> {
        let Some(template) = self.messaging_repo.find_by_code(hotel_id, template_code).await? else {
            return Ok(None);
        };

        let address = match template.channel {
            MessageChannel::Email => guest.email.clone(),
            MessageChannel::Sms | MessageChannel::Whatsapp => Some(guest.phone.clone()),
        };
        let Some(to) = address else {
            return Ok(None);
        };

        let message = build_message(&template, &to, vars);
        self.dispatch(message.clone());
        Ok(Some(message))
    }

    fn dispatch(&self, message: OutboundMessage) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.send(&message).await {
                tracing::warn!(channel = ?message.channel, to = %message.to, "Falha ao enviar mensagem: {}", e);
            }
        });
    }
}

pub fn build_message(template: &MessageTemplate, to: &str, vars: &HashMap<String, String>) -> OutboundMessage {
    OutboundMessage {
        channel: template.channel,
        to: to.to_string(),
        subject: template.subject.as_deref().map(|s| render(s, vars)),
        body: render(&template.body, vars),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn subject_and_body_are_both_rendered() {
        let template = MessageTemplate {
            id: Uuid::new_v4(),
            hotel_id: Uuid::nil(),
            code: BOOKING_CONFIRMED_TEMPLATE.into(),
            channel: MessageChannel::Email,
            subject: Some("Reserva {{bookingId}}".into()),
            body: "Olá {{guestName}}, até {{checkIn}}!".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let vars: HashMap<String, String> = [
            ("bookingId".to_string(), "B-1".to_string()),
            ("guestName".to_string(), "Ravi".to_string()),
        ]
        .into_iter()
        .collect();

        let message = build_message(&template, "ravi@example.in", &vars);
        assert_eq!(message.subject.as_deref(), Some("Reserva B-1"));
        assert_eq!(message.body, "Olá Ravi, até {{checkIn}}!");
        assert_eq!(message.channel, MessageChannel::Email);
    }
}
