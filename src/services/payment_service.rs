// src/services/payment_service.rs

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::FolioRepository,
    models::folio::{FolioPaymentStatus, Payment, PaymentMethod},
    services::{
        folio_service::FolioService,
        payment_gateway::{from_minor_units, to_minor_units, GatewayOrder, PaymentGateway},
    },
};

/// Dados que o front-end repassa ao checkout do gateway.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOrder {
    pub key_id: String,
    pub payment_id: Uuid,
    #[schema(example = "600.00")]
    pub amount: Decimal,
    pub order: GatewayOrder,
}

// --- Webhook (somente os campos usados) ---

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub payload: WebhookPayload,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    pub payment: Option<WebhookPaymentWrapper>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookPaymentWrapper {
    pub entity: WebhookPaymentEntity,
}

#[derive(Debug, Deserialize)]
pub struct WebhookPaymentEntity {
    pub id: String,
    pub order_id: Option<String>,
}

pub fn parse_webhook(body: &[u8]) -> Result<WebhookEvent, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::InvalidInput(format!("webhook: {e}")))
}

#[derive(Clone)]
pub struct PaymentService {
    folio_repo: FolioRepository,
    folio_service: FolioService,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
    pool: PgPool,
}

impl PaymentService {
    pub fn new(
        folio_repo: FolioRepository,
        folio_service: FolioService,
        gateway: Arc<dyn PaymentGateway>,
        currency: String,
        pool: PgPool,
    ) -> Self {
        Self { folio_repo, folio_service, gateway, currency, pool }
    }

    /// Abre um pedido no gateway pelo saldo do folio e registra o pagamento como PENDING.
    pub async fn create_order(&self, hotel_id: Uuid, booking_id: Uuid) -> Result<CheckoutOrder, AppError> {
        // 1. Saldo atual
        let folio = self
            .folio_repo
            .find_by_booking(hotel_id, booking_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("folio".into()))?;
        folio.ensure_open()?;
        if folio.balance <= Decimal::ZERO {
            return Err(AppError::InvalidInput("balance".into()));
        }

        // 2. Pedido no gateway (fora da transação)
        let amount_minor = to_minor_units(folio.balance)?;
        let order = self
            .gateway
            .create_order(amount_minor, &self.currency, &booking_id.to_string())
            .await?;

        // 3. Pagamento pendente vinculado ao pedido
        let mut tx = self.pool.begin().await?;
        let folio = self.folio_repo.lock_by_id(&mut *tx, folio.id).await?;
        folio.ensure_open()?;

        let amount = from_minor_units(order.amount);
        let payment = self
            .folio_repo
            .add_payment(
                &mut *tx,
                folio.id,
                PaymentMethod::Gateway,
                amount,
                FolioPaymentStatus::Pending,
                Some(&order.id),
            )
            .await?;
        tx.commit().await?;

        tracing::info!("💳 Pedido {} aberto para a reserva {} ({})", order.id, booking_id, amount);

        Ok(CheckoutOrder {
            key_id: self.gateway.key_id().to_string(),
            payment_id: payment.id,
            amount,
            order,
        })
    }

    /// Confirma o pagamento do checkout. Idempotente por (pedido, pagamento).
    pub async fn capture(
        &self,
        hotel_id: Uuid,
        booking_id: Uuid,
        order_id: &str,
        gateway_payment_id: &str,
        signature: &str,
    ) -> Result<Payment, AppError> {
        if !self.gateway.verify_payment_signature(order_id, gateway_payment_id, signature) {
            return Err(AppError::SignatureMismatch);
        }

        let mut tx = self.pool.begin().await?;

        let folio = self.folio_repo.lock_by_booking(&mut *tx, hotel_id, booking_id).await?;
        let pending = self
            .folio_repo
            .find_payment_by_order(&mut *tx, order_id)
            .await?
            .filter(|p| p.folio_id == folio.id)
            .ok_or_else(|| AppError::ResourceNotFound("payment".into()))?;
        let payment = self.folio_repo.lock_payment(&mut *tx, folio.id, pending.id).await?;

        match payment.status {
            FolioPaymentStatus::Pending => {}
            FolioPaymentStatus::Success if payment.gateway_payment_id.as_deref() == Some(gateway_payment_id) => {
                return Ok(payment);
            }
            other => {
                return Err(AppError::InvalidTransition {
                    entity: "payment",
                    from: format!("{other:?}"),
                    to: "Success".into(),
                });
            }
        }

        let captured = self
            .folio_repo
            .mark_captured(&mut *tx, payment.id, gateway_payment_id)
            .await?;
        self.folio_service.recompute(&mut tx, &folio).await?;

        tx.commit().await?;

        tracing::info!("✅ Pagamento {} capturado (pedido {})", gateway_payment_id, order_id);
        Ok(captured)
    }

    /// Estorno integral de um pagamento bem-sucedido.
    pub async fn refund(
        &self,
        hotel_id: Uuid,
        booking_id: Uuid,
        payment_id: Uuid,
        reason: Option<&str>,
    ) -> Result<Payment, AppError> {
        let mut tx = self.pool.begin().await?;

        let folio = self.folio_repo.lock_by_booking(&mut *tx, hotel_id, booking_id).await?;
        let payment = self.folio_repo.lock_payment(&mut *tx, folio.id, payment_id).await?;
        if payment.status != FolioPaymentStatus::Success {
            return Err(AppError::PaymentNotRefundable);
        }

        // Pagamentos do gateway são estornados lá; os demais só no livro.
        let refund_id = match payment.method {
            PaymentMethod::Gateway => {
                let gateway_payment_id = payment
                    .gateway_payment_id
                    .as_deref()
                    .ok_or(AppError::PaymentNotRefundable)?;
                let refund = self
                    .gateway
                    .refund(gateway_payment_id, to_minor_units(payment.amount)?)
                    .await?;
                Some(refund.id)
            }
            _ => None,
        };

        let refunded = self
            .folio_repo
            .mark_refunded(&mut *tx, payment.id, refund_id.as_deref(), payment.amount, reason)
            .await?;
        let folio = self.folio_service.recompute(&mut tx, &folio).await?;

        tx.commit().await?;

        tracing::info!("↩️ Pagamento {} estornado ({}); folio {:?}", payment.id, payment.amount, folio.status);
        Ok(refunded)
    }

    /// Webhook do gateway. Assinatura inválida é rejeitada; eventos desconhecidos são ignorados.
    pub async fn handle_webhook(&self, body: &[u8], signature: &str) -> Result<(), AppError> {
        if !self.gateway.verify_webhook_signature(body, signature) {
            return Err(AppError::SignatureMismatch);
        }

        let event = parse_webhook(body)?;
        let Some(entity) = event.payload.payment.map(|p| p.entity) else {
            tracing::debug!("Webhook '{}' sem pagamento, ignorado", event.event);
            return Ok(());
        };
        let Some(order_id) = entity.order_id.as_deref() else {
            return Ok(());
        };

        let mut tx = self.pool.begin().await?;

        let Some(found) = self.folio_repo.find_payment_by_order(&mut *tx, order_id).await? else {
            tracing::warn!("Webhook '{}' para pedido desconhecido {}", event.event, order_id);
            return Ok(());
        };
        let folio = self.folio_repo.lock_by_id(&mut *tx, found.folio_id).await?;
        let payment = self.folio_repo.lock_payment(&mut *tx, folio.id, found.id).await?;

        match (event.event.as_str(), payment.status) {
            ("payment.captured", FolioPaymentStatus::Pending) => {
                self.folio_repo.mark_captured(&mut *tx, payment.id, &entity.id).await?;
                self.folio_service.recompute(&mut tx, &folio).await?;
                tracing::info!("🔔 Webhook: pagamento {} capturado", entity.id);
            }
            ("payment.failed", FolioPaymentStatus::Pending) => {
                self.folio_repo.mark_failed(&mut *tx, payment.id).await?;
                tracing::info!("🔔 Webhook: pagamento do pedido {} falhou", order_id);
            }
            (name, status) => {
                tracing::debug!("Webhook '{}' ignorado (pagamento {:?})", name, status);
            }
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webhook_body_exposes_payment_and_order() {
        let body = br#"{
            "entity": "event",
            "event": "payment.captured",
            "payload": { "payment": { "entity": { "id": "pay_1", "order_id": "order_9", "amount": 60000 } } }
        }"#;
        let event = parse_webhook(body).unwrap();
        assert_eq!(event.event, "payment.captured");
        let entity = event.payload.payment.unwrap().entity;
        assert_eq!(entity.id, "pay_1");
        assert_eq!(entity.order_id.as_deref(), Some("order_9"));
    }

    #[test]
    fn webhook_without_payment_is_accepted() {
        let event = parse_webhook(br#"{"event":"refund.processed"}"#).unwrap();
        assert!(event.payload.payment.is_none());
        assert!(parse_webhook(b"not json").is_err());
    }
}
