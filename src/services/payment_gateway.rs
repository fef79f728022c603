// src/services/payment_gateway.rs

use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::Sha256;
use utoipa::ToSchema;

use crate::common::error::AppError;

type HmacSha256 = Hmac<Sha256>;

// --- Tipos trocados com o gateway ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GatewayOrder {
    #[schema(example = "order_NXq1b2c3d4e5f6")]
    pub id: String,
    /// Valor em centavos/paise.
    #[schema(example = 60000)]
    pub amount: i64,
    #[schema(example = "INR")]
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayRefund {
    pub id: String,
    pub amount: i64,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Chave pública repassada ao checkout do navegador.
    fn key_id(&self) -> &str;

    async fn create_order(&self, amount_minor: i64, currency: &str, receipt: &str) -> Result<GatewayOrder, AppError>;

    async fn refund(&self, gateway_payment_id: &str, amount_minor: i64) -> Result<GatewayRefund, AppError>;

    /// Assinatura do checkout: HMAC(key_secret, "{orderId}|{paymentId}").
    fn verify_payment_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;

    /// Assinatura do webhook: HMAC(webhook_secret, corpo bruto).
    fn verify_webhook_signature(&self, body: &[u8], signature: &str) -> bool;
}

// --- Assinaturas (HMAC-SHA256 em hex) ---

pub fn sign_hex(secret: &[u8], message: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(message);
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Comparação em tempo constante. Segredo vazio nunca valida.
pub fn verify_hex(secret: &[u8], message: &[u8], signature_hex: &str) -> bool {
    if secret.is_empty() {
        return false;
    }
    let Ok(expected) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(message);
    mac.verify_slice(&expected).is_ok()
}

pub fn payment_signature_payload(order_id: &str, payment_id: &str) -> String {
    format!("{order_id}|{payment_id}")
}

/// Converte o valor decimal para a menor unidade da moeda (x100).
pub fn to_minor_units(amount: Decimal) -> Result<i64, AppError> {
    (amount * Decimal::ONE_HUNDRED)
        .round()
        .to_i64()
        .ok_or_else(|| AppError::InvalidInput(format!("valor fora do intervalo: {amount}")))
}

pub fn from_minor_units(amount_minor: i64) -> Decimal {
    Decimal::new(amount_minor, 2)
}

// ---
// Razorpay
// ---

#[derive(Debug, Clone)]
pub struct RazorpaySettings {
    pub base_url: String,
    pub key_id: String,
    pub key_secret: String,
    pub webhook_secret: String,
}

pub struct RazorpayGateway {
    client: reqwest::Client,
    settings: RazorpaySettings,
}

impl RazorpayGateway {
    pub fn new(settings: RazorpaySettings) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self { client, settings })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    async fn post<T: for<'de> Deserialize<'de>>(&self, path: &str, body: serde_json::Value) -> Result<T, AppError> {
        let response = self
            .client
            .post(self.url(path))
            .basic_auth(&self.settings.key_id, Some(&self.settings.key_secret))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!("Razorpay respondeu {} em {}: {}", status, path, text);
            return Err(AppError::PaymentGateway(format!("HTTP {status}")));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    fn key_id(&self) -> &str {
        &self.settings.key_id
    }

    async fn create_order(&self, amount_minor: i64, currency: &str, receipt: &str) -> Result<GatewayOrder, AppError> {
        self.post(
            "/v1/orders",
            json!({ "amount": amount_minor, "currency": currency, "receipt": receipt }),
        )
        .await
    }

    async fn refund(&self, gateway_payment_id: &str, amount_minor: i64) -> Result<GatewayRefund, AppError> {
        self.post(
            &format!("/v1/payments/{gateway_payment_id}/refund"),
            json!({ "amount": amount_minor }),
        )
        .await
    }

    fn verify_payment_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        verify_hex(
            self.settings.key_secret.as_bytes(),
            payment_signature_payload(order_id, payment_id).as_bytes(),
            signature,
        )
    }

    fn verify_webhook_signature(&self, body: &[u8], signature: &str) -> bool {
        verify_hex(self.settings.webhook_secret.as_bytes(), body, signature)
    }
}

// Usado quando as credenciais do gateway não estão configuradas.
pub struct DisabledGateway;

#[async_trait]
impl PaymentGateway for DisabledGateway {
    fn key_id(&self) -> &str {
        ""
    }

    async fn create_order(&self, _amount_minor: i64, _currency: &str, _receipt: &str) -> Result<GatewayOrder, AppError> {
        Err(AppError::PaymentGateway("gateway não configurado".into()))
    }

    async fn refund(&self, _gateway_payment_id: &str, _amount_minor: i64) -> Result<GatewayRefund, AppError> {
        Err(AppError::PaymentGateway("gateway não configurado".into()))
    }

    fn verify_payment_signature(&self, _order_id: &str, _payment_id: &str, _signature: &str) -> bool {
        false
    }

    fn verify_webhook_signature(&self, _body: &[u8], _signature: &str) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> RazorpayGateway {
        RazorpayGateway::new(RazorpaySettings {
            base_url: "https://api.razorpay.com".into(),
            key_id: "rzp_test_key".into(),
            key_secret: "key-secret".into(),
            webhook_secret: "hook-secret".into(),
        })
        .unwrap()
    }

    #[test]
    fn capture_signature_roundtrip() {
        let gw = gateway();
        let sig = sign_hex(b"key-secret", b"order_1|pay_1").unwrap();
        assert!(gw.verify_payment_signature("order_1", "pay_1", &sig));
        assert!(!gw.verify_payment_signature("order_1", "pay_2", &sig));
    }

    #[test]
    fn webhook_signature_uses_its_own_secret() {
        let gw = gateway();
        let body = br#"{"event":"payment.captured"}"#;
        let good = sign_hex(b"hook-secret", body).unwrap();
        let wrong_secret = sign_hex(b"key-secret", body).unwrap();
        assert!(gw.verify_webhook_signature(body, &good));
        assert!(!gw.verify_webhook_signature(body, &wrong_secret));
        assert!(!gw.verify_webhook_signature(b"{}", &good));
    }

    #[test]
    fn malformed_signatures_are_rejected() {
        assert!(!verify_hex(b"s", b"m", "not-hex"));
        assert!(!verify_hex(b"s", b"m", ""));
        assert!(!verify_hex(b"", b"m", &sign_hex(b"", b"m").unwrap()));
    }

    #[test]
    fn known_hmac_vector() {
        // RFC 4231, caso 2.
        let sig = sign_hex(b"Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(sig, "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843");
    }

    #[test]
    fn minor_units_conversion() {
        assert_eq!(to_minor_units(Decimal::new(60050, 2)).unwrap(), 60050);
        assert_eq!(to_minor_units(Decimal::new(1000, 0)).unwrap(), 100_000);
        assert_eq!(from_minor_units(60050), Decimal::new(60050, 2));
    }

    #[test]
    fn disabled_gateway_never_verifies() {
        let gw = DisabledGateway;
        assert!(!gw.verify_webhook_signature(b"x", "00"));
        assert_eq!(gw.key_id(), "");
    }
}
