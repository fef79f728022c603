// src/models/guest.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "kyc_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycStatus {
    Pending,
    Submitted,
    Verified,
    Rejected,
}

impl KycStatus {
    /// O hóspede (re)envia documentos enquanto não estiver verificado.
    pub fn can_submit(self) -> bool {
        self != KycStatus::Verified
    }

    /// A recepção só revisa o que foi enviado.
    pub fn can_review(self) -> bool {
        self == KycStatus::Submitted
    }
}

// Hóspede: deduplicado por (hotel_id, phone).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub id: Uuid,
    #[schema(ignore)]
    pub hotel_id: Uuid,
    #[schema(example = "Meera Iyer")]
    pub full_name: String,
    #[schema(example = "+919812345678")]
    pub phone: String,
    pub email: Option<String>,
    #[schema(example = "AADHAAR")]
    pub id_proof_type: Option<String>,
    pub id_proof_number: Option<String>,
    pub id_proof_url: Option<String>,
    pub selfie_url: Option<String>,
    pub kyc_status: KycStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Normaliza o telefone usado como chave de deduplicação:
/// remove espaços, hífens e parênteses, preservando o `+` inicial.
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    let (prefix, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", trimmed),
    };
    let digits: String = rest.chars().filter(|c| c.is_ascii_digit()).collect();
    format!("{prefix}{digits}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_normalization_keeps_dedup_key_stable() {
        assert_eq!(normalize_phone(" +91 98123-45678 "), "+919812345678");
        assert_eq!(normalize_phone("(0294) 242 1234"), "02942421234");
        assert_eq!(normalize_phone("+91 98123 45678"), normalize_phone("+91-98123-45678"));
    }

    #[test]
    fn kyc_rules() {
        assert!(KycStatus::Pending.can_submit());
        assert!(KycStatus::Rejected.can_submit());
        assert!(!KycStatus::Verified.can_submit());
        assert!(KycStatus::Submitted.can_review());
        assert!(!KycStatus::Pending.can_review());
    }
}
