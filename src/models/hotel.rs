// src/models/hotel.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "hotel_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HotelStatus {
    Pending,
    Active,
    Rejected,
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "onboarding_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStatus {
    Draft,
    Submitted,
    UnderReview,
    Approved,
    Rejected,
}

impl OnboardingStatus {
    /// Tabela de transições do fluxo de cadastro do hotel.
    pub fn can_transition_to(self, next: OnboardingStatus) -> bool {
        use OnboardingStatus::*;
        matches!(
            (self, next),
            (Draft, Submitted)
                | (Rejected, Submitted)
                | (Submitted, UnderReview)
                | (Submitted, Approved)
                | (Submitted, Rejected)
                | (UnderReview, Approved)
                | (UnderReview, Rejected)
        )
    }

    /// Dados cadastrais só podem ser editados antes do envio ou após rejeição.
    pub fn is_editable(self) -> bool {
        matches!(self, OnboardingStatus::Draft | OnboardingStatus::Rejected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "verification_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
    ReuploadRequested,
}

impl VerificationStatus {
    /// O super admin só revisa documentos pendentes, e a revisão não volta para `pending`.
    pub fn can_review_to(self, next: VerificationStatus) -> bool {
        self == VerificationStatus::Pending && next != VerificationStatus::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "member_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    Owner,
    Manager,
    FrontDesk,
    Housekeeping,
    Accountant,
}

impl MemberRole {
    /// Cargos que podem abrir novos hotéis na marca de um hotel que já administram.
    pub const BRAND_MANAGERS: [MemberRole; 2] = [MemberRole::Owner, MemberRole::Manager];

    /// Permissões concedidas por cargo. O dono tem acesso total.
    pub fn grants(self, permission: &str) -> bool {
        use MemberRole::*;
        match self {
            Owner => true,
            Manager => permission != "members:manage",
            FrontDesk => matches!(
                permission,
                "bookings:write" | "guests:write" | "folio:write" | "payments:write" | "messages:send"
            ),
            Housekeeping => matches!(permission, "rooms:status" | "inventory:write"),
            Accountant => matches!(
                permission,
                "folio:write" | "payments:write" | "payments:refund" | "inventory:write"
            ),
        }
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: Uuid,
    pub brand_id: Option<Uuid>,
    #[schema(example = "Hotel Aurora")]
    pub name: String,
    #[schema(example = "hotel-aurora")]
    pub slug: String,
    #[schema(example = "BOUTIQUE")]
    pub hotel_type: Option<String>,
    #[schema(example = "OWNER_OPERATED")]
    pub handling_type: Option<String>,
    pub address: Option<Value>,
    pub legal_info: Option<Value>,
    #[schema(example = "aurora@okaxis")]
    pub upi_id: Option<String>,
    pub onboarding_status: OnboardingStatus,
    pub status: HotelStatus,
    pub review_remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HotelMember {
    pub hotel_id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HotelDocument {
    pub id: Uuid,
    pub hotel_id: Uuid,
    #[schema(example = "GST_CERTIFICATE")]
    pub kind: String,
    #[schema(example = "https://files.example.com/docs/gst.pdf")]
    pub url: String,
    pub status: VerificationStatus,
    pub remarks: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn onboarding_flow_follows_table() {
        use OnboardingStatus::*;
        assert!(Draft.can_transition_to(Submitted));
        assert!(Submitted.can_transition_to(UnderReview));
        assert!(UnderReview.can_transition_to(Approved));
        assert!(Rejected.can_transition_to(Submitted));
        assert!(!Draft.can_transition_to(Approved));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Approved.can_transition_to(Submitted));
    }

    #[test]
    fn only_draft_or_rejected_hotels_are_editable() {
        assert!(OnboardingStatus::Draft.is_editable());
        assert!(OnboardingStatus::Rejected.is_editable());
        assert!(!OnboardingStatus::UnderReview.is_editable());
    }

    #[test]
    fn documents_are_reviewed_once_from_pending() {
        use VerificationStatus::*;
        assert!(Pending.can_review_to(Approved));
        assert!(Pending.can_review_to(ReuploadRequested));
        assert!(!Pending.can_review_to(Pending));
        assert!(!Approved.can_review_to(Rejected));
    }

    #[test]
    fn role_permissions() {
        assert!(MemberRole::Owner.grants("members:manage"));
        assert!(!MemberRole::Manager.grants("members:manage"));
        assert!(MemberRole::Manager.grants("rooms:write"));
        assert!(MemberRole::FrontDesk.grants("bookings:write"));
        assert!(!MemberRole::FrontDesk.grants("payments:refund"));
        assert!(MemberRole::Housekeeping.grants("rooms:status"));
        assert!(!MemberRole::Housekeeping.grants("bookings:write"));
        assert!(MemberRole::Accountant.grants("payments:refund"));
    }

    #[test]
    fn onboarding_status_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&OnboardingStatus::UnderReview).unwrap();
        assert_eq!(json, "\"under_review\"");
        let json = serde_json::to_string(&VerificationStatus::ReuploadRequested).unwrap();
        assert_eq!(json, "\"reupload_requested\"");
    }
}
