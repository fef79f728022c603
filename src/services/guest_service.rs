// src/services/guest_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BookingRepository, GuestRepository},
    models::guest::{normalize_phone, Guest, KycStatus},
};

#[derive(Clone)]
pub struct GuestService {
    guest_repo: GuestRepository,
    booking_repo: BookingRepository,
    pool: PgPool,
}

impl GuestService {
    pub fn new(guest_repo: GuestRepository, booking_repo: BookingRepository, pool: PgPool) -> Self {
        Self { guest_repo, booking_repo, pool }
    }

    pub async fn list(&self, hotel_id: Uuid, search: Option<&str>) -> Result<Vec<Guest>, AppError> {
        self.guest_repo.list(hotel_id, search).await
    }

    pub async fn get(&self, hotel_id: Uuid, guest_id: Uuid) -> Result<Guest, AppError> {
        self.guest_repo
            .find_by_id(hotel_id, guest_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("guest".into()))
    }

    /// Find-or-create pelo telefone normalizado.
    pub async fn upsert(
        &self,
        hotel_id: Uuid,
        full_name: &str,
        phone: &str,
        email: Option<&str>,
    ) -> Result<Guest, AppError> {
        let phone = normalize_phone(phone);
        if phone.trim_start_matches('+').is_empty() {
            return Err(AppError::InvalidInput("phone".into()));
        }
        self.guest_repo
            .upsert_by_phone(&self.pool, hotel_id, full_name.trim(), &phone, email)
            .await
    }

    /// Envio (ou reenvio) dos documentos de identificação.
    pub async fn submit_kyc(
        &self,
        hotel_id: Uuid,
        guest_id: Uuid,
        id_proof_type: &str,
        id_proof_number: &str,
        id_proof_url: &str,
        selfie_url: Option<&str>,
    ) -> Result<Guest, AppError> {
        let mut tx = self.pool.begin().await?;

        let guest = self.guest_repo.lock_by_id(&mut *tx, hotel_id, guest_id).await?;
        if !guest.kyc_status.can_submit() {
            return Err(AppError::InvalidTransition {
                entity: "kyc",
                from: format!("{:?}", guest.kyc_status),
                to: "Submitted".into(),
            });
        }

        let updated = self
            .guest_repo
            .submit_kyc(&mut *tx, guest_id, id_proof_type, id_proof_number, id_proof_url, selfie_url)
            .await?;
        self.booking_repo
            .sync_guest_kyc(&mut *tx, guest_id, KycStatus::Submitted)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Revisão pela recepção: só VERIFIED ou REJECTED.
    pub async fn review_kyc(&self, hotel_id: Uuid, guest_id: Uuid, status: KycStatus) -> Result<Guest, AppError> {
        if !matches!(status, KycStatus::Verified | KycStatus::Rejected) {
            return Err(AppError::InvalidInput("status".into()));
        }

        let mut tx = self.pool.begin().await?;

        let guest = self.guest_repo.lock_by_id(&mut *tx, hotel_id, guest_id).await?;
        if !guest.kyc_status.can_review() {
            return Err(AppError::InvalidTransition {
                entity: "kyc",
                from: format!("{:?}", guest.kyc_status),
                to: format!("{status:?}"),
            });
        }

        let updated = self.guest_repo.set_kyc_status(&mut *tx, guest_id, status).await?;
        let bookings = self.booking_repo.sync_guest_kyc(&mut *tx, guest_id, status).await?;

        tx.commit().await?;

        tracing::info!("🪪 KYC do hóspede {} -> {:?} ({} reservas atualizadas)", guest_id, status, bookings);
        Ok(updated)
    }
}
