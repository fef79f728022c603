// src/services/folio_service.rs

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BookingRepository, FolioRepository},
    models::{
        booking::BookingPaymentStatus,
        folio::{ChargeType, Folio, FolioDetail, FolioPaymentStatus, FolioTotals, PaymentMethod},
    },
};

#[derive(Clone)]
pub struct FolioService {
    folio_repo: FolioRepository,
    booking_repo: BookingRepository,
    pool: PgPool,
}

impl FolioService {
    pub fn new(folio_repo: FolioRepository, booking_repo: BookingRepository, pool: PgPool) -> Self {
        Self { folio_repo, booking_repo, pool }
    }

    // ---
    // Recalculo (chamado por toda escrita no folio, dentro da transação dela)
    // ---

    /// Recalcula os totais a partir de todas as linhas e sincroniza a reserva.
    pub async fn recompute(&self, conn: &mut PgConnection, folio: &Folio) -> Result<Folio, AppError> {
        // 1. Totais a partir das linhas
        let charges = self.folio_repo.list_charges(&mut *conn, folio.id).await?;
        let payments = self.folio_repo.list_payments(&mut *conn, folio.id).await?;
        let totals = FolioTotals::compute(&charges, &payments);

        // 2. Um estorno pode reabrir um folio fechado
        let status = folio.status_after(&totals);
        let updated = self.folio_repo.save_totals(&mut *conn, folio.id, &totals, status).await?;

        // 3. Espelha na reserva
        let has_refund = payments.iter().any(|p| p.status == FolioPaymentStatus::Refunded);
        let payment_status = BookingPaymentStatus::derive(totals.total_payments, totals.balance, has_refund);
        self.booking_repo
            .sync_payment(&mut *conn, folio.booking_id, totals.total_payments, payment_status)
            .await?;

        Ok(updated)
    }

    // ---
    // Leitura
    // ---

    pub async fn get_detail(&self, hotel_id: Uuid, booking_id: Uuid) -> Result<FolioDetail, AppError> {
        let folio = self
            .folio_repo
            .find_by_booking(hotel_id, booking_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("folio".into()))?;

        self.detail_of(folio).await
    }

    async fn detail_of(&self, folio: Folio) -> Result<FolioDetail, AppError> {
        let charges = self.folio_repo.list_charges(&self.pool, folio.id).await?;
        let payments = self.folio_repo.list_payments(&self.pool, folio.id).await?;
        Ok(FolioDetail { folio, charges, payments })
    }

    // ---
    // Escrita
    // ---

    pub async fn add_charge(
        &self,
        hotel_id: Uuid,
        booking_id: Uuid,
        charge_type: ChargeType,
        description: &str,
        amount: Decimal,
        quantity: i32,
    ) -> Result<FolioDetail, AppError> {
        if amount < Decimal::ZERO || quantity < 1 {
            return Err(AppError::InvalidInput("amount".into()));
        }

        let mut tx = self.pool.begin().await?;

        let folio = self.folio_repo.lock_by_booking(&mut *tx, hotel_id, booking_id).await?;
        folio.ensure_open()?;

        self.folio_repo
            .add_charge(&mut *tx, folio.id, charge_type, description, amount, quantity, true)
            .await?;
        let folio = self.recompute(&mut tx, &folio).await?;

        tx.commit().await?;

        tracing::info!("🧾 Lançamento de {} ({:?}) no folio {}", amount, charge_type, folio.id);
        self.detail_of(folio).await
    }

    /// Pagamento registrado na recepção (dinheiro, cartão na maquininha, UPI, transferência).
    pub async fn record_payment(
        &self,
        hotel_id: Uuid,
        booking_id: Uuid,
        method: PaymentMethod,
        amount: Decimal,
    ) -> Result<FolioDetail, AppError> {
        if method == PaymentMethod::Gateway {
            return Err(AppError::InvalidInput("method".into()));
        }
        if amount <= Decimal::ZERO {
            return Err(AppError::InvalidInput("amount".into()));
        }

        let mut tx = self.pool.begin().await?;

        let folio = self.folio_repo.lock_by_booking(&mut *tx, hotel_id, booking_id).await?;
        folio.ensure_open()?;

        self.folio_repo
            .add_payment(&mut *tx, folio.id, method, amount, FolioPaymentStatus::Success, None)
            .await?;
        let folio = self.recompute(&mut tx, &folio).await?;

        tx.commit().await?;

        tracing::info!("💵 Pagamento de {} ({:?}) no folio {}", amount, method, folio.id);
        self.detail_of(folio).await
    }

    /// Fecha a conta. Exige saldo zerado ou credor.
    pub async fn settle(&self, hotel_id: Uuid, booking_id: Uuid) -> Result<FolioDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let folio = self.folio_repo.lock_by_booking(&mut *tx, hotel_id, booking_id).await?;
        let folio = self.recompute(&mut tx, &folio).await?;
        folio.ensure_settleable()?;

        let settled = self.folio_repo.settle(&mut *tx, folio.id).await?;
        tx.commit().await?;

        tracing::info!("✅ Folio {} fechado", settled.id);
        self.detail_of(settled).await
    }
}
