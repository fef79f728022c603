// src/db/folio_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::folio::{
        Charge, ChargeType, Folio, FolioPaymentStatus, FolioStatus, FolioTotals, Payment, PaymentMethod,
    },
};

#[derive(Clone)]
pub struct FolioRepository {
    pool: PgPool,
}

impl FolioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Folio
    // ---

    pub async fn create<'e, E>(&self, executor: E, hotel_id: Uuid, booking_id: Uuid) -> Result<Folio, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Folio>(
            r#"
            INSERT INTO folios (hotel_id, booking_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(hotel_id)
        .bind(booking_id)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "folio"))
    }

    pub async fn find_by_booking(&self, hotel_id: Uuid, booking_id: Uuid) -> Result<Option<Folio>, AppError> {
        let folio = sqlx::query_as::<_, Folio>("SELECT * FROM folios WHERE booking_id = $1 AND hotel_id = $2")
            .bind(booking_id)
            .bind(hotel_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(folio)
    }

    /// Trava o folio da reserva: todo lançamento passa por aqui.
    pub async fn lock_by_booking<'e, E>(&self, executor: E, hotel_id: Uuid, booking_id: Uuid) -> Result<Folio, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Folio>("SELECT * FROM folios WHERE booking_id = $1 AND hotel_id = $2 FOR UPDATE")
            .bind(booking_id)
            .bind(hotel_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("folio".into()))
    }

    pub async fn lock_by_id<'e, E>(&self, executor: E, folio_id: Uuid) -> Result<Folio, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Folio>("SELECT * FROM folios WHERE id = $1 FOR UPDATE")
            .bind(folio_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("folio".into()))
    }

    pub async fn save_totals<'e, E>(
        &self,
        executor: E,
        folio_id: Uuid,
        totals: &FolioTotals,
        status: FolioStatus,
    ) -> Result<Folio, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let folio = sqlx::query_as::<_, Folio>(
            r#"
            UPDATE folios
            SET total_charges = $2, total_payments = $3, balance = $4, status = $5,
                settled_at = CASE WHEN $5 = 'SETTLED'::folio_status THEN settled_at ELSE NULL END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(folio_id)
        .bind(totals.total_charges)
        .bind(totals.total_payments)
        .bind(totals.balance)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(folio)
    }

    pub async fn settle<'e, E>(&self, executor: E, folio_id: Uuid) -> Result<Folio, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let folio = sqlx::query_as::<_, Folio>(
            r#"
            UPDATE folios
            SET status = 'SETTLED', settled_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(folio_id)
        .fetch_one(executor)
        .await?;
        Ok(folio)
    }

    // ---
    // Linhas
    // ---

    pub async fn list_charges<'e, E>(&self, executor: E, folio_id: Uuid) -> Result<Vec<Charge>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let charges = sqlx::query_as::<_, Charge>(
            "SELECT * FROM folio_charges WHERE folio_id = $1 ORDER BY created_at ASC",
        )
        .bind(folio_id)
        .fetch_all(executor)
        .await?;
        Ok(charges)
    }

    pub async fn list_payments<'e, E>(&self, executor: E, folio_id: Uuid) -> Result<Vec<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM folio_payments WHERE folio_id = $1 ORDER BY created_at ASC",
        )
        .bind(folio_id)
        .fetch_all(executor)
        .await?;
        Ok(payments)
    }

    pub async fn add_charge<'e, E>(
        &self,
        executor: E,
        folio_id: Uuid,
        charge_type: ChargeType,
        description: &str,
        amount: Decimal,
        quantity: i32,
        posted: bool,
    ) -> Result<Charge, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let charge = sqlx::query_as::<_, Charge>(
            r#"
            INSERT INTO folio_charges (folio_id, charge_type, description, amount, quantity, posted)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(folio_id)
        .bind(charge_type)
        .bind(description)
        .bind(amount)
        .bind(quantity)
        .bind(posted)
        .fetch_one(executor)
        .await?;
        Ok(charge)
    }

    /// Reajusta a diária lançada na criação da reserva (primeira cobrança ROOM).
    pub async fn update_stay_charge<'e, E>(
        &self,
        executor: E,
        folio_id: Uuid,
        description: &str,
        amount: Decimal,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE folio_charges
            SET description = $2, amount = $3, quantity = 1
            WHERE id = (
                SELECT id FROM folio_charges
                WHERE folio_id = $1 AND charge_type = $4
                ORDER BY created_at, id
                LIMIT 1
            )
            "#,
        )
        .bind(folio_id)
        .bind(description)
        .bind(amount)
        .bind(ChargeType::Room)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn add_payment<'e, E>(
        &self,
        executor: E,
        folio_id: Uuid,
        method: PaymentMethod,
        amount: Decimal,
        status: FolioPaymentStatus,
        gateway_order_id: Option<&str>,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO folio_payments (folio_id, method, amount, status, gateway_order_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(folio_id)
        .bind(method)
        .bind(amount)
        .bind(status)
        .bind(gateway_order_id)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "payment"))
    }

    pub async fn find_payment_by_order<'e, E>(&self, executor: E, gateway_order_id: &str) -> Result<Option<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM folio_payments WHERE gateway_order_id = $1")
            .bind(gateway_order_id)
            .fetch_optional(executor)
            .await?;
        Ok(payment)
    }

    pub async fn lock_payment<'e, E>(&self, executor: E, folio_id: Uuid, payment_id: Uuid) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Payment>("SELECT * FROM folio_payments WHERE id = $1 AND folio_id = $2 FOR UPDATE")
            .bind(payment_id)
            .bind(folio_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("payment".into()))
    }

    pub async fn mark_captured<'e, E>(
        &self,
        executor: E,
        payment_id: Uuid,
        gateway_payment_id: &str,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Payment>(
            r#"
            UPDATE folio_payments
            SET status = 'SUCCESS', gateway_payment_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(payment_id)
        .bind(gateway_payment_id)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "payment"))
    }

    pub async fn mark_failed<'e, E>(&self, executor: E, payment_id: Uuid) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            "UPDATE folio_payments SET status = 'FAILED', updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(payment_id)
        .fetch_one(executor)
        .await?;
        Ok(payment)
    }

    pub async fn mark_refunded<'e, E>(
        &self,
        executor: E,
        payment_id: Uuid,
        refund_id: Option<&str>,
        refund_amount: Decimal,
        reason: Option<&str>,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE folio_payments
            SET status = 'REFUNDED', refund_id = $2, refund_amount = $3,
                refund_reason = $4, refunded_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(payment_id)
        .bind(refund_id)
        .bind(refund_amount)
        .bind(reason)
        .fetch_one(executor)
        .await?;
        Ok(payment)
    }
}
