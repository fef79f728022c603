// src/db/booking_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::{
        availability::StayPeriod,
        booking::{Booking, BookingActivity, BookingPaymentStatus, BookingSource, BookingStatus},
        guest::KycStatus,
    },
};

/// Dados de uma reserva nova, já validados pelo serviço.
#[derive(Debug, Clone)]
pub struct NewBooking<'a> {
    pub hotel_id: Uuid,
    pub guest_id: Uuid,
    pub room_type_id: Uuid,
    pub stay: StayPeriod,
    pub kyc_status: KycStatus,
    pub total_amount: Decimal,
    pub adults: i32,
    pub children: i32,
    pub source: BookingSource,
    pub channel: Option<&'a str>,
    pub external_ref: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub guest_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Disponibilidade
    // ---

    /// Reservas ativas do tipo que conflitam com o período (teste de três cláusulas).
    pub async fn count_overlapping_by_type<'e, E>(
        &self,
        executor: E,
        hotel_id: Uuid,
        room_type_id: Uuid,
        stay: &StayPeriod,
        exclude_booking_id: Option<Uuid>,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM bookings
            WHERE hotel_id = $1
              AND room_type_id = $2
              AND status = ANY($6)
              AND ($5::uuid IS NULL OR id <> $5)
              AND (
                    (check_in_date >= $3 AND check_in_date < $4)
                 OR (check_out_date > $3 AND check_out_date <= $4)
                 OR (check_in_date <= $3 AND check_out_date >= $4)
              )
            "#,
        )
        .bind(hotel_id)
        .bind(room_type_id)
        .bind(stay.start)
        .bind(stay.end)
        .bind(exclude_booking_id)
        .bind(&BookingStatus::ACTIVE[..])
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    /// Reservas ativas no quarto físico que se sobrepõem ao período (meio-aberto).
    pub async fn count_overlapping_by_room<'e, E>(
        &self,
        executor: E,
        room_id: Uuid,
        stay: &StayPeriod,
        exclude_booking_id: Option<Uuid>,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM bookings
            WHERE room_id = $1
              AND status = ANY($5)
              AND ($4::uuid IS NULL OR id <> $4)
              AND check_in_date < $3
              AND check_out_date > $2
            "#,
        )
        .bind(room_id)
        .bind(stay.start)
        .bind(stay.end)
        .bind(exclude_booking_id)
        .bind(&BookingStatus::ACTIVE[..])
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    // ---
    // Leitura
    // ---

    pub async fn list(&self, hotel_id: Uuid, filter: &BookingFilter) -> Result<Vec<Booking>, AppError> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE hotel_id = $1
              AND ($2::booking_status IS NULL OR status = $2)
              AND ($3::timestamptz IS NULL OR check_out_date > $3)
              AND ($4::timestamptz IS NULL OR check_in_date < $4)
              AND ($5::uuid IS NULL OR guest_id = $5)
            ORDER BY check_in_date DESC
            "#,
        )
        .bind(hotel_id)
        .bind(filter.status)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.guest_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    pub async fn find_by_id(&self, hotel_id: Uuid, booking_id: Uuid) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 AND hotel_id = $2")
            .bind(booking_id)
            .bind(hotel_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(booking)
    }

    pub async fn find_by_external_ref<'e, E>(
        &self,
        executor: E,
        hotel_id: Uuid,
        channel: &str,
        external_ref: &str,
    ) -> Result<Option<Booking>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let booking = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE hotel_id = $1 AND channel = $2 AND external_ref = $3",
        )
        .bind(hotel_id)
        .bind(channel)
        .bind(external_ref)
        .fetch_optional(executor)
        .await?;
        Ok(booking)
    }

    pub async fn lock_by_id<'e, E>(&self, executor: E, hotel_id: Uuid, booking_id: Uuid) -> Result<Booking, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 AND hotel_id = $2 FOR UPDATE")
            .bind(booking_id)
            .bind(hotel_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("booking".into()))
    }

    // ---
    // Escrita
    // ---

    pub async fn create<'e, E>(&self, executor: E, new: &NewBooking<'_>) -> Result<Booking, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (
                hotel_id, guest_id, room_type_id, check_in_date, check_out_date,
                status, payment_status, kyc_status, total_amount, paid_amount,
                adults, children, source, channel, external_ref, notes, created_by
            )
            VALUES ($1, $2, $3, $4, $5, 'CONFIRMED', 'PENDING', $6, $7, 0, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(new.hotel_id)
        .bind(new.guest_id)
        .bind(new.room_type_id)
        .bind(new.stay.start)
        .bind(new.stay.end)
        .bind(new.kyc_status)
        .bind(new.total_amount)
        .bind(new.adults)
        .bind(new.children)
        .bind(new.source)
        .bind(new.channel)
        .bind(new.external_ref)
        .bind(new.notes)
        .bind(new.created_by)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "booking"))
    }

    /// Registra o horário real de entrada (mantém a data prevista se já passou da saída).
    pub async fn mark_checked_in<'e, E>(
        &self,
        executor: E,
        booking_id: Uuid,
        room_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Booking, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = 'CHECKED_IN', room_id = $2,
                check_in_date = CASE WHEN $3 < check_out_date THEN $3 ELSE check_in_date END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .bind(room_id)
        .bind(at)
        .fetch_one(executor)
        .await?;
        Ok(booking)
    }

    /// O horário real de saída substitui a data prevista. Se a saída acontecer
    /// antes do check-in registrado, mantém a data prevista para não violar o CHECK.
    pub async fn mark_checked_out<'e, E>(&self, executor: E, booking_id: Uuid, at: DateTime<Utc>) -> Result<Booking, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = 'CHECKED_OUT',
                check_out_date = CASE WHEN $2 > check_in_date THEN $2 ELSE check_out_date END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .bind(at)
        .fetch_one(executor)
        .await?;
        Ok(booking)
    }

    pub async fn set_status<'e, E>(&self, executor: E, booking_id: Uuid, status: BookingStatus) -> Result<Booking, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(booking_id)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(booking)
    }

    /// Grava os campos editáveis (já mesclados pelo serviço).
    pub async fn update_details<'e, E>(&self, executor: E, booking: &Booking) -> Result<Booking, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET notes = $2, adults = $3, children = $4, total_amount = $5,
                check_in_date = $6, check_out_date = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(booking.id)
        .bind(&booking.notes)
        .bind(booking.adults)
        .bind(booking.children)
        .bind(booking.total_amount)
        .bind(booking.check_in_date)
        .bind(booking.check_out_date)
        .fetch_one(executor)
        .await?;
        Ok(updated)
    }

    pub async fn sync_payment<'e, E>(
        &self,
        executor: E,
        booking_id: Uuid,
        paid_amount: Decimal,
        payment_status: BookingPaymentStatus,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE bookings SET paid_amount = $2, payment_status = $3, updated_at = NOW() WHERE id = $1")
            .bind(booking_id)
            .bind(paid_amount)
            .bind(payment_status)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Propaga o KYC do hóspede para as reservas ainda em andamento.
    pub async fn sync_guest_kyc<'e, E>(&self, executor: E, guest_id: Uuid, kyc_status: KycStatus) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET kyc_status = $2, updated_at = NOW()
            WHERE guest_id = $1 AND status = ANY($3)
            "#,
        )
        .bind(guest_id)
        .bind(kyc_status)
        .bind(&BookingStatus::ACTIVE[..])
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Remoção física; folio, lançamentos e histórico caem em cascata.
    pub async fn delete<'e, E>(&self, executor: E, hotel_id: Uuid, booking_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1 AND hotel_id = $2")
            .bind(booking_id)
            .bind(hotel_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // ---
    // Histórico
    // ---

    pub async fn add_activity<'e, E>(
        &self,
        executor: E,
        booking_id: Uuid,
        action: &str,
        description: Option<&str>,
        performed_by: Option<Uuid>,
    ) -> Result<BookingActivity, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let activity = sqlx::query_as::<_, BookingActivity>(
            r#"
            INSERT INTO booking_activities (booking_id, action, description, performed_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .bind(action)
        .bind(description)
        .bind(performed_by)
        .fetch_one(executor)
        .await?;
        Ok(activity)
    }

    pub async fn list_activities(&self, booking_id: Uuid) -> Result<Vec<BookingActivity>, AppError> {
        let activities = sqlx::query_as::<_, BookingActivity>(
            "SELECT * FROM booking_activities WHERE booking_id = $1 ORDER BY created_at ASC",
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(activities)
    }
}
