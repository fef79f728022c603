// src/db/guest_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::guest::{Guest, KycStatus},
};

#[derive(Clone)]
pub struct GuestRepository {
    pool: PgPool,
}

impl GuestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Busca por nome, telefone ou e-mail (ILIKE).
    pub async fn list(&self, hotel_id: Uuid, search: Option<&str>) -> Result<Vec<Guest>, AppError> {
        let pattern = search.map(|s| format!("%{}%", s.trim()));
        let guests = sqlx::query_as::<_, Guest>(
            r#"
            SELECT * FROM guests
            WHERE hotel_id = $1
              AND ($2::text IS NULL OR full_name ILIKE $2 OR phone ILIKE $2 OR email ILIKE $2)
            ORDER BY full_name ASC
            "#,
        )
        .bind(hotel_id)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(guests)
    }

    pub async fn find_by_id(&self, hotel_id: Uuid, guest_id: Uuid) -> Result<Option<Guest>, AppError> {
        let guest = sqlx::query_as::<_, Guest>("SELECT * FROM guests WHERE id = $1 AND hotel_id = $2")
            .bind(guest_id)
            .bind(hotel_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(guest)
    }

    pub async fn lock_by_id<'e, E>(&self, executor: E, hotel_id: Uuid, guest_id: Uuid) -> Result<Guest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Guest>("SELECT * FROM guests WHERE id = $1 AND hotel_id = $2 FOR UPDATE")
            .bind(guest_id)
            .bind(hotel_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("guest".into()))
    }

    /// Find-or-create pela chave (hotel, telefone). Um hóspede existente mantém o nome;
    /// o e-mail só é preenchido quando ainda não havia um.
    pub async fn upsert_by_phone<'e, E>(
        &self,
        executor: E,
        hotel_id: Uuid,
        full_name: &str,
        phone: &str,
        email: Option<&str>,
    ) -> Result<Guest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let guest = sqlx::query_as::<_, Guest>(
            r#"
            INSERT INTO guests (hotel_id, full_name, phone, email)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (hotel_id, phone) DO UPDATE
            SET email = COALESCE(guests.email, EXCLUDED.email)
            RETURNING *
            "#,
        )
        .bind(hotel_id)
        .bind(full_name)
        .bind(phone)
        .bind(email)
        .fetch_one(executor)
        .await?;
        Ok(guest)
    }

    pub async fn submit_kyc<'e, E>(
        &self,
        executor: E,
        guest_id: Uuid,
        id_proof_type: &str,
        id_proof_number: &str,
        id_proof_url: &str,
        selfie_url: Option<&str>,
    ) -> Result<Guest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let guest = sqlx::query_as::<_, Guest>(
            r#"
            UPDATE guests
            SET id_proof_type = $2, id_proof_number = $3, id_proof_url = $4,
                selfie_url = COALESCE($5, selfie_url),
                kyc_status = 'SUBMITTED', updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(guest_id)
        .bind(id_proof_type)
        .bind(id_proof_number)
        .bind(id_proof_url)
        .bind(selfie_url)
        .fetch_one(executor)
        .await?;
        Ok(guest)
    }

    pub async fn set_kyc_status<'e, E>(&self, executor: E, guest_id: Uuid, status: KycStatus) -> Result<Guest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let guest = sqlx::query_as::<_, Guest>(
            "UPDATE guests SET kyc_status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(guest_id)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(guest)
    }
}
