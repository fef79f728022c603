// src/db/hotel_repo.rs

use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::hotel::{
        Hotel, HotelDocument, HotelMember, HotelStatus, MemberRole, OnboardingStatus,
        VerificationStatus,
    },
};

// Campos cadastrais editáveis durante o onboarding.
#[derive(Debug, Clone, Default)]
pub struct HotelProfile {
    pub name: String,
    pub hotel_type: Option<String>,
    pub handling_type: Option<String>,
    pub address: Option<Value>,
    pub legal_info: Option<Value>,
    pub upi_id: Option<String>,
}

#[derive(Clone)]
pub struct HotelRepository {
    pool: PgPool,
}

impl HotelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    pub async fn find_by_id(&self, hotel_id: Uuid) -> Result<Option<Hotel>, AppError> {
        let hotel = sqlx::query_as::<_, Hotel>("SELECT * FROM hotels WHERE id = $1")
            .bind(hotel_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(hotel)
    }

    /// Hotéis em que o usuário é membro (qualquer cargo).
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Hotel>, AppError> {
        let hotels = sqlx::query_as::<_, Hotel>(
            r#"
            SELECT h.*
            FROM hotels h
            INNER JOIN hotel_members m ON m.hotel_id = h.id
            WHERE m.user_id = $1
            ORDER BY h.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(hotels)
    }

    /// Listagem do console administrativo, opcionalmente filtrada pelo onboarding.
    pub async fn list_all(&self, onboarding: Option<OnboardingStatus>) -> Result<Vec<Hotel>, AppError> {
        let hotels = sqlx::query_as::<_, Hotel>(
            r#"
            SELECT * FROM hotels
            WHERE ($1::onboarding_status IS NULL OR onboarding_status = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(onboarding)
        .fetch_all(&self.pool)
        .await?;
        Ok(hotels)
    }

    /// Cargo do usuário no hotel (usado pelo guardião de tenant).
    pub async fn find_member_role(&self, hotel_id: Uuid, user_id: Uuid) -> Result<Option<MemberRole>, AppError> {
        let role = sqlx::query_scalar::<_, MemberRole>(
            "SELECT role FROM hotel_members WHERE hotel_id = $1 AND user_id = $2",
        )
        .bind(hotel_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(role)
    }

    pub async fn list_members(&self, hotel_id: Uuid) -> Result<Vec<HotelMember>, AppError> {
        let members = sqlx::query_as::<_, HotelMember>(
            "SELECT * FROM hotel_members WHERE hotel_id = $1 ORDER BY created_at ASC",
        )
        .bind(hotel_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    pub async fn list_documents(&self, hotel_id: Uuid) -> Result<Vec<HotelDocument>, AppError> {
        let docs = sqlx::query_as::<_, HotelDocument>(
            "SELECT * FROM hotel_documents WHERE hotel_id = $1 ORDER BY kind ASC",
        )
        .bind(hotel_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(docs)
    }

    // ---
    // Escrita (Transacionais)
    // ---

    pub async fn lock_by_id<'e, E>(&self, executor: E, hotel_id: Uuid) -> Result<Hotel, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Hotel>("SELECT * FROM hotels WHERE id = $1 FOR UPDATE")
            .bind(hotel_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("hotel".into()))
    }

    pub async fn count_by_brand<'e, E>(&self, executor: E, brand_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM hotels WHERE brand_id = $1")
            .bind(brand_id)
            .fetch_one(executor)
            .await?;
        Ok(count)
    }

    /// O usuário administra (OWNER/MANAGER) algum hotel da marca?
    pub async fn manages_brand<'e, E>(&self, executor: E, brand_id: Uuid, user_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let manages = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM hotel_members m
                JOIN hotels h ON h.id = m.hotel_id
                WHERE h.brand_id = $1 AND m.user_id = $2 AND m.role = ANY($3)
            )
            "#,
        )
        .bind(brand_id)
        .bind(user_id)
        .bind(&MemberRole::BRAND_MANAGERS[..])
        .fetch_one(executor)
        .await?;
        Ok(manages)
    }

    pub async fn create_hotel<'e, E>(
        &self,
        executor: E,
        brand_id: Option<Uuid>,
        slug: &str,
        profile: &HotelProfile,
    ) -> Result<Hotel, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Hotel>(
            r#"
            INSERT INTO hotels (brand_id, name, slug, hotel_type, handling_type, address, legal_info, upi_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(brand_id)
        .bind(&profile.name)
        .bind(slug)
        .bind(&profile.hotel_type)
        .bind(&profile.handling_type)
        .bind(&profile.address)
        .bind(&profile.legal_info)
        .bind(&profile.upi_id)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "hotel"))
    }

    pub async fn update_profile<'e, E>(
        &self,
        executor: E,
        hotel_id: Uuid,
        profile: &HotelProfile,
    ) -> Result<Hotel, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let hotel = sqlx::query_as::<_, Hotel>(
            r#"
            UPDATE hotels
            SET name = $2, hotel_type = $3, handling_type = $4,
                address = $5, legal_info = $6, upi_id = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(hotel_id)
        .bind(&profile.name)
        .bind(&profile.hotel_type)
        .bind(&profile.handling_type)
        .bind(&profile.address)
        .bind(&profile.legal_info)
        .bind(&profile.upi_id)
        .fetch_one(executor)
        .await?;
        Ok(hotel)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        hotel_id: Uuid,
        onboarding: OnboardingStatus,
        status: HotelStatus,
        remarks: Option<&str>,
    ) -> Result<Hotel, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let hotel = sqlx::query_as::<_, Hotel>(
            r#"
            UPDATE hotels
            SET onboarding_status = $2, status = $3,
                review_remarks = COALESCE($4, review_remarks), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(hotel_id)
        .bind(onboarding)
        .bind(status)
        .bind(remarks)
        .fetch_one(executor)
        .await?;
        Ok(hotel)
    }

    pub async fn add_member<'e, E>(
        &self,
        executor: E,
        hotel_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<HotelMember, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, HotelMember>(
            r#"
            INSERT INTO hotel_members (hotel_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(hotel_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "member"))
    }

    // --- Documentos ---

    /// Reenvio de um documento substitui a URL e volta para `pending`.
    pub async fn upsert_document<'e, E>(
        &self,
        executor: E,
        hotel_id: Uuid,
        kind: &str,
        url: &str,
    ) -> Result<HotelDocument, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let doc = sqlx::query_as::<_, HotelDocument>(
            r#"
            INSERT INTO hotel_documents (hotel_id, kind, url)
            VALUES ($1, $2, $3)
            ON CONFLICT (hotel_id, kind) DO UPDATE
            SET url = EXCLUDED.url, status = 'pending', remarks = NULL,
                reviewed_at = NULL, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(hotel_id)
        .bind(kind)
        .bind(url)
        .fetch_one(executor)
        .await?;
        Ok(doc)
    }

    pub async fn lock_document<'e, E>(
        &self,
        executor: E,
        hotel_id: Uuid,
        document_id: Uuid,
    ) -> Result<HotelDocument, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, HotelDocument>(
            "SELECT * FROM hotel_documents WHERE id = $1 AND hotel_id = $2 FOR UPDATE",
        )
        .bind(document_id)
        .bind(hotel_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("document".into()))
    }

    pub async fn review_document<'e, E>(
        &self,
        executor: E,
        document_id: Uuid,
        status: VerificationStatus,
        remarks: Option<&str>,
    ) -> Result<HotelDocument, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let doc = sqlx::query_as::<_, HotelDocument>(
            r#"
            UPDATE hotel_documents
            SET status = $2, remarks = $3, reviewed_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(document_id)
        .bind(status)
        .bind(remarks)
        .fetch_one(executor)
        .await?;
        Ok(doc)
    }

    /// Quantos documentos ainda não foram aprovados (bloqueia a aprovação do hotel).
    pub async fn count_unapproved_documents<'e, E>(&self, executor: E, hotel_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM hotel_documents WHERE hotel_id = $1 AND status <> 'approved'",
        )
        .bind(hotel_id)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }
}
