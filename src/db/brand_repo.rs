// src/db/brand_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::brand::{Brand, BrandPlan},
};

#[derive(Clone)]
pub struct BrandRepository {
    pool: PgPool,
}

impl BrandRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Brand>, AppError> {
        let brands = sqlx::query_as::<_, Brand>("SELECT * FROM brands ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(brands)
    }

    pub async fn find_by_id(&self, brand_id: Uuid) -> Result<Option<Brand>, AppError> {
        let brand = sqlx::query_as::<_, Brand>("SELECT * FROM brands WHERE id = $1")
            .bind(brand_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(brand)
    }

    /// Trava a marca: serializa criações concorrentes de hotel contra o limite do plano.
    pub async fn lock_by_id<'e, E>(&self, executor: E, brand_id: Uuid) -> Result<Brand, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Brand>("SELECT * FROM brands WHERE id = $1 FOR UPDATE")
            .bind(brand_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("brand".into()))
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        slug: &str,
        plan: BrandPlan,
    ) -> Result<Brand, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Brand>(
            r#"
            INSERT INTO brands (name, slug, plan)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(slug)
        .bind(plan)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "brand"))
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        brand_id: Uuid,
        name: Option<&str>,
        plan: Option<BrandPlan>,
        is_active: Option<bool>,
    ) -> Result<Brand, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Brand>(
            r#"
            UPDATE brands
            SET name = COALESCE($2, name),
                plan = COALESCE($3, plan),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(brand_id)
        .bind(name)
        .bind(plan)
        .bind(is_active)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("brand".into()))
    }

    pub async fn delete<'e, E>(&self, executor: E, brand_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM brands WHERE id = $1")
            .bind(brand_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
