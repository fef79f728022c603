// src/db/website_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::website::WebsiteConfig,
};

#[derive(Clone)]
pub struct WebsiteRepository {
    pool: PgPool,
}

impl WebsiteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_hotel(&self, hotel_id: Uuid) -> Result<Option<WebsiteConfig>, AppError> {
        let config = sqlx::query_as::<_, WebsiteConfig>("SELECT * FROM website_configs WHERE hotel_id = $1")
            .bind(hotel_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(config)
    }

    /// Somente sites publicados são visíveis pelo slug público.
    pub async fn find_published_by_slug(&self, slug: &str) -> Result<Option<WebsiteConfig>, AppError> {
        let config = sqlx::query_as::<_, WebsiteConfig>(
            "SELECT * FROM website_configs WHERE slug = $1 AND is_published = TRUE",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(config)
    }

    pub async fn upsert<'e, E>(&self, executor: E, config: &WebsiteConfig) -> Result<WebsiteConfig, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, WebsiteConfig>(
            r#"
            INSERT INTO website_configs (
                hotel_id, slug, title, tagline, theme_color, hero_image_url,
                contact_email, contact_phone, is_published
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (hotel_id) DO UPDATE
            SET slug = EXCLUDED.slug, title = EXCLUDED.title, tagline = EXCLUDED.tagline,
                theme_color = EXCLUDED.theme_color, hero_image_url = EXCLUDED.hero_image_url,
                contact_email = EXCLUDED.contact_email, contact_phone = EXCLUDED.contact_phone,
                is_published = EXCLUDED.is_published, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(config.hotel_id)
        .bind(&config.slug)
        .bind(&config.title)
        .bind(&config.tagline)
        .bind(&config.theme_color)
        .bind(&config.hero_image_url)
        .bind(&config.contact_email)
        .bind(&config.contact_phone)
        .bind(config.is_published)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "website"))
    }
}
