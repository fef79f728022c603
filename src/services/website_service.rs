// src/services/website_service.rs

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::WebsiteRepository,
    models::website::WebsiteConfig,
    services::cache::Cache,
};

/// Campos editáveis do site público.
#[derive(Debug, Clone)]
pub struct WebsiteInput {
    pub slug: String,
    pub title: String,
    pub tagline: Option<String>,
    pub theme_color: Option<String>,
    pub hero_image_url: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub is_published: bool,
}

pub fn cache_key(slug: &str) -> String {
    format!("website:{slug}")
}

#[derive(Clone)]
pub struct WebsiteService {
    website_repo: WebsiteRepository,
    cache: Arc<dyn Cache>,
    ttl: Duration,
    pool: PgPool,
}

impl WebsiteService {
    pub fn new(website_repo: WebsiteRepository, cache: Arc<dyn Cache>, ttl: Duration, pool: PgPool) -> Self {
        Self { website_repo, cache, ttl, pool }
    }

    pub async fn get(&self, hotel_id: Uuid) -> Result<WebsiteConfig, AppError> {
        self.website_repo
            .find_by_hotel(hotel_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("website".into()))
    }

    /// Grava a configuração e invalida o cache do slug antigo e do novo.
    pub async fn put(&self, hotel_id: Uuid, input: WebsiteInput) -> Result<WebsiteConfig, AppError> {
        let previous = self.website_repo.find_by_hotel(hotel_id).await?;

        let config = WebsiteConfig {
            hotel_id,
            slug: input.slug,
            title: input.title,
            tagline: input.tagline,
            theme_color: input.theme_color,
            hero_image_url: input.hero_image_url,
            contact_email: input.contact_email,
            contact_phone: input.contact_phone,
            is_published: input.is_published,
            updated_at: Utc::now(),
        };
        let saved = self.website_repo.upsert(&self.pool, &config).await?;

        if let Some(previous) = previous {
            self.cache.invalidate(&cache_key(&previous.slug)).await;
        }
        self.cache.invalidate(&cache_key(&saved.slug)).await;

        Ok(saved)
    }

    /// Leitura pública (sem autenticação), servida do cache quando possível.
    pub async fn public_by_slug(&self, slug: &str) -> Result<WebsiteConfig, AppError> {
        let key = cache_key(slug);

        if let Some(cached) = self.cache.get_json(&key).await {
            match serde_json::from_value::<WebsiteConfig>(cached) {
                Ok(config) => return Ok(config),
                Err(e) => tracing::warn!("Entrada de cache inválida para {}: {}", key, e),
            }
        }

        let config = self
            .website_repo
            .find_published_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("website".into()))?;

        match serde_json::to_value(&config) {
            Ok(value) => self.cache.set_json(&key, value, self.ttl).await,
            Err(e) => tracing::warn!("Falha ao serializar site {} para o cache: {}", slug, e),
        }
        Ok(config)
    }
}
