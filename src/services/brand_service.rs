// src/services/brand_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BrandRepository, HotelRepository},
    models::brand::{Brand, BrandPlan},
    services::hotel_service::slugify,
};

// Cadastro de marcas (console do super admin).
#[derive(Clone)]
pub struct BrandService {
    brand_repo: BrandRepository,
    hotel_repo: HotelRepository,
    pool: PgPool,
}

impl BrandService {
    pub fn new(brand_repo: BrandRepository, hotel_repo: HotelRepository, pool: PgPool) -> Self {
        Self { brand_repo, hotel_repo, pool }
    }

    pub async fn list(&self) -> Result<Vec<Brand>, AppError> {
        self.brand_repo.list().await
    }

    pub async fn get(&self, brand_id: Uuid) -> Result<Brand, AppError> {
        self.brand_repo
            .find_by_id(brand_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("brand".into()))
    }

    pub async fn create(&self, name: &str, slug: Option<&str>, plan: BrandPlan) -> Result<Brand, AppError> {
        let slug = slug.map(str::to_string).unwrap_or_else(|| slugify(name));
        if slug.is_empty() {
            return Err(AppError::InvalidInput("slug".into()));
        }
        let brand = self.brand_repo.create(&self.pool, name.trim(), &slug, plan).await?;
        tracing::info!("🏷️ Marca '{}' criada (plano {:?})", brand.name, brand.plan);
        Ok(brand)
    }

    /// Rebaixar o plano não remove hotéis já existentes; só bloqueia novos.
    pub async fn update(
        &self,
        brand_id: Uuid,
        name: Option<&str>,
        plan: Option<BrandPlan>,
        is_active: Option<bool>,
    ) -> Result<Brand, AppError> {
        self.brand_repo.update(&self.pool, brand_id, name, plan, is_active).await
    }

    /// Só remove marcas sem hotéis.
    pub async fn delete(&self, brand_id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.brand_repo.lock_by_id(&mut *tx, brand_id).await?;
        if self.hotel_repo.count_by_brand(&mut *tx, brand_id).await? > 0 {
            return Err(AppError::InvalidTransition {
                entity: "brand",
                from: "IN_USE".into(),
                to: "DELETED".into(),
            });
        }
        self.brand_repo.delete(&mut *tx, brand_id).await?;

        tx.commit().await?;
        Ok(())
    }
}
