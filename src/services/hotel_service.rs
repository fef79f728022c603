// src/services/hotel_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BrandRepository, HotelProfile, HotelRepository, UserRepository},
    models::{
        auth::User,
        hotel::{Hotel, HotelDocument, HotelMember, HotelStatus, MemberRole, OnboardingStatus, VerificationStatus},
    },
};

/// Gera um slug de URL a partir de um nome ("Hotel Aurora, Udaipur" -> "hotel-aurora-udaipur").
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

fn onboarding_error(from: OnboardingStatus, to: OnboardingStatus) -> AppError {
    AppError::InvalidTransition {
        entity: "hotel",
        from: format!("{from:?}"),
        to: format!("{to:?}"),
    }
}

/// Vincular um hotel a uma marca exige super admin ou cargo de gestão num hotel da marca.
fn ensure_brand_access(is_super_admin: bool, manages_brand: bool) -> Result<(), AppError> {
    if is_super_admin || manages_brand {
        Ok(())
    } else {
        Err(AppError::Forbidden("brand:manage".into()))
    }
}

#[derive(Clone)]
pub struct HotelService {
    hotel_repo: HotelRepository,
    brand_repo: BrandRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl HotelService {
    pub fn new(
        hotel_repo: HotelRepository,
        brand_repo: BrandRepository,
        user_repo: UserRepository,
        pool: PgPool,
    ) -> Self {
        Self { hotel_repo, brand_repo, user_repo, pool }
    }

    // --- HOTÉIS ---

    /// Cria o hotel em rascunho e torna o criador OWNER.
    pub async fn create_hotel(
        &self,
        owner: &User,
        brand_id: Option<Uuid>,
        slug: Option<&str>,
        profile: HotelProfile,
    ) -> Result<Hotel, AppError> {
        let slug = match slug {
            Some(s) => s.to_string(),
            None => slugify(&profile.name),
        };
        if slug.is_empty() {
            return Err(AppError::InvalidInput("slug".into()));
        }

        // 1. Inicia a transação
        let mut tx = self.pool.begin().await?;

        // 2. Limite do plano (marca travada para serializar criações concorrentes)
        if let Some(brand_id) = brand_id {
            let brand = self.brand_repo.lock_by_id(&mut *tx, brand_id).await?;
            let manages_brand = owner.is_super_admin
                || self.hotel_repo.manages_brand(&mut *tx, brand_id, owner.id).await?;
            ensure_brand_access(owner.is_super_admin, manages_brand)?;
            if !brand.is_active {
                return Err(AppError::Forbidden("brand:inactive".into()));
            }
            let current = self.hotel_repo.count_by_brand(&mut *tx, brand_id).await?;
            if !brand.plan.allows_another_hotel(current) {
                return Err(AppError::PlanLimitReached(format!("{:?}", brand.plan)));
            }
        }

        // 3. Cria o hotel e o vínculo do dono
        let hotel = self.hotel_repo.create_hotel(&mut *tx, brand_id, &slug, &profile).await?;
        self.hotel_repo
            .add_member(&mut *tx, hotel.id, owner.id, MemberRole::Owner)
            .await?;

        tx.commit().await?;

        tracing::info!("🏨 Hotel '{}' criado ({})", hotel.name, hotel.id);
        Ok(hotel)
    }

    pub async fn list_my_hotels(&self, user_id: Uuid) -> Result<Vec<Hotel>, AppError> {
        self.hotel_repo.list_for_user(user_id).await
    }

    pub async fn get_hotel(&self, hotel_id: Uuid) -> Result<Hotel, AppError> {
        self.hotel_repo
            .find_by_id(hotel_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("hotel".into()))
    }

    /// Edita os dados cadastrais. Só é permitido em rascunho ou após rejeição.
    pub async fn update_profile(&self, hotel_id: Uuid, profile: HotelProfile) -> Result<Hotel, AppError> {
        let mut tx = self.pool.begin().await?;

        let hotel = self.hotel_repo.lock_by_id(&mut *tx, hotel_id).await?;
        if !hotel.onboarding_status.is_editable() {
            return Err(onboarding_error(hotel.onboarding_status, OnboardingStatus::Draft));
        }

        let updated = self.hotel_repo.update_profile(&mut *tx, hotel_id, &profile).await?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Envia o cadastro para análise. Exige ao menos um documento anexado.
    pub async fn submit(&self, hotel_id: Uuid) -> Result<Hotel, AppError> {
        let mut tx = self.pool.begin().await?;

        let hotel = self.hotel_repo.lock_by_id(&mut *tx, hotel_id).await?;
        if !hotel.onboarding_status.can_transition_to(OnboardingStatus::Submitted) {
            return Err(onboarding_error(hotel.onboarding_status, OnboardingStatus::Submitted));
        }

        let documents = self.hotel_repo.list_documents(hotel_id).await?;
        if documents.is_empty() {
            return Err(AppError::DocumentsPending);
        }

        let updated = self
            .hotel_repo
            .set_status(&mut *tx, hotel_id, OnboardingStatus::Submitted, HotelStatus::Pending, None)
            .await?;
        tx.commit().await?;

        tracing::info!("📝 Hotel {} enviado para análise", hotel_id);
        Ok(updated)
    }

    // --- DOCUMENTOS ---

    pub async fn upsert_document(&self, hotel_id: Uuid, kind: &str, url: &str) -> Result<HotelDocument, AppError> {
        let mut tx = self.pool.begin().await?;

        let hotel = self.hotel_repo.lock_by_id(&mut *tx, hotel_id).await?;
        if hotel.onboarding_status == OnboardingStatus::Approved {
            return Err(onboarding_error(hotel.onboarding_status, OnboardingStatus::Submitted));
        }

        let doc = self.hotel_repo.upsert_document(&mut *tx, hotel_id, kind, url).await?;
        tx.commit().await?;
        Ok(doc)
    }

    pub async fn list_documents(&self, hotel_id: Uuid) -> Result<Vec<HotelDocument>, AppError> {
        self.hotel_repo.list_documents(hotel_id).await
    }

    // --- MEMBROS ---

    pub async fn list_members(&self, hotel_id: Uuid) -> Result<Vec<HotelMember>, AppError> {
        self.hotel_repo.list_members(hotel_id).await
    }

    /// Adiciona um usuário já cadastrado (pelo e-mail) à equipe do hotel.
    pub async fn add_member(&self, hotel_id: Uuid, email: &str, role: MemberRole) -> Result<HotelMember, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::UserNotFound)?;

        self.hotel_repo.add_member(&self.pool, hotel_id, user.id, role).await
    }

    // --- ANÁLISE (super admin) ---

    pub async fn list_all(&self, onboarding: Option<OnboardingStatus>) -> Result<Vec<Hotel>, AppError> {
        self.hotel_repo.list_all(onboarding).await
    }

    /// Revisa um documento. O primeiro documento revisado coloca o hotel "em análise".
    pub async fn review_document(
        &self,
        hotel_id: Uuid,
        document_id: Uuid,
        status: VerificationStatus,
        remarks: Option<&str>,
    ) -> Result<HotelDocument, AppError> {
        let mut tx = self.pool.begin().await?;

        let hotel = self.hotel_repo.lock_by_id(&mut *tx, hotel_id).await?;
        let doc = self.hotel_repo.lock_document(&mut *tx, hotel_id, document_id).await?;
        if !doc.status.can_review_to(status) {
            return Err(AppError::InvalidTransition {
                entity: "document",
                from: format!("{:?}", doc.status),
                to: format!("{status:?}"),
            });
        }

        let reviewed = self
            .hotel_repo
            .review_document(&mut *tx, document_id, status, remarks)
            .await?;

        if hotel.onboarding_status == OnboardingStatus::Submitted {
            self.hotel_repo
                .set_status(&mut *tx, hotel_id, OnboardingStatus::UnderReview, hotel.status, None)
                .await?;
        }

        tx.commit().await?;
        Ok(reviewed)
    }

    /// Aprova o hotel. Todos os documentos precisam estar aprovados.
    pub async fn approve(&self, hotel_id: Uuid, remarks: Option<&str>) -> Result<Hotel, AppError> {
        let mut tx = self.pool.begin().await?;

        let hotel = self.hotel_repo.lock_by_id(&mut *tx, hotel_id).await?;
        if !hotel.onboarding_status.can_transition_to(OnboardingStatus::Approved) {
            return Err(onboarding_error(hotel.onboarding_status, OnboardingStatus::Approved));
        }
        if self.hotel_repo.count_unapproved_documents(&mut *tx, hotel_id).await? > 0 {
            return Err(AppError::DocumentsPending);
        }

        let updated = self
            .hotel_repo
            .set_status(&mut *tx, hotel_id, OnboardingStatus::Approved, HotelStatus::Active, remarks)
            .await?;
        tx.commit().await?;

        tracing::info!("✅ Hotel {} aprovado", hotel_id);
        Ok(updated)
    }

    pub async fn reject(&self, hotel_id: Uuid, remarks: &str) -> Result<Hotel, AppError> {
        let mut tx = self.pool.begin().await?;

        let hotel = self.hotel_repo.lock_by_id(&mut *tx, hotel_id).await?;
        if !hotel.onboarding_status.can_transition_to(OnboardingStatus::Rejected) {
            return Err(onboarding_error(hotel.onboarding_status, OnboardingStatus::Rejected));
        }

        let updated = self
            .hotel_repo
            .set_status(&mut *tx, hotel_id, OnboardingStatus::Rejected, HotelStatus::Rejected, Some(remarks))
            .await?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Suspende um hotel ativo (o onboarding não muda).
    pub async fn suspend(&self, hotel_id: Uuid, remarks: Option<&str>) -> Result<Hotel, AppError> {
        let mut tx = self.pool.begin().await?;

        let hotel = self.hotel_repo.lock_by_id(&mut *tx, hotel_id).await?;
        if hotel.status != HotelStatus::Active {
            return Err(AppError::InvalidTransition {
                entity: "hotel",
                from: format!("{:?}", hotel.status),
                to: "Suspended".into(),
            });
        }

        let updated = self
            .hotel_repo
            .set_status(&mut *tx, hotel_id, hotel.onboarding_status, HotelStatus::Suspended, remarks)
            .await?;
        tx.commit().await?;

        tracing::warn!("⛔ Hotel {} suspenso", hotel_id);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::brand::BrandPlan, test_support};

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Hotel Aurora, Udaipur"), "hotel-aurora-udaipur");
        assert_eq!(slugify("  The   Grand -- Palace! "), "the-grand-palace");
        assert_eq!(slugify("Casa 21"), "casa-21");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn attaching_to_a_brand_needs_admin_or_brand_management() {
        assert!(ensure_brand_access(true, false).is_ok());
        assert!(ensure_brand_access(false, true).is_ok());
        assert!(matches!(
            ensure_brand_access(false, false),
            Err(AppError::Forbidden(ref perm)) if perm == "brand:manage"
        ));
    }

    #[test]
    fn only_owners_and_managers_manage_a_brand() {
        assert_eq!(MemberRole::BRAND_MANAGERS, [MemberRole::Owner, MemberRole::Manager]);
    }

    #[tokio::test]
    async fn brand_hotels_are_created_by_admins_or_brand_managers() {
        let Some(state) = test_support::test_state().await else { return };
        let brand = BrandRepository::new(state.db_pool.clone())
            .create(&state.db_pool, "Aurora Group", &test_support::unique("aurora"), BrandPlan::Enterprise)
            .await
            .unwrap();

        // Usuário comum sem vínculo com a marca
        let stranger = test_support::create_user(&state, "Stranger").await;
        let denied = state
            .hotel_service
            .create_hotel(&stranger, Some(brand.id), None, HotelProfile { name: "Intruder Inn".into(), ..Default::default() })
            .await;
        assert!(matches!(denied, Err(AppError::Forbidden(ref perm)) if perm == "brand:manage"));

        // Super admin abre o primeiro hotel da marca
        let mut admin = test_support::create_user(&state, "Admin").await;
        admin.is_super_admin = true;
        let first = test_support::create_hotel(&state, &admin, Some(brand.id)).await;

        // Gerente de um hotel da marca pode abrir outro
        let manager = test_support::create_user(&state, "Manager").await;
        state
            .hotel_repo
            .add_member(&state.db_pool, first.id, manager.id, MemberRole::Manager)
            .await
            .unwrap();
        let second = test_support::create_hotel(&state, &manager, Some(brand.id)).await;
        assert_eq!(second.brand_id, Some(brand.id));
    }
}
