// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::PgPool;

use crate::{
    common::i18n::I18nStore,
    db::{
        BookingRepository, BrandRepository, FolioRepository, GuestRepository, HotelRepository,
        InventoryRepository, MessagingRepository, RoomRepository, UserRepository, WebsiteRepository,
    },
    services::{
        auth::AuthService,
        availability_service::AvailabilityService,
        booking_service::BookingService,
        brand_service::BrandService,
        cache::{Cache, InMemoryCache},
        document_service::DocumentService,
        folio_service::FolioService,
        guest_service::GuestService,
        hotel_service::HotelService,
        inventory_service::InventoryService,
        messaging_service::MessagingService,
        notifier::{ChannelNotifier, Notifier, ResendNotifier},
        payment_gateway::{DisabledGateway, PaymentGateway, RazorpayGateway, RazorpaySettings},
        payment_service::PaymentService,
        room_service::RoomService,
        website_service::WebsiteService,
    },
};

// Limite de entradas do cache público
const PUBLIC_CACHE_CAPACITY: u64 = 1_000;

// ---
// Configuração (variáveis de ambiente)
// ---

#[derive(Clone)]
pub struct RazorpayConfig {
    pub base_url: String,
    pub key_id: String,
    pub key_secret: String,
    pub webhook_secret: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    // Sem chaves, o gateway fica desligado
    pub razorpay: Option<RazorpayConfig>,
    pub resend_api_key: Option<String>,
    pub email_from: String,
    pub public_cache_ttl: Duration,
    pub fonts_dir: String,
    pub default_currency: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Lê a configuração de qualquer fonte chave -> valor.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &str| get(key).with_context(|| format!("{key} deve ser definida"));

        let database_url = require("DATABASE_URL")?;
        let jwt_secret = require("JWT_SECRET")?;

        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.parse().context("DB_MAX_CONNECTIONS inválido")?,
            None => 10,
        };
        let cache_ttl_secs: u64 = match get("PUBLIC_CACHE_TTL_SECS") {
            Some(raw) => raw.parse().context("PUBLIC_CACHE_TTL_SECS inválido")?,
            None => 300,
        };

        let razorpay = match (get("RAZORPAY_KEY_ID"), get("RAZORPAY_KEY_SECRET")) {
            (Some(key_id), Some(key_secret)) => Some(RazorpayConfig {
                base_url: get("RAZORPAY_BASE_URL").unwrap_or_else(|| "https://api.razorpay.com/v1".into()),
                key_id,
                key_secret,
                webhook_secret: require("RAZORPAY_WEBHOOK_SECRET")?,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
            db_max_connections,
            razorpay,
            resend_api_key: get("RESEND_API_KEY"),
            email_from: get("EMAIL_FROM").unwrap_or_else(|| "Hotel PMS <no-reply@example.com>".into()),
            public_cache_ttl: Duration::from_secs(cache_ttl_secs),
            fonts_dir: get("FONTS_DIR").unwrap_or_else(|| "./fonts".into()),
            default_currency: get("DEFAULT_CURRENCY")
                .map(|c| c.to_uppercase())
                .unwrap_or_else(|| "INR".into()),
        })
    }
}

// ---
// Estado compartilhado
// ---

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<AppConfig>,
    pub i18n_store: I18nStore,
    // O hotel_guard consulta hotel e vínculo direto no repositório
    pub hotel_repo: HotelRepository,

    pub auth_service: AuthService,
    pub hotel_service: HotelService,
    pub brand_service: BrandService,
    pub room_service: RoomService,
    pub availability_service: AvailabilityService,
    pub booking_service: BookingService,
    pub folio_service: FolioService,
    pub payment_service: PaymentService,
    pub guest_service: GuestService,
    pub inventory_service: InventoryService,
    pub messaging_service: MessagingService,
    pub website_service: WebsiteService,
    pub document_service: DocumentService,
}

impl AppState {
    /// Monta o gráfico de dependências. Não abre conexões: o pool já vem pronto.
    pub fn build(config: AppConfig, db_pool: PgPool) -> anyhow::Result<Self> {
        let i18n_store = I18nStore::load()?;

        // --- Colaboradores externos ---
        let gateway: Arc<dyn PaymentGateway> = match &config.razorpay {
            Some(rzp) => {
                tracing::info!("💳 Gateway de pagamento: Razorpay");
                Arc::new(RazorpayGateway::new(RazorpaySettings {
                    base_url: rzp.base_url.clone(),
                    key_id: rzp.key_id.clone(),
                    key_secret: rzp.key_secret.clone(),
                    webhook_secret: rzp.webhook_secret.clone(),
                })?)
            }
            None => {
                tracing::warn!("💳 Gateway de pagamento não configurado; pagamentos online desativados");
                Arc::new(DisabledGateway)
            }
        };

        let email = match &config.resend_api_key {
            Some(key) => Some(ResendNotifier::new(key.clone(), config.email_from.clone())?),
            None => None,
        };
        let notifier: Arc<dyn Notifier> = Arc::new(ChannelNotifier::new(email));
        let cache: Arc<dyn Cache> = Arc::new(InMemoryCache::new(PUBLIC_CACHE_CAPACITY));

        // --- Repositórios ---
        let user_repo = UserRepository::new(db_pool.clone());
        let hotel_repo = HotelRepository::new(db_pool.clone());
        let brand_repo = BrandRepository::new(db_pool.clone());
        let room_repo = RoomRepository::new(db_pool.clone());
        let guest_repo = GuestRepository::new(db_pool.clone());
        let booking_repo = BookingRepository::new(db_pool.clone());
        let folio_repo = FolioRepository::new(db_pool.clone());
        let inventory_repo = InventoryRepository::new(db_pool.clone());
        let messaging_repo = MessagingRepository::new(db_pool.clone());
        let website_repo = WebsiteRepository::new(db_pool.clone());

        // --- Serviços ---
        let auth_service = AuthService::new(user_repo.clone(), config.jwt_secret.clone(), db_pool.clone());
        let hotel_service = HotelService::new(hotel_repo.clone(), brand_repo.clone(), user_repo, db_pool.clone());
        let brand_service = BrandService::new(brand_repo, hotel_repo.clone(), db_pool.clone());
        let room_service = RoomService::new(room_repo.clone(), db_pool.clone());
        let availability_service =
            AvailabilityService::new(booking_repo.clone(), room_repo.clone(), db_pool.clone());
        let folio_service = FolioService::new(folio_repo.clone(), booking_repo.clone(), db_pool.clone());
        let messaging_service = MessagingService::new(messaging_repo, notifier, db_pool.clone());
        let booking_service = BookingService::new(
            booking_repo.clone(),
            room_repo,
            guest_repo.clone(),
            folio_repo.clone(),
            availability_service.clone(),
            folio_service.clone(),
            messaging_service.clone(),
            db_pool.clone(),
        );
        let payment_service = PaymentService::new(
            folio_repo,
            folio_service.clone(),
            gateway,
            config.default_currency.clone(),
            db_pool.clone(),
        );
        let guest_service = GuestService::new(guest_repo.clone(), booking_repo.clone(), db_pool.clone());
        let inventory_service = InventoryService::new(inventory_repo, db_pool.clone());
        let website_service =
            WebsiteService::new(website_repo, cache, config.public_cache_ttl, db_pool.clone());
        let document_service = DocumentService::new(
            hotel_repo.clone(),
            booking_repo,
            guest_repo,
            folio_service.clone(),
            config.fonts_dir.clone(),
            config.default_currency.clone(),
        );

        Ok(Self {
            db_pool,
            config: Arc::new(config),
            i18n_store,
            hotel_repo,
            auth_service,
            hotel_service,
            brand_service,
            room_service,
            availability_service,
            booking_service,
            folio_service,
            payment_service,
            guest_service,
            inventory_service,
            messaging_service,
            website_service,
            document_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn required_variables() {
        let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s")])).err().unwrap();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/pms"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.public_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.default_currency, "INR");
        assert!(config.razorpay.is_none());
        assert!(config.resend_api_key.is_none());
    }

    #[test]
    fn razorpay_keys_require_webhook_secret() {
        let vars = [
            ("DATABASE_URL", "postgres://localhost/pms"),
            ("JWT_SECRET", "secret"),
            ("RAZORPAY_KEY_ID", "rzp_test_1"),
            ("RAZORPAY_KEY_SECRET", "shh"),
        ];
        assert!(AppConfig::from_lookup(lookup(&vars)).is_err());

        let mut with_secret = vars.to_vec();
        with_secret.push(("RAZORPAY_WEBHOOK_SECRET", "whsec"));
        let config = AppConfig::from_lookup(lookup(&with_secret)).unwrap();
        let rzp = config.razorpay.unwrap();
        assert_eq!(rzp.base_url, "https://api.razorpay.com/v1");
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/pms"),
            ("JWT_SECRET", "secret"),
            ("DB_MAX_CONNECTIONS", "many"),
        ]));
        assert!(config.is_err());
    }
}
