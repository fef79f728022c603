// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Erro de domínio. Os serviços e repositórios só conhecem este tipo;
// a tradução para HTTP acontece na borda (handlers/middlewares).
#[derive(Debug, Error)]
pub enum AppError {
    // --- (a) Validação ---
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Entrada inválida: {0}")]
    InvalidInput(String),

    // --- Autenticação / Autorização ---
    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("Hotel suspenso")]
    HotelSuspended,

    #[error("Usuário não é membro do hotel")]
    NotHotelMember,

    // --- (b) Não encontrado ---
    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    // --- (c) Regras de negócio ---
    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Sem disponibilidade para o tipo de quarto {room_type}")]
    NoAvailability { room_type: String },

    #[error("Quarto {0} ocupado no período")]
    RoomNotAvailable(String),

    #[error("Quarto {room} não está limpo (status {status})")]
    RoomNotClean { room: String, status: String },

    #[error("Quarto não pertence ao tipo reservado")]
    RoomTypeMismatch,

    #[error("Ocupação máxima excedida ({max})")]
    OccupancyExceeded { max: i32 },

    #[error("Transição inválida de {entity}: {from} -> {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("Folio com saldo devedor de {0}")]
    OutstandingBalance(Decimal),

    #[error("Folio já está fechado")]
    FolioSettled,

    #[error("Estoque insuficiente: disponível {available}, solicitado {requested}")]
    InsufficientStock { available: Decimal, requested: Decimal },

    #[error("Limite do plano {0} atingido")]
    PlanLimitReached(String),

    #[error("Pagamento não pode ser estornado")]
    PaymentNotRefundable,

    #[error("Documentos pendentes de aprovação")]
    DocumentsPending,

    // --- (d) Integrações ---
    #[error("Falha no gateway de pagamento: {0}")]
    PaymentGateway(String),

    #[error("Assinatura do gateway inválida")]
    SignatureMismatch,

    #[error("Falha no provedor de mensagens: {0}")]
    MessagingProvider(String),

    #[error("Erro HTTP: {0}")]
    HttpClient(#[from] reqwest::Error),

    // --- (e) Internos ---
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// Erro "pronto para o cliente": status + código estável + mensagem traduzida.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub error: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, error: impl Into<String>) -> Self {
        Self { status, code, error: error.into(), details: None }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({ "code": self.code, "error": self.error });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    /// Status HTTP, chave do catálogo de mensagens e parâmetros de interpolação.
    fn descriptor(&self) -> (StatusCode, &'static str, Vec<(&'static str, String)>) {
        use AppError::*;
        match self {
            ValidationError(_) => (StatusCode::BAD_REQUEST, "validation_failed", vec![]),
            InvalidInput(msg) => (StatusCode::BAD_REQUEST, "invalid_input", vec![("reason", msg.clone())]),

            EmailAlreadyExists => (StatusCode::CONFLICT, "email_already_exists", vec![]),
            InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials", vec![]),
            InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", vec![]),
            UserNotFound => (StatusCode::NOT_FOUND, "user_not_found", vec![]),
            Forbidden(what) => (StatusCode::FORBIDDEN, "forbidden", vec![("permission", what.clone())]),
            HotelSuspended => (StatusCode::FORBIDDEN, "hotel_suspended", vec![]),
            NotHotelMember => (StatusCode::FORBIDDEN, "not_hotel_member", vec![]),

            ResourceNotFound(what) => (StatusCode::NOT_FOUND, "resource_not_found", vec![("resource", what.clone())]),

            UniqueConstraintViolation(what) => (StatusCode::CONFLICT, "already_exists", vec![("resource", what.clone())]),
            NoAvailability { room_type } => (StatusCode::BAD_REQUEST, "no_availability", vec![("roomType", room_type.clone())]),
            RoomNotAvailable(room) => (StatusCode::BAD_REQUEST, "room_not_available", vec![("room", room.clone())]),
            RoomNotClean { room, status } => (
                StatusCode::BAD_REQUEST,
                "room_not_clean",
                vec![("room", room.clone()), ("status", status.clone())],
            ),
            RoomTypeMismatch => (StatusCode::BAD_REQUEST, "room_type_mismatch", vec![]),
            OccupancyExceeded { max } => (StatusCode::BAD_REQUEST, "occupancy_exceeded", vec![("max", max.to_string())]),
            InvalidTransition { entity, from, to } => (
                StatusCode::CONFLICT,
                "invalid_transition",
                vec![("entity", entity.to_string()), ("from", from.clone()), ("to", to.clone())],
            ),
            OutstandingBalance(balance) => (StatusCode::BAD_REQUEST, "outstanding_balance", vec![("balance", balance.to_string())]),
            FolioSettled => (StatusCode::CONFLICT, "folio_settled", vec![]),
            InsufficientStock { available, requested } => (
                StatusCode::BAD_REQUEST,
                "insufficient_stock",
                vec![("available", available.to_string()), ("requested", requested.to_string())],
            ),
            PlanLimitReached(plan) => (StatusCode::CONFLICT, "plan_limit_reached", vec![("plan", plan.clone())]),
            PaymentNotRefundable => (StatusCode::CONFLICT, "payment_not_refundable", vec![]),
            DocumentsPending => (StatusCode::CONFLICT, "documents_pending", vec![]),

            PaymentGateway(msg) => (StatusCode::BAD_GATEWAY, "payment_gateway_error", vec![("reason", msg.clone())]),
            SignatureMismatch => (StatusCode::BAD_REQUEST, "signature_mismatch", vec![]),
            MessagingProvider(msg) => (StatusCode::BAD_GATEWAY, "messaging_error", vec![("reason", msg.clone())]),
            HttpClient(_) => (StatusCode::BAD_GATEWAY, "upstream_error", vec![]),

            DatabaseError(_) | InternalServerError(_) | BcryptError(_) | JwtError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", vec![])
            }
        }
    }

    /// `true` para falhas que o cliente consegue corrigir (classes a–c).
    pub fn is_client_error(&self) -> bool {
        self.descriptor().0.is_client_error()
    }

    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let (status, code, params) = self.descriptor();

        if status.is_server_error() {
            tracing::error!("Erro na requisição ({}): {}", code, self);
        }

        let error = store.translate(&locale.0, &format!("error.{code}"), &params);

        // Validação: devolve todos os campos com as mensagens traduzidas.
        let details = match &self {
            AppError::ValidationError(errors) => {
                let mut fields = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            let key = e.message.as_deref().unwrap_or(e.code.as_ref());
                            Value::String(store.translate(&locale.0, &format!("validation.{key}"), &[]))
                        })
                        .collect();
                    fields.insert(field.to_string(), Value::Array(messages));
                }
                Some(Value::Object(fields))
            }
            _ => None,
        };

        ApiError { status, code, error, details }
    }
}

// Converte violações de unicidade do Postgres no erro de domínio.
pub fn map_unique_violation(e: sqlx::Error, resource: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::UniqueConstraintViolation(resource.to_string());
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    fn store() -> I18nStore {
        I18nStore::load().expect("catálogos embutidos")
    }

    #[test]
    fn domain_errors_are_client_errors() {
        assert!(AppError::NoAvailability { room_type: "Deluxe".into() }.is_client_error());
        assert!(AppError::OutstandingBalance(Decimal::new(600, 0)).is_client_error());
        assert!(AppError::ResourceNotFound("booking".into()).is_client_error());
        assert!(!AppError::PaymentGateway("timeout".into()).is_client_error());
        assert!(!AppError::InternalServerError(anyhow::anyhow!("boom")).is_client_error());
    }

    #[test]
    fn availability_rejection_maps_to_bad_request() {
        let api = AppError::NoAvailability { room_type: "Deluxe".into() }
            .to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.code, "no_availability");
        assert!(api.error.contains("Deluxe"));
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let api = AppError::InternalServerError(anyhow::anyhow!("senha do banco: hunter2"))
            .to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("hunter2"));
    }

    #[test]
    fn validation_errors_list_offending_fields() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("length");
        err.message = Some("required".into());
        errors.add("name", err);

        let api = AppError::ValidationError(errors).to_api_error(&Locale("pt".into()), &store());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("detalhes da validação");
        assert!(details.get("name").is_some());
    }

    #[test]
    fn hotel_access_rejections_have_their_own_messages() {
        let suspended = AppError::HotelSuspended.to_api_error(&Locale("en".into()), &store());
        assert_eq!(suspended.status, StatusCode::FORBIDDEN);
        assert_eq!(suspended.code, "hotel_suspended");
        assert!(suspended.error.contains("suspended"));
        assert!(!suspended.error.contains("permission"));

        let outsider = AppError::NotHotelMember.to_api_error(&Locale("pt".into()), &store());
        assert_eq!(outsider.status, StatusCode::FORBIDDEN);
        assert_eq!(outsider.code, "not_hotel_member");
        assert!(outsider.error.contains("membro"));
        assert!(!outsider.error.contains("permissão"));
    }

    #[test]
    fn invalid_transition_is_conflict() {
        let api = AppError::InvalidTransition {
            entity: "booking",
            from: "CHECKED_OUT".into(),
            to: "CHECKED_IN".into(),
        }
        .to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert!(api.error.contains("CHECKED_OUT"));
    }
}
