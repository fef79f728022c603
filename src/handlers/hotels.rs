// src/handlers/hotels.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        validation::{validate_http_url, validate_slug},
    },
    config::AppState,
    db::HotelProfile,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermHotelManage, PermMembersManage, RequirePermission},
        tenancy::HotelContext,
    },
    models::hotel::{Hotel, HotelDocument, HotelMember, MemberRole},
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateHotelPayload {
    #[validate(length(min = 1, max = 160, message = "required"))]
    #[schema(example = "Hotel Aurora")]
    pub name: String,

    // Gerado a partir do nome quando ausente
    #[validate(custom(function = "validate_slug"))]
    #[schema(example = "hotel-aurora")]
    pub slug: Option<String>,

    pub brand_id: Option<Uuid>,
    pub hotel_type: Option<String>,
    pub handling_type: Option<String>,
    pub address: Option<Value>,
    pub legal_info: Option<Value>,
    pub upi_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateHotelPayload {
    #[validate(length(min = 1, max = 160, message = "required"))]
    pub name: String,
    pub hotel_type: Option<String>,
    pub handling_type: Option<String>,
    pub address: Option<Value>,
    pub legal_info: Option<Value>,
    pub upi_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpsertDocumentPayload {
    #[validate(length(min = 1, max = 64, message = "required"))]
    #[schema(example = "GST_CERTIFICATE")]
    pub kind: String,

    #[validate(custom(function = "validate_http_url"))]
    #[schema(example = "https://files.example.com/docs/gst.pdf")]
    pub url: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddMemberPayload {
    #[validate(email(message = "invalid_email"))]
    pub email: String,
    pub role: MemberRole,
}

fn profile(
    name: String,
    hotel_type: Option<String>,
    handling_type: Option<String>,
    address: Option<Value>,
    legal_info: Option<Value>,
    upi_id: Option<String>,
) -> HotelProfile {
    HotelProfile {
        name: name.trim().to_string(),
        hotel_type,
        handling_type,
        address,
        legal_info,
        upi_id: upi_id.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()),
    }
}

// ---
// Hotéis do usuário
// ---

#[utoipa::path(
    get,
    path = "/api/hotels",
    tag = "Hotels",
    responses((status = 200, description = "Hotéis em que o usuário é membro", body = [Hotel])),
    security(("api_jwt" = []))
)]
pub async fn list_my_hotels(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let hotels = app_state
        .hotel_service
        .list_my_hotels(user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(hotels)))
}

#[utoipa::path(
    post,
    path = "/api/hotels",
    tag = "Hotels",
    request_body = CreateHotelPayload,
    responses(
        (status = 201, description = "Hotel criado em rascunho", body = Hotel),
        (status = 403, description = "Marca inativa ou sem acesso à marca"),
        (status = 409, description = "Slug em uso ou limite do plano")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_hotel(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateHotelPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let CreateHotelPayload { name, slug, brand_id, hotel_type, handling_type, address, legal_info, upi_id } =
        payload;

    let hotel = app_state
        .hotel_service
        .create_hotel(
            &user,
            brand_id,
            slug.as_deref(),
            profile(name, hotel_type, handling_type, address, legal_info, upi_id),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(hotel)))
}

// ---
// Hotel (escopo do hotel_guard)
// ---

#[utoipa::path(
    get,
    path = "/api/hotels/{hotelId}",
    tag = "Hotels",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    responses((status = 200, body = Hotel), (status = 404, description = "Hotel não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn get_hotel(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
) -> Result<impl IntoResponse, ApiError> {
    let hotel = app_state
        .hotel_service
        .get_hotel(hotel.hotel_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(hotel)))
}

#[utoipa::path(
    put,
    path = "/api/hotels/{hotelId}",
    tag = "Hotels",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    request_body = UpdateHotelPayload,
    responses(
        (status = 200, body = Hotel),
        (status = 409, description = "Cadastro bloqueado (enviado ou aprovado)")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_hotel(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    _guard: RequirePermission<PermHotelManage>,
    Json(payload): Json<UpdateHotelPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let UpdateHotelPayload { name, hotel_type, handling_type, address, legal_info, upi_id } = payload;

    let updated = app_state
        .hotel_service
        .update_profile(
            hotel.hotel_id,
            profile(name, hotel_type, handling_type, address, legal_info, upi_id),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    post,
    path = "/api/hotels/{hotelId}/submit",
    tag = "Hotels",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    responses(
        (status = 200, description = "Cadastro enviado para análise", body = Hotel),
        (status = 400, description = "Documentos pendentes"),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit_hotel(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    _guard: RequirePermission<PermHotelManage>,
) -> Result<impl IntoResponse, ApiError> {
    let submitted = app_state
        .hotel_service
        .submit(hotel.hotel_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(submitted)))
}

#[utoipa::path(
    put,
    path = "/api/hotels/{hotelId}/documents",
    tag = "Hotels",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    request_body = UpsertDocumentPayload,
    responses((status = 200, body = HotelDocument)),
    security(("api_jwt" = []))
)]
pub async fn upsert_document(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    _guard: RequirePermission<PermHotelManage>,
    Json(payload): Json<UpsertDocumentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let document = app_state
        .hotel_service
        .upsert_document(hotel.hotel_id, &payload.kind.trim().to_uppercase(), payload.url.trim())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(document)))
}

#[utoipa::path(
    get,
    path = "/api/hotels/{hotelId}/documents",
    tag = "Hotels",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    responses((status = 200, body = [HotelDocument])),
    security(("api_jwt" = []))
)]
pub async fn list_documents(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
) -> Result<impl IntoResponse, ApiError> {
    let documents = app_state
        .hotel_service
        .list_documents(hotel.hotel_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(documents)))
}

// ---
// Membros
// ---

#[utoipa::path(
    get,
    path = "/api/hotels/{hotelId}/members",
    tag = "Hotels",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    responses((status = 200, body = [HotelMember])),
    security(("api_jwt" = []))
)]
pub async fn list_members(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
) -> Result<impl IntoResponse, ApiError> {
    let members = app_state
        .hotel_service
        .list_members(hotel.hotel_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(members)))
}

#[utoipa::path(
    post,
    path = "/api/hotels/{hotelId}/members",
    tag = "Hotels",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    request_body = AddMemberPayload,
    responses(
        (status = 201, body = HotelMember),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_member(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    _guard: RequirePermission<PermMembersManage>,
    Json(payload): Json<AddMemberPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let member = app_state
        .hotel_service
        .add_member(hotel.hotel_id, payload.email.trim(), payload.role)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(member)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_payload_rejects_bad_slug_and_unknown_fields() {
        let payload: CreateHotelPayload =
            serde_json::from_str(r#"{"name":"Hotel Aurora","slug":"Hotel Aurora"}"#).unwrap();
        assert!(payload.validate().is_err());

        let unknown = serde_json::from_str::<CreateHotelPayload>(r#"{"name":"A","stars":5}"#);
        assert!(unknown.is_err());
    }

    #[test]
    fn document_url_must_be_http() {
        let payload: UpsertDocumentPayload =
            serde_json::from_str(r#"{"kind":"PAN","url":"file:///etc/passwd"}"#).unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn empty_upi_id_is_dropped() {
        let p = profile(" Aurora ".into(), None, None, None, None, Some("  ".into()));
        assert_eq!(p.name, "Aurora");
        assert!(p.upi_id.is_none());
    }
}
