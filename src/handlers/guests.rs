// src/handlers/guests.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        validation::{validate_http_url, validate_phone},
    },
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermGuestsWrite, RequirePermission},
        tenancy::HotelContext,
    },
    models::guest::{Guest, KycStatus},
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateGuestPayload {
    #[validate(length(min = 1, max = 160, message = "required"))]
    #[schema(example = "Ananya Rao")]
    pub full_name: String,

    #[validate(custom(function = "validate_phone"))]
    #[schema(example = "+91 98123 45678")]
    pub phone: String,

    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubmitKycPayload {
    #[validate(length(min = 1, max = 40, message = "required"))]
    #[schema(example = "AADHAAR")]
    pub id_proof_type: String,

    #[validate(length(min = 1, max = 64, message = "required"))]
    pub id_proof_number: String,

    #[validate(custom(function = "validate_http_url"))]
    pub id_proof_url: String,

    #[validate(custom(function = "validate_http_url"))]
    pub selfie_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReviewKycPayload {
    /// VERIFIED ou REJECTED
    pub status: KycStatus,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct GuestSearchQuery {
    /// Busca por nome, telefone ou e-mail
    pub search: Option<String>,
}

// ---
// Handlers
// ---

#[utoipa::path(
    get,
    path = "/api/hotels/{hotelId}/guests",
    tag = "Guests",
    params(("hotelId" = Uuid, Path, description = "ID do hotel"), GuestSearchQuery),
    responses((status = 200, body = [Guest])),
    security(("api_jwt" = []))
)]
pub async fn list_guests(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    Query(query): Query<GuestSearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let guests = app_state
        .guest_service
        .list(hotel.hotel_id, search)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(guests)))
}

// Find-or-create pelo telefone
#[utoipa::path(
    post,
    path = "/api/hotels/{hotelId}/guests",
    tag = "Guests",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    request_body = CreateGuestPayload,
    responses((status = 200, body = Guest), (status = 400, description = "Dados inválidos")),
    security(("api_jwt" = []))
)]
pub async fn create_guest(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    _guard: RequirePermission<PermGuestsWrite>,
    Json(payload): Json<CreateGuestPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let guest = app_state
        .guest_service
        .upsert(hotel.hotel_id, payload.full_name.trim(), &payload.phone, payload.email.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(guest)))
}

#[utoipa::path(
    get,
    path = "/api/hotels/{hotelId}/guests/{guestId}",
    tag = "Guests",
    params(
        ("hotelId" = Uuid, Path, description = "ID do hotel"),
        ("guestId" = Uuid, Path, description = "ID do hóspede")
    ),
    responses((status = 200, body = Guest), (status = 404, description = "Hóspede não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn get_guest(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    Path((_hotel_id, guest_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let guest = app_state
        .guest_service
        .get(hotel.hotel_id, guest_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(guest)))
}

#[utoipa::path(
    post,
    path = "/api/hotels/{hotelId}/guests/{guestId}/kyc",
    tag = "Guests",
    params(
        ("hotelId" = Uuid, Path, description = "ID do hotel"),
        ("guestId" = Uuid, Path, description = "ID do hóspede")
    ),
    request_body = SubmitKycPayload,
    responses((status = 200, body = Guest), (status = 409, description = "KYC já verificado")),
    security(("api_jwt" = []))
)]
pub async fn submit_kyc(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    _guard: RequirePermission<PermGuestsWrite>,
    Path((_hotel_id, guest_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<SubmitKycPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let guest = app_state
        .guest_service
        .submit_kyc(
            hotel.hotel_id,
            guest_id,
            &payload.id_proof_type.trim().to_uppercase(),
            payload.id_proof_number.trim(),
            payload.id_proof_url.trim(),
            payload.selfie_url.as_deref().map(str::trim),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(guest)))
}

#[utoipa::path(
    post,
    path = "/api/hotels/{hotelId}/guests/{guestId}/kyc/review",
    tag = "Guests",
    params(
        ("hotelId" = Uuid, Path, description = "ID do hotel"),
        ("guestId" = Uuid, Path, description = "ID do hóspede")
    ),
    request_body = ReviewKycPayload,
    responses((status = 200, body = Guest), (status = 409, description = "KYC não enviado")),
    security(("api_jwt" = []))
)]
pub async fn review_kyc(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    _guard: RequirePermission<PermGuestsWrite>,
    Path((_hotel_id, guest_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ReviewKycPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let guest = app_state
        .guest_service
        .review_kyc(hotel.hotel_id, guest_id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(guest)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kyc_payload_requires_http_urls() {
        let payload: SubmitKycPayload = serde_json::from_str(
            r#"{"idProofType":"PASSPORT","idProofNumber":"Z1234567","idProofUrl":"s3://bucket/p.jpg"}"#,
        )
        .unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("id_proof_url"));
    }

    #[test]
    fn guest_payload_checks_phone() {
        let payload: CreateGuestPayload =
            serde_json::from_str(r#"{"fullName":"Ravi","phone":"123"}"#).unwrap();
        assert!(payload.validate().is_err());
    }
}
