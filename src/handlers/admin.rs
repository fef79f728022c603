// src/handlers/admin.rs

// Console do super admin: marcas e análise do cadastro dos hotéis.
// As rotas ficam atrás do super_admin_guard.

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
        validation::validate_slug,
    },
    config::AppState,
    middleware::i18n::Locale,
    models::{
        brand::{Brand, BrandPlan},
        hotel::{Hotel, HotelDocument, OnboardingStatus, VerificationStatus},
    },
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateBrandPayload {
    #[validate(length(min = 1, max = 120, message = "required"))]
    #[schema(example = "Aurora Stays")]
    pub name: String,

    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,

    pub plan: Option<BrandPlan>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateBrandPayload {
    #[validate(length(min = 1, max = 120, message = "required"))]
    pub name: Option<String>,
    pub plan: Option<BrandPlan>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct HotelListQuery {
    pub onboarding_status: Option<OnboardingStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReviewDocumentPayload {
    /// approved, rejected ou reupload_requested
    pub status: VerificationStatus,
    pub remarks: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReviewRemarksPayload {
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RejectHotelPayload {
    #[validate(length(min = 1, max = 1000, message = "required"))]
    #[schema(example = "GST certificate is expired")]
    pub remarks: String,
}

// ---
// Marcas
// ---

#[utoipa::path(
    get,
    path = "/api/admin/brands",
    tag = "Admin",
    responses((status = 200, body = [Brand]), (status = 403, description = "Apenas super admin")),
    security(("api_jwt" = []))
)]
pub async fn list_brands(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let brands = app_state
        .brand_service
        .list()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(brands)))
}

#[utoipa::path(
    post,
    path = "/api/admin/brands",
    tag = "Admin",
    request_body = CreateBrandPayload,
    responses((status = 201, body = Brand), (status = 409, description = "Slug em uso")),
    security(("api_jwt" = []))
)]
pub async fn create_brand(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreateBrandPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let brand = app_state
        .brand_service
        .create(
            payload.name.trim(),
            payload.slug.as_deref(),
            payload.plan.unwrap_or(BrandPlan::Free),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(brand)))
}

#[utoipa::path(
    get,
    path = "/api/admin/brands/{brandId}",
    tag = "Admin",
    params(("brandId" = Uuid, Path, description = "ID da marca")),
    responses((status = 200, body = Brand), (status = 404, description = "Marca não encontrada")),
    security(("api_jwt" = []))
)]
pub async fn get_brand(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(brand_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let brand = app_state
        .brand_service
        .get(brand_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(brand)))
}

#[utoipa::path(
    put,
    path = "/api/admin/brands/{brandId}",
    tag = "Admin",
    params(("brandId" = Uuid, Path, description = "ID da marca")),
    request_body = UpdateBrandPayload,
    responses((status = 200, body = Brand), (status = 404, description = "Marca não encontrada")),
    security(("api_jwt" = []))
)]
pub async fn update_brand(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(brand_id): Path<Uuid>,
    Json(payload): Json<UpdateBrandPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let brand = app_state
        .brand_service
        .update(brand_id, payload.name.as_deref().map(str::trim), payload.plan, payload.is_active)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(brand)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/brands/{brandId}",
    tag = "Admin",
    params(("brandId" = Uuid, Path, description = "ID da marca")),
    responses(
        (status = 204, description = "Marca removida"),
        (status = 409, description = "Marca ainda tem hotéis")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_brand(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(brand_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .brand_service
        .delete(brand_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Hotéis
// ---

#[utoipa::path(
    get,
    path = "/api/admin/hotels",
    tag = "Admin",
    params(HotelListQuery),
    responses((status = 200, body = [Hotel])),
    security(("api_jwt" = []))
)]
pub async fn list_hotels(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<HotelListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let hotels = app_state
        .hotel_service
        .list_all(query.onboarding_status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(hotels)))
}

#[utoipa::path(
    get,
    path = "/api/admin/hotels/{hotelId}/documents",
    tag = "Admin",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    responses((status = 200, body = [HotelDocument])),
    security(("api_jwt" = []))
)]
pub async fn list_hotel_documents(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(hotel_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let documents = app_state
        .hotel_service
        .list_documents(hotel_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(documents)))
}

#[utoipa::path(
    post,
    path = "/api/admin/hotels/{hotelId}/documents/{documentId}/review",
    tag = "Admin",
    params(
        ("hotelId" = Uuid, Path, description = "ID do hotel"),
        ("documentId" = Uuid, Path, description = "ID do documento")
    ),
    request_body = ReviewDocumentPayload,
    responses((status = 200, body = HotelDocument), (status = 409, description = "Documento já revisado")),
    security(("api_jwt" = []))
)]
pub async fn review_document(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((hotel_id, document_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ReviewDocumentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let document = app_state
        .hotel_service
        .review_document(hotel_id, document_id, payload.status, payload.remarks.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(document)))
}

#[utoipa::path(
    post,
    path = "/api/admin/hotels/{hotelId}/approve",
    tag = "Admin",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    request_body = ReviewRemarksPayload,
    responses(
        (status = 200, description = "Hotel aprovado e ativo", body = Hotel),
        (status = 400, description = "Documentos pendentes"),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_hotel(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(hotel_id): Path<Uuid>,
    payload: Option<Json<ReviewRemarksPayload>>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.unwrap_or_default();

    let hotel = app_state
        .hotel_service
        .approve(hotel_id, payload.remarks.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(hotel)))
}

#[utoipa::path(
    post,
    path = "/api/admin/hotels/{hotelId}/reject",
    tag = "Admin",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    request_body = RejectHotelPayload,
    responses((status = 200, body = Hotel), (status = 409, description = "Transição inválida")),
    security(("api_jwt" = []))
)]
pub async fn reject_hotel(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(hotel_id): Path<Uuid>,
    Json(payload): Json<RejectHotelPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let hotel = app_state
        .hotel_service
        .reject(hotel_id, payload.remarks.trim())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(hotel)))
}

#[utoipa::path(
    post,
    path = "/api/admin/hotels/{hotelId}/suspend",
    tag = "Admin",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    request_body = ReviewRemarksPayload,
    responses((status = 200, body = Hotel), (status = 409, description = "Hotel não está ativo")),
    security(("api_jwt" = []))
)]
pub async fn suspend_hotel(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(hotel_id): Path<Uuid>,
    payload: Option<Json<ReviewRemarksPayload>>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.unwrap_or_default();

    let hotel = app_state
        .hotel_service
        .suspend(hotel_id, payload.remarks.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(hotel)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_payload_uses_snake_case_status() {
        let payload: ReviewDocumentPayload =
            serde_json::from_str(r#"{"status":"reupload_requested","remarks":"blurry"}"#).unwrap();
        assert_eq!(payload.status, VerificationStatus::ReuploadRequested);
    }

    #[test]
    fn rejection_needs_remarks() {
        let payload: RejectHotelPayload = serde_json::from_str(r#"{"remarks":""}"#).unwrap();
        assert!(payload.validate().is_err());
    }
}
