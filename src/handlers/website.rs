// src/handlers/website.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        validation::{validate_http_url, validate_phone, validate_slug},
    },
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermWebsiteWrite, RequirePermission},
        tenancy::HotelContext,
    },
    models::website::WebsiteConfig,
    services::website_service::WebsiteInput,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpsertWebsitePayload {
    #[validate(custom(function = "validate_slug"))]
    #[schema(example = "hotel-aurora")]
    pub slug: String,

    #[validate(length(min = 1, max = 160, message = "required"))]
    pub title: String,

    pub tagline: Option<String>,

    #[validate(length(equal = 7, message = "required"))]
    #[schema(example = "#0F766E")]
    pub theme_color: Option<String>,

    #[validate(custom(function = "validate_http_url"))]
    pub hero_image_url: Option<String>,

    #[validate(email(message = "invalid_email"))]
    pub contact_email: Option<String>,

    #[validate(custom(function = "validate_phone"))]
    pub contact_phone: Option<String>,

    #[serde(default)]
    pub is_published: bool,
}

impl From<UpsertWebsitePayload> for WebsiteInput {
    fn from(p: UpsertWebsitePayload) -> Self {
        WebsiteInput {
            slug: p.slug,
            title: p.title.trim().to_string(),
            tagline: p.tagline,
            theme_color: p.theme_color,
            hero_image_url: p.hero_image_url,
            contact_email: p.contact_email,
            contact_phone: p.contact_phone,
            is_published: p.is_published,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/hotels/{hotelId}/website",
    tag = "Website",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    responses((status = 200, body = WebsiteConfig), (status = 404, description = "Site não configurado")),
    security(("api_jwt" = []))
)]
pub async fn get_website(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
) -> Result<impl IntoResponse, ApiError> {
    let website = app_state
        .website_service
        .get(hotel.hotel_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(website)))
}

#[utoipa::path(
    put,
    path = "/api/hotels/{hotelId}/website",
    tag = "Website",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    request_body = UpsertWebsitePayload,
    responses((status = 200, body = WebsiteConfig), (status = 409, description = "Slug em uso")),
    security(("api_jwt" = []))
)]
pub async fn put_website(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    _guard: RequirePermission<PermWebsiteWrite>,
    Json(payload): Json<UpsertWebsitePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let website = app_state
        .website_service
        .put(hotel.hotel_id, payload.into())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(website)))
}

// Pública (sem JWT), servida do cache
#[utoipa::path(
    get,
    path = "/api/public/websites/{slug}",
    tag = "Website",
    params(("slug" = String, Path, description = "Slug público do site")),
    responses((status = 200, body = WebsiteConfig), (status = 404, description = "Site não publicado"))
)]
pub async fn get_public_website(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let website = app_state
        .website_service
        .public_by_slug(slug.trim())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(website)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn website_payload_is_validated() {
        let payload: UpsertWebsitePayload = serde_json::from_str(
            r##"{"slug":"Aurora Site","title":"","themeColor":"#0F766E","heroImageUrl":"https://cdn.example.in/hero.jpg"}"##,
        )
        .unwrap();
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("slug"));
        assert!(fields.contains_key("title"));
        assert!(!fields.contains_key("theme_color"));
        assert!(!payload.is_published);
    }
}
