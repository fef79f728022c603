// src/handlers/folio.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermFolioWrite, RequirePermission},
        tenancy::HotelContext,
    },
    models::folio::FolioDetail,
};

#[utoipa::path(
    get,
    path = "/api/hotels/{hotelId}/bookings/{bookingId}/folio",
    tag = "Folio",
    params(
        ("hotelId" = Uuid, Path, description = "ID do hotel"),
        ("bookingId" = Uuid, Path, description = "ID da reserva")
    ),
    responses((status = 200, body = FolioDetail), (status = 404, description = "Folio não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn get_folio(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    Path((_hotel_id, booking_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .folio_service
        .get_detail(hotel.hotel_id, booking_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

// Fecha a conta; recusado enquanto houver saldo devedor
#[utoipa::path(
    post,
    path = "/api/hotels/{hotelId}/bookings/{bookingId}/folio/settle",
    tag = "Folio",
    params(
        ("hotelId" = Uuid, Path, description = "ID do hotel"),
        ("bookingId" = Uuid, Path, description = "ID da reserva")
    ),
    responses(
        (status = 200, body = FolioDetail),
        (status = 409, description = "Saldo em aberto ou folio já fechado")
    ),
    security(("api_jwt" = []))
)]
pub async fn settle_folio(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    _guard: RequirePermission<PermFolioWrite>,
    Path((_hotel_id, booking_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .folio_service
        .settle(hotel.hotel_id, booking_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}
