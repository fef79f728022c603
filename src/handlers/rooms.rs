// src/handlers/rooms.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        validation::validate_not_negative,
    },
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermRoomsStatus, PermRoomsWrite, RequirePermission},
        tenancy::HotelContext,
    },
    models::{
        availability::{AvailabilityReport, StayPeriod},
        room::{Floor, Room, RoomStatus, RoomType},
    },
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateFloorPayload {
    #[schema(example = 2)]
    pub number: i32,
    pub label: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateRoomTypePayload {
    #[validate(length(min = 1, max = 80, message = "required"))]
    #[schema(example = "Deluxe")]
    pub name: String,

    pub description: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "4500.00")]
    pub base_price: Decimal,

    // Moeda padrão da configuração quando ausente
    #[validate(length(equal = 3, message = "required"))]
    pub currency: Option<String>,

    #[validate(range(min = 1, message = "min_one"))]
    #[schema(example = 3)]
    pub max_occupancy: i32,

    #[serde(default)]
    pub amenities: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateRoomPayload {
    pub floor_id: Uuid,
    pub room_type_id: Uuid,

    #[validate(length(min = 1, max = 16, message = "required"))]
    #[schema(example = "204")]
    pub number: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateRoomStatusPayload {
    pub status: RoomStatus,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RoomListQuery {
    pub status: Option<RoomStatus>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub room_type_id: Uuid,
    /// Data de entrada (AAAA-MM-DD)
    pub check_in: NaiveDate,
    /// Data de saída (AAAA-MM-DD)
    pub check_out: NaiveDate,
}

// ---
// Andares
// ---

#[utoipa::path(
    get,
    path = "/api/hotels/{hotelId}/floors",
    tag = "Rooms",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    responses((status = 200, body = [Floor])),
    security(("api_jwt" = []))
)]
pub async fn list_floors(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
) -> Result<impl IntoResponse, ApiError> {
    let floors = app_state
        .room_service
        .list_floors(hotel.hotel_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(floors)))
}

#[utoipa::path(
    post,
    path = "/api/hotels/{hotelId}/floors",
    tag = "Rooms",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    request_body = CreateFloorPayload,
    responses((status = 201, body = Floor), (status = 409, description = "Andar já cadastrado")),
    security(("api_jwt" = []))
)]
pub async fn create_floor(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    _guard: RequirePermission<PermRoomsWrite>,
    Json(payload): Json<CreateFloorPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let floor = app_state
        .room_service
        .create_floor(hotel.hotel_id, payload.number, payload.label.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(floor)))
}

// ---
// Tipos de quarto
// ---

#[utoipa::path(
    get,
    path = "/api/hotels/{hotelId}/room-types",
    tag = "Rooms",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    responses((status = 200, body = [RoomType])),
    security(("api_jwt" = []))
)]
pub async fn list_room_types(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
) -> Result<impl IntoResponse, ApiError> {
    let types = app_state
        .room_service
        .list_room_types(hotel.hotel_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(types)))
}

#[utoipa::path(
    post,
    path = "/api/hotels/{hotelId}/room-types",
    tag = "Rooms",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    request_body = CreateRoomTypePayload,
    responses((status = 201, body = RoomType), (status = 400, description = "Dados inválidos")),
    security(("api_jwt" = []))
)]
pub async fn create_room_type(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    _guard: RequirePermission<PermRoomsWrite>,
    Json(payload): Json<CreateRoomTypePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let currency = payload
        .currency
        .as_deref()
        .map(str::to_uppercase)
        .unwrap_or_else(|| app_state.config.default_currency.clone());

    let room_type = app_state
        .room_service
        .create_room_type(
            hotel.hotel_id,
            payload.name.trim(),
            payload.description.as_deref(),
            payload.base_price,
            &currency,
            payload.max_occupancy,
            &payload.amenities,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(room_type)))
}

// ---
// Quartos
// ---

#[utoipa::path(
    get,
    path = "/api/hotels/{hotelId}/rooms",
    tag = "Rooms",
    params(("hotelId" = Uuid, Path, description = "ID do hotel"), RoomListQuery),
    responses((status = 200, body = [Room])),
    security(("api_jwt" = []))
)]
pub async fn list_rooms(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    Query(query): Query<RoomListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rooms = app_state
        .room_service
        .list_rooms(hotel.hotel_id, query.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(rooms)))
}

#[utoipa::path(
    post,
    path = "/api/hotels/{hotelId}/rooms",
    tag = "Rooms",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    request_body = CreateRoomPayload,
    responses(
        (status = 201, body = Room),
        (status = 404, description = "Andar ou tipo não encontrado"),
        (status = 409, description = "Número já usado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_room(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    _guard: RequirePermission<PermRoomsWrite>,
    Json(payload): Json<CreateRoomPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let room = app_state
        .room_service
        .create_room(hotel.hotel_id, payload.floor_id, payload.room_type_id, payload.number.trim())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(room)))
}

// Governança: CLEAN / DIRTY / MAINTENANCE / OUT_OF_ORDER
#[utoipa::path(
    patch,
    path = "/api/hotels/{hotelId}/rooms/{roomId}/status",
    tag = "Rooms",
    params(
        ("hotelId" = Uuid, Path, description = "ID do hotel"),
        ("roomId" = Uuid, Path, description = "ID do quarto")
    ),
    request_body = UpdateRoomStatusPayload,
    responses((status = 200, body = Room), (status = 409, description = "Transição inválida")),
    security(("api_jwt" = []))
)]
pub async fn update_room_status(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    _guard: RequirePermission<PermRoomsStatus>,
    Path((_hotel_id, room_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateRoomStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let room = app_state
        .room_service
        .set_status(hotel.hotel_id, room_id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(room)))
}

// ---
// Disponibilidade
// ---

#[utoipa::path(
    get,
    path = "/api/hotels/{hotelId}/availability",
    tag = "Rooms",
    params(("hotelId" = Uuid, Path, description = "ID do hotel"), AvailabilityQuery),
    responses(
        (status = 200, body = AvailabilityReport),
        (status = 400, description = "Período inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn check_availability(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    Query(query): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let stay = StayPeriod::from_dates(query.check_in, query.check_out).ok_or_else(|| {
        AppError::InvalidInput("checkOut".into()).to_api_error(&locale, &app_state.i18n_store)
    })?;

    let report = app_state
        .availability_service
        .check_type_availability(hotel.hotel_id, query.room_type_id, &stay)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(report)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_type_needs_positive_occupancy_and_price() {
        let payload: CreateRoomTypePayload = serde_json::from_str(
            r#"{"name":"Deluxe","basePrice":-1,"maxOccupancy":0}"#,
        )
        .unwrap();
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("base_price"));
        assert!(fields.contains_key("max_occupancy"));
    }

    #[test]
    fn room_status_payload_uses_screaming_case() {
        let payload: UpdateRoomStatusPayload = serde_json::from_str(r#"{"status":"OUT_OF_ORDER"}"#).unwrap();
        assert_eq!(payload.status, RoomStatus::OutOfOrder);
    }
}
