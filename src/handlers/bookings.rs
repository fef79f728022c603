// src/handlers/bookings.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{
        error::{ApiError, AppError},
        validation::{validate_not_negative, validate_phone},
    },
    config::AppState,
    db::BookingFilter,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermBookingsWrite, RequirePermission},
        tenancy::HotelContext,
    },
    models::{
        availability::StayPeriod,
        booking::{Booking, BookingActivity, BookingSource, BookingStatus},
    },
    services::booking_service::{BookingPatch, BookingRequest, GuestDetails},
};

// ---
// Validação de período
// ---
fn date_range_error() -> ValidationError {
    let mut err = ValidationError::new("date_range");
    err.message = Some("date_range".into());
    err
}

fn check_range(check_in: Option<DateTime<Utc>>, check_out: Option<DateTime<Utc>>) -> Result<(), ValidationError> {
    match (check_in, check_out) {
        (Some(start), Some(end)) if start >= end => Err(date_range_error()),
        _ => Ok(()),
    }
}

fn validate_new_stay(payload: &CreateBookingPayload) -> Result<(), ValidationError> {
    check_range(Some(payload.check_in_date), Some(payload.check_out_date))
}

fn validate_channel_stay(payload: &ChannelBookingPayload) -> Result<(), ValidationError> {
    check_range(Some(payload.check_in_date), Some(payload.check_out_date))
}

fn validate_patch_stay(payload: &UpdateBookingPayload) -> Result<(), ValidationError> {
    check_range(payload.check_in_date, payload.check_out_date)
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[validate(schema(function = "validate_new_stay"))]
pub struct CreateBookingPayload {
    pub room_type_id: Uuid,

    #[schema(example = "2024-06-01T12:00:00Z")]
    pub check_in_date: DateTime<Utc>,
    #[schema(example = "2024-06-03T11:00:00Z")]
    pub check_out_date: DateTime<Utc>,

    #[validate(length(min = 1, max = 160, message = "required"))]
    #[schema(example = "Ananya Rao")]
    pub guest_name: String,

    #[validate(custom(function = "validate_phone"))]
    #[schema(example = "+91 98123 45678")]
    pub guest_phone: String,

    #[validate(email(message = "invalid_email"))]
    pub guest_email: Option<String>,

    #[validate(range(min = 1, message = "min_one"))]
    #[schema(example = 2)]
    pub adults: i32,

    #[validate(range(min = 0, message = "not_negative"))]
    #[serde(default)]
    pub children: i32,

    // Sem valor: diárias x preço base do tipo
    #[validate(custom(function = "validate_not_negative"))]
    pub total_amount: Option<Decimal>,

    pub source: Option<BookingSource>,
    pub notes: Option<String>,
}

// Reserva empurrada por um canal (OTA)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[validate(schema(function = "validate_channel_stay"))]
pub struct ChannelBookingPayload {
    #[validate(length(min = 1, max = 64, message = "required"))]
    #[schema(example = "booking.com")]
    pub channel: String,

    #[validate(length(min = 1, max = 128, message = "required"))]
    #[schema(example = "BDC-443210987")]
    pub external_ref: String,

    pub room_type_id: Uuid,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,

    #[validate(length(min = 1, max = 160, message = "required"))]
    pub guest_name: String,
    #[validate(custom(function = "validate_phone"))]
    pub guest_phone: String,
    #[validate(email(message = "invalid_email"))]
    pub guest_email: Option<String>,

    #[validate(range(min = 1, message = "min_one"))]
    pub adults: i32,
    #[validate(range(min = 0, message = "not_negative"))]
    #[serde(default)]
    pub children: i32,

    #[validate(custom(function = "validate_not_negative"))]
    pub total_amount: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[validate(schema(function = "validate_patch_stay"))]
pub struct UpdateBookingPayload {
    pub notes: Option<String>,
    #[validate(range(min = 1, message = "min_one"))]
    pub adults: Option<i32>,
    #[validate(range(min = 0, message = "not_negative"))]
    pub children: Option<i32>,
    #[validate(custom(function = "validate_not_negative"))]
    pub total_amount: Option<Decimal>,
    pub check_in_date: Option<DateTime<Utc>>,
    pub check_out_date: Option<DateTime<Utc>>,
}

impl From<UpdateBookingPayload> for BookingPatch {
    fn from(p: UpdateBookingPayload) -> Self {
        BookingPatch {
            notes: p.notes,
            adults: p.adults,
            children: p.children,
            total_amount: p.total_amount,
            check_in_date: p.check_in_date,
            check_out_date: p.check_out_date,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CheckInPayload {
    pub room_id: Uuid,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CancelBookingPayload {
    #[schema(example = "Guest changed plans")]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct BookingListQuery {
    pub status: Option<BookingStatus>,
    /// Reservas que terminam depois desta data
    pub from: Option<DateTime<Utc>>,
    /// Reservas que começam antes desta data
    pub to: Option<DateTime<Utc>>,
    pub guest_id: Option<Uuid>,
}

fn stay_or_error(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> Result<StayPeriod, AppError> {
    StayPeriod::new(check_in, check_out).ok_or_else(|| AppError::InvalidInput("checkOutDate".into()))
}

// ---
// Handlers: cadastro e consulta
// ---

#[utoipa::path(
    get,
    path = "/api/hotels/{hotelId}/bookings",
    tag = "Bookings",
    params(("hotelId" = Uuid, Path, description = "ID do hotel"), BookingListQuery),
    responses((status = 200, body = [Booking])),
    security(("api_jwt" = []))
)]
pub async fn list_bookings(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    Query(query): Query<BookingListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = BookingFilter {
        status: query.status,
        from: query.from,
        to: query.to,
        guest_id: query.guest_id,
    };

    let bookings = app_state
        .booking_service
        .list_bookings(hotel.hotel_id, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(bookings)))
}

#[utoipa::path(
    post,
    path = "/api/hotels/{hotelId}/bookings",
    tag = "Bookings",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    request_body = CreateBookingPayload,
    responses(
        (status = 201, description = "Reserva confirmada", body = Booking),
        (status = 400, description = "Sem disponibilidade ou ocupação excedida")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_booking(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    hotel: HotelContext,
    _guard: RequirePermission<PermBookingsWrite>,
    Json(payload): Json<CreateBookingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let stay = stay_or_error(payload.check_in_date, payload.check_out_date)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let request = BookingRequest {
        room_type_id: payload.room_type_id,
        stay,
        guest: GuestDetails {
            full_name: payload.guest_name.trim(),
            phone: &payload.guest_phone,
            email: payload.guest_email.as_deref(),
        },
        adults: payload.adults,
        children: payload.children,
        total_amount: payload.total_amount,
        source: payload.source.unwrap_or(BookingSource::Direct),
        channel: None,
        external_ref: None,
        notes: payload.notes.as_deref(),
    };

    let booking = app_state
        .booking_service
        .create_booking(hotel.hotel_id, &request, Some(user.id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(booking)))
}

// Idempotente por (canal, referência externa): 201 na criação, 200 na repetição.
#[utoipa::path(
    post,
    path = "/api/hotels/{hotelId}/channel/bookings",
    tag = "Bookings",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    request_body = ChannelBookingPayload,
    responses(
        (status = 201, description = "Reserva criada", body = Booking),
        (status = 200, description = "Reserva já recebida", body = Booking),
        (status = 400, description = "Sem disponibilidade")
    ),
    security(("api_jwt" = []))
)]
pub async fn ingest_channel_booking(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    _guard: RequirePermission<PermBookingsWrite>,
    Json(payload): Json<ChannelBookingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let stay = stay_or_error(payload.check_in_date, payload.check_out_date)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let request = BookingRequest {
        room_type_id: payload.room_type_id,
        stay,
        guest: GuestDetails {
            full_name: payload.guest_name.trim(),
            phone: &payload.guest_phone,
            email: payload.guest_email.as_deref(),
        },
        adults: payload.adults,
        children: payload.children,
        total_amount: payload.total_amount,
        source: BookingSource::Ota,
        channel: Some(payload.channel.trim()),
        external_ref: Some(payload.external_ref.trim()),
        notes: payload.notes.as_deref(),
    };

    let (booking, created) = app_state
        .booking_service
        .ingest_channel_booking(hotel.hotel_id, &request)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(booking)))
}

#[utoipa::path(
    get,
    path = "/api/hotels/{hotelId}/bookings/{bookingId}",
    tag = "Bookings",
    params(
        ("hotelId" = Uuid, Path, description = "ID do hotel"),
        ("bookingId" = Uuid, Path, description = "ID da reserva")
    ),
    responses((status = 200, body = Booking), (status = 404, description = "Reserva não encontrada")),
    security(("api_jwt" = []))
)]
pub async fn get_booking(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    Path((_hotel_id, booking_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = app_state
        .booking_service
        .get_booking(hotel.hotel_id, booking_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(booking)))
}

#[utoipa::path(
    patch,
    path = "/api/hotels/{hotelId}/bookings/{bookingId}",
    tag = "Bookings",
    params(
        ("hotelId" = Uuid, Path, description = "ID do hotel"),
        ("bookingId" = Uuid, Path, description = "ID da reserva")
    ),
    request_body = UpdateBookingPayload,
    responses(
        (status = 200, body = Booking),
        (status = 400, description = "Sem disponibilidade para as novas datas"),
        (status = 409, description = "Datas só mudam em reservas confirmadas")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_booking(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    hotel: HotelContext,
    _guard: RequirePermission<PermBookingsWrite>,
    Path((_hotel_id, booking_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateBookingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let booking = app_state
        .booking_service
        .update_booking(hotel.hotel_id, booking_id, payload.into(), Some(user.id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(booking)))
}

#[utoipa::path(
    delete,
    path = "/api/hotels/{hotelId}/bookings/{bookingId}",
    tag = "Bookings",
    params(
        ("hotelId" = Uuid, Path, description = "ID do hotel"),
        ("bookingId" = Uuid, Path, description = "ID da reserva")
    ),
    responses((status = 204, description = "Reserva removida"), (status = 404, description = "Reserva não encontrada")),
    security(("api_jwt" = []))
)]
pub async fn delete_booking(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    _guard: RequirePermission<PermBookingsWrite>,
    Path((_hotel_id, booking_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .booking_service
        .delete_booking(hotel.hotel_id, booking_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Handlers: ciclo de vida
// ---

#[utoipa::path(
    post,
    path = "/api/hotels/{hotelId}/bookings/{bookingId}/check-in",
    tag = "Bookings",
    params(
        ("hotelId" = Uuid, Path, description = "ID do hotel"),
        ("bookingId" = Uuid, Path, description = "ID da reserva")
    ),
    request_body = CheckInPayload,
    responses(
        (status = 200, body = Booking),
        (status = 400, description = "Quarto indisponível, de outro tipo ou não limpo"),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn check_in(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    hotel: HotelContext,
    _guard: RequirePermission<PermBookingsWrite>,
    Path((_hotel_id, booking_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CheckInPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = app_state
        .booking_service
        .check_in(hotel.hotel_id, booking_id, payload.room_id, Some(user.id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(booking)))
}

#[utoipa::path(
    post,
    path = "/api/hotels/{hotelId}/bookings/{bookingId}/check-out",
    tag = "Bookings",
    params(
        ("hotelId" = Uuid, Path, description = "ID do hotel"),
        ("bookingId" = Uuid, Path, description = "ID da reserva")
    ),
    responses((status = 200, body = Booking), (status = 409, description = "Transição inválida")),
    security(("api_jwt" = []))
)]
pub async fn check_out(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    hotel: HotelContext,
    _guard: RequirePermission<PermBookingsWrite>,
    Path((_hotel_id, booking_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = app_state
        .booking_service
        .check_out(hotel.hotel_id, booking_id, Some(user.id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(booking)))
}

#[utoipa::path(
    post,
    path = "/api/hotels/{hotelId}/bookings/{bookingId}/cancel",
    tag = "Bookings",
    params(
        ("hotelId" = Uuid, Path, description = "ID do hotel"),
        ("bookingId" = Uuid, Path, description = "ID da reserva")
    ),
    request_body = CancelBookingPayload,
    responses((status = 200, body = Booking), (status = 409, description = "Transição inválida")),
    security(("api_jwt" = []))
)]
pub async fn cancel_booking(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    hotel: HotelContext,
    _guard: RequirePermission<PermBookingsWrite>,
    Path((_hotel_id, booking_id)): Path<(Uuid, Uuid)>,
    payload: Option<Json<CancelBookingPayload>>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.unwrap_or_default();

    let booking = app_state
        .booking_service
        .cancel(hotel.hotel_id, booking_id, payload.reason.as_deref(), Some(user.id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(booking)))
}

#[utoipa::path(
    post,
    path = "/api/hotels/{hotelId}/bookings/{bookingId}/no-show",
    tag = "Bookings",
    params(
        ("hotelId" = Uuid, Path, description = "ID do hotel"),
        ("bookingId" = Uuid, Path, description = "ID da reserva")
    ),
    responses((status = 200, body = Booking), (status = 409, description = "Transição inválida")),
    security(("api_jwt" = []))
)]
pub async fn mark_no_show(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    hotel: HotelContext,
    _guard: RequirePermission<PermBookingsWrite>,
    Path((_hotel_id, booking_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = app_state
        .booking_service
        .mark_no_show(hotel.hotel_id, booking_id, Some(user.id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(booking)))
}

#[utoipa::path(
    get,
    path = "/api/hotels/{hotelId}/bookings/{bookingId}/activities",
    tag = "Bookings",
    params(
        ("hotelId" = Uuid, Path, description = "ID do hotel"),
        ("bookingId" = Uuid, Path, description = "ID da reserva")
    ),
    responses((status = 200, body = [BookingActivity])),
    security(("api_jwt" = []))
)]
pub async fn list_activities(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    Path((_hotel_id, booking_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let activities = app_state
        .booking_service
        .list_activities(hotel.hotel_id, booking_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(activities)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "roomTypeId": "6f1c2a1e-6f0b-4c4e-9b59-0d1f5b0b2a11",
        "checkInDate": "2024-06-01T12:00:00Z",
        "checkOutDate": "2024-06-03T11:00:00Z",
        "guestName": "Ananya Rao",
        "guestPhone": "+91 98123 45678",
        "adults": 2
    }"#;

    #[test]
    fn create_payload_defaults() {
        let payload: CreateBookingPayload = serde_json::from_str(VALID).unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.children, 0);
        assert!(payload.source.is_none());
    }

    #[test]
    fn check_out_must_follow_check_in() {
        let json = VALID.replace("2024-06-03T11:00:00Z", "2024-06-01T12:00:00Z");
        let payload: CreateBookingPayload = serde_json::from_str(&json).unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.errors().contains_key("__all__"));
    }

    #[test]
    fn patch_with_single_date_is_left_to_the_service() {
        let payload: UpdateBookingPayload =
            serde_json::from_str(r#"{"checkOutDate":"2024-06-05T11:00:00Z"}"#).unwrap();
        assert!(payload.validate().is_ok());
        let patch: BookingPatch = payload.into();
        assert!(patch.check_in_date.is_none());
        assert!(patch.check_out_date.is_some());
    }

    #[test]
    fn channel_payload_requires_reference() {
        let json = VALID.replacen('{', r#"{"channel":"booking.com","externalRef":"","#, 1);
        let payload: ChannelBookingPayload = serde_json::from_str(&json).unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("external_ref"));
    }
}
