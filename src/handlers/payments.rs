// src/handlers/payments.rs

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        validation::{validate_not_negative, validate_positive},
    },
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermFolioWrite, PermPaymentsRefund, PermPaymentsWrite, RequirePermission},
        tenancy::HotelContext,
    },
    models::folio::{ChargeType, FolioDetail, Payment, PaymentMethod},
    services::payment_service::CheckoutOrder,
};

// Header de assinatura enviado pelo gateway nos webhooks
const SIGNATURE_HEADER: &str = "x-razorpay-signature";

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CapturePaymentPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "order_NQ1x2y3z4")]
    pub order_id: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "pay_NQ1a2b3c4")]
    pub gateway_payment_id: String,

    #[validate(length(min = 1, message = "required"))]
    pub signature: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RefundPaymentPayload {
    pub payment_id: Uuid,
    pub reason: Option<String>,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddChargePayload {
    pub charge_type: ChargeType,

    #[validate(length(min = 1, max = 200, message = "required"))]
    #[schema(example = "Room service dinner")]
    pub description: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "850.00")]
    pub amount: Decimal,

    #[validate(range(min = 1, message = "min_one"))]
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RecordPaymentPayload {
    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "400.00")]
    pub amount: Decimal,

    // CASH quando ausente
    pub method: Option<PaymentMethod>,
}

// ---
// Gateway
// ---

#[utoipa::path(
    post,
    path = "/api/hotels/{hotelId}/payments/{bookingId}/order",
    tag = "Payments",
    params(
        ("hotelId" = Uuid, Path, description = "ID do hotel"),
        ("bookingId" = Uuid, Path, description = "ID da reserva")
    ),
    responses(
        (status = 201, description = "Pedido criado no gateway", body = CheckoutOrder),
        (status = 400, description = "Folio sem saldo"),
        (status = 502, description = "Falha no gateway")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    _guard: RequirePermission<PermPaymentsWrite>,
    Path((_hotel_id, booking_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .payment_service
        .create_order(hotel.hotel_id, booking_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    post,
    path = "/api/hotels/{hotelId}/payments/{bookingId}/capture",
    tag = "Payments",
    params(
        ("hotelId" = Uuid, Path, description = "ID do hotel"),
        ("bookingId" = Uuid, Path, description = "ID da reserva")
    ),
    request_body = CapturePaymentPayload,
    responses(
        (status = 200, description = "Pagamento confirmado", body = Payment),
        (status = 400, description = "Assinatura inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn capture_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    _guard: RequirePermission<PermPaymentsWrite>,
    Path((_hotel_id, booking_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CapturePaymentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let payment = app_state
        .payment_service
        .capture(
            hotel.hotel_id,
            booking_id,
            payload.order_id.trim(),
            payload.gateway_payment_id.trim(),
            payload.signature.trim(),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(payment)))
}

#[utoipa::path(
    post,
    path = "/api/hotels/{hotelId}/payments/{bookingId}/refund",
    tag = "Payments",
    params(
        ("hotelId" = Uuid, Path, description = "ID do hotel"),
        ("bookingId" = Uuid, Path, description = "ID da reserva")
    ),
    request_body = RefundPaymentPayload,
    responses(
        (status = 200, description = "Pagamento estornado", body = Payment),
        (status = 409, description = "Pagamento não estornável"),
        (status = 502, description = "Falha no gateway")
    ),
    security(("api_jwt" = []))
)]
pub async fn refund_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    _guard: RequirePermission<PermPaymentsRefund>,
    Path((_hotel_id, booking_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<RefundPaymentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = app_state
        .payment_service
        .refund(hotel.hotel_id, booking_id, payload.payment_id, payload.reason.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(payment)))
}

// ---
// Recepção: lançamentos e pagamentos manuais
// ---

#[utoipa::path(
    post,
    path = "/api/hotels/{hotelId}/payments/{bookingId}/charge",
    tag = "Payments",
    params(
        ("hotelId" = Uuid, Path, description = "ID do hotel"),
        ("bookingId" = Uuid, Path, description = "ID da reserva")
    ),
    request_body = AddChargePayload,
    responses(
        (status = 201, body = FolioDetail),
        (status = 409, description = "Folio fechado")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_charge(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    _guard: RequirePermission<PermFolioWrite>,
    Path((_hotel_id, booking_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<AddChargePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .folio_service
        .add_charge(
            hotel.hotel_id,
            booking_id,
            payload.charge_type,
            payload.description.trim(),
            payload.amount,
            payload.quantity,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    post,
    path = "/api/hotels/{hotelId}/payments/{bookingId}/cash",
    tag = "Payments",
    params(
        ("hotelId" = Uuid, Path, description = "ID do hotel"),
        ("bookingId" = Uuid, Path, description = "ID da reserva")
    ),
    request_body = RecordPaymentPayload,
    responses(
        (status = 201, body = FolioDetail),
        (status = 409, description = "Folio fechado")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    _guard: RequirePermission<PermPaymentsWrite>,
    Path((_hotel_id, booking_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<RecordPaymentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .folio_service
        .record_payment(
            hotel.hotel_id,
            booking_id,
            payload.method.unwrap_or(PaymentMethod::Cash),
            payload.amount,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// ---
// Webhook (sem JWT; autenticado pela assinatura do corpo bruto)
// ---

#[utoipa::path(
    post,
    path = "/api/webhooks/payments",
    tag = "Payments",
    request_body(content = String, content_type = "application/json"),
    params(("X-Razorpay-Signature" = String, Header, description = "hex(HMAC-SHA256(webhook_secret, corpo))")),
    responses(
        (status = 200, description = "Evento processado"),
        (status = 400, description = "Assinatura inválida")
    )
)]
pub async fn payment_webhook(
    State(app_state): State<AppState>,
    locale: Locale,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::SignatureMismatch.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .payment_service
        .handle_webhook(&body, signature)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(json!({ "received": true }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_quantity_defaults_to_one() {
        let payload: AddChargePayload =
            serde_json::from_str(r#"{"chargeType":"MINIBAR","description":"Soda","amount":120}"#).unwrap();
        assert_eq!(payload.quantity, 1);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn manual_payment_must_be_positive() {
        let payload: RecordPaymentPayload = serde_json::from_str(r#"{"amount":0}"#).unwrap();
        assert!(payload.validate().is_err());
        assert!(payload.method.is_none());
    }
}
