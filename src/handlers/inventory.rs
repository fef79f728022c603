// src/handlers/inventory.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Importa os nossos extratores e erros
use crate::{
    common::{
        error::{ApiError, AppError},
        validation::{validate_not_negative, validate_positive},
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermInventoryWrite, RequirePermission},
        tenancy::HotelContext,
    },
    models::inventory::{InventoryItem, InventoryTransaction, InventoryTxnType},
    services::inventory_service::NewItem,
};

// ---
// Payload: CreateItem
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateItemPayload {
    #[validate(length(min = 1, max = 120, message = "required"))]
    #[schema(example = "Bath towel")]
    pub name: String,

    #[validate(length(min = 1, max = 64, message = "required"))]
    #[schema(example = "LIN-TWL-01")]
    pub sku: String,

    pub category: Option<String>,

    #[validate(length(min = 1, max = 16, message = "required"))]
    #[schema(example = "pcs")]
    pub unit: String,

    // Abaixo disto o item aparece em "estoque baixo"
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub reorder_level: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    pub unit_cost: Option<Decimal>,

    // Estoque inicial vira uma movimentação IN
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub initial_quantity: Decimal,
}

// ---
// Payload: movimentação
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTransactionPayload {
    #[serde(rename = "type")]
    pub txn_type: InventoryTxnType,

    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "12")]
    pub quantity: Decimal,

    pub notes: Option<String>,
}

// ---
// Handlers
// ---

#[utoipa::path(
    get,
    path = "/api/hotels/{hotelId}/inventory/items",
    tag = "Inventory",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    responses((status = 200, body = [InventoryItem])),
    security(("api_jwt" = []))
)]
pub async fn list_items(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
) -> Result<impl IntoResponse, ApiError> {
    let items = app_state
        .inventory_service
        .list_items(hotel.hotel_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(items)))
}

#[utoipa::path(
    post,
    path = "/api/hotels/{hotelId}/inventory/items",
    tag = "Inventory",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    request_body = CreateItemPayload,
    responses((status = 201, body = InventoryItem), (status = 409, description = "SKU já cadastrado")),
    security(("api_jwt" = []))
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    hotel: HotelContext,
    _guard: RequirePermission<PermInventoryWrite>,
    Json(payload): Json<CreateItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let new_item = NewItem {
        name: payload.name.trim(),
        sku: payload.sku.trim(),
        category: payload.category.as_deref().map(str::trim),
        unit: payload.unit.trim(),
        reorder_level: payload.reorder_level,
        unit_cost: payload.unit_cost,
        initial_quantity: payload.initial_quantity,
    };

    let item = app_state
        .inventory_service
        .create_item(hotel.hotel_id, &new_item, Some(user.id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    get,
    path = "/api/hotels/{hotelId}/inventory/low-stock",
    tag = "Inventory",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    responses((status = 200, description = "Itens no nível de reposição ou abaixo", body = [InventoryItem])),
    security(("api_jwt" = []))
)]
pub async fn list_low_stock(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
) -> Result<impl IntoResponse, ApiError> {
    let items = app_state
        .inventory_service
        .list_low_stock(hotel.hotel_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(items)))
}

#[utoipa::path(
    get,
    path = "/api/hotels/{hotelId}/inventory/items/{itemId}/transactions",
    tag = "Inventory",
    params(
        ("hotelId" = Uuid, Path, description = "ID do hotel"),
        ("itemId" = Uuid, Path, description = "ID do item")
    ),
    responses((status = 200, body = [InventoryTransaction]), (status = 404, description = "Item não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn list_transactions(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    Path((_hotel_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let txns = app_state
        .inventory_service
        .list_transactions(hotel.hotel_id, item_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(txns)))
}

#[utoipa::path(
    post,
    path = "/api/hotels/{hotelId}/inventory/items/{itemId}/transactions",
    tag = "Inventory",
    params(
        ("hotelId" = Uuid, Path, description = "ID do hotel"),
        ("itemId" = Uuid, Path, description = "ID do item")
    ),
    request_body = CreateTransactionPayload,
    responses(
        (status = 201, body = InventoryTransaction),
        (status = 400, description = "Estoque insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_transaction(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    hotel: HotelContext,
    _guard: RequirePermission<PermInventoryWrite>,
    Path((_hotel_id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CreateTransactionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let txn = app_state
        .inventory_service
        .create_transaction(
            hotel.hotel_id,
            item_id,
            payload.txn_type,
            payload.quantity,
            payload.notes.as_deref(),
            Some(user.id),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(txn)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_payload_uses_type_field() {
        let payload: CreateTransactionPayload =
            serde_json::from_str(r#"{"type":"OUT","quantity":3}"#).unwrap();
        assert_eq!(payload.txn_type, InventoryTxnType::Out);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let payload: CreateTransactionPayload =
            serde_json::from_str(r#"{"type":"IN","quantity":0}"#).unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn item_defaults_to_empty_stock() {
        let payload: CreateItemPayload =
            serde_json::from_str(r#"{"name":"Soap","sku":"BTH-SOAP","unit":"pcs"}"#).unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.initial_quantity, Decimal::ZERO);
    }
}
