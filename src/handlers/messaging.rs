// src/handlers/messaging.rs

use std::collections::HashMap;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermHotelManage, PermMessagesSend, RequirePermission},
        tenancy::HotelContext,
    },
    models::messaging::{MessageChannel, MessageTemplate, OutboundMessage},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTemplatePayload {
    #[validate(length(min = 1, max = 64, message = "required"))]
    #[schema(example = "BOOKING_CONFIRMED")]
    pub code: String,

    pub channel: MessageChannel,

    pub subject: Option<String>,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Olá {{guestName}}, sua reserva está confirmada.")]
    pub body: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SendMessagePayload {
    #[validate(length(min = 1, message = "required"))]
    pub template_code: String,

    // E-mail ou telefone, conforme o canal do template
    #[validate(length(min = 3, max = 254, message = "required"))]
    pub to: String,

    #[serde(default)]
    pub variables: HashMap<String, String>,
}

#[utoipa::path(
    get,
    path = "/api/hotels/{hotelId}/templates",
    tag = "Messaging",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    responses((status = 200, body = [MessageTemplate])),
    security(("api_jwt" = []))
)]
pub async fn list_templates(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
) -> Result<impl IntoResponse, ApiError> {
    let templates = app_state
        .messaging_service
        .list_templates(hotel.hotel_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(templates)))
}

#[utoipa::path(
    post,
    path = "/api/hotels/{hotelId}/templates",
    tag = "Messaging",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    request_body = CreateTemplatePayload,
    responses((status = 201, body = MessageTemplate), (status = 409, description = "Código já usado")),
    security(("api_jwt" = []))
)]
pub async fn create_template(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    _guard: RequirePermission<PermHotelManage>,
    Json(payload): Json<CreateTemplatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let template = app_state
        .messaging_service
        .create_template(
            hotel.hotel_id,
            payload.code.trim(),
            payload.channel,
            payload.subject.as_deref(),
            &payload.body,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(template)))
}

// O envio é assíncrono: a resposta traz a mensagem renderizada
#[utoipa::path(
    post,
    path = "/api/hotels/{hotelId}/messages/send",
    tag = "Messaging",
    params(("hotelId" = Uuid, Path, description = "ID do hotel")),
    request_body = SendMessagePayload,
    responses(
        (status = 202, description = "Mensagem enfileirada", body = OutboundMessage),
        (status = 404, description = "Template não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn send_message(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    _guard: RequirePermission<PermMessagesSend>,
    Json(payload): Json<SendMessagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let message = app_state
        .messaging_service
        .send(hotel.hotel_id, payload.template_code.trim(), payload.to.trim(), &payload.variables)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::ACCEPTED, Json(message)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_payload_variables_default_to_empty() {
        let payload: SendMessagePayload =
            serde_json::from_str(r#"{"templateCode":"WELCOME","to":"guest@example.com"}"#).unwrap();
        assert!(payload.variables.is_empty());
        assert!(payload.validate().is_ok());
    }
}
