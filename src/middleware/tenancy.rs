// src/middleware/tenancy.rs

use std::collections::HashMap;

use axum::{
    extract::{FromRequestParts, Path, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{
        auth::User,
        hotel::{HotelStatus, MemberRole},
    },
};

// O hotel é identificado pelo segmento `{hotel_id}` da URL.
const HOTEL_PATH_PARAM: &str = "hotel_id";

// Hotel da requisição + cargo do usuário nele.
#[derive(Debug, Clone, Copy)]
pub struct HotelContext {
    pub hotel_id: Uuid,
    pub role: MemberRole,
}

// Resolve o hotel do path e o vínculo do usuário (roda depois do auth_guard).
// Super admins entram em qualquer hotel com acesso de dono.
pub async fn hotel_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(params): Path<HashMap<String, String>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    // 1. Hotel do path
    let hotel_id = params
        .get(HOTEL_PATH_PARAM)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or_else(|| to_api(AppError::InvalidInput("hotelId".into())))?;

    // 2. Usuário autenticado
    let user = request
        .extensions()
        .get::<User>()
        .cloned()
        .ok_or_else(|| to_api(AppError::InvalidToken))?;

    // 3. Hotel existe?
    let hotel = app_state
        .hotel_repo
        .find_by_id(hotel_id)
        .await
        .map_err(to_api)?
        .ok_or_else(|| to_api(AppError::ResourceNotFound("hotel".into())))?;

    // 4. Vínculo
    let role = if user.is_super_admin {
        MemberRole::Owner
    } else {
        if hotel.status == HotelStatus::Suspended {
            return Err(to_api(AppError::HotelSuspended));
        }
        app_state
            .hotel_repo
            .find_member_role(hotel_id, user.id)
            .await
            .map_err(to_api)?
            .ok_or_else(|| to_api(AppError::NotHotelMember))?
    };

    request.extensions_mut().insert(HotelContext { hotel_id, role });
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for HotelContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<HotelContext>()
            .copied()
            .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "invalid_input", "Hotel context not found."))
    }
}
