// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, tenancy::HotelContext},
};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

/// 2. O Extractor (Guardião): o cargo do usuário no hotel precisa conceder a permissão
pub struct RequirePermission<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let Ok(locale) = Locale::from_request_parts(parts, state).await;

        // A. Contexto do hotel (colocado pelo hotel_guard)
        let hotel = HotelContext::from_request_parts(parts, state).await?;

        // B. Cargo x permissão
        let required = T::slug();
        if !hotel.role.grants(required) {
            tracing::debug!(role = ?hotel.role, permission = required, "Permissão negada");
            return Err(AppError::Forbidden(required.into()).to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

macro_rules! permission {
    ($name:ident, $slug:literal) => {
        pub struct $name;
        impl PermissionDef for $name {
            fn slug() -> &'static str {
                $slug
            }
        }
    };
}

permission!(PermHotelManage, "hotel:manage");
permission!(PermMembersManage, "members:manage");
permission!(PermRoomsWrite, "rooms:write");
permission!(PermRoomsStatus, "rooms:status");
permission!(PermBookingsWrite, "bookings:write");
permission!(PermGuestsWrite, "guests:write");
permission!(PermFolioWrite, "folio:write");
permission!(PermPaymentsWrite, "payments:write");
permission!(PermPaymentsRefund, "payments:refund");
permission!(PermInventoryWrite, "inventory:write");
permission!(PermMessagesSend, "messages:send");
permission!(PermWebsiteWrite, "website:write");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::hotel::MemberRole;

    #[test]
    fn slugs_match_role_grants() {
        assert!(MemberRole::FrontDesk.grants(PermBookingsWrite::slug()));
        assert!(!MemberRole::FrontDesk.grants(PermPaymentsRefund::slug()));
        assert!(MemberRole::Housekeeping.grants(PermRoomsStatus::slug()));
        assert!(!MemberRole::Housekeeping.grants(PermRoomsWrite::slug()));
        assert!(!MemberRole::Manager.grants(PermMembersManage::slug()));
        assert!(MemberRole::Owner.grants(PermWebsiteWrite::slug()));
    }
}
