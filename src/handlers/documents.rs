// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{i18n::Locale, tenancy::HotelContext},
};

// Fatura do folio em PDF (com QR de pagamento UPI quando houver saldo)
#[utoipa::path(
    get,
    path = "/api/hotels/{hotelId}/bookings/{bookingId}/invoice",
    tag = "Folio",
    params(
        ("hotelId" = Uuid, Path, description = "ID do hotel"),
        ("bookingId" = Uuid, Path, description = "ID da reserva")
    ),
    responses(
        (status = 200, description = "PDF da fatura", content_type = "application/pdf"),
        (status = 404, description = "Reserva ou folio não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn generate_invoice_pdf(
    State(app_state): State<AppState>,
    locale: Locale,
    hotel: HotelContext,
    Path((_hotel_id, booking_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, ApiError> {
    let pdf_bytes = app_state
        .document_service
        .generate_invoice_pdf(hotel.hotel_id, booking_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    // Configura os Headers para o navegador baixar ou mostrar o PDF
    let disposition = format!("attachment; filename=\"fatura_{}.pdf\"", booking_id);
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, pdf_bytes).into_response())
}
