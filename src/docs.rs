// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Hotels ---
        handlers::hotels::list_my_hotels,
        handlers::hotels::create_hotel,
        handlers::hotels::get_hotel,
        handlers::hotels::update_hotel,
        handlers::hotels::submit_hotel,
        handlers::hotels::list_documents,
        handlers::hotels::upsert_document,
        handlers::hotels::list_members,
        handlers::hotels::add_member,

        // --- Rooms ---
        handlers::rooms::list_floors,
        handlers::rooms::create_floor,
        handlers::rooms::list_room_types,
        handlers::rooms::create_room_type,
        handlers::rooms::list_rooms,
        handlers::rooms::create_room,
        handlers::rooms::update_room_status,
        handlers::rooms::check_availability,

        // --- Bookings ---
        handlers::bookings::list_bookings,
        handlers::bookings::create_booking,
        handlers::bookings::ingest_channel_booking,
        handlers::bookings::get_booking,
        handlers::bookings::update_booking,
        handlers::bookings::delete_booking,
        handlers::bookings::check_in,
        handlers::bookings::check_out,
        handlers::bookings::cancel_booking,
        handlers::bookings::mark_no_show,
        handlers::bookings::list_activities,

        // --- Folio ---
        handlers::folio::get_folio,
        handlers::folio::settle_folio,
        handlers::documents::generate_invoice_pdf,

        // --- Payments ---
        handlers::payments::create_order,
        handlers::payments::capture_payment,
        handlers::payments::refund_payment,
        handlers::payments::add_charge,
        handlers::payments::record_payment,
        handlers::payments::payment_webhook,

        // --- Guests ---
        handlers::guests::list_guests,
        handlers::guests::create_guest,
        handlers::guests::get_guest,
        handlers::guests::submit_kyc,
        handlers::guests::review_kyc,

        // --- Inventory ---
        handlers::inventory::list_items,
        handlers::inventory::create_item,
        handlers::inventory::list_low_stock,
        handlers::inventory::list_transactions,
        handlers::inventory::create_transaction,

        // --- Messaging ---
        handlers::messaging::list_templates,
        handlers::messaging::create_template,
        handlers::messaging::send_message,

        // --- Website ---
        handlers::website::get_website,
        handlers::website::put_website,
        handlers::website::get_public_website,

        // --- Admin ---
        handlers::admin::list_brands,
        handlers::admin::create_brand,
        handlers::admin::get_brand,
        handlers::admin::update_brand,
        handlers::admin::delete_brand,
        handlers::admin::list_hotels,
        handlers::admin::list_hotel_documents,
        handlers::admin::review_document,
        handlers::admin::approve_hotel,
        handlers::admin::reject_hotel,
        handlers::admin::suspend_hotel,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Hotels / Brands ---
            models::hotel::HotelStatus,
            models::hotel::OnboardingStatus,
            models::hotel::VerificationStatus,
            models::hotel::MemberRole,
            models::hotel::Hotel,
            models::hotel::HotelMember,
            models::hotel::HotelDocument,
            models::brand::BrandPlan,
            models::brand::Brand,

            // --- Rooms ---
            models::room::RoomStatus,
            models::room::Floor,
            models::room::RoomType,
            models::room::Room,
            models::availability::AvailabilityReport,

            // --- Bookings ---
            models::booking::BookingStatus,
            models::booking::BookingPaymentStatus,
            models::booking::BookingSource,
            models::booking::Booking,
            models::booking::BookingActivity,

            // --- Folio ---
            models::folio::FolioStatus,
            models::folio::ChargeType,
            models::folio::PaymentMethod,
            models::folio::FolioPaymentStatus,
            models::folio::Folio,
            models::folio::Charge,
            models::folio::Payment,
            models::folio::FolioDetail,
            services::payment_gateway::GatewayOrder,
            services::payment_service::CheckoutOrder,

            // --- Guests ---
            models::guest::KycStatus,
            models::guest::Guest,

            // --- Inventory ---
            models::inventory::InventoryTxnType,
            models::inventory::InventoryItem,
            models::inventory::InventoryTransaction,

            // --- Messaging / Website ---
            models::messaging::MessageChannel,
            models::messaging::MessageTemplate,
            models::messaging::OutboundMessage,
            models::website::WebsiteConfig,

            // --- Payloads ---
            handlers::hotels::CreateHotelPayload,
            handlers::hotels::UpdateHotelPayload,
            handlers::hotels::UpsertDocumentPayload,
            handlers::hotels::AddMemberPayload,
            handlers::rooms::CreateFloorPayload,
            handlers::rooms::CreateRoomTypePayload,
            handlers::rooms::CreateRoomPayload,
            handlers::rooms::UpdateRoomStatusPayload,
            handlers::bookings::CreateBookingPayload,
            handlers::bookings::ChannelBookingPayload,
            handlers::bookings::UpdateBookingPayload,
            handlers::bookings::CheckInPayload,
            handlers::bookings::CancelBookingPayload,
            handlers::payments::CapturePaymentPayload,
            handlers::payments::RefundPaymentPayload,
            handlers::payments::AddChargePayload,
            handlers::payments::RecordPaymentPayload,
            handlers::guests::CreateGuestPayload,
            handlers::guests::SubmitKycPayload,
            handlers::guests::ReviewKycPayload,
            handlers::inventory::CreateItemPayload,
            handlers::inventory::CreateTransactionPayload,
            handlers::messaging::CreateTemplatePayload,
            handlers::messaging::SendMessagePayload,
            handlers::website::UpsertWebsitePayload,
            handlers::admin::CreateBrandPayload,
            handlers::admin::UpdateBrandPayload,
            handlers::admin::ReviewDocumentPayload,
            handlers::admin::ReviewRemarksPayload,
            handlers::admin::RejectHotelPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário"),
        (name = "Hotels", description = "Cadastro do hotel, documentos e equipe"),
        (name = "Rooms", description = "Andares, tipos de quarto, quartos e disponibilidade"),
        (name = "Bookings", description = "Reservas e ciclo de vida da estadia"),
        (name = "Folio", description = "Conta do hóspede e fatura"),
        (name = "Payments", description = "Pagamentos, estornos e webhook do gateway"),
        (name = "Guests", description = "Hóspedes e KYC"),
        (name = "Inventory", description = "Estoque do hotel"),
        (name = "Messaging", description = "Templates e envio de mensagens"),
        (name = "Website", description = "Site público do hotel"),
        (name = "Admin", description = "Console do super admin")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_hotel_scoped_paths_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/hotels/{hotelId}/bookings/{bookingId}/check-in"));
        assert!(doc.paths.paths.contains_key("/api/webhooks/payments"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
