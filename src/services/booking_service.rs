// src/services/booking_service.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BookingFilter, BookingRepository, FolioRepository, GuestRepository, NewBooking, RoomRepository},
    models::{
        availability::StayPeriod,
        booking::{Booking, BookingActivity, BookingEvent, BookingSource, BookingStatus},
        folio::ChargeType,
        guest::{normalize_phone, Guest},
        room::{RoomStatus, RoomType},
    },
    services::{
        availability_service::AvailabilityService,
        folio_service::FolioService,
        messaging_service::{MessagingService, BOOKING_CONFIRMED_TEMPLATE},
    },
};

/// Hóspede informado junto com a reserva (deduplicado pelo telefone).
#[derive(Debug, Clone)]
pub struct GuestDetails<'a> {
    pub full_name: &'a str,
    pub phone: &'a str,
    pub email: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct BookingRequest<'a> {
    pub room_type_id: Uuid,
    pub stay: StayPeriod,
    pub guest: GuestDetails<'a>,
    pub adults: i32,
    pub children: i32,
    /// Sem valor, usa diárias x preço base do tipo.
    pub total_amount: Option<Decimal>,
    pub source: BookingSource,
    pub channel: Option<&'a str>,
    pub external_ref: Option<&'a str>,
    pub notes: Option<&'a str>,
}

/// Campos editáveis. O status nunca é editado por aqui.
#[derive(Debug, Clone, Default)]
pub struct BookingPatch {
    pub notes: Option<String>,
    pub adults: Option<i32>,
    pub children: Option<i32>,
    pub total_amount: Option<Decimal>,
    pub check_in_date: Option<DateTime<Utc>>,
    pub check_out_date: Option<DateTime<Utc>>,
}

impl BookingPatch {
    fn changes_dates(&self) -> bool {
        self.check_in_date.is_some() || self.check_out_date.is_some()
    }

    /// Novo valor da hospedagem, quando a edição mexe no preço.
    /// Valor explícito prevalece; só datas novas recalculam diárias x preço base.
    fn repriced_total(&self, room_type: &RoomType, stay: &StayPeriod) -> Option<Decimal> {
        self.total_amount
            .or_else(|| self.changes_dates().then(|| default_total(room_type, stay)))
    }
}

fn stay_charge_description(room_type: &RoomType, stay: &StayPeriod) -> String {
    format!("{} - {} diária(s)", room_type.name, stay.nights())
}

/// Valor padrão da hospedagem: diárias x preço base.
pub fn default_total(room_type: &RoomType, stay: &StayPeriod) -> Decimal {
    room_type.base_price * Decimal::from(stay.nights())
}

fn ensure_occupancy(room_type: &RoomType, adults: i32, children: i32) -> Result<(), AppError> {
    if adults < 1 || children < 0 {
        return Err(AppError::InvalidInput("adults".into()));
    }
    if adults + children > room_type.max_occupancy {
        return Err(AppError::OccupancyExceeded { max: room_type.max_occupancy });
    }
    Ok(())
}

#[derive(Clone)]
pub struct BookingService {
    booking_repo: BookingRepository,
    room_repo: RoomRepository,
    guest_repo: GuestRepository,
    folio_repo: FolioRepository,
    availability: AvailabilityService,
    folio_service: FolioService,
    messaging: MessagingService,
    pool: PgPool,
}

impl BookingService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        booking_repo: BookingRepository,
        room_repo: RoomRepository,
        guest_repo: GuestRepository,
        folio_repo: FolioRepository,
        availability: AvailabilityService,
        folio_service: FolioService,
        messaging: MessagingService,
        pool: PgPool,
    ) -> Self {
        Self {
            booking_repo,
            room_repo,
            guest_repo,
            folio_repo,
            availability,
            folio_service,
            messaging,
            pool,
        }
    }

    // ---
    // Criação
    // ---

    pub async fn create_booking(
        &self,
        hotel_id: Uuid,
        request: &BookingRequest<'_>,
        created_by: Option<Uuid>,
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await?;
        let (booking, guest, room_type) = self.create_in_tx(&mut tx, hotel_id, request, created_by).await?;
        tx.commit().await?;

        tracing::info!(
            booking_id = %booking.id,
            room_type = %room_type.name,
            source = ?booking.source,
            "📅 Reserva criada"
        );

        self.notify_confirmation(&booking, &guest, &room_type).await;
        Ok(booking)
    }

    /// Reserva vinda de um canal (OTA). Idempotente por (canal, referência externa):
    /// repetir a mesma referência devolve a reserva existente e `false`.
    pub async fn ingest_channel_booking(
        &self,
        hotel_id: Uuid,
        request: &BookingRequest<'_>,
    ) -> Result<(Booking, bool), AppError> {
        let (Some(channel), Some(external_ref)) = (request.channel, request.external_ref) else {
            return Err(AppError::InvalidInput("externalRef".into()));
        };

        if let Some(existing) = self
            .booking_repo
            .find_by_external_ref(&self.pool, hotel_id, channel, external_ref)
            .await?
        {
            return Ok((existing, false));
        }

        match self.create_booking(hotel_id, request, None).await {
            Ok(booking) => Ok((booking, true)),
            // Outra entrega da mesma reserva venceu a corrida.
            Err(AppError::UniqueConstraintViolation(_)) => {
                let existing = self
                    .booking_repo
                    .find_by_external_ref(&self.pool, hotel_id, channel, external_ref)
                    .await?
                    .ok_or_else(|| AppError::ResourceNotFound("booking".into()))?;
                Ok((existing, false))
            }
            Err(e) => Err(e),
        }
    }

    async fn create_in_tx(
        &self,
        conn: &mut PgConnection,
        hotel_id: Uuid,
        request: &BookingRequest<'_>,
        created_by: Option<Uuid>,
    ) -> Result<(Booking, Guest, RoomType), AppError> {
        // 1. Trava o tipo de quarto (serializa reservas concorrentes do mesmo tipo)
        let room_type = self
            .room_repo
            .lock_room_type(&mut *conn, hotel_id, request.room_type_id)
            .await?;
        ensure_occupancy(&room_type, request.adults, request.children)?;

        // 2. Disponibilidade
        self.availability
            .ensure_type_available(&mut *conn, &room_type, &request.stay, None)
            .await?;

        // 3. Hóspede (find-or-create pelo telefone)
        let phone = normalize_phone(request.guest.phone);
        if phone.trim_start_matches('+').is_empty() {
            return Err(AppError::InvalidInput("phone".into()));
        }
        let guest = self
            .guest_repo
            .upsert_by_phone(&mut *conn, hotel_id, request.guest.full_name.trim(), &phone, request.guest.email)
            .await?;

        // 4. Reserva
        let total_amount = request
            .total_amount
            .unwrap_or_else(|| default_total(&room_type, &request.stay));
        if total_amount < Decimal::ZERO {
            return Err(AppError::InvalidInput("totalAmount".into()));
        }

        let booking = self
            .booking_repo
            .create(
                &mut *conn,
                &NewBooking {
                    hotel_id,
                    guest_id: guest.id,
                    room_type_id: room_type.id,
                    stay: request.stay,
                    kyc_status: guest.kyc_status,
                    total_amount,
                    adults: request.adults,
                    children: request.children,
                    source: request.source,
                    channel: request.channel,
                    external_ref: request.external_ref,
                    notes: request.notes,
                    created_by,
                },
            )
            .await?;

        // 5. Folio com a diária lançada
        let folio = self.folio_repo.create(&mut *conn, hotel_id, booking.id).await?;
        let description = stay_charge_description(&room_type, &request.stay);
        self.folio_repo
            .add_charge(&mut *conn, folio.id, ChargeType::Room, &description, total_amount, 1, false)
            .await?;
        self.folio_service.recompute(&mut *conn, &folio).await?;

        // 6. Histórico
        self.booking_repo
            .add_activity(&mut *conn, booking.id, "CREATED", Some(&format!("{:?}", booking.source)), created_by)
            .await?;

        // paymentStatus/paidAmount foram sincronizados pelo recompute
        let booking = self.booking_repo.lock_by_id(&mut *conn, hotel_id, booking.id).await?;
        Ok((booking, guest, room_type))
    }

    async fn notify_confirmation(&self, booking: &Booking, guest: &Guest, room_type: &RoomType) {
        let vars: HashMap<String, String> = [
            ("guestName", guest.full_name.clone()),
            ("bookingId", booking.id.to_string()),
            ("roomType", room_type.name.clone()),
            ("checkIn", booking.check_in_date.format("%Y-%m-%d").to_string()),
            ("checkOut", booking.check_out_date.format("%Y-%m-%d").to_string()),
            ("totalAmount", booking.total_amount.to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        if let Err(e) = self
            .messaging
            .notify_guest(booking.hotel_id, BOOKING_CONFIRMED_TEMPLATE, guest, &vars)
            .await
        {
            tracing::warn!("Confirmação da reserva {} não enviada: {}", booking.id, e);
        }
    }

    // ---
    // Ciclo de vida
    // ---

    pub async fn check_in(
        &self,
        hotel_id: Uuid,
        booking_id: Uuid,
        room_id: Uuid,
        performed_by: Option<Uuid>,
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. Travas: reserva e depois quarto
        let booking = self.booking_repo.lock_by_id(&mut *tx, hotel_id, booking_id).await?;
        booking.status.apply(BookingEvent::CheckIn)?;
        let room = self.room_repo.lock_room(&mut *tx, hotel_id, room_id).await?;

        // 2. Quarto compatível, livre e limpo
        let stay = StayPeriod {
            start: booking.check_in_date,
            end: booking.check_out_date,
        };
        let overlapping = self
            .availability
            .room_overlaps(&mut tx, &room, &stay, Some(booking.id))
            .await?;
        room.ensure_assignable(booking.room_type_id, overlapping)?;

        // 3. Efetiva
        let updated = self
            .booking_repo
            .mark_checked_in(&mut *tx, booking.id, room.id, Utc::now())
            .await?;
        self.room_repo.set_status(&mut *tx, room.id, RoomStatus::Occupied).await?;
        self.booking_repo
            .add_activity(
                &mut *tx,
                booking.id,
                BookingEvent::CheckIn.activity_action(),
                Some(&format!("Quarto {}", room.number)),
                performed_by,
            )
            .await?;

        tx.commit().await?;

        tracing::info!("🛎️ Check-in da reserva {} no quarto {}", booking.id, room.number);
        Ok(updated)
    }

    pub async fn check_out(&self, hotel_id: Uuid, booking_id: Uuid, performed_by: Option<Uuid>) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await?;

        let booking = self.booking_repo.lock_by_id(&mut *tx, hotel_id, booking_id).await?;
        booking.status.apply(BookingEvent::CheckOut)?;

        let updated = self.booking_repo.mark_checked_out(&mut *tx, booking.id, Utc::now()).await?;

        // O quarto vai para a governança
        if let Some(room_id) = booking.room_id {
            self.room_repo.lock_room(&mut *tx, hotel_id, room_id).await?;
            self.room_repo.set_status(&mut *tx, room_id, RoomStatus::Dirty).await?;
        }

        self.booking_repo
            .add_activity(&mut *tx, booking.id, BookingEvent::CheckOut.activity_action(), None, performed_by)
            .await?;

        tx.commit().await?;

        tracing::info!("🧳 Check-out da reserva {}", booking.id);
        Ok(updated)
    }

    pub async fn cancel(
        &self,
        hotel_id: Uuid,
        booking_id: Uuid,
        reason: Option<&str>,
        performed_by: Option<Uuid>,
    ) -> Result<Booking, AppError> {
        self.transition(hotel_id, booking_id, BookingEvent::Cancel, reason, performed_by)
            .await
    }

    pub async fn mark_no_show(&self, hotel_id: Uuid, booking_id: Uuid, performed_by: Option<Uuid>) -> Result<Booking, AppError> {
        self.transition(hotel_id, booking_id, BookingEvent::NoShow, None, performed_by)
            .await
    }

    // Transições que só mudam o status.
    async fn transition(
        &self,
        hotel_id: Uuid,
        booking_id: Uuid,
        event: BookingEvent,
        description: Option<&str>,
        performed_by: Option<Uuid>,
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await?;

        let booking = self.booking_repo.lock_by_id(&mut *tx, hotel_id, booking_id).await?;
        let next = booking.status.apply(event)?;

        let updated = self.booking_repo.set_status(&mut *tx, booking.id, next).await?;
        self.booking_repo
            .add_activity(&mut *tx, booking.id, event.activity_action(), description, performed_by)
            .await?;

        tx.commit().await?;

        tracing::info!("Reserva {}: {} -> {}", booking.id, booking.status, next);
        Ok(updated)
    }

    // ---
    // Edição / remoção
    // ---

    pub async fn update_booking(
        &self,
        hotel_id: Uuid,
        booking_id: Uuid,
        patch: BookingPatch,
        performed_by: Option<Uuid>,
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut booking = self.booking_repo.lock_by_id(&mut *tx, hotel_id, booking_id).await?;
        let room_type = self
            .room_repo
            .lock_room_type(&mut *tx, hotel_id, booking.room_type_id)
            .await?;

        // 1. Datas: só enquanto CONFIRMED, e revalidando a disponibilidade sem contar a própria reserva
        let mut stay = StayPeriod {
            start: booking.check_in_date,
            end: booking.check_out_date,
        };
        if patch.changes_dates() {
            if booking.status != BookingStatus::Confirmed {
                return Err(AppError::InvalidTransition {
                    entity: "booking",
                    from: booking.status.to_string(),
                    to: "RESCHEDULED".into(),
                });
            }

            stay = StayPeriod::new(
                patch.check_in_date.unwrap_or(booking.check_in_date),
                patch.check_out_date.unwrap_or(booking.check_out_date),
            )
            .ok_or_else(|| AppError::InvalidInput("checkOutDate".into()))?;

            self.availability
                .ensure_type_available(&mut tx, &room_type, &stay, Some(booking.id))
                .await?;

            booking.check_in_date = stay.start;
            booking.check_out_date = stay.end;
        }

        // 2. Ocupação
        if patch.adults.is_some() || patch.children.is_some() {
            let adults = patch.adults.unwrap_or(booking.adults);
            let children = patch.children.unwrap_or(booking.children);
            ensure_occupancy(&room_type, adults, children)?;
            booking.adults = adults;
            booking.children = children;
        }

        // 3. Valor
        let repriced = patch.repriced_total(&room_type, &stay);
        if let Some(total) = repriced {
            if total < Decimal::ZERO {
                return Err(AppError::InvalidInput("totalAmount".into()));
            }
            booking.total_amount = total;
        }
        if patch.notes.is_some() {
            booking.notes = patch.notes;
        }

        self.booking_repo.update_details(&mut *tx, &booking).await?;

        // 4. A diária do folio acompanha o valor da reserva
        if let Some(total) = repriced {
            let folio = self.folio_repo.lock_by_booking(&mut *tx, hotel_id, booking.id).await?;
            folio.ensure_open()?;

            let description = stay_charge_description(&room_type, &stay);
            let updated_rows = self
                .folio_repo
                .update_stay_charge(&mut *tx, folio.id, &description, total)
                .await?;
            if updated_rows == 0 {
                self.folio_repo
                    .add_charge(&mut *tx, folio.id, ChargeType::Room, &description, total, 1, false)
                    .await?;
            }
            self.folio_service.recompute(&mut tx, &folio).await?;
        }

        self.booking_repo
            .add_activity(&mut *tx, booking.id, "UPDATED", None, performed_by)
            .await?;

        // paymentStatus/paidAmount podem ter mudado com o recompute
        let updated = self.booking_repo.lock_by_id(&mut *tx, hotel_id, booking.id).await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete_booking(&self, hotel_id: Uuid, booking_id: Uuid) -> Result<(), AppError> {
        let rows = self.booking_repo.delete(&self.pool, hotel_id, booking_id).await?;
        if rows == 0 {
            return Err(AppError::ResourceNotFound("booking".into()));
        }
        tracing::warn!("🗑️ Reserva {} removida", booking_id);
        Ok(())
    }

    // ---
    // Leitura
    // ---

    pub async fn list_bookings(&self, hotel_id: Uuid, filter: &BookingFilter) -> Result<Vec<Booking>, AppError> {
        self.booking_repo.list(hotel_id, filter).await
    }

    pub async fn get_booking(&self, hotel_id: Uuid, booking_id: Uuid) -> Result<Booking, AppError> {
        self.booking_repo
            .find_by_id(hotel_id, booking_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("booking".into()))
    }

    pub async fn list_activities(&self, hotel_id: Uuid, booking_id: Uuid) -> Result<Vec<BookingActivity>, AppError> {
        let booking = self.get_booking(hotel_id, booking_id).await?;
        self.booking_repo.list_activities(booking.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use chrono::NaiveDate;

    fn deluxe(max_occupancy: i32) -> RoomType {
        RoomType {
            id: Uuid::new_v4(),
            hotel_id: Uuid::new_v4(),
            name: "Deluxe".into(),
            description: None,
            base_price: Decimal::new(450000, 2),
            currency: "INR".into(),
            max_occupancy,
            amenities: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn default_total_is_nights_times_base_price() {
        let stay = StayPeriod::from_dates(date(10), date(12)).unwrap();
        assert_eq!(default_total(&deluxe(2), &stay), Decimal::new(900000, 2));
    }

    #[test]
    fn occupancy_counts_adults_and_children() {
        let room_type = deluxe(3);
        assert!(ensure_occupancy(&room_type, 2, 1).is_ok());
        assert!(matches!(
            ensure_occupancy(&room_type, 2, 2),
            Err(AppError::OccupancyExceeded { max: 3 })
        ));
        assert!(matches!(ensure_occupancy(&room_type, 0, 1), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn new_dates_reprice_the_stay_at_base_price() {
        let room_type = deluxe(2);
        let stay = StayPeriod::from_dates(date(1), date(6)).unwrap();
        let patch = BookingPatch {
            check_out_date: Some(stay.end),
            ..Default::default()
        };
        assert_eq!(patch.repriced_total(&room_type, &stay), Some(Decimal::new(2250000, 2)));
    }

    #[test]
    fn explicit_total_wins_over_recalculated_nights() {
        let room_type = deluxe(2);
        let stay = StayPeriod::from_dates(date(1), date(6)).unwrap();
        let patch = BookingPatch {
            total_amount: Some(Decimal::new(5000, 0)),
            check_out_date: Some(stay.end),
            ..Default::default()
        };
        assert_eq!(patch.repriced_total(&room_type, &stay), Some(Decimal::new(5000, 0)));
    }

    #[test]
    fn notes_only_patch_keeps_the_price() {
        let stay = StayPeriod::from_dates(date(1), date(3)).unwrap();
        let patch = BookingPatch { notes: Some("Late arrival".into()), ..Default::default() };
        assert_eq!(patch.repriced_total(&deluxe(2), &stay), None);
    }

    // --- Contra o banco (TEST_DATABASE_URL) ---

    fn request<'a>(room_type_id: Uuid, stay: StayPeriod, full_name: &'a str, phone: &'a str) -> BookingRequest<'a> {
        BookingRequest {
            room_type_id,
            stay,
            guest: GuestDetails { full_name, phone, email: None },
            adults: 2,
            children: 0,
            total_amount: None,
            source: BookingSource::Direct,
            channel: None,
            external_ref: None,
            notes: None,
        }
    }

    fn june(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2031, 6, d).unwrap()
    }

    #[tokio::test]
    async fn returning_phone_reuses_the_guest_without_renaming() {
        let Some(state) = test_support::test_state().await else { return };
        let owner = test_support::create_user(&state, "Owner").await;
        let hotel = test_support::create_hotel(&state, &owner, None).await;
        let (room_type, _) = test_support::create_deluxe_with_room(&state, hotel.id, Decimal::new(1000, 0)).await;

        let first = state
            .booking_service
            .create_booking(
                hotel.id,
                &request(room_type.id, StayPeriod::from_dates(june(1), june(2)).unwrap(), "Asha Rao", "+91 98765 43210"),
                Some(owner.id),
            )
            .await
            .unwrap();
        let second = state
            .booking_service
            .create_booking(
                hotel.id,
                &request(room_type.id, StayPeriod::from_dates(june(3), june(4)).unwrap(), "Someone Else", "+91 98765 43210"),
                Some(owner.id),
            )
            .await
            .unwrap();

        assert_eq!(first.guest_id, second.guest_id);
        let guest = state.guest_service.get(hotel.id, first.guest_id).await.unwrap();
        assert_eq!(guest.full_name, "Asha Rao");
    }

    #[tokio::test]
    async fn longer_stay_with_new_total_reprices_the_folio() {
        let Some(state) = test_support::test_state().await else { return };
        let owner = test_support::create_user(&state, "Owner").await;
        let hotel = test_support::create_hotel(&state, &owner, None).await;
        let (room_type, _) = test_support::create_deluxe_with_room(&state, hotel.id, Decimal::new(1000, 0)).await;

        let booking = state
            .booking_service
            .create_booking(
                hotel.id,
                &request(room_type.id, StayPeriod::from_dates(june(1), june(3)).unwrap(), "Asha Rao", "+919876500001"),
                Some(owner.id),
            )
            .await
            .unwrap();
        assert_eq!(booking.total_amount, Decimal::new(2000, 0));

        let patch = BookingPatch {
            check_out_date: StayPeriod::from_dates(june(1), june(6)).map(|s| s.end),
            total_amount: Some(Decimal::new(5000, 0)),
            ..Default::default()
        };
        let updated = state
            .booking_service
            .update_booking(hotel.id, booking.id, patch, Some(owner.id))
            .await
            .unwrap();
        assert_eq!(updated.total_amount, Decimal::new(5000, 0));

        let detail = state.folio_service.get_detail(hotel.id, booking.id).await.unwrap();
        assert_eq!(detail.folio.total_charges, Decimal::new(5000, 0));
        assert_eq!(detail.folio.balance, Decimal::new(5000, 0));
        assert_eq!(detail.charges.len(), 1);
    }

    #[test]
    fn patch_without_dates_does_not_reschedule() {
        let patch = BookingPatch { notes: Some("Late arrival".into()), ..Default::default() };
        assert!(!patch.changes_dates());
        let patch = BookingPatch { check_out_date: Some(Utc::now()), ..Default::default() };
        assert!(patch.changes_dates());
    }
}
