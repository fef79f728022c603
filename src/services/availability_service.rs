// src/services/availability_service.rs

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BookingRepository, RoomRepository},
    models::{
        availability::{AvailabilityReport, StayPeriod},
        room::{Room, RoomType},
    },
};

// Verificação de disponibilidade. As funções que recebem `conn` rodam dentro
// da transação do chamador, depois que ele travou a linha do tipo ou do quarto.
#[derive(Clone)]
pub struct AvailabilityService {
    booking_repo: BookingRepository,
    room_repo: RoomRepository,
    pool: PgPool,
}

impl AvailabilityService {
    pub fn new(booking_repo: BookingRepository, room_repo: RoomRepository, pool: PgPool) -> Self {
        Self { booking_repo, room_repo, pool }
    }

    /// Quartos utilizáveis x reservas ativas que conflitam com o período.
    pub async fn type_report(
        &self,
        conn: &mut PgConnection,
        hotel_id: Uuid,
        room_type_id: Uuid,
        stay: &StayPeriod,
        exclude_booking_id: Option<Uuid>,
    ) -> Result<AvailabilityReport, AppError> {
        let total = self.room_repo.count_usable_rooms(&mut *conn, hotel_id, room_type_id).await?;
        let booked = self
            .booking_repo
            .count_overlapping_by_type(&mut *conn, hotel_id, room_type_id, stay, exclude_booking_id)
            .await?;

        Ok(AvailabilityReport::new(room_type_id, total, booked))
    }

    pub async fn ensure_type_available(
        &self,
        conn: &mut PgConnection,
        room_type: &RoomType,
        stay: &StayPeriod,
        exclude_booking_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        let report = self
            .type_report(conn, room_type.hotel_id, room_type.id, stay, exclude_booking_id)
            .await?;

        if !report.is_available {
            tracing::info!(
                room_type = %room_type.name,
                total = report.total_rooms,
                booked = report.booked,
                "Sem disponibilidade"
            );
            return Err(AppError::NoAvailability { room_type: room_type.name.clone() });
        }
        Ok(())
    }

    /// Reservas ativas (fora `exclude_booking_id`) no quarto durante o período.
    pub async fn room_overlaps(
        &self,
        conn: &mut PgConnection,
        room: &Room,
        stay: &StayPeriod,
        exclude_booking_id: Option<Uuid>,
    ) -> Result<i64, AppError> {
        self.booking_repo
            .count_overlapping_by_room(&mut *conn, room.id, stay, exclude_booking_id)
            .await
    }

    /// Consulta somente leitura (`GET /availability`).
    pub async fn check_type_availability(
        &self,
        hotel_id: Uuid,
        room_type_id: Uuid,
        stay: &StayPeriod,
    ) -> Result<AvailabilityReport, AppError> {
        let mut conn = self.pool.acquire().await?;

        self.room_repo
            .find_room_type(&mut *conn, hotel_id, room_type_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("room_type".into()))?;

        self.type_report(&mut *conn, hotel_id, room_type_id, stay, None).await
    }
}
