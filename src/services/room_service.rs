// src/services/room_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::RoomRepository,
    models::room::{Floor, Room, RoomStatus, RoomType},
};

#[derive(Clone)]
pub struct RoomService {
    room_repo: RoomRepository,
    pool: PgPool,
}

impl RoomService {
    pub fn new(room_repo: RoomRepository, pool: PgPool) -> Self {
        Self { room_repo, pool }
    }

    // --- ANDARES ---

    pub async fn list_floors(&self, hotel_id: Uuid) -> Result<Vec<Floor>, AppError> {
        self.room_repo.list_floors(hotel_id).await
    }

    pub async fn create_floor(&self, hotel_id: Uuid, number: i32, label: Option<&str>) -> Result<Floor, AppError> {
        self.room_repo.create_floor(&self.pool, hotel_id, number, label).await
    }

    // --- TIPOS DE QUARTO ---

    pub async fn list_room_types(&self, hotel_id: Uuid) -> Result<Vec<RoomType>, AppError> {
        self.room_repo.list_room_types(hotel_id).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_room_type(
        &self,
        hotel_id: Uuid,
        name: &str,
        description: Option<&str>,
        base_price: Decimal,
        currency: &str,
        max_occupancy: i32,
        amenities: &[String],
    ) -> Result<RoomType, AppError> {
        if base_price < Decimal::ZERO {
            return Err(AppError::InvalidInput("basePrice".into()));
        }

        let room_type = self
            .room_repo
            .create_room_type(&self.pool, hotel_id, name, description, base_price, currency, max_occupancy, amenities)
            .await?;

        tracing::info!("🛏️ Tipo de quarto '{}' criado no hotel {}", room_type.name, hotel_id);
        Ok(room_type)
    }

    // --- QUARTOS ---

    pub async fn list_rooms(&self, hotel_id: Uuid, status: Option<RoomStatus>) -> Result<Vec<Room>, AppError> {
        self.room_repo.list_rooms(hotel_id, status).await
    }

    /// Cria o quarto. Andar e tipo precisam ser do mesmo hotel.
    pub async fn create_room(
        &self,
        hotel_id: Uuid,
        floor_id: Uuid,
        room_type_id: Uuid,
        number: &str,
    ) -> Result<Room, AppError> {
        // 1. Valida as referências dentro do hotel
        self.room_repo
            .find_floor(hotel_id, floor_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("floor".into()))?;

        self.room_repo
            .find_room_type(&self.pool, hotel_id, room_type_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("room_type".into()))?;

        // 2. Cria (número duplicado vira 409)
        self.room_repo
            .create_room(&self.pool, hotel_id, floor_id, room_type_id, number)
            .await
    }

    /// Mudança manual de status (governança).
    pub async fn set_status(&self, hotel_id: Uuid, room_id: Uuid, status: RoomStatus) -> Result<Room, AppError> {
        let mut tx = self.pool.begin().await?;

        let room = self.room_repo.lock_room(&mut *tx, hotel_id, room_id).await?;
        if !room.status.can_set_manually(status) {
            return Err(AppError::InvalidTransition {
                entity: "room",
                from: room.status.to_string(),
                to: status.to_string(),
            });
        }

        let updated = self.room_repo.set_status(&mut *tx, room_id, status).await?;
        tx.commit().await?;

        tracing::info!("🧹 Quarto {} agora {}", updated.number, updated.status);
        Ok(updated)
    }
}
