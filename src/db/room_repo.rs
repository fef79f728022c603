// src/db/room_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::room::{Floor, Room, RoomStatus, RoomType},
};

#[derive(Clone)]
pub struct RoomRepository {
    pool: PgPool,
}

impl RoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Andares
    // ---

    pub async fn list_floors(&self, hotel_id: Uuid) -> Result<Vec<Floor>, AppError> {
        let floors = sqlx::query_as::<_, Floor>("SELECT * FROM floors WHERE hotel_id = $1 ORDER BY number ASC")
            .bind(hotel_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(floors)
    }

    pub async fn find_floor(&self, hotel_id: Uuid, floor_id: Uuid) -> Result<Option<Floor>, AppError> {
        let floor = sqlx::query_as::<_, Floor>("SELECT * FROM floors WHERE id = $1 AND hotel_id = $2")
            .bind(floor_id)
            .bind(hotel_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(floor)
    }

    pub async fn create_floor<'e, E>(
        &self,
        executor: E,
        hotel_id: Uuid,
        number: i32,
        label: Option<&str>,
    ) -> Result<Floor, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Floor>(
            r#"
            INSERT INTO floors (hotel_id, number, label)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(hotel_id)
        .bind(number)
        .bind(label)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "floor"))
    }

    // ---
    // Tipos de quarto
    // ---

    pub async fn list_room_types(&self, hotel_id: Uuid) -> Result<Vec<RoomType>, AppError> {
        let types = sqlx::query_as::<_, RoomType>("SELECT * FROM room_types WHERE hotel_id = $1 ORDER BY name ASC")
            .bind(hotel_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(types)
    }

    pub async fn find_room_type<'e, E>(
        &self,
        executor: E,
        hotel_id: Uuid,
        room_type_id: Uuid,
    ) -> Result<Option<RoomType>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let room_type = sqlx::query_as::<_, RoomType>("SELECT * FROM room_types WHERE id = $1 AND hotel_id = $2")
            .bind(room_type_id)
            .bind(hotel_id)
            .fetch_optional(executor)
            .await?;
        Ok(room_type)
    }

    /// Trava a linha do tipo de quarto. Reservas concorrentes para o mesmo tipo
    /// passam a verificar a disponibilidade uma de cada vez.
    pub async fn lock_room_type<'e, E>(
        &self,
        executor: E,
        hotel_id: Uuid,
        room_type_id: Uuid,
    ) -> Result<RoomType, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, RoomType>("SELECT * FROM room_types WHERE id = $1 AND hotel_id = $2 FOR UPDATE")
            .bind(room_type_id)
            .bind(hotel_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("room_type".into()))
    }

    pub async fn create_room_type<'e, E>(
        &self,
        executor: E,
        hotel_id: Uuid,
        name: &str,
        description: Option<&str>,
        base_price: Decimal,
        currency: &str,
        max_occupancy: i32,
        amenities: &[String],
    ) -> Result<RoomType, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, RoomType>(
            r#"
            INSERT INTO room_types (hotel_id, name, description, base_price, currency, max_occupancy, amenities)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(hotel_id)
        .bind(name)
        .bind(description)
        .bind(base_price)
        .bind(currency)
        .bind(max_occupancy)
        .bind(amenities)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "room_type"))
    }

    // ---
    // Quartos
    // ---

    pub async fn list_rooms(&self, hotel_id: Uuid, status: Option<RoomStatus>) -> Result<Vec<Room>, AppError> {
        let rooms = sqlx::query_as::<_, Room>(
            r#"
            SELECT * FROM rooms
            WHERE hotel_id = $1 AND ($2::room_status IS NULL OR status = $2)
            ORDER BY number ASC
            "#,
        )
        .bind(hotel_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(rooms)
    }

    pub async fn create_room<'e, E>(
        &self,
        executor: E,
        hotel_id: Uuid,
        floor_id: Uuid,
        room_type_id: Uuid,
        number: &str,
    ) -> Result<Room, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Room>(
            r#"
            INSERT INTO rooms (hotel_id, floor_id, room_type_id, number)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(hotel_id)
        .bind(floor_id)
        .bind(room_type_id)
        .bind(number)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "room"))
    }

    pub async fn lock_room<'e, E>(&self, executor: E, hotel_id: Uuid, room_id: Uuid) -> Result<Room, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = $1 AND hotel_id = $2 FOR UPDATE")
            .bind(room_id)
            .bind(hotel_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("room".into()))
    }

    pub async fn set_status<'e, E>(&self, executor: E, room_id: Uuid, status: RoomStatus) -> Result<Room, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let room = sqlx::query_as::<_, Room>(
            "UPDATE rooms SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(room_id)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(room)
    }

    /// Quartos do tipo que contam na capacidade (exclui OUT_OF_ORDER).
    pub async fn count_usable_rooms<'e, E>(
        &self,
        executor: E,
        hotel_id: Uuid,
        room_type_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM rooms
            WHERE hotel_id = $1 AND room_type_id = $2 AND status <> ALL($3)
            "#,
        )
        .bind(hotel_id)
        .bind(room_type_id)
        .bind(&RoomStatus::UNSELLABLE[..])
        .fetch_one(executor)
        .await?;
        Ok(total)
    }
}
