// src/models/room.rs

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// --- Status do quarto (o único estado mutável compartilhado entre entidades) ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "room_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Clean,
    Dirty,
    Occupied,
    Maintenance,
    OutOfOrder,
}

impl RoomStatus {
    /// Transições manuais (governança). `OCCUPIED` só é atingido pelo check-in
    /// e só sai via check-out (→ DIRTY), então não aparece como destino aqui.
    pub fn can_set_manually(self, next: RoomStatus) -> bool {
        use RoomStatus::*;
        match (self, next) {
            (_, Occupied) => false,
            (Occupied, Dirty) => true,
            (Occupied, _) => false,
            (from, to) => from != to,
        }
    }

    /// Status que tiram o quarto da capacidade do tipo.
    /// Usado direto na contagem (`status <> ALL($n)`).
    pub const UNSELLABLE: [RoomStatus; 1] = [RoomStatus::OutOfOrder];
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoomStatus::Clean => "CLEAN",
            RoomStatus::Dirty => "DIRTY",
            RoomStatus::Occupied => "OCCUPIED",
            RoomStatus::Maintenance => "MAINTENANCE",
            RoomStatus::OutOfOrder => "OUT_OF_ORDER",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Floor {
    pub id: Uuid,
    #[schema(ignore)]
    pub hotel_id: Uuid,
    #[schema(example = 2)]
    pub number: i32,
    #[schema(example = "Segundo andar")]
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomType {
    pub id: Uuid,
    #[schema(ignore)]
    pub hotel_id: Uuid,
    #[schema(example = "Deluxe")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "4500.00")]
    pub base_price: Decimal,
    #[schema(example = "INR")]
    pub currency: String,
    #[schema(example = 3)]
    pub max_occupancy: i32,
    #[schema(example = json!(["wifi", "ac", "minibar"]))]
    pub amenities: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Uuid,
    #[schema(ignore)]
    pub hotel_id: Uuid,
    pub floor_id: Uuid,
    pub room_type_id: Uuid,
    #[schema(example = "204")]
    pub number: String,
    pub status: RoomStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Regras para colocar uma reserva neste quarto no check-in:
    /// mesmo tipo reservado, nenhuma outra reserva ativa no período e quarto limpo.
    pub fn ensure_assignable(&self, booking_room_type_id: Uuid, overlapping: i64) -> Result<(), AppError> {
        if self.room_type_id != booking_room_type_id {
            return Err(AppError::RoomTypeMismatch);
        }
        if overlapping > 0 {
            return Err(AppError::RoomNotAvailable(self.number.clone()));
        }
        if self.status != RoomStatus::Clean {
            return Err(AppError::RoomNotClean {
                room: self.number.clone(),
                status: self.status.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RoomStatus::*;

    #[test]
    fn occupied_is_never_a_manual_target() {
        for from in [Clean, Dirty, Maintenance, OutOfOrder, Occupied] {
            assert!(!from.can_set_manually(Occupied));
        }
    }

    #[test]
    fn occupied_rooms_can_only_be_marked_dirty() {
        assert!(Occupied.can_set_manually(Dirty));
        assert!(!Occupied.can_set_manually(Clean));
        assert!(!Occupied.can_set_manually(Maintenance));
    }

    #[test]
    fn housekeeping_cycle() {
        assert!(Dirty.can_set_manually(Clean));
        assert!(Clean.can_set_manually(Maintenance));
        assert!(Maintenance.can_set_manually(OutOfOrder));
        assert!(OutOfOrder.can_set_manually(Clean));
        assert!(!Clean.can_set_manually(Clean));
    }

    #[test]
    fn out_of_order_rooms_do_not_count() {
        assert_eq!(RoomStatus::UNSELLABLE, [OutOfOrder]);
        assert!(!RoomStatus::UNSELLABLE.contains(&Maintenance));
        assert!(!RoomStatus::UNSELLABLE.contains(&Dirty));
    }

    fn room(room_type_id: Uuid, status: RoomStatus) -> Room {
        Room {
            id: Uuid::new_v4(),
            hotel_id: Uuid::new_v4(),
            floor_id: Uuid::new_v4(),
            room_type_id,
            number: "204".into(),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn clean_free_room_of_the_booked_type_is_assignable() {
        let deluxe = Uuid::new_v4();
        assert!(room(deluxe, Clean).ensure_assignable(deluxe, 0).is_ok());
    }

    #[test]
    fn check_in_rejects_a_room_that_is_not_clean() {
        let deluxe = Uuid::new_v4();
        for status in [Dirty, Occupied, Maintenance, OutOfOrder] {
            let err = room(deluxe, status).ensure_assignable(deluxe, 0).unwrap_err();
            assert!(matches!(err, AppError::RoomNotClean { ref room, .. } if room == "204"), "{status}");
        }
    }

    #[test]
    fn check_in_rejects_a_room_with_an_overlapping_active_booking() {
        let deluxe = Uuid::new_v4();
        let err = room(deluxe, Clean).ensure_assignable(deluxe, 1).unwrap_err();
        assert!(matches!(err, AppError::RoomNotAvailable(ref number) if number == "204"));
    }

    #[test]
    fn check_in_rejects_a_room_of_another_type() {
        let err = room(Uuid::new_v4(), Clean).ensure_assignable(Uuid::new_v4(), 0).unwrap_err();
        assert!(matches!(err, AppError::RoomTypeMismatch));
    }
}
