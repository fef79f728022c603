// src/test_support.rs

// Testes de integração contra um Postgres real (TEST_DATABASE_URL).
// Sem a variável, os testes que dependem do banco retornam sem fazer nada.

use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::{
    config::{AppConfig, AppState},
    db::{HotelProfile, UserRepository},
    models::{
        auth::User,
        hotel::Hotel,
        room::{Room, RoomType},
    },
};

pub async fn test_state() -> Option<AppState> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL não definida; teste de integração ignorado");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("conexão com o banco de teste");
    sqlx::migrate!().run(&pool).await.expect("migrações do banco de teste");

    let config = AppConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some(url.clone()),
        "JWT_SECRET" => Some("test-secret".into()),
        _ => None,
    })
    .expect("config de teste");

    Some(AppState::build(config, pool).expect("estado de teste"))
}

pub fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

pub async fn create_user(state: &AppState, name: &str) -> User {
    UserRepository::new(state.db_pool.clone())
        .create_user(&state.db_pool, &format!("{}@example.com", unique("user")), name, "not-a-real-hash")
        .await
        .expect("usuário de teste")
}

pub async fn create_hotel(state: &AppState, owner: &User, brand_id: Option<Uuid>) -> Hotel {
    state
        .hotel_service
        .create_hotel(
            owner,
            brand_id,
            Some(&unique("hotel")),
            HotelProfile { name: "Hotel Aurora".into(), ..Default::default() },
        )
        .await
        .expect("hotel de teste")
}

/// Tipo "Deluxe" com um quarto limpo.
pub async fn create_deluxe_with_room(state: &AppState, hotel_id: Uuid, base_price: Decimal) -> (RoomType, Room) {
    let floor = state
        .room_service
        .create_floor(hotel_id, 1, None)
        .await
        .expect("andar de teste");
    let room_type = state
        .room_service
        .create_room_type(hotel_id, "Deluxe", None, base_price, "INR", 2, &[])
        .await
        .expect("tipo de quarto de teste");
    let room = state
        .room_service
        .create_room(hotel_id, floor.id, room_type.id, "101")
        .await
        .expect("quarto de teste");
    (room_type, room)
}
