// src/handlers.rs

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod documents;
pub mod folio;
pub mod guests;
pub mod hotels;
pub mod inventory;
pub mod messaging;
pub mod payments;
pub mod rooms;
pub mod website;
