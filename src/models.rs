pub mod auth;
pub mod availability;
pub mod booking;
pub mod brand;
pub mod folio;
pub mod guest;
pub mod hotel;
pub mod inventory;
pub mod messaging;
pub mod room;
pub mod website;
