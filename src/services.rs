// src/services.rs

pub mod auth;
pub mod availability_service;
pub mod booking_service;
pub mod brand_service;
pub mod cache;
pub mod document_service;
pub mod folio_service;
pub mod guest_service;
pub mod hotel_service;
pub mod inventory_service;
pub mod messaging_service;
pub mod notifier;
pub mod payment_gateway;
pub mod payment_service;
pub mod room_service;
pub mod website_service;
