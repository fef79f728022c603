pub mod user_repo;
pub use user_repo::UserRepository;
pub mod hotel_repo;
pub use hotel_repo::{HotelProfile, HotelRepository};
pub mod brand_repo;
pub use brand_repo::BrandRepository;
pub mod room_repo;
pub use room_repo::RoomRepository;
pub mod guest_repo;
pub use guest_repo::GuestRepository;
pub mod booking_repo;
pub use booking_repo::{BookingFilter, BookingRepository, NewBooking};
pub mod folio_repo;
pub use folio_repo::FolioRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod messaging_repo;
pub use messaging_repo::MessagingRepository;
pub mod website_repo;
pub use website_repo::WebsiteRepository;
