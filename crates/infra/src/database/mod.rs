//! SQLite-backed persistence.

pub mod booking_repository;
pub mod catalog_repository;
pub mod manager;
pub mod reminder_repository;
pub mod token_repository;

pub use booking_repository::SqliteBookingStore;
pub use catalog_repository::SqliteCatalogRepository;
pub use manager::{DbConnection, DbManager};
pub use reminder_repository::SqliteReminderStore;
pub use token_repository::{SqliteTokenRepository, StoredTokens};
