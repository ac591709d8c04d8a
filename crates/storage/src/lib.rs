// Stagehand storage layer
//
// This crate provides persistence implementations for the core traits:
// - DbEventStore: implements EventStore
// - DbAdminDirectory: implements AdminDirectory, sealing platform secrets
//
// Both run over StorageBackend: PostgreSQL via sqlx, or in-memory maps for
// dev mode and tests.

pub mod admin_directory;
pub mod backend;
pub mod encryption;
pub mod event_store;
pub mod memory;
pub mod models;
pub mod repositories;

pub use admin_directory::DbAdminDirectory;
pub use backend::StorageBackend;
pub use encryption::{generate_encryption_key, is_sealed, EncryptionService, SealedSecret};
pub use event_store::DbEventStore;
pub use memory::InMemoryDatabase;
pub use models::SlugTaken;
pub use repositories::Database;
