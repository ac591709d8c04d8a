// Storage backend abstraction
// Decision: Use enum dispatch for simplicity over trait objects
//
// This module provides a unified StorageBackend enum that can work with
// either PostgreSQL (production) or in-memory (dev mode) storage.

use anyhow::Result;
use stagehand_core::{Event, EventPatch, NewEvent, SlugField};
use std::sync::Arc;
use uuid::Uuid;

use crate::memory::InMemoryDatabase;
use crate::models::*;
use crate::repositories::Database;

/// Storage backend that can be either PostgreSQL or in-memory
#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory database (dev mode)
    InMemory(Arc<InMemoryDatabase>),
}

impl StorageBackend {
    /// Connect to PostgreSQL and apply migrations
    pub async fn postgres(database_url: &str) -> Result<Self> {
        let db = Database::from_url(database_url).await?;
        db.migrate().await?;
        Ok(Self::Postgres(db))
    }

    /// Create an in-memory storage backend
    pub fn in_memory() -> Self {
        Self::InMemory(Arc::new(InMemoryDatabase::new()))
    }

    // ============================================
    // Events
    // ============================================

    pub async fn list_events(&self, admin_id: &str) -> Result<Vec<Event>> {
        match self {
            Self::Postgres(db) => db.list_events(admin_id).await,
            Self::InMemory(db) => db.list_events(admin_id).await,
        }
    }

    pub async fn list_open_events(&self, admin_id: &str) -> Result<Vec<Event>> {
        match self {
            Self::Postgres(db) => db.list_open_events(admin_id).await,
            Self::InMemory(db) => db.list_open_events(admin_id).await,
        }
    }

    pub async fn most_recent_active_event(&self, admin_id: &str) -> Result<Option<Event>> {
        match self {
            Self::Postgres(db) => db.most_recent_active_event(admin_id).await,
            Self::InMemory(db) => db.most_recent_active_event(admin_id).await,
        }
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Option<Event>> {
        match self {
            Self::Postgres(db) => db.get_event(id).await,
            Self::InMemory(db) => db.get_event(id).await,
        }
    }

    pub async fn get_event_by_session_id(&self, session_id: &str) -> Result<Option<Event>> {
        match self {
            Self::Postgres(db) => db.get_event_by_session_id(session_id).await,
            Self::InMemory(db) => db.get_event_by_session_id(session_id).await,
        }
    }

    pub async fn get_event_by_key(
        &self,
        admin_id: &str,
        slug: &str,
        field: SlugField,
    ) -> Result<Option<Event>> {
        match self {
            Self::Postgres(db) => db.get_event_by_key(admin_id, slug, field).await,
            Self::InMemory(db) => db.get_event_by_key(admin_id, slug, field).await,
        }
    }

    pub async fn create_event(&self, input: NewEvent) -> Result<Event> {
        match self {
            Self::Postgres(db) => db.create_event(input).await,
            Self::InMemory(db) => db.create_event(input).await,
        }
    }

    pub async fn update_event(&self, id: Uuid, patch: EventPatch) -> Result<Option<Event>> {
        match self {
            Self::Postgres(db) => db.update_event(id, patch).await,
            Self::InMemory(db) => db.update_event(id, patch).await,
        }
    }

    pub async fn delete_event(&self, id: Uuid) -> Result<()> {
        match self {
            Self::Postgres(db) => db.delete_event(id).await,
            Self::InMemory(db) => db.delete_event(id).await,
        }
    }

    pub async fn delete_events_by_admin(&self, admin_id: &str) -> Result<u64> {
        match self {
            Self::Postgres(db) => db.delete_events_by_admin(admin_id).await,
            Self::InMemory(db) => db.delete_events_by_admin(admin_id).await,
        }
    }

    // ============================================
    // Admins
    // ============================================

    pub async fn create_admin(&self, input: CreateAdminRow) -> Result<AdminRow> {
        match self {
            Self::Postgres(db) => db.create_admin(input).await,
            Self::InMemory(db) => db.create_admin(input).await,
        }
    }

    pub async fn get_admin(&self, id: &str) -> Result<Option<AdminRow>> {
        match self {
            Self::Postgres(db) => db.get_admin(id).await,
            Self::InMemory(db) => db.get_admin(id).await,
        }
    }

    pub async fn update_admin(&self, id: &str, input: UpdateAdminRow) -> Result<Option<AdminRow>> {
        match self {
            Self::Postgres(db) => db.update_admin(id, input).await,
            Self::InMemory(db) => db.update_admin(id, input).await,
        }
    }

    pub async fn delete_admin(&self, id: &str) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.delete_admin(id).await,
            Self::InMemory(db) => db.delete_admin(id).await,
        }
    }
}
