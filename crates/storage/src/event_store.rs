// Storage-backed EventStore implementation
//
// Adapts StorageBackend (anyhow errors) to the core EventStore trait
// (StagehandError::Store).

use async_trait::async_trait;
use stagehand_core::{
    public_listing, traits::EventStore, Event, EventPatch, NewEvent, PublicEvent, Result,
    SlugField, StagehandError,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::backend::StorageBackend;
use crate::models::SlugTaken;

fn store_err(e: anyhow::Error) -> StagehandError {
    StagehandError::store(format!("{:#}", e))
}

/// Writes surface slug collisions as conflicts, not storage failures
fn write_err(e: anyhow::Error) -> StagehandError {
    match e.downcast::<SlugTaken>() {
        Ok(SlugTaken { field, slug }) => StagehandError::SlugConflict { field, slug },
        Err(e) => store_err(e),
    }
}

// ============================================================================
// DbEventStore - Events in PostgreSQL or the dev-mode memory store
// ============================================================================

#[derive(Clone)]
pub struct DbEventStore {
    backend: StorageBackend,
}

impl DbEventStore {
    pub fn new(backend: StorageBackend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl EventStore for DbEventStore {
    async fn list(&self, admin_id: &str) -> Result<HashMap<Uuid, Event>> {
        let events = self
            .backend
            .list_events(admin_id)
            .await
            .map_err(store_err)?;
        Ok(events.into_iter().map(|e| (e.id, e)).collect())
    }

    async fn list_public(&self, admin_id: &str) -> Result<Vec<PublicEvent>> {
        let events = self
            .backend
            .list_open_events(admin_id)
            .await
            .map_err(store_err)?;
        // Re-applies the filter and ordering so both backends project identically
        Ok(public_listing(events))
    }

    async fn most_recent_active(&self, admin_id: &str) -> Result<Option<Event>> {
        self.backend
            .most_recent_active_event(admin_id)
            .await
            .map_err(store_err)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Event>> {
        self.backend.get_event(id).await.map_err(store_err)
    }

    async fn get_by_session_id(&self, session_id: &str) -> Result<Option<Event>> {
        self.backend
            .get_event_by_session_id(session_id)
            .await
            .map_err(store_err)
    }

    async fn get_by_key(
        &self,
        admin_id: &str,
        slug: &str,
        field: SlugField,
    ) -> Result<Option<Event>> {
        self.backend
            .get_event_by_key(admin_id, slug, field)
            .await
            .map_err(store_err)
    }

    async fn save(&self, input: NewEvent) -> Result<Event> {
        let event = self.backend.create_event(input).await.map_err(write_err)?;
        tracing::debug!(event_id = %event.id, admin_id = %event.admin_id, "Event stored");
        Ok(event)
    }

    async fn update(&self, id: Uuid, patch: EventPatch) -> Result<Option<Event>> {
        self.backend.update_event(id, patch).await.map_err(write_err)
    }

    async fn remove(&self, id: Uuid) -> Result<()> {
        self.backend.delete_event(id).await.map_err(store_err)
    }

    async fn remove_all_by_admin(&self, admin_id: &str) -> Result<()> {
        let removed = self
            .backend
            .delete_events_by_admin(admin_id)
            .await
            .map_err(store_err)?;
        tracing::debug!(admin_id = %admin_id, removed, "Events removed for admin");
        Ok(())
    }
}
