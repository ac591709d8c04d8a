// Collaborator traits
//
// The orchestrator only talks to these seams:
// - EventStore: persistence and indexed lookup of events
// - AdminDirectory: organizer profiles carrying platform credentials
// - VideoPlatform: session/token/archive calls on the external platform
//
// Storage backends live in stagehand-storage, the OpenTok client in
// stagehand-opentok; the simulated platform in this crate serves dev mode
// and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::admin::{Admin, AdminPatch, NewAdmin};
use crate::error::Result;
use crate::event::{Event, EventPatch, NewEvent, PublicEvent, SlugField};
use crate::platform::{PlatformCredentials, TokenOptions, VideoSession};

// ============================================================================
// EventStore - Event persistence
// ============================================================================

/// Trait for storing and looking up events
///
/// Lookups return `Ok(None)` / empty collections when nothing matches;
/// `Err` is reserved for persistence failures.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// All events owned by an admin, keyed by event id
    async fn list(&self, admin_id: &str) -> Result<HashMap<Uuid, Event>>;

    /// Non-closed events of an admin, oldest first, projected to public fields
    async fn list_public(&self, admin_id: &str) -> Result<Vec<PublicEvent>>;

    /// Earliest live event of an admin, else earliest preshow event
    async fn most_recent_active(&self, admin_id: &str) -> Result<Option<Event>>;

    async fn get(&self, id: Uuid) -> Result<Option<Event>>;

    /// First event whose backstage session id matches
    async fn get_by_session_id(&self, session_id: &str) -> Result<Option<Event>>;

    /// Event of an admin whose slug in `field` equals `slug`
    async fn get_by_key(
        &self,
        admin_id: &str,
        slug: &str,
        field: SlugField,
    ) -> Result<Option<Event>>;

    /// Allocate an id, stamp timestamps and persist
    async fn save(&self, input: NewEvent) -> Result<Event>;

    /// Merge a patch into an existing event; `None` if the id is unknown
    async fn update(&self, id: Uuid, patch: EventPatch) -> Result<Option<Event>>;

    /// Delete one event (no existence check)
    async fn remove(&self, id: Uuid) -> Result<()>;

    /// Delete every event owned by an admin
    async fn remove_all_by_admin(&self, admin_id: &str) -> Result<()>;
}

// ============================================================================
// AdminDirectory - Organizer profiles
// ============================================================================

#[async_trait]
pub trait AdminDirectory: Send + Sync {
    async fn get_admin(&self, id: &str) -> Result<Option<Admin>>;

    async fn create_admin(&self, input: NewAdmin) -> Result<Admin>;

    /// `None` if the admin does not exist
    async fn update_admin(&self, id: &str, patch: AdminPatch) -> Result<Option<Admin>>;

    /// Returns whether a record was deleted
    async fn delete_admin(&self, id: &str) -> Result<bool>;
}

// ============================================================================
// VideoPlatform - External conferencing platform
// ============================================================================

/// Capability surface of the video platform
///
/// Implementations do not retry; failures surface as `StagehandError::Platform`.
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    async fn create_session(&self, credentials: &PlatformCredentials) -> Result<VideoSession>;

    /// Mint a client token scoped to `session_id`
    async fn create_token(
        &self,
        credentials: &PlatformCredentials,
        session_id: &str,
        options: &TokenOptions,
    ) -> Result<String>;

    /// Start recording a session; returns the archive id
    async fn start_archive(
        &self,
        credentials: &PlatformCredentials,
        session_id: &str,
        name: &str,
        composed: bool,
    ) -> Result<String>;

    async fn stop_archive(&self, credentials: &PlatformCredentials, archive_id: &str)
        -> Result<()>;
}
