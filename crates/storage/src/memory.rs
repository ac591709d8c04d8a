// In-memory storage implementation for dev mode
// Decision: Use parking_lot for thread-safe access
// Decision: UUIDs generated via uuid v7 (time-ordered)
//
// Mirrors the PostgreSQL repository API on top of HashMaps so the operator
// binary and the tests run without a database. Selection rules come from
// stagehand-core so both backends agree on ordering.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use stagehand_core::{
    most_recent_active, Event, EventFields, EventPatch, EventStatus, NewEvent, SlugField,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::*;

/// In-memory database for dev mode
/// All data is stored in memory and lost on restart
#[derive(Default)]
pub struct InMemoryDatabase {
    events: RwLock<HashMap<Uuid, Event>>,
    admins: RwLock<HashMap<String, AdminRow>>,
}

/// Mirrors the per-admin partial unique indexes of the PostgreSQL schema.
/// Caller must hold the events write lock.
fn ensure_slugs_unclaimed(
    events: &HashMap<Uuid, Event>,
    admin_id: &str,
    fields: &EventFields,
    current: Option<Uuid>,
) -> Result<()> {
    for (field, slug) in fields.slugs() {
        let taken = events.values().any(|e| {
            Some(e.id) != current && e.admin_id == admin_id && e.slug(field) == Some(slug)
        });
        if taken {
            return Err(SlugTaken {
                field,
                slug: slug.to_string(),
            }
            .into());
        }
    }
    Ok(())
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn events_where(&self, predicate: impl Fn(&Event) -> bool) -> Vec<Event> {
        self.events
            .read()
            .values()
            .filter(|e| predicate(e))
            .cloned()
            .collect()
    }

    // ============================================
    // Events
    // ============================================

    pub async fn list_events(&self, admin_id: &str) -> Result<Vec<Event>> {
        Ok(self.events_where(|e| e.admin_id == admin_id))
    }

    /// Non-closed events, oldest first
    pub async fn list_open_events(&self, admin_id: &str) -> Result<Vec<Event>> {
        let mut events =
            self.events_where(|e| e.admin_id == admin_id && e.status != EventStatus::Closed);
        events.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(events)
    }

    pub async fn most_recent_active_event(&self, admin_id: &str) -> Result<Option<Event>> {
        Ok(most_recent_active(self.events_where(|e| e.admin_id == admin_id)))
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Option<Event>> {
        Ok(self.events.read().get(&id).cloned())
    }

    pub async fn get_event_by_session_id(&self, session_id: &str) -> Result<Option<Event>> {
        Ok(self
            .events_where(|e| e.session_id == session_id)
            .into_iter()
            .min_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id))))
    }

    pub async fn get_event_by_key(
        &self,
        admin_id: &str,
        slug: &str,
        field: SlugField,
    ) -> Result<Option<Event>> {
        Ok(self
            .events
            .read()
            .values()
            .find(|e| e.admin_id == admin_id && e.slug(field) == Some(slug))
            .cloned())
    }

    pub async fn create_event(&self, input: NewEvent) -> Result<Event> {
        let mut events = self.events.write();
        ensure_slugs_unclaimed(&events, &input.admin_id, &input.fields, None)?;

        let event = Event::from_new(Uuid::now_v7(), input, Self::now());
        events.insert(event.id, event.clone());
        Ok(event)
    }

    pub async fn update_event(&self, id: Uuid, patch: EventPatch) -> Result<Option<Event>> {
        let mut events = self.events.write();
        if let Some(admin_id) = events.get(&id).map(|e| e.admin_id.clone()) {
            ensure_slugs_unclaimed(&events, &admin_id, &patch.fields, Some(id))?;
        }
        match events.get_mut(&id) {
            Some(event) => {
                event.apply(patch, Self::now());
                Ok(Some(event.clone()))
            }
            None => Ok(None),
        }
    }

    pub async fn delete_event(&self, id: Uuid) -> Result<()> {
        self.events.write().remove(&id);
        Ok(())
    }

    pub async fn delete_events_by_admin(&self, admin_id: &str) -> Result<u64> {
        let mut events = self.events.write();
        let before = events.len();
        events.retain(|_, e| e.admin_id != admin_id);
        Ok((before - events.len()) as u64)
    }

    // ============================================
    // Admins
    // ============================================

    pub async fn create_admin(&self, input: CreateAdminRow) -> Result<AdminRow> {
        let mut admins = self.admins.write();
        if admins.contains_key(&input.id) {
            bail!("Admin '{}' already exists", input.id);
        }

        let now = Self::now();
        let row = AdminRow {
            id: input.id,
            display_name: input.display_name,
            email: input.email,
            ot_api_key: input.ot_api_key,
            ot_secret: input.ot_secret,
            http_support: input.http_support,
            super_admin: input.super_admin,
            created_at: now,
            updated_at: now,
        };
        admins.insert(row.id.clone(), row.clone());
        Ok(row)
    }

    pub async fn get_admin(&self, id: &str) -> Result<Option<AdminRow>> {
        Ok(self.admins.read().get(id).cloned())
    }

    pub async fn update_admin(&self, id: &str, input: UpdateAdminRow) -> Result<Option<AdminRow>> {
        let mut admins = self.admins.write();
        if let Some(admin) = admins.get_mut(id) {
            if let Some(display_name) = input.display_name {
                admin.display_name = display_name;
            }
            if let Some(email) = input.email {
                admin.email = email;
            }
            if let Some(ot_api_key) = input.ot_api_key {
                admin.ot_api_key = ot_api_key;
            }
            if let Some(ot_secret) = input.ot_secret {
                admin.ot_secret = ot_secret;
            }
            if let Some(http_support) = input.http_support {
                admin.http_support = http_support;
            }
            admin.updated_at = Self::now();
            Ok(Some(admin.clone()))
        } else {
            Ok(None)
        }
    }

    pub async fn delete_admin(&self, id: &str) -> Result<bool> {
        Ok(self.admins.write().remove(id).is_some())
    }
}
