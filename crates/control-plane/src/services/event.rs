// Event orchestration service
//
// Composes the event store, the admin directory and the video platform to
// create events, drive their lifecycle and archives, and mint participant
// tokens. Steps of one operation run in order; a failed step aborts the rest
// with no compensation.

use chrono::Utc;
use stagehand_core::{
    lifecycle, Admin, AdminDirectory, Event, EventFields, EventPatch, EventStatus, EventStore,
    FanCredentials, NewEvent, PlatformCredentials, ProducerCredentials, PublicEvent, Result,
    SlugField, StageCredentials, StagehandError, TokenOptions, TokenRole, UserType, VideoPlatform,
};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn EventStore>,
    admins: Arc<dyn AdminDirectory>,
    platform: Arc<dyn VideoPlatform>,
}

impl EventService {
    pub fn new(
        store: Arc<dyn EventStore>,
        admins: Arc<dyn AdminDirectory>,
        platform: Arc<dyn VideoPlatform>,
    ) -> Self {
        Self {
            store,
            admins,
            platform,
        }
    }

    // ============================================
    // Lookups
    // ============================================

    async fn load_event(&self, id: Uuid) -> Result<Event> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| StagehandError::event_not_found(id))
    }

    async fn load_admin(&self, admin_id: &str) -> Result<Admin> {
        self.admins
            .get_admin(admin_id)
            .await?
            .ok_or_else(|| StagehandError::admin_not_found(admin_id))
    }

    async fn load_by_key(&self, admin_id: &str, slug: &str, field: SlugField) -> Result<Event> {
        self.store
            .get_by_key(admin_id, slug, field)
            .await?
            .ok_or_else(|| StagehandError::event_not_found(format!("{}={}", field, slug)))
    }

    /// Fail if any slug in `fields` belongs to another event of the same admin
    async fn ensure_slugs_free(
        &self,
        admin_id: &str,
        fields: &EventFields,
        current: Option<Uuid>,
    ) -> Result<()> {
        for (field, slug) in fields.slugs() {
            if let Some(existing) = self.store.get_by_key(admin_id, slug, field).await? {
                if Some(existing.id) != current {
                    return Err(StagehandError::SlugConflict {
                        field,
                        slug: slug.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Event>> {
        self.store.get(id).await
    }

    pub async fn get_by_session_id(&self, session_id: &str) -> Result<Option<Event>> {
        self.store.get_by_session_id(session_id).await
    }

    pub async fn list(&self, admin_id: &str) -> Result<HashMap<Uuid, Event>> {
        self.store.list(admin_id).await
    }

    pub async fn list_public(&self, admin_id: &str) -> Result<Vec<PublicEvent>> {
        self.store.list_public(admin_id).await
    }

    pub async fn most_recent_active(&self, admin_id: &str) -> Result<Option<Event>> {
        self.store.most_recent_active(admin_id).await
    }

    // ============================================
    // Event lifecycle
    // ============================================

    /// Create an event with fresh backstage and on-stage sessions
    pub async fn create(&self, admin_id: &str, fields: EventFields) -> Result<Event> {
        self.ensure_slugs_free(admin_id, &fields, None).await?;
        let admin = self.load_admin(admin_id).await?;

        let (session_id, stage_session_id) = self.provision_sessions(&admin.credentials()).await?;

        let event = self
            .store
            .save(NewEvent {
                admin_id: admin_id.to_string(),
                session_id,
                stage_session_id,
                status: EventStatus::NotStarted,
                rtmp_url: String::new(),
                fields,
            })
            .await?;

        tracing::info!(
            event_id = %event.id,
            admin_id = %admin_id,
            session_id = %event.session_id,
            stage_session_id = %event.stage_session_id,
            "Event created"
        );
        Ok(event)
    }

    /// Create the backstage and on-stage sessions concurrently
    ///
    /// A session that was created while its sibling failed is abandoned.
    async fn provision_sessions(
        &self,
        credentials: &PlatformCredentials,
    ) -> Result<(String, String)> {
        let (backstage, stage) = futures::join!(
            self.platform.create_session(credentials),
            self.platform.create_session(credentials)
        );

        match (backstage, stage) {
            (Ok(backstage), Ok(stage)) => Ok((backstage.session_id, stage.session_id)),
            (Ok(orphan), Err(e)) | (Err(e), Ok(orphan)) => {
                tracing::warn!(
                    session_id = %orphan.session_id,
                    error = %e,
                    "Session creation partially failed, abandoning created session"
                );
                Err(StagehandError::session_creation(e))
            }
            (Err(e), Err(_)) => Err(StagehandError::session_creation(e)),
        }
    }

    /// Direct field update; session ids and owner cannot change
    pub async fn update(&self, id: Uuid, fields: EventFields) -> Result<Event> {
        let event = self.load_event(id).await?;
        self.ensure_slugs_free(&event.admin_id, &fields, Some(id))
            .await?;

        let updated = self
            .store
            .update(id, EventPatch::from(fields))
            .await?
            .ok_or_else(|| StagehandError::event_not_found(id))?;

        tracing::info!(event_id = %id, "Event updated");
        Ok(updated)
    }

    /// Set the status and stamp the matching milestone in the same write
    pub async fn change_status(&self, id: Uuid, status: EventStatus) -> Result<Event> {
        self.change_status_with(id, status, EventFields::default()).await
    }

    /// Field update carrying a status change; the milestone stamp rides along
    pub async fn change_status_with(
        &self,
        id: Uuid,
        status: EventStatus,
        fields: EventFields,
    ) -> Result<Event> {
        if fields.slugs().next().is_some() {
            let event = self.load_event(id).await?;
            self.ensure_slugs_free(&event.admin_id, &fields, Some(id))
                .await?;
        }

        let patch = EventPatch {
            fields,
            ..lifecycle::stamp(status, Utc::now())
        };
        let event = self
            .store
            .update(id, patch)
            .await?
            .ok_or_else(|| StagehandError::event_not_found(id))?;

        tracing::info!(event_id = %id, status = %status, "Event status changed");
        Ok(event)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.store.remove(id).await?;
        tracing::info!(event_id = %id, "Event deleted");
        Ok(())
    }

    pub async fn delete_all_for_admin(&self, admin_id: &str) -> Result<()> {
        self.store.remove_all_by_admin(admin_id).await?;
        tracing::info!(admin_id = %admin_id, "All events deleted for admin");
        Ok(())
    }

    // ============================================
    // Archives
    // ============================================

    /// Start recording the on-stage session and remember the archive id
    pub async fn start_archive(&self, id: Uuid) -> Result<String> {
        let event = self.load_event(id).await?;
        let admin = self.load_admin(&event.admin_id).await?;

        let archive_id = self
            .platform
            .start_archive(
                &admin.credentials(),
                &event.stage_session_id,
                &event.name,
                event.composed,
            )
            .await?;

        self.store
            .update(id, EventPatch::archive(archive_id.clone()))
            .await?
            .ok_or_else(|| StagehandError::event_not_found(id))?;

        tracing::info!(event_id = %id, archive_id = %archive_id, "Archive started");
        Ok(archive_id)
    }

    /// Stop the event's archive; `archive_id` stays on the record
    pub async fn stop_archive(&self, id: Uuid) -> Result<()> {
        let event = self.load_event(id).await?;
        let admin = self.load_admin(&event.admin_id).await?;
        let archive_id = event
            .archive_id
            .ok_or_else(|| StagehandError::ArchiveNotStarted(id.to_string()))?;

        self.platform
            .stop_archive(&admin.credentials(), &archive_id)
            .await?;

        tracing::info!(event_id = %id, archive_id = %archive_id, "Archive stopped");
        Ok(())
    }

    // ============================================
    // Tokens
    // ============================================

    async fn token(
        &self,
        credentials: &PlatformCredentials,
        session_id: &str,
        role: TokenRole,
        user_type: UserType,
    ) -> Result<String> {
        tracing::debug!(
            session_id = %session_id,
            role = role.as_str(),
            user_type = %user_type,
            "Minting token"
        );
        self.platform
            .create_token(credentials, session_id, &TokenOptions::new(role, user_type))
            .await
    }

    /// Moderator tokens for both sessions
    pub async fn create_token_producer(&self, id: Uuid) -> Result<ProducerCredentials> {
        let event = self.load_event(id).await?;
        let admin = self.load_admin(&event.admin_id).await?;
        let credentials = admin.credentials();

        let backstage_token = self
            .token(&credentials, &event.session_id, TokenRole::Moderator, UserType::Producer)
            .await?;
        let stage_token = self
            .token(
                &credentials,
                &event.stage_session_id,
                TokenRole::Moderator,
                UserType::Producer,
            )
            .await?;

        Ok(ProducerCredentials {
            api_key: admin.ot_api_key,
            event,
            backstage_token,
            stage_token,
        })
    }

    /// Publisher tokens for both sessions, resolved by fan slug
    pub async fn create_token_fan(&self, admin_id: &str, slug: &str) -> Result<FanCredentials> {
        let event = self.load_by_key(admin_id, slug, SlugField::FanUrl).await?;
        let admin = self.load_admin(admin_id).await?;
        let credentials = admin.credentials();

        let backstage_token = self
            .token(&credentials, &event.session_id, TokenRole::Publisher, UserType::Fan)
            .await?;
        let stage_token = self
            .token(&credentials, &event.stage_session_id, TokenRole::Publisher, UserType::Fan)
            .await?;

        Ok(FanCredentials {
            api_key: admin.ot_api_key,
            http_support: admin.http_support,
            event,
            backstage_token,
            stage_token,
        })
    }

    /// On-stage publisher token for a host or celebrity
    ///
    /// `Host` resolves through `hostUrl`; every other user type through
    /// `celebrityUrl`.
    pub async fn create_token_host_celeb(
        &self,
        admin_id: &str,
        slug: &str,
        user_type: UserType,
    ) -> Result<StageCredentials> {
        let event = self
            .load_by_key(admin_id, slug, user_type.slug_field())
            .await?;
        let admin = self.load_admin(admin_id).await?;

        let stage_token = self
            .token(
                &admin.credentials(),
                &event.stage_session_id,
                TokenRole::Publisher,
                user_type,
            )
            .await?;

        Ok(StageCredentials {
            api_key: admin.ot_api_key,
            http_support: admin.http_support,
            event,
            stage_token,
        })
    }

    /// Stage token for the admin's current event; `None` when nothing is live or in preshow
    pub async fn create_token_by_user_type(
        &self,
        admin_id: &str,
        user_type: UserType,
    ) -> Result<Option<StageCredentials>> {
        let Some(event) = self.store.most_recent_active(admin_id).await? else {
            tracing::debug!(admin_id = %admin_id, "No active event");
            return Ok(None);
        };

        let field = user_type.slug_field();
        let slug = event.slug(field).ok_or_else(|| {
            StagehandError::event_not_found(format!("{} has no {}", event.id, field))
        })?;

        self.create_token_host_celeb(admin_id, slug, user_type)
            .await
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_core::{NewAdmin, PlatformCall, SimulatedPlatformConfig, SimulatedVideoPlatform};
    use stagehand_storage::{DbAdminDirectory, DbEventStore, StorageBackend};

    struct Harness {
        service: EventService,
        platform: Arc<SimulatedVideoPlatform>,
    }

    async fn harness(config: SimulatedPlatformConfig) -> Harness {
        let backend = StorageBackend::in_memory();
        let admins = Arc::new(DbAdminDirectory::new(backend.clone(), None));
        admins
            .create_admin(NewAdmin {
                id: "a1".to_string(),
                display_name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                ot_api_key: "4655".to_string(),
                ot_secret: "secret".to_string(),
                http_support: true,
                super_admin: false,
            })
            .await
            .unwrap();

        let platform = Arc::new(SimulatedVideoPlatform::with_config(config));
        let service = EventService::new(
            Arc::new(DbEventStore::new(backend)),
            admins,
            platform.clone(),
        );
        Harness { service, platform }
    }

    fn fields(fan_url: &str) -> EventFields {
        EventFields {
            name: Some("Launch".to_string()),
            fan_url: Some(fan_url.to_string()),
            host_url: Some(format!("{}-host", fan_url)),
            celebrity_url: Some(format!("{}-celeb", fan_url)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_provisions_two_distinct_sessions() {
        let h = harness(SimulatedPlatformConfig::default()).await;
        let event = h.service.create("a1", fields("alpha")).await.unwrap();

        assert_ne!(event.session_id, event.stage_session_id);
        assert_eq!(event.status, EventStatus::NotStarted);
        assert_eq!(event.rtmp_url, "");
        assert_eq!(h.platform.session_calls(), 2);
    }

    #[tokio::test]
    async fn test_create_for_unknown_admin_makes_no_platform_calls() {
        let h = harness(SimulatedPlatformConfig::default()).await;
        let err = h.service.create("ghost", fields("alpha")).await.unwrap_err();

        assert!(matches!(err, StagehandError::AdminNotFound(_)));
        assert_eq!(h.platform.call_count(), 0);
    }

    #[tokio::test]
    async fn test_second_session_failure_is_wrapped_and_nothing_is_stored() {
        let h = harness(SimulatedPlatformConfig::default().fail_session_call(2)).await;
        let err = h.service.create("a1", fields("alpha")).await.unwrap_err();

        match err {
            StagehandError::SessionCreation { source } => {
                assert!(matches!(*source, StagehandError::Platform(_)))
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(h.service.list("a1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_rejected_before_platform_calls() {
        let h = harness(SimulatedPlatformConfig::default()).await;
        h.service.create("a1", fields("alpha")).await.unwrap();
        let calls_before = h.platform.call_count();

        let err = h
            .service
            .create(
                "a1",
                EventFields {
                    host_url: Some("alpha-host".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StagehandError::SlugConflict {
                field: SlugField::HostUrl,
                ..
            }
        ));
        assert_eq!(h.platform.call_count(), calls_before);
    }

    #[tokio::test]
    async fn test_update_may_keep_its_own_slug() {
        let h = harness(SimulatedPlatformConfig::default()).await;
        let event = h.service.create("a1", fields("alpha")).await.unwrap();

        let updated = h
            .service
            .update(
                event.id,
                EventFields {
                    fan_url: Some("alpha".to_string()),
                    name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.session_id, event.session_id);
    }

    #[tokio::test]
    async fn test_start_archive_uses_stage_session() {
        let h = harness(SimulatedPlatformConfig::default()).await;
        let event = h
            .service
            .create(
                "a1",
                EventFields {
                    composed: Some(true),
                    ..fields("alpha")
                },
            )
            .await
            .unwrap();

        let archive_id = h.service.start_archive(event.id).await.unwrap();
        let stored = h.service.get(event.id).await.unwrap().unwrap();

        assert_eq!(stored.archive_id.as_deref(), Some(archive_id.as_str()));
        assert!(h.platform.calls().contains(&PlatformCall::StartArchive {
            session_id: event.stage_session_id.clone(),
            name: "Launch".to_string(),
            composed: true,
        }));
    }

    #[tokio::test]
    async fn test_stop_archive_without_start_fails_before_platform_call() {
        let h = harness(SimulatedPlatformConfig::default()).await;
        let event = h.service.create("a1", fields("alpha")).await.unwrap();
        let calls_before = h.platform.call_count();

        let err = h.service.stop_archive(event.id).await.unwrap_err();
        assert!(matches!(err, StagehandError::ArchiveNotStarted(_)));
        assert_eq!(h.platform.call_count(), calls_before);
    }

    #[tokio::test]
    async fn test_archive_failure_leaves_record_untouched() {
        let h = harness(SimulatedPlatformConfig::default().fail_archive()).await;
        let event = h.service.create("a1", fields("alpha")).await.unwrap();

        assert!(h.service.start_archive(event.id).await.is_err());
        let stored = h.service.get(event.id).await.unwrap().unwrap();
        assert!(stored.archive_id.is_none());
    }

    #[tokio::test]
    async fn test_host_and_celebrity_resolve_their_own_slug() {
        let h = harness(SimulatedPlatformConfig::default()).await;
        h.service.create("a1", fields("alpha")).await.unwrap();

        let host = h
            .service
            .create_token_host_celeb("a1", "alpha-host", UserType::Host)
            .await
            .unwrap();
        assert!(host.http_support);

        // A host slug does not resolve a celebrity
        let err = h
            .service
            .create_token_host_celeb("a1", "alpha-host", UserType::Celebrity)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_token_failure_propagates() {
        let h = harness(SimulatedPlatformConfig::default().fail_token()).await;
        let event = h.service.create("a1", fields("alpha")).await.unwrap();

        let err = h.service.create_token_producer(event.id).await.unwrap_err();
        assert!(matches!(err, StagehandError::Platform(_)));
    }
}
