// Orchestration scenarios over in-memory storage and the simulated platform
// Run with: cargo test -p stagehand-control-plane --test orchestration_test

use async_trait::async_trait;
use serde_json::json;
use stagehand_control_plane::AppContext;
use stagehand_core::{
    EventFields, EventStatus, EventStore, NewAdmin, PlatformCall, PlatformCredentials,
    SimulatedPlatformConfig, SimulatedVideoPlatform, SlugField, StagehandError, TokenOptions,
    TokenRole, UserType, VideoPlatform, VideoSession,
};
use stagehand_storage::{DbEventStore, StorageBackend};
use std::sync::Arc;
use std::time::Duration;

struct World {
    ctx: AppContext,
    store: DbEventStore,
    platform: Arc<SimulatedVideoPlatform>,
}

async fn world() -> World {
    world_with(SimulatedPlatformConfig::default()).await
}

async fn world_with(config: SimulatedPlatformConfig) -> World {
    let backend = StorageBackend::in_memory();
    let platform = Arc::new(SimulatedVideoPlatform::with_config(config));
    let ctx = AppContext::new(backend.clone(), None, platform.clone());

    for id in ["a1", "a2"] {
        ctx.admins
            .create(NewAdmin {
                id: id.to_string(),
                display_name: format!("Admin {}", id),
                email: format!("{}@example.com", id),
                ot_api_key: "4655".to_string(),
                ot_secret: "secret".to_string(),
                http_support: id == "a1",
                super_admin: false,
            })
            .await
            .unwrap();
    }

    World {
        ctx,
        store: DbEventStore::new(backend),
        platform,
    }
}

fn named(name: &str, fan_url: &str) -> EventFields {
    EventFields {
        name: Some(name.to_string()),
        fan_url: Some(fan_url.to_string()),
        host_url: Some(format!("{}-host", fan_url)),
        celebrity_url: Some(format!("{}-celeb", fan_url)),
        ..Default::default()
    }
}

/// Keep created_at strictly increasing between saves
async fn tick() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

#[tokio::test]
async fn test_session_ids_are_distinct_and_survive_updates() {
    let w = world().await;
    let event = w.ctx.events.create("a1", named("Show", "alpha")).await.unwrap();
    assert_ne!(event.session_id, event.stage_session_id);

    // Platform-owned keys in a caller payload are dropped on deserialization
    let payload: EventFields = serde_json::from_value(json!({
        "name": "Renamed",
        "sessionId": "hijacked",
        "stageSessionId": "hijacked-too",
        "adminId": "a2",
        "archiveId": "fake"
    }))
    .unwrap();
    let updated = w.ctx.events.update(event.id, payload).await.unwrap();

    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.session_id, event.session_id);
    assert_eq!(updated.stage_session_id, event.stage_session_id);
    assert_eq!(updated.admin_id, "a1");
    assert!(updated.archive_id.is_none());

    let status_changed = w
        .ctx
        .events
        .change_status(event.id, EventStatus::Live)
        .await
        .unwrap();
    assert_eq!(status_changed.session_id, event.session_id);
    assert_eq!(status_changed.stage_session_id, event.stage_session_id);
}

#[tokio::test]
async fn test_slug_lookup_is_scoped_to_admin() {
    let w = world().await;
    let a = w.ctx.events.create("a1", named("A", "alpha")).await.unwrap();

    let found = w
        .store
        .get_by_key("a1", "alpha", SlugField::FanUrl)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, a.id);

    assert!(w
        .store
        .get_by_key("a2", "alpha", SlugField::FanUrl)
        .await
        .unwrap()
        .is_none());

    // Another admin may reuse the slug
    let b = w.ctx.events.create("a2", named("B", "alpha")).await.unwrap();
    assert_ne!(a.id, b.id);
}

#[tokio::test]
async fn test_live_beats_later_preshow() {
    let w = world().await;
    assert!(w.ctx.events.most_recent_active("a1").await.unwrap().is_none());

    let live = w.ctx.events.create("a1", named("Live", "live")).await.unwrap();
    w.ctx
        .events
        .change_status(live.id, EventStatus::Live)
        .await
        .unwrap();
    tick().await;
    let preshow = w.ctx.events.create("a1", named("Pre", "pre")).await.unwrap();
    w.ctx
        .events
        .change_status(preshow.id, EventStatus::Preshow)
        .await
        .unwrap();

    let current = w.ctx.events.most_recent_active("a1").await.unwrap().unwrap();
    assert_eq!(current.id, live.id);

    w.ctx
        .events
        .change_status(live.id, EventStatus::Closed)
        .await
        .unwrap();
    let current = w.ctx.events.most_recent_active("a1").await.unwrap().unwrap();
    assert_eq!(current.id, preshow.id);
}

#[tokio::test]
async fn test_no_active_event_when_nothing_is_live_or_preshow() {
    let w = world().await;
    let event = w.ctx.events.create("a1", named("Show", "alpha")).await.unwrap();
    w.ctx
        .events
        .change_status(event.id, EventStatus::Closed)
        .await
        .unwrap();

    assert!(w.ctx.events.most_recent_active("a1").await.unwrap().is_none());
    assert!(w
        .ctx
        .events
        .create_token_by_user_type("a1", UserType::Host)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_status_stamps_only_its_own_milestone() {
    let w = world().await;
    let event = w.ctx.events.create("a1", named("Show", "alpha")).await.unwrap();

    let live = w
        .ctx
        .events
        .change_status(event.id, EventStatus::Live)
        .await
        .unwrap();
    assert_eq!(live.status, EventStatus::Live);
    let started = live.show_started_at.unwrap();
    assert!(live.show_ended_at.is_none());

    let closed = w
        .ctx
        .events
        .change_status(event.id, EventStatus::Closed)
        .await
        .unwrap();
    assert_eq!(closed.status, EventStatus::Closed);
    assert_eq!(closed.show_started_at, Some(started));
    assert!(closed.show_ended_at.is_some());

    let stored = w.ctx.events.get(event.id).await.unwrap().unwrap();
    assert_eq!(stored.status, EventStatus::Closed);
    assert!(stored.show_started_at.is_some());
    assert!(stored.show_ended_at.is_some());
}

#[tokio::test]
async fn test_status_change_carries_field_updates() {
    let w = world().await;
    let event = w.ctx.events.create("a1", named("Show", "alpha")).await.unwrap();
    let other = w.ctx.events.create("a1", named("Other", "beta")).await.unwrap();

    let live = w
        .ctx
        .events
        .change_status_with(
            event.id,
            EventStatus::Live,
            EventFields {
                name: Some("Show (live)".to_string()),
                redirect_url: Some("https://example.com/after".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(live.status, EventStatus::Live);
    assert_eq!(live.name, "Show (live)");
    assert_eq!(live.redirect_url.as_deref(), Some("https://example.com/after"));
    assert!(live.show_started_at.is_some());
    assert_eq!(live.fan_url.as_deref(), Some("alpha"));

    // A colliding slug rejects the whole write, status included
    let err = w
        .ctx
        .events
        .change_status_with(
            other.id,
            EventStatus::Closed,
            EventFields {
                fan_url: Some("alpha".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StagehandError::SlugConflict { .. }));
    let stored = w.ctx.events.get(other.id).await.unwrap().unwrap();
    assert_eq!(stored.status, EventStatus::NotStarted);
    assert!(stored.show_ended_at.is_none());
}

#[tokio::test]
async fn test_transitions_are_permissive() {
    let w = world().await;
    let event = w.ctx.events.create("a1", named("Show", "alpha")).await.unwrap();

    w.ctx
        .events
        .change_status(event.id, EventStatus::Closed)
        .await
        .unwrap();
    let reopened = w
        .ctx
        .events
        .change_status(event.id, EventStatus::Preshow)
        .await
        .unwrap();
    assert_eq!(reopened.status, EventStatus::Preshow);
}

#[tokio::test]
async fn test_public_listing_hides_closed_and_private_fields() {
    let w = world().await;
    let first = w.ctx.events.create("a1", named("First", "first")).await.unwrap();
    tick().await;
    let closed = w.ctx.events.create("a1", named("Gone", "gone")).await.unwrap();
    tick().await;
    let third = w.ctx.events.create("a1", named("Third", "third")).await.unwrap();
    w.ctx
        .events
        .change_status(closed.id, EventStatus::Closed)
        .await
        .unwrap();

    let listing = w.ctx.events.list_public("a1").await.unwrap();
    let ids: Vec<_> = listing.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![first.id, third.id]);

    let json = serde_json::to_value(&listing[0]).unwrap();
    assert_eq!(json["fanUrl"], "first");
    for private in ["sessionId", "stageSessionId", "hostUrl", "celebrityUrl", "archiveId", "adminId"] {
        assert!(json.get(private).is_none(), "{} leaked", private);
    }
}

#[tokio::test]
async fn test_fan_token_for_unknown_slug_makes_no_gateway_call() {
    let w = world().await;
    w.ctx.events.create("a1", named("Show", "alpha")).await.unwrap();
    let calls_before = w.platform.call_count();

    let err = w.ctx.events.create_token_fan("a1", "missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(w.platform.call_count(), calls_before);
}

#[tokio::test]
async fn test_token_roles_and_payloads() {
    let w = world().await;
    let event = w.ctx.events.create("a1", named("Show", "alpha")).await.unwrap();

    let producer = w.ctx.events.create_token_producer(event.id).await.unwrap();
    assert_eq!(producer.api_key, "4655");
    assert_ne!(producer.backstage_token, producer.stage_token);

    let fan = w.ctx.events.create_token_fan("a1", "alpha").await.unwrap();
    assert!(fan.http_support);

    let celeb = w
        .ctx
        .events
        .create_token_host_celeb("a1", "alpha-celeb", UserType::Celebrity)
        .await
        .unwrap();
    assert_eq!(celeb.event.id, event.id);

    let tokens: Vec<_> = w
        .platform
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            PlatformCall::CreateToken {
                session_id,
                role,
                user_type,
            } => Some((session_id, role, user_type)),
            _ => None,
        })
        .collect();

    assert_eq!(
        tokens,
        vec![
            (event.session_id.clone(), TokenRole::Moderator, UserType::Producer),
            (event.stage_session_id.clone(), TokenRole::Moderator, UserType::Producer),
            (event.session_id.clone(), TokenRole::Publisher, UserType::Fan),
            (event.stage_session_id.clone(), TokenRole::Publisher, UserType::Fan),
            (event.stage_session_id.clone(), TokenRole::Publisher, UserType::Celebrity),
        ]
    );
}

#[tokio::test]
async fn test_token_by_user_type_uses_current_event_slug() {
    let w = world().await;
    let event = w.ctx.events.create("a1", named("Show", "alpha")).await.unwrap();
    w.ctx
        .events
        .change_status(event.id, EventStatus::Preshow)
        .await
        .unwrap();

    let host = w
        .ctx
        .events
        .create_token_by_user_type("a1", UserType::Host)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(host.event.id, event.id);
    assert_eq!(host.event.host_url.as_deref(), Some("alpha-host"));
}

#[tokio::test]
async fn test_token_by_user_type_without_slug_is_not_found() {
    let w = world().await;
    let event = w
        .ctx
        .events
        .create(
            "a1",
            EventFields {
                name: Some("No slugs".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    w.ctx
        .events
        .change_status(event.id, EventStatus::Live)
        .await
        .unwrap();

    let err = w
        .ctx
        .events
        .create_token_by_user_type("a1", UserType::Celebrity)
        .await
        .unwrap_err();
    assert!(matches!(err, StagehandError::EventNotFound(_)));
}

#[tokio::test]
async fn test_stop_archive_keeps_archive_id_and_can_repeat() {
    let w = world().await;
    let event = w.ctx.events.create("a1", named("Show", "alpha")).await.unwrap();
    let archive_id = w.ctx.events.start_archive(event.id).await.unwrap();

    w.ctx.events.stop_archive(event.id).await.unwrap();
    let stored = w.ctx.events.get(event.id).await.unwrap().unwrap();
    assert_eq!(stored.archive_id.as_deref(), Some(archive_id.as_str()));

    // archiveId is never cleared, so a second stop targets the same archive
    w.ctx.events.stop_archive(event.id).await.unwrap();
    let stops = w
        .platform
        .calls()
        .into_iter()
        .filter(|call| matches!(call, PlatformCall::StopArchive { archive_id: id } if *id == archive_id))
        .count();
    assert_eq!(stops, 2);
}

#[tokio::test]
async fn test_session_creation_failure_is_surfaced_and_not_persisted() {
    let w = world_with(SimulatedPlatformConfig::default().fail_session_call(1)).await;
    let err = w.ctx.events.create("a1", named("Show", "alpha")).await.unwrap_err();

    assert!(matches!(err, StagehandError::SessionCreation { .. }));
    assert_eq!(w.platform.session_calls(), 2);
    assert!(w.ctx.events.list("a1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_slug_conflict_on_update() {
    let w = world().await;
    w.ctx.events.create("a1", named("A", "alpha")).await.unwrap();
    let b = w.ctx.events.create("a1", named("B", "beta")).await.unwrap();

    let err = w
        .ctx
        .events
        .update(
            b.id,
            EventFields {
                fan_url: Some("alpha".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StagehandError::SlugConflict {
            field: SlugField::FanUrl,
            ..
        }
    ));
}

/// Hands control back to the scheduler before every session is created,
/// so concurrent creates interleave between the slug check and the save
struct YieldingPlatform(SimulatedVideoPlatform);

#[async_trait]
impl VideoPlatform for YieldingPlatform {
    async fn create_session(
        &self,
        credentials: &PlatformCredentials,
    ) -> stagehand_core::Result<VideoSession> {
        tokio::task::yield_now().await;
        self.0.create_session(credentials).await
    }

    async fn create_token(
        &self,
        credentials: &PlatformCredentials,
        session_id: &str,
        options: &TokenOptions,
    ) -> stagehand_core::Result<String> {
        self.0.create_token(credentials, session_id, options).await
    }

    async fn start_archive(
        &self,
        credentials: &PlatformCredentials,
        session_id: &str,
        name: &str,
        composed: bool,
    ) -> stagehand_core::Result<String> {
        self.0
            .start_archive(credentials, session_id, name, composed)
            .await
    }

    async fn stop_archive(
        &self,
        credentials: &PlatformCredentials,
        archive_id: &str,
    ) -> stagehand_core::Result<()> {
        self.0.stop_archive(credentials, archive_id).await
    }
}

#[tokio::test]
async fn test_concurrent_creates_cannot_share_a_slug() {
    let backend = StorageBackend::in_memory();
    let platform = Arc::new(YieldingPlatform(SimulatedVideoPlatform::new()));
    let ctx = AppContext::new(backend.clone(), None, platform);
    ctx.admins
        .create(NewAdmin {
            id: "a1".to_string(),
            display_name: "Admin a1".to_string(),
            email: "a1@example.com".to_string(),
            ot_api_key: "4655".to_string(),
            ot_secret: "secret".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let fields = || EventFields {
        fan_url: Some("alpha".to_string()),
        ..Default::default()
    };
    let (a, b) = tokio::join!(
        ctx.events.create("a1", fields()),
        ctx.events.create("a1", fields())
    );

    let (winner, loser) = match (a, b) {
        (Ok(event), Err(err)) | (Err(err), Ok(event)) => (event, err),
        (a, b) => panic!("expected exactly one create to succeed: {:?} / {:?}", a, b),
    };
    assert!(matches!(
        loser,
        StagehandError::SlugConflict {
            field: SlugField::FanUrl,
            ..
        }
    ));

    let store = DbEventStore::new(backend);
    let stored: Vec<_> = store
        .list("a1")
        .await
        .unwrap()
        .into_values()
        .filter(|e| e.fan_url.as_deref() == Some("alpha"))
        .collect();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, winner.id);
}

#[tokio::test]
async fn test_missing_event_operations_are_not_found() {
    let w = world().await;
    let id = uuid::Uuid::now_v7();

    assert!(w.ctx.events.get(id).await.unwrap().is_none());
    assert!(w
        .ctx
        .events
        .change_status(id, EventStatus::Live)
        .await
        .unwrap_err()
        .is_not_found());
    assert!(w.ctx.events.start_archive(id).await.unwrap_err().is_not_found());
    assert!(w
        .ctx
        .events
        .create_token_producer(id)
        .await
        .unwrap_err()
        .is_not_found());
    assert_eq!(w.platform.call_count(), 0);
}

#[tokio::test]
async fn test_deleting_admin_removes_its_events() {
    let w = world().await;
    let event = w.ctx.events.create("a2", named("Show", "alpha")).await.unwrap();

    w.ctx.admins.delete("a2").await.unwrap();
    assert!(w.ctx.events.get(event.id).await.unwrap().is_none());
    assert!(w.ctx.admins.get("a2").await.unwrap_err().is_not_found());

    let err = w.ctx.events.create_token_fan("a2", "alpha").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_all_for_admin_leaves_other_admins_alone() {
    let w = world().await;
    w.ctx.events.create("a1", named("A", "alpha")).await.unwrap();
    w.ctx.events.create("a1", named("B", "beta")).await.unwrap();
    let other = w.ctx.events.create("a2", named("C", "alpha")).await.unwrap();

    w.ctx.events.delete_all_for_admin("a1").await.unwrap();
    assert!(w.ctx.events.list("a1").await.unwrap().is_empty());
    assert!(w.ctx.events.get(other.id).await.unwrap().is_some());

    let session = w.ctx.events.get_by_session_id(&other.session_id).await.unwrap();
    assert_eq!(session.map(|e| e.id), Some(other.id));
}
