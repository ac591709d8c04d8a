// Event domain types
//
// These types represent the Event entity, its status and the whitelisted
// payloads used to create and update it.
// Used by the storage backends and the orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event status
///
/// Nominally linear (notStarted → preshow → live → closed), but any status
/// may be set at any time; see `lifecycle` for the timestamp rules.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum EventStatus {
    #[default]
    NotStarted,
    Preshow,
    Live,
    Closed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::NotStarted => "notStarted",
            EventStatus::Preshow => "preshow",
            EventStatus::Live => "live",
            EventStatus::Closed => "closed",
        }
    }

    /// Preference when picking the current event: lower wins, `None` is never picked
    pub fn rank(&self) -> Option<u8> {
        match self {
            EventStatus::Live => Some(0),
            EventStatus::Preshow => Some(1),
            EventStatus::NotStarted | EventStatus::Closed => None,
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lenient conversion for stored rows; unknown values read as `NotStarted`
impl From<&str> for EventStatus {
    fn from(s: &str) -> Self {
        match s {
            "preshow" => EventStatus::Preshow,
            "live" => EventStatus::Live,
            "closed" => EventStatus::Closed,
            _ => EventStatus::NotStarted,
        }
    }
}

/// Per-role slug field of an event (unique within one admin's events)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SlugField {
    #[default]
    FanUrl,
    HostUrl,
    CelebrityUrl,
}

impl SlugField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlugField::FanUrl => "fanUrl",
            SlugField::HostUrl => "hostUrl",
            SlugField::CelebrityUrl => "celebrityUrl",
        }
    }

    /// Storage column name
    pub fn column(&self) -> &'static str {
        match self {
            SlugField::FanUrl => "fan_url",
            SlugField::HostUrl => "host_url",
            SlugField::CelebrityUrl => "celebrity_url",
        }
    }
}

impl std::fmt::Display for SlugField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event - a scheduled broadcast owned by one admin
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    /// Owning admin (identity-provider subject, not validated)
    pub admin_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan_audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub celebrity_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time_start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time_end: Option<DateTime<Utc>>,
    /// Backstage session, assigned once at creation
    pub session_id: String,
    /// On-stage session, assigned once at creation
    pub stage_session_id: String,
    pub status: EventStatus,
    pub archive_event: bool,
    pub composed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_id: Option<String>,
    #[serde(default)]
    pub rtmp_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_ended_at: Option<DateTime<Utc>>,
}

impl Event {
    /// Value of the given slug field, if set
    pub fn slug(&self, field: SlugField) -> Option<&str> {
        match field {
            SlugField::FanUrl => self.fan_url.as_deref(),
            SlugField::HostUrl => self.host_url.as_deref(),
            SlugField::CelebrityUrl => self.celebrity_url.as_deref(),
        }
    }

    /// Build the stored record for a freshly allocated id
    pub fn from_new(id: Uuid, input: NewEvent, now: DateTime<Utc>) -> Self {
        let NewEvent {
            admin_id,
            session_id,
            stage_session_id,
            status,
            rtmp_url,
            fields,
        } = input;

        Self {
            id,
            admin_id,
            name: fields.name.unwrap_or_default(),
            fan_url: fields.fan_url,
            fan_audio_url: fields.fan_audio_url,
            host_url: fields.host_url,
            celebrity_url: fields.celebrity_url,
            start_image: fields.start_image,
            end_image: fields.end_image,
            redirect_url: fields.redirect_url,
            date_time_start: fields.date_time_start,
            date_time_end: fields.date_time_end,
            session_id,
            stage_session_id,
            status,
            archive_event: fields.archive_event.unwrap_or(false),
            composed: fields.composed.unwrap_or(false),
            archive_id: None,
            rtmp_url: fields.rtmp_url.unwrap_or(rtmp_url),
            created_at: now,
            updated_at: now,
            show_started_at: None,
            show_ended_at: None,
        }
    }

    /// Merge a patch into this record and stamp `updated_at`
    pub fn apply(&mut self, patch: EventPatch, now: DateTime<Utc>) {
        let EventPatch {
            fields,
            status,
            archive_id,
            show_started_at,
            show_ended_at,
        } = patch;

        if let Some(name) = fields.name {
            self.name = name;
        }
        if let Some(fan_url) = fields.fan_url {
            self.fan_url = Some(fan_url);
        }
        if let Some(fan_audio_url) = fields.fan_audio_url {
            self.fan_audio_url = Some(fan_audio_url);
        }
        if let Some(host_url) = fields.host_url {
            self.host_url = Some(host_url);
        }
        if let Some(celebrity_url) = fields.celebrity_url {
            self.celebrity_url = Some(celebrity_url);
        }
        if let Some(start_image) = fields.start_image {
            self.start_image = Some(start_image);
        }
        if let Some(end_image) = fields.end_image {
            self.end_image = Some(end_image);
        }
        if let Some(redirect_url) = fields.redirect_url {
            self.redirect_url = Some(redirect_url);
        }
        if let Some(rtmp_url) = fields.rtmp_url {
            self.rtmp_url = rtmp_url;
        }
        if fields.date_time_start.is_some() {
            self.date_time_start = fields.date_time_start;
        }
        if fields.date_time_end.is_some() {
            self.date_time_end = fields.date_time_end;
        }
        if let Some(archive_event) = fields.archive_event {
            self.archive_event = archive_event;
        }
        if let Some(composed) = fields.composed {
            self.composed = composed;
        }
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(archive_id) = archive_id {
            self.archive_id = Some(archive_id);
        }
        if show_started_at.is_some() {
            self.show_started_at = show_started_at;
        }
        if show_ended_at.is_some() {
            self.show_ended_at = show_ended_at;
        }
        self.updated_at = now;
    }
}

/// Caller-editable event attributes
///
/// This is the whitelist for caller payloads: deserializing arbitrary JSON
/// into it silently drops every key it does not name, including the
/// platform-owned ones (`sessionId`, `archiveId`, `status`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EventFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan_audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub celebrity_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtmp_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time_start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time_end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_event: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composed: Option<bool>,
}

impl EventFields {
    /// Slugs carried by this payload
    pub fn slugs(&self) -> impl Iterator<Item = (SlugField, &str)> {
        [
            (SlugField::FanUrl, self.fan_url.as_deref()),
            (SlugField::HostUrl, self.host_url.as_deref()),
            (SlugField::CelebrityUrl, self.celebrity_url.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, slug)| slug.map(|s| (field, s)))
    }
}

/// Whitelisted insert payload, built by the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub admin_id: String,
    pub session_id: String,
    pub stage_session_id: String,
    pub status: EventStatus,
    /// Default stream target; a caller-supplied `fields.rtmp_url` wins
    pub rtmp_url: String,
    pub fields: EventFields,
}

/// Whitelisted merge payload
///
/// Session ids, owner and creation time are not representable here, so an
/// update can never rewrite them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub fields: EventFields,
    pub status: Option<EventStatus>,
    pub archive_id: Option<String>,
    pub show_started_at: Option<DateTime<Utc>>,
    pub show_ended_at: Option<DateTime<Utc>>,
}

impl From<EventFields> for EventPatch {
    fn from(fields: EventFields) -> Self {
        Self {
            fields,
            ..Default::default()
        }
    }
}

impl EventPatch {
    /// Record a started archive
    pub fn archive(archive_id: impl Into<String>) -> Self {
        Self {
            archive_id: Some(archive_id.into()),
            ..Default::default()
        }
    }
}

/// Restricted projection served to unauthenticated viewers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicEvent {
    pub id: Uuid,
    pub name: String,
    pub status: EventStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan_audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time_start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Event> for PublicEvent {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            name: event.name.clone(),
            status: event.status,
            fan_url: event.fan_url.clone(),
            fan_audio_url: event.fan_audio_url.clone(),
            start_image: event.start_image.clone(),
            end_image: event.end_image.clone(),
            date_time_start: event.date_time_start,
            date_time_end: event.date_time_end,
            created_at: event.created_at,
        }
    }
}

// ============================================================================
// Selection rules shared by every store backend
// ============================================================================

fn by_creation(mut events: Vec<Event>) -> Vec<Event> {
    // id breaks ties between equal timestamps (v7 ids are time-ordered)
    events.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
    events
}

/// Events that are not closed, oldest first, projected to the public fields
pub fn public_listing(events: impl IntoIterator<Item = Event>) -> Vec<PublicEvent> {
    let open: Vec<Event> = events
        .into_iter()
        .filter(|e| e.status != EventStatus::Closed)
        .collect();
    by_creation(open).iter().map(PublicEvent::from).collect()
}

/// The earliest live event, else the earliest preshow event
pub fn most_recent_active(events: impl IntoIterator<Item = Event>) -> Option<Event> {
    events
        .into_iter()
        .filter_map(|e| e.status.rank().map(|rank| (rank, e)))
        .min_by(|(ra, a), (rb, b)| (ra, a.created_at, a.id).cmp(&(rb, b.created_at, b.id)))
        .map(|(_, e)| e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn event(admin_id: &str, status: EventStatus, created_at: DateTime<Utc>) -> Event {
        Event::from_new(
            Uuid::now_v7(),
            NewEvent {
                admin_id: admin_id.to_string(),
                session_id: "backstage".to_string(),
                stage_session_id: "stage".to_string(),
                status,
                rtmp_url: String::new(),
                fields: EventFields::default(),
            },
            created_at,
        )
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_value(EventStatus::NotStarted).unwrap(),
            "notStarted"
        );
        assert_eq!(serde_json::to_value(EventStatus::Live).unwrap(), "live");
        let parsed: EventStatus = serde_json::from_str("\"closed\"").unwrap();
        assert_eq!(parsed, EventStatus::Closed);
        assert!(serde_json::from_str::<EventStatus>("\"paused\"").is_err());
    }

    #[test]
    fn test_status_from_stored_value() {
        assert_eq!(EventStatus::from("preshow"), EventStatus::Preshow);
        assert_eq!(EventStatus::from("garbage"), EventStatus::NotStarted);
    }

    #[test]
    fn test_fields_drop_unknown_and_platform_keys() {
        let fields: EventFields = serde_json::from_value(serde_json::json!({
            "name": "Launch",
            "fanUrl": "launch",
            "sessionId": "hijacked",
            "stageSessionId": "hijacked",
            "archiveId": "hijacked",
            "status": "live",
            "bogus": 42
        }))
        .unwrap();

        assert_eq!(fields.name.as_deref(), Some("Launch"));
        assert_eq!(fields.fan_url.as_deref(), Some("launch"));
        let round_trip = serde_json::to_value(&fields).unwrap();
        let keys: Vec<_> = round_trip.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_from_new_applies_defaults() {
        let now = Utc::now();
        let e = Event::from_new(
            Uuid::now_v7(),
            NewEvent {
                admin_id: "a1".to_string(),
                session_id: "s1".to_string(),
                stage_session_id: "s2".to_string(),
                status: EventStatus::NotStarted,
                rtmp_url: String::new(),
                fields: EventFields {
                    name: Some("Show".to_string()),
                    ..Default::default()
                },
            },
            now,
        );
        assert_eq!(e.status, EventStatus::NotStarted);
        assert!(!e.archive_event);
        assert!(!e.composed);
        assert_eq!(e.rtmp_url, "");
        assert_eq!(e.created_at, e.updated_at);
        assert!(e.archive_id.is_none());
    }

    #[test]
    fn test_apply_merges_only_present_fields() {
        let created = Utc::now() - Duration::minutes(5);
        let mut e = event("a1", EventStatus::NotStarted, created);
        e.fan_url = Some("alpha".to_string());

        let now = Utc::now();
        e.apply(
            EventPatch::from(EventFields {
                name: Some("Renamed".to_string()),
                ..Default::default()
            }),
            now,
        );

        assert_eq!(e.name, "Renamed");
        assert_eq!(e.fan_url.as_deref(), Some("alpha"));
        assert_eq!(e.session_id, "backstage");
        assert_eq!(e.created_at, created);
        assert_eq!(e.updated_at, now);
    }

    #[test]
    fn test_public_listing_excludes_closed_and_sorts_ascending() {
        let t0 = Utc::now();
        let newest = event("a1", EventStatus::Preshow, t0 + Duration::seconds(20));
        let closed = event("a1", EventStatus::Closed, t0 + Duration::seconds(10));
        let oldest = event("a1", EventStatus::NotStarted, t0);

        let listing = public_listing(vec![newest.clone(), closed, oldest.clone()]);
        let ids: Vec<_> = listing.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![oldest.id, newest.id]);

        let json = serde_json::to_value(&listing[0]).unwrap();
        assert!(json.get("sessionId").is_none());
        assert!(json.get("adminId").is_none());
    }

    #[test]
    fn test_most_recent_active_prefers_live() {
        let t0 = Utc::now();
        let live = event("a1", EventStatus::Live, t0);
        let preshow = event("a1", EventStatus::Preshow, t0 + Duration::seconds(5));

        let picked = most_recent_active(vec![preshow, live.clone()]).unwrap();
        assert_eq!(picked.id, live.id);
    }

    #[test]
    fn test_most_recent_active_falls_back_to_earliest_preshow() {
        let t0 = Utc::now();
        let early = event("a1", EventStatus::Preshow, t0);
        let late = event("a1", EventStatus::Preshow, t0 + Duration::seconds(5));
        let closed = event("a1", EventStatus::Closed, t0 - Duration::seconds(5));

        let picked = most_recent_active(vec![late, closed, early.clone()]).unwrap();
        assert_eq!(picked.id, early.id);
    }

    #[test]
    fn test_most_recent_active_none_without_active_events() {
        let t0 = Utc::now();
        let events = vec![
            event("a1", EventStatus::NotStarted, t0),
            event("a1", EventStatus::Closed, t0),
        ];
        assert!(most_recent_active(events).is_none());
    }

    #[test]
    fn test_fields_slugs() {
        let fields = EventFields {
            fan_url: Some("f".to_string()),
            celebrity_url: Some("c".to_string()),
            ..Default::default()
        };
        let slugs: Vec<_> = fields.slugs().collect();
        assert_eq!(
            slugs,
            vec![(SlugField::FanUrl, "f"), (SlugField::CelebrityUrl, "c")]
        );
    }
}
