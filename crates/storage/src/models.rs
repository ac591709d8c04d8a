// Database models (internal, may differ from the domain types)

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use stagehand_core::{Event, EventStatus, SlugField};
use uuid::Uuid;

// ============================================
// Events
// ============================================

/// Another event of the same admin already holds this slug.
/// Raised by both backends while the write is in progress.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field} '{slug}' is already used by another event")]
pub struct SlugTaken {
    pub field: SlugField,
    pub slug: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub admin_id: String,
    pub name: String,
    pub fan_url: Option<String>,
    pub fan_audio_url: Option<String>,
    pub host_url: Option<String>,
    pub celebrity_url: Option<String>,
    pub start_image: Option<String>,
    pub end_image: Option<String>,
    pub redirect_url: Option<String>,
    pub date_time_start: Option<DateTime<Utc>>,
    pub date_time_end: Option<DateTime<Utc>>,
    pub session_id: String,
    pub stage_session_id: String,
    pub status: String,
    pub archive_event: bool,
    pub composed: bool,
    pub archive_id: Option<String>,
    pub rtmp_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub show_started_at: Option<DateTime<Utc>>,
    pub show_ended_at: Option<DateTime<Utc>>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            admin_id: row.admin_id,
            name: row.name,
            fan_url: row.fan_url,
            fan_audio_url: row.fan_audio_url,
            host_url: row.host_url,
            celebrity_url: row.celebrity_url,
            start_image: row.start_image,
            end_image: row.end_image,
            redirect_url: row.redirect_url,
            date_time_start: row.date_time_start,
            date_time_end: row.date_time_end,
            session_id: row.session_id,
            stage_session_id: row.stage_session_id,
            status: EventStatus::from(row.status.as_str()),
            archive_event: row.archive_event,
            composed: row.composed,
            archive_id: row.archive_id,
            rtmp_url: row.rtmp_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
            show_started_at: row.show_started_at,
            show_ended_at: row.show_ended_at,
        }
    }
}

// ============================================
// Admins
// ============================================

/// Stored admin; `ot_secret` holds the sealed secret bytes
#[derive(Debug, Clone, FromRow)]
pub struct AdminRow {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub ot_api_key: String,
    pub ot_secret: Vec<u8>,
    pub http_support: bool,
    pub super_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateAdminRow {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub ot_api_key: String,
    pub ot_secret: Vec<u8>,
    pub http_support: bool,
    pub super_admin: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateAdminRow {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub ot_api_key: Option<String>,
    pub ot_secret: Option<Vec<u8>>,
    pub http_support: Option<bool>,
}
