// Repository layer for PostgreSQL
//
// Events and admins live in two tables. Updates use COALESCE so absent patch
// fields keep their stored value; session ids, owner and created_at are never
// part of an UPDATE.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::PgPool;
use stagehand_core::{Event, EventPatch, NewEvent, SlugField};
use uuid::Uuid;

use crate::models::*;

const EVENT_COLUMNS: &str = r#"
    id, admin_id, name, fan_url, fan_audio_url, host_url, celebrity_url,
    start_image, end_image, redirect_url, date_time_start, date_time_end,
    session_id, stage_session_id, status, archive_event, composed, archive_id,
    rtmp_url, created_at, updated_at, show_started_at, show_ended_at
"#;

const ADMIN_COLUMNS: &str = r#"
    id, display_name, email, ot_api_key, ot_secret, http_support, super_admin,
    created_at, updated_at
"#;

/// Translate a per-admin slug index violation into SlugTaken
fn slug_violation(
    err: sqlx::Error,
    slug_of: impl FnOnce(SlugField) -> Option<String>,
) -> anyhow::Error {
    let field = err
        .as_database_error()
        .filter(|db| db.is_unique_violation())
        .and_then(|db| db.constraint())
        .and_then(|constraint| match constraint {
            "uq_events_admin_fan_url" => Some(SlugField::FanUrl),
            "uq_events_admin_host_url" => Some(SlugField::HostUrl),
            "uq_events_admin_celebrity_url" => Some(SlugField::CelebrityUrl),
            _ => None,
        });

    match field.and_then(|field| slug_of(field).map(|slug| (field, slug))) {
        Some((field, slug)) => SlugTaken { field, slug }.into(),
        None => err.into(),
    }
}

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create database connection from URL
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;
        Ok(Self { pool })
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Migration failed")?;
        Ok(())
    }

    // ============================================
    // Events
    // ============================================

    pub async fn list_events(&self, admin_id: &str) -> Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE admin_id = $1"
        ))
        .bind(admin_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    /// Non-closed events, oldest first
    pub async fn list_open_events(&self, admin_id: &str) -> Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE admin_id = $1 AND status <> 'closed'
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(admin_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    pub async fn most_recent_active_event(&self, admin_id: &str) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE admin_id = $1 AND status IN ('live', 'preshow')
            ORDER BY CASE status WHEN 'live' THEN 0 ELSE 1 END, created_at ASC, id ASC
            LIMIT 1
            "#
        ))
        .bind(admin_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Event::from))
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Event::from))
    }

    pub async fn get_event_by_session_id(&self, session_id: &str) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE session_id = $1
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Event::from))
    }

    pub async fn get_event_by_key(
        &self,
        admin_id: &str,
        slug: &str,
        field: SlugField,
    ) -> Result<Option<Event>> {
        // column() only yields fixed identifiers
        let column = field.column();
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE admin_id = $1 AND {column} = $2 LIMIT 1"
        ))
        .bind(admin_id)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Event::from))
    }

    pub async fn create_event(&self, input: NewEvent) -> Result<Event> {
        let event = Event::from_new(Uuid::now_v7(), input, Utc::now());

        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            INSERT INTO events ({EVENT_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                    $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(event.id)
        .bind(&event.admin_id)
        .bind(&event.name)
        .bind(&event.fan_url)
        .bind(&event.fan_audio_url)
        .bind(&event.host_url)
        .bind(&event.celebrity_url)
        .bind(&event.start_image)
        .bind(&event.end_image)
        .bind(&event.redirect_url)
        .bind(event.date_time_start)
        .bind(event.date_time_end)
        .bind(&event.session_id)
        .bind(&event.stage_session_id)
        .bind(event.status.as_str())
        .bind(event.archive_event)
        .bind(event.composed)
        .bind(&event.archive_id)
        .bind(&event.rtmp_url)
        .bind(event.created_at)
        .bind(event.updated_at)
        .bind(event.show_started_at)
        .bind(event.show_ended_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| slug_violation(e, |field| event.slug(field).map(str::to_string)))?;

        Ok(row.into())
    }

    pub async fn update_event(&self, id: Uuid, patch: EventPatch) -> Result<Option<Event>> {
        let EventPatch {
            fields,
            status,
            archive_id,
            show_started_at,
            show_ended_at,
        } = patch;

        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            UPDATE events
            SET
                name = COALESCE($2, name),
                fan_url = COALESCE($3, fan_url),
                fan_audio_url = COALESCE($4, fan_audio_url),
                host_url = COALESCE($5, host_url),
                celebrity_url = COALESCE($6, celebrity_url),
                start_image = COALESCE($7, start_image),
                end_image = COALESCE($8, end_image),
                redirect_url = COALESCE($9, redirect_url),
                rtmp_url = COALESCE($10, rtmp_url),
                date_time_start = COALESCE($11, date_time_start),
                date_time_end = COALESCE($12, date_time_end),
                archive_event = COALESCE($13, archive_event),
                composed = COALESCE($14, composed),
                status = COALESCE($15, status),
                archive_id = COALESCE($16, archive_id),
                show_started_at = COALESCE($17, show_started_at),
                show_ended_at = COALESCE($18, show_ended_at),
                updated_at = $19
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.fan_url)
        .bind(&fields.fan_audio_url)
        .bind(&fields.host_url)
        .bind(&fields.celebrity_url)
        .bind(&fields.start_image)
        .bind(&fields.end_image)
        .bind(&fields.redirect_url)
        .bind(&fields.rtmp_url)
        .bind(fields.date_time_start)
        .bind(fields.date_time_end)
        .bind(fields.archive_event)
        .bind(fields.composed)
        .bind(status.map(|s| s.as_str()))
        .bind(&archive_id)
        .bind(show_started_at)
        .bind(show_ended_at)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            slug_violation(e, |field| {
                fields
                    .slugs()
                    .find(|(f, _)| *f == field)
                    .map(|(_, slug)| slug.to_string())
            })
        })?;

        Ok(row.map(Event::from))
    }

    pub async fn delete_event(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_events_by_admin(&self, admin_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM events WHERE admin_id = $1")
            .bind(admin_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // ============================================
    // Admins
    // ============================================

    pub async fn create_admin(&self, input: CreateAdminRow) -> Result<AdminRow> {
        let row = sqlx::query_as::<_, AdminRow>(&format!(
            r#"
            INSERT INTO admins (id, display_name, email, ot_api_key, ot_secret, http_support, super_admin)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ADMIN_COLUMNS}
            "#
        ))
        .bind(&input.id)
        .bind(&input.display_name)
        .bind(&input.email)
        .bind(&input.ot_api_key)
        .bind(&input.ot_secret)
        .bind(input.http_support)
        .bind(input.super_admin)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_admin(&self, id: &str) -> Result<Option<AdminRow>> {
        let row = sqlx::query_as::<_, AdminRow>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update_admin(&self, id: &str, input: UpdateAdminRow) -> Result<Option<AdminRow>> {
        let row = sqlx::query_as::<_, AdminRow>(&format!(
            r#"
            UPDATE admins
            SET
                display_name = COALESCE($2, display_name),
                email = COALESCE($3, email),
                ot_api_key = COALESCE($4, ot_api_key),
                ot_secret = COALESCE($5, ot_secret),
                http_support = COALESCE($6, http_support),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ADMIN_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.display_name)
        .bind(&input.email)
        .bind(&input.ot_api_key)
        .bind(&input.ot_secret)
        .bind(input.http_support)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_admin(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM admins WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
