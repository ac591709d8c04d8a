// Event management commands

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use stagehand_core::{Event, EventFields, EventStatus};
use uuid::Uuid;

use crate::output::{or_dash, print_field, print_table_header, print_table_row, OutputFormat};
use stagehand_control_plane::AppContext;

/// Caller-editable event fields; flags override values from `--file`
#[derive(Args, Default)]
pub struct EventArgs {
    /// JSON file with event fields (camelCase keys)
    #[arg(short, long)]
    pub file: Option<String>,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub fan_url: Option<String>,

    #[arg(long)]
    pub fan_audio_url: Option<String>,

    #[arg(long)]
    pub host_url: Option<String>,

    #[arg(long)]
    pub celebrity_url: Option<String>,

    #[arg(long)]
    pub start_image: Option<String>,

    #[arg(long)]
    pub end_image: Option<String>,

    #[arg(long)]
    pub redirect_url: Option<String>,

    #[arg(long)]
    pub rtmp_url: Option<String>,

    /// RFC 3339 scheduled start
    #[arg(long)]
    pub date_time_start: Option<DateTime<Utc>>,

    /// RFC 3339 scheduled end
    #[arg(long)]
    pub date_time_end: Option<DateTime<Utc>>,

    #[arg(long)]
    pub archive_event: Option<bool>,

    /// Record a single composed stream instead of individual streams
    #[arg(long)]
    pub composed: Option<bool>,
}

impl EventArgs {
    pub fn into_fields(self) -> Result<EventFields> {
        let base = match &self.file {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read file: {}", path))?;
                serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse event fields from {}", path))?
            }
            None => EventFields::default(),
        };

        Ok(EventFields {
            name: self.name.or(base.name),
            fan_url: self.fan_url.or(base.fan_url),
            fan_audio_url: self.fan_audio_url.or(base.fan_audio_url),
            host_url: self.host_url.or(base.host_url),
            celebrity_url: self.celebrity_url.or(base.celebrity_url),
            start_image: self.start_image.or(base.start_image),
            end_image: self.end_image.or(base.end_image),
            redirect_url: self.redirect_url.or(base.redirect_url),
            rtmp_url: self.rtmp_url.or(base.rtmp_url),
            date_time_start: self.date_time_start.or(base.date_time_start),
            date_time_end: self.date_time_end.or(base.date_time_end),
            archive_event: self.archive_event.or(base.archive_event),
            composed: self.composed.or(base.composed),
        })
    }
}

#[derive(Subcommand)]
pub enum EventsCommand {
    /// Create an event and provision its two sessions
    Create {
        /// Owning admin id
        #[arg(long)]
        admin: String,

        #[command(flatten)]
        fields: EventArgs,
    },

    /// Get event by ID
    Get {
        event_id: Uuid,
    },

    /// Find the event owning a session
    BySession {
        session_id: String,
    },

    /// List an admin's events
    List {
        #[arg(long)]
        admin: String,

        /// Public projection: closed events hidden, oldest first
        #[arg(long)]
        public: bool,
    },

    /// Show the admin's current live (or preshow) event
    Current {
        #[arg(long)]
        admin: String,
    },

    /// Update editable fields
    Update {
        event_id: Uuid,

        #[command(flatten)]
        fields: EventArgs,
    },

    /// Set the event status, optionally updating fields in the same write
    Status {
        event_id: Uuid,

        #[arg(value_parser = ["notStarted", "preshow", "live", "closed"])]
        status: String,

        #[command(flatten)]
        fields: EventArgs,
    },

    /// Start recording the on-stage session
    ArchiveStart {
        event_id: Uuid,
    },

    /// Stop the event's recording
    ArchiveStop {
        event_id: Uuid,
    },

    /// Delete an event
    Delete {
        event_id: Uuid,
    },

    /// Delete every event of an admin
    DeleteAll {
        #[arg(long)]
        admin: String,
    },
}

pub async fn run(command: EventsCommand, ctx: &AppContext, output: OutputFormat) -> Result<()> {
    match command {
        EventsCommand::Create { admin, fields } => {
            let event = ctx.events.create(&admin, fields.into_fields()?).await?;
            print_event(&event, output)
        }
        EventsCommand::Get { event_id } => {
            let event = ctx
                .events
                .get(event_id)
                .await?
                .with_context(|| format!("Event not found: {}", event_id))?;
            print_event(&event, output)
        }
        EventsCommand::BySession { session_id } => {
            let event = ctx
                .events
                .get_by_session_id(&session_id)
                .await?
                .with_context(|| format!("No event uses session {}", session_id))?;
            print_event(&event, output)
        }
        EventsCommand::List { admin, public } => {
            if public {
                let events = ctx.events.list_public(&admin).await?;
                if output.print_value(&events)? {
                    return Ok(());
                }
                print_table_header(&[("ID", 36), ("NAME", 24), ("STATUS", 10), ("FAN URL", 20)]);
                for event in &events {
                    print_table_row(&[
                        (&event.id.to_string(), 36),
                        (&event.name, 24),
                        (event.status.as_str(), 10),
                        (or_dash(event.fan_url.as_deref()), 20),
                    ]);
                }
                return Ok(());
            }

            let mut events: Vec<Event> = ctx.events.list(&admin).await?.into_values().collect();
            events.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            if output.print_value(&events)? {
                return Ok(());
            }
            if events.is_empty() {
                println!("No events found.");
                return Ok(());
            }
            print_table_header(&[("ID", 36), ("NAME", 24), ("STATUS", 10), ("CREATED", 20)]);
            for event in &events {
                print_table_row(&[
                    (&event.id.to_string(), 36),
                    (&event.name, 24),
                    (event.status.as_str(), 10),
                    (&event.created_at.format("%Y-%m-%d %H:%M:%S").to_string(), 20),
                ]);
            }
            Ok(())
        }
        EventsCommand::Current { admin } => match ctx.events.most_recent_active(&admin).await? {
            Some(event) => print_event(&event, output),
            None => {
                if !output.print_value(&serde_json::Value::Null)? {
                    println!("No live or preshow event.");
                }
                Ok(())
            }
        },
        EventsCommand::Update { event_id, fields } => {
            let event = ctx.events.update(event_id, fields.into_fields()?).await?;
            print_event(&event, output)
        }
        EventsCommand::Status {
            event_id,
            status,
            fields,
        } => {
            let event = ctx
                .events
                .change_status_with(
                    event_id,
                    EventStatus::from(status.as_str()),
                    fields.into_fields()?,
                )
                .await?;
            print_event(&event, output)
        }
        EventsCommand::ArchiveStart { event_id } => {
            let archive_id = ctx.events.start_archive(event_id).await?;
            if !output.print_value(&serde_json::json!({ "archiveId": archive_id }))? {
                println!("Archive {} started", archive_id);
            }
            Ok(())
        }
        EventsCommand::ArchiveStop { event_id } => {
            ctx.events.stop_archive(event_id).await?;
            if !output.print_value(&serde_json::json!({ "stopped": event_id }))? {
                println!("Archive stopped for event {}", event_id);
            }
            Ok(())
        }
        EventsCommand::Delete { event_id } => {
            ctx.events.delete(event_id).await?;
            if !output.print_value(&serde_json::json!({ "deleted": event_id }))? {
                println!("Deleted event {}", event_id);
            }
            Ok(())
        }
        EventsCommand::DeleteAll { admin } => {
            ctx.events.delete_all_for_admin(&admin).await?;
            if !output.print_value(&serde_json::json!({ "deletedFor": admin }))? {
                println!("Deleted all events of admin {}", admin);
            }
            Ok(())
        }
    }
}

pub fn print_event(event: &Event, output: OutputFormat) -> Result<()> {
    if output.print_value(event)? {
        return Ok(());
    }
    print_field("ID", &event.id.to_string());
    print_field("Name", &event.name);
    print_field("Admin", &event.admin_id);
    print_field("Status", event.status.as_str());
    print_field("Backstage", &event.session_id);
    print_field("Stage", &event.stage_session_id);
    print_field("Fan URL", or_dash(event.fan_url.as_deref()));
    print_field("Host URL", or_dash(event.host_url.as_deref()));
    print_field("Celebrity URL", or_dash(event.celebrity_url.as_deref()));
    print_field("Archive", or_dash(event.archive_id.as_deref()));
    if let Some(started) = event.show_started_at {
        print_field("Show started", &started.to_rfc3339());
    }
    if let Some(ended) = event.show_ended_at {
        print_field("Show ended", &ended.to_rfc3339());
    }
    Ok(())
}
