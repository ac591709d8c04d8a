// End-to-end walkthrough against the configured backends
//
// Dev-mode storage lives only as long as the process, so this runs a whole
// show in one invocation: register an admin, create an event, walk it through
// its lifecycle with an archive, and mint every kind of token.

use anyhow::Result;
use stagehand_core::{EventFields, EventStatus, NewAdmin, UserType};

use crate::commands::events::print_event;
use crate::output::{print_field, OutputFormat};
use stagehand_control_plane::AppContext;

pub async fn run(
    ctx: &AppContext,
    output: OutputFormat,
    api_key: String,
    secret: String,
) -> Result<()> {
    let admin = ctx
        .admins
        .create(NewAdmin {
            id: format!("demo-{}", uuid::Uuid::now_v7().simple()),
            display_name: "Demo Admin".to_string(),
            email: "demo@example.com".to_string(),
            ot_api_key: api_key,
            ot_secret: secret,
            http_support: true,
            super_admin: false,
        })
        .await?;

    let event = ctx
        .events
        .create(
            &admin.id,
            EventFields {
                name: Some("Demo Show".to_string()),
                fan_url: Some("demo".to_string()),
                host_url: Some("demo-host".to_string()),
                celebrity_url: Some("demo-celebrity".to_string()),
                archive_event: Some(true),
                ..Default::default()
            },
        )
        .await?;

    ctx.events.change_status(event.id, EventStatus::Preshow).await?;
    let producer = ctx.events.create_token_producer(event.id).await?;
    let fan = ctx.events.create_token_fan(&admin.id, "demo").await?;
    let host = ctx
        .events
        .create_token_by_user_type(&admin.id, UserType::Host)
        .await?;

    ctx.events.change_status(event.id, EventStatus::Live).await?;
    let archive_id = ctx.events.start_archive(event.id).await?;
    ctx.events.stop_archive(event.id).await?;
    let closed = ctx.events.change_status(event.id, EventStatus::Closed).await?;

    let report = serde_json::json!({
        "admin": admin,
        "event": closed,
        "archiveId": archive_id,
        "producer": producer,
        "fan": fan,
        "host": host,
    });
    if output.print_value(&report)? {
        return Ok(());
    }

    print_event(&closed, output)?;
    println!();
    print_field("Producer token", &producer.stage_token);
    print_field("Fan token", &fan.stage_token);
    if let Some(host) = host {
        print_field("Host token", &host.stage_token);
    }
    Ok(())
}
