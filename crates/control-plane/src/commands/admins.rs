// Admin management commands

use anyhow::Result;
use clap::Subcommand;
use stagehand_core::{Admin, AdminPatch, NewAdmin};

use crate::output::{print_field, OutputFormat};
use stagehand_control_plane::AppContext;

#[derive(Subcommand)]
pub enum AdminsCommand {
    /// Register an admin with its video platform project
    Create {
        /// Identity-provider subject id
        id: String,

        #[arg(long)]
        display_name: String,

        #[arg(long)]
        email: String,

        /// Video platform project key
        #[arg(long)]
        api_key: String,

        /// Video platform project secret
        #[arg(long, env = "STAGEHAND_OT_SECRET", hide_env_values = true)]
        secret: String,

        /// Allow HTTP streaming fallback for viewers
        #[arg(long)]
        http_support: bool,

        #[arg(long)]
        super_admin: bool,
    },

    /// Show an admin
    Get {
        id: String,
    },

    /// Update admin fields
    Update {
        id: String,

        #[arg(long)]
        display_name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        api_key: Option<String>,

        #[arg(long)]
        secret: Option<String>,

        #[arg(long)]
        http_support: Option<bool>,
    },

    /// Delete an admin and all of its events
    Delete {
        id: String,
    },
}

pub async fn run(command: AdminsCommand, ctx: &AppContext, output: OutputFormat) -> Result<()> {
    match command {
        AdminsCommand::Create {
            id,
            display_name,
            email,
            api_key,
            secret,
            http_support,
            super_admin,
        } => {
            let admin = ctx
                .admins
                .create(NewAdmin {
                    id,
                    display_name,
                    email,
                    ot_api_key: api_key,
                    ot_secret: secret,
                    http_support,
                    super_admin,
                })
                .await?;
            print_admin(&admin, output)
        }
        AdminsCommand::Get { id } => print_admin(&ctx.admins.get(&id).await?, output),
        AdminsCommand::Update {
            id,
            display_name,
            email,
            api_key,
            secret,
            http_support,
        } => {
            let admin = ctx
                .admins
                .update(
                    &id,
                    AdminPatch {
                        display_name,
                        email,
                        ot_api_key: api_key,
                        ot_secret: secret,
                        http_support,
                    },
                )
                .await?;
            print_admin(&admin, output)
        }
        AdminsCommand::Delete { id } => {
            ctx.admins.delete(&id).await?;
            if !output.print_value(&serde_json::json!({ "deleted": id }))? {
                println!("Deleted admin {}", id);
            }
            Ok(())
        }
    }
}

fn print_admin(admin: &Admin, output: OutputFormat) -> Result<()> {
    if output.print_value(admin)? {
        return Ok(());
    }
    print_field("ID", &admin.id);
    print_field("Name", &admin.display_name);
    print_field("Email", &admin.email);
    print_field("API key", &admin.ot_api_key);
    print_field("HTTP support", &admin.http_support.to_string());
    print_field("Super admin", &admin.super_admin.to_string());
    print_field("Created", &admin.created_at.to_rfc3339());
    Ok(())
}
