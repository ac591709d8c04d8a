// Token minting commands

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use stagehand_core::UserType;
use uuid::Uuid;

use crate::output::{print_field, OutputFormat};
use stagehand_control_plane::AppContext;

#[derive(Subcommand)]
pub enum TokensCommand {
    /// Moderator tokens for both sessions of an event
    Producer {
        event_id: Uuid,
    },

    /// Publisher tokens for a fan, resolved by fan slug
    Fan {
        #[arg(long)]
        admin: String,

        slug: String,
    },

    /// On-stage token for a host, resolved by host slug
    Host {
        #[arg(long)]
        admin: String,

        slug: String,
    },

    /// On-stage token for a celebrity, resolved by celebrity slug
    Celebrity {
        #[arg(long)]
        admin: String,

        slug: String,
    },

    /// On-stage token for the admin's current event
    Active {
        #[arg(long)]
        admin: String,

        /// host, celebrity, fan or producer
        user_type: UserType,
    },
}

pub async fn run(command: TokensCommand, ctx: &AppContext, output: OutputFormat) -> Result<()> {
    match command {
        TokensCommand::Producer { event_id } => {
            let creds = ctx.events.create_token_producer(event_id).await?;
            print_tokens(&creds, output, &creds.api_key, &[
                ("Backstage", &creds.backstage_token),
                ("Stage", &creds.stage_token),
            ])
        }
        TokensCommand::Fan { admin, slug } => {
            let creds = ctx.events.create_token_fan(&admin, &slug).await?;
            print_tokens(&creds, output, &creds.api_key, &[
                ("Backstage", &creds.backstage_token),
                ("Stage", &creds.stage_token),
            ])
        }
        TokensCommand::Host { admin, slug } => {
            let creds = ctx
                .events
                .create_token_host_celeb(&admin, &slug, UserType::Host)
                .await?;
            print_tokens(&creds, output, &creds.api_key, &[("Stage", &creds.stage_token)])
        }
        TokensCommand::Celebrity { admin, slug } => {
            let creds = ctx
                .events
                .create_token_host_celeb(&admin, &slug, UserType::Celebrity)
                .await?;
            print_tokens(&creds, output, &creds.api_key, &[("Stage", &creds.stage_token)])
        }
        TokensCommand::Active { admin, user_type } => {
            match ctx.events.create_token_by_user_type(&admin, user_type).await? {
                Some(creds) => {
                    print_tokens(&creds, output, &creds.api_key, &[("Stage", &creds.stage_token)])
                }
                None => {
                    if !output.print_value(&serde_json::Value::Null)? {
                        println!("No live or preshow event.");
                    }
                    Ok(())
                }
            }
        }
    }
}

fn print_tokens<T: Serialize>(
    credentials: &T,
    output: OutputFormat,
    api_key: &str,
    tokens: &[(&str, &String)],
) -> Result<()> {
    if output.print_value(credentials)? {
        return Ok(());
    }
    print_field("API key", api_key);
    for (label, token) in tokens {
        print_field(label, token);
    }
    Ok(())
}
