// Stagehand operator CLI
//
// Design Decision: Use clap derive for ergonomic argument parsing.
// Design Decision: Drive the orchestration library in-process; no HTTP layer.
// Design Decision: Support text/json output formats for scripting.

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stagehand_control_plane::config::AppConfig;
use stagehand_control_plane::AppContext;
use stagehand_core::telemetry::{init_tracing, TelemetryConfig};
use stagehand_storage::generate_encryption_key;

#[derive(Parser)]
#[command(name = "stagehand")]
#[command(about = "Stagehand - Manage live broadcast events, sessions and tokens")]
#[command(version)]
pub struct Cli {
    /// Output format
    #[arg(long, short, default_value = "text", value_parser = ["text", "json"])]
    pub output: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage admins
    Admins {
        #[command(subcommand)]
        command: commands::admins::AdminsCommand,
    },

    /// Manage events and archives
    Events {
        #[command(subcommand)]
        command: commands::events::EventsCommand,
    },

    /// Mint participant tokens
    Tokens {
        #[command(subcommand)]
        command: commands::tokens::TokensCommand,
    },

    /// Run a complete show against the configured backends
    Demo {
        /// Video platform project key
        #[arg(long, default_value = "100001")]
        api_key: String,

        /// Video platform project secret
        #[arg(
            long,
            env = "STAGEHAND_OT_SECRET",
            hide_env_values = true,
            default_value = "demo-secret"
        )]
        secret: String,
    },

    /// Print a new SECRETS_ENCRYPTION_KEY value
    Keygen {
        /// Key identifier recorded in every sealed secret
        #[arg(long, default_value = "kek-v1")]
        key_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let mut telemetry_config = TelemetryConfig::from_env();
    if telemetry_config.log_filter.is_none() {
        telemetry_config.log_filter = Some(
            "warn,stagehand_control_plane=info,stagehand_storage=info,stagehand_opentok=info"
                .to_string(),
        );
    }
    init_tracing(&telemetry_config);

    let cli = Cli::parse();
    let output = output::OutputFormat::parse(&cli.output);

    if let Commands::Keygen { key_id } = &cli.command {
        println!("{}", generate_encryption_key(key_id));
        return Ok(());
    }

    let config = AppConfig::from_env().context("Invalid configuration")?;
    let ctx = AppContext::from_config(&config).await?;

    match cli.command {
        Commands::Admins { command } => commands::admins::run(command, &ctx, output).await,
        Commands::Events { command } => commands::events::run(command, &ctx, output).await,
        Commands::Tokens { command } => commands::tokens::run(command, &ctx, output).await,
        Commands::Demo { api_key, secret } => {
            commands::demo::run(&ctx, output, api_key, secret).await
        }
        Commands::Keygen { .. } => Ok(()),
    }
}
