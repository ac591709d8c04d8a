// Application context
// Decision: Built once by the entry point from AppConfig; no globals
// Decision: Collaborators are trait objects so dev mode and production share every code path

use anyhow::{Context, Result};
use stagehand_core::{AdminDirectory, EventStore, SimulatedVideoPlatform, VideoPlatform};
use stagehand_opentok::OpenTokClient;
use stagehand_storage::{DbAdminDirectory, DbEventStore, EncryptionService, StorageBackend};
use std::sync::Arc;

use crate::config::{AppConfig, PlatformMode};
use crate::services::{AdminService, EventService};

/// Wired services ready for use
#[derive(Clone)]
pub struct AppContext {
    pub events: EventService,
    pub admins: AdminService,
}

impl AppContext {
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let backend = match &config.database_url {
            Some(url) => {
                let backend = StorageBackend::postgres(url)
                    .await
                    .context("Failed to connect to database")?;
                tracing::info!("Connected to database");
                backend
            }
            None => {
                tracing::info!("DATABASE_URL not set, using in-memory storage (dev mode)");
                StorageBackend::in_memory()
            }
        };

        let encryption = match &config.encryption_key {
            Some(primary) => {
                let previous: Vec<&str> = config
                    .encryption_key_previous
                    .iter()
                    .map(|s| s.as_str())
                    .collect();
                let service = EncryptionService::new(primary, &previous)
                    .context("Invalid SECRETS_ENCRYPTION_KEY")?;
                tracing::info!(
                    key_id = service.primary_key_id(),
                    "Admin secret encryption enabled"
                );
                Some(service)
            }
            None => {
                tracing::warn!(
                    "SECRETS_ENCRYPTION_KEY not set, admin secrets are stored unencrypted"
                );
                None
            }
        };

        let platform: Arc<dyn VideoPlatform> = match config.platform {
            PlatformMode::OpenTok => {
                tracing::info!(api_url = %config.opentok.api_url, "Using OpenTok video platform");
                Arc::new(OpenTokClient::new(config.opentok.clone())?)
            }
            PlatformMode::Simulated => {
                tracing::info!("Using simulated video platform");
                Arc::new(SimulatedVideoPlatform::new())
            }
        };

        Ok(Self::new(backend, encryption, platform))
    }

    /// Wire services over an existing backend and platform
    pub fn new(
        backend: StorageBackend,
        encryption: Option<EncryptionService>,
        platform: Arc<dyn VideoPlatform>,
    ) -> Self {
        let store: Arc<dyn EventStore> = Arc::new(DbEventStore::new(backend.clone()));
        let directory: Arc<dyn AdminDirectory> =
            Arc::new(DbAdminDirectory::new(backend, encryption));

        Self {
            events: EventService::new(store.clone(), directory.clone(), platform),
            admins: AdminService::new(directory, store),
        }
    }
}
