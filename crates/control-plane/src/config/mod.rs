// Configuration loaded from environment variables.
// Decision: No DATABASE_URL means dev mode (in-memory storage, simulated platform)
// Decision: Video platform credentials are per admin, so none are read here

use stagehand_core::{Result, StagehandError};
use stagehand_opentok::types::{
    DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TOKEN_TTL_SECS,
};
use stagehand_opentok::OpenTokConfig;

/// Which VideoPlatform implementation to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformMode {
    /// OpenTok REST API
    OpenTok,
    /// In-process simulator
    Simulated,
}

impl PlatformMode {
    fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "opentok" | "vonage" => Ok(PlatformMode::OpenTok),
            "sim" | "simulated" => Ok(PlatformMode::Simulated),
            other => Err(StagehandError::config(format!(
                "VIDEO_PLATFORM must be 'opentok' or 'sim', got '{}'",
                other
            ))),
        }
    }
}

/// Complete process configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL URL; `None` runs in dev mode
    pub database_url: Option<String>,
    pub platform: PlatformMode,
    pub opentok: OpenTokConfig,
    /// `key_id:base64` KEK for sealing admin secrets
    pub encryption_key: Option<String>,
    pub encryption_key_previous: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `DATABASE_URL`: PostgreSQL URL (unset: in-memory dev mode)
    /// - `VIDEO_PLATFORM`: "opentok" or "sim" (default: opentok, sim in dev mode)
    /// - `OPENTOK_API_URL`: REST base URL (default: https://api.opentok.com)
    /// - `OPENTOK_TOKEN_TTL_SECS`: client token lifetime (default: 86400)
    /// - `OPENTOK_REQUEST_TIMEOUT_SECS`: HTTP timeout (default: 10)
    /// - `SECRETS_ENCRYPTION_KEY` / `SECRETS_ENCRYPTION_KEY_PREVIOUS`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (tests pass a map)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL");

        let platform = match var("VIDEO_PLATFORM") {
            Some(value) => PlatformMode::parse(&value)?,
            None if database_url.is_none() => PlatformMode::Simulated,
            None => PlatformMode::OpenTok,
        };

        let token_ttl_secs =
            parse_number(var("OPENTOK_TOKEN_TTL_SECS"), "OPENTOK_TOKEN_TTL_SECS")?
                .unwrap_or(DEFAULT_TOKEN_TTL_SECS);
        if token_ttl_secs <= 0 {
            return Err(StagehandError::config(
                "OPENTOK_TOKEN_TTL_SECS must be positive",
            ));
        }
        let timeout_secs = parse_number(
            var("OPENTOK_REQUEST_TIMEOUT_SECS"),
            "OPENTOK_REQUEST_TIMEOUT_SECS",
        )?
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let opentok = OpenTokConfig {
            api_url: var("OPENTOK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            token_ttl: chrono::Duration::seconds(token_ttl_secs),
            request_timeout: std::time::Duration::from_secs(timeout_secs),
        };

        Ok(Self {
            database_url,
            platform,
            opentok,
            encryption_key: var("SECRETS_ENCRYPTION_KEY"),
            encryption_key_previous: var("SECRETS_ENCRYPTION_KEY_PREVIOUS"),
        })
    }

    /// Check if this is dev mode (in-memory storage)
    pub fn is_dev_mode(&self) -> bool {
        self.database_url.is_none()
    }
}

fn parse_number<T: std::str::FromStr>(value: Option<String>, key: &str) -> Result<Option<T>> {
    value
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|_| StagehandError::config(format!("{} must be a number, got '{}'", key, v)))
        })
        .transpose()
}
