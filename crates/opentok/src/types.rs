// OpenTok REST wire types

use chrono::Duration;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://api.opentok.com";
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Client settings
#[derive(Debug, Clone)]
pub struct OpenTokConfig {
    /// REST base URL, without trailing slash
    pub api_url: String,
    /// Lifetime of participant tokens
    pub token_ttl: Duration,
    pub request_timeout: std::time::Duration,
}

impl Default for OpenTokConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            request_timeout: std::time::Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// One element of the `/session/create` response array
#[derive(Debug, Clone, Deserialize)]
pub struct SessionCreated {
    pub session_id: String,
}

/// `/session/create` form body
#[derive(Debug, Clone, Serialize)]
pub struct CreateSessionForm {
    #[serde(rename = "p2p.preference")]
    pub p2p_preference: &'static str,
    #[serde(rename = "archiveMode")]
    pub archive_mode: &'static str,
}

impl Default for CreateSessionForm {
    /// Routed sessions, archives started on demand
    fn default() -> Self {
        Self {
            p2p_preference: "disabled",
            archive_mode: "manual",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Composed,
    Individual,
}

impl From<bool> for OutputMode {
    fn from(composed: bool) -> Self {
        if composed {
            OutputMode::Composed
        } else {
            OutputMode::Individual
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartArchiveRequest {
    pub session_id: String,
    pub name: String,
    pub output_mode: OutputMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveResponse {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_created_needs_only_the_session_id() {
        let sessions: Vec<SessionCreated> = serde_json::from_str(
            r#"[{"session_id": "1_MX40", "project_id": "4655", "media_server_url": ""}]"#,
        )
        .unwrap();
        assert_eq!(sessions[0].session_id, "1_MX40");

        let bare: Vec<SessionCreated> = serde_json::from_str(r#"[{"session_id": "2_MX40"}]"#)
            .unwrap();
        assert_eq!(bare[0].session_id, "2_MX40");
    }
}
