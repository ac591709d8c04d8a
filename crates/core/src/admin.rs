// Admin domain types
//
// An admin is an organizer account. It owns events and carries the video
// platform project credentials used for every session/token/archive call
// made on behalf of its events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::PlatformCredentials;

/// Admin - organizer account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    /// Identity-provider subject id
    pub id: String,
    pub display_name: String,
    pub email: String,
    /// Video platform project key
    pub ot_api_key: String,
    /// Video platform project secret
    #[serde(skip_serializing, default)]
    pub ot_secret: String,
    /// Whether viewers of this admin's events may fall back to HTTP streaming
    pub http_support: bool,
    #[serde(default)]
    pub super_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    pub fn credentials(&self) -> PlatformCredentials {
        PlatformCredentials::new(self.ot_api_key.clone(), self.ot_secret.clone())
    }
}

/// Input for registering an admin
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewAdmin {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub ot_api_key: String,
    pub ot_secret: String,
    pub http_support: bool,
    pub super_admin: bool,
}

/// Partial admin update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ot_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ot_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_support: Option<bool>,
}
