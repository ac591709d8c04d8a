// Video platform and token types
//
// Types exchanged with the video platform gateway, plus the credential
// bundles handed to each kind of participant.

use serde::{Deserialize, Serialize};

use crate::event::{Event, SlugField};

/// Project credentials of one admin on the video platform
#[derive(Clone, PartialEq, Eq)]
pub struct PlatformCredentials {
    pub api_key: String,
    pub secret: String,
}

impl PlatformCredentials {
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for PlatformCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformCredentials")
            .field("api_key", &self.api_key)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// A freshly created conferencing room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSession {
    pub session_id: String,
}

/// Role a token grants inside a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenRole {
    Subscriber,
    Publisher,
    Moderator,
}

impl TokenRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenRole::Subscriber => "subscriber",
            TokenRole::Publisher => "publisher",
            TokenRole::Moderator => "moderator",
        }
    }
}

/// Kind of participant a token is minted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Producer,
    Fan,
    Host,
    Celebrity,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Producer => "producer",
            UserType::Fan => "fan",
            UserType::Host => "host",
            UserType::Celebrity => "celebrity",
        }
    }

    /// Slug field used to resolve an on-stage participant's event.
    /// Hosts use `hostUrl`; every other type resolves through `celebrityUrl`.
    pub fn slug_field(&self) -> SlugField {
        match self {
            UserType::Host => SlugField::HostUrl,
            _ => SlugField::CelebrityUrl,
        }
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "producer" => Ok(UserType::Producer),
            "fan" => Ok(UserType::Fan),
            "host" => Ok(UserType::Host),
            "celebrity" => Ok(UserType::Celebrity),
            other => Err(format!("unknown user type: {}", other)),
        }
    }
}

/// Opaque payload attached to a token, visible to the other participants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionData {
    pub user_type: UserType,
}

/// Options for minting one token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenOptions {
    pub role: TokenRole,
    pub data: ConnectionData,
}

impl TokenOptions {
    pub fn new(role: TokenRole, user_type: UserType) -> Self {
        Self {
            role,
            data: ConnectionData { user_type },
        }
    }

    /// Serialized `data` payload, e.g. `{"userType":"fan"}`
    pub fn data_json(&self) -> String {
        serde_json::to_string(&self.data).unwrap_or_default()
    }
}

// ============================================================================
// Credential bundles returned by the token flows
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerCredentials {
    pub api_key: String,
    pub event: Event,
    pub backstage_token: String,
    pub stage_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FanCredentials {
    pub api_key: String,
    pub event: Event,
    pub backstage_token: String,
    pub stage_token: String,
    pub http_support: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageCredentials {
    pub api_key: String,
    pub event: Event,
    pub stage_token: String,
    pub http_support: bool,
}
