// OpenTok JWTs
// Decision: Use HS256 with the project secret (the only algorithm OpenTok accepts)
//
// Two kinds of token are signed here:
// - project tokens, sent as X-OPENTOK-AUTH on every REST call
// - client tokens, handed to participants to join one session

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use rand::Rng;
use serde::{Deserialize, Serialize};
use stagehand_core::{PlatformCredentials, TokenOptions};

/// Lifetime of a project token
pub const PROJECT_TOKEN_TTL_SECS: i64 = 180;

/// Random identifier (32 hex characters)
fn generate_random_id() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 16] = rng.gen();
    hex::encode(bytes)
}

/// Claims of the X-OPENTOK-AUTH header token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProjectClaims {
    /// Project API key
    pub iss: String,
    /// Issuer type, always "project"
    pub ist: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Claims of a participant token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClientClaims {
    pub iss: String,
    pub ist: String,
    pub iat: i64,
    pub exp: i64,
    pub nonce: String,
    /// Always "session.connect"
    pub scope: String,
    pub session_id: String,
    pub role: String,
    /// Opaque payload visible to other participants
    pub connection_data: String,
}

fn sign<T: Serialize>(claims: &T, credentials: &PlatformCredentials) -> Result<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(credentials.secret.as_bytes()),
    )
    .context("Failed to sign OpenTok JWT")
}

/// Sign a project token for one REST call
pub fn project_token(credentials: &PlatformCredentials) -> Result<String> {
    let now = Utc::now();
    let claims = ProjectClaims {
        iss: credentials.api_key.clone(),
        ist: "project".to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(PROJECT_TOKEN_TTL_SECS)).timestamp(),
        jti: generate_random_id(),
    };
    sign(&claims, credentials)
}

/// Sign a participant token scoped to `session_id`
pub fn client_token(
    credentials: &PlatformCredentials,
    session_id: &str,
    options: &TokenOptions,
    ttl: Duration,
) -> Result<String> {
    let now = Utc::now();
    let claims = ClientClaims {
        iss: credentials.api_key.clone(),
        ist: "project".to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
        nonce: generate_random_id(),
        scope: "session.connect".to_string(),
        session_id: session_id.to_string(),
        role: options.role.as_str().to_string(),
        connection_data: options.data_json(),
    };
    sign(&claims, credentials)
}
