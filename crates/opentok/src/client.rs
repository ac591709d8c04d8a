// OpenTok Gateway Implementation
//
// Implements the VideoPlatform trait from stagehand-core against the OpenTok
// REST API. Calls are not retried; any failure surfaces to the caller.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use stagehand_core::{
    traits::VideoPlatform, PlatformCredentials, StagehandError, TokenOptions, VideoSession,
};

use crate::auth::{client_token, project_token};
use crate::types::{
    ArchiveResponse, CreateSessionForm, OpenTokConfig, SessionCreated, StartArchiveRequest,
};

/// OpenTok REST client
#[derive(Clone)]
pub struct OpenTokClient {
    client: Client,
    config: OpenTokConfig,
}

impl OpenTokClient {
    pub fn new(config: OpenTokConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
    }

    fn authed(
        &self,
        request: RequestBuilder,
        credentials: &PlatformCredentials,
    ) -> Result<RequestBuilder> {
        Ok(request
            .header("X-OPENTOK-AUTH", project_token(credentials)?)
            .header("Accept", "application/json"))
    }

    async fn check(response: Response, operation: &str) -> Result<Response> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "OpenTok {} failed with status {}: {}",
                operation,
                status,
                error_text
            );
        }
        Ok(response)
    }

    /// Create a routed session with manual archiving
    pub async fn create_session_native(
        &self,
        credentials: &PlatformCredentials,
    ) -> Result<VideoSession> {
        let request = self
            .client
            .post(self.url("/session/create"))
            .form(&CreateSessionForm::default());

        let response = self
            .authed(request, credentials)?
            .send()
            .await
            .context("Failed to send OpenTok session request")?;
        let response = Self::check(response, "session create").await?;

        let sessions: Vec<SessionCreated> = response
            .json()
            .await
            .context("Failed to parse OpenTok session response")?;
        let session = sessions
            .into_iter()
            .next()
            .context("OpenTok session response was empty")?;

        tracing::debug!(session_id = %session.session_id, "OpenTok session created");
        Ok(VideoSession {
            session_id: session.session_id,
        })
    }

    pub async fn start_archive_native(
        &self,
        credentials: &PlatformCredentials,
        session_id: &str,
        name: &str,
        composed: bool,
    ) -> Result<String> {
        let body = StartArchiveRequest {
            session_id: session_id.to_string(),
            name: name.to_string(),
            output_mode: composed.into(),
        };
        let request = self
            .client
            .post(self.url(&format!("/v2/project/{}/archive", credentials.api_key)))
            .json(&body);

        let response = self
            .authed(request, credentials)?
            .send()
            .await
            .context("Failed to send OpenTok archive start request")?;
        let response = Self::check(response, "archive start").await?;

        let archive: ArchiveResponse = response
            .json()
            .await
            .context("Failed to parse OpenTok archive response")?;

        tracing::debug!(
            session_id = %session_id,
            archive_id = %archive.id,
            status = archive.status.as_deref().unwrap_or("unknown"),
            "OpenTok archive started"
        );
        Ok(archive.id)
    }

    pub async fn stop_archive_native(
        &self,
        credentials: &PlatformCredentials,
        archive_id: &str,
    ) -> Result<()> {
        let request = self.client.post(self.url(&format!(
            "/v2/project/{}/archive/{}/stop",
            credentials.api_key, archive_id
        )));

        let response = self
            .authed(request, credentials)?
            .send()
            .await
            .context("Failed to send OpenTok archive stop request")?;
        Self::check(response, "archive stop").await?;

        tracing::debug!(archive_id = %archive_id, "OpenTok archive stopped");
        Ok(())
    }
}

fn platform_err(e: anyhow::Error) -> StagehandError {
    StagehandError::platform(format!("{:#}", e))
}

#[async_trait]
impl VideoPlatform for OpenTokClient {
    async fn create_session(
        &self,
        credentials: &PlatformCredentials,
    ) -> stagehand_core::Result<VideoSession> {
        self.create_session_native(credentials)
            .await
            .map_err(platform_err)
    }

    async fn create_token(
        &self,
        credentials: &PlatformCredentials,
        session_id: &str,
        options: &TokenOptions,
    ) -> stagehand_core::Result<String> {
        client_token(credentials, session_id, options, self.config.token_ttl).map_err(platform_err)
    }

    async fn start_archive(
        &self,
        credentials: &PlatformCredentials,
        session_id: &str,
        name: &str,
        composed: bool,
    ) -> stagehand_core::Result<String> {
        self.start_archive_native(credentials, session_id, name, composed)
            .await
            .map_err(platform_err)
    }

    async fn stop_archive(
        &self,
        credentials: &PlatformCredentials,
        archive_id: &str,
    ) -> stagehand_core::Result<()> {
        self.stop_archive_native(credentials, archive_id)
            .await
            .map_err(platform_err)
    }
}
