// Simulated Video Platform
//
// In-process stand-in for the conferencing platform, used in dev mode (no
// platform account needed) and by orchestrator tests.
// It supports:
// - Deterministic session, token and archive ids
// - A call log for asserting which gateway calls were made
// - Failure injection for the Nth session creation and for archive calls
//
// Tokens are opaque strings, not signed JWTs.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Result, StagehandError};
use crate::platform::{PlatformCredentials, TokenOptions, TokenRole, UserType, VideoSession};
use crate::traits::VideoPlatform;

// ============================================================================
// Configuration Types
// ============================================================================

/// Failure injection knobs
#[derive(Debug, Clone, Default)]
pub struct SimulatedPlatformConfig {
    /// 1-based index of the `create_session` call that fails
    pub fail_session_call: Option<usize>,
    /// Fail every `start_archive` / `stop_archive` call
    pub fail_archive: bool,
    /// Fail every `create_token` call
    pub fail_token: bool,
}

impl SimulatedPlatformConfig {
    pub fn fail_session_call(mut self, n: usize) -> Self {
        self.fail_session_call = Some(n);
        self
    }

    pub fn fail_archive(mut self) -> Self {
        self.fail_archive = true;
        self
    }

    pub fn fail_token(mut self) -> Self {
        self.fail_token = true;
        self
    }
}

/// One recorded gateway call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    CreateSession {
        api_key: String,
    },
    CreateToken {
        session_id: String,
        role: TokenRole,
        user_type: UserType,
    },
    StartArchive {
        session_id: String,
        name: String,
        composed: bool,
    },
    StopArchive {
        archive_id: String,
    },
}

// ============================================================================
// SimulatedVideoPlatform
// ============================================================================

#[derive(Debug, Default)]
pub struct SimulatedVideoPlatform {
    config: SimulatedPlatformConfig,
    sessions: AtomicUsize,
    tokens: AtomicUsize,
    archives: AtomicUsize,
    calls: Mutex<Vec<PlatformCall>>,
}

impl SimulatedVideoPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SimulatedPlatformConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn session_calls(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }

    fn record(&self, call: PlatformCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl VideoPlatform for SimulatedVideoPlatform {
    async fn create_session(&self, credentials: &PlatformCredentials) -> Result<VideoSession> {
        let n = self.sessions.fetch_add(1, Ordering::SeqCst) + 1;
        self.record(PlatformCall::CreateSession {
            api_key: credentials.api_key.clone(),
        });

        if self.config.fail_session_call == Some(n) {
            return Err(StagehandError::platform(format!(
                "simulated failure on session call {}",
                n
            )));
        }

        Ok(VideoSession {
            session_id: format!("sim-session-{}", n),
        })
    }

    async fn create_token(
        &self,
        _credentials: &PlatformCredentials,
        session_id: &str,
        options: &TokenOptions,
    ) -> Result<String> {
        let n = self.tokens.fetch_add(1, Ordering::SeqCst) + 1;
        self.record(PlatformCall::CreateToken {
            session_id: session_id.to_string(),
            role: options.role,
            user_type: options.data.user_type,
        });

        if self.config.fail_token {
            return Err(StagehandError::platform("simulated token failure"));
        }

        Ok(format!(
            "sim-token-{}-{}-{}",
            n,
            options.role.as_str(),
            session_id
        ))
    }

    async fn start_archive(
        &self,
        _credentials: &PlatformCredentials,
        session_id: &str,
        name: &str,
        composed: bool,
    ) -> Result<String> {
        self.record(PlatformCall::StartArchive {
            session_id: session_id.to_string(),
            name: name.to_string(),
            composed,
        });

        if self.config.fail_archive {
            return Err(StagehandError::platform("simulated archive failure"));
        }

        let n = self.archives.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("sim-archive-{}", n))
    }

    async fn stop_archive(
        &self,
        _credentials: &PlatformCredentials,
        archive_id: &str,
    ) -> Result<()> {
        self.record(PlatformCall::StopArchive {
            archive_id: archive_id.to_string(),
        });

        if self.config.fail_archive {
            return Err(StagehandError::platform("simulated archive failure"));
        }
        Ok(())
    }
}
