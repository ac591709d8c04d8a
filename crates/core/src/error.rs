// Error types for event orchestration

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::SlugField;

/// Result type alias for orchestration operations
pub type Result<T> = std::result::Result<T, StagehandError>;

/// A single rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors surfaced by the event store, the video platform and the orchestrator
#[derive(Debug, Error)]
pub enum StagehandError {
    /// Event lookup came back empty
    #[error("Event not found: {0}")]
    EventNotFound(String),

    /// Owning admin lookup came back empty
    #[error("Admin not found: {0}")]
    AdminNotFound(String),

    /// Slug already used by another event of the same admin
    #[error("{field} '{slug}' is already used by another event")]
    SlugConflict { field: SlugField, slug: String },

    /// Archive stop requested on an event that never started one
    #[error("No archive has been started for event {0}")]
    ArchiveNotStarted(String),

    /// Provisioning the backstage/on-stage sessions failed
    #[error("Session creation failed: {source}")]
    SessionCreation {
        #[source]
        source: Box<StagehandError>,
    },

    /// Video platform call failed (network, auth, quota)
    #[error("Video platform error: {0}")]
    Platform(String),

    /// Persistence failure
    #[error("Store error: {0}")]
    Store(String),

    /// Input rejected before persistence
    #[error("Validation failed: {}", format_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl StagehandError {
    /// Create an event not found error
    pub fn event_not_found(id: impl ToString) -> Self {
        StagehandError::EventNotFound(id.to_string())
    }

    /// Create an admin not found error
    pub fn admin_not_found(id: impl Into<String>) -> Self {
        StagehandError::AdminNotFound(id.into())
    }

    /// Create a video platform error
    pub fn platform(msg: impl Into<String>) -> Self {
        StagehandError::Platform(msg.into())
    }

    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        StagehandError::Store(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        StagehandError::Configuration(msg.into())
    }

    /// Wrap a gateway failure raised while provisioning sessions
    pub fn session_creation(source: StagehandError) -> Self {
        StagehandError::SessionCreation {
            source: Box::new(source),
        }
    }

    /// True for the "resource not found" family (maps to 404 at the routing layer)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StagehandError::EventNotFound(_) | StagehandError::AdminNotFound(_)
        )
    }
}
