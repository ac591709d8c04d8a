// Stagehand core
//
// Domain types and collaborator seams for the live-broadcast event
// orchestrator.
//
// Key design decisions:
// - Uses traits (EventStore, AdminDirectory, VideoPlatform) for pluggable backends
// - Whitelisting is structural: caller payloads deserialize into EventFields,
//   which cannot carry session ids, owner or platform-owned fields
// - Status changes are permissive; lifecycle only decides timestamp stamping
// - Selection rules (public listing, current active event) are pure functions
//   shared by every store backend

pub mod admin;
pub mod error;
pub mod event;
pub mod lifecycle;
pub mod platform;
pub mod traits;

// Simulated video platform for dev mode and tests
pub mod platform_sim;

// Tracing initialization
pub mod telemetry;

// Re-exports for convenience
pub use admin::{Admin, AdminPatch, NewAdmin};
pub use error::{FieldError, Result, StagehandError};
pub use event::{
    most_recent_active, public_listing, Event, EventFields, EventPatch, EventStatus, NewEvent,
    PublicEvent, SlugField,
};
pub use platform::{
    ConnectionData, FanCredentials, PlatformCredentials, ProducerCredentials, StageCredentials,
    TokenOptions, TokenRole, UserType, VideoSession,
};
pub use platform_sim::{PlatformCall, SimulatedPlatformConfig, SimulatedVideoPlatform};
pub use traits::{AdminDirectory, EventStore, VideoPlatform};
