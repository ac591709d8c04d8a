// OpenTok video platform gateway
//
// Implements stagehand-core's VideoPlatform for the OpenTok / Vonage Video
// REST API: session creation, archive start/stop, and locally signed client
// tokens.

pub mod auth;
pub mod client;
pub mod types;

pub use client::OpenTokClient;
pub use types::OpenTokConfig;
