// Stagehand Control Plane Library
// Decision: Shared library for the operator binary and integration tests

// Environment configuration
pub mod config;

// Service wiring
pub mod context;
pub use context::AppContext;

// Services layer
pub mod services;
pub use services::{AdminService, EventService};
