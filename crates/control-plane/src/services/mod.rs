// Services layer for orchestration logic
// Services own the multi-step workflows and talk only to core traits

pub mod admin;
pub mod event;

pub use admin::AdminService;
pub use event::EventService;
