pub mod admins;
pub mod demo;
pub mod events;
pub mod tokens;
