// handlers/public/mod.rs - endpoints that need no credential

pub mod auth;
pub mod news;
pub mod publications;
pub mod system;
