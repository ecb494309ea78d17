// handlers/protected/mod.rs - endpoints behind the role guard

pub mod auth;
pub mod campaigns;
pub mod equipment;
pub mod favorites;
pub mod news;
pub mod notifications;
pub mod publications;
pub mod readings;
