pub mod auth;
pub mod moderation;
pub mod sync;
