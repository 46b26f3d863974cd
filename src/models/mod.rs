pub mod comment;
pub mod pagination;
pub mod refresh_token;
pub mod user;
pub mod video;
