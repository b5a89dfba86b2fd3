pub mod auth;
pub mod hex;
pub mod time;
