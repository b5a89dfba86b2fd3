pub mod admin;
pub mod announce;
pub mod compliance;
pub mod fallback;
pub mod health;
pub mod metrics;
