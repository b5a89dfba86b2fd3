pub mod admin;
pub mod compliance;
pub mod peer;
pub mod torrent;
pub mod user;
